//! Project search shared by the board view and the CLI.
//!
//! A query is split on '+' into terms that must all match; each term matches
//! case-insensitively against the title, author or pen name.

use crate::models::Project;

/// Split a query into lowercased, non-empty terms.
///
/// # Examples
/// - "garden" -> ["garden"]
/// - "  night + garden " -> ["night", "garden"]
/// - "" -> []
pub fn parse_search_terms(query: &str) -> Vec<String> {
    query
        .split('+')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Case-insensitive substring test; an empty term matches everything
pub fn text_contains_term(text: &str, term: &str) -> bool {
    term.is_empty() || text.to_lowercase().contains(&term.to_lowercase())
}

/// Whether every term matches one of the project's searchable fields
pub fn project_matches(project: &Project, terms: &[String]) -> bool {
    let metadata = &project.metadata;
    terms.iter().all(|term| {
        text_contains_term(&metadata.title, term)
            || text_contains_term(&metadata.author, term)
            || metadata
                .pen_name
                .as_deref()
                .is_some_and(|pen_name| text_contains_term(pen_name, term))
    })
}
