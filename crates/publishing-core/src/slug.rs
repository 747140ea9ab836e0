//! File-name slugs derived from book titles.

/// Fallback when a title has no ASCII letters or digits at all
pub const UNTITLED_SLUG: &str = "untitled";

/// Normalize a title into a file-name slug:
/// - Convert to lowercase
/// - Replace anything but ASCII letters and digits with a dash
/// - Collapse consecutive dashes into a single dash
/// - Remove leading/trailing dashes
///
/// # Examples
/// ```
/// use publishing_core::slug::normalize_slug;
///
/// assert_eq!(normalize_slug("The Midnight Garden"), "the-midnight-garden");
/// assert_eq!(normalize_slug("Code of Shadows: Book 2!"), "code-of-shadows-book-2");
/// assert_eq!(normalize_slug("  ¿¡  "), "");
/// ```
pub fn normalize_slug(input: &str) -> String {
    let normalized: String = input
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    collapse_dashes(&normalized)
}

/// Slug for a title, never empty
pub fn slug_for_title(title: &str) -> String {
    let slug = normalize_slug(title);
    if slug.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        slug
    }
}

/// Collapse consecutive dashes and remove leading/trailing dashes.
fn collapse_dashes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_dash = true; // Start true to skip leading dashes

    for c in s.chars() {
        if c == '-' {
            if !prev_was_dash {
                result.push(c);
                prev_was_dash = true;
            }
        } else {
            result.push(c);
            prev_was_dash = false;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Whispers in the Wind"), "whispers-in-the-wind");
        assert_eq!(normalize_slug("  padded  "), "padded");
        assert_eq!(normalize_slug("Recipes -- from Nowhere"), "recipes-from-nowhere");
        assert_eq!(normalize_slug("The Last Algorithm (2nd ed.)"), "the-last-algorithm-2nd-ed");
        assert_eq!(normalize_slug("with_underscores"), "with-underscores");
        // Non-ASCII letters are separators, matching the export file names
        assert_eq!(normalize_slug("Café Noir"), "caf-noir");
    }

    #[test]
    fn test_slug_for_title_never_empty() {
        assert_eq!(slug_for_title("Salt and Starlight"), "salt-and-starlight");
        assert_eq!(slug_for_title("!!!"), UNTITLED_SLUG);
        assert_eq!(slug_for_title(""), UNTITLED_SLUG);
    }

    #[test]
    fn test_collapse_dashes() {
        assert_eq!(collapse_dashes("a--b"), "a-b");
        assert_eq!(collapse_dashes("-start"), "start");
        assert_eq!(collapse_dashes("end-"), "end");
        assert_eq!(collapse_dashes("---"), "");
    }
}
