//! Human-readable metadata pack and single-project JSON exports.
//!
//! Both are one-way: nothing reads these files back.

use chrono::{DateTime, Utc};

use crate::clock::{parse_date, to_iso};
use crate::models::Project;
use crate::slug::slug_for_title;
use crate::store::transfer::ExportArtifact;

const RULE: &str = "========================================";

pub fn metadata_pack_file_name(project: &Project) -> String {
    format!("{}-metadata-pack.txt", slug_for_title(project.title()))
}

pub fn project_json_file_name(project: &Project) -> String {
    format!("{}-project.json", slug_for_title(project.title()))
}

fn joined_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

/// Stored timestamps are shown as calendar dates; anything unparseable verbatim
fn display_date(value: &str) -> String {
    parse_date(value)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Render the pack text for one project
pub fn render_metadata_pack(project: &Project, generated_at: DateTime<Utc>) -> String {
    let metadata = &project.metadata;
    let mut out = String::new();

    out.push_str(&format!("{RULE}\nPUBLISHING METADATA PACK\n{RULE}\n\n"));

    out.push_str("BASIC INFORMATION\n----------------\n");
    out.push_str(&format!("Title: {}\n", metadata.title));
    if let Some(subtitle) = &metadata.subtitle {
        out.push_str(&format!("Subtitle: {subtitle}\n"));
    }
    out.push_str(&format!("Author: {}\n", metadata.author));
    let optional = [
        ("Pen Name", &metadata.pen_name),
        ("Series", &metadata.series),
        ("ISBN", &metadata.isbn),
        ("Trim Size", &metadata.trim),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            out.push_str(&format!("{label}: {value}\n"));
        }
    }

    out.push_str("\nCATEGORIZATION\n--------------\n");
    out.push_str(&format!("Keywords: {}\n", joined_or_none(&metadata.keywords)));
    out.push_str(&format!("Categories: {}\n", joined_or_none(&metadata.categories)));

    out.push_str("\nBOOK DESCRIPTION / BLURB\n------------------------\n");
    if metadata.blurb.trim().is_empty() {
        out.push_str("No description provided\n");
    } else {
        out.push_str(&format!("{}\n", metadata.blurb));
    }

    out.push_str(&format!("\n{RULE}\nSTATUS & PROGRESS\n{RULE}\n\n"));
    out.push_str(&format!("Stage: {}\n", project.stage.label().to_uppercase()));
    out.push_str(&format!("Created: {}\n", display_date(&project.created_at)));
    out.push_str(&format!("Last Updated: {}\n", display_date(&project.updated_at)));

    let completed = project.completed_checklist_items();
    let total = project.checklist.len();
    out.push_str("\nChecklist Progress:\n");
    out.push_str(&format!("- Total Tasks: {total}\n"));
    out.push_str(&format!("- Completed: {completed}\n"));
    out.push_str(&format!("- Remaining: {}\n", total - completed));

    out.push_str("\nASSETS\n------\n");
    if project.assets.is_empty() {
        out.push_str("No assets uploaded\n");
    } else {
        for asset in &project.assets {
            out.push_str(&format!("- {}: {}\n", asset.kind, asset.file_name));
        }
    }

    if !project.notes.trim().is_empty() {
        out.push_str(&format!("\nLAUNCH NOTES\n------------\n{}\n", project.notes));
    }

    out.push_str(&format!("\n{RULE}\nGenerated: {}\n{RULE}", to_iso(generated_at)));
    out
}

pub fn metadata_pack(project: &Project, generated_at: DateTime<Utc>) -> ExportArtifact {
    ExportArtifact {
        file_name: metadata_pack_file_name(project),
        contents: render_metadata_pack(project, generated_at),
    }
}

/// One project, pretty-printed, in the same shape it has inside the document
pub fn export_project_json(project: &Project) -> Result<ExportArtifact, serde_json::Error> {
    Ok(ExportArtifact {
        file_name: project_json_file_name(project),
        contents: serde_json::to_string_pretty(project)?,
    })
}
