//! Starting document for a profile with nothing persisted.
//!
//! The shape is fixed (one example book per workflow stage); ids and
//! timestamps are fresh on every call. The wall clock is only used to place
//! timestamps a plausible number of days in the past.

use chrono::{DateTime, Utc};

use crate::clock::{days_ago, generate_id};
use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::models::{
    Activity, ActivityKind, AppState, Asset, AssetKind, ChecklistItem, Metadata, Platform,
    Project, Stage,
};

const BASE_CHECKLIST: [(&str, Platform); 13] = [
    ("Prepare manuscript for upload", Platform::Both),
    ("Design book cover", Platform::Both),
    ("Format interior for print", Platform::Both),
    ("Create KDP account", Platform::Kdp),
    ("Upload manuscript to KDP", Platform::Kdp),
    ("Set pricing on KDP", Platform::Kdp),
    ("Preview KDP book", Platform::Kdp),
    ("Publish on KDP", Platform::Kdp),
    ("Create IngramSpark account", Platform::Ingramspark),
    ("Upload files to IngramSpark", Platform::Ingramspark),
    ("Set distribution options", Platform::Ingramspark),
    ("Order proof copy", Platform::Ingramspark),
    ("Approve and publish on IngramSpark", Platform::Ingramspark),
];

/// Checklist derived from the base list.
///
/// The first `completed` items are done; `due_in_days` puts a due date on the
/// items selected by `due_for`.
fn checklist(
    now: DateTime<Utc>,
    completed: usize,
    due_for: impl Fn(usize) -> bool,
    due_in_days: i64,
) -> Vec<ChecklistItem> {
    BASE_CHECKLIST
        .iter()
        .enumerate()
        .map(|(index, (label, platform))| ChecklistItem {
            id: generate_id(),
            label: (*label).to_string(),
            platform: *platform,
            completed: index < completed,
            due_date: due_for(index).then(|| days_ago(now, -due_in_days)),
        })
        .collect()
}

fn asset(now: DateTime<Utc>, kind: AssetKind, file_name: &str, uploaded_days_ago: i64) -> Asset {
    Asset {
        id: generate_id(),
        kind,
        file_name: file_name.to_string(),
        uploaded_at: Some(days_ago(now, uploaded_days_ago)),
    }
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

struct Example {
    stage: Stage,
    metadata: Metadata,
    checklist: Vec<ChecklistItem>,
    assets: Vec<Asset>,
    notes: &'static str,
    created_days_ago: i64,
    updated_days_ago: i64,
}

fn examples(now: DateTime<Utc>) -> Vec<Example> {
    vec![
        Example {
            stage: Stage::Marketing,
            metadata: Metadata {
                subtitle: Some("A Tale of Mystery and Wonder".to_string()),
                pen_name: Some("A. Night".to_string()),
                series: Some("Midnight Chronicles".to_string()),
                isbn: Some("978-1234567890".to_string()),
                trim: Some("6x9".to_string()),
                keywords: labels(&["mystery", "fantasy", "garden", "adventure", "magic"]),
                categories: labels(&["Fiction", "Fantasy", "Mystery"]),
                blurb: "When the clock strikes twelve, the garden comes alive with secrets that \
                        have been buried for centuries. A young explorer discovers that some \
                        mysteries are better left unsolved."
                    .to_string(),
                ..Metadata::new("The Midnight Garden", "Anonymous Author")
            },
            checklist: checklist(now, BASE_CHECKLIST.len(), |_| false, 0),
            assets: vec![
                asset(now, AssetKind::Cover, "midnight-garden-cover.jpg", 45),
                asset(now, AssetKind::Interior, "midnight-garden-interior.pdf", 45),
            ],
            notes: "Successfully published on both platforms. Sales performing above expectations.",
            created_days_ago: 60,
            updated_days_ago: 30,
        },
        Example {
            stage: Stage::Publish,
            metadata: Metadata {
                subtitle: Some("Decoding the Digital Conspiracy".to_string()),
                pen_name: Some("J. Binary".to_string()),
                isbn: Some("978-0987654321".to_string()),
                trim: Some("5.5x8.5".to_string()),
                keywords: labels(&["thriller", "technology", "cybersecurity", "conspiracy", "suspense"]),
                categories: labels(&["Fiction", "Thriller", "Technology"]),
                blurb: "In a world where data is power, one programmer discovers a conspiracy \
                        that threatens to unravel the fabric of digital society. Time is running out."
                    .to_string(),
                ..Metadata::new("Code of Shadows", "Anonymous Developer")
            },
            checklist: checklist(now, 7, |i| i >= 7, 5),
            assets: vec![
                asset(now, AssetKind::Cover, "code-shadows-cover.jpg", 10),
                asset(now, AssetKind::Interior, "code-shadows-interior.pdf", 8),
            ],
            notes: "Ready for final review. Scheduling publication for next week.",
            created_days_ago: 40,
            updated_days_ago: 2,
        },
        Example {
            stage: Stage::Format,
            metadata: Metadata {
                pen_name: Some("L. Breeze".to_string()),
                series: Some("Nature's Voice".to_string()),
                trim: Some("5x8".to_string()),
                keywords: labels(&["poetry", "nature", "mindfulness", "meditation", "inspiration"]),
                categories: labels(&["Poetry", "Nature", "Self-Help"]),
                blurb: "A collection of poems that capture the essence of nature's wisdom, \
                        inviting readers to pause, breathe, and reconnect with the world around them."
                    .to_string(),
                ..Metadata::new("Whispers in the Wind", "Anonymous Poet")
            },
            checklist: checklist(now, 10, |i| i >= 10, 10),
            assets: vec![asset(now, AssetKind::Cover, "whispers-cover.jpg", 15)],
            notes: "Cover approved. Interior formatting in progress.",
            created_days_ago: 35,
            updated_days_ago: 5,
        },
        Example {
            stage: Stage::Cover,
            metadata: Metadata {
                subtitle: Some("Letters from a Lighthouse".to_string()),
                trim: Some("5.25x8".to_string()),
                keywords: labels(&["literary fiction", "sea", "family", "letters"]),
                categories: labels(&["Fiction", "Literary", "Family Life"]),
                blurb: "Three generations of lighthouse keepers, one box of unsent letters, and \
                        a storm that finally brings them all home."
                    .to_string(),
                ..Metadata::new("Salt and Starlight", "Anonymous Novelist")
            },
            checklist: checklist(now, 1, |i| i == 1, 4),
            assets: Vec::new(),
            notes: "Manuscript edited. Briefing two cover designers this week.",
            created_days_ago: 30,
            updated_days_ago: 4,
        },
        Example {
            stage: Stage::Edit,
            metadata: Metadata {
                subtitle: Some("When AI Became Self-Aware".to_string()),
                keywords: labels(&["science fiction", "artificial intelligence", "dystopia", "technology"]),
                categories: labels(&["Fiction", "Science Fiction", "Dystopian"]),
                blurb: "In the year 2045, the world's most advanced AI makes a discovery that \
                        changes everything. But is humanity ready for the truth?"
                    .to_string(),
                ..Metadata::new("The Last Algorithm", "Anonymous Futurist")
            },
            checklist: checklist(now, 3, |i| i == 3, 7),
            assets: Vec::new(),
            notes: "First draft complete. Currently in revision phase. Need to finalize cover \
                    design concepts.",
            created_days_ago: 25,
            updated_days_ago: 1,
        },
        Example {
            stage: Stage::Draft,
            metadata: Metadata {
                subtitle: Some("Culinary Adventures in Imaginary Lands".to_string()),
                pen_name: Some("Chef Wanderer".to_string()),
                trim: Some("7x10".to_string()),
                keywords: labels(&["cookbook", "fantasy", "recipes", "cooking", "adventure"]),
                categories: labels(&["Cooking", "Fantasy", "Creative"]),
                blurb: "What if your favorite fantasy worlds had their own cuisines? This \
                        cookbook brings fictional recipes to life, from dragon-roasted \
                        vegetables to elvish honey cakes."
                    .to_string(),
                ..Metadata::new("Recipes from Nowhere", "Anonymous Chef")
            },
            checklist: checklist(now, 2, |_| false, 0),
            assets: Vec::new(),
            notes: "Recipe testing ongoing. Photography sessions scheduled for next month.",
            created_days_ago: 15,
            updated_days_ago: 3,
        },
    ]
}

/// Build the seed document relative to `now`
pub fn initial_state(now: DateTime<Utc>) -> AppState {
    let projects: Vec<Project> = examples(now)
        .into_iter()
        .map(|example| Project {
            id: generate_id(),
            stage: example.stage,
            metadata: example.metadata,
            checklist: example.checklist,
            assets: example.assets,
            notes: example.notes.to_string(),
            created_at: days_ago(now, example.created_days_ago),
            updated_at: days_ago(now, example.updated_days_ago),
        })
        .collect();

    let mut activities: Vec<Activity> = projects
        .iter()
        .map(|project| Activity {
            id: generate_id(),
            project_id: project.id.clone(),
            kind: ActivityKind::Created,
            description: format!("Project \"{}\" created", project.metadata.title),
            timestamp: project.created_at.clone(),
        })
        .collect();
    // Most recent first; timestamps share one format so string order is time order
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    AppState {
        version: CURRENT_SCHEMA_VERSION,
        projects,
        tasks: Vec::new(),
        activities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_app_state;
    use std::collections::HashSet;

    #[test]
    fn test_seed_spans_every_stage() {
        let state = initial_state(Utc::now());
        let stages: HashSet<Stage> = state.projects.iter().map(|p| p.stage).collect();
        assert_eq!(stages.len(), Stage::ALL.len());
        assert_eq!(state.version, CURRENT_SCHEMA_VERSION);
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn test_seed_activity_per_project_newest_first() {
        let state = initial_state(Utc::now());
        assert_eq!(state.activities.len(), state.projects.len());
        assert!(state
            .activities
            .iter()
            .all(|a| a.kind == ActivityKind::Created));
        assert!(state
            .activities
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
        // The newest seed project is the draft-stage cookbook
        assert!(state.activities[0].description.contains("Recipes from Nowhere"));
    }

    #[test]
    fn test_seed_shape_is_stable_but_ids_are_fresh() {
        let now = Utc::now();
        let first = initial_state(now);
        let second = initial_state(now);

        let titles = |s: &AppState| -> Vec<String> {
            s.projects.iter().map(|p| p.metadata.title.clone()).collect()
        };
        assert_eq!(titles(&first), titles(&second));
        assert_ne!(first.projects[0].id, second.projects[0].id);

        let ids: HashSet<&str> = first
            .projects
            .iter()
            .flat_map(|p| std::iter::once(p.id.as_str()).chain(p.checklist.iter().map(|c| c.id.as_str())))
            .collect();
        let expected = first.projects.len() * (1 + BASE_CHECKLIST.len());
        assert_eq!(ids.len(), expected);
    }

    #[test]
    fn test_seed_checklists_follow_progress() {
        let state = initial_state(Utc::now());
        let marketing = state.projects.iter().find(|p| p.stage == Stage::Marketing).unwrap();
        assert_eq!(marketing.completed_checklist_items(), BASE_CHECKLIST.len());

        let publish = state.projects.iter().find(|p| p.stage == Stage::Publish).unwrap();
        assert_eq!(publish.completed_checklist_items(), 7);
        assert!(publish.checklist[7..].iter().all(|item| item.due_date.is_some()));
        assert!(publish.checklist[..7].iter().all(|item| item.due_date.is_none()));
    }

    #[test]
    fn test_seed_passes_strict_validation() {
        let state = initial_state(Utc::now());
        let raw = serde_json::to_value(&state).unwrap();
        assert_eq!(validate_app_state(raw).unwrap(), state);
    }
}
