//! Read-only queries over the document: the dashboard, the workflow board and
//! per-project task lists.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::clock::{parse_date, parse_instant};
use crate::constants::{RECENT_ACTIVITY_LIMIT, UPCOMING_DEADLINE_LIMIT};
use crate::models::{Activity, AppState, Project, Stage, Task, TaskStatus, UnknownVariant};
use crate::search::{parse_search_terms, project_matches};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: Stage,
    pub label: &'static str,
    pub count: usize,
}

/// Number of projects in every stage, in workflow order (zero counts included)
pub fn stage_counts(state: &AppState) -> Vec<StageCount> {
    Stage::ALL
        .iter()
        .map(|&stage| StageCount {
            stage,
            label: stage.label(),
            count: state.projects.iter().filter(|p| p.stage == stage).count(),
        })
        .collect()
}

/// Projects matching `query` (see [`crate::search`]); all of them for an empty query
pub fn search_projects<'a>(state: &'a AppState, query: &str) -> Vec<&'a Project> {
    let terms = parse_search_terms(query);
    state
        .projects
        .iter()
        .filter(|p| project_matches(p, &terms))
        .collect()
}

/// Board columns: every stage in order with the matching projects in it
pub fn projects_by_stage<'a>(state: &'a AppState, query: &str) -> Vec<(Stage, Vec<&'a Project>)> {
    let matching = search_projects(state, query);
    Stage::ALL
        .iter()
        .map(|&stage| {
            let column = matching.iter().copied().filter(|p| p.stage == stage).collect();
            (stage, column)
        })
        .collect()
}

/// Newest `limit` activities
pub fn recent_activities(state: &AppState, limit: usize) -> &[Activity] {
    let end = limit.min(state.activities.len());
    &state.activities[..end]
}

/// Open checklist item with a due date, flattened across projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingItem {
    pub project_id: String,
    pub project_title: String,
    pub item_id: String,
    pub label: String,
    pub due_date: String,
}

/// Uncompleted checklist items that have a due date, soonest first.
/// Dates that do not parse sort last.
pub fn upcoming_checklist_items(state: &AppState, limit: usize) -> Vec<UpcomingItem> {
    let mut items: Vec<UpcomingItem> = state
        .projects
        .iter()
        .flat_map(|project| {
            project
                .checklist
                .iter()
                .filter(|item| !item.completed)
                .filter_map(move |item| {
                    let due_date = item.due_date.clone()?;
                    Some(UpcomingItem {
                        project_id: project.id.clone(),
                        project_title: project.metadata.title.clone(),
                        item_id: item.id.clone(),
                        label: item.label.clone(),
                        due_date,
                    })
                })
        })
        .collect();

    items.sort_by_key(|item| {
        let due = parse_instant(&item.due_date);
        (due.is_none(), due)
    });
    items.truncate(limit);
    items
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Todo,
    Doing,
    Done,
    /// Due before today and not done
    Overdue,
    /// Due within today's Sunday-to-Saturday week
    ThisWeek,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 6] = [
        TaskFilter::All,
        TaskFilter::Todo,
        TaskFilter::Doing,
        TaskFilter::Done,
        TaskFilter::Overdue,
        TaskFilter::ThisWeek,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Todo => "todo",
            TaskFilter::Doing => "doing",
            TaskFilter::Done => "done",
            TaskFilter::Overdue => "overdue",
            TaskFilter::ThisWeek => "week",
        }
    }

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Todo => task.status == TaskStatus::Todo,
            TaskFilter::Doing => task.status == TaskStatus::Doing,
            TaskFilter::Done => task.status == TaskStatus::Done,
            TaskFilter::Overdue => is_overdue(task, today),
            TaskFilter::ThisWeek => task_due_date(task).is_some_and(|due| in_week_of(due, today)),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for TaskFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "todo" => Ok(TaskFilter::Todo),
            "doing" => Ok(TaskFilter::Doing),
            "done" => Ok(TaskFilter::Done),
            "overdue" => Ok(TaskFilter::Overdue),
            "week" | "this-week" => Ok(TaskFilter::ThisWeek),
            _ => Err(UnknownVariant::new("task filter", s)),
        }
    }
}

fn task_due_date(task: &Task) -> Option<NaiveDate> {
    task.due_date.as_deref().and_then(parse_date)
}

pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.status != TaskStatus::Done && task_due_date(task).is_some_and(|due| due < today)
}

fn in_week_of(date: NaiveDate, today: NaiveDate) -> bool {
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    let end = start + Duration::days(6);
    (start..=end).contains(&date)
}

/// Tasks of one project that pass `filter`, in document order
pub fn tasks_for_project<'a>(
    state: &'a AppState,
    project_id: &str,
    filter: TaskFilter,
    today: NaiveDate,
) -> Vec<&'a Task> {
    state
        .tasks
        .iter()
        .filter(|t| t.project_id == project_id && filter.matches(t, today))
        .collect()
}

/// Count per filter, as shown on the task list tabs
pub fn task_filter_counts(
    state: &AppState,
    project_id: &str,
    today: NaiveDate,
) -> Vec<(TaskFilter, usize)> {
    TaskFilter::ALL
        .iter()
        .map(|&filter| (filter, tasks_for_project(state, project_id, filter, today).len()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Whole percent, rounded down; 0 when there is nothing to do
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.completed * 100 / self.total) as u8
    }
}

pub fn checklist_progress(project: &Project) -> Progress {
    Progress {
        completed: project.completed_checklist_items(),
        total: project.checklist.len(),
    }
}

pub fn task_progress(state: &AppState, project_id: &str) -> Progress {
    let mut progress = Progress {
        completed: 0,
        total: 0,
    };
    for task in state.tasks_for_project(project_id) {
        progress.total += 1;
        if task.status == TaskStatus::Done {
            progress.completed += 1;
        }
    }
    progress
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_projects: usize,
    pub stage_counts: Vec<StageCount>,
    pub recent_activities: Vec<Activity>,
    pub upcoming: Vec<UpcomingItem>,
}

pub fn dashboard(state: &AppState) -> Dashboard {
    Dashboard {
        total_projects: state.projects.len(),
        stage_counts: stage_counts(state),
        recent_activities: recent_activities(state, RECENT_ACTIVITY_LIMIT).to_vec(),
        upcoming: upcoming_checklist_items(state, UPCOMING_DEADLINE_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityKind, ChecklistItem, Metadata, Platform};
    use crate::seed::initial_state;
    use chrono::Utc;

    fn project(id: &str, title: &str, stage: Stage) -> Project {
        Project {
            id: id.to_string(),
            stage,
            metadata: Metadata::new(title, "Author"),
            checklist: Vec::new(),
            assets: Vec::new(),
            notes: String::new(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn item(id: &str, completed: bool, due_date: Option<&str>) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            label: format!("item {id}"),
            platform: Platform::Both,
            completed,
            due_date: due_date.map(str::to_string),
        }
    }

    fn task(id: &str, status: TaskStatus, due_date: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: id.to_string(),
            description: None,
            status,
            due_date: due_date.map(str::to_string),
            owner: None,
            tags: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_stage_counts_cover_every_stage() {
        let state = AppState {
            projects: vec![
                project("a", "A", Stage::Edit),
                project("b", "B", Stage::Edit),
                project("c", "C", Stage::Marketing),
            ],
            ..AppState::default()
        };
        let counts = stage_counts(&state);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts[0].stage, Stage::Draft);
        assert_eq!(counts[0].count, 0);
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[5].count, 1);
    }

    #[test]
    fn test_projects_by_stage_with_search() {
        let state = initial_state(Utc::now());
        let board = projects_by_stage(&state, "");
        assert_eq!(board.len(), 6);
        assert!(board.iter().all(|(_, projects)| projects.len() == 1));

        let board = projects_by_stage(&state, "midnight");
        let hits: usize = board.iter().map(|(_, projects)| projects.len()).sum();
        assert_eq!(hits, 1);
        assert_eq!(board[5].1[0].title(), "The Midnight Garden");

        // Pen names are searchable
        assert_eq!(search_projects(&state, "chef wanderer").len(), 1);
    }

    #[test]
    fn test_recent_activities_limit() {
        let state = initial_state(Utc::now());
        assert_eq!(recent_activities(&state, 3).len(), 3);
        assert_eq!(recent_activities(&state, 100).len(), state.activities.len());
        assert_eq!(recent_activities(&state, 1)[0].kind, ActivityKind::Created);
    }

    #[test]
    fn test_upcoming_items_sorted_soonest_first() {
        let mut a = project("a", "A", Stage::Edit);
        a.checklist = vec![
            item("late", false, Some("2024-09-01T00:00:00.000Z")),
            item("done", true, Some("2024-01-01T00:00:00.000Z")),
            item("undated", false, None),
        ];
        let mut b = project("b", "B", Stage::Cover);
        b.checklist = vec![
            item("soon", false, Some("2024-03-01")),
            item("garbled", false, Some("someday")),
        ];
        let state = AppState {
            projects: vec![a, b],
            ..AppState::default()
        };

        let upcoming = upcoming_checklist_items(&state, 5);
        let ids: Vec<&str> = upcoming.iter().map(|u| u.item_id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "late", "garbled"]);
        assert_eq!(upcoming[0].project_title, "B");

        assert_eq!(upcoming_checklist_items(&state, 1).len(), 1);
    }

    #[test]
    fn test_task_filters() {
        // 2024-05-15 is a Wednesday; its week runs 2024-05-12 to 2024-05-18
        let today = date("2024-05-15");
        let state = AppState {
            projects: vec![project("p1", "Book", Stage::Edit)],
            tasks: vec![
                task("overdue", TaskStatus::Todo, Some("2024-05-10")),
                task("done-late", TaskStatus::Done, Some("2024-05-01")),
                task("sunday", TaskStatus::Doing, Some("2024-05-12")),
                task("saturday", TaskStatus::Todo, Some("2024-05-18T23:00:00.000Z")),
                task("next-week", TaskStatus::Todo, Some("2024-05-19")),
                task("undated", TaskStatus::Done, None),
            ],
            ..AppState::default()
        };
        let ids = |filter| -> Vec<String> {
            tasks_for_project(&state, "p1", filter, today)
                .iter()
                .map(|t| t.id.clone())
                .collect()
        };

        assert_eq!(ids(TaskFilter::All).len(), 6);
        assert_eq!(ids(TaskFilter::Todo), vec!["overdue", "saturday", "next-week"]);
        assert_eq!(ids(TaskFilter::Doing), vec!["sunday"]);
        assert_eq!(ids(TaskFilter::Done), vec!["done-late", "undated"]);
        assert_eq!(ids(TaskFilter::Overdue), vec!["overdue", "sunday"]);
        assert_eq!(ids(TaskFilter::ThisWeek), vec!["sunday", "saturday"]);
        assert!(tasks_for_project(&state, "other", TaskFilter::All, today).is_empty());

        let counts = task_filter_counts(&state, "p1", today);
        assert_eq!(counts[4], (TaskFilter::Overdue, 2));
    }

    #[test]
    fn test_task_filter_parse() {
        assert_eq!("week".parse::<TaskFilter>().unwrap(), TaskFilter::ThisWeek);
        assert_eq!("Overdue".parse::<TaskFilter>().unwrap(), TaskFilter::Overdue);
        assert!("later".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn test_progress() {
        let mut p = project("p1", "Book", Stage::Edit);
        assert_eq!(checklist_progress(&p).percent(), 0);
        p.checklist = vec![item("a", true, None), item("b", false, None), item("c", false, None)];
        let progress = checklist_progress(&p);
        assert_eq!(progress, Progress { completed: 1, total: 3 });
        assert_eq!(progress.percent(), 33);

        let state = AppState {
            projects: vec![p],
            tasks: vec![
                task("a", TaskStatus::Done, None),
                task("b", TaskStatus::Doing, None),
            ],
            ..AppState::default()
        };
        assert_eq!(task_progress(&state, "p1"), Progress { completed: 1, total: 2 });
    }

    #[test]
    fn test_dashboard_defaults() {
        let state = initial_state(Utc::now());
        let dashboard = dashboard(&state);
        assert_eq!(dashboard.total_projects, 6);
        assert_eq!(dashboard.stage_counts.iter().map(|c| c.count).sum::<usize>(), 6);
        assert!(dashboard.recent_activities.len() <= RECENT_ACTIVITY_LIMIT);
        assert_eq!(dashboard.upcoming.len(), UPCOMING_DEADLINE_LIMIT);
        assert!(dashboard
            .upcoming
            .windows(2)
            .all(|pair| pair[0].due_date <= pair[1].due_date));
    }
}
