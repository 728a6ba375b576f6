//! Query engine: filtered, sorted and time-based views over a task snapshot,
//! plus the statistics shown on the dashboard.
//!
//! Every function here is pure. The current moment is passed in by the caller.
//!
//! Two different "overdue" checks exist on purpose:
//! - [`is_overdue`] works at day granularity (due before the start of today).
//!   It feeds [`aggregate`] and the overdue colouring of task rows.
//! - [`is_past_due`] compares full timestamps (due before now).
//!   It feeds [`time_filter`] with [`TimeView::Overdue`].
//!
//! A task due today at 07:00 seen at 08:00 is past due but not overdue.

use chrono::{DateTime, Duration, Local, NaiveDate};
use now::DateTimeNow;
use std::cmp::Ordering;

use crate::app::models::{FilterSpec, Status, Task, TaskStats, TimeView};

pub fn start_of_day(now: &DateTime<Local>) -> DateTime<Local> {
    now.beginning_of_day()
}

// Due date falls on the same local calendar day as `now`
pub fn is_due_today(task: &Task, now: &DateTime<Local>) -> bool {
    match task.due_date {
        Some(due) => due.date_naive() == now.date_naive(),
        None => false,
    }
}

/// Day-granularity overdue check: due before the start of today and not completed.
pub fn is_overdue(task: &Task, now: &DateTime<Local>) -> bool {
    match task.due_date {
        Some(due) => !task.is_completed() && due < start_of_day(now),
        None => false,
    }
}

/// Timestamp-granularity check: due strictly before `now` and not completed.
pub fn is_past_due(task: &Task, now: &DateTime<Local>) -> bool {
    match task.due_date {
        Some(due) => !task.is_completed() && due < *now,
        None => false,
    }
}

/// Returns whether `task` satisfies every constraint present in `spec`.
pub fn matches(task: &Task, spec: &FilterSpec) -> bool {
    if let Some(category) = &spec.category {
        if !category.matches(&task.category) {
            return false;
        }
    }
    if let Some(priority) = &spec.priority {
        if !priority.matches(&task.priority) {
            return false;
        }
    }
    if let Some(status) = &spec.status {
        if !status.matches(&task.status) {
            return false;
        }
    }
    if let Some(term) = spec.search_term() {
        let term = term.to_lowercase();
        let found = task.title.to_lowercase().contains(&term)
            || task.description.to_lowercase().contains(&term)
            || task.tags.iter().any(|tag| tag.to_lowercase().contains(&term));
        if !found {
            return false;
        }
    }
    true
}

pub fn filter<'a>(tasks: &'a [Task], spec: &FilterSpec) -> Vec<&'a Task> {
    tasks.iter().filter(|task| matches(task, spec)).collect()
}

/// Total task order: priority descending, then tasks with a due date first
/// (earliest first), then newest `created_at` first.
pub fn compare(a: &Task, b: &Task) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn sort<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    // sort_by is stable, equal keys keep their input order
    sorted.sort_by(|a, b| compare(a, b));
    sorted
}

pub fn time_filter<'a>(tasks: &'a [Task], view: TimeView, now: &DateTime<Local>) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| in_time_view(task, view, now))
        .collect()
}

fn in_time_view(task: &Task, view: TimeView, now: &DateTime<Local>) -> bool {
    match view {
        TimeView::Today => is_due_today(task, now) && !task.is_completed(),
        TimeView::Overdue => is_past_due(task, now),
        TimeView::Completed => task.is_completed(),
    }
}

// The task list pipeline: optional time view, then the filter spec, then the sort order
pub fn query<'a>(
    tasks: &'a [Task],
    spec: &FilterSpec,
    view: Option<TimeView>,
    now: &DateTime<Local>,
) -> Vec<&'a Task> {
    sort(tasks.iter().filter(|task| {
        view.map_or(true, |view| in_time_view(task, view, now)) && matches(task, spec)
    }))
}

pub fn aggregate(tasks: &[Task], now: &DateTime<Local>) -> TaskStats {
    let completed = tasks
        .iter()
        .filter(|task| task.status == Status::Completed)
        .count();
    let pending = tasks.iter().filter(|task| task.status.is_pending()).count();
    let overdue = tasks.iter().filter(|task| is_overdue(task, now)).count();
    let total_time_minutes = tasks.iter().map(|task| u64::from(task.estimated_time)).sum();

    TaskStats {
        completed,
        pending,
        overdue,
        total_time_minutes,
        productivity_percent: percent(completed, tasks.len()),
    }
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u8
}

/// Everything the dashboard view shows, derived from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary<'a> {
    pub total: usize,
    pub stats: TaskStats,
    pub focus_hours: u64,
    pub average_minutes: u64,
    /// At most [`DashboardSummary::TODAY_PREVIEW`] of today's tasks, sorted.
    pub today: Vec<&'a Task>,
    pub more_today: usize,
}

impl<'a> DashboardSummary<'a> {
    pub const TODAY_PREVIEW: usize = 3;

    pub fn from_tasks(tasks: &'a [Task], now: &DateTime<Local>) -> DashboardSummary<'a> {
        let stats = aggregate(tasks, now);
        let mut today = sort(time_filter(tasks, TimeView::Today, now));
        let more_today = today.len().saturating_sub(Self::TODAY_PREVIEW);
        today.truncate(Self::TODAY_PREVIEW);

        let average_minutes = if tasks.is_empty() {
            0
        } else {
            (stats.total_time_minutes as f64 / tasks.len() as f64).round() as u64
        };

        DashboardSummary {
            total: tasks.len(),
            stats,
            focus_hours: (stats.total_time_minutes as f64 / 60.0).round() as u64,
            average_minutes,
            today,
            more_today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    /// Weekday abbreviation, e.g. "Mon".
    pub label: String,
    pub completed: u64,
}

// Completions per day for the seven days ending today, oldest first
pub fn weekly_completions(tasks: &[Task], now: &DateTime<Local>) -> Vec<DayCount> {
    let today = now.date_naive();
    (0..7)
        .rev()
        .map(|days_back| {
            let date = today - Duration::days(days_back);
            let completed = tasks
                .iter()
                .filter_map(|task| task.completed_at)
                .filter(|completed_at| completed_at.date_naive() == date)
                .count() as u64;
            DayCount {
                date,
                label: date.format("%a").to_string(),
                completed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{Category, Criterion, Priority};
    use crate::app::test_support::{at, task};
    use pretty_assertions::assert_eq;

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|task| task.title.clone()).collect()
    }

    #[test]
    fn filter_ands_all_present_fields() {
        let mut report = task("Write report", Priority::High);
        report.category = Category::Work;
        let mut run = task("Evening run", Priority::High);
        run.category = Category::Health;
        let mut memo = task("Work memo", Priority::Low);
        memo.category = Category::Work;
        let tasks = vec![report, run, memo];

        let spec = FilterSpec {
            category: Some(Criterion::Is(Category::Work)),
            priority: Some(Criterion::Is(Priority::High)),
            ..FilterSpec::default()
        };
        assert_eq!(titles(&filter(&tasks, &spec)), vec!["Write report"]);
        assert_eq!(filter(&tasks, &FilterSpec::default()).len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_over_title_description_and_tags() {
        let bug = task("Fix Bug", Priority::Medium);
        let mut described = task("Payments", Priority::Medium);
        described.description = "Checkout BUG in production".to_string();
        let mut tagged = task("Triage", Priority::Medium);
        tagged.tags = vec!["bugfix".to_string()];
        let unrelated = task("Groceries", Priority::Medium);
        let tasks = vec![bug, described, tagged, unrelated];

        let spec = FilterSpec {
            search: Some("bug".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(
            titles(&filter(&tasks, &spec)),
            vec!["Fix Bug", "Payments", "Triage"]
        );
    }

    #[test]
    fn search_spaces_are_part_of_the_term() {
        let mut tagged = task("Triage", Priority::Medium);
        tagged.tags = vec!["bugfix".to_string()];
        let prefixed = task("Rename prefix", Priority::Medium);
        let tasks = vec![tagged, prefixed];

        let leading = FilterSpec {
            search: Some(" bug".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(filter(&tasks, &leading).len(), 0);

        let trailing = FilterSpec {
            search: Some("fix ".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(filter(&tasks, &trailing).len(), 0);

        let word = FilterSpec {
            search: Some(" prefix".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(titles(&filter(&tasks, &word)), vec!["Rename prefix"]);
    }

    #[test]
    fn unrecognized_filter_value_yields_empty_result() {
        let tasks = vec![task("A", Priority::Low), task("B", Priority::High)];
        let spec = FilterSpec {
            status: Some(Criterion::parse("blocked")),
            ..FilterSpec::default()
        };
        assert!(filter(&tasks, &spec).is_empty());
    }

    #[test]
    fn sort_puts_priority_before_due_date() {
        let mut a = task("A", Priority::Urgent);
        a.due_date = Some(at(2024, 5, 11, 9, 0));
        let b = task("B", Priority::Low);
        let tasks = vec![b, a];
        assert_eq!(titles(&sort(&tasks)), vec!["A", "B"]);
    }

    #[test]
    fn sort_breaks_ties_by_due_date_then_newest() {
        let mut later = task("later", Priority::High);
        later.due_date = Some(at(2024, 5, 20, 9, 0));
        let mut sooner = task("sooner", Priority::High);
        sooner.due_date = Some(at(2024, 5, 12, 9, 0));
        let mut old = task("old", Priority::High);
        old.created_at = at(2024, 5, 1, 9, 0);
        let mut new = task("new", Priority::High);
        new.created_at = at(2024, 5, 9, 9, 0);
        let tasks = vec![old, later, new, sooner];

        assert_eq!(
            titles(&sort(&tasks)),
            vec!["sooner", "later", "new", "old"]
        );
    }

    #[test]
    fn sort_is_idempotent() {
        let mut tasks = Vec::new();
        for (i, priority) in Priority::ALL.iter().cycle().take(12).enumerate() {
            let mut t = task(&format!("t{i}"), *priority);
            if i % 3 == 0 {
                t.due_date = Some(at(2024, 5, 10 + (i as u32 % 5), 12, 0));
            }
            t.created_at = at(2024, 5, 1 + (i as u32 % 4), 8, 0);
            tasks.push(t);
        }
        let once = sort(&tasks);
        let twice = sort(once.iter().copied());
        assert_eq!(once, twice);
    }

    #[test]
    fn today_view_uses_calendar_day() {
        let now = at(2024, 5, 10, 8, 0);
        let mut tonight = task("tonight", Priority::Medium);
        tonight.due_date = Some(at(2024, 5, 10, 23, 59));
        let mut tomorrow = task("tomorrow", Priority::Medium);
        tomorrow.due_date = Some(at(2024, 5, 11, 0, 30));
        let mut done = task("done", Priority::Medium);
        done.due_date = Some(at(2024, 5, 10, 12, 0));
        done.status = Status::Completed;
        done.completed_at = Some(now);
        let tasks = vec![tonight, tomorrow, done];

        assert_eq!(
            titles(&time_filter(&tasks, TimeView::Today, &now)),
            vec!["tonight"]
        );
        assert!(!is_overdue(&tasks[0], &now));
        assert!(!is_past_due(&tasks[0], &now));
    }

    #[test]
    fn overdue_granularities_differ_for_earlier_today() {
        let now = at(2024, 5, 10, 8, 0);
        let mut early = task("early", Priority::Medium);
        early.due_date = Some(at(2024, 5, 10, 7, 0));
        let mut yesterday = task("yesterday", Priority::Medium);
        yesterday.due_date = Some(at(2024, 5, 9, 18, 0));
        let tasks = vec![early, yesterday];

        assert!(is_past_due(&tasks[0], &now));
        assert!(!is_overdue(&tasks[0], &now));
        assert_eq!(
            titles(&time_filter(&tasks, TimeView::Overdue, &now)),
            vec!["early", "yesterday"]
        );
        assert_eq!(aggregate(&tasks, &now).overdue, 1);
    }

    #[test]
    fn aggregate_counts_by_status() {
        let now = at(2024, 5, 10, 8, 0);
        let mut tasks = Vec::new();
        for (i, status) in [
            Status::Todo,
            Status::InProgress,
            Status::Completed,
            Status::Archived,
            Status::Completed,
        ]
        .into_iter()
        .enumerate()
        {
            let mut t = task(&format!("t{i}"), Priority::Low);
            t.status = status;
            t.estimated_time = 30;
            tasks.push(t);
        }
        tasks[3].due_date = Some(at(2024, 5, 1, 9, 0));
        tasks[4].due_date = Some(at(2024, 5, 1, 9, 0));

        let stats = aggregate(&tasks, &now);
        assert_eq!(
            stats,
            TaskStats {
                completed: 2,
                pending: 2,
                overdue: 1,
                total_time_minutes: 150,
                productivity_percent: 40,
            }
        );
    }

    #[test]
    fn aggregate_of_empty_collection_is_zero() {
        let stats = aggregate(&[], &at(2024, 5, 10, 8, 0));
        assert_eq!(stats, TaskStats::default());
    }

    #[test]
    fn productivity_rounds_to_nearest_percent() {
        let now = at(2024, 5, 10, 8, 0);
        let mut tasks = vec![
            task("a", Priority::Low),
            task("b", Priority::Low),
            task("c", Priority::Low),
        ];
        tasks[0].status = Status::Completed;
        tasks[1].status = Status::Completed;
        assert_eq!(aggregate(&tasks, &now).productivity_percent, 67);
    }

    #[test]
    fn query_combines_view_filter_and_sort() {
        let now = at(2024, 5, 10, 8, 0);
        let mut low = task("low", Priority::Low);
        low.due_date = Some(at(2024, 5, 10, 17, 0));
        let mut urgent = task("urgent", Priority::Urgent);
        urgent.due_date = Some(at(2024, 5, 10, 12, 0));
        let mut later = task("later", Priority::Urgent);
        later.due_date = Some(at(2024, 6, 1, 12, 0));
        let tasks = vec![low, urgent, later];

        let result = query(&tasks, &FilterSpec::default(), Some(TimeView::Today), &now);
        assert_eq!(titles(&result), vec!["urgent", "low"]);
    }

    #[test]
    fn dashboard_summary_previews_three_tasks_due_today() {
        let now = at(2024, 5, 10, 8, 0);
        let tasks: Vec<Task> = (0..5)
            .map(|i| {
                let mut t = task(&format!("t{i}"), Priority::Medium);
                t.due_date = Some(at(2024, 5, 10, 10 + i, 0));
                t.estimated_time = 45;
                t
            })
            .collect();

        let summary = DashboardSummary::from_tasks(&tasks, &now);
        assert_eq!(summary.total, 5);
        assert_eq!(titles(&summary.today), vec!["t0", "t1", "t2"]);
        assert_eq!(summary.more_today, 2);
        assert_eq!(summary.focus_hours, 4);
        assert_eq!(summary.average_minutes, 45);
    }

    #[test]
    fn weekly_completions_cover_the_last_seven_days() {
        let now = at(2024, 5, 10, 20, 0);
        let mut done_today = task("today", Priority::Low);
        done_today.status = Status::Completed;
        done_today.completed_at = Some(at(2024, 5, 10, 9, 0));
        let mut done_monday = task("monday", Priority::Low);
        done_monday.status = Status::Completed;
        done_monday.completed_at = Some(at(2024, 5, 6, 9, 0));
        let mut too_old = task("old", Priority::Low);
        too_old.status = Status::Completed;
        too_old.completed_at = Some(at(2024, 5, 3, 9, 0));
        let tasks = vec![done_today, done_monday, too_old];

        let week = weekly_completions(&tasks, &now);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].label, "Sat");
        assert_eq!(week[6].label, "Fri");
        assert_eq!(
            week.iter().map(|day| day.completed).collect::<Vec<_>>(),
            vec![0, 0, 1, 0, 0, 0, 1]
        );
    }
}
