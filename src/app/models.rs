//! Task data model shared by the store, the query engine and the suggestion rules.
//!
//! Derived values (`TaskStats`, `Suggestion`) are never stored; they are
//! recomputed from the current task snapshot.

use chrono::{DateTime, Local};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::UnknownVariant;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Work,
    Personal,
    Health,
    Learning,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Learning,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Learning => "learning",
            Category::Other => "other",
        }
    }
}

/// Urgency of a task. The derived order is low < medium < high < urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Numeric weight used by the task ordering (urgent = 4 ... low = 1).
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Todo,
    InProgress,
    Completed,
    Archived,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Completed,
        Status::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
            Status::Archived => "archived",
        }
    }

    /// Todo and in-progress tasks count as pending; archived ones do not.
    pub fn is_pending(self) -> bool {
        matches!(self, Status::Todo | Status::InProgress)
    }
}

macro_rules! impl_text_conversions {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == wanted)
                    .ok_or_else(|| UnknownVariant(s.to_string()))
            }
        }
    };
}

impl_text_conversions!(Category);
impl_text_conversions!(Priority);
impl_text_conversions!(Status);

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<DateTime<Local>>,
    /// Minutes, always positive.
    pub estimated_time: u32,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    /// Present exactly when `status == Status::Completed`.
    pub completed_at: Option<DateTime<Local>>,
    pub tags: Vec<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

// Caller-supplied fields of a task that does not exist yet.
// The store assigns the id and all timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<DateTime<Local>>,
    pub estimated_time: u32,
    pub tags: Vec<String>,
}

/// One constraint of a [`FilterSpec`].
///
/// Filter values arriving as text (config file, user input) that do not name a
/// known variant are kept as `Unrecognized`; such a constraint matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion<T> {
    Is(T),
    Unrecognized(String),
}

impl<T: FromStr> Criterion<T> {
    pub fn parse(raw: &str) -> Criterion<T> {
        match raw.parse::<T>() {
            Ok(value) => Criterion::Is(value),
            Err(_) => Criterion::Unrecognized(raw.to_string()),
        }
    }
}

impl<T: PartialEq> Criterion<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Criterion::Is(expected) => expected == value,
            Criterion::Unrecognized(_) => false,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Criterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Is(value) => value.fmt(f),
            Criterion::Unrecognized(raw) => write!(f, "{raw}?"),
        }
    }
}

/// Optional constraints narrowing a task collection; present fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub category: Option<Criterion<Category>>,
    pub priority: Option<Criterion<Priority>>,
    pub status: Option<Criterion<Status>>,
    /// Case-insensitive substring over title, description and tags.
    pub search: Option<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.search_term().is_none()
    }

    // Blank search text imposes no constraint; otherwise the term is used as typed
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|term| !term.trim().is_empty())
    }
}

/// Time-based task views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeView {
    Today,
    Overdue,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub total_time_minutes: u64,
    pub productivity_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    TimeSlot,
    Priority,
}

impl SuggestionKind {
    pub fn label(self) -> &'static str {
        match self {
            SuggestionKind::TimeSlot => "Time Slot",
            SuggestionKind::Priority => "Priority",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub id: Uuid,
    pub task_id: TaskId,
    pub kind: SuggestionKind,
    pub text: String,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
    pub created_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn priority_order_matches_rank() {
        let mut sorted = vec![Priority::High, Priority::Low, Priority::Urgent, Priority::Medium];
        sorted.sort();
        assert_eq!(
            sorted,
            vec![Priority::Low, Priority::Medium, Priority::High, Priority::Urgent]
        );
        assert_eq!(
            Priority::ALL.iter().map(|p| p.rank()).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn enums_parse_their_own_spelling() {
        assert_eq!("in-progress".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!(" Urgent ".parse::<Priority>(), Ok(Priority::Urgent));
        assert_eq!("learning".parse::<Category>(), Ok(Category::Learning));
        assert!("someday".parse::<Status>().is_err());
        for status in Status::ALL {
            assert_eq!(status.to_string().parse::<Status>(), Ok(status));
        }
    }

    #[test]
    fn unrecognized_criterion_matches_nothing() {
        let criterion: Criterion<Category> = Criterion::parse("chores");
        assert_eq!(criterion, Criterion::Unrecognized("chores".to_string()));
        for category in Category::ALL {
            assert!(!criterion.matches(&category));
        }
        assert!(Criterion::parse("work").matches(&Category::Work));
    }

    #[test]
    fn blank_search_is_no_constraint() {
        let spec = FilterSpec {
            search: Some("   ".to_string()),
            ..FilterSpec::default()
        };
        assert!(spec.is_empty());
        assert_eq!(spec.search_term(), None);
    }

    #[test]
    fn search_term_keeps_surrounding_spaces() {
        let spec = FilterSpec {
            search: Some(" bug".to_string()),
            ..FilterSpec::default()
        };
        assert!(!spec.is_empty());
        assert_eq!(spec.search_term(), Some(" bug"));
    }
}
