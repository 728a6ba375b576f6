//! Rule-based task suggestions and productivity insights.
//!
//! The rules live in plain tables ([`TIME_SLOT_RULES`], [`ESCALATION_RULES`],
//! [`COMPLETION_BANDS`]) evaluated first-match-wins. Callers go through the
//! [`SuggestionSource`] trait so the rule book can be replaced without touching
//! call sites.

use chrono::{DateTime, Duration, Local};
use uuid::Uuid;

use crate::app::models::{Priority, Suggestion, SuggestionKind, Task};
use crate::app::query::start_of_day;

/// Bumped whenever a table below changes meaning.
pub const RULESET_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCondition {
    PriorityIs(Priority),
    /// Estimated time strictly greater than this many minutes.
    LongerThan(u32),
}

impl SlotCondition {
    pub fn holds(self, task: &Task) -> bool {
        match self {
            SlotCondition::PriorityIs(priority) => task.priority == priority,
            SlotCondition::LongerThan(minutes) => task.estimated_time > minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRule {
    pub condition: SlotCondition,
    /// Hour of the current day, 0..=23.
    pub hour: u32,
}

pub const TIME_SLOT_RULES: [SlotRule; 3] = [
    SlotRule {
        condition: SlotCondition::PriorityIs(Priority::Urgent),
        hour: 9,
    },
    SlotRule {
        condition: SlotCondition::PriorityIs(Priority::High),
        hour: 10,
    },
    SlotRule {
        condition: SlotCondition::LongerThan(120),
        hour: 14,
    },
];
pub const DEFAULT_SLOT_HOUR: u32 = 15;
pub const TIME_SLOT_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityMatch {
    Is(Priority),
    IsNot(Priority),
}

impl PriorityMatch {
    pub fn holds(self, priority: Priority) -> bool {
        match self {
            PriorityMatch::Is(expected) => priority == expected,
            PriorityMatch::IsNot(excluded) => priority != excluded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationRule {
    /// Fires when the whole-day distance to the due date is at most this.
    pub max_days_until_due: i64,
    pub applies_to: PriorityMatch,
    /// Human label of the suggested priority.
    pub target: &'static str,
    pub confidence: f64,
    pub reasoning: &'static str,
}

pub const ESCALATION_RULES: [EscalationRule; 2] = [
    EscalationRule {
        max_days_until_due: 1,
        applies_to: PriorityMatch::IsNot(Priority::Urgent),
        target: "Urgent",
        confidence: 0.92,
        reasoning: "Task is due within 24 hours. Urgent priority ensures it gets immediate attention.",
    },
    EscalationRule {
        max_days_until_due: 3,
        applies_to: PriorityMatch::Is(Priority::Low),
        target: "Medium or High",
        confidence: 0.78,
        reasoning: "Task is due soon. Higher priority helps ensure timely completion.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionBand {
    /// Completion rate (percent) must be strictly above this; `None` always matches.
    pub above: Option<f64>,
    pub message: &'static str,
}

pub const COMPLETION_BANDS: [CompletionBand; 3] = [
    CompletionBand {
        above: Some(80.0),
        message: "🎉 Excellent! You're completing over 80% of your tasks.",
    },
    CompletionBand {
        above: Some(60.0),
        message: "👍 Good job! You're completing most of your tasks consistently.",
    },
    CompletionBand {
        above: None,
        message: "💡 Consider breaking down large tasks into smaller, manageable ones.",
    },
];

pub const LONG_TASK_AVERAGE_MINUTES: f64 = 90.0;
pub const LONG_TASKS_MESSAGE: &str =
    "⏱️ Many of your tasks are lengthy. Try scheduling them during your peak energy hours.";
pub const URGENT_LOAD_LIMIT: usize = 3;
pub const URGENT_LOAD_MESSAGE: &str =
    "🚨 You have many urgent tasks. Consider reviewing your planning process.";

/// Anything able to turn a task snapshot into suggestions and insights.
pub trait SuggestionSource {
    fn suggestions(&self, tasks: &[Task], now: &DateTime<Local>) -> Vec<Suggestion>;
    fn insights(&self, tasks: &[Task]) -> Vec<String>;
}

/// The built-in rule tables.
#[derive(Debug, Clone, Copy)]
pub struct RuleBook {
    pub slot_rules: &'static [SlotRule],
    pub default_hour: u32,
    pub escalation_rules: &'static [EscalationRule],
    pub completion_bands: &'static [CompletionBand],
}

impl Default for RuleBook {
    fn default() -> Self {
        RuleBook {
            slot_rules: &TIME_SLOT_RULES,
            default_hour: DEFAULT_SLOT_HOUR,
            escalation_rules: &ESCALATION_RULES,
            completion_bands: &COMPLETION_BANDS,
        }
    }
}

// Whole days from `now` to `due`, truncated toward zero
pub fn days_until_due(due: &DateTime<Local>, now: &DateTime<Local>) -> i64 {
    (*due - *now).num_days()
}

impl RuleBook {
    pub fn optimal_hour(&self, task: &Task) -> u32 {
        self.slot_rules
            .iter()
            .find(|rule| rule.condition.holds(task))
            .map_or(self.default_hour, |rule| rule.hour)
    }

    pub fn escalation_for(&self, task: &Task, now: &DateTime<Local>) -> Option<&EscalationRule> {
        let due = task.due_date.as_ref()?;
        let days = days_until_due(due, now);
        self.escalation_rules
            .iter()
            .find(|rule| days <= rule.max_days_until_due && rule.applies_to.holds(task.priority))
    }

    fn time_slot(&self, task: &Task, now: &DateTime<Local>) -> Suggestion {
        let slot = start_of_day(now) + Duration::hours(i64::from(self.optimal_hour(task)));
        Suggestion {
            id: Uuid::new_v4(),
            task_id: task.id,
            kind: SuggestionKind::TimeSlot,
            text: format!("Schedule \"{}\" at {}", task.title, slot.format("%-I:%M %p")),
            confidence: TIME_SLOT_CONFIDENCE,
            reasoning: format!(
                "Based on your task priority ({}) and estimated time ({}min), this time slot maximizes focus and energy levels.",
                task.priority, task.estimated_time
            ),
            created_at: *now,
        }
    }

    fn escalation(&self, task: &Task, now: &DateTime<Local>) -> Option<Suggestion> {
        let rule = self.escalation_for(task, now)?;
        Some(Suggestion {
            id: Uuid::new_v4(),
            task_id: task.id,
            kind: SuggestionKind::Priority,
            text: format!(
                "Consider raising \"{}\" priority to {}",
                task.title, rule.target
            ),
            confidence: rule.confidence,
            reasoning: rule.reasoning.to_string(),
            created_at: *now,
        })
    }
}

impl SuggestionSource for RuleBook {
    fn suggestions(&self, tasks: &[Task], now: &DateTime<Local>) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();
        for task in tasks.iter().filter(|task| !task.is_completed()) {
            suggestions.push(self.time_slot(task, now));
            if let Some(escalation) = self.escalation(task, now) {
                suggestions.push(escalation);
            }
        }
        suggestions
    }

    fn insights(&self, tasks: &[Task]) -> Vec<String> {
        let mut insights = Vec::new();
        let open: Vec<&Task> = tasks.iter().filter(|task| !task.is_completed()).collect();

        if !tasks.is_empty() {
            let completed = tasks.len() - open.len();
            let rate = 100.0 * completed as f64 / tasks.len() as f64;
            let band = self
                .completion_bands
                .iter()
                .find(|band| band.above.map_or(true, |threshold| rate > threshold));
            if let Some(band) = band {
                insights.push(band.message.to_string());
            }
        }

        // No open tasks means no average to judge
        if !open.is_empty() {
            let total: u64 = open.iter().map(|task| u64::from(task.estimated_time)).sum();
            let average = total as f64 / open.len() as f64;
            if average > LONG_TASK_AVERAGE_MINUTES {
                insights.push(LONG_TASKS_MESSAGE.to_string());
            }
        }

        let urgent = open
            .iter()
            .filter(|task| task.priority == Priority::Urgent)
            .count();
        if urgent > URGENT_LOAD_LIMIT {
            insights.push(URGENT_LOAD_MESSAGE.to_string());
        }

        insights
    }
}

pub fn generate_suggestions(tasks: &[Task], now: &DateTime<Local>) -> Vec<Suggestion> {
    RuleBook::default().suggestions(tasks, now)
}

pub fn generate_insights(tasks: &[Task]) -> Vec<String> {
    RuleBook::default().insights(tasks)
}
