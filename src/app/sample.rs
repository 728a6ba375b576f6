// Demo tasks loaded on startup when `seed_sample_tasks` is enabled.
// Dates are relative to `now` so the dashboard always has something due soon.
use chrono::{DateTime, Duration, Local};
use uuid::Uuid;

use crate::app::models::{Category, Priority, Status, Task};

struct Seed {
    title: &'static str,
    description: &'static str,
    category: Category,
    priority: Priority,
    status: Status,
    due_in_hours: i64,
    estimated_time: u32,
    created_hours_ago: i64,
    // Hours since the last update; completed seeds also completed then
    updated_hours_ago: i64,
    tags: &'static [&'static str],
}

const SEEDS: [Seed; 8] = [
    Seed {
        title: "Prepare quarterly presentation",
        description: "Create slides for Q4 business review meeting with stakeholders",
        category: Category::Work,
        priority: Priority::High,
        status: Status::Todo,
        due_in_hours: 48,
        estimated_time: 120,
        created_hours_ago: 72,
        updated_hours_ago: 72,
        tags: &["presentation", "business", "quarterly"],
    },
    Seed {
        title: "Morning workout routine",
        description: "30-minute cardio and strength training session",
        category: Category::Health,
        priority: Priority::Medium,
        status: Status::Completed,
        due_in_hours: 0,
        estimated_time: 45,
        created_hours_ago: 120,
        updated_hours_ago: 1,
        tags: &["fitness", "morning", "routine"],
    },
    Seed {
        title: "Learn Rust async patterns",
        description: "Study futures, pinning and executor internals",
        category: Category::Learning,
        priority: Priority::Medium,
        status: Status::InProgress,
        due_in_hours: 168,
        estimated_time: 180,
        created_hours_ago: 48,
        updated_hours_ago: 24,
        tags: &["rust", "async", "backend"],
    },
    Seed {
        title: "Plan weekend trip",
        description: "Research destinations, book accommodation, and plan itinerary",
        category: Category::Personal,
        priority: Priority::Low,
        status: Status::Todo,
        due_in_hours: 120,
        estimated_time: 90,
        created_hours_ago: 24,
        updated_hours_ago: 24,
        tags: &["travel", "vacation", "planning"],
    },
    Seed {
        title: "Fix production bug in payment system",
        description: "Critical bug affecting checkout process - users cannot complete purchases",
        category: Category::Work,
        priority: Priority::Urgent,
        status: Status::Todo,
        due_in_hours: 24,
        estimated_time: 60,
        created_hours_ago: 0,
        updated_hours_ago: 0,
        tags: &["bug", "production", "critical"],
    },
    Seed {
        title: "Weekly meal prep",
        description: "Prepare healthy meals for the upcoming week",
        category: Category::Health,
        priority: Priority::Medium,
        status: Status::Todo,
        due_in_hours: 24,
        estimated_time: 120,
        created_hours_ago: 12,
        updated_hours_ago: 12,
        tags: &["cooking", "health", "weekly"],
    },
    Seed {
        title: "Review team performance reports",
        description: "Analyze individual and team metrics for monthly review cycle",
        category: Category::Work,
        priority: Priority::High,
        status: Status::Completed,
        due_in_hours: -24,
        estimated_time: 90,
        created_hours_ago: 96,
        updated_hours_ago: 2,
        tags: &["management", "review", "team"],
    },
    Seed {
        title: "Update portfolio website",
        description: "Add recent projects and refresh design with latest work samples",
        category: Category::Personal,
        priority: Priority::Low,
        status: Status::Todo,
        due_in_hours: 336,
        estimated_time: 240,
        created_hours_ago: 168,
        updated_hours_ago: 168,
        tags: &["portfolio", "design", "website"],
    },
];

pub fn sample_tasks(now: DateTime<Local>) -> Vec<Task> {
    SEEDS
        .iter()
        .map(|seed| {
            let updated_at = now - Duration::hours(seed.updated_hours_ago);
            Task {
                id: Uuid::new_v4(),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                category: seed.category,
                priority: seed.priority,
                status: seed.status,
                due_date: Some(now + Duration::hours(seed.due_in_hours)),
                estimated_time: seed.estimated_time,
                created_at: now - Duration::hours(seed.created_hours_ago),
                updated_at,
                completed_at: (seed.status == Status::Completed).then_some(updated_at),
                tags: seed.tags.iter().map(|tag| tag.to_string()).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::at;

    #[test]
    fn sample_tasks_respect_task_invariants() {
        let tasks = sample_tasks(at(2024, 5, 10, 12, 0));
        assert_eq!(tasks.len(), 8);
        for task in &tasks {
            assert_eq!(task.completed_at.is_some(), task.is_completed());
            assert!(task.updated_at >= task.created_at);
            assert!(task.estimated_time > 0);
        }
    }
}
