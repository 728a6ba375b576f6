// Fixtures shared by the unit tests
use chrono::{DateTime, Local, TimeZone};
use uuid::Uuid;

use crate::app::models::{Category, Priority, Status, Task};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("fixture time must exist in the local timezone")
}

// A todo task created on 2024-05-01 09:00 with no due date
pub fn task(title: &str, priority: Priority) -> Task {
    let created = at(2024, 5, 1, 9, 0);
    Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        category: Category::Other,
        priority,
        status: Status::Todo,
        due_date: None,
        estimated_time: 30,
        created_at: created,
        updated_at: created,
        completed_at: None,
        tags: Vec::new(),
    }
}
