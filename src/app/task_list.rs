use chrono::{DateTime, Local};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::app::models::{Priority, Task, TaskId, TaskStats, TimeView};
use crate::app::query::{is_due_today, is_overdue, query};
use crate::app::store::TaskStore;

// Selection state plus the snapshot of tasks currently shown in the list.
#[derive(Default)]
pub struct TaskList {
    pub state: ListState,
    pub items: Vec<Task>,
}

impl TaskList {
    // Re-run the query against the store, keeping the selection on the same task when possible
    pub fn refresh(&mut self, store: &TaskStore, view: Option<TimeView>, now: &DateTime<Local>) {
        let selected_id = self.selected_id();
        self.items = query(store.tasks(), store.filters(), view, now)
            .into_iter()
            .cloned()
            .collect();

        let selection = match selected_id {
            Some(id) => self
                .items
                .iter()
                .position(|task| task.id == id)
                .or_else(|| self.state.selected().map(|i| i.min(self.items.len().saturating_sub(1)))),
            None => None,
        };
        self.state
            .select(if self.items.is_empty() { None } else { selection });
    }

    // Move the selection to the next item, wrapping at the end
    pub fn next(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if self.items.is_empty() || i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item, wrapping at the start
    pub fn previous(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if self.items.is_empty() {
                    0
                } else if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    pub fn get_selected(&self) -> Option<&Task> {
        match self.state.selected() {
            Some(i) => self.items.get(i),
            None => None,
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.get_selected().map(|task| task.id)
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::LightRed,
        Priority::Urgent => Color::Red,
    }
}

// Build the UI (list) for a sequence of tasks
pub fn get_list_items_ui<'a, I>(tasks: I, now: &DateTime<Local>) -> Vec<ListItem<'a>>
where
    I: IntoIterator<Item = &'a Task>,
{
    return tasks
        .into_iter()
        .map(|task| {
            let mut lines = Vec::new();

            let mut title_style = Style::default().fg(priority_color(task.priority));
            if task.is_completed() {
                title_style = title_style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
            }

            lines.push(Line::from(vec![
                Span::from(if task.is_completed() { "[✓] " } else { "[ ] " }),
                Span::styled(task.title.as_str(), title_style),
            ]));

            let mut details = vec![Span::from(format!(
                "    {} · {} · {}min",
                task.priority, task.category, task.estimated_time
            ))];
            if let Some(due) = task.due_date {
                let (text, color) = if is_overdue(task, now) {
                    (due.format("%b %-d").to_string(), Color::Red)
                } else if is_due_today(task, now) {
                    ("Today".to_string(), Color::LightYellow)
                } else {
                    (due.format("%b %-d").to_string(), Color::Gray)
                };
                details.push(Span::from(" · Due: "));
                details.push(Span::from(text).fg(color));
            }
            lines.push(Line::from(details));

            if !task.description.is_empty() {
                lines.push(Line::from(
                    Span::from(format!("    {}", task.description)).fg(Color::DarkGray),
                ));
            }
            if !task.tags.is_empty() {
                let tags: Vec<String> = task.tags.iter().map(|tag| format!("#{tag}")).collect();
                lines.push(Line::from(
                    Span::from(format!("    {}", tags.join(" "))).fg(Color::Cyan),
                ));
            }
            ListItem::new(lines).style(Style::default().fg(Color::White))
        })
        .collect();
}

// Build the UI (lines) shown in place of an empty list
pub fn get_empty_state_ui<'a>(filters_active: bool) -> Vec<Line<'a>> {
    let hint = if filters_active {
        "Try adjusting your filters to see more tasks."
    } else {
        "Your task list is empty. Start by creating your first task!"
    };
    return vec![
        Line::from(Span::from("No tasks found").bold()),
        Line::from(""),
        Line::from(Span::from(hint).fg(Color::Gray)),
    ];
}

// Build the UI (lines) for statistics infobox
pub fn get_statistics_ui<'a>(total: usize, shown: usize, stats: &TaskStats) -> Vec<Line<'a>> {
    return vec![
        Line::from(format!("Total tasks: {total}")),
        Line::from(format!("Shown: {shown}")),
        Line::from(format!("Completed: {}", stats.completed)),
        Line::from(format!("Pending: {}", stats.pending)),
        Line::from(format!("Overdue: {}", stats.overdue)),
        Line::from(format!("Productivity: {}%", stats.productivity_percent)),
    ];
}

// Build the UI (lines) for instructions infobox
pub fn get_instructions_ui<'a>() -> Vec<Line<'a>> {
    return vec![
        "Enter - toggle do/done".into(),
        "a - add a task".into(),
        "e - edit a task".into(),
        "x - delete a task".into(),
        "c / p / s - cycle category / priority / status".into(),
        "/ - search, r - reset filters".into(),
        "1-6, Tab - switch view".into(),
        "q - quit".into(),
    ];
}
