use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use derivative::Derivative;
use log::warn;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::{Category, NewTask, Priority, Status, Task, TaskId};
use crate::app::store::{Action, TaskStore};

// Rows of the dialog, top to bottom. The first five are free text,
// the last three pick from a fixed set with Left/Right.
const TITLE: usize = 0;
const DESCRIPTION: usize = 1;
const DUE_DATE: usize = 2;
const ESTIMATE: usize = 3;
const TAGS: usize = 4;
const PRIORITY: usize = 5;
const CATEGORY: usize = 6;
const STATUS: usize = 7;
const LAST_ROW: usize = STATUS;

// State object for the task edit dialog
// Keeps track of the state of the dialog and the content of the task being edited
#[derive(Derivative)]
#[derivative(Default)]
pub struct TaskEditDialogState {
    pub dialog_active: bool,
    editing: Option<Task>,
    content: TaskEditDialogContent,
    error_message: Option<String>,
    cursor_position: (usize, usize),
}

// Current content of the task being edited/created
#[derive(Derivative, Debug, Clone, PartialEq)]
#[derivative(Default)]
struct TaskEditDialogContent {
    title: String,
    description: String,
    due_date: String,
    #[derivative(Default(value = "\"30\".to_string()"))]
    estimated_time: String,
    tags: String,
    #[derivative(Default(value = "Priority::Medium"))]
    priority: Priority,
    #[derivative(Default(value = "Category::Work"))]
    category: Category,
    #[derivative(Default(value = "Status::Todo"))]
    status: Status,
}

// Accepts "dd.mm.yyyy HH:MM" or "dd.mm.yyyy" (midnight); blank means no due date
pub fn parse_due_date(text: &str) -> Result<Option<DateTime<Local>>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let naive = match NaiveDateTime::parse_from_str(text, "%d.%m.%Y %H:%M") {
        Ok(date_time) => date_time,
        Err(_) => NaiveDate::parse_from_str(text, "%d.%m.%Y")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| "Date should be in format dd.mm.yyyy [HH:MM]".to_string())?,
    };
    match Local.from_local_datetime(&naive).single() {
        Some(due) => Ok(Some(due)),
        None => Err("That time does not exist in the local timezone".to_string()),
    }
}

pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

// Step to the neighbouring variant, wrapping around
fn step<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let position = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (position + 1) % all.len()
    } else {
        (position + all.len() - 1) % all.len()
    };
    all[next]
}

fn byte_index(text: &str, char_position: usize) -> usize {
    text.char_indices()
        .nth(char_position)
        .map_or(text.len(), |(index, _)| index)
}

impl TaskEditDialogState {
    // Opens the dialog and prepares to accept an input for the new task
    pub fn create_a_new_task(&mut self) {
        self.dialog_active = true;
        self.editing = None;
        self.error_message = None;
        self.cursor_position = (0, TITLE);
        self.content = TaskEditDialogContent::default();
    }

    // Opens the dialog and prepares to accept an input for the existing task
    pub fn edit_task(&mut self, task: &Task) {
        self.dialog_active = true;
        self.editing = Some(task.clone());
        self.error_message = None;
        self.cursor_position = (0, TITLE);
        self.content = TaskEditDialogContent {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task
                .due_date
                .map(|due| due.format("%d.%m.%Y %H:%M").to_string())
                .unwrap_or_default(),
            estimated_time: task.estimated_time.to_string(),
            tags: task.tags.join(", "),
            priority: task.priority,
            category: task.category,
            status: task.status,
        };
    }

    pub fn close(&mut self) {
        self.dialog_active = false;
        self.error_message = None;
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    // Move the cursor one line BELOW the current one.
    // The horizontal cursor position is preserved if the new line is long enough
    pub fn move_cursor_down(&mut self) {
        let (x, y) = self.cursor_position;
        let future_y_position = (y + 1).min(LAST_ROW);
        self.cursor_position = (
            x.min(self.char_count_at_y_pos(future_y_position)),
            future_y_position,
        );
    }

    // Move the cursor one line ABOVE the current one.
    pub fn move_cursor_up(&mut self) {
        let (x, y) = self.cursor_position;
        if y > 0 {
            self.cursor_position = (x.min(self.char_count_at_y_pos(y - 1)), y - 1);
        }
    }

    // Move the cursor one char LEFT, or pick the previous choice on a choice row
    pub fn move_cursor_left(&mut self) {
        let (x, y) = self.cursor_position;
        if y >= PRIORITY {
            self.cycle_choice(false);
        } else if x > 0 {
            self.cursor_position = (x - 1, y);
        }
    }

    // Move the cursor one char RIGHT, or pick the next choice on a choice row
    pub fn move_cursor_right(&mut self) {
        let (x, y) = self.cursor_position;
        if y >= PRIORITY {
            self.cycle_choice(true);
        } else {
            self.cursor_position = ((x + 1).min(self.char_count_at_y_pos(y)), y);
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        let content = &mut self.content;
        match self.cursor_position.1 {
            PRIORITY => content.priority = step(&Priority::ALL, content.priority, forward),
            CATEGORY => content.category = step(&Category::ALL, content.category, forward),
            STATUS => content.status = step(&Status::ALL, content.status, forward),
            _ => {}
        }
    }

    // Delete the char before the cursor
    pub fn delete_char(&mut self) {
        let (x, y) = self.cursor_position;
        if x == 0 {
            return;
        }
        match self.text_at_y_pos_mut(y) {
            Some(text) => {
                let index = byte_index(text, x - 1);
                if index < text.len() {
                    text.remove(index);
                }
            }
            None => return,
        };
        self.cursor_position = (x - 1, y);
    }

    // Handles the input of a char by inserting it at the cursor of the active text row
    pub fn input(&mut self, to_insert: char) {
        let (x, y) = self.cursor_position;
        match self.text_at_y_pos_mut(y) {
            Some(text) => {
                let index = byte_index(text, x);
                text.insert(index, to_insert);
            }
            None => return,
        };
        self.cursor_position = (x + 1, y);
    }

    fn text_at_y_pos_mut(&mut self, y_position: usize) -> Option<&mut String> {
        let content = &mut self.content;
        match y_position {
            TITLE => Some(&mut content.title),
            DESCRIPTION => Some(&mut content.description),
            DUE_DATE => Some(&mut content.due_date),
            ESTIMATE => Some(&mut content.estimated_time),
            TAGS => Some(&mut content.tags),
            _ => None,
        }
    }

    // Returns the content of the row at the given y position as displayed
    // Think of this as a mapper of vertical cursor position to the string content
    fn content_of_string_at_y_pos(&self, y_position: usize) -> String {
        let content = &self.content;
        return match y_position {
            TITLE => content.title.clone(),
            DESCRIPTION => content.description.clone(),
            DUE_DATE => content.due_date.clone(),
            ESTIMATE => content.estimated_time.clone(),
            TAGS => content.tags.clone(),
            PRIORITY => content.priority.to_string(),
            CATEGORY => content.category.to_string(),
            STATUS => content.status.to_string(),
            _ => "".to_string(),
        };
    }

    fn char_count_at_y_pos(&self, y_position: usize) -> usize {
        if y_position >= PRIORITY {
            return 0;
        }
        self.content_of_string_at_y_pos(y_position).chars().count()
    }

    // Validates the dialog content and turns it into a store action
    fn build_action(&self) -> Result<Action, String> {
        let content = &self.content;
        if content.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        let due_date = parse_due_date(&content.due_date)?;
        let estimated_time = match content.estimated_time.trim().parse::<u32>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => return Err("Estimated time should be a positive number of minutes".to_string()),
        };
        let tags = parse_tags(&content.tags);

        let action = match &self.editing {
            Some(original) => Action::UpdateTask(Task {
                title: content.title.trim().to_string(),
                description: content.description.trim().to_string(),
                category: content.category,
                priority: content.priority,
                status: content.status,
                due_date,
                estimated_time,
                tags,
                ..original.clone()
            }),
            None => Action::AddTask(NewTask {
                title: content.title.trim().to_string(),
                description: content.description.trim().to_string(),
                category: content.category,
                priority: content.priority,
                status: content.status,
                due_date,
                estimated_time,
                tags,
            }),
        };
        Ok(action)
    }

    // Saves the task to the store and closes the dialog; on failure the error is shown inline
    pub fn save_task(&mut self, store: &mut TaskStore) -> Option<TaskId> {
        let action = match self.build_action() {
            Ok(action) => action,
            Err(message) => {
                self.error_message = Some(message);
                return None;
            }
        };

        match store.dispatch(action) {
            Ok(id) => {
                self.close();
                id
            }
            Err(err) => {
                warn!("event=task_save module=ui status=error error={err}");
                self.error_message = Some(err.to_string());
                None
            }
        }
    }
}

// Returns the UI content for the task edit dialog
pub fn get_task_edit_ui<'a>(dialog: &TaskEditDialogState) -> Vec<Line<'a>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);
    let mut text = Vec::new();

    struct TextDialogInputLine {
        prefix: &'static str,
        placeholder: &'static str,
        value: String,
    }

    // Define the lines (input fields) of the dialog
    let rows = [
        ("Title:       ", "My task name"),
        ("Description: ", "My description"),
        ("Due date:    ", "23.11.2023 17:00"),
        ("Minutes:     ", "30"),
        ("Tags:        ", "work, urgent"),
        ("Priority:    ", ""),
        ("Category:    ", ""),
        ("Status:      ", ""),
    ];
    let lines: Vec<TextDialogInputLine> = rows
        .iter()
        .enumerate()
        .map(|(i, (prefix, placeholder))| TextDialogInputLine {
            prefix: *prefix,
            placeholder: *placeholder,
            value: dialog.content_of_string_at_y_pos(i),
        })
        .collect();

    let cursor_position = dialog.cursor_position;

    for (i, line) in lines.iter().enumerate() {
        let mut spans = Vec::new();

        // Each line starts with a prefix, for example "Title: "
        spans.push(Span::styled(line.prefix, WHITE_TEXT));

        if i >= PRIORITY {
            // Choice rows show the current value between arrows
            let style = if cursor_position.1 == i { BLACK_ON_WHITE } else { WHITE_TEXT };
            spans.push(Span::styled(format!("< {} >", line.value), style));
        } else if line.value.is_empty() {
            // If the line is empty, a placeholder is displayed
            if cursor_position.1 == i {
                // Line is selected. First char is highlighted, the rest is gray
                spans.push(Span::styled(
                    line.placeholder.chars().take(1).collect::<String>(),
                    BLACK_ON_WHITE,
                ));
                spans.push(Span::styled(
                    line.placeholder.chars().skip(1).collect::<String>(),
                    GRAY_TEXT,
                ));
            } else {
                // Line is not selected. All chars are gray
                spans.push(Span::styled(line.placeholder, GRAY_TEXT));
            }
        } else if cursor_position.1 == i {
            // All chars are white, except for the one at the cursor position which is highlighted
            spans.push(Span::styled(
                line.value.chars().take(cursor_position.0).collect::<String>(),
                WHITE_TEXT,
            ));
            spans.push(Span::styled(
                line.value
                    .chars()
                    .skip(cursor_position.0)
                    .take(1)
                    .collect::<String>(),
                BLACK_ON_WHITE,
            ));
            spans.push(Span::styled(
                line.value
                    .chars()
                    .skip(cursor_position.0 + 1)
                    .collect::<String>(),
                WHITE_TEXT,
            ));

            if cursor_position.0 == line.value.chars().count() {
                spans.push(Span::styled(" ", BLACK_ON_WHITE));
            }
        } else {
            // All chars are white if the line is not selected
            spans.push(Span::styled(line.value.clone(), WHITE_TEXT));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));

    // Display the error message if there is one
    if let Some(error_message) = dialog.error_message() {
        text.push(Line::from(vec![Span::styled(
            error_message.to_string(),
            Style::new().fg(Color::Red),
        )]));
        text.push(Line::raw(""));
    }

    // Display the help text
    text.push(Line::from(vec![Span::styled(
        "Enter - save, Esc - cancel, Left/Right - change choice",
        WHITE_TEXT,
    )]));

    return text;
}
