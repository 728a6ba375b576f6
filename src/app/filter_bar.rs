use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::app::models::{Criterion, FilterSpec};

// Step a filter field through "any" -> every variant -> "any"
pub fn cycle<T: Copy + PartialEq>(current: &Option<Criterion<T>>, all: &[T]) -> Option<Criterion<T>> {
    match current {
        None => all.first().copied().map(Criterion::Is),
        Some(Criterion::Is(value)) => {
            let position = all.iter().position(|candidate| candidate == value)?;
            all.get(position + 1).copied().map(Criterion::Is)
        }
        Some(Criterion::Unrecognized(_)) => None,
    }
}

// State of the search input. While active, keystrokes edit the search term.
#[derive(Debug, Default)]
pub struct FilterBarState {
    pub search_active: bool,
    buffer: String,
    before_edit: Option<String>,
}

impl FilterBarState {
    pub fn begin_search(&mut self, spec: &FilterSpec) {
        self.search_active = true;
        self.before_edit = spec.search.clone();
        self.buffer = spec.search.clone().unwrap_or_default();
    }

    pub fn input(&mut self, to_insert: char) {
        self.buffer.push(to_insert);
    }

    pub fn delete_char(&mut self) {
        self.buffer.pop();
    }

    // The search term as currently typed, `None` when blank
    pub fn term(&self) -> Option<String> {
        if self.buffer.trim().is_empty() {
            None
        } else {
            Some(self.buffer.clone())
        }
    }

    pub fn commit(&mut self) -> Option<String> {
        self.search_active = false;
        self.before_edit = None;
        self.term()
    }

    // Leave search mode and return the term that was active before editing
    pub fn cancel(&mut self) -> Option<String> {
        self.search_active = false;
        self.buffer = self.before_edit.take().unwrap_or_default();
        self.term()
    }
}

fn criterion_text<T: std::fmt::Display>(criterion: &Option<Criterion<T>>) -> String {
    match criterion {
        Some(criterion) => criterion.to_string(),
        None => "all".to_string(),
    }
}

// Build the UI (lines) for the filter infobox
pub fn get_filter_ui<'a>(spec: &FilterSpec, bar: &FilterBarState) -> Vec<Line<'a>> {
    const ACTIVE: Style = Style::new().fg(Color::Cyan);
    const CURSOR: Style = Style::new().fg(Color::Black).bg(Color::White);

    let search_line = if bar.search_active {
        Line::from(vec![
            Span::raw("Search:   "),
            Span::styled(bar.buffer.clone(), ACTIVE),
            Span::styled(" ", CURSOR),
        ])
    } else {
        Line::from(format!(
            "Search:   {}",
            spec.search_term().unwrap_or("-")
        ))
    };

    let mut lines = vec![
        search_line,
        Line::from(format!("Category: {}", criterion_text(&spec.category))),
        Line::from(format!("Priority: {}", criterion_text(&spec.priority))),
        Line::from(format!("Status:   {}", criterion_text(&spec.status))),
    ];

    if !spec.is_empty() {
        lines.push(Line::from(Span::styled(
            "Filters active - r to reset",
            Style::new().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}
