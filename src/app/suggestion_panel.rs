use log::debug;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::app::models::{Suggestion, SuggestionKind};
use crate::app::store::TaskStore;
use crate::app::suggestions::SuggestionSource;

// Display list of suggestions and insights.
// Regenerated whenever the task collection changes; dismissals only affect this list.
#[derive(Default)]
pub struct SuggestionPanel {
    pub state: ListState,
    pub items: Vec<Suggestion>,
    pub insights: Vec<String>,
    revision: Option<u64>,
}

impl SuggestionPanel {
    pub fn sync(&mut self, store: &TaskStore, source: &dyn SuggestionSource) {
        if self.revision == Some(store.revision()) {
            return;
        }
        let now = store.now();
        self.items = source.suggestions(store.tasks(), &now);
        self.insights = source.insights(store.tasks());
        self.revision = Some(store.revision());
        self.state
            .select(if self.items.is_empty() { None } else { Some(0) });

        debug!(
            "event=suggestions_regenerated module=ui revision={} suggestions={} insights={}",
            store.revision(),
            self.items.len(),
            self.insights.len()
        );
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    // Remove the selected suggestion from the display list
    pub fn dismiss_selected(&mut self) -> Option<Suggestion> {
        let i = self.state.selected()?;
        if i >= self.items.len() {
            return None;
        }
        let dismissed = self.items.remove(i);
        let selection = if self.items.is_empty() {
            None
        } else {
            Some(i.min(self.items.len() - 1))
        };
        self.state.select(selection);
        Some(dismissed)
    }
}

fn kind_color(kind: SuggestionKind) -> Color {
    match kind {
        SuggestionKind::TimeSlot => Color::Blue,
        SuggestionKind::Priority => Color::LightRed,
    }
}

// Build the UI (list) for the suggestion cards
pub fn get_suggestion_items_ui(suggestions: &[Suggestion]) -> Vec<ListItem<'_>> {
    return suggestions
        .iter()
        .map(|suggestion| {
            let header = Line::from(vec![
                Span::styled(
                    format!("[{}]", suggestion.kind.label()),
                    Style::new().fg(kind_color(suggestion.kind)),
                ),
                Span::from(format!(
                    " {}% confidence",
                    (suggestion.confidence * 100.0).round()
                ))
                .fg(Color::Gray),
            ]);
            let text = Line::from(Span::styled(
                suggestion.text.as_str(),
                Style::new().add_modifier(Modifier::BOLD),
            ));
            let reasoning = Line::from(
                Span::from(format!("  {}", suggestion.reasoning)).fg(Color::DarkGray),
            );
            ListItem::new(vec![header, text, reasoning])
        })
        .collect();
}

// Build the UI (lines) for the insights box
pub fn get_insights_ui(insights: &[String]) -> Vec<Line<'_>> {
    if insights.is_empty() {
        return vec![Line::from(
            Span::from("Add some tasks to get productivity insights.").fg(Color::Gray),
        )];
    }
    return insights
        .iter()
        .map(|insight| Line::from(insight.as_str()))
        .collect();
}

// Build the UI (lines) shown when no suggestion is left
pub fn get_caught_up_ui<'a>() -> Vec<Line<'a>> {
    return vec![
        Line::from(Span::from("You're all caught up!").bold()),
        Line::from(""),
        Line::from(Span::from("No suggestions right now.").fg(Color::Gray)),
    ];
}
