use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::{info, warn};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};

use crate::app::filter_bar::{cycle, get_filter_ui, FilterBarState};
use crate::app::models::{Category, FilterSpec, Priority, Status, TimeView};
use crate::app::query::{aggregate, weekly_completions, DashboardSummary};
use crate::app::store::{Action, TaskStore};
use crate::app::suggestion_panel::*;
use crate::app::suggestions::RuleBook;
use crate::app::{task_edit::*, task_list::*};

// Screens of the dashboard, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    AllTasks,
    Today,
    Overdue,
    Completed,
    Suggestions,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::AllTasks,
        View::Today,
        View::Overdue,
        View::Completed,
        View::Suggestions,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::AllTasks => "All Tasks",
            View::Today => "Today's Tasks",
            View::Overdue => "Overdue Tasks",
            View::Completed => "Completed Tasks",
            View::Suggestions => "Suggestions",
        }
    }

    pub fn time_view(self) -> Option<TimeView> {
        match self {
            View::Today => Some(TimeView::Today),
            View::Overdue => Some(TimeView::Overdue),
            View::Completed => Some(TimeView::Completed),
            _ => None,
        }
    }

    pub fn is_task_list(self) -> bool {
        matches!(
            self,
            View::AllTasks | View::Today | View::Overdue | View::Completed
        )
    }

    fn index(self) -> usize {
        View::ALL.iter().position(|view| *view == self).unwrap_or(0)
    }
}

pub struct App {
    pub store: TaskStore,
    pub view: View,
    pub items: TaskList,
    pub task_edit_dialog_state: TaskEditDialogState,
    pub filter_bar: FilterBarState,
    pub suggestions: SuggestionPanel,
    rules: RuleBook,
}

impl App {
    pub fn new(store: TaskStore) -> App {
        let mut app = App {
            store,
            view: View::Dashboard,
            items: TaskList::default(),
            task_edit_dialog_state: TaskEditDialogState::default(),
            filter_bar: FilterBarState::default(),
            suggestions: SuggestionPanel::default(),
            rules: RuleBook::default(),
        };
        app.refresh();
        app
    }

    // Recompute every derived view from the current store snapshot
    pub fn refresh(&mut self) {
        let now = self.store.now();
        self.items.refresh(&self.store, self.view.time_view(), &now);
        self.suggestions.sync(&self.store, &self.rules);
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            info!("event=view_change module=ui view={}", view.title());
            self.view = view;
            self.items.unselect();
            self.refresh();
        }
    }

    // Dispatch to the store; failures are logged and leave the state untouched
    pub fn apply(&mut self, action: Action) {
        if let Err(err) = self.store.dispatch(action) {
            warn!("event=dispatch module=ui status=error error={err}");
        }
        self.refresh();
    }

    fn update_filters(&mut self, update: impl FnOnce(&mut FilterSpec)) {
        let mut spec = self.store.filters().clone();
        update(&mut spec);
        self.apply(Action::SetFilters(spec));
    }

    // Handle one key press. Returns false when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.task_edit_dialog_state.dialog_active {
            self.handle_dialog_key(code);
            return true;
        }
        if self.filter_bar.search_active {
            self.handle_search_key(code);
            return true;
        }

        match code {
            KeyCode::Char('q') => return false,
            KeyCode::Tab => {
                let next = View::ALL[(self.view.index() + 1) % View::ALL.len()];
                self.set_view(next);
            }
            KeyCode::BackTab => {
                let previous = View::ALL[(self.view.index() + View::ALL.len() - 1) % View::ALL.len()];
                self.set_view(previous);
            }
            KeyCode::Char(digit @ '1'..='6') => {
                let index = digit as usize - '1' as usize;
                self.set_view(View::ALL[index]);
            }
            _ if self.view.is_task_list() => self.handle_task_list_key(code),
            _ if self.view == View::Suggestions => self.handle_suggestions_key(code),
            _ => {}
        }
        true
    }

    fn handle_dialog_key(&mut self, code: KeyCode) {
        let dialog = &mut self.task_edit_dialog_state;
        match code {
            KeyCode::Down | KeyCode::Tab => dialog.move_cursor_down(),
            KeyCode::Up | KeyCode::BackTab => dialog.move_cursor_up(),
            KeyCode::Esc => dialog.close(),
            KeyCode::Enter => {
                dialog.save_task(&mut self.store);
                self.refresh();
            }
            KeyCode::Left => dialog.move_cursor_left(),
            KeyCode::Right => dialog.move_cursor_right(),
            KeyCode::Backspace => dialog.delete_char(),
            KeyCode::Char(to_insert) => dialog.input(to_insert),
            _ => {}
        }
    }

    // Search edits apply live; Esc restores the term from before editing
    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let term = self.filter_bar.commit();
                self.update_filters(|spec| spec.search = term);
            }
            KeyCode::Esc => {
                let term = self.filter_bar.cancel();
                self.update_filters(|spec| spec.search = term);
            }
            KeyCode::Backspace => {
                self.filter_bar.delete_char();
                let term = self.filter_bar.term();
                self.update_filters(|spec| spec.search = term);
            }
            KeyCode::Char(to_insert) => {
                self.filter_bar.input(to_insert);
                let term = self.filter_bar.term();
                self.update_filters(|spec| spec.search = term);
            }
            _ => {}
        }
    }

    fn handle_task_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down => self.items.next(),
            KeyCode::Up => self.items.previous(),
            KeyCode::Left => self.items.unselect(),
            KeyCode::Enter => {
                if let Some(id) = self.items.selected_id() {
                    self.apply(Action::ToggleStatus(id));
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.items.selected_id() {
                    self.apply(Action::DeleteTask(id));
                }
            }
            KeyCode::Char('a') => self.task_edit_dialog_state.create_a_new_task(),
            KeyCode::Char('e') => {
                if let Some(task) = self.items.get_selected() {
                    self.task_edit_dialog_state.edit_task(task);
                }
            }
            KeyCode::Char('c') => {
                self.update_filters(|spec| spec.category = cycle(&spec.category, &Category::ALL))
            }
            KeyCode::Char('p') => {
                self.update_filters(|spec| spec.priority = cycle(&spec.priority, &Priority::ALL))
            }
            KeyCode::Char('s') => {
                self.update_filters(|spec| spec.status = cycle(&spec.status, &Status::ALL))
            }
            KeyCode::Char('/') => self.filter_bar.begin_search(self.store.filters()),
            KeyCode::Char('r') => self.apply(Action::SetFilters(FilterSpec::default())),
            _ => {}
        }
    }

    fn handle_suggestions_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down => self.suggestions.next(),
            KeyCode::Up => self.suggestions.previous(),
            KeyCode::Char('x') | KeyCode::Delete => {
                self.suggestions.dismiss_selected();
            }
            _ => {}
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_key(key.code) {
                    info!("event=app_quit module=ui status=ok");
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            // The clock moves even without input, so "today" and "overdue" stay current
            app.refresh();
            last_tick = Instant::now();
        }
    }
}

// Draws the whole user interface
fn draw_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Task Dashboard"))
        .select(app.view.index())
        .highlight_style(
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    match app.view {
        View::Dashboard => draw_dashboard(f, app, chunks[1]),
        View::Suggestions => draw_suggestions(f, app, chunks[1]),
        _ => draw_task_view(f, app, chunks[1]),
    }

    let footer = Paragraph::new(Line::from(
        "Tab/1-6 switch view · q quit".to_string(),
    ))
    .style(Style::new().fg(Color::DarkGray));
    f.render_widget(footer, chunks[2]);
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let now = app.store.now();
    let summary = DashboardSummary::from_tasks(app.store.tasks(), &now);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(5),
        ])
        .split(area);

    // Stat cards
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);
    let card_values = [
        ("Total Tasks", summary.total, Color::Blue),
        ("Completed", summary.stats.completed, Color::Green),
        ("Pending", summary.stats.pending, Color::Yellow),
        ("Overdue", summary.stats.overdue, Color::Red),
    ];
    for (i, (title, value, color)) in card_values.iter().enumerate() {
        let card = Paragraph::new(Line::from(Span::styled(
            value.to_string(),
            Style::new().fg(*color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::new().title(*title).borders(Borders::ALL));
        f.render_widget(card, cards[i]);
    }

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    // Weekly completions
    let week = weekly_completions(app.store.tasks(), &now);
    let bars: Vec<(&str, u64)> = week
        .iter()
        .map(|day| (day.label.as_str(), day.completed))
        .collect();
    let chart = BarChart::default()
        .block(Block::new().title("Weekly Productivity").borders(Borders::ALL))
        .data(bars.as_slice())
        .bar_width(5)
        .bar_gap(2)
        .bar_style(Style::new().fg(Color::Green))
        .value_style(Style::new().fg(Color::Black).bg(Color::Green));
    f.render_widget(chart, middle[0]);

    // Today's tasks
    let today_block = Block::new()
        .title(format!(
            "Today's Tasks ({})",
            summary.today.len() + summary.more_today
        ))
        .borders(Borders::ALL);
    if summary.today.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No tasks due today"),
            Line::from(Span::styled("Enjoy your day!", Style::new().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .block(today_block);
        f.render_widget(empty, middle[1]);
    } else {
        let mut items = get_list_items_ui(summary.today.iter().copied(), &now);
        if summary.more_today > 0 {
            items.push(ListItem::new(Line::from(Span::styled(
                format!("View {} more tasks (press 3)", summary.more_today),
                Style::new().fg(Color::LightBlue),
            ))));
        }
        f.render_widget(List::new(items).block(today_block), middle[1]);
    }

    // Quick insights
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);
    let gauge = Gauge::default()
        .block(Block::new().title("Productivity Rate").borders(Borders::ALL))
        .gauge_style(Style::new().fg(Color::Green))
        .percent(u16::from(summary.stats.productivity_percent));
    f.render_widget(gauge, bottom[0]);

    let insights = Paragraph::new(vec![
        Line::from(format!("Total Focus Time: {}h", summary.focus_hours)),
        Line::from(format!("Average per Task: {}min", summary.average_minutes)),
    ])
    .block(Block::new().title("Quick Insights").borders(Borders::ALL));
    f.render_widget(insights, bottom[1]);
}

fn draw_task_view(f: &mut Frame, app: &mut App, area: Rect) {
    let now = app.store.now();

    // Create two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    // DRAW LEFT PART
    let list_title = format!("{} ({})", app.view.title(), app.items.items.len());
    if app.items.items.is_empty() {
        let empty = Paragraph::new(get_empty_state_ui(!app.store.filters().is_empty()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(list_title));
        f.render_widget(empty, chunks[0]);
    } else {
        // Highlight the currently selected task
        let task_list = List::new(get_list_items_ui(app.items.items.iter(), &now))
            .block(Block::default().borders(Borders::ALL).title(list_title))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");
        f.render_stateful_widget(task_list, chunks[0], &mut app.items.state);
    }

    // DRAW RIGHT PART
    if app.task_edit_dialog_state.dialog_active {
        let create_or_edit_task = Paragraph::new(get_task_edit_ui(&app.task_edit_dialog_state))
            .block(Block::new().title("Add/Edit Task").borders(Borders::ALL))
            .style(Style::new().white());

        f.render_widget(create_or_edit_task, chunks[1]);
    } else {
        // If not editing, display filters, instructions and statistics
        let right_side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Min(0),
                Constraint::Length(8),
            ])
            .split(chunks[1]);

        let filters = Paragraph::new(get_filter_ui(app.store.filters(), &app.filter_bar))
            .block(Block::new().title("Filters").borders(Borders::ALL))
            .style(Style::new().white());

        let instructions = Paragraph::new(get_instructions_ui())
            .block(Block::new().title("Commands").borders(Borders::ALL))
            .style(Style::new().white());

        let stats = aggregate(app.store.tasks(), &now);
        let statistics = Paragraph::new(get_statistics_ui(
            app.store.tasks().len(),
            app.items.items.len(),
            &stats,
        ))
        .block(Block::new().title("Statistics").borders(Borders::ALL))
        .style(Style::new().white());

        f.render_widget(filters, right_side[0]);
        f.render_widget(instructions, right_side[1]);
        f.render_widget(statistics, right_side[2]);
    }
}

fn draw_suggestions(f: &mut Frame, app: &mut App, area: Rect) {
    let insight_height = app.suggestions.insights.len().max(1) as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(insight_height), Constraint::Min(0)])
        .split(area);

    let insights = Paragraph::new(get_insights_ui(&app.suggestions.insights))
        .block(Block::new().title("Productivity Insights").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(insights, chunks[0]);

    let title = format!(
        "Smart Recommendations ({}) - x to dismiss",
        app.suggestions.items.len()
    );
    if app.suggestions.items.is_empty() {
        let caught_up = Paragraph::new(get_caught_up_ui())
            .alignment(Alignment::Center)
            .block(Block::new().title(title).borders(Borders::ALL));
        f.render_widget(caught_up, chunks[1]);
    } else {
        let list = List::new(get_suggestion_items_ui(&app.suggestions.items))
            .block(Block::new().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, chunks[1], &mut app.suggestions.state);
    }
}
