use chrono::Local;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::prelude::*;
use std::{io, path::Path};

use task_dashboard::app::sample::sample_tasks;
use task_dashboard::app::store::{SystemClock, TaskStore};
use task_dashboard::app::ui::{run_app, App};
use task_dashboard::error::AppError;
use task_dashboard::{config, logging};

// Start the app.
// Terminal setup and teardown follow the ratatui list example.
pub fn main() -> Result<(), AppError> {
    let cfg = config::load_default()?;
    logging::init_logging(&cfg.logging)?;
    info!(
        "event=config_load module=main status=ok path={} found={}",
        config::DEFAULT_CONFIG_FILE,
        Path::new(config::DEFAULT_CONFIG_FILE).exists()
    );

    let mut store = TaskStore::new(SystemClock);
    store.set_filters(cfg.filter.to_spec());
    if cfg.seed_sample_tasks {
        store.set_tasks(sample_tasks(Local::now()));
    }
    info!(
        "event=app_start module=main status=ok tasks={} tick_rate_ms={}",
        store.tasks().len(),
        cfg.tick_rate_ms
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(store);
    let res = run_app(&mut terminal, app, cfg.tick_rate());

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("event=app_exit module=main status=error error={err}");
        eprintln!("{err:?}");
    }

    Ok(())
}
