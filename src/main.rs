mod ansi;
mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod keymap;
mod launch;
mod logging;
mod overlay;
mod panel;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::app::{App, WatchContext};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::fs::watch::{NotifyBackend, WatchRegistry};
use crate::keymap::Keymap;
use crate::tui::{install_panic_hook, Tui};

/// A dual-pane terminal file browser.
#[derive(Parser, Debug)]
#[command(name = "twinpane", version, about)]
struct Cli {
    /// Directory both panels start in (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to a config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable filesystem watcher (auto-refresh)
    #[arg(long)]
    no_watcher: bool,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Editor command used by open_editor
    #[arg(long)]
    editor: Option<String>,
}

impl Cli {
    /// Partial config carrying only what was set on the command line.
    fn overrides(&self) -> AppConfig {
        let mut overrides = AppConfig::default();
        if self.no_watcher {
            overrides.watcher.enabled = Some(false);
        }
        overrides.log.file = self.log_file.clone();
        overrides.editor.command = self.editor.clone();
        overrides
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    let path = cli.path.canonicalize().map_err(|_| {
        AppError::InvalidPath(format!("{} does not exist", cli.path.display()))
    })?;
    if !path.is_dir() {
        return Err(AppError::InvalidPath(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    let (config, warnings) = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    if let Some(log_path) = config.log_file() {
        match logging::init(&log_path, config.log_level()) {
            Ok(Some(level_warning)) => warn!("{}", level_warning),
            Ok(None) => {}
            Err(e) => eprintln!("twinpane: logging disabled: {}", e),
        }
    }
    for warning in &warnings {
        warn!("{}", warning);
    }
    info!(path = %path.display(), "starting");

    install_panic_hook();

    let theme = theme::resolve_theme(config.theme_scheme());
    let keymap = Keymap::with_overrides(&config.keys);

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(250));

    let registry = if config.watcher_enabled() {
        let backend = NotifyBackend::new(Duration::from_millis(config.debounce_ms()));
        Some(Arc::new(WatchRegistry::new(Arc::new(backend))))
    } else {
        info!("filesystem watcher disabled");
        None
    };
    let watch = registry.as_ref().map(|registry| WatchContext {
        registry: Arc::clone(registry),
        tx: events.sender(),
    });

    let mut app = App::new(&path, keymap, config.editor_command(), watch);

    let result = run(&mut tui, &mut events, &mut app, &theme).await;

    app.shutdown();
    if let Some(registry) = &registry {
        registry.close_all();
    }
    tui.restore()?;
    info!("exiting");
    result
}

async fn run(
    tui: &mut Tui,
    events: &mut EventHandler,
    app: &mut App,
    theme: &theme::ThemeColors,
) -> error::Result<()> {
    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(app, frame, theme);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(app, mouse),
            Event::FocusGained => app.refresh_all(),
            Event::FsChange(side) => app.on_fs_change(side),
            Event::Tick => {}
            Event::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
