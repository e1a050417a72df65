use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::event::Event;
use crate::fs::operations;
use crate::fs::watch::{WatchCallback, WatchRegistry};
use crate::keymap::{Command, Keymap};
use crate::launch;
use crate::panel::{PanelSide, PanelState};

/// What a name typed into the input dialog will become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    MkDir,
    MkFile,
}

/// A file operation, built when a dialog opens and run by [`App::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Copy {
        sources: Vec<PathBuf>,
        destination: PathBuf,
        overwrite: bool,
    },
    Move {
        sources: Vec<PathBuf>,
        destination: PathBuf,
        overwrite: bool,
    },
    Delete {
        targets: Vec<PathBuf>,
    },
    Trash {
        targets: Vec<PathBuf>,
    },
    MkDir {
        name: String,
    },
    MkFile {
        name: String,
    },
}

impl Action {
    /// Phrase used in the alert shown when the action fails.
    fn failure_prefix(&self) -> &'static str {
        match self {
            Action::Copy { .. } => "Error copying file",
            Action::Move { .. } => "Error moving file",
            Action::Delete { .. } => "Error deleting file",
            Action::Trash { .. } => "Error moving file to trash",
            Action::MkDir { .. } => "Error creating directory",
            Action::MkFile { .. } => "Error creating file",
        }
    }

    /// Copy and move change both panels.
    fn touches_destination(&self) -> bool {
        matches!(self, Action::Copy { .. } | Action::Move { .. })
    }
}

/// The dialog currently covering the panels, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Confirm {
        message: String,
        action: Action,
    },
    Input {
        prompt: String,
        buffer: String,
        purpose: InputPurpose,
    },
    Alert {
        message: String,
    },
    Help,
}

/// Registry plus the channel watch callbacks post to.
pub struct WatchContext {
    pub registry: Arc<WatchRegistry>,
    pub tx: mpsc::UnboundedSender<Event>,
}

impl WatchContext {
    fn callback(&self, side: PanelSide) -> WatchCallback {
        let tx = self.tx.clone();
        Arc::new(move |path: &Path, err: Option<&AppError>| match err {
            Some(err) => warn!(path = %path.display(), error = %err, "watch error"),
            None => {
                let _ = tx.send(Event::FsChange(side));
            }
        })
    }

    /// Point `panel`'s subscription at `dir`. On failure the previous
    /// subscription is restored if possible.
    fn rebind(&self, panel: &mut PanelState, side: PanelSide, dir: &Path) -> Result<()> {
        let previous = panel.subscription.take();
        let previous_dir = previous.as_ref().map(|s| s.path().to_path_buf());
        match self.registry.subscribe(previous, dir, self.callback(side)) {
            Ok(sub) => {
                panel.subscription = Some(sub);
                Ok(())
            }
            Err(err) => {
                if let Some(old) = previous_dir {
                    panel.subscription = self
                        .registry
                        .subscribe(None, &old, self.callback(side))
                        .map_err(|e| warn!(dir = %old.display(), error = %e, "could not restore watch"))
                        .ok();
                }
                Err(err)
            }
        }
    }
}

/// Session state: both panels, focus and the active dialog.
pub struct App {
    pub left: PanelState,
    pub right: PanelState,
    pub active: PanelSide,
    pub modal: Option<Modal>,
    pub should_quit: bool,
    pub keymap: Keymap,
    /// Rows visible in a panel, updated by the renderer.
    pub page_size: usize,
    editor: String,
    watch: Option<WatchContext>,
}

impl App {
    /// Create a session with both panels in `start`. Watches are attached
    /// when `watch` is given; a failure shows an alert instead of aborting.
    pub fn new(start: &Path, keymap: Keymap, editor: &str, watch: Option<WatchContext>) -> Self {
        let mut app = Self {
            left: PanelState::new(start),
            right: PanelState::new(start),
            active: PanelSide::Left,
            modal: None,
            should_quit: false,
            keymap,
            page_size: 10,
            editor: editor.to_string(),
            watch,
        };
        if let Some(ctx) = &app.watch {
            for side in [PanelSide::Left, PanelSide::Right] {
                let panel = match side {
                    PanelSide::Left => &mut app.left,
                    PanelSide::Right => &mut app.right,
                };
                if let Err(err) = ctx.rebind(panel, side, start) {
                    app.modal = Some(Modal::Alert {
                        message: err.to_string(),
                    });
                }
            }
        }
        app
    }

    pub fn panel(&self, side: PanelSide) -> &PanelState {
        match side {
            PanelSide::Left => &self.left,
            PanelSide::Right => &self.right,
        }
    }

    pub fn panel_mut(&mut self, side: PanelSide) -> &mut PanelState {
        match side {
            PanelSide::Left => &mut self.left,
            PanelSide::Right => &mut self.right,
        }
    }

    pub fn active_panel(&self) -> &PanelState {
        self.panel(self.active)
    }

    pub fn active_panel_mut(&mut self) -> &mut PanelState {
        self.panel_mut(self.active)
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn alert(&mut self, message: impl Into<String>) {
        self.modal = Some(Modal::Alert {
            message: message.into(),
        });
    }

    // ── Key dispatch ────────────────────────────────────────────────────────

    /// Feed one key name (see [`crate::handler::key_name`]) into the
    /// session state machine.
    pub fn handle_key(&mut self, key: &str) {
        match self.modal {
            None => {
                if let Some(command) = self.keymap.lookup(key) {
                    self.run_command(command);
                }
            }
            Some(Modal::Input { .. }) => self.input_key(key),
            Some(_) => match key {
                "enter" => self.confirm(),
                "esc" => self.modal = None,
                _ => {}
            },
        }
    }

    fn input_key(&mut self, key: &str) {
        match key {
            "enter" => self.commit_input(),
            "esc" => self.modal = None,
            "backspace" => {
                if let Some(Modal::Input { buffer, .. }) = &mut self.modal {
                    buffer.pop();
                }
            }
            // Any other key, named keys included, is typed literally.
            other => {
                if let Some(Modal::Input { buffer, .. }) = &mut self.modal {
                    buffer.push_str(other);
                }
            }
        }
    }

    pub fn run_command(&mut self, command: Command) {
        debug!(command = command.name(), "command");
        match command {
            Command::Quit => self.quit(),
            Command::SwitchPanel => self.active = self.active.other(),
            Command::Select => self.active_panel_mut().toggle_selected(),
            Command::Enter => self.enter(),
            Command::Back => self.back(),
            Command::Copy => self.begin_copy(false),
            Command::CopyOverwrite => self.begin_copy(true),
            Command::Move => self.begin_move(false),
            Command::MoveOverwrite => self.begin_move(true),
            Command::Delete => self.begin_delete(false),
            Command::Trash => self.begin_delete(true),
            Command::MkDir => self.begin_input(InputPurpose::MkDir),
            Command::MkFile => self.begin_input(InputPurpose::MkFile),
            Command::OpenEditor => self.open_editor(),
            Command::Help => self.modal = Some(Modal::Help),
            Command::Up => self.active_panel_mut().select_previous(),
            Command::Down => self.active_panel_mut().select_next(),
            Command::PageUp => {
                let page = self.page_size;
                self.active_panel_mut().page_up(page);
            }
            Command::PageDown => {
                let page = self.page_size;
                self.active_panel_mut().page_down(page);
            }
            Command::Top => self.active_panel_mut().select_first(),
            Command::Bottom => self.active_panel_mut().select_last(),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// Open the highlighted entry: re-root on directories, launch files.
    pub fn enter(&mut self) {
        let Some(entry) = self.active_panel().highlighted_entry() else {
            return;
        };
        let (path, is_dir) = (entry.path.clone(), entry.is_dir);
        if is_dir {
            self.change_dir(self.active, path);
        } else if let Err(err) = launch::open_default(&path) {
            self.alert(err.to_string());
        }
    }

    /// Go to the parent of the active panel's directory.
    pub fn back(&mut self) {
        let dir = &self.active_panel().dir;
        let parent = dir.parent().unwrap_or(dir).to_path_buf();
        self.change_dir(self.active, parent);
    }

    /// Re-root `side` at `dir`, moving its watch along. If the new
    /// directory cannot be watched the panel stays where it is.
    pub fn change_dir(&mut self, side: PanelSide, dir: PathBuf) {
        if let Some(ctx) = &self.watch {
            let panel = match side {
                PanelSide::Left => &mut self.left,
                PanelSide::Right => &mut self.right,
            };
            if let Err(err) = ctx.rebind(panel, side, &dir) {
                self.alert(err.to_string());
                return;
            }
        }
        debug!(?side, dir = %dir.display(), "change directory");
        self.panel_mut(side).change_dir(dir);
    }

    /// A watched directory changed.
    pub fn on_fs_change(&mut self, side: PanelSide) {
        self.panel_mut(side).refresh();
    }

    pub fn refresh_all(&mut self) {
        self.left.refresh();
        self.right.refresh();
    }

    fn open_editor(&mut self) {
        let Some(entry) = self.active_panel().highlighted_entry() else {
            return;
        };
        let path = entry.path.clone();
        if let Err(err) = launch::open_in_editor(&self.editor, &path) {
            self.alert(err.to_string());
        }
    }

    // ── Dialogs ─────────────────────────────────────────────────────────────

    fn begin_copy(&mut self, overwrite: bool) {
        let sources = match self.active_panel().operands() {
            Ok(sources) => sources,
            Err(err) => return self.alert(format!("Error copying file: {err}")),
        };
        let message = format!("Are you sure you want to copy\n{}?", list_paths(&sources));
        let destination = self.panel(self.active.other()).dir.clone();
        self.modal = Some(Modal::Confirm {
            message,
            action: Action::Copy {
                sources,
                destination,
                overwrite,
            },
        });
    }

    // Moves run straight away, without a confirmation dialog.
    fn begin_move(&mut self, overwrite: bool) {
        let sources = match self.active_panel().operands() {
            Ok(sources) => sources,
            Err(err) => return self.alert(format!("Error moving file: {err}")),
        };
        let destination = self.panel(self.active.other()).dir.clone();
        self.run_action(Action::Move {
            sources,
            destination,
            overwrite,
        });
    }

    fn begin_delete(&mut self, to_trash: bool) {
        let targets = match self.active_panel().operands() {
            Ok(targets) => targets,
            Err(err) => return self.alert(format!("Error deleting file: {err}")),
        };
        let (verb, action) = if to_trash {
            ("move to trash", Action::Trash { targets })
        } else {
            ("delete", Action::Delete { targets })
        };
        let paths = match &action {
            Action::Trash { targets } | Action::Delete { targets } => list_paths(targets),
            _ => String::new(),
        };
        self.modal = Some(Modal::Confirm {
            message: format!("Are you sure you want to {verb}\n{paths}?"),
            action,
        });
    }

    fn begin_input(&mut self, purpose: InputPurpose) {
        let prompt = match purpose {
            InputPurpose::MkDir => "Enter directory name:",
            InputPurpose::MkFile => "Enter file name:",
        };
        self.modal = Some(Modal::Input {
            prompt: prompt.to_string(),
            buffer: String::new(),
            purpose,
        });
    }

    /// Enter on a confirm, alert or help dialog.
    pub fn confirm(&mut self) {
        if let Some(Modal::Confirm { action, .. }) = self.modal.take() {
            self.run_action(action);
        }
    }

    fn commit_input(&mut self) {
        let Some(Modal::Input {
            buffer, purpose, ..
        }) = self.modal.take()
        else {
            return;
        };
        if buffer.is_empty() {
            return self.alert(AppError::EmptyNameRejected.to_string());
        }
        let action = match purpose {
            InputPurpose::MkDir => Action::MkDir { name: buffer },
            InputPurpose::MkFile => Action::MkFile { name: buffer },
        };
        self.run_action(action);
    }

    // ── Execution ───────────────────────────────────────────────────────────

    /// Execute `action`, refresh the affected panels and report failure.
    pub fn run_action(&mut self, action: Action) {
        let result = self.execute(&action);
        self.refresh_after(&action);
        if let Err(err) = result {
            warn!(?action, error = %err, "action failed");
            self.alert(format!("{}: {err}", action.failure_prefix()));
        }
    }

    /// Perform the filesystem side of `action`. Multi-path actions stop at
    /// the first failure.
    pub fn execute(&self, action: &Action) -> Result<()> {
        match action {
            Action::Copy {
                sources,
                destination,
                overwrite,
            } => {
                for src in sources {
                    operations::copy_recursive(src, destination, *overwrite)?;
                }
            }
            Action::Move {
                sources,
                destination,
                overwrite,
            } => {
                for src in sources {
                    operations::move_item(src, destination, *overwrite)?;
                }
            }
            Action::Delete { targets } => {
                for target in targets {
                    operations::delete(target)?;
                }
            }
            Action::Trash { targets } => {
                for target in targets {
                    operations::trash(target)?;
                }
            }
            Action::MkDir { name } => {
                operations::create_dir(&self.active_panel().dir, name)?;
            }
            Action::MkFile { name } => {
                operations::create_file(&self.active_panel().dir, name)?;
            }
        }
        info!(?action, "action complete");
        Ok(())
    }

    fn refresh_after(&mut self, action: &Action) {
        let same_dir = self.left.dir == self.right.dir;
        self.active_panel_mut().refresh();
        if action.touches_destination() || same_dir {
            let other = self.active.other();
            self.panel_mut(other).refresh();
        }
    }

    /// Release both panels' watches.
    pub fn shutdown(&mut self) {
        if let Some(ctx) = &self.watch {
            for sub in [self.left.subscription.take(), self.right.subscription.take()]
                .into_iter()
                .flatten()
            {
                ctx.registry.unsubscribe(sub);
            }
        }
    }
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
