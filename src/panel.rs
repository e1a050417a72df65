use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::fs::listing::{list_directory, Counts, Entry};
use crate::fs::watch::Subscription;

/// Which of the two panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelSide {
    Left,
    Right,
}

impl PanelSide {
    pub fn other(self) -> Self {
        match self {
            PanelSide::Left => PanelSide::Right,
            PanelSide::Right => PanelSide::Left,
        }
    }
}

/// One pane: its directory, the listing, cursor and selection.
#[derive(Debug)]
pub struct PanelState {
    pub dir: PathBuf,
    pub entries: Vec<Entry>,
    pub counts: Counts,
    pub highlighted: usize,
    pub selected: BTreeSet<PathBuf>,
    pub subscription: Option<Subscription>,
}

impl PanelState {
    /// Create a panel showing `dir`. The watch is attached by the caller.
    pub fn new(dir: &Path) -> Self {
        let (counts, entries) = list_directory(dir);
        Self {
            dir: dir.to_path_buf(),
            entries,
            counts,
            highlighted: 0,
            selected: BTreeSet::new(),
            subscription: None,
        }
    }

    /// Re-read the directory and start over: the listing is replaced, the
    /// highlight returns to the first row and the selection is dropped.
    pub fn refresh(&mut self) {
        let (counts, entries) = list_directory(&self.dir);
        self.entries = entries;
        self.counts = counts;
        self.highlighted = 0;
        self.selected.clear();
    }

    /// Re-root the panel at `dir` and reload it.
    pub fn change_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.refresh();
    }

    pub fn highlighted_entry(&self) -> Option<&Entry> {
        self.entries.get(self.highlighted)
    }

    /// Toggle the highlighted row in the selection. The parent row is
    /// never selectable.
    pub fn toggle_selected(&mut self) {
        let Some(entry) = self.entries.get(self.highlighted) else {
            return;
        };
        if entry.is_parent() {
            return;
        }
        if !self.selected.remove(&entry.path) {
            self.selected.insert(entry.path.clone());
        }
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selected.contains(path)
    }

    /// Paths an operation should act on: the selection if any, otherwise
    /// the highlighted row.
    pub fn operands(&self) -> Result<Vec<PathBuf>> {
        if !self.selected.is_empty() {
            return Ok(self.selected.iter().cloned().collect());
        }
        match self.highlighted_entry() {
            Some(entry) if !entry.is_parent() => Ok(vec![entry.path.clone()]),
            _ => Err(AppError::NoOperandSelected),
        }
    }

    pub fn select_next(&mut self) {
        self.move_by(1);
    }

    pub fn select_previous(&mut self) {
        self.move_by(-1);
    }

    pub fn page_down(&mut self, page: usize) {
        self.move_by(page.max(1) as isize);
    }

    pub fn page_up(&mut self, page: usize) {
        self.move_by(-(page.max(1) as isize));
    }

    pub fn select_first(&mut self) {
        self.highlighted = 0;
    }

    pub fn select_last(&mut self) {
        self.highlighted = self.entries.len().saturating_sub(1);
    }

    fn move_by(&mut self, delta: isize) {
        let last = self.entries.len().saturating_sub(1);
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(last);
    }
}
