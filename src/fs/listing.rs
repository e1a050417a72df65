use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use humansize::{format_size, DECIMAL};
use tracing::debug;

/// Name of the synthetic entry that leads to the parent directory.
pub const PARENT_NAME: &str = "..";

/// One row of a panel listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    /// Byte size; `None` for directories.
    pub size: Option<u64>,
    pub size_display: String,
    pub permissions: String,
}

impl Entry {
    pub fn is_parent(&self) -> bool {
        self.name == PARENT_NAME
    }

    fn parent_of(dir: &Path) -> Self {
        Self {
            path: dir.parent().unwrap_or(dir).to_path_buf(),
            name: PARENT_NAME.to_string(),
            is_dir: true,
            size: None,
            size_display: String::new(),
            permissions: String::new(),
        }
    }
}

/// Totals shown in the panel footer. The parent entry is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub dirs: usize,
    pub files: usize,
}

/// Read `dir` into a sorted listing: `..` first, then directories, then
/// files, each group ordered by name.
///
/// An unreadable directory yields just the parent entry. Names that cannot be
/// stat'ed (dangling symlinks, races with deletion) are skipped.
pub fn list_directory(dir: &Path) -> (Counts, Vec<Entry>) {
    let mut entries = vec![Entry::parent_of(dir)];

    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "cannot read directory");
            return (Counts::default(), entries);
        }
    };

    let mut children: Vec<Entry> = read
        .filter_map(|res| res.ok())
        .filter_map(|dirent| {
            let path = dirent.path();
            // Follows symlinks, so a link to a directory lists as a directory.
            let meta = fs::metadata(&path).ok()?;
            let is_dir = meta.is_dir();
            let size = (!is_dir).then(|| meta.len());
            Some(Entry {
                name: dirent.file_name().to_string_lossy().into_owned(),
                is_dir,
                size,
                size_display: size.map(|s| format_size(s, DECIMAL)).unwrap_or_default(),
                permissions: permissions_string(&meta),
                path,
            })
        })
        .collect();

    children.sort_by(compare_entries);

    let dirs = children.iter().filter(|e| e.is_dir).count();
    let counts = Counts {
        total: children.len(),
        dirs,
        files: children.len() - dirs,
    };

    entries.extend(children);
    (counts, entries)
}

fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
}

#[cfg(unix)]
fn permissions_string(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut s = String::with_capacity(10);
    s.push(if meta.is_dir() { 'd' } else { '-' });
    let flags = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    for (bit, ch) in flags {
        s.push(if mode & bit != 0 { ch } else { '-' });
    }
    s
}

#[cfg(not(unix))]
fn permissions_string(meta: &fs::Metadata) -> String {
    let kind = if meta.is_dir() { 'd' } else { '-' };
    let write = if meta.permissions().readonly() { '-' } else { 'w' };
    format!("{kind}r{write}")
}
