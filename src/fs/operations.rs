use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::{AppError, IoResultExt, Result};

/// Check a user-typed name for a new file or directory.
///
/// Names are single path components; anything that would escape the
/// current directory is refused.
pub fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(AppError::EmptyNameRejected);
    }
    if name == "." || name == ".." || name.contains('/') || name.contains(std::path::MAIN_SEPARATOR)
    {
        return Err(AppError::InvalidPath(name.to_string()));
    }
    Ok(name)
}

/// Create an empty file named `name` inside `dir`. Fails if it exists.
pub fn create_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(validate_name(name)?);
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .at(&path)?;
    info!(path = %path.display(), "created file");
    Ok(path)
}

/// Create a directory named `name` inside `dir`.
pub fn create_dir(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(validate_name(name)?);
    fs::create_dir(&path).at(&path)?;
    info!(path = %path.display(), "created directory");
    Ok(path)
}

/// Delete a file or directory. Directories are removed recursively.
pub fn delete(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).at(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path).at(path)?;
    } else {
        fs::remove_file(path).at(path)?;
    }
    info!(path = %path.display(), "deleted");
    Ok(())
}

/// Move a file or directory to the platform trash.
pub fn trash(path: &Path) -> Result<()> {
    trash::delete(path).map_err(|e| AppError::Trash(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "moved to trash");
    Ok(())
}

fn file_name(src: &Path) -> Result<&std::ffi::OsStr> {
    src.file_name()
        .ok_or_else(|| AppError::InvalidPath(src.display().to_string()))
}

/// Lexically normalise `path` so `a/b/../c` and `a/c` compare equal.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Copy `src` into `dest_dir`, keeping its name.
///
/// Directories are copied recursively. Without `overwrite` an existing
/// destination is an error; with it, files are replaced and directories
/// merged. Permission bits of every copied item follow the source.
pub fn copy_recursive(src: &Path, dest_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = dest_dir.join(file_name(src)?);

    let (src_norm, dest_norm) = (normalize(src), normalize(&dest));
    if dest_norm == src_norm {
        return Err(AppError::InvalidPath(format!(
            "cannot copy {} onto itself",
            src.display()
        )));
    }
    let src_is_dir = fs::symlink_metadata(src).is_ok_and(|m| m.is_dir());
    if src_is_dir && dest_norm.starts_with(&src_norm) {
        return Err(AppError::InvalidPath(format!(
            "cannot copy {} into itself",
            src.display()
        )));
    }

    copy_item(src, &dest, overwrite)?;
    info!(src = %src.display(), dest = %dest.display(), overwrite, "copied");
    Ok(dest)
}

fn copy_item(src: &Path, dest: &Path, overwrite: bool) -> Result<()> {
    let meta = fs::symlink_metadata(src).at(src)?;
    let existing = fs::symlink_metadata(dest).ok();
    if existing.is_some() && !overwrite {
        return Err(AppError::AlreadyExists(dest.to_path_buf()));
    }

    if meta.file_type().is_symlink() {
        return copy_symlink(src, dest, existing.as_ref());
    }

    if meta.is_dir() {
        if !existing.as_ref().is_some_and(|m| m.is_dir()) {
            if existing.is_some() {
                fs::remove_file(dest).at(dest)?;
            }
            fs::create_dir(dest).at(dest)?;
        }
        for entry in fs::read_dir(src).at(src)? {
            let entry = entry.at(src)?;
            copy_item(&entry.path(), &dest.join(entry.file_name()), overwrite)?;
        }
    } else {
        if existing.as_ref().is_some_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(dest).at(dest)?;
        }
        fs::copy(src, dest).at(dest)?;
    }
    fs::set_permissions(dest, meta.permissions()).at(dest)?;
    Ok(())
}

/// Recreate the link itself, never its target.
#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path, existing: Option<&fs::Metadata>) -> Result<()> {
    let target = fs::read_link(src).at(src)?;
    match existing {
        Some(m) if m.is_dir() => fs::remove_dir_all(dest).at(dest)?,
        Some(_) => fs::remove_file(dest).at(dest)?,
        None => {}
    }
    std::os::unix::fs::symlink(&target, dest).at(dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path, existing: Option<&fs::Metadata>) -> Result<()> {
    if existing.is_some_and(|m| m.is_dir()) {
        fs::remove_dir_all(dest).at(dest)?;
    }
    // Links to directories are skipped; file links are copied by content.
    if fs::metadata(src).at(src)?.is_dir() {
        return Ok(());
    }
    fs::copy(src, dest).at(dest)?;
    Ok(())
}

/// Move `src` into `dest_dir` with a rename, keeping its name.
///
/// Renames cannot cross filesystems; that error is returned unchanged.
pub fn move_item(src: &Path, dest_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = dest_dir.join(file_name(src)?);
    let meta = fs::symlink_metadata(src).at(src)?;
    if fs::symlink_metadata(&dest).is_ok() && !overwrite {
        return Err(AppError::AlreadyExists(dest));
    }

    fs::rename(src, &dest).at(src)?;
    if !meta.file_type().is_symlink() {
        fs::set_permissions(&dest, meta.permissions()).at(&dest)?;
    }
    info!(src = %src.display(), dest = %dest.display(), overwrite, "moved");
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_file() {
        let tmp = TempDir::new().unwrap();
        let path = create_file(tmp.path(), "test.txt").unwrap();
        assert_eq!(path, tmp.path().join("test.txt"));
        assert!(path.is_file());
    }

    #[test]
    fn test_create_file_existing_fails() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("taken"), "keep me").unwrap();
        let err = create_file(tmp.path(), "taken").unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(tmp.path().join("taken")).unwrap(), "keep me");
    }

    #[test]
    fn test_create_dir() {
        let tmp = TempDir::new().unwrap();
        let path = create_dir(tmp.path(), "subdir").unwrap();
        assert!(path.is_dir());
        assert!(matches!(
            create_dir(tmp.path(), "subdir"),
            Err(AppError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_name_validation() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            create_dir(tmp.path(), ""),
            Err(AppError::EmptyNameRejected)
        ));
        assert!(matches!(
            create_file(tmp.path(), "a/b"),
            Err(AppError::InvalidPath(_))
        ));
        assert!(matches!(
            create_dir(tmp.path(), ".."),
            Err(AppError::InvalidPath(_))
        ));
        assert!(validate_name("notes.md").is_ok());
    }

    #[test]
    fn test_delete_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("delete_me.txt");
        fs::write(&file_path, "").unwrap();
        delete(&file_path).unwrap();
        assert!(!file_path.exists());
    }

    #[test]
    fn test_delete_directory_recursively() {
        let tmp = TempDir::new().unwrap();
        let dir_path = tmp.path().join("parent");
        let nested_dir = dir_path.join("child");
        fs::create_dir_all(&nested_dir).unwrap();
        fs::write(nested_dir.join("file.txt"), "x").unwrap();
        fs::write(dir_path.join("root_file.txt"), "y").unwrap();

        delete(&dir_path).unwrap();
        assert!(!dir_path.exists());
    }

    #[test]
    fn test_delete_nonexistent_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no_such_file.txt");
        assert!(matches!(delete(&path), Err(AppError::NotFound(p)) if p == path));
    }

    fn make_tree(root: &Path) -> PathBuf {
        let src = root.join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), "aaa").unwrap();
        fs::write(src.join("sub").join("b.txt"), "bbb").unwrap();
        src
    }

    #[test]
    fn test_copy_directory_recursive() {
        let tmp = TempDir::new().unwrap();
        let src = make_tree(tmp.path());
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();

        let result = copy_recursive(&src, &dest_dir, false).unwrap();
        assert_eq!(result, dest_dir.join("src"));
        assert_eq!(fs::read_to_string(result.join("a.txt")).unwrap(), "aaa");
        assert_eq!(
            fs::read_to_string(result.join("sub").join("b.txt")).unwrap(),
            "bbb"
        );
        assert!(src.join("a.txt").exists());
    }

    #[test]
    fn test_copy_existing_requires_overwrite() {
        let tmp = TempDir::new().unwrap();
        let src = make_tree(tmp.path());
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();
        copy_recursive(&src, &dest_dir, false).unwrap();

        let err = copy_recursive(&src, &dest_dir, false).unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(p) if p == dest_dir.join("src")));

        fs::write(src.join("a.txt"), "changed").unwrap();
        fs::write(dest_dir.join("src").join("extra.txt"), "kept").unwrap();
        copy_recursive(&src, &dest_dir, true).unwrap();
        assert_eq!(
            fs::read_to_string(dest_dir.join("src").join("a.txt")).unwrap(),
            "changed"
        );
        assert!(dest_dir.join("src").join("extra.txt").exists());
    }

    #[test]
    fn test_copy_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.txt");
        fs::write(&src, "hello").unwrap();
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();

        let result = copy_recursive(&src, &dest_dir, false).unwrap();
        assert_eq!(fs::read_to_string(&result).unwrap(), "hello");
        assert!(src.exists());
    }

    #[test]
    fn test_copy_onto_itself_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("same.txt");
        fs::write(&src, "x").unwrap();
        assert!(matches!(
            copy_recursive(&src, tmp.path(), true),
            Err(AppError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_copy_into_own_subtree_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = make_tree(tmp.path());
        assert!(matches!(
            copy_recursive(&src, &src.join("sub"), false),
            Err(AppError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("run.sh");
        fs::write(&src, "#!/bin/sh").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o750)).unwrap();
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();

        let result = copy_recursive(&src, &dest_dir, false).unwrap();
        let mode = fs::metadata(result).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_keeps_symlinks_as_links() {
        let tmp = TempDir::new().unwrap();
        let src = make_tree(tmp.path());
        std::os::unix::fs::symlink(".", src.join("loop")).unwrap();
        std::os::unix::fs::symlink("a.txt", src.join("alias")).unwrap();
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();

        let result = copy_recursive(&src, &dest_dir, false).unwrap();
        let copied_loop = result.join("loop");
        assert!(fs::symlink_metadata(&copied_loop)
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(fs::read_link(&copied_loop).unwrap(), PathBuf::from("."));
        assert_eq!(fs::read_link(result.join("alias")).unwrap(), PathBuf::from("a.txt"));
        assert_eq!(fs::read_to_string(result.join("alias")).unwrap(), "aaa");

        // overwriting replaces the links rather than following them
        copy_recursive(&src, &dest_dir, true).unwrap();
        assert_eq!(fs::read_link(&copied_loop).unwrap(), PathBuf::from("."));
    }

    #[test]
    fn test_trash_moves_file_out_of_place() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("discard.txt");
        fs::write(&path, "bye").unwrap();
        match trash(&path) {
            Ok(()) => assert!(!path.exists()),
            // No usable trash can on this machine; the file must be untouched.
            Err(err) => {
                assert!(matches!(err, AppError::Trash(ref msg) if msg.contains("discard.txt")));
                assert!(path.exists());
            }
        }
    }

    #[test]
    fn test_trash_missing_path_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            trash(&tmp.path().join("ghost.txt")),
            Err(AppError::Trash(_))
        ));
    }

    #[test]
    fn test_move_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("move_me.txt");
        fs::write(&src, "content").unwrap();
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();

        let result = move_item(&src, &dest_dir, false).unwrap();
        assert_eq!(result, dest_dir.join("move_me.txt"));
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&result).unwrap(), "content");
    }

    #[test]
    fn test_move_directory() {
        let tmp = TempDir::new().unwrap();
        let src = make_tree(tmp.path());
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();

        let result = move_item(&src, &dest_dir, false).unwrap();
        assert!(result.join("sub").join("b.txt").exists());
        assert!(!src.exists());
    }

    #[test]
    fn test_move_existing_requires_overwrite() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("f.txt");
        fs::write(&src, "new").unwrap();
        let dest_dir = tmp.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(dest_dir.join("f.txt"), "old").unwrap();

        assert!(matches!(
            move_item(&src, &dest_dir, false),
            Err(AppError::AlreadyExists(_))
        ));
        assert!(src.exists());

        move_item(&src, &dest_dir, true).unwrap();
        assert_eq!(fs::read_to_string(dest_dir.join("f.txt")).unwrap(), "new");
    }

    #[test]
    fn test_move_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let err = move_item(&tmp.path().join("ghost"), tmp.path(), false).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
