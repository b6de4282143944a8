use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// Build a matcher from the `.gitignore` at the root of the tree, if any
pub fn create_gitignore_matcher(root: &Path) -> Gitignore {
    let mut builder = GitignoreBuilder::new(root);

    let local_gitignore = root.join(".gitignore");
    if local_gitignore.is_file() {
        if let Some(err) = builder.add(&local_gitignore) {
            warn!("Ignoring unreadable {}: {err}", local_gitignore.display());
        }
    }

    builder.build().unwrap_or_else(|err| {
        warn!("Failed to build gitignore matcher for {}: {err}", root.display());
        Gitignore::empty()
    })
}

/// Files come before subdirectories, each group sorted by name
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_ignored(gitignore: &Gitignore, entry: &DirEntry) -> bool {
    let is_dir = entry.file_type().is_dir();
    (is_dir && entry.file_name() == ".git")
        || entry.file_name() == ".gitignore"
        || gitignore.matched(entry.path(), is_dir).is_ignore()
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    Error::io(path, source)
}

/// Collect every regular file below `root`, at any depth.
///
/// Each directory lists its files before descending into its subdirectories.
/// Symlinks are not followed. With `respect_gitignore`, entries matched by
/// the root's `.gitignore` (and the `.git` directory) are skipped.
pub fn walk_tree(root: &Path, respect_gitignore: bool) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(root).map_err(|e| Error::io(root, e))?;
    if !metadata.is_dir() {
        return Err(Error::io(
            root,
            io::Error::new(io::ErrorKind::NotADirectory, "source root is not a directory"),
        ));
    }

    let gitignore = if respect_gitignore {
        create_gitignore_matcher(root)
    } else {
        Gitignore::empty()
    };

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !respect_gitignore || !is_ignored(&gitignore, entry)
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} file(s) under {}", files.len(), root.display());
    Ok(files)
}
