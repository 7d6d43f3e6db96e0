//! Template copying with ignore filtering

use crate::templates::ignore::IgnoreList;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Recursively copy `template_root` into `target_dir`, skipping ignored paths.
///
/// `target_dir` must not exist yet; it is created here, exclusively. If the
/// copy fails afterwards the directory is removed again. Returns the copied
/// file paths relative to the template root.
pub fn copy_template(
    template_root: &Path,
    target_dir: &Path,
    ignore: &IgnoreList,
) -> Result<Vec<String>> {
    create_target(target_dir)?;

    copy_entries(template_root, target_dir, ignore).map_err(|e| {
        let _ = fs::remove_dir_all(target_dir);
        e
    })
}

/// Create `target_dir`, failing if anything already exists at that path
fn create_target(target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    match fs::create_dir(target_dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            anyhow::bail!("Directory \"{}\" already exists", target_dir.display())
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to create directory: {}", target_dir.display())),
    }
}

fn copy_entries(
    template_root: &Path,
    target_dir: &Path,
    ignore: &IgnoreList,
) -> Result<Vec<String>> {
    let mut copied_files = Vec::new();

    let walker = WalkDir::new(template_root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry, template_root, ignore));

    for entry in walker {
        let entry = entry.with_context(|| {
            format!("Failed to read template directory {}", template_root.display())
        })?;
        let relative = entry
            .path()
            .strip_prefix(template_root)
            .context("Template entry outside template root")?;
        let target_path = target_dir.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target_path).with_context(|| {
                format!("Failed to create directory: {}", target_path.display())
            })?;
            continue;
        }

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        if file_type.is_symlink() {
            copy_symlink(entry.path(), &target_path)?;
        } else {
            fs::copy(entry.path(), &target_path)
                .with_context(|| format!("Failed to write file: {}", target_path.display()))?;
        }

        copied_files.push(relative_slash_path(relative));
    }

    Ok(copied_files)
}

fn is_ignored(entry: &DirEntry, root: &Path, ignore: &IgnoreList) -> bool {
    match entry.path().strip_prefix(root) {
        Ok(relative) => ignore.is_ignored(&relative_slash_path(relative)),
        Err(_) => false,
    }
}

/// Relative path with `/` separators regardless of platform
fn relative_slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    let link = fs::read_link(source)
        .with_context(|| format!("Failed to read symlink: {}", source.display()))?;
    std::os::unix::fs::symlink(&link, target)
        .with_context(|| format!("Failed to create symlink: {}", target.display()))
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target)
        .map(|_| ())
        .with_context(|| format!("Failed to write file: {}", target.display()))
}
