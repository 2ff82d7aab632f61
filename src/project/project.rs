use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::compiler::{output::compiled_file_name, superscan::scan_file_name};
use crate::result::Result;

/// Given the path to a sequencer file, return the name that should be used
/// for its outputs: the file name without extension.
pub fn get_project_name(src: &Path) -> Result<&str> {
    src.file_stem()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("Could not extract name from {}", src.display()))
}

/// Where the listing of `src` is written.  `output` may name the listing
/// itself or an existing directory to put it in; without it the listing
/// goes to the current directory.
pub fn listing_path(src: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(dir) if dir.is_dir() => dir.join(compiled_file_name(src)),
        Some(file) => file.to_path_buf(),
        None => compiled_file_name(src),
    }
}

/// Where the listing of the super-scan frame at `offset` is written.
pub fn scan_listing_path(dir: &Path, offset: u64, src: &Path) -> PathBuf {
    dir.join(compiled_file_name(Path::new(&scan_file_name(offset, src))))
}

/// `<name>.manifest` next to `listing`.
pub fn manifest_path(listing: &Path, name: &str) -> PathBuf {
    listing
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{}.manifest", name))
}

/// Writes `text` to a `.part` file next to `path` and renames it to `path`
/// once complete, so a failed write never leaves a truncated file at `path`.
pub fn write_output(path: &Path, text: &str) -> Result<()> {
    let part = part_path(path);
    std::fs::write(&part, text)
        .and_then(|()| std::fs::rename(&part, path))
        .map_err(|e| {
            let _ = std::fs::remove_file(&part);
            format!("Could not write {}: {}", path.display(), e)
        })
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
