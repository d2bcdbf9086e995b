//! Album list input: one link per line.

use std::fs;
use std::path::Path;

use crate::error::StartupError;

/// Reads the album list once at startup.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. A missing
/// file, a zero-byte file, or a file without any link is a startup error.
pub fn read_identifiers(path: &Path) -> Result<Vec<String>, StartupError> {
    if !path.exists() {
        return Err(StartupError::InputMissing(path.to_path_buf()));
    }
    let data = fs::read_to_string(path).map_err(|source| StartupError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;

    let identifiers = parse_identifiers(&data);
    if identifiers.is_empty() {
        return Err(StartupError::InputEmpty(path.to_path_buf()));
    }
    Ok(identifiers)
}

pub(crate) fn parse_identifiers(data: &str) -> Vec<String> {
    data.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
