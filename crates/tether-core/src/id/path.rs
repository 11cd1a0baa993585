//! Slash-separated remote-store path helpers.

use crate::{Error, Result};

/// Base path of every endpoint as seen by the transfer API.
pub const ROOT_PATH: &str = "~";

/// Prefix that data-plane relative paths are derived from.
const HOME_PREFIX: &str = "~/";

/// Joins a child name onto a parent path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Returns the final component of a path.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Returns the parent of a path.
///
/// The parent of a single-component path is the path itself.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => path,
    }
}

/// Converts a transfer-API path into a path relative to the endpoint's
/// home directory, as addressed by the HTTPS data plane.
///
/// Only paths below `~/` are accepted. Absolute paths, the bare base path
/// and paths with empty, `.` or `..` segments are rejected rather than
/// truncated.
pub fn data_plane_relative(path: &str) -> Result<&str> {
    let relative = path.strip_prefix(HOME_PREFIX).ok_or_else(|| {
        Error::unsupported_path()
            .with_message("Path is not below the endpoint home directory")
            .with_context(format!("path: {path}"))
    })?;

    let invalid_segment = relative
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid_segment {
        return Err(Error::unsupported_path()
            .with_message("Path contains empty or relative segments")
            .with_context(format!("path: {path}")));
    }

    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn join_paths() {
        assert_eq!(join("~", "data"), "~/data");
        assert_eq!(join("~/data", "a.txt"), "~/data/a.txt");
        assert_eq!(join("/", "etc"), "/etc");
    }

    #[test]
    fn basename_and_dirname() {
        assert_eq!(basename("~/data/a.txt"), "a.txt");
        assert_eq!(basename("~"), "~");
        assert_eq!(dirname("~/data/a.txt"), "~/data");
        assert_eq!(dirname("~/data"), "~");
        assert_eq!(dirname("~"), "~");
        assert_eq!(dirname("/etc"), "/");
    }

    #[test]
    fn relative_path_strips_home() {
        assert_eq!(data_plane_relative("~/a.txt").unwrap(), "a.txt");
        assert_eq!(data_plane_relative("~/dir/b c.bin").unwrap(), "dir/b c.bin");
    }

    #[test]
    fn relative_path_rejects_other_conventions() {
        for path in ["~", "~/", "/abs/file", "data/file", "~/a/../b", "~/a//b", "~/./a"] {
            let error = data_plane_relative(path).unwrap_err();
            assert_eq!(error.kind, ErrorKind::UnsupportedPath, "path: {path}");
        }
    }
}
