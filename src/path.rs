//! Path normalization.
//!
//! Every comparison between module paths in this crate happens on the
//! normalized form produced here:
//!
//! ```text
//! normalize(path) = forward_slashes(lexical_clean(absolute(path)))
//! ```
//!
//! Where:
//! - `absolute`: join onto the current working directory unless already absolute
//! - `lexical_clean`: drop `.` and empty segments, fold `..` into its parent
//! - `forward_slashes`: `\` → `/`
//!
//! Normalization never touches the filesystem, so symlinks are left as-is and
//! paths that do not exist normalize like any other string.

use std::path::Path;

/// Normalize a path to its absolute, forward-slash form.
///
/// Relative paths are resolved against the process's current working
/// directory. Idempotent: normalizing a normalized path returns it unchanged.
///
/// # Example
///
/// ```rust
/// use next_affected::path::normalize_path;
///
/// assert_eq!(normalize_path("/project/pages\\home.js"), "/project/pages/home.js");
/// assert_eq!(normalize_path("/project/src/../pages/"), "/project/pages");
/// ```
pub fn normalize_path(path: impl AsRef<Path>) -> String {
    let raw = to_forward_slashes(path.as_ref());
    if is_absolute(&raw) {
        return clean(&raw);
    }
    match std::env::current_dir() {
        Ok(cwd) => resolve_in(cwd, &raw),
        // Best effort: without a working directory the path stays relative.
        Err(_) => clean(&raw),
    }
}

/// Resolve `path` against `base` and normalize the result.
///
/// An absolute `path` wins over `base`, mirroring how a shell resolves
/// `cd base && realpath path` without following links.
pub fn resolve_in(base: impl AsRef<Path>, path: impl AsRef<Path>) -> String {
    let raw = to_forward_slashes(path.as_ref());
    if is_absolute(&raw) {
        return clean(&raw);
    }
    let base = normalize_path(base);
    if raw.is_empty() {
        return base;
    }
    clean(&format!("{base}/{raw}"))
}

/// Lexical relative path from `base` to `path`.
///
/// Both sides are normalized first. Returns an empty string when they are
/// the same location.
pub fn relative_to(base: impl AsRef<Path>, path: impl AsRef<Path>) -> String {
    let base = normalize_path(base);
    let path = normalize_path(path);

    let base_segments: Vec<&str> = segments(&base).collect();
    let path_segments: Vec<&str> = segments(&path).collect();

    let common = base_segments
        .iter()
        .zip(path_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(base_segments.len() - common));
    parts.extend(&path_segments[common..]);
    parts.join("/")
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    // Windows drive paths, already converted to forward slashes.
    matches!(path.split_once('/'), Some((drive, _)) if is_drive(drive))
}

fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." && !(parts.len() == 1 && is_drive(last)) => {
                    parts.pop();
                }
                // `..` above the root stays at the root.
                Some(_) if parts.len() == 1 && is_drive(parts[0]) => {}
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) if parts.len() == 1 && is_drive(parts[0]) => format!("{joined}/"),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backslashes_become_forward_slashes() {
        assert_eq!(normalize_path("/project/pages\\home.js"), "/project/pages/home.js");
    }

    #[test]
    fn test_dot_segments_are_folded() {
        assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
        assert_eq!(normalize_path("/a/b/"), "/a/b");
        assert_eq!(normalize_path("/../.."), "/");
    }

    #[test]
    fn test_relative_resolves_against_cwd() {
        let cwd = normalize_path(std::env::current_dir().unwrap());
        assert_eq!(normalize_path("src/x.ts"), format!("{cwd}/src/x.ts"));
    }

    #[test]
    fn test_idempotent() {
        for p in ["/a/b/c.tsx", "relative/file.ts", "/x/../y", "C:\\proj\\pages\\a.tsx"] {
            let once = normalize_path(p);
            assert_eq!(normalize_path(&once), once);
        }
    }

    #[test]
    fn test_windows_drive_paths() {
        assert_eq!(normalize_path("C:\\proj\\pages\\a.tsx"), "C:/proj/pages/a.tsx");
        assert_eq!(normalize_path("C:/proj/../.."), "C:/");
    }

    #[test]
    fn test_resolve_in() {
        assert_eq!(resolve_in("/project", "pages/index.tsx"), "/project/pages/index.tsx");
        assert_eq!(resolve_in("/project", "../shared/a.ts"), "/shared/a.ts");
        assert_eq!(resolve_in("/project", "/abs/a.ts"), "/abs/a.ts");
        assert_eq!(resolve_in("/project", ""), "/project");
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to("/project", "/project/src/a.ts"), "src/a.ts");
        assert_eq!(relative_to("/project/app", "/project/src/a.ts"), "../src/a.ts");
        assert_eq!(relative_to("/project", "/project"), "");
    }
}
