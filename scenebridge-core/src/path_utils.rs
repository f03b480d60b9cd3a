//! Path and name utilities
//!
//! Windows paths use backslashes (`\`) while scene resource paths and node paths
//! use forward slashes (`/`). These utilities keep both consistent across
//! platforms.

use std::path::Path;

/// Prefix of project-relative resource paths
pub const RESOURCE_SCHEME: &str = "res://";

/// Normalize path to forward slashes
#[inline]
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Convert Path to normalized string
#[inline]
pub fn path_to_string(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// Build a `res://` locator from a project-relative path
pub fn resource_locator(relative: &str) -> String {
    let relative = normalize_path(relative);
    format!("{}{}", RESOURCE_SCHEME, relative.trim_start_matches("./").trim_start_matches('/'))
}

/// Sanitize filename for Windows compatibility
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Replace characters the engine does not allow in node names
///
/// Node names become path segments, so separators and the characters the
/// engine reserves for paths and unique names are replaced with `_`.
pub fn sanitize_node_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '.' | ':' | '@' | '/' | '"' | '%' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("foo\\bar\\baz"), "foo/bar/baz");
        assert_eq!(normalize_path("foo/bar/baz"), "foo/bar/baz");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_path_to_string() {
        let path = PathBuf::from("textures").join("hero.png");
        let result = path_to_string(&path);
        assert!(!result.contains('\\'));
        assert_eq!(result, "textures/hero.png");
    }

    #[test]
    fn test_resource_locator() {
        assert_eq!(resource_locator("textures/hero.png"), "res://textures/hero.png");
        assert_eq!(resource_locator("textures\\hero.png"), "res://textures/hero.png");
        assert_eq!(resource_locator("./textures/hero.png"), "res://textures/hero.png");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("normal_name.png"), "normal_name.png");
        assert_eq!(sanitize_filename("file<>:name"), "file___name");
        assert_eq!(sanitize_filename("dir/file"), "dir_file");
    }

    #[test]
    fn test_sanitize_node_name() {
        assert_eq!(sanitize_node_name("Cube"), "Cube");
        assert_eq!(sanitize_node_name("Cube.001"), "Cube_001");
        assert_eq!(sanitize_node_name("arm/upper:L"), "arm_upper_L");
        assert_eq!(sanitize_node_name("50%"), "50_");
        assert_eq!(sanitize_node_name(""), "_");
    }
}
