use std::path::{Path, PathBuf};

/// Expand a leading `~` to the user's home directory.
///
/// Returns `None` when the path starts with `~` but the home directory
/// cannot be determined. Non-tilde paths are always returned as-is.
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if path == "~" {
        dirs::home_dir()
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}

/// Expand `~` and anchor relative paths at `base`.
pub fn resolve_path(raw: &str, base: &Path) -> Option<PathBuf> {
    let expanded = expand_tilde(raw)?;
    if expanded.is_absolute() {
        Some(expanded)
    } else {
        Some(base.join(expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(
            expand_tilde("/absolute/path"),
            Some(PathBuf::from("/absolute/path"))
        );
    }

    #[test]
    fn tilde_with_rest_expands() {
        let result = expand_tilde("~/repos").expect("home dir should exist in test env");
        assert!(result.to_string_lossy().ends_with("repos"));
        assert!(!result.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn tilde_in_middle_not_expanded() {
        assert_eq!(
            expand_tilde("/some/~/path"),
            Some(PathBuf::from("/some/~/path"))
        );
    }

    #[test]
    fn relative_path_anchored_at_base() {
        assert_eq!(
            resolve_path("repos/alpha", Path::new("/work")),
            Some(PathBuf::from("/work/repos/alpha"))
        );
        assert_eq!(
            resolve_path("/srv/beta", Path::new("/work")),
            Some(PathBuf::from("/srv/beta"))
        );
    }
}
