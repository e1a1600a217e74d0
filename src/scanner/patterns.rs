use std::path::{Component, Path};

pub const DEFAULT_PLACEHOLDER_PATTERNS: &[&str] = &[
    "untitled",
    "new folder",
    "new file",
    "screenshot",
    "image",
    "document",
];

/// Case-insensitive substring test against a fixed pattern set.
#[derive(Debug, Clone)]
pub struct PlaceholderMatcher {
    patterns: Vec<String>,
}

impl PlaceholderMatcher {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.patterns.iter().any(|pattern| name.contains(pattern.as_str()))
    }
}

impl Default for PlaceholderMatcher {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PLACEHOLDER_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// True if `path`, or any directory between `root` and it, is dot-prefixed.
/// The root itself is never considered hidden.
pub fn is_hidden(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_match_case_insensitively() {
        let matcher = PlaceholderMatcher::default();
        assert!(matcher.matches("Untitled.txt"));
        assert!(matcher.matches("New Folder"));
        assert!(matcher.matches("Screenshot 2024-01-02 at 10.11.12.png"));
        assert!(matcher.matches("IMAGE_0042.HEIC"));
        assert!(!matcher.matches("RegularFile.txt"));
        assert!(!matcher.matches("NewFolder"));
    }

    #[test]
    fn test_custom_patterns_replace_defaults() {
        let matcher = PlaceholderMatcher::new(&["Scan".to_string(), "".to_string()]);
        assert!(matcher.matches("scan0001.pdf"));
        assert!(!matcher.matches("Untitled.txt"));
    }

    #[test]
    fn test_hidden_is_relative_to_root() {
        let root = Path::new("/tmp/.tmpAbc123");
        assert!(!is_hidden(root, Path::new("/tmp/.tmpAbc123/Untitled.txt")));
        assert!(is_hidden(root, Path::new("/tmp/.tmpAbc123/.cache/Untitled.txt")));
        assert!(is_hidden(root, Path::new("/tmp/.tmpAbc123/.Untitled.txt")));
    }
}
