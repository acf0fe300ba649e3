//! Regex utilities for the code generator
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown code fence detection
pub mod fence {
    use super::*;

    /// Opening fence: three or more backticks plus an optional info string
    pub static OPENING: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*`{3,}\s*([A-Za-z0-9_+#.\-]*)\s*$").expect("Invalid regex pattern")
    });

    /// Closing fence: a line with nothing but backticks
    pub static CLOSING: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\s*`{3,}\s*$").expect("Invalid regex pattern"));

    /// Returns the info string (possibly empty) if the line opens a fence
    pub fn opening_info(line: &str) -> Option<&str> {
        OPENING
            .captures(line)
            .map(|caps| caps.get(1).map(|m| m.as_str()).unwrap_or(""))
    }

    pub fn is_closing(line: &str) -> bool {
        CLOSING.is_match(line)
    }
}

/// Language tag detection
pub mod language {
    use super::*;

    /// A lone word on its own line, as models emit after an opening fence
    pub static BARE_TAG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_+#.\-]*)\s*$").expect("Invalid regex pattern"));

    /// Identifiers models commonly use to label a code block
    pub const KNOWN_TAGS: &[&str] = &[
        "java", "python", "py", "javascript", "js", "typescript", "ts", "jsx", "tsx", "c", "cpp",
        "c++", "cxx", "csharp", "cs", "c#", "go", "golang", "rust", "rs", "kotlin", "kt", "swift",
        "php", "ruby", "rb", "scala", "r", "sql", "html", "css", "scss", "bash", "sh", "shell",
        "zsh", "powershell", "ps1", "json", "yaml", "yml", "toml", "xml", "dart", "lua", "perl",
        "haskell", "elixir", "erlang", "clojure", "groovy", "objective-c", "objc", "vue",
        "react", "angular", "node", "node.js", "nodejs",
    ];

    pub struct LanguageMatcher {
        extra: Vec<String>,
    }

    impl LanguageMatcher {
        pub fn new() -> Self {
            Self { extra: Vec::new() }
        }

        /// Also accept `name` (and its space-free form) as a tag
        pub fn with_language(mut self, name: &str) -> Self {
            let lower = name.trim().to_lowercase();
            if !lower.is_empty() {
                self.extra.push(lower.replace(' ', ""));
                self.extra.push(lower);
            }
            self
        }

        /// True when the whole line is a single known language identifier
        pub fn is_tag_line(&self, line: &str) -> bool {
            let Some(caps) = BARE_TAG.captures(line) else {
                return false;
            };
            let word = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();

            KNOWN_TAGS.contains(&word.as_str()) || self.extra.iter().any(|e| *e == word)
        }
    }

    impl Default for LanguageMatcher {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Conversational lead-in lines ("Here is...", "This code...")
pub mod opener {
    use super::*;

    pub static LEAD_IN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(?:Here|This|The following)\b").expect("Invalid regex pattern")
    });

    pub fn is_lead_in(line: &str) -> bool {
        LEAD_IN.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_detection() {
        assert_eq!(fence::opening_info("```java"), Some("java"));
        assert_eq!(fence::opening_info("```"), Some(""));
        assert_eq!(fence::opening_info("  ```c++  "), Some("c++"));
        assert_eq!(fence::opening_info("public class Test {}"), None);

        assert!(fence::is_closing("```"));
        assert!(!fence::is_closing("```java"));
    }

    #[test]
    fn test_language_tag_detection() {
        let matcher = language::LanguageMatcher::new();

        assert!(matcher.is_tag_line("python"));
        assert!(matcher.is_tag_line("  Java "));
        assert!(!matcher.is_tag_line("int x = 1;"));
        assert!(!matcher.is_tag_line("main"));

        let matcher = language::LanguageMatcher::new().with_language("Spring Boot");
        assert!(matcher.is_tag_line("springboot"));
    }

    #[test]
    fn test_lead_in_detection() {
        assert!(opener::is_lead_in("Here is the code:"));
        assert!(opener::is_lead_in("This implementation uses a map."));
        assert!(opener::is_lead_in("The following snippet does it"));
        assert!(!opener::is_lead_in("Thistle = 1"));
        assert!(!opener::is_lead_in("public class Here {}"));
    }
}
