//! Cleanup of raw model output into a bare code snippet

use regex_utils::{fence, language::LanguageMatcher, opener};

/// Returned when the model produced nothing usable
pub const NO_CODE_PLACEHOLDER: &str = "// No code generated";

/// Strip markdown fencing, a language tag line and conversational lead-in
/// lines from `raw`.
///
/// `language` is the language the caller asked for; it is accepted as a tag
/// in addition to the well-known identifiers.
pub fn clean_generated_code(raw: &str, language: &str) -> String {
    if raw.trim().is_empty() {
        return NO_CODE_PLACEHOLDER.to_string();
    }

    let matcher = LanguageMatcher::new().with_language(language);
    let lines: Vec<&str> = raw.lines().collect();

    let mut body = strip_opening_fence(skip_blank(&lines), &matcher);
    body = trim_trailing_blank(body);
    if body.last().is_some_and(|line| fence::is_closing(line)) {
        body = &body[..body.len() - 1];
    }

    body = skip_lead_in(body);

    // Prose may precede the fence instead of sitting inside it
    let unfenced = strip_opening_fence(body, &matcher);
    if unfenced.len() != body.len() {
        body = skip_blank(unfenced);
    }

    body.join("\n").trim_end().to_string()
}

/// Drop an opening fence, and a tag line after a fence that carried none
fn strip_opening_fence<'a, 'b>(lines: &'a [&'b str], matcher: &LanguageMatcher) -> &'a [&'b str] {
    let Some(info) = lines.first().and_then(|first| fence::opening_info(first)) else {
        return lines;
    };

    let rest = &lines[1..];
    if info.is_empty() && rest.first().is_some_and(|line| matcher.is_tag_line(line)) {
        &rest[1..]
    } else {
        rest
    }
}

fn skip_blank<'a, 'b>(lines: &'a [&'b str]) -> &'a [&'b str] {
    let start = lines.iter().position(|line| !line.trim().is_empty()).unwrap_or(lines.len());
    &lines[start..]
}

fn skip_lead_in<'a, 'b>(lines: &'a [&'b str]) -> &'a [&'b str] {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty() && !opener::is_lead_in(line))
        .unwrap_or(lines.len());
    &lines[start..]
}

fn trim_trailing_blank<'a, 'b>(lines: &'a [&'b str]) -> &'a [&'b str] {
    let end = lines.iter().rposition(|line| !line.trim().is_empty()).map_or(0, |i| i + 1);
    &lines[..end]
}

/// True when `code` carries no usable text
pub fn is_unusable(code: &str) -> bool {
    let trimmed = code.trim();
    trimmed.is_empty() || trimmed == NO_CODE_PLACEHOLDER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fence_with_tag() {
        let raw = "```java\npublic class Test {}\n```";
        assert_eq!(clean_generated_code(raw, "Java"), "public class Test {}");
    }

    #[test]
    fn test_strips_bare_tag_after_fence() {
        let raw = "```\npython\ndef add(a, b):\n    return a + b\n```\n";
        assert_eq!(clean_generated_code(raw, "Python"), "def add(a, b):\n    return a + b");
    }

    #[test]
    fn test_requested_language_counts_as_tag() {
        let raw = "```\nSpringBoot\n@RestController\nclass Api {}\n```";
        assert_eq!(clean_generated_code(raw, "Spring Boot"), "@RestController\nclass Api {}");
    }

    #[test]
    fn test_tag_line_not_stripped_without_fence() {
        // Without an opening fence a lone word is treated as code
        let raw = "go\nfunc main() {}";
        assert_eq!(clean_generated_code(raw, "Go"), "go\nfunc main() {}");
    }

    #[test]
    fn test_drops_leading_prose() {
        let raw = "Here is the code you asked for:\n\nThis uses recursion.\nfn fib(n: u64) -> u64 {\n    if n < 2 { n } else { fib(n - 1) + fib(n - 2) }\n}";
        let cleaned = clean_generated_code(raw, "Rust");
        assert!(cleaned.starts_with("fn fib"));
    }

    #[test]
    fn test_prose_dropping_stops_at_code() {
        let raw = "const x = 1;\nThis line stays\n";
        assert_eq!(clean_generated_code(raw, "JavaScript"), "const x = 1;\nThis line stays");
    }

    #[test]
    fn test_keeps_first_line_indentation() {
        let raw = "\n\n    if ready:\n        go()\n";
        assert_eq!(clean_generated_code(raw, "Python"), "    if ready:\n        go()");
    }

    #[test]
    fn test_fence_after_lead_in() {
        let raw = "Here is the code:\n```java\npublic class A {}\n```";
        assert_eq!(clean_generated_code(raw, "Java"), "public class A {}");

        let raw = "Here you go.\n\n```\njava\nclass B {}\n```\n";
        assert_eq!(clean_generated_code(raw, "Java"), "class B {}");
    }

    #[test]
    fn test_empty_input_yields_placeholder() {
        assert_eq!(clean_generated_code("", "Java"), NO_CODE_PLACEHOLDER);
        assert_eq!(clean_generated_code("   \n\t ", "Java"), NO_CODE_PLACEHOLDER);
    }

    #[test]
    fn test_only_prose_yields_empty() {
        let cleaned = clean_generated_code("```\nHere you go.\n\nThis is all.\n```", "Java");
        assert!(is_unusable(&cleaned));
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let inputs = [
            "```java\npublic class Test {}\n```",
            "```rust\nfn main() {\n    println!(\"hi\");\n}\n```",
            "Here is it:\nSELECT 1;",
            "```\ntypescript\nlet x: number = 1;\n```",
            "```python\n    return x\n```",
            "\n\n  indented = True\nnext = 1\n",
        ];

        for raw in inputs {
            let once = clean_generated_code(raw, "Java");
            let twice = clean_generated_code(&once, "Java");
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_unusable_detection() {
        assert!(is_unusable(""));
        assert!(is_unusable(NO_CODE_PLACEHOLDER));
        assert!(!is_unusable("x = 1"));
    }
}
