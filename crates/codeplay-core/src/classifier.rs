//! Heuristic that decides whether a program reads from stdin.
//!
//! Each language maps to the tokens its standard library uses for console
//! input. A program "requires stdin" when its source contains any of them.
//! This is a plain substring match: a token inside a comment or a string
//! literal still counts.

/// Console-input tokens per judge language id.
const INPUT_RULES: &[(&str, &[&str])] = &[
    ("71", &["input("]),
    ("54", &["cin >>"]),
    ("62", &["Scanner"]),
    ("50", &["scanf("]),
    ("63", &["prompt("]),
    ("73", &["read_line"]),
    ("72", &["gets"]),
    ("60", &["Scanln"]),
    ("68", &["fgets", "readline"]),
];

/// Returns the console-input tokens associated with a language.
///
/// Unknown languages have no tokens.
#[must_use]
pub fn stdin_tokens(service_id: &str) -> &'static [&'static str] {
    match INPUT_RULES.iter().find(|(id, _)| *id == service_id) {
        Some((_, tokens)) => *tokens,
        None => &[],
    }
}

/// Returns `true` if the source contains any console-input token of the
/// language.
///
/// Unknown languages return `false` so the editor keeps working.
///
/// # Examples
///
/// ```
/// use codeplay_core::classifier::requires_stdin;
///
/// assert!(requires_stdin("71", "name = input()"));
/// assert!(!requires_stdin("71", "print('hi')"));
/// assert!(!requires_stdin("999", "input("));
/// ```
#[must_use]
pub fn requires_stdin(service_id: &str, source: &str) -> bool {
    stdin_tokens(service_id)
        .iter()
        .any(|token| source.contains(token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::LanguageRegistry;

    #[test]
    fn test_every_catalog_language_has_a_rule() {
        let registry = LanguageRegistry::builtin().unwrap();
        for language in registry.list_languages() {
            assert!(
                !stdin_tokens(language.service_id.as_str()).is_empty(),
                "{} has no stdin rule",
                language.display_name
            );
        }
    }

    #[test]
    fn test_builtin_defaults() {
        let registry = LanguageRegistry::builtin().unwrap();
        let expected = [
            ("71", true),
            ("54", true),
            ("62", true),
            ("50", true),
            ("63", false),
            ("73", true),
            ("72", false),
            ("60", true),
            ("68", false),
        ];

        for (id, needs_input) in expected {
            let source = registry.default_source(id).unwrap();
            assert_eq!(
                requires_stdin(id, source),
                needs_input,
                "unexpected classification for language {id}"
            );
        }
    }

    #[test]
    fn test_python_input_call() {
        assert!(requires_stdin("71", "name = input('Name: ')\nprint(name)"));
        assert!(!requires_stdin("71", "print('Hello')"));
    }

    #[test]
    fn test_javascript_prompt() {
        assert!(requires_stdin("63", "const n = prompt(\"n?\");"));
        assert!(!requires_stdin("63", "console.log(1);"));
    }

    #[test]
    fn test_php_matches_either_token() {
        assert!(requires_stdin("68", "$line = fgets(STDIN);"));
        assert!(requires_stdin("68", "$line = readline();"));
        assert!(!requires_stdin("68", "echo 'hi';"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(!requires_stdin("62", "scanner"));
        assert!(!requires_stdin("60", "fmt.scanln(&x)"));
    }

    #[test]
    fn test_token_in_comment_still_counts() {
        assert!(requires_stdin("50", "// do not call scanf( here\nint main() {}"));
        assert!(requires_stdin("72", "# gets is not used"));
    }

    #[test]
    fn test_rules_are_language_specific() {
        // Python's token means nothing to C
        assert!(!requires_stdin("50", "x = input()"));
        assert!(!requires_stdin("71", "scanf(\"%d\", &x);"));
    }

    #[test]
    fn test_unknown_language_is_false() {
        assert!(!requires_stdin("999", "input( scanf( cin >>"));
        assert!(!requires_stdin("", ""));
        assert!(stdin_tokens("999").is_empty());
    }

    #[test]
    fn test_empty_source() {
        assert!(!requires_stdin("71", ""));
    }
}
