//! `${NAME}` placeholder substitution.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

// Whitespace just inside the braces is tolerated: `${ NAME }`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*([A-Z_]+)\s*\}").expect("placeholder pattern is valid")
});

/// Replace every `${NAME}` in `cmd` with `vars[NAME]`.
///
/// `NAME` is one or more uppercase ASCII letters or underscores. A name
/// missing from `vars` is replaced by the empty string. There is no escape
/// for a literal `${...}`.
pub fn substitute(cmd: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(cmd, |caps: &Captures<'_>| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        assert_eq!(substitute("echo ${X}", &vars(&[("X", "hi")])), "echo hi");
    }

    #[test]
    fn test_multiple_and_repeated() {
        let v = vars(&[("APP_DIR", "/srv/app"), ("PORT", "8080")]);
        assert_eq!(
            substitute("cd ${APP_DIR} && run --port ${PORT} --dir ${APP_DIR}", &v),
            "cd /srv/app && run --port 8080 --dir /srv/app"
        );
    }

    #[test]
    fn test_inner_whitespace_is_tolerated() {
        assert_eq!(substitute("a${ X }b", &vars(&[("X", "-")])), "a-b");
    }

    #[test]
    fn test_missing_name_becomes_empty() {
        assert_eq!(substitute("echo [${MISSING}]", &HashMap::new()), "echo []");
    }

    #[test]
    fn test_non_matching_forms_are_left_alone() {
        let v = vars(&[("X", "hi"), ("x", "lower")]);
        for s in ["echo $X", "echo ${x}", "echo ${X1}", "echo ${}", "echo {X}", "plain"] {
            assert_eq!(substitute(s, &v), s);
        }
    }

    #[test]
    fn test_idempotent_without_placeholders() {
        let v = vars(&[("X", "hi")]);
        let once = substitute("ls -la /tmp", &v);
        assert_eq!(once, "ls -la /tmp");
        assert_eq!(substitute(&once, &v), once);
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let v = vars(&[("A", "${B}"), ("B", "nope")]);
        assert_eq!(substitute("${A}", &v), "${B}");
    }
}
