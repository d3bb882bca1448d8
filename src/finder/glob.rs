//! Graphite glob handling
//!
//! Graphite paths use `*`, `?`, `[...]` and `{a,b}` wildcards inside a
//! segment. These helpers detect them and translate a glob into the
//! ClickHouse condition used against a tree table.

use crate::clickhouse::quote;

const WILDCARD_CHARS: &[char] = &['[', ']', '{', '}', '*', '?'];

/// Whether `target` contains any glob syntax
pub fn has_wildcard(target: &str) -> bool {
    target.contains(WILDCARD_CHARS)
}

/// Literal part of `query` before its first wildcard
pub fn non_wildcard_prefix(query: &str) -> &str {
    match query.find(WILDCARD_CHARS) {
        Some(p) => &query[..p],
        None => query,
    }
}

/// Translate a Graphite glob into a ClickHouse `match()` regular expression
/// (without anchors).
pub fn glob_to_regexp(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    for c in glob.chars() {
        match c {
            '.' => out.push_str("[.]"),
            '$' => out.push_str("[$]"),
            '{' => out.push('('),
            '}' => out.push(')'),
            ',' => out.push('|'),
            '?' => out.push_str("[^.]"),
            '*' => out.push_str("([^.]*?)"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape LIKE metacharacters in a literal prefix
fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '%' || c == '_' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn has_prefix(field: &str, prefix: &str) -> String {
    format!("{} LIKE {}", field, quote(&format!("{}%", like_escape(prefix))))
}

/// Condition on `field` selecting the paths matched by `query`.
///
/// Returns `None` when the glob matches everything at its level.
pub fn glob_condition(field: &str, query: &str) -> Option<String> {
    if query == "*" {
        return None;
    }

    if !has_wildcard(query) {
        // Leaf rows and branch rows ("query.") both match
        return Some(format!(
            "{} IN ({}, {})",
            field,
            quote(query),
            quote(&format!("{}.", query))
        ));
    }

    let prefix = non_wildcard_prefix(query);

    // "metric.name.xx*"
    if prefix.len() == query.len() - 1 && query.ends_with('*') {
        return Some(has_prefix(field, prefix));
    }

    let regex = format!("match({}, {})", field, quote(&format!("^{}$", glob_to_regexp(query))));
    if prefix.is_empty() {
        Some(regex)
    } else {
        Some(format!("{} AND {}", has_prefix(field, prefix), regex))
    }
}

/// Number of path segments, used to select one tree level
pub fn level(query: &str) -> usize {
    query.matches('.').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_has_wildcard() {
        assert!(has_wildcard("*"));
        assert!(has_wildcard("cpu?"));
        assert!(has_wildcard("host[0-9]"));
        assert!(has_wildcard("{a,b}"));
        assert!(!has_wildcard("cpu"));
        assert!(!has_wildcard(""));
        assert!(!has_wildcard("a-b_c"));
    }

    #[test]
    fn test_non_wildcard_prefix() {
        assert_eq!(non_wildcard_prefix("a.b.c*"), "a.b.c");
        assert_eq!(non_wildcard_prefix("a.{b,c}.d"), "a.");
        assert_eq!(non_wildcard_prefix("*.b"), "");
        assert_eq!(non_wildcard_prefix("a.b"), "a.b");
    }

    #[test]
    fn test_glob_to_regexp_matches_like_graphite() {
        let cases = [
            ("a.b.*", "a.b.cpu", true),
            ("a.b.*", "a.b.cpu.user", false),
            ("a.?.c", "a.x.c", true),
            ("a.?.c", "a.xy.c", false),
            ("a.{b,x}.c", "a.x.c", true),
            ("a.{b,x}.c", "a.y.c", false),
            ("host[0-9].cpu", "host3.cpu", true),
            ("host[0-9].cpu", "hostA.cpu", false),
            ("a.b", "aXb", false),
        ];

        for (glob, path, expected) in cases {
            let re = Regex::new(&format!("^{}$", glob_to_regexp(glob))).unwrap();
            assert_eq!(re.is_match(path), expected, "{} vs {}", glob, path);
        }
    }

    #[test]
    fn test_glob_condition_match_all() {
        assert_eq!(glob_condition("Path", "*"), None);
    }

    #[test]
    fn test_glob_condition_literal() {
        assert_eq!(
            glob_condition("Path", "a.b.c").unwrap(),
            "Path IN ('a.b.c', 'a.b.c.')"
        );
    }

    #[test]
    fn test_glob_condition_trailing_star() {
        assert_eq!(
            glob_condition("Path", "a.b.cp*").unwrap(),
            "Path LIKE 'a.b.cp%'"
        );
    }

    #[test]
    fn test_glob_condition_regex() {
        assert_eq!(
            glob_condition("Path", "a.*.c").unwrap(),
            r"Path LIKE 'a.%' AND match(Path, '^a[.]([^.]*?)[.]c$')"
        );
        assert_eq!(
            glob_condition("Path", "*.c").unwrap(),
            r"match(Path, '^([^.]*?)[.]c$')"
        );
    }

    #[test]
    fn test_like_escape() {
        assert_eq!(
            glob_condition("Path", "a_b.c*").unwrap(),
            r"Path LIKE 'a\\_b.c%'"
        );
    }

    #[test]
    fn test_level() {
        assert_eq!(level("a"), 1);
        assert_eq!(level("a.b.c"), 3);
        assert_eq!(level("a.b."), 3);
    }
}
