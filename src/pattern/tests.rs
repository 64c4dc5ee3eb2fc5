//! Tests for the route template compiler.

#[cfg(test)]
mod tests {
    use crate::pattern::{Error, RoutePattern, Segment, DEFAULT_CAPTURE, GREEDY_CAPTURE};

    fn compile(template: &str) -> RoutePattern {
        RoutePattern::compile(template).unwrap()
    }

    #[test]
    fn test_literal_template_matches_exactly() {
        let pattern = compile("/foo");
        assert!(pattern.matches("/foo"));
        assert!(!pattern.matches("/foo/bar"));
        assert!(!pattern.matches("/foo/"));
        assert!(!pattern.matches("/fo"));
    }

    #[test]
    fn test_root_template() {
        let pattern = compile("/");
        assert!(pattern.matches("/"));
        assert!(!pattern.matches("/a"));
    }

    #[test]
    fn test_custom_expression_capture() {
        let pattern = compile(r"/foo/{id:\d+}/bar");
        let captures = pattern.match_with_captures("/foo/42/bar").unwrap();
        assert_eq!(captures.get("id"), Some("42"));
        assert_eq!(captures.index(0), Some("42"));
        assert!(!pattern.matches("/foo/abc/bar"));
        assert!(!pattern.matches("/foo/42/bar/baz"));
    }

    #[test]
    fn test_default_capture_stays_within_one_component() {
        let pattern = compile("/users/{name}");
        assert_eq!(
            pattern.match_with_captures("/users/alice").unwrap().get("name"),
            Some("alice")
        );
        assert!(!pattern.matches("/users/alice/posts"));
        assert!(!pattern.matches("/users/"));
    }

    #[test]
    fn test_unnamed_captures_are_positional() {
        let pattern = compile("/{}/x/{:[a-z]+}");
        let captures = pattern.match_with_captures("/12/x/abc").unwrap();
        assert_eq!(captures.index(0), Some("12"));
        assert_eq!(captures.index(1), Some("abc"));
        assert_eq!(captures.len(), 2);
        assert_eq!(captures.iter().collect::<Vec<_>>(), vec![(None, "12"), (None, "abc")]);
    }

    #[test]
    fn test_greedy_capture_spans_slashes() {
        let pattern = compile("/files/{+path}");
        let captures = pattern.match_with_captures("/files/a/b/c.txt").unwrap();
        assert_eq!(captures.get("path"), Some("a/b/c.txt"));
        assert!(!pattern.matches("/files/"));

        let anonymous = compile("/static/{+}");
        assert_eq!(
            anonymous.match_with_captures("/static/css/site.css").unwrap().index(0),
            Some("css/site.css")
        );
    }

    #[test]
    fn test_optional_group() {
        let pattern = compile("/foo[/bar]");
        assert!(pattern.matches("/foo"));
        assert!(pattern.matches("/foo/bar"));
        assert!(!pattern.matches("/foo/ba"));
        assert!(!pattern.matches("/foo/bar/bar"));
    }

    #[test]
    fn test_nested_optional_groups_with_captures() {
        let pattern = compile("/a[/{b}[/{c}]]");
        assert!(pattern.matches("/a"));

        let one = pattern.match_with_captures("/a/1").unwrap();
        assert_eq!(one.get("b"), Some("1"));
        assert_eq!(one.get("c"), None);
        assert_eq!(one.len(), 1);

        let two = pattern.match_with_captures("/a/1/2").unwrap();
        assert_eq!(two.get("b"), Some("1"));
        assert_eq!(two.get("c"), Some("2"));
        assert!(!pattern.matches("/a/1/2/3"));
    }

    #[test]
    fn test_expression_with_braces_and_brackets() {
        let pattern = compile(r"/year/{y:\d{4}}/{slug:[a-z\-]+}");
        let captures = pattern.match_with_captures("/year/2024/hello-world").unwrap();
        assert_eq!(captures.get("y"), Some("2024"));
        assert_eq!(captures.get("slug"), Some("hello-world"));
        assert!(!pattern.matches("/year/24/hello"));
    }

    #[test]
    fn test_literals_are_not_regex_syntax() {
        let pattern = compile("/a.b+c(d)");
        assert!(pattern.matches("/a.b+c(d)"));
        assert!(!pattern.matches("/aXbbc(d)"));
    }

    #[test]
    fn test_literals_outside_url_safe_set_are_kept() {
        let pattern = compile("/caf\u{e9}/a b");
        assert!(pattern.matches("/caf\u{e9}/a b"));
        assert!(!pattern.matches("/caf%C3%A9/a%20b"));
    }

    #[test]
    fn test_segments_are_exposed() {
        let pattern = compile("/p/{id}[/{+rest}]");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("/p/".to_string()),
                Segment::Capture {
                    name: Some("id".to_string()),
                    regex: DEFAULT_CAPTURE.to_string(),
                },
                Segment::Optional(vec![
                    Segment::Literal("/".to_string()),
                    Segment::Capture {
                        name: Some("rest".to_string()),
                        regex: GREEDY_CAPTURE.to_string(),
                    },
                ]),
            ]
        );
        assert_eq!(pattern.to_string(), "/p/{id}[/{+rest}]");
        assert_eq!(pattern.template(), "/p/{id}[/{+rest}]");
    }

    #[test]
    fn test_template_must_start_with_slash() {
        let result = RoutePattern::compile("foo/bar");
        assert!(matches!(result, Err(Error::InvalidTemplate(ref t)) if t == "foo/bar"));
        assert!(matches!(RoutePattern::compile(""), Err(Error::InvalidTemplate(_))));
    }

    #[test]
    fn test_unbalanced_brackets_are_malformed() {
        for template in ["/foo[/bar", "/foo]/bar", "/a[[/b]", "/{id", "/id}", "/{id:\\d{2}"] {
            let result = RoutePattern::compile(template);
            assert!(
                matches!(result, Err(Error::Malformed { .. })),
                "expected {template} to be malformed, got {result:?}"
            );
        }
    }

    #[test]
    fn test_duplicate_capture_name_is_malformed() {
        let result = RoutePattern::compile("/{id}/x/{id}");
        assert!(matches!(result, Err(Error::Malformed { ref reason, .. }) if reason.contains("'id'")));

        // Unnamed captures never collide.
        assert!(RoutePattern::compile("/{}/{}").is_ok());
    }

    #[test]
    fn test_invalid_expression_is_malformed() {
        assert!(matches!(RoutePattern::compile("/{id:(}"), Err(Error::Malformed { .. })));
        assert!(matches!(RoutePattern::compile("/{id:}"), Err(Error::Malformed { .. })));
        assert!(matches!(RoutePattern::compile("/{+id:\\d+}"), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_expression_alternation_is_contained() {
        let pattern = compile("/v/{kind:a|b}/end");
        assert!(pattern.matches("/v/a/end"));
        assert!(pattern.matches("/v/b/end"));
        assert!(!pattern.matches("/v/a"));
    }
}
