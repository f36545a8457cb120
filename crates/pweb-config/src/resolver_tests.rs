use super::*;
use crate::source::{Document, parse_document};

fn tree(text: &str) -> SectionTree {
    SectionTree::build(parse_document("inline", text).unwrap(), None)
}

const SITE: &str = r#"
[global]
socket_port = 20900
tools.sessions.on = True
tools.encode.on = True
tools.encode.encoding = "utf-8"

[/images]
tools.staticdir.on = True
tools.staticdir.dir = "images"

[/images/thumb]
tools.staticdir.on = True
tools.staticdir.dir = "thumbs"

[/favicon.ico]
tools.staticfile.on = True
tools.staticfile.filename = "/opt/rnet/web/favicon.ico"
"#;

#[test]
fn test_static_dir_scenario() {
    let plan = tree(SITE).resolve("/images/cat.png").unwrap();
    assert_eq!(plan.section.as_deref(), Some("/images"));

    let staticdir = plan.tool("staticdir").unwrap();
    assert!(staticdir.enabled);
    assert_eq!(staticdir.property("dir"), Some(&Scalar::from("images")));

    // Global baseline still present.
    assert_eq!(plan.setting("socket_port"), Some(&Scalar::Int(20900)));
}

#[test]
fn test_static_file_exact_match() {
    let plan = tree(SITE).resolve("/favicon.ico").unwrap();
    assert!(plan.is_enabled("staticfile"));
    assert_eq!(
        plan.tool("staticfile").unwrap().property("filename"),
        Some(&Scalar::from("/opt/rnet/web/favicon.ico"))
    );
}

#[test]
fn test_prefix_requires_segment_boundary() {
    let t = tree(SITE);
    let plan = t.resolve("/favicon2.ico").unwrap();
    assert_eq!(plan.section, None);
    assert!(plan.tool("staticfile").is_none());

    let plan = t.resolve("/imagesX/cat.png").unwrap();
    assert_eq!(plan.section, None);
}

#[test]
fn test_longest_prefix_wins() {
    let plan = tree(SITE).resolve("/images/thumb/x").unwrap();
    assert_eq!(plan.section.as_deref(), Some("/images/thumb"));
    assert_eq!(
        plan.tool("staticdir").unwrap().property("dir"),
        Some(&Scalar::from("thumbs"))
    );
}

#[test]
fn test_longest_prefix_independent_of_declaration_order() {
    let reversed = tree(
        "[/images/thumb]\ntools.staticdir.dir = \"thumbs\"\n[/images]\ntools.staticdir.dir = \"images\"\n",
    );
    let plan = reversed.resolve("/images/thumb/x").unwrap();
    assert_eq!(plan.section.as_deref(), Some("/images/thumb"));
}

#[test]
fn test_global_fallback_is_exactly_global() {
    let t = tree(SITE);
    let plan = t.resolve("/app/login").unwrap();
    assert_eq!(plan.section, None);
    assert_eq!(plan.settings, t.global().settings);
}

#[test]
fn test_resolve_global_matches_unmatched_path() {
    let t = tree(SITE);
    let global = resolve_global(&t);
    let unmatched = t.resolve("/app/login").unwrap();
    assert_eq!(global.section, None);
    assert_eq!(global.tools, unmatched.tools);
    assert_eq!(global.settings, unmatched.settings);
}

#[test]
fn test_root_path_uses_global_only_without_root_section() {
    let plan = tree(SITE).resolve("/").unwrap();
    assert_eq!(plan.section, None);
    let enabled: Vec<&str> = plan.enabled_tools().collect();
    assert_eq!(enabled, vec!["sessions", "encode"]);
}

#[test]
fn test_root_section_is_an_ordinary_prefix() {
    let t = tree("[/]\ntools.staticdir.on = True\n");
    assert_eq!(t.resolve("/").unwrap().section.as_deref(), Some("/"));
    // "/" is not a wildcard: "/x" does not continue with a separator after it.
    assert_eq!(t.resolve("/x").unwrap().section, None);
}

#[test]
fn test_enabled_flag_gating() {
    let t = tree(
        r#"
[global]
tools.staticdir.dir = "orphan"
tools.gzip.on = False
tools.gzip.level = 9
tools.auth.on = "True"
"#,
    );
    let plan = t.resolve("/anything").unwrap();

    let staticdir = plan.tool("staticdir").unwrap();
    assert!(!staticdir.enabled, "absent 'on' must disable");
    assert_eq!(staticdir.property("dir"), Some(&Scalar::from("orphan")));

    let gzip = plan.tool("gzip").unwrap();
    assert!(!gzip.enabled);
    assert_eq!(gzip.property("level"), Some(&Scalar::Int(9)));

    // A quoted "True" is a string, not a boolean.
    assert!(!plan.is_enabled("auth"));
    assert!(!plan.is_enabled("missing"));
}

#[test]
fn test_path_section_overrides_global_tool() {
    let t = tree(
        r#"
[global]
tools.encode.on = True
tools.encode.encoding = "utf-8"

[/raw]
tools.encode.on = False
"#,
    );
    let plan = t.resolve("/raw/blob").unwrap();
    let encode = plan.tool("encode").unwrap();
    assert!(!encode.enabled);
    assert_eq!(encode.property("encoding"), Some(&Scalar::from("utf-8")));
}

#[test]
fn test_plan_order_global_first_then_section_only_keys() {
    let t = tree(
        r#"
[global]
tools.encode.on = True
tools.sessions.on = True

[/img]
tools.staticdir.on = True
tools.encode.on = False
"#,
    );
    let plan = t.resolve("/img/a").unwrap();
    let order: Vec<&str> = plan.tools.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["encode", "sessions", "staticdir"]);

    let keys: Vec<&str> = plan.settings.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["tools.encode.on", "tools.sessions.on", "tools.staticdir.on"]
    );
}

#[test]
fn test_non_tool_keys_are_not_grouped() {
    let t = tree("[global]\ntools.on = True\nlog.error_file = \"/var/log/e\"\ntools.a.b.on = True\n");
    let plan = t.resolve("/").unwrap();
    let order: Vec<&str> = plan.tools.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["a.b"]);
    assert!(plan.is_enabled("a.b"));
    assert!(plan.setting("log.error_file").is_some());
}

#[test]
fn test_override_precedence_reaches_plan() {
    let base = parse_document("base", "[/images]\ntools.staticdir.dir = \"images\"\n").unwrap();
    let overlay: Document =
        parse_document("override", "[/images]\ntools.staticdir.dir = \"pics\"\n").unwrap();
    let t = SectionTree::build(base, Some(overlay));
    let plan = t.resolve("/images/a.png").unwrap();
    assert_eq!(
        plan.tool("staticdir").unwrap().property("dir"),
        Some(&Scalar::from("pics"))
    );
}

#[test]
fn test_identical_builds_resolve_identically() {
    let a = tree(SITE);
    let b = tree(SITE);
    for path in ["/", "/images", "/images/thumb/1.png", "/favicon.ico", "/x/y"] {
        assert_eq!(a.resolve(path).unwrap(), b.resolve(path).unwrap(), "path {path}");
    }
}

#[test]
fn test_covers_rule() {
    assert!(covers("/images", "/images"));
    assert!(covers("/images", "/images/"));
    assert!(covers("/images", "/images/a/b"));
    assert!(!covers("/images", "/imagesa"));
    assert!(!covers("/images", "/image"));
    assert!(covers("/", "/"));
    assert!(!covers("/", "/a"));
}

#[test]
fn test_split_tool_key() {
    assert_eq!(split_tool_key("tools.staticdir.on"), Some(("staticdir", "on")));
    assert_eq!(split_tool_key("tools.a.b.dir"), Some(("a.b", "dir")));
    assert_eq!(split_tool_key("tools.on"), None);
    assert_eq!(split_tool_key("server.socket_port"), None);
    assert_eq!(split_tool_key("tools..on"), None);
}

#[test]
fn test_resolver_is_shareable_across_threads() {
    let t = std::sync::Arc::new(tree(SITE));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let t = std::sync::Arc::clone(&t);
            std::thread::spawn(move || {
                let path = if i % 2 == 0 { "/images/a" } else { "/other" };
                t.resolve(path).unwrap().is_enabled("staticdir")
            })
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, false, true, false]);
}
