use indexmap::IndexMap;

use mcp_hub_lib::{
    add_or_update_server, export_configs, get_all_configs, get_configs, import_configs, McpServer,
};

#[path = "support.rs"]
mod support;
use support::{reset_test_fs, test_mutex};

#[test]
fn export_captures_decoded_entries_per_tool() {
    let _guard = test_mutex().lock().expect("acquire test mutex");
    reset_test_fs();

    add_or_update_server("claude", McpServer::stdio("fs", "npx", vec![])).expect("seed claude");
    add_or_update_server("codex", McpServer::sse("remote", "https://r.example"))
        .expect("seed codex");

    let bundle = export_configs();
    assert!(!bundle.timestamp.is_empty());
    assert_eq!(bundle.tools.get("claude").expect("claude entry").len(), 1);
    assert_eq!(bundle.tools.get("codex").expect("codex entry").len(), 1);
    assert!(bundle.tools.get("gemini").expect("gemini entry").is_empty());
}

#[test]
fn merge_import_upserts_without_dropping_existing_entries() {
    let _guard = test_mutex().lock().expect("acquire test mutex");
    reset_test_fs();

    add_or_update_server("claude", McpServer::stdio("e0", "npx", vec![])).expect("seed e0");

    let mut doc: IndexMap<String, Vec<McpServer>> = IndexMap::new();
    doc.insert(
        "claude".into(),
        vec![McpServer::sse("e1", "https://e1.example")],
    );

    let imported = import_configs(doc, true).expect("merge import");
    assert_eq!(imported, vec!["claude".to_string()]);

    let names: Vec<_> = get_configs("claude")
        .expect("list claude")
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["e0", "e1"]);
}

#[test]
fn replace_import_drops_entries_missing_from_the_document() {
    let _guard = test_mutex().lock().expect("acquire test mutex");
    reset_test_fs();

    add_or_update_server("claude", McpServer::stdio("e0", "npx", vec![])).expect("seed e0");

    let mut doc: IndexMap<String, Vec<McpServer>> = IndexMap::new();
    doc.insert(
        "claude".into(),
        vec![McpServer::sse("e1", "https://e1.example")],
    );

    import_configs(doc, false).expect("replace import");

    let listed = get_configs("claude").expect("list claude");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "e1");
}

#[test]
fn unknown_tools_in_the_document_are_ignored() {
    let _guard = test_mutex().lock().expect("acquire test mutex");
    reset_test_fs();

    let mut doc: IndexMap<String, Vec<McpServer>> = IndexMap::new();
    doc.insert("zed".into(), vec![McpServer::stdio("fs", "npx", vec![])]);
    doc.insert(
        "claude".into(),
        vec![McpServer::stdio("fs", "npx", vec![])],
    );

    let imported = import_configs(doc, true).expect("import ignores unknown tools");
    assert_eq!(imported, vec!["claude".to_string()]);
}

#[test]
fn export_then_replace_import_round_trips_the_config_set() {
    let _guard = test_mutex().lock().expect("acquire test mutex");
    reset_test_fs();

    let mut fs_server = McpServer::stdio("fs", "npx", vec!["-y".into(), "mcp-fs".into()]);
    fs_server.env.insert("ROOT".into(), "/srv".into());
    fs_server.enabled = false;
    add_or_update_server("claude", fs_server).expect("seed claude");
    add_or_update_server("codex", McpServer::sse("remote", "https://r.example"))
        .expect("seed codex");

    let bundle = export_configs();
    let before = get_all_configs();

    reset_test_fs();
    import_configs(bundle.tools, false).expect("replace import");

    assert_eq!(get_all_configs(), before);
}
