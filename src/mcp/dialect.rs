use serde_json::{json, Map, Value};
use std::path::Path;
use toml_edit::{DocumentMut, Item, Table};

use super::model::{McpServer, Transport};
use super::toml_convert::{server_to_toml_table, table_to_server};
use crate::error::AppError;

/// Dialect family of a tool's config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    Json,
    Toml,
}

/// Per-tool translation between the uniform entry model and the on-disk
/// document. Closed set: adding a tool dialect means adding a variant here,
/// never branching on tool names in callers.
///
/// Contract (round-trip law): `encode(decode(text))` with untouched entries
/// is semantically equal to `text` — every member other than `key` passes
/// through the skeleton verbatim.
#[derive(Debug, Clone, Copy)]
pub enum Dialect {
    /// JSON object document with a server map under `key`
    /// (`mcpServers` for most tools, `servers` for the VS Code family)
    Json { key: &'static str },
    /// TOML document with a `[mcp_servers]` table (Codex); comments and
    /// layout outside the table survive via `toml_edit`
    Toml { key: &'static str },
}

/// Parsed document minus the semantics of the server map: everything the
/// engine does not model, carried across a read-modify-write cycle.
#[derive(Debug, Clone)]
pub enum DocumentSkeleton {
    Json(Map<String, Value>),
    Toml(DocumentMut),
}

impl Dialect {
    pub fn new(kind: DialectKind, key: &'static str) -> Self {
        match kind {
            DialectKind::Json => Dialect::Json { key },
            DialectKind::Toml => Dialect::Toml { key },
        }
    }

    /// Skeleton for a tool whose config file does not exist yet
    pub fn empty_skeleton(&self) -> DocumentSkeleton {
        match self {
            Dialect::Json { .. } => DocumentSkeleton::Json(Map::new()),
            Dialect::Toml { .. } => DocumentSkeleton::Toml(DocumentMut::new()),
        }
    }

    /// Extract the entry list (in document order) and the skeleton.
    /// `path` is only used for error context.
    pub fn decode(
        &self,
        text: &str,
        path: &Path,
    ) -> Result<(Vec<McpServer>, DocumentSkeleton), AppError> {
        match self {
            Dialect::Json { key } => decode_json(key, text, path),
            Dialect::Toml { key } => decode_toml(key, text, path),
        }
    }

    /// Rebuild the server map from `entries` and splice it back into the
    /// skeleton. A document that never had the map only gains one when there
    /// is something to write.
    pub fn encode(
        &self,
        skeleton: DocumentSkeleton,
        entries: &[McpServer],
    ) -> Result<String, AppError> {
        match (*self, skeleton) {
            (Dialect::Json { key }, DocumentSkeleton::Json(mut doc)) => {
                if !entries.is_empty() || doc.contains_key(key) {
                    let mut map = Map::new();
                    for server in entries {
                        map.insert(server.name.clone(), server_to_json_member(server));
                    }
                    doc.insert(key.to_string(), Value::Object(map));
                }
                serde_json::to_string_pretty(&Value::Object(doc))
                    .map_err(|e| AppError::JsonSerialize { source: e })
            }
            (Dialect::Toml { key }, DocumentSkeleton::Toml(mut doc)) => {
                if !entries.is_empty() || doc.contains_key(key) {
                    let mut servers_tbl = Table::new();
                    for server in entries {
                        servers_tbl[&server.name[..]] = Item::Table(server_to_toml_table(server));
                    }
                    doc[key] = Item::Table(servers_tbl);
                }
                Ok(doc.to_string())
            }
            _ => Err(AppError::Config("文档骨架与方言不匹配".to_string())),
        }
    }
}

fn decode_json(
    key: &str,
    text: &str,
    path: &Path,
) -> Result<(Vec<McpServer>, DocumentSkeleton), AppError> {
    if text.trim().is_empty() {
        return Ok((Vec::new(), DocumentSkeleton::Json(Map::new())));
    }

    let root: Value = serde_json::from_str(text).map_err(|e| AppError::json(path, e))?;
    let doc = match root {
        Value::Object(map) => map,
        _ => {
            return Err(AppError::UnsupportedDialect(format!(
                "{} 的根必须是 JSON 对象",
                path.display()
            )))
        }
    };

    let mut entries = Vec::new();
    if let Some(member) = doc.get(key) {
        let servers_obj = member.as_object().ok_or_else(|| {
            AppError::UnsupportedDialect(format!(
                "{} 中的 '{key}' 字段必须是对象",
                path.display()
            ))
        })?;
        for (name, spec) in servers_obj {
            let spec_obj = spec.as_object().ok_or_else(|| {
                AppError::UnsupportedDialect(format!("服务器 '{name}' 的定义必须是 JSON 对象"))
            })?;
            entries.push(json_member_to_server(name, spec_obj));
        }
    }

    Ok((entries, DocumentSkeleton::Json(doc)))
}

fn decode_toml(
    key: &str,
    text: &str,
    path: &Path,
) -> Result<(Vec<McpServer>, DocumentSkeleton), AppError> {
    let doc: DocumentMut = if text.trim().is_empty() {
        DocumentMut::new()
    } else {
        text.parse().map_err(|e| AppError::toml(path, e))?
    };

    let mut entries = Vec::new();
    if let Some(item) = doc.get(key) {
        let servers_tbl = item.as_table_like().ok_or_else(|| {
            AppError::UnsupportedDialect(format!(
                "{} 中的 '{key}' 必须是 TOML 表",
                path.display()
            ))
        })?;
        for (name, entry_item) in servers_tbl.iter() {
            let entry_tbl = entry_item.as_table_like().ok_or_else(|| {
                AppError::UnsupportedDialect(format!("服务器 '{name}' 的定义必须是 TOML 表"))
            })?;
            entries.push(table_to_server(name, entry_tbl));
        }
    }

    Ok((entries, DocumentSkeleton::Toml(doc)))
}

/// Transport detection on read: a `command` member means stdio, otherwise sse
fn json_member_to_server(name: &str, spec: &Map<String, Value>) -> McpServer {
    let transport = if let Some(cmd) = spec.get("command") {
        let args = spec
            .get("args")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Transport::Stdio {
            command: cmd.as_str().unwrap_or_default().to_string(),
            args,
        }
    } else {
        Transport::Sse {
            url: spec
                .get("url")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    };

    let env = spec
        .get("env")
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let enabled = !spec
        .get("disabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    McpServer {
        name: name.to_string(),
        transport,
        env,
        enabled,
    }
}

fn server_to_json_member(server: &McpServer) -> Value {
    let mut obj = Map::new();

    match &server.transport {
        Transport::Stdio { command, args } => {
            obj.insert("command".to_string(), json!(command));
            if !args.is_empty() {
                obj.insert("args".to_string(), json!(args));
            }
        }
        Transport::Sse { url } => {
            obj.insert("url".to_string(), json!(url));
        }
    }

    if !server.env.is_empty() {
        obj.insert("env".to_string(), json!(server.env));
    }

    if !server.enabled {
        obj.insert("disabled".to_string(), json!(true));
    }

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_dialect() -> Dialect {
        Dialect::Json { key: "mcpServers" }
    }

    fn toml_dialect() -> Dialect {
        Dialect::Toml { key: "mcp_servers" }
    }

    #[test]
    fn json_round_trip_preserves_unknown_fields() {
        let text = r#"{
  "theme": "dark",
  "telemetry": {"enabled": false, "endpoint": "https://t.example"},
  "mcpServers": {
    "fs": {"command": "npx", "args": ["-y", "mcp-fs"], "env": {"ROOT": "/tmp"}},
    "remote": {"url": "https://mcp.example/sse", "disabled": true}
  },
  "numberOfStartups": 42
}"#;
        let path = Path::new("/tmp/.claude.json");

        let (entries, skeleton) = json_dialect().decode(text, path).expect("decode");
        assert_eq!(entries.len(), 2);
        let encoded = json_dialect().encode(skeleton, &entries).expect("encode");

        let before: Value = serde_json::from_str(text).expect("parse original");
        let after: Value = serde_json::from_str(&encoded).expect("parse encoded");
        assert_eq!(before, after, "no-op edit must round-trip the document");
    }

    #[test]
    fn json_decode_infers_transport_and_enabled() {
        let text = r#"{"mcpServers": {
            "local": {"command": "uvx", "args": ["mcp-run"]},
            "hosted": {"url": "https://h.example/sse"},
            "off": {"command": "echo", "disabled": true}
        }}"#;
        let (entries, _) = json_dialect()
            .decode(text, Path::new("x.json"))
            .expect("decode");

        assert!(matches!(&entries[0].transport, Transport::Stdio { command, .. } if command == "uvx"));
        assert!(matches!(&entries[1].transport, Transport::Sse { url } if url == "https://h.example/sse"));
        assert!(entries[0].enabled && entries[1].enabled);
        assert!(!entries[2].enabled);
    }

    #[test]
    fn json_decode_rejects_non_object_server_map() {
        let err = json_dialect()
            .decode(r#"{"mcpServers": []}"#, Path::new("x.json"))
            .expect_err("array map must fail");
        assert!(matches!(err, AppError::UnsupportedDialect(_)));

        let err = json_dialect()
            .decode(r#"[1, 2]"#, Path::new("x.json"))
            .expect_err("non-object root must fail");
        assert!(matches!(err, AppError::UnsupportedDialect(_)));
    }

    #[test]
    fn json_encode_on_empty_skeleton_only_adds_map_when_needed() {
        let dialect = json_dialect();
        let encoded = dialect
            .encode(dialect.empty_skeleton(), &[])
            .expect("encode empty");
        assert_eq!(encoded, "{}");

        let entry = McpServer::stdio("fs", "npx", vec![]);
        let encoded = dialect
            .encode(dialect.empty_skeleton(), std::slice::from_ref(&entry))
            .expect("encode one");
        let value: Value = serde_json::from_str(&encoded).expect("parse");
        assert_eq!(value["mcpServers"]["fs"]["command"], "npx");
    }

    #[test]
    fn json_disabled_marker_only_written_when_off() {
        let dialect = json_dialect();
        let mut entry = McpServer::stdio("fs", "npx", vec![]);

        let on = dialect
            .encode(dialect.empty_skeleton(), std::slice::from_ref(&entry))
            .expect("encode enabled");
        assert!(!on.contains("disabled"));

        entry.enabled = false;
        let off = dialect
            .encode(dialect.empty_skeleton(), std::slice::from_ref(&entry))
            .expect("encode disabled");
        let value: Value = serde_json::from_str(&off).expect("parse");
        assert_eq!(value["mcpServers"]["fs"]["disabled"], true);
    }

    #[test]
    fn toml_round_trip_keeps_comments_outside_server_table() {
        let text = r#"# Codex CLI configuration
model = "o4-mini"

[profile]
approval = "never" # keep asking off

[mcp_servers.echo]
command = "echo"
args = ["hello"]
"#;
        let path = Path::new("/tmp/config.toml");
        let dialect = toml_dialect();

        let (entries, skeleton) = dialect.decode(text, path).expect("decode");
        assert_eq!(entries.len(), 1);
        let encoded = dialect.encode(skeleton, &entries).expect("encode");

        assert!(encoded.contains("# Codex CLI configuration"));
        assert!(encoded.contains("# keep asking off"));

        let before: toml::Table = toml::from_str(text).expect("parse original");
        let after: toml::Table = toml::from_str(&encoded).expect("parse encoded");
        assert_eq!(before, after, "no-op edit must round-trip the document");
    }

    #[test]
    fn toml_decode_rejects_non_table_server_map() {
        let err = toml_dialect()
            .decode("mcp_servers = 3\n", Path::new("config.toml"))
            .expect_err("scalar map must fail");
        assert!(matches!(err, AppError::UnsupportedDialect(_)));
    }

    #[test]
    fn empty_text_decodes_to_no_entries() {
        for dialect in [json_dialect(), toml_dialect()] {
            let (entries, _) = dialect.decode("", Path::new("missing")).expect("decode");
            assert!(entries.is_empty());
        }
    }
}
