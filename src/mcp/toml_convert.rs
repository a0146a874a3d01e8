use indexmap::IndexMap;
use toml_edit::{Array, Item, Table, TableLike};

use super::model::{McpServer, Transport};

/// Render one entry as a `[mcp_servers.<name>]` table
///
/// Field strategy mirrors the JSON dialect: `args` only when non-empty,
/// `env` only when non-empty, `disabled = true` only when the entry is
/// switched off.
pub fn server_to_toml_table(server: &McpServer) -> Table {
    let mut t = Table::new();

    match &server.transport {
        Transport::Stdio { command, args } => {
            t["command"] = toml_edit::value(command.as_str());
            if !args.is_empty() {
                let mut arr = Array::default();
                for a in args {
                    arr.push(a.as_str());
                }
                t["args"] = Item::Value(toml_edit::Value::Array(arr));
            }
        }
        Transport::Sse { url } => {
            t["url"] = toml_edit::value(url.as_str());
        }
    }

    if !server.env.is_empty() {
        let mut env_tbl = Table::new();
        for (k, v) in &server.env {
            env_tbl[&k[..]] = toml_edit::value(v.as_str());
        }
        t["env"] = Item::Table(env_tbl);
    }

    if !server.enabled {
        t["disabled"] = toml_edit::value(true);
    }

    t
}

/// Read one entry table back into the uniform model
///
/// Transport detection: a `command` member means stdio, otherwise sse.
/// A missing `disabled` marker means enabled.
pub fn table_to_server(name: &str, tbl: &dyn TableLike) -> McpServer {
    let transport = if let Some(cmd) = tbl.get("command") {
        let args = tbl
            .get("args")
            .and_then(|item| item.as_array())
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
            url: tbl
                .get("url")
                .and_then(|item| item.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    };

    let env: IndexMap<String, String> = tbl
        .get("env")
        .and_then(|item| item.as_table_like())
        .map(|env_tbl| {
            env_tbl
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.to_string(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let enabled = !tbl
        .get("disabled")
        .and_then(|item| item.as_bool())
        .unwrap_or(false);

    McpServer {
        name: name.to_string(),
        transport,
        env,
        enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_table_round_trips() {
        let mut server = McpServer::stdio("fs", "npx", vec!["-y".into(), "mcp-fs".into()]);
        server.env.insert("ROOT".into(), "/tmp".into());
        server.enabled = false;

        let tbl = server_to_toml_table(&server);
        let back = table_to_server("fs", &tbl);
        assert_eq!(back, server);
    }

    #[test]
    fn sse_table_omits_command_fields() {
        let server = McpServer::sse("remote", "https://mcp.example/sse");
        let tbl = server_to_toml_table(&server);

        assert!(tbl.get("command").is_none());
        assert!(tbl.get("args").is_none());
        assert!(tbl.get("env").is_none());
        assert!(tbl.get("disabled").is_none());
        assert_eq!(table_to_server("remote", &tbl), server);
    }

    #[test]
    fn absent_disabled_marker_reads_as_enabled() {
        let text = "[mcp_servers.echo]\ncommand = \"echo\"\n";
        let doc: toml_edit::DocumentMut = text.parse().expect("parse");
        let tbl = doc["mcp_servers"]["echo"]
            .as_table_like()
            .expect("entry table");

        let server = table_to_server("echo", tbl);
        assert!(server.enabled);
    }
}
