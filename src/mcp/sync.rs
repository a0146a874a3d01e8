use indexmap::IndexMap;
use serde::Serialize;

use super::model::McpServer;
use super::store;
use crate::error::AppError;
use crate::tools;

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub synced: usize,
}

/// Copy the named entries from `from` into `to`, upserting by name.
///
/// `names = None` copies every entry of `from`. Names missing in `from` are
/// skipped, not errors. One store write per entry; a write failure aborts the
/// remaining loop and surfaces `AppError::Aborted` carrying the count
/// completed so far.
pub fn sync_servers(
    from: &str,
    to: &str,
    names: Option<&[String]>,
) -> Result<SyncOutcome, AppError> {
    tools::find_tool(from)?;
    tools::find_tool(to)?;

    let source = store::list_servers(from)?;
    let selected: Vec<McpServer> = match names {
        Some(names) => names
            .iter()
            .filter_map(|n| source.iter().find(|s| &s.name == n).cloned())
            .collect(),
        None => source,
    };

    let mut synced = 0usize;
    for server in selected {
        let name = server.name.clone();
        if let Err(err) = store::upsert_server(to, server) {
            log::warn!("同步 '{name}' 到 '{to}' 失败，剩余条目已放弃: {err}");
            return Err(AppError::Aborted {
                completed: synced,
                source: Box::new(err),
            });
        }
        synced += 1;
    }

    Ok(SyncOutcome { synced })
}

/// Read-side projection: one row per logical server name across all tools.
/// Aggregate `enabled` is true when any instance is enabled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedServer {
    pub name: String,
    pub enabled: bool,
    pub tools: Vec<String>,
}

pub fn list_grouped() -> Vec<GroupedServer> {
    let mut groups: IndexMap<String, GroupedServer> = IndexMap::new();

    for def in tools::tool_definitions() {
        match store::list_servers(def.name) {
            Ok(servers) => {
                for server in servers {
                    let group =
                        groups
                            .entry(server.name.clone())
                            .or_insert_with(|| GroupedServer {
                                name: server.name.clone(),
                                enabled: false,
                                tools: Vec::new(),
                            });
                    group.enabled = group.enabled || server.enabled;
                    group.tools.push(def.name.to_string());
                }
            }
            Err(err) => {
                log::warn!("读取 '{}' 配置失败，分组视图跳过该工具: {err}", def.name);
            }
        }
    }

    groups.into_values().collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub tool: String,
    pub error: String,
}

/// Per-target outcome of a grouped operation. All targets are attempted;
/// failures are collected instead of aborting the rest.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

fn grouped_apply<F>(name: &str, op: F) -> BatchReport
where
    F: Fn(&str) -> Result<(), AppError>,
{
    let mut report = BatchReport::default();

    for def in tools::tool_definitions() {
        match store::list_servers(def.name) {
            Ok(servers) => {
                if !servers.iter().any(|s| s.name == name) {
                    continue;
                }
                match op(def.name) {
                    Ok(()) => report.succeeded.push(def.name.to_string()),
                    Err(err) => report.failed.push(BatchFailure {
                        tool: def.name.to_string(),
                        error: err.to_string(),
                    }),
                }
            }
            // 无法判定该工具是否包含此名称，记为失败以便上层呈现
            Err(err) => report.failed.push(BatchFailure {
                tool: def.name.to_string(),
                error: err.to_string(),
            }),
        }
    }

    report
}

/// Flip the enabled flag of every instance of `name` across all tools
pub fn toggle_grouped(name: &str) -> BatchReport {
    grouped_apply(name, |tool| store::toggle_server(tool, name).map(|_| ()))
}

/// Delete every instance of `name` across all tools
pub fn delete_grouped(name: &str) -> BatchReport {
    grouped_apply(name, |tool| store::delete_server(tool, name))
}
