use chrono::Local;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::mcp::model::McpServer;
use crate::mcp::store;
use crate::tools;

/// 可移植导出文档：按工具分组的解码后条目（与方言无关）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
    pub timestamp: String,
    pub tools: IndexMap<String, Vec<McpServer>>,
}

/// 导出全部工具的条目清单；解码失败的工具记日志后跳过
pub fn export_configs() -> ExportBundle {
    let mut tools_map = IndexMap::new();
    for def in tools::tool_definitions() {
        match store::list_servers(def.name) {
            Ok(servers) => {
                tools_map.insert(def.name.to_string(), servers);
            }
            Err(err) => {
                log::warn!("导出时读取 '{}' 失败，已跳过: {err}", def.name);
            }
        }
    }

    ExportBundle {
        timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        tools: tools_map,
    }
}

/// 导入条目集合
///
/// - `merge == true`：逐条 upsert，不触碰文档中未出现的现有条目
/// - `merge == false`：整体替换该工具的条目集合
///
/// 文档中的未知工具名直接忽略（不同安装之间的工具集可以不同）。
/// 某个工具写入失败会中止剩余工具，错误携带已完成的工具数。
pub fn import_configs(
    tools_map: &IndexMap<String, Vec<McpServer>>,
    merge: bool,
) -> Result<Vec<String>, AppError> {
    let mut imported = Vec::new();

    for (tool, servers) in tools_map {
        if tools::find_tool(tool).is_err() {
            log::warn!("导入文档包含未知工具 '{tool}'，已忽略");
            continue;
        }

        let result = if merge {
            servers
                .iter()
                .try_for_each(|server| store::upsert_server(tool, server.clone()))
        } else {
            store::replace_servers(tool, servers.clone())
        };

        if let Err(err) = result {
            return Err(AppError::Aborted {
                completed: imported.len(),
                source: Box::new(err),
            });
        }
        imported.push(tool.clone());
    }

    Ok(imported)
}
