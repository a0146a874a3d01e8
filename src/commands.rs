//! 引擎对外的稳定操作面：UI 传输层按 1:1 包装这些函数。
//! 每个操作独立成败，错误在此边界以可读信息返回。

use indexmap::IndexMap;

use crate::backup::{self, BackupInfo};
use crate::error::AppError;
use crate::mcp::model::McpServer;
use crate::mcp::store;
use crate::mcp::sync::{self, BatchReport, GroupedServer, SyncOutcome};
use crate::settings::{self, AppSettings};
use crate::tools::{self, ToolInfo};
use crate::transfer::{self, ExportBundle};

/// 工具清单（`exists` 现场探测）
pub fn get_tools() -> Vec<ToolInfo> {
    tools::list_tools()
}

pub fn get_settings() -> AppSettings {
    settings::get_settings()
}

/// 更新某工具的路径覆盖；空字符串恢复默认路径
pub fn update_tool_path(tool: &str, path: &str) -> Result<(), AppError> {
    tools::set_custom_path(tool, path)
}

/// 全部工具的条目清单；解码失败的工具记日志后以空列表呈现，
/// 不让单个损坏文件拖垮整个视图（get_configs 仍会完整上报该错误）
pub fn get_all_configs() -> IndexMap<String, Vec<McpServer>> {
    let mut all = IndexMap::new();
    for def in tools::tool_definitions() {
        match store::list_servers(def.name) {
            Ok(servers) => {
                all.insert(def.name.to_string(), servers);
            }
            Err(err) => {
                log::warn!("读取 '{}' 配置失败: {err}", def.name);
                all.insert(def.name.to_string(), Vec::new());
            }
        }
    }
    all
}

pub fn get_configs(tool: &str) -> Result<Vec<McpServer>, AppError> {
    store::list_servers(tool)
}

/// 新增或按名称覆盖一个服务器条目（upsert 语义）
pub fn add_or_update_server(tool: &str, server: McpServer) -> Result<(), AppError> {
    store::upsert_server(tool, server)
}

pub fn delete_server(tool: &str, server_name: &str) -> Result<(), AppError> {
    store::delete_server(tool, server_name)
}

pub fn toggle_server(tool: &str, server_name: &str) -> Result<(), AppError> {
    store::toggle_server(tool, server_name).map(|_| ())
}

/// 把 `from` 中选中的条目复制到 `to`；`server_names = None` 表示全部
pub fn sync_configs(
    from: &str,
    to: &str,
    server_names: Option<Vec<String>>,
) -> Result<SyncOutcome, AppError> {
    sync::sync_servers(from, to, server_names.as_deref())
}

/// 跨工具分组视图：同名条目合并为一行，enabled 取任一实例
pub fn get_grouped_configs() -> Vec<GroupedServer> {
    sync::list_grouped()
}

/// 在所有包含该名称的工具上翻转启用状态，逐个尝试并汇总结果
pub fn toggle_server_everywhere(server_name: &str) -> BatchReport {
    sync::toggle_grouped(server_name)
}

/// 在所有包含该名称的工具上删除该条目，逐个尝试并汇总结果
pub fn delete_server_everywhere(server_name: &str) -> BatchReport {
    sync::delete_grouped(server_name)
}

pub fn get_backups() -> Result<Vec<BackupInfo>, AppError> {
    backup::list_backups()
}

pub fn create_backup() -> Result<BackupInfo, AppError> {
    backup::create_backup()
}

pub fn restore_backup(
    filename: &str,
    tools_to_restore: Option<Vec<String>>,
) -> Result<Vec<String>, AppError> {
    backup::restore_backup(filename, tools_to_restore.as_deref())
}

pub fn delete_backup(filename: &str) -> Result<(), AppError> {
    backup::delete_backup(filename)
}

pub fn export_configs() -> ExportBundle {
    transfer::export_configs()
}

pub fn import_configs(
    tools: IndexMap<String, Vec<McpServer>>,
    merge: bool,
) -> Result<Vec<String>, AppError> {
    transfer::import_configs(&tools, merge)
}
