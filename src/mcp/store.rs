use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use super::dialect::DocumentSkeleton;
use super::model::{validate_server, McpServer};
use crate::config;
use crate::error::AppError;
use crate::tools::{self, ToolDef};

/// 每个配置文件路径一把进程内互斥锁，串行化同进程写者；
/// 跨进程写者（工具自身）按乐观策略处理，rename 一步定胜负
static PATH_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

pub(crate) fn lock_for_path(path: &Path) -> Arc<Mutex<()>> {
    let registry = PATH_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = registry.lock().expect("获取路径锁注册表失败");
    map.entry(path.to_path_buf()).or_default().clone()
}

/// 读取当前磁盘状态；文件不存在等价于空文档
fn load(def: &ToolDef, path: &Path) -> Result<(Vec<McpServer>, DocumentSkeleton), AppError> {
    let dialect = def.dialect();
    if !path.exists() {
        return Ok((Vec::new(), dialect.empty_skeleton()));
    }

    let text = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    dialect.decode(&text, path)
}

fn write(
    def: &ToolDef,
    path: &Path,
    skeleton: DocumentSkeleton,
    servers: &[McpServer],
) -> Result<(), AppError> {
    let text = def.dialect().encode(skeleton, servers)?;
    config::write_text_file(path, &text)
}

/// 列出某工具的全部条目（文档顺序）；文件不存在返回空列表
pub fn list_servers(tool: &str) -> Result<Vec<McpServer>, AppError> {
    let def = tools::find_tool(tool)?;
    let path = def.resolved_path();
    Ok(load(def, &path)?.0)
}

/// 新增或按名称覆盖一个条目；每次调用都重读磁盘再改写
pub fn upsert_server(tool: &str, server: McpServer) -> Result<(), AppError> {
    validate_server(&server)?;
    let def = tools::find_tool(tool)?;
    let path = def.resolved_path();

    let lock = lock_for_path(&path);
    let _guard = lock.lock().expect("获取文件锁失败");

    let (mut servers, skeleton) = load(def, &path)?;
    if let Some(existing) = servers.iter_mut().find(|s| s.name == server.name) {
        *existing = server;
    } else {
        servers.push(server);
    }

    write(def, &path, skeleton, &servers)
}

pub fn delete_server(tool: &str, name: &str) -> Result<(), AppError> {
    let def = tools::find_tool(tool)?;
    let path = def.resolved_path();

    let lock = lock_for_path(&path);
    let _guard = lock.lock().expect("获取文件锁失败");

    let (mut servers, skeleton) = load(def, &path)?;
    let before = servers.len();
    servers.retain(|s| s.name != name);
    if servers.len() == before {
        return Err(AppError::ServerNotFound {
            tool: tool.to_string(),
            name: name.to_string(),
        });
    }

    write(def, &path, skeleton, &servers)
}

/// 翻转启用状态，返回更新后的条目
pub fn toggle_server(tool: &str, name: &str) -> Result<McpServer, AppError> {
    let def = tools::find_tool(tool)?;
    let path = def.resolved_path();

    let lock = lock_for_path(&path);
    let _guard = lock.lock().expect("获取文件锁失败");

    let (mut servers, skeleton) = load(def, &path)?;
    let server = servers
        .iter_mut()
        .find(|s| s.name == name)
        .ok_or_else(|| AppError::ServerNotFound {
            tool: tool.to_string(),
            name: name.to_string(),
        })?;
    server.enabled = !server.enabled;
    let updated = server.clone();

    write(def, &path, skeleton, &servers)?;
    Ok(updated)
}

/// 整体替换某工具的条目集合（供替换式导入使用）
pub fn replace_servers(tool: &str, servers: Vec<McpServer>) -> Result<(), AppError> {
    for server in &servers {
        validate_server(server)?;
    }
    let def = tools::find_tool(tool)?;
    let path = def.resolved_path();

    let lock = lock_for_path(&path);
    let _guard = lock.lock().expect("获取文件锁失败");

    let (_, skeleton) = load(def, &path)?;
    write(def, &path, skeleton, &servers)
}
