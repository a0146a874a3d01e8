use chrono::Local;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config;
use crate::error::AppError;
use crate::mcp::store;
use crate::tools;

const BACKUP_PREFIX: &str = "backup-";

/// 备份元数据：`name` 是工件文件名，`id` 可按字典序排序，
/// `created_at` 是解码回显示格式的捕获时间
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub name: String,
    pub id: String,
    pub created_at: String,
}

/// 快照工件：每个工具配置文件的原始文本，None 表示捕获时文件不存在
#[derive(Debug, Serialize, Deserialize)]
struct BackupArtifact {
    created_at: String,
    files: IndexMap<String, Option<String>>,
}

/// 时间戳 -> 备份 id：冒号对文件名不安全，编码为 '-'
///
/// 编码后的 id 仍按时间先后字典序排序。
pub fn encode_timestamp(display: &str) -> String {
    match display.split_once('T') {
        Some((date, time)) => format!("{date}T{}", time.replace(':', "-")),
        None => display.to_string(),
    }
}

/// 备份 id -> 显示时间戳：剥掉同秒去重后缀，还原时间分隔符
pub fn decode_backup_id(id: &str) -> String {
    let base = id.split_once('_').map(|(base, _)| base).unwrap_or(id);
    match base.split_once('T') {
        Some((date, time)) => format!("{date}T{}", time.replace('-', ":")),
        None => base.to_string(),
    }
}

fn artifact_file_name(id: &str) -> String {
    format!("{BACKUP_PREFIX}{id}.json")
}

/// 同一秒内的重复调用追加 `_NN` 后缀保证 id 唯一且保序
fn fresh_backup_id(dir: &Path, display_ts: &str) -> String {
    let base = encode_timestamp(display_ts);
    let mut candidate = base.clone();
    let mut n = 1usize;
    while dir.join(artifact_file_name(&candidate)).exists() {
        n += 1;
        candidate = format!("{base}_{n:02}");
    }
    candidate
}

/// 为每个已知工具捕获原始文件内容（无论 exists 与否），写入一个新快照
pub fn create_backup() -> Result<BackupInfo, AppError> {
    let dir = config::get_backup_dir();
    fs::create_dir_all(&dir).map_err(|e| AppError::io(&dir, e))?;

    let created_at = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    let id = fresh_backup_id(&dir, &created_at);

    let mut files: IndexMap<String, Option<String>> = IndexMap::new();
    for def in tools::tool_definitions() {
        let path = def.resolved_path();
        let content = if path.exists() {
            Some(fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?)
        } else {
            None
        };
        files.insert(def.name.to_string(), content);
    }

    let artifact = BackupArtifact {
        created_at: created_at.clone(),
        files,
    };
    let file_name = artifact_file_name(&id);
    config::write_json_file(&dir.join(&file_name), &artifact)?;
    log::info!("已创建备份 {file_name}");

    Ok(BackupInfo {
        name: file_name,
        id,
        created_at,
    })
}

/// 列出全部快照元数据，按 id 降序（最新在前）
pub fn list_backups() -> Result<Vec<BackupInfo>, AppError> {
    let dir = config::get_backup_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|e| AppError::io(&dir, e))? {
        let Ok(entry) = entry else { continue };
        let file_name = entry.file_name().to_string_lossy().to_string();
        let Some(id) = file_name
            .strip_prefix(BACKUP_PREFIX)
            .and_then(|rest| rest.strip_suffix(".json"))
        else {
            continue;
        };
        backups.push(BackupInfo {
            name: file_name.clone(),
            id: id.to_string(),
            created_at: decode_backup_id(id),
        });
    }

    backups.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(backups)
}

fn validate_artifact_name(file_name: &str) -> Result<(), AppError> {
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(AppError::InvalidInput(format!(
            "非法的备份文件名: {file_name}"
        )));
    }
    Ok(())
}

/// 按快照恢复工具配置文件（逐文件原子替换）
///
/// 捕获时不存在的文件在恢复时被删除而非建空。多文件恢复不是单一事务：
/// 中途失败会留下混合状态，错误会携带已完成的文件数。
pub fn restore_backup(
    file_name: &str,
    tools_filter: Option<&[String]>,
) -> Result<Vec<String>, AppError> {
    validate_artifact_name(file_name)?;
    let path = config::get_backup_dir().join(file_name);
    if !path.exists() {
        return Err(AppError::BackupNotFound(file_name.to_string()));
    }

    let artifact: BackupArtifact = config::read_json_file(&path)?;

    let mut restored = Vec::new();
    for (tool, content) in &artifact.files {
        if let Some(filter) = tools_filter {
            if !filter.contains(tool) {
                continue;
            }
        }

        let def = match tools::find_tool(tool) {
            Ok(def) => def,
            Err(_) => {
                log::warn!("备份包含未知工具 '{tool}'，已跳过");
                continue;
            }
        };

        let target = def.resolved_path();
        let lock = store::lock_for_path(&target);
        let _guard = lock.lock().expect("获取文件锁失败");

        let result = match content {
            Some(text) => config::write_text_file(&target, text),
            None => config::delete_file(&target),
        };
        if let Err(err) = result {
            return Err(AppError::Aborted {
                completed: restored.len(),
                source: Box::new(err),
            });
        }
        restored.push(tool.clone());
    }

    log::info!("已从 {file_name} 恢复 {} 个工具的配置", restored.len());
    Ok(restored)
}

/// 删除一个快照工件
pub fn delete_backup(file_name: &str) -> Result<(), AppError> {
    validate_artifact_name(file_name)?;
    let path = config::get_backup_dir().join(file_name);
    if !path.exists() {
        return Err(AppError::BackupNotFound(file_name.to_string()));
    }
    fs::remove_file(&path).map_err(|e| AppError::io(&path, e))
}
