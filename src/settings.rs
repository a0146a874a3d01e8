use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{OnceLock, RwLock};

use crate::config;
use crate::error::AppError;

/// 应用设置：各工具配置文件的路径覆盖，持久化在 ~/.mcp-hub/settings.json
///
/// 引擎本身无状态（每次操作都重读工具配置文件），唯一的进程内缓存就是这份
/// 设置，两次连续的路径解析之间没有写入就不会变化。
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// 工具名 -> 自定义配置文件路径（空字符串等价于未覆盖）
    #[serde(default)]
    pub custom_paths: HashMap<String, String>,
}

impl AppSettings {
    /// 去掉空白覆盖项，避免把 "  " 当成有效路径
    fn normalize(&mut self) {
        for path in self.custom_paths.values_mut() {
            *path = path.trim().to_string();
        }
        self.custom_paths.retain(|_, path| !path.is_empty());
    }

    fn load_from_file() -> Self {
        let path = config::get_settings_path();
        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str::<AppSettings>(&content) {
                Ok(mut settings) => {
                    settings.normalize();
                    settings
                }
                Err(err) => {
                    log::warn!(
                        "解析设置文件失败，将使用默认设置。路径: {}, 错误: {}",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }
}

static SETTINGS_STORE: OnceLock<RwLock<AppSettings>> = OnceLock::new();

fn settings_store() -> &'static RwLock<AppSettings> {
    SETTINGS_STORE.get_or_init(|| RwLock::new(AppSettings::load_from_file()))
}

pub fn get_settings() -> AppSettings {
    settings_store().read().expect("读取设置锁失败").clone()
}

pub fn update_settings(mut new_settings: AppSettings) -> Result<(), AppError> {
    new_settings.normalize();
    config::write_json_file(&config::get_settings_path(), &new_settings)?;

    let mut guard = settings_store().write().expect("写入设置锁失败");
    *guard = new_settings;
    Ok(())
}

/// 从磁盘重新加载设置到内存缓存（外部改动 settings.json 后调用）
pub fn reload_settings() {
    let fresh = AppSettings::load_from_file();
    let mut guard = settings_store().write().expect("写入设置锁失败");
    *guard = fresh;
}

/// 展开覆盖路径中的 `~` / `~/` 前缀
pub(crate) fn resolve_override_path(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(stripped) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    } else if let Some(stripped) = raw.strip_prefix("~\\") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }

    PathBuf::from(raw)
}

/// 查询某工具的路径覆盖（已展开 ~，未覆盖返回 None）
pub fn custom_path_for(tool: &str) -> Option<PathBuf> {
    let settings = settings_store().read().ok()?;
    settings
        .custom_paths
        .get(tool)
        .filter(|p| !p.trim().is_empty())
        .map(|p| resolve_override_path(p))
}
