use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AppError;
use crate::mcp::dialect::{Dialect, DialectKind};
use crate::settings;

/// 默认路径挂靠的基准目录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathBase {
    /// 用户主目录（dotfile 类工具）
    Home,
    /// 平台配置目录（macOS: Library/Application Support，Linux: XDG config）
    Config,
}

/// 受支持工具的静态定义
#[derive(Debug)]
pub struct ToolDef {
    pub name: &'static str,
    pub display_name: &'static str,
    /// 该工具配置文件中存放服务器映射的属性名
    pub config_key: &'static str,
    pub dialect: DialectKind,
    base: PathBase,
    rel: &'static str,
}

/// 工具表：新增工具 = 新增一行 + 方言变体，调用方不做任何字符串分支
static TOOL_DEFS: &[ToolDef] = &[
    ToolDef {
        name: "claude",
        display_name: "Claude Code",
        config_key: "mcpServers",
        dialect: DialectKind::Json,
        base: PathBase::Home,
        rel: ".claude.json",
    },
    ToolDef {
        name: "gemini",
        display_name: "Gemini CLI",
        config_key: "mcpServers",
        dialect: DialectKind::Json,
        base: PathBase::Home,
        rel: ".gemini/settings.json",
    },
    ToolDef {
        name: "codex",
        display_name: "Codex CLI",
        config_key: "mcp_servers",
        dialect: DialectKind::Toml,
        base: PathBase::Home,
        rel: ".codex/config.toml",
    },
    ToolDef {
        name: "copilot",
        display_name: "Copilot CLI",
        config_key: "mcpServers",
        dialect: DialectKind::Json,
        base: PathBase::Home,
        rel: ".copilot/mcp-config.json",
    },
    ToolDef {
        name: "vscode",
        display_name: "VS Code",
        config_key: "servers",
        dialect: DialectKind::Json,
        base: PathBase::Config,
        rel: "Code/User/mcp.json",
    },
    ToolDef {
        name: "cursor",
        display_name: "Cursor",
        config_key: "mcpServers",
        dialect: DialectKind::Json,
        base: PathBase::Config,
        rel: "Cursor/User/mcp.json",
    },
    ToolDef {
        name: "vscode-insiders",
        display_name: "VS Code Insiders",
        config_key: "servers",
        dialect: DialectKind::Json,
        base: PathBase::Config,
        rel: "Code - Insiders/User/mcp.json",
    },
    ToolDef {
        name: "windsurf",
        display_name: "Windsurf",
        config_key: "mcpServers",
        dialect: DialectKind::Json,
        base: PathBase::Home,
        rel: ".codeium/windsurf/mcp_config.json",
    },
];

fn config_root() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .expect("无法获取用户主目录")
            .join(".config")
    })
}

impl ToolDef {
    pub fn default_path(&self) -> PathBuf {
        let base = match self.base {
            PathBase::Home => dirs::home_dir().expect("无法获取用户主目录"),
            PathBase::Config => config_root(),
        };
        base.join(self.rel)
    }

    /// 解析顺序：路径覆盖（非空）优先，否则默认路径
    pub fn resolved_path(&self) -> PathBuf {
        settings::custom_path_for(self.name).unwrap_or_else(|| self.default_path())
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::new(self.dialect, self.config_key)
    }
}

/// 全部工具定义（固定顺序）
pub fn tool_definitions() -> &'static [ToolDef] {
    TOOL_DEFS
}

pub fn find_tool(name: &str) -> Result<&'static ToolDef, AppError> {
    TOOL_DEFS
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| AppError::ToolNotFound(name.to_string()))
}

pub fn resolve_tool_path(name: &str) -> Result<PathBuf, AppError> {
    Ok(find_tool(name)?.resolved_path())
}

/// 工具的对外视图，`exists` 在每次调用时现场探测
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub name: String,
    pub display_name: String,
    pub config_path: String,
    pub config_key: String,
    pub exists: bool,
    pub is_custom_path: bool,
}

pub fn list_tools() -> Vec<ToolInfo> {
    TOOL_DEFS
        .iter()
        .map(|def| {
            let is_custom = settings::custom_path_for(def.name).is_some();
            let path = def.resolved_path();
            ToolInfo {
                name: def.name.to_string(),
                display_name: def.display_name.to_string(),
                config_path: path.to_string_lossy().to_string(),
                config_key: def.config_key.to_string(),
                exists: path.exists(),
                is_custom_path: is_custom,
            }
        })
        .collect()
}

/// 设置或清除某工具的路径覆盖；只写侧存储，从不触碰工具自己的配置文件
pub fn set_custom_path(tool: &str, path: &str) -> Result<(), AppError> {
    find_tool(tool)?;

    let mut current = settings::get_settings();
    let trimmed = path.trim();

    if trimmed.is_empty() {
        current.custom_paths.remove(tool);
    } else {
        let expanded = settings::resolve_override_path(trimmed);
        if !expanded.is_absolute() {
            return Err(AppError::PathInvalid(format!(
                "路径必须是绝对路径或以 ~ 开头: {trimmed}"
            )));
        }
        current.custom_paths.insert(tool.to_string(), trimmed.to_string());
    }

    settings::update_settings(current)
}
