use std::path::Path;

use thiserror::Error;

/// 引擎统一错误类型：所有操作在边界处返回带可读信息的失败
#[derive(Debug, Error)]
pub enum AppError {
    #[error("未知的工具: '{0}'")]
    ToolNotFound(String),

    #[error("工具 '{tool}' 中不存在服务器 '{name}'")]
    ServerNotFound { tool: String, name: String },

    #[error("备份不存在: {0}")]
    BackupNotFound(String),

    #[error("无效的路径覆盖: {0}")]
    PathInvalid(String),

    #[error("IO 错误 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    IoContext {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("解析 JSON 失败 ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("序列化 JSON 失败: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("解析 TOML 失败 ({path}): {source}")]
    Toml {
        path: String,
        #[source]
        source: toml_edit::TomlError,
    },

    /// 文件能解析但结构不符合该工具的方言（如 configKey 不是对象）
    #[error("不支持的配置结构: {0}")]
    UnsupportedDialect(String),

    #[error("MCP 服务器定义无效: {0}")]
    McpValidation(String),

    #[error("无效的输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    Config(String),

    /// 批量操作中途失败：携带已完成的子操作数，供调用方做部分成功上报
    #[error("批量操作中断（已完成 {completed} 项）: {source}")]
    Aborted {
        completed: usize,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        AppError::Json {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn toml(path: impl AsRef<Path>, source: toml_edit::TomlError) -> Self {
        AppError::Toml {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
