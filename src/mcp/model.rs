use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Transport definition of an MCP server: local process or SSE endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transport {
    Stdio {
        command: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
    },
    Sse {
        url: String,
    },
}

/// Uniform MCP server entry, identity is (tool, name)
///
/// The wire shape matches the UI contract: `type` is flattened alongside
/// `command`/`args`/`url`, `env` and `enabled` are optional with
/// enabled-by-default semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServer {
    pub name: String,
    #[serde(flatten)]
    pub transport: Transport,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl McpServer {
    pub fn stdio(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Stdio {
                command: command.into(),
                args,
            },
            env: IndexMap::new(),
            enabled: true,
        }
    }

    pub fn sse(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Sse { url: url.into() },
            env: IndexMap::new(),
            enabled: true,
        }
    }
}

/// Basic validation before any write: non-empty name plus the transport's
/// required field
pub fn validate_server(server: &McpServer) -> Result<(), AppError> {
    if server.name.trim().is_empty() {
        return Err(AppError::McpValidation("服务器名称不能为空".into()));
    }

    match &server.transport {
        Transport::Stdio { command, .. } => {
            if command.trim().is_empty() {
                return Err(AppError::McpValidation(format!(
                    "stdio 类型的服务器 '{}' 缺少 command 字段",
                    server.name
                )));
            }
        }
        Transport::Sse { url } => {
            if url.trim().is_empty() {
                return Err(AppError::McpValidation(format!(
                    "sse 类型的服务器 '{}' 缺少 url 字段",
                    server.name
                )));
            }
        }
    }

    Ok(())
}
