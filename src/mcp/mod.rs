//! MCP 服务器条目模型、各工具方言与文件存储

pub mod dialect;
pub mod model;
pub mod store;
pub mod sync;
mod toml_convert;

pub use model::{validate_server, McpServer, Transport};
pub use sync::{BatchFailure, BatchReport, GroupedServer, SyncOutcome};
