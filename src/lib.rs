mod backup;
mod commands;
mod config;
mod error;
mod mcp;
mod settings;
mod tools;
mod transfer;

pub use backup::{decode_backup_id, encode_timestamp, BackupInfo};
pub use commands::*;
pub use config::{atomic_write, read_json_file};
pub use error::AppError;
pub use mcp::{
    validate_server, BatchFailure, BatchReport, GroupedServer, McpServer, SyncOutcome, Transport,
};
pub use settings::{reload_settings, update_settings, AppSettings};
pub use tools::{resolve_tool_path, ToolInfo};
pub use transfer::ExportBundle;
