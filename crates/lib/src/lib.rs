//! skilldex core library: skill library access, search, rule extraction, templates, and the
//! MCP stdio server used by the CLI.

pub mod config;
pub mod init;
pub mod server;
pub mod skills;
pub mod templates;
pub mod tools;
