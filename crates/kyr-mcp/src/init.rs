//! `kyr-mcp init`: register the server in project-scoped config files of
//! the MCP clients installed on this machine.
//!
//! Existing entries for other servers are kept. A config file that does not
//! parse is left untouched and reported, never replaced.

use std::fs;
use std::path::{Path, PathBuf};

/// Name the server is registered under in every client config.
pub const SERVER_KEY: &str = "kyr";

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("neither `claude` nor `codex` found in PATH; install Claude Code or OpenAI Codex first, then re-run `kyr-mcp init`")]
    NoClient,
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid JSON, fix or remove it first: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} is not valid TOML, fix or remove it first: {source}", .path.display())]
    InvalidToml {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
    #[error("{}: `{key}` must be a table", .path.display())]
    NotATable { path: PathBuf, key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Client {
    ClaudeCode,
    Codex,
}

impl Client {
    pub const ALL: [Client; 2] = [Client::ClaudeCode, Client::Codex];

    fn executable(self) -> &'static str {
        match self {
            Client::ClaudeCode => "claude",
            Client::Codex => "codex",
        }
    }

    pub fn config_path(self, project: &Path) -> PathBuf {
        match self {
            Client::ClaudeCode => project.join(".mcp.json"),
            Client::Codex => project.join(".codex").join("config.toml"),
        }
    }

    /// Config text with the `kyr` entry set to `command`.
    fn merge(self, path: &Path, existing: Option<&str>, command: &str) -> Result<String, InitError> {
        match self {
            Client::ClaudeCode => merge_mcp_json(path, existing, command),
            Client::Codex => merge_codex_toml(path, existing, command),
        }
    }

    fn register(self, project: &Path, command: &str) -> Result<PathBuf, InitError> {
        let path = self.config_path(project);
        let io_err = |source: std::io::Error| InitError::Io {
            path: path.clone(),
            source,
        };

        let existing = match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(io_err(e)),
        };
        let merged = self.merge(&path, existing.as_deref(), command)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(&path, merged).map_err(io_err)?;
        tracing::info!(client = ?self, path = %path.display(), "registered kyr-mcp");
        Ok(path)
    }
}

/// Clients whose executable is on `PATH`.
pub fn installed_clients() -> Vec<Client> {
    Client::ALL
        .into_iter()
        .filter(|c| which::which(c.executable()).is_ok())
        .collect()
}

/// Register `command` with each client under `project`. Returns the files written.
pub fn register(project: &Path, command: &str, clients: &[Client]) -> Result<Vec<PathBuf>, InitError> {
    if clients.is_empty() {
        return Err(InitError::NoClient);
    }
    clients.iter().map(|c| c.register(project, command)).collect()
}

fn merge_mcp_json(path: &Path, existing: Option<&str>, command: &str) -> Result<String, InitError> {
    let mut root: serde_json::Value = match existing {
        Some(text) if !text.trim().is_empty() => {
            serde_json::from_str(text).map_err(|source| InitError::InvalidJson {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => serde_json::json!({}),
    };
    let not_a_table = |key: &'static str| InitError::NotATable {
        path: path.to_path_buf(),
        key,
    };

    let servers = root
        .as_object_mut()
        .ok_or_else(|| not_a_table("(root)"))?
        .entry("mcpServers")
        .or_insert_with(|| serde_json::json!({}))
        .as_object_mut()
        .ok_or_else(|| not_a_table("mcpServers"))?;
    servers.insert(
        SERVER_KEY.to_string(),
        serde_json::json!({
            "type": "stdio",
            "command": command,
            "args": [],
        }),
    );

    let mut text = serde_json::to_string_pretty(&root).map_err(|source| InitError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    Ok(text)
}

fn merge_codex_toml(path: &Path, existing: Option<&str>, command: &str) -> Result<String, InitError> {
    let mut doc: toml_edit::DocumentMut = match existing {
        Some(text) => text.parse().map_err(|source| InitError::InvalidToml {
            path: path.to_path_buf(),
            source,
        })?,
        None => toml_edit::DocumentMut::new(),
    };
    let not_a_table = |key: &'static str| InitError::NotATable {
        path: path.to_path_buf(),
        key,
    };

    let servers = doc
        .entry("mcp_servers")
        .or_insert(toml_edit::table())
        .as_table_mut()
        .ok_or_else(|| not_a_table("mcp_servers"))?;
    servers.set_implicit(true);

    // Update in place so a rerun keeps the entry where it was.
    let server = servers
        .entry(SERVER_KEY)
        .or_insert(toml_edit::table())
        .as_table_mut()
        .ok_or_else(|| not_a_table("mcp_servers.kyr"))?;
    server.insert("command", toml_edit::value(command));
    server.insert("args", toml_edit::value(toml_edit::Array::new()));

    Ok(doc.to_string())
}
