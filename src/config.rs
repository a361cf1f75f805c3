//! Runtime configuration, loaded from environment variables and an optional `config.json`.

use crate::directory::{AdminRoles, RoleId};
use crate::store::CorruptRecordPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Holds `tournament_data.json` and `audit_log.json`.
    pub data_dir: PathBuf,
    /// Members holding any of these roles may run admin commands.
    pub admin_role_ids: Vec<RoleId>,
    pub corrupt_record_policy: CorruptRecordPolicy,
}

/// Keys accepted in `config.json`. Anything else in the file is ignored.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    admin_role_ids: Vec<RoleId>,
    data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            admin_role_ids: Vec::new(),
            corrupt_record_policy: CorruptRecordPolicy::Reset,
        }
    }
}

impl Config {
    /// Load configuration from `config.json` (if present) overlaid by environment variables.
    ///
    /// Environment variables:
    /// - `CONFIG_FILE` - path of the JSON config (default: `config.json`)
    /// - `HOST` / `PORT` - bind address (default: `0.0.0.0:8080`)
    /// - `DATA_DIR` - directory for the record and audit log (default: `data`)
    /// - `ADMIN_ROLE_IDS` - comma-separated role ids, replaces the file's list
    /// - `STRICT_PERSISTENCE` - `true`/`1` to fail on a corrupt record instead of resetting it
    pub fn load() -> Self {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
        let mut config = Self::default();
        if let Some(file) = read_file_config(Path::new(&path)) {
            config.admin_role_ids = file.admin_role_ids;
            if let Some(dir) = file.data_dir {
                config.data_dir = dir;
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from `lookup` (environment in production).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(ids) = lookup("ADMIN_ROLE_IDS") {
            self.admin_role_ids = parse_role_ids(&ids);
        }
        if let Some(strict) = lookup("STRICT_PERSISTENCE") {
            self.corrupt_record_policy = if strict.eq_ignore_ascii_case("true") || strict == "1" {
                CorruptRecordPolicy::Fail
            } else {
                CorruptRecordPolicy::Reset
            };
        }
    }

    pub fn admin_roles(&self) -> AdminRoles {
        AdminRoles::new(self.admin_role_ids.iter().copied())
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.data_dir.join("audit_log.json")
    }
}

fn read_file_config(path: &Path) -> Option<FileConfig> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

/// Parse `"1, 2,x,3"` into `[1, 2, 3]`; entries that are not ids are skipped.
fn parse_role_ids(raw: &str) -> Vec<RoleId> {
    raw.split(',')
        .filter_map(|s| {
            let s = s.trim();
            let parsed = s.parse().ok();
            if parsed.is_none() && !s.is_empty() {
                log::warn!("Skipping invalid role id in ADMIN_ROLE_IDS: {s}");
            }
            parsed
        })
        .collect()
}
