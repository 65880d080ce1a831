use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TIMESHEET_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TIMESHEET_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            storage: StorageConfig::from_env_profiled(p),
            ingest: IngestConfig::from_env_profiled(p),
            report: ReportConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  storage:  database={}", self.storage.database_path.display());
        tracing::info!("  ingest:   csv_delimiter={:?}", self.ingest.csv_delimiter as char);
        tracing::info!("  report:   top_n={}", self.report.top_n);
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// The single SQLite file holding every table.
    pub database_path: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        let data_dir = PathBuf::from(profiled_env_or(p, "DATA_DIR", "data"));
        let database_path = profiled_env_opt(p, "DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("timesheet.db"));
        Self {
            data_dir,
            database_path,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            database_path: data_dir.join("timesheet.db"),
            data_dir,
        }
    }
}

// ── Ingest ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Field delimiter for CSV uploads. `.tsv` files always use tab.
    pub csv_delimiter: u8,
}

impl IngestConfig {
    fn from_env_profiled(p: &str) -> Self {
        let raw = profiled_env_or(p, "CSV_DELIMITER", ",");
        let csv_delimiter = match raw.as_str() {
            "\\t" | "tab" => b'\t',
            s => s.bytes().next().unwrap_or(b','),
        };
        Self { csv_delimiter }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { csv_delimiter: b',' }
    }
}

// ── Report ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// How many technicians the top-N report ranks.
    pub top_n: usize,
}

impl ReportConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_n: profiled_env_usize(p, "REPORT_TOP_N", 5),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_n: 5 }
    }
}
