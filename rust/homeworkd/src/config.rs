use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "homeworkd.toml";
pub const DEFAULT_DATABASE_FILE: &str = "homework.sqlite3";

/// What a mutation does when the persisted copy cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Log the failure and keep the in-memory change.
    #[default]
    BestEffort,
    /// Roll the in-memory change back and return the failure.
    Strict,
}

impl WritePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Some(Self::BestEffort),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BestEffort => "best_effort",
            Self::Strict => "strict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct Config {
    pub write_policy: WritePolicy,
    pub database_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write_policy: WritePolicy::default(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `<workspace>/homeworkd.toml` if present, then `HOMEWORKD_*` env vars.
    pub fn load(workspace: &Path) -> anyhow::Result<Self> {
        let path = workspace.join(CONFIG_FILE);
        let mut cfg = if path.is_file() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
            Self::from_toml(&raw)
                .with_context(|| format!("invalid config {}", path.to_string_lossy()))?
        } else {
            Self::default()
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.check()?;
        Ok(cfg)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(raw) = lookup("HOMEWORKD_WRITE_POLICY") {
            self.write_policy = WritePolicy::parse(&raw).ok_or_else(|| {
                anyhow!("HOMEWORKD_WRITE_POLICY must be best_effort or strict, got {raw:?}")
            })?;
        }
        if let Some(raw) = lookup("HOMEWORKD_DATABASE_FILE") {
            self.database_file = raw.trim().to_string();
        }
        self.check()
    }

    fn check(&self) -> anyhow::Result<()> {
        let name = self.database_file.as_str();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(anyhow!(
                "database_file must be a plain file name, got {name:?}"
            ));
        }
        Ok(())
    }
}
