use anyhow::{anyhow, bail, Context, Result};
use snap_llm::LlmConfig;
use snap_state::UnknownAbility;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the inputs and every file the workflow writes
    pub project_root: PathBuf,
    pub llm: LlmConfig,
    pub unknown_ability: UnknownAbility,
}

/// `SNAPHELP_HOME` when set, otherwise the working directory
pub fn resolve_project_root() -> PathBuf {
    std::env::var_os("SNAPHELP_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppConfig {
    /// Load `<project_root>/.env` (if present) and read settings from the
    /// process environment.
    pub fn from_env(project_root: PathBuf) -> Result<Self> {
        let env_file = project_root.join(".env");
        if env_file.exists() {
            dotenv::from_path(&env_file)
                .with_context(|| format!("Failed to load {}", env_file.display()))?;
            tracing::debug!("Loaded environment from {}", env_file.display());
        }
        Self::from_lookup(project_root, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(project_root: PathBuf, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var(API_KEY_VAR).ok_or_else(|| {
            anyhow!(
                "{} is not set. Please add it to your environment or .env file.",
                API_KEY_VAR
            )
        })?;

        let mut llm = LlmConfig::new(api_key.trim());
        if let Some(url) = var("SNAPHELP_API_URL") {
            llm.base_url = url;
        }
        if let Some(model) = var("SNAPHELP_MODEL") {
            llm.model = model;
        }
        if let Some(max_tokens) = var("SNAPHELP_MAX_TOKENS") {
            llm.max_tokens = parse_number("SNAPHELP_MAX_TOKENS", &max_tokens)?;
        }
        if let Some(secs) = var("SNAPHELP_TIMEOUT_SECS") {
            let secs: u64 = parse_number("SNAPHELP_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                bail!("SNAPHELP_TIMEOUT_SECS must be greater than zero");
            }
            llm.timeout = Duration::from_secs(secs);
        }

        let unknown_ability = match var("SNAPHELP_UNKNOWN_ABILITY") {
            Some(policy) => policy.parse().map_err(|e: String| anyhow!(e))?,
            None => UnknownAbility::default(),
        };

        Ok(Self {
            project_root,
            llm,
            unknown_ability,
        })
    }

    pub fn abilities_path(&self) -> PathBuf {
        self.project_root.join("card_abilities.txt")
    }

    pub fn screenshot_path(&self) -> PathBuf {
        self.project_root.join("screenshot.png")
    }

    pub fn advice_path(&self) -> PathBuf {
        self.project_root.join(snap_advisor::ADVICE_FILE)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a positive integer, got '{}'", key, value))
}
