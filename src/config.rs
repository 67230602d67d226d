use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::generator::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::session::question::Difficulty;
use crate::session::setup::{
    Category, MAX_QUESTIONS, MAX_TIME_LIMIT, MIN_QUESTIONS, MIN_TIME_LIMIT, QuizConfiguration,
    ScoringMode,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_remote_enabled")]
    pub remote_enabled: bool,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_category() -> String {
    Category::Javascript.id().to_string()
}
fn default_difficulty() -> String {
    Difficulty::Medium.as_str().to_string()
}
fn default_question_count() -> u32 {
    5
}
fn default_time_limit() -> u32 {
    30
}
fn default_mode() -> String {
    ScoringMode::Standard.as_str().to_string()
}
fn default_remote_enabled() -> bool {
    true
}
fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_request_timeout_secs() -> u64 {
    20
}
fn default_export_dir() -> String {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            category: default_category(),
            difficulty: default_difficulty(),
            question_count: default_question_count(),
            time_limit: default_time_limit(),
            mode: default_mode(),
            remote_enabled: default_remote_enabled(),
            api_base_url: default_api_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
            export_dir: default_export_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mindmaze")
            .join("config.toml")
    }

    /// Clamp numbers into range and reset unknown ids to their defaults.
    /// Call after deserialization or after applying command-line overrides.
    pub fn validate(&mut self) {
        if Category::from_str(&self.category).is_err() {
            self.category = default_category();
        }
        if Difficulty::from_str(&self.difficulty).is_err() {
            self.difficulty = default_difficulty();
        }
        if ScoringMode::from_str(&self.mode).is_err() {
            self.mode = default_mode();
        }
        self.question_count = self.question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS);
        self.time_limit = self.time_limit.clamp(MIN_TIME_LIMIT, MAX_TIME_LIMIT);
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = default_api_base_url();
        }
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
    }

    pub fn quiz_configuration(&self) -> QuizConfiguration {
        QuizConfiguration::clamped(
            Category::from_str(&self.category).unwrap_or_default(),
            Difficulty::from_label_lenient(&self.difficulty),
            self.question_count,
            self.time_limit,
        )
    }

    pub fn scoring_mode(&self) -> ScoringMode {
        ScoringMode::from_label(&self.mode)
    }

    /// Remember the last submitted setup as the new defaults.
    pub fn remember(&mut self, quiz: &QuizConfiguration, mode: ScoringMode) {
        self.category = quiz.category.id().to_string();
        self.difficulty = quiz.difficulty.as_str().to_string();
        self.question_count = quiz.question_count;
        self.time_limit = quiz.time_limit;
        self.mode = mode.as_str().to_string();
    }

    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }
}
