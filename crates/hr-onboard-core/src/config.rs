//! Runtime configuration: defaults, optional TOML file, then `HR__*` environment overrides.
//!
//! The variable names used by earlier deployments (`AZURE_AI_ENDPOINT`, `AZURE_AI_API_KEY`,
//! `AZURE_AI_DEPLOYMENT`, `EXCEL_FILE`, `PORT`) are still honoured; they seed the defaults,
//! so the file and `HR__*` variables win over them.

use serde::Deserialize;
use std::path::Path;

use crate::store::DEFAULT_STORE_PATH;

pub const DEFAULT_CONFIG_PATH: &str = "config/hr_onboard";
pub const DEFAULT_DEPLOYMENT: &str = "hr-onboarding-gpt4";
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Completion endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    /// Resource host, with or without scheme (e.g. `my-res.openai.azure.com`).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub deployment: String,
    pub api_version: String,
    pub temperature: f32,
    pub top_p: f32,
    pub default_max_tokens: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
    pub tcp_keepalive_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            temperature: 0.7,
            top_p: 1.0,
            default_max_tokens: 4096,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            pool_max_idle_per_host: 8,
            pool_idle_timeout_secs: 90,
            tcp_keepalive_secs: 60,
        }
    }
}

impl AiSettings {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// `{scheme}://{resource}/openai/deployments/{deployment}/chat/completions?api-version={v}`.
    ///
    /// Any path on the configured endpoint is dropped; the scheme defaults to https.
    pub fn completion_url(&self) -> Option<String> {
        let raw = self.endpoint.as_deref()?.trim();
        let (scheme, rest) = if let Some(rest) = raw.strip_prefix("http://") {
            ("http", rest)
        } else if let Some(rest) = raw.strip_prefix("https://") {
            ("https", rest)
        } else {
            ("https", raw)
        };
        let resource = rest.split('/').next().unwrap_or_default();
        let deployment = self.deployment.trim();
        if resource.is_empty() || deployment.is_empty() {
            return None;
        }
        Some(format!(
            "{}://{}/openai/deployments/{}/chat/completions?api-version={}",
            scheme, resource, deployment, self.api_version
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.completion_url().is_some() && self.api_key().is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HrConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    pub storage_path: String,
    /// CSV workbook that receives one row per onboarded employee.
    pub spreadsheet_path: String,
    pub spreadsheet_lock_timeout_secs: u64,
    /// Token cap for `/api/ask` answers.
    pub ask_max_tokens: u32,
    /// Comma-separated allowed origins; `*` allows any.
    pub cors_origins: String,
    #[serde(default)]
    pub ai: AiSettings,
}

impl HrConfig {
    /// Load from `HR_CONFIG` (default `config/hr_onboard`) and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("HR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load with an explicit file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let ai = AiSettings::default();
        let port = env_opt_string("PORT")
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(8000);
        let mut builder = config::Config::builder()
            .set_default("app_name", "HR Onboarding Desk")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", port)?
            .set_default("storage_path", DEFAULT_STORE_PATH)?
            .set_default(
                "spreadsheet_path",
                env_opt_string("EXCEL_FILE").unwrap_or_else(|| "./data/employees.csv".to_string()),
            )?
            .set_default("spreadsheet_lock_timeout_secs", 30_i64)?
            .set_default("ask_max_tokens", 512_i64)?
            .set_default("cors_origins", "*")?
            .set_default(
                "ai.deployment",
                env_opt_string("AZURE_AI_DEPLOYMENT").unwrap_or(ai.deployment),
            )?
            .set_default("ai.api_version", ai.api_version)?
            .set_default("ai.temperature", ai.temperature as f64)?
            .set_default("ai.top_p", ai.top_p as f64)?
            .set_default("ai.default_max_tokens", ai.default_max_tokens as i64)?
            .set_default("ai.connect_timeout_secs", ai.connect_timeout_secs as i64)?
            .set_default("ai.request_timeout_secs", ai.request_timeout_secs as i64)?
            .set_default("ai.pool_max_idle_per_host", ai.pool_max_idle_per_host as i64)?
            .set_default("ai.pool_idle_timeout_secs", ai.pool_idle_timeout_secs as i64)?
            .set_default("ai.tcp_keepalive_secs", ai.tcp_keepalive_secs as i64)?;

        if let Some(endpoint) = env_opt_string("AZURE_AI_ENDPOINT") {
            builder = builder.set_default("ai.endpoint", endpoint)?;
        }
        if let Some(key) = env_opt_string("AZURE_AI_API_KEY") {
            builder = builder.set_default("ai.api_key", key)?;
        }

        let builder = if path.exists() || path.with_extension("toml").exists() {
            builder.add_source(config::File::with_name(&path.to_string_lossy()))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("HR").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `None` means any origin.
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
