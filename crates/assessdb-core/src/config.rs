use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        match env {
            "prod" | "production" => {
                if settings.llm.enabled && env::var(&settings.llm.api_key_env).is_err() {
                    return Err(Error::InvalidConfig(format!(
                        "{} must be set when llm.enabled is true in production",
                        settings.llm.api_key_env
                    ))
                    .into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub data: DataConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.retrieval.overfetch_factor == 0 {
            return Err(Error::InvalidConfig("retrieval.overfetch_factor must be >= 1".into()));
        }
        if self.retrieval.max_top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.max_top_k must be >= 1".into()));
        }
        if self.retrieval.default_top_k == 0 || self.retrieval.default_top_k > self.retrieval.max_top_k {
            return Err(Error::InvalidConfig(format!(
                "retrieval.default_top_k must be within 1..={}",
                self.retrieval.max_top_k
            )));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be >= 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Scraped catalog CSV files consumed by the offline rebuild.
    pub catalog_files: Vec<String>,
    /// Directory holding the paired index + metadata artifacts.
    pub index_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog_files: vec!["data/shl_data_type1.csv".to_string()],
            index_dir: "data/index".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Local sentence-transformer directory; resolved from env/defaults when unset.
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { model_dir: None, max_len: 256, batch_size: 32 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub default_top_k: usize,
    pub max_top_k: usize,
    /// Candidates fetched per requested result before post-filtering.
    pub overfetch_factor: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_top_k: 10, max_top_k: 50, overfetch_factor: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Description prefix length sent to the reranker per candidate.
    pub description_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
            description_chars: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

/// `~` and `$VAR` expansion for configured paths (catalog files, index and
/// model directories). No canonicalisation.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
