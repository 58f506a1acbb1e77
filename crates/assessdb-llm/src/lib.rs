//! External text-generation service and the refinement steps built on it.
//!
//! Every call here can fail or time out; [`refine`] turns each failure into
//! its fixed substitution so retrieval never depends on the service.

use assessdb_core::config::LlmConfig;
use assessdb_core::error::Error;
use assessdb_core::traits::TextGenerator;

mod gemini;
pub mod refine;

pub use gemini::GeminiClient;

/// Stand-in used when no API key is configured or the service is switched off.
/// Every call fails, so every refinement step takes its substitution.
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Err(Error::ExternalService { call: "generate", message: "language service is disabled".into() }.into())
    }
}

/// Pick the generator for this process from `llm` settings and the key
/// variable they name.
pub fn generator_from_config(config: &LlmConfig) -> Box<dyn TextGenerator> {
    if !config.enabled {
        tracing::info!("language service disabled by configuration");
        return Box::new(DisabledGenerator);
    }
    let api_key = match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!(var = %config.api_key_env, "no API key for the language service; refinement steps will use fallbacks");
            return Box::new(DisabledGenerator);
        }
    };
    match GeminiClient::new(config, api_key) {
        Ok(client) => Box::new(client),
        Err(err) => {
            tracing::warn!(error = %err, "failed to build language service client");
            Box::new(DisabledGenerator)
        }
    }
}
