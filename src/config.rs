use crate::diff::ExcludeFilter;
use crate::error::{Error, Result};
use crate::reviewers::ReviewerKind;
use std::env;

pub const DEFAULT_EXCLUDE: &str = "*.md,*.txt,*.json";
pub const DEFAULT_ENABLED_REVIEWERS: &str = "ai";
pub const DEFAULT_AZURE_API_VERSION: &str = "2025-02-01-preview";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "codellama";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiBackend {
    Azure,
    Ollama,
}

impl std::str::FromStr for AiBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "azure" | "azure-openai" | "azure_openai" => Ok(AiBackend::Azure),
            "ollama" => Ok(AiBackend::Ollama),
            other => Err(Error::Config(format!(
                "unknown AI_BACKEND '{}', expected 'azure' or 'ollama'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiBackend::Azure => write!(f, "azure"),
            AiBackend::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Clone)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
}

/// Everything a run needs, resolved once from the action inputs.
#[derive(Clone)]
pub struct Config {
    pub github_token: String,
    pub github_api_url: String,
    pub backend: AiBackend,
    /// Present whenever the `ai` reviewer runs against Azure OpenAI.
    pub azure: Option<AzureConfig>,
    pub ollama: OllamaConfig,
    pub exclude: ExcludeFilter,
    pub enabled_reviewers: Vec<ReviewerKind>,
    pub concurrency_limit: usize,
    pub request_timeout_secs: u64,
    pub max_diff_tokens: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable source.
    ///
    /// Blank values are treated as unset: required ones fail, optional ones
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let enabled_reviewers = parse_reviewers(
            &get("INPUT_ENABLED_REVIEWERS").unwrap_or_else(|| DEFAULT_ENABLED_REVIEWERS.to_string()),
        );

        let backend = match get("AI_BACKEND") {
            Some(value) => value.parse()?,
            None => AiBackend::Azure,
        };

        let mut required = vec!["GITHUB_TOKEN"];
        let needs_azure =
            backend == AiBackend::Azure && enabled_reviewers.contains(&ReviewerKind::Ai);
        if needs_azure {
            required.extend([
                "AZURE_OPENAI_ENDPOINT",
                "AZURE_OPENAI_KEY",
                "AZURE_OPENAI_DEPLOYMENT",
            ]);
        }

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let github_token = get("GITHUB_TOKEN").unwrap_or_default();

        let azure = if needs_azure {
            Some(AzureConfig {
                endpoint: get("AZURE_OPENAI_ENDPOINT")
                    .unwrap_or_default()
                    .trim_end_matches('/')
                    .to_string(),
                api_key: get("AZURE_OPENAI_KEY").unwrap_or_default(),
                deployment: get("AZURE_OPENAI_DEPLOYMENT").unwrap_or_default(),
                api_version: get("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            })
        } else {
            None
        };

        let ollama = OllamaConfig {
            host: get("OLLAMA_HOST")
                .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
        };

        let exclude_patterns =
            split_list(&get("INPUT_EXCLUDE").unwrap_or_else(|| DEFAULT_EXCLUDE.to_string()));
        let exclude = ExcludeFilter::new(&exclude_patterns)?;

        let github_api_url = get("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let concurrency_limit = get("REVIEW_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(4);

        let request_timeout_secs = get("AI_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let max_diff_tokens = get("MAX_DIFF_TOKENS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(6_000);

        Ok(Self {
            github_token,
            github_api_url,
            backend,
            azure,
            ollama,
            exclude,
            enabled_reviewers,
            concurrency_limit,
            request_timeout_secs,
            max_diff_tokens,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub concurrency_limit: usize,
    pub dry_run: bool,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            concurrency_limit: config.concurrency_limit,
            dry_run: false,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_reviewers(value: &str) -> Vec<ReviewerKind> {
    let mut reviewers = Vec::new();
    for name in split_list(value) {
        match name.parse::<ReviewerKind>() {
            Ok(kind) if !reviewers.contains(&kind) => reviewers.push(kind),
            Ok(_) => {}
            Err(_) => tracing::warn!("Unknown reviewer type '{}', ignoring", name),
        }
    }
    reviewers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn azure_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GITHUB_TOKEN", "ghp_test"),
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/"),
            ("AZURE_OPENAI_KEY", "key"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&azure_vars())).unwrap();
        assert_eq!(config.enabled_reviewers, vec![ReviewerKind::Ai]);
        assert_eq!(config.exclude.patterns(), vec!["*.md", "*.txt", "*.json"]);
        assert_eq!(config.backend, AiBackend::Azure);

        let azure = config.azure.unwrap();
        assert_eq!(azure.endpoint, "https://example.openai.azure.com");
        assert_eq!(azure.api_version, DEFAULT_AZURE_API_VERSION);
        assert_eq!(config.github_api_url, DEFAULT_GITHUB_API_URL);
    }

    #[test]
    fn test_defaults_match_explicit_values() {
        let implicit = Config::from_lookup(lookup(&azure_vars())).unwrap();

        let mut vars = azure_vars();
        vars.push(("INPUT_EXCLUDE", "*.md,*.txt,*.json"));
        vars.push(("INPUT_ENABLED_REVIEWERS", "ai"));
        let explicit = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(implicit.enabled_reviewers, explicit.enabled_reviewers);
        assert_eq!(implicit.exclude.patterns(), explicit.exclude.patterns());
    }

    #[test]
    fn test_blank_inputs_fall_back_to_defaults() {
        let mut vars = azure_vars();
        vars.push(("INPUT_EXCLUDE", "  "));
        vars.push(("INPUT_ENABLED_REVIEWERS", ""));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.enabled_reviewers, vec![ReviewerKind::Ai]);
        assert_eq!(config.exclude.patterns().len(), 3);
    }

    #[test]
    fn test_missing_required_values_reported_together() {
        let err = Config::from_lookup(lookup(&[("AZURE_OPENAI_KEY", "key")]))
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(matches!(err, Error::Config(_)));
        assert!(message.contains("GITHUB_TOKEN"));
        assert!(message.contains("AZURE_OPENAI_ENDPOINT"));
        assert!(message.contains("AZURE_OPENAI_DEPLOYMENT"));
        assert!(!message.contains("AZURE_OPENAI_KEY"));
    }

    #[test]
    fn test_empty_required_value_is_missing() {
        let mut vars = azure_vars();
        vars.retain(|(k, _)| *k != "AZURE_OPENAI_KEY");
        vars.push(("AZURE_OPENAI_KEY", "   "));
        let err = Config::from_lookup(lookup(&vars)).err().unwrap();
        assert!(err.to_string().contains("AZURE_OPENAI_KEY"));
    }

    #[test]
    fn test_azure_not_required_without_ai_reviewer() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "ghp_test"),
            ("INPUT_ENABLED_REVIEWERS", "security, copyright"),
        ]))
        .unwrap();
        assert!(config.azure.is_none());
        assert_eq!(
            config.enabled_reviewers,
            vec![ReviewerKind::Security, ReviewerKind::Copyright]
        );
    }

    #[test]
    fn test_ollama_backend_skips_azure_requirements() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "ghp_test"),
            ("AI_BACKEND", "Ollama"),
            ("OLLAMA_HOST", "http://ollama:11434/"),
        ]))
        .unwrap();
        assert_eq!(config.backend, AiBackend::Ollama);
        assert!(config.azure.is_none());
        assert_eq!(config.ollama.host, "http://ollama:11434");
        assert_eq!(config.ollama.model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_reviewer_list_dedupes_and_ignores_unknown() {
        let mut vars = azure_vars();
        vars.push(("INPUT_ENABLED_REVIEWERS", "AI, lint, ai,,security"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.enabled_reviewers,
            vec![ReviewerKind::Ai, ReviewerKind::Security]
        );
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let mut vars = azure_vars();
        vars.push(("INPUT_EXCLUDE", "src/[.rs"));
        let err = Config::from_lookup(lookup(&vars)).err().unwrap();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let mut vars = azure_vars();
        vars.push(("AI_BACKEND", "bedrock"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
