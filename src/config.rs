use crate::error::{FusionError, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Bedrock,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Bedrock => "bedrock",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bedrock" | "aws" => Ok(ProviderKind::Bedrock),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(FusionError::ConfigError(format!(
                "unknown provider '{}', expected bedrock or gemini",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub model_id: Option<String>,
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        BedrockConfig {
            region: non_empty_env("AWS_REGION").or_else(|| non_empty_env("AWS_DEFAULT_REGION")),
            access_key: non_empty_env("AWS_ACCESS_KEY_ID"),
            secret_key: non_empty_env("AWS_SECRET_ACCESS_KEY"),
            model_id: non_empty_env("BEDROCK_IMAGE_MODEL"),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        GeminiConfig {
            api_key: non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY")),
            api_base: non_empty_env("GEMINI_API_BASE"),
            model: non_empty_env("GEMINI_MODEL"),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FusionConfig {
    pub provider: ProviderKind,
    pub bedrock: Option<BedrockConfig>,
    pub gemini: Option<GeminiConfig>,
    pub request_timeout_secs: u64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            provider: ProviderKind::default(),
            bedrock: None,
            gemini: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl FusionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let provider = match non_empty_env("FUSION_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderKind::default(),
        };
        let request_timeout_secs = parse_timeout(non_empty_env("FUSION_REQUEST_TIMEOUT_SECS"))?;

        Ok(FusionConfig {
            provider,
            bedrock: Some(BedrockConfig::from_env()),
            gemini: Some(GeminiConfig::from_env()),
            request_timeout_secs,
        })
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = Some(config);
        self.provider = ProviderKind::Bedrock;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self.provider = ProviderKind::Gemini;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

fn parse_timeout(value: Option<String>) -> Result<u64> {
    match value {
        Some(value) => value.parse().map_err(|_| {
            FusionError::ConfigError(format!(
                "FUSION_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                value
            ))
        }),
        None => Ok(DEFAULT_REQUEST_TIMEOUT_SECS),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("aws".parse::<ProviderKind>().unwrap(), ProviderKind::Bedrock);
        assert!(matches!(
            "openai".parse::<ProviderKind>(),
            Err(FusionError::ConfigError(_))
        ));
    }

    #[test]
    fn test_builders_select_provider() {
        let config = FusionConfig::new()
            .with_bedrock(BedrockConfig::new().with_region("eu-west-1"))
            .with_gemini(GeminiConfig::new().with_api_key("key"))
            .with_request_timeout(30);

        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(
            config.bedrock.and_then(|b| b.region).as_deref(),
            Some("eu-west-1")
        );
    }

    #[test]
    fn test_defaults() {
        let config = FusionConfig::default();
        assert_eq!(config.provider, ProviderKind::Bedrock);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(config.gemini.is_none());
    }

    #[test]
    fn test_request_timeout_parsing() {
        assert_eq!(parse_timeout(None).unwrap(), DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(parse_timeout(Some("45".into())).unwrap(), 45);
        for bad in ["2m", "-5", "1.5"] {
            assert!(matches!(
                parse_timeout(Some(bad.into())),
                Err(FusionError::ConfigError(_))
            ));
        }
    }
}
