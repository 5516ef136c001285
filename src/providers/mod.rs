pub mod bedrock;
pub mod gemini;
pub mod prompt;
pub mod traits;

use crate::{
    config::{FusionConfig, ProviderKind},
    error::{FusionError, Result},
};
use std::sync::Arc;
use std::time::Duration;

pub use bedrock::BedrockFusionClient;
pub use gemini::GeminiFusionClient;
pub use traits::GenerationService;

/// Builds the backend named by `config.provider`.
pub async fn build_service(config: &FusionConfig) -> Result<Arc<dyn GenerationService>> {
    let service: Arc<dyn GenerationService> = match config.provider {
        ProviderKind::Bedrock => {
            let bedrock_config = config.bedrock.clone().ok_or_else(|| {
                FusionError::ConfigError("Bedrock config required".into())
            })?;
            Arc::new(BedrockFusionClient::new(bedrock_config).await?)
        }
        ProviderKind::Gemini => {
            let gemini_config = config.gemini.clone().ok_or_else(|| {
                FusionError::ConfigError("Gemini config required".into())
            })?;
            Arc::new(GeminiFusionClient::new(
                gemini_config,
                Duration::from_secs(config.request_timeout_secs),
            )?)
        }
    };

    log::info!("Using {} generation service", service.name());
    Ok(service)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::GenerationService;
    use crate::{
        error::{FusionError, Result},
        models::EncodedImage,
        options::GenerationOptions,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub image1: EncodedImage,
        pub image2: EncodedImage,
        pub options: GenerationOptions,
    }

    /// In-memory service that records calls and replays scripted outcomes.
    /// When gated, each call waits for a permit released with [`open`](Self::open).
    pub struct MockService {
        calls: Mutex<Vec<RecordedCall>>,
        outcomes: Mutex<Vec<Result<EncodedImage>>>,
        gate: Option<Arc<Semaphore>>,
    }

    impl MockService {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                outcomes: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        pub fn gated() -> Self {
            Self {
                gate: Some(Arc::new(Semaphore::new(0))),
                ..Self::new()
            }
        }

        pub fn then_succeed(self, artifact: EncodedImage) -> Self {
            self.outcomes.lock().unwrap().push(Ok(artifact));
            self
        }

        pub fn then_fail(self, error: FusionError) -> Self {
            self.outcomes.lock().unwrap().push(Err(error));
            self
        }

        pub fn open(&self) {
            if let Some(gate) = &self.gate {
                gate.add_permits(1);
            }
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationService for MockService {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(
            &self,
            image1: &EncodedImage,
            image2: &EncodedImage,
            options: &GenerationOptions,
        ) -> Result<EncodedImage> {
            self.calls.lock().unwrap().push(RecordedCall {
                image1: image1.clone(),
                image2: image2.clone(),
                options: options.clone(),
            });

            if let Some(gate) = &self.gate {
                gate.acquire()
                    .await
                    .expect("gate closed")
                    .forget();
            }

            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                return Err(FusionError::ResponseError("no scripted outcome".into()));
            }
            outcomes.remove(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeminiConfig;

    #[tokio::test]
    async fn test_missing_section_is_config_error() {
        let config = FusionConfig::new().with_provider(ProviderKind::Gemini);
        assert!(matches!(
            build_service(&config).await,
            Err(FusionError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_builds_gemini_backend() {
        let config = FusionConfig::new().with_gemini(GeminiConfig::new().with_api_key("test-key"));
        let service = build_service(&config).await.unwrap();
        assert_eq!(service.name(), "gemini");
    }
}
