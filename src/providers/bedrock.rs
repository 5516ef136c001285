use crate::{
    config::BedrockConfig,
    error::{FusionError, Result},
    models::EncodedImage,
    options::GenerationOptions,
    providers::{prompt::build_prompt, GenerationService},
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_BEDROCK_IMAGE_MODEL: &str = "amazon.titan-image-generator-v2:0";

#[derive(Deserialize)]
struct TitanImageResponse {
    #[serde(default)]
    images: Vec<String>,
    error: Option<String>,
}

/// Fusion through Titan Image Generator's image variation task, with both
/// portraits passed as reference images.
#[derive(Clone)]
pub struct BedrockFusionClient {
    client: Client,
    model_id: String,
}

impl BedrockFusionClient {
    pub async fn new(config: BedrockConfig) -> Result<Self> {
        let region = aws_sdk_bedrockruntime::config::Region::new(
            config.region.unwrap_or_else(|| "us-east-1".to_string()),
        );

        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key, &config.secret_key)
        {
            aws_config::defaults(BehaviorVersion::latest())
                .credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "fusionai",
                ))
                .region(region)
                .load()
                .await
        } else {
            aws_config::defaults(BehaviorVersion::latest())
                .region(region)
                .load()
                .await
        };

        Ok(Self::with_client(
            Client::new(&aws_config),
            config
                .model_id
                .unwrap_or_else(|| DEFAULT_BEDROCK_IMAGE_MODEL.to_string()),
        ))
    }

    pub fn with_client(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn build_payload(
    image1: &EncodedImage,
    image2: &EncodedImage,
    options: &GenerationOptions,
) -> Value {
    json!({
        "taskType": "IMAGE_VARIATION",
        "imageVariationParams": {
            "text": build_prompt(options),
            "images": [image1.base64_data(), image2.base64_data()],
            "similarityStrength": 0.7
        },
        "imageGenerationConfig": {
            "numberOfImages": 1,
            "width": 1024,
            "height": 1024,
            "quality": "standard",
            "cfgScale": 8.0
        }
    })
}

fn parse_response(body: Vec<u8>) -> Result<EncodedImage> {
    let body = String::from_utf8(body).map_err(|e| FusionError::ResponseError(e.to_string()))?;
    let titan: TitanImageResponse =
        serde_json::from_str(&body).map_err(|e| FusionError::ResponseError(e.to_string()))?;

    if let Some(error) = titan.error.filter(|e| !e.is_empty()) {
        return Err(FusionError::ResponseError(error));
    }

    let image = titan
        .images
        .into_iter()
        .next()
        .ok_or_else(|| FusionError::ResponseError("No images generated".into()))?;

    EncodedImage::from_base64("image/png", &image)
}

#[async_trait]
impl GenerationService for BedrockFusionClient {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn generate(
        &self,
        image1: &EncodedImage,
        image2: &EncodedImage,
        options: &GenerationOptions,
    ) -> Result<EncodedImage> {
        let request_json = serde_json::to_string(&build_payload(image1, image2, options))
            .map_err(|e| FusionError::SerializationError(e.to_string()))?;

        log::info!("Generating fusion image with model: {}", self.model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                log::error!("Bedrock image generation error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    FusionError::AwsServiceError(format!(
                        "{} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    FusionError::AwsError(e.to_string())
                }
            })?;

        parse_response(response.body.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{compose, ArtStyle, DressStyle, Mode, Scene};

    #[test]
    fn test_payload_carries_both_images() {
        let first = EncodedImage::from_base64("image/png", "Zmlyc3Q=").unwrap();
        let second = EncodedImage::from_base64("image/jpeg", "c2Vjb25k").unwrap();
        let options = compose(
            Mode::Realistic,
            Scene::MountainHike,
            ArtStyle::Cartoon,
            DressStyle::FormalAttire,
        );

        let payload = build_payload(&first, &second, &options);
        assert_eq!(payload["taskType"], "IMAGE_VARIATION");
        assert_eq!(
            payload["imageVariationParams"]["images"],
            json!(["Zmlyc3Q=", "c2Vjb25k"])
        );
        assert!(payload["imageVariationParams"]["text"]
            .as_str()
            .unwrap()
            .contains("Mountain Hike"));
        assert_eq!(payload["imageGenerationConfig"]["numberOfImages"], 1);
    }

    #[test]
    fn test_parse_response_takes_first_image() {
        let body = br#"{"images": ["AAAA", "BBBB"], "error": null}"#.to_vec();
        let image = parse_response(body).unwrap();
        assert_eq!(image.as_data_uri(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_parse_response_failures() {
        assert!(parse_response(br#"{"images": []}"#.to_vec()).is_err());
        assert!(parse_response(br#"{"images": ["AAAA"], "error": "blocked"}"#.to_vec()).is_err());
        assert!(parse_response(b"not json".to_vec()).is_err());
        assert!(parse_response(vec![0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_parse_response_rejects_corrupt_image() {
        let body = br#"{"images": ["!!not base64!!"], "error": null}"#.to_vec();
        assert!(matches!(
            parse_response(body),
            Err(FusionError::InvalidImage(_))
        ));
    }
}
