use crate::{error::Result, models::EncodedImage, options::GenerationOptions};
use async_trait::async_trait;

/// An external capability that fuses two portraits into one picture.
///
/// Implementations must return an error rather than a partial or degraded
/// image when anything goes wrong.
#[async_trait]
pub trait GenerationService: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        image1: &EncodedImage,
        image2: &EncodedImage,
        options: &GenerationOptions,
    ) -> Result<EncodedImage>;
}
