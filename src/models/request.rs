use crate::{models::image::EncodedImage, options::GenerationOptions};
use serde::Serialize;

/// Immutable snapshot of one generation attempt, built fresh each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    #[serde(flatten)]
    options: GenerationOptions,
    image1: EncodedImage,
    image2: EncodedImage,
}

impl RequestDescriptor {
    pub fn new(options: GenerationOptions, image1: EncodedImage, image2: EncodedImage) -> Self {
        Self {
            options,
            image1,
            image2,
        }
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn image1(&self) -> &EncodedImage {
        &self.image1
    }

    pub fn image2(&self) -> &EncodedImage {
        &self.image2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{compose, ArtStyle, DressStyle, Mode, Scene};

    #[test]
    fn test_descriptor_serializes_flat() {
        let image = EncodedImage::from_base64("image/png", "AAAA").unwrap();
        let descriptor = RequestDescriptor::new(
            compose(
                Mode::Artistic,
                Scene::BeachSunset,
                ArtStyle::Watercolor,
                DressStyle::VintageClassic,
            ),
            image.clone(),
            image,
        );

        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["mode"], "artistic");
        assert_eq!(value["selection"], "Watercolor");
        assert_eq!(value["dressStyle"], "Vintage Classic");
        assert_eq!(value["image1"], "data:image/png;base64,AAAA");
    }
}
