use crate::options::{GenerationOptions, Mode};

/// Builds the instruction sent alongside the two portraits.
pub fn build_prompt(options: &GenerationOptions) -> String {
    let setting = match options.mode {
        Mode::Realistic => format!(
            "Create a single photorealistic picture of the two people from the provided \
             photos together as a couple, set in a {} scene.",
            options.selection
        ),
        Mode::Artistic => format!(
            "Create a single picture of the two people from the provided photos together \
             as a couple, rendered in a {} art style.",
            options.selection
        ),
    };

    format!(
        "{} Both people are dressed in {} attire. Keep each person's facial features \
         recognisable and make the pose look natural and affectionate. The first photo \
         is the first person, the second photo is the second person.",
        setting, options.dress_style
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{compose, ArtStyle, DressStyle, Scene};

    #[test]
    fn test_realistic_prompt_mentions_scene() {
        let options = compose(
            Mode::Realistic,
            Scene::BeachSunset,
            ArtStyle::Anime,
            DressStyle::CasualWear,
        );
        let prompt = build_prompt(&options);
        assert!(prompt.contains("photorealistic"));
        assert!(prompt.contains("Beach Sunset scene"));
        assert!(prompt.contains("Casual Wear"));
        assert!(!prompt.contains("Anime"));
    }

    #[test]
    fn test_artistic_prompt_mentions_style() {
        let options = compose(
            Mode::Artistic,
            Scene::BeachSunset,
            ArtStyle::Anime,
            DressStyle::WesternWedding,
        );
        let prompt = build_prompt(&options);
        assert!(prompt.contains("Anime art style"));
        assert!(prompt.contains("Western Wedding"));
        assert!(!prompt.contains("Beach Sunset"));
    }
}
