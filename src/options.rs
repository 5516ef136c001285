use crate::error::{FusionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed list of named choices. The first variant is the default.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $first:ident => $first_label:literal $(, $variant:ident => $label:literal)* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            #[serde(rename = $first_label)]
            $first,
            $(
                #[serde(rename = $label)]
                $variant,
            )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$name::$first $(, $name::$variant)*];

            pub fn label(&self) -> &'static str {
                match self {
                    $name::$first => $first_label,
                    $($name::$variant => $label,)*
                }
            }

            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|choice| choice.label()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = FusionError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| {
                        choice.label().eq_ignore_ascii_case(wanted)
                            || kebab(choice.label()) == wanted.to_ascii_lowercase()
                    })
                    .ok_or_else(|| {
                        FusionError::InvalidOption(format!(
                            "unknown {} '{}', expected one of: {}",
                            $kind,
                            wanted,
                            Self::labels().join(", ")
                        ))
                    })
            }
        }
    };
}

fn kebab(label: &str) -> String {
    label.to_ascii_lowercase().replace(' ', "-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Realistic,
    Artistic,
}

impl Mode {
    pub const ALL: &'static [Mode] = &[Mode::Realistic, Mode::Artistic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Realistic => "realistic",
            Mode::Artistic => "artistic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Realistic => "Realistic Scene",
            Mode::Artistic => "Artistic Style",
        }
    }

    /// Prompt shown above the mode-dependent selector.
    pub fn selection_prompt(&self) -> &'static str {
        match self {
            Mode::Realistic => "Choose a Scene:",
            Mode::Artistic => "Choose a Style:",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realistic" | "realistic scene" => Ok(Mode::Realistic),
            "artistic" | "artistic style" => Ok(Mode::Artistic),
            other => Err(FusionError::InvalidOption(format!(
                "unknown mode '{}', expected realistic or artistic",
                other
            ))),
        }
    }
}

choice_enum!(
    /// Environment used when composing in realistic mode.
    Scene, "scene" {
        CozyCafe => "Cozy Cafe",
        AutumnParkWalk => "Autumn Park Walk",
        BeachSunset => "Beach Sunset",
        MountainHike => "Mountain Hike",
        CityNightscape => "City Nightscape",
        TropicalParadise => "Tropical Paradise",
    }
);

choice_enum!(
    /// Art style used when composing in artistic mode.
    ArtStyle, "style" {
        OilPainting => "Oil Painting",
        Watercolor => "Watercolor",
        Cartoon => "Cartoon",
        Anime => "Anime",
        PopArt => "Pop Art",
        Cyberpunk => "Cyberpunk",
    }
);

choice_enum!(
    /// Attire applied in either mode.
    DressStyle, "dress style" {
        CasualWear => "Casual Wear",
        FormalAttire => "Formal Attire",
        BengaliTraditional => "Bengali Traditional",
        SouthIndianTraditional => "South Indian Traditional",
        RajasthaniTraditional => "Rajasthani Traditional",
        WesternWedding => "Western Wedding",
        VintageClassic => "Vintage Classic",
    }
);

/// The non-image half of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub mode: Mode,
    pub selection: String,
    pub dress_style: String,
}

/// Projects the current choices onto request options. `selection` comes from
/// `scene` in realistic mode and from `style` in artistic mode, never both.
pub fn compose(
    mode: Mode,
    scene: Scene,
    style: ArtStyle,
    dress_style: DressStyle,
) -> GenerationOptions {
    let selection = match mode {
        Mode::Realistic => scene.label(),
        Mode::Artistic => style.label(),
    };

    GenerationOptions {
        mode,
        selection: selection.to_string(),
        dress_style: dress_style.label().to_string(),
    }
}

/// Current user choices. Each mode keeps its own selection, so switching
/// back and forth never loses what was picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSelections {
    pub mode: Mode,
    pub scene: Scene,
    pub style: ArtStyle,
    pub dress_style: DressStyle,
}

impl OptionSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_style(mut self, style: ArtStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_dress_style(mut self, dress_style: DressStyle) -> Self {
        self.dress_style = dress_style;
        self
    }

    /// Labels for the selector that follows the active mode.
    pub fn active_choices(&self) -> Vec<&'static str> {
        match self.mode {
            Mode::Realistic => Scene::labels(),
            Mode::Artistic => ArtStyle::labels(),
        }
    }

    pub fn active_selection(&self) -> &'static str {
        match self.mode {
            Mode::Realistic => self.scene.label(),
            Mode::Artistic => self.style.label(),
        }
    }

    /// Sets the scene or the style, depending on the active mode.
    pub fn select_active(&mut self, label: &str) -> Result<()> {
        match self.mode {
            Mode::Realistic => self.scene = label.parse()?,
            Mode::Artistic => self.style = label.parse()?,
        }
        Ok(())
    }

    pub fn compose(&self) -> GenerationOptions {
        compose(self.mode, self.scene, self.style, self.dress_style)
    }
}
