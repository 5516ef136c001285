pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod options;
pub mod orchestrator;
pub mod providers;

pub use config::{BedrockConfig, FusionConfig, GeminiConfig, ProviderKind};
pub use error::{FusionError, GenerationError, Result};
pub use models::{EncodedImage, ImageSlots, RequestDescriptor, Slot};
pub use options::{compose, ArtStyle, DressStyle, GenerationOptions, Mode, OptionSelections, Scene};
pub use orchestrator::{FusionSession, GenerationOrchestrator, GenerationState};
pub use providers::{build_service, BedrockFusionClient, GeminiFusionClient, GenerationService};
