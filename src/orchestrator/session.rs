use crate::{
    error::{GenerationError, Result},
    models::{EncodedImage, ImageSlots, Slot},
    options::{ArtStyle, DressStyle, Mode, OptionSelections, Scene},
    orchestrator::{GenerationOrchestrator, GenerationState},
    providers::GenerationService,
};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Everything one user session owns: the two input slots, the option
/// choices and the orchestrator. Dropping the session is the only reset.
pub struct FusionSession {
    images: ImageSlots,
    selections: OptionSelections,
    orchestrator: GenerationOrchestrator,
}

impl FusionSession {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            images: ImageSlots::new(),
            selections: OptionSelections::default(),
            orchestrator: GenerationOrchestrator::new(service),
        }
    }

    pub fn set_image(&mut self, slot: Slot, image: EncodedImage) {
        self.images.set(slot, image);
    }

    pub fn image(&self, slot: Slot) -> Option<&EncodedImage> {
        self.images.get(slot)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.selections.mode = mode;
    }

    pub fn select_scene(&mut self, scene: Scene) {
        self.selections.scene = scene;
    }

    pub fn select_style(&mut self, style: ArtStyle) {
        self.selections.style = style;
    }

    pub fn select_dress_style(&mut self, dress_style: DressStyle) {
        self.selections.dress_style = dress_style;
    }

    pub fn select_active(&mut self, label: &str) -> Result<()> {
        self.selections.select_active(label)
    }

    pub fn selections(&self) -> &OptionSelections {
        &self.selections
    }

    /// Whether the generate trigger should be enabled.
    pub fn can_generate(&self) -> bool {
        self.images.is_complete() && !self.orchestrator.is_pending()
    }

    pub async fn generate(&self) -> std::result::Result<EncodedImage, GenerationError> {
        self.orchestrator
            .request_generation(&self.images, &self.selections)
            .await
    }

    pub fn state(&self) -> GenerationState {
        self.orchestrator.state()
    }

    /// Every transition made after subscribing, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationState> {
        self.orchestrator.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<GenerationState> {
        self.orchestrator.watch_state()
    }
}
