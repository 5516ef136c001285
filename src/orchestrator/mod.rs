//! Single in-flight generation state machine.
//!
//! Transitions always run `Idle -> Pending -> Succeeded | Failed`, and a
//! finished attempt may re-enter `Pending` through another
//! [`GenerationOrchestrator::request_generation`] call. An attempt whose
//! future is dropped, or whose service panics, ends in `Failed`.

pub mod session;

use crate::{
    error::GenerationError,
    logger,
    models::{EncodedImage, ImageSlots, RequestDescriptor},
    options::OptionSelections,
    providers::GenerationService,
};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

pub use session::FusionSession;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Pending,
    Succeeded(EncodedImage),
    Failed(GenerationError),
}

impl GenerationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, GenerationState::Pending)
    }

    pub fn artifact(&self) -> Option<&EncodedImage> {
        match self {
            GenerationState::Succeeded(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<GenerationError> {
        match self {
            GenerationState::Failed(error) => Some(*error),
            _ => None,
        }
    }
}

// Each attempt produces two transitions, so a subscriber that drains between
// attempts never lags.
const TRANSITION_CAPACITY: usize = 16;

pub struct GenerationOrchestrator {
    service: Arc<dyn GenerationService>,
    state: watch::Sender<GenerationState>,
    transitions: broadcast::Sender<GenerationState>,
}

impl GenerationOrchestrator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        let (state, _) = watch::channel(GenerationState::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        Self {
            service,
            state,
            transitions,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    /// Receives every transition made after subscribing, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationState> {
        self.transitions.subscribe()
    }

    /// Tracks the latest state only; intermediate states may be skipped.
    pub fn watch_state(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    fn announce(&self, state: GenerationState) {
        // Err only means nobody is subscribed
        if self.transitions.send(state).is_err() {
            log::trace!("No transition subscribers");
        }
    }

    fn settle(&self, state: GenerationState) {
        self.state.send_replace(state.clone());
        self.announce(state);
    }

    /// Runs one generation attempt.
    ///
    /// Fails with `MissingInput` when a slot is empty and `AlreadyInProgress`
    /// while another attempt is pending; both leave the state untouched and
    /// never reach the service. Any service failure ends in
    /// `Failed(GenerationFailed)`.
    pub async fn request_generation(
        &self,
        images: &ImageSlots,
        selections: &OptionSelections,
    ) -> Result<EncodedImage, GenerationError> {
        let Some((image1, image2)) = images.pair() else {
            log::warn!("Generation requested with an empty image slot");
            return Err(GenerationError::MissingInput);
        };

        // Check-and-enter is a single step on the channel, so two callers
        // cannot both observe a non-pending state.
        let entered = self.state.send_if_modified(|state| {
            if state.is_pending() {
                false
            } else {
                *state = GenerationState::Pending;
                true
            }
        });
        if !entered {
            log::warn!("Generation requested while another attempt is pending");
            return Err(GenerationError::AlreadyInProgress);
        }
        self.announce(GenerationState::Pending);

        let attempt = InFlight::new(self);
        let request = RequestDescriptor::new(selections.compose(), image1.clone(), image2.clone());
        log::info!(
            "Attempt {} started: mode={} selection={} dress_style={}",
            attempt.id,
            request.options().mode,
            request.options().selection,
            request.options().dress_style
        );

        let outcome = {
            let _timer = logger::timer(&format!("Attempt {}", attempt.id));
            self.service
                .generate(request.image1(), request.image2(), request.options())
                .await
        };

        match outcome {
            Ok(artifact) => {
                log::info!("Attempt {} succeeded: {:?}", attempt.id, artifact);
                attempt.finish(GenerationState::Succeeded(artifact.clone()));
                Ok(artifact)
            }
            Err(e) => {
                log::error!(
                    "Attempt {} failed on {}: {}",
                    attempt.id,
                    self.service.name(),
                    e
                );
                attempt.finish(GenerationState::Failed(GenerationError::GenerationFailed));
                Err(GenerationError::GenerationFailed)
            }
        }
    }
}

/// The pending attempt. Dropping it unfinished (the caller dropped the
/// future, or the service panicked) settles the state as `Failed`.
struct InFlight<'a> {
    orchestrator: &'a GenerationOrchestrator,
    id: Uuid,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(orchestrator: &'a GenerationOrchestrator) -> Self {
        Self {
            orchestrator,
            id: Uuid::new_v4(),
            finished: false,
        }
    }

    fn finish(mut self, state: GenerationState) {
        self.finished = true;
        self.orchestrator.settle(state);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::warn!("Attempt {} abandoned before the service answered", self.id);
            self.orchestrator
                .settle(GenerationState::Failed(GenerationError::GenerationFailed));
        }
    }
}
