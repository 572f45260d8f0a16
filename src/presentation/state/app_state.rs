use std::sync::Arc;

use crate::application::ports::{StagingStore, TranscriptionEngine};
use crate::application::services::TranscriptionService;
use crate::presentation::config::Settings;

pub struct AppState<E, S>
where
    E: TranscriptionEngine,
    S: StagingStore,
{
    pub transcription_service: Arc<TranscriptionService<E, S>>,
    pub settings: Settings,
}

impl<E, S> Clone for AppState<E, S>
where
    E: TranscriptionEngine,
    S: StagingStore,
{
    fn clone(&self) -> Self {
        Self {
            transcription_service: Arc::clone(&self.transcription_service),
            settings: self.settings.clone(),
        }
    }
}
