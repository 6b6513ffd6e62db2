use std::sync::Arc;

use crate::backend::ExamBackend;
use crate::core::config::Settings;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    backend: Arc<dyn ExamBackend>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, backend: Arc<dyn ExamBackend>) -> Self {
        Self { inner: Arc::new(InnerState { settings, backend }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn backend(&self) -> &Arc<dyn ExamBackend> {
        &self.inner.backend
    }
}
