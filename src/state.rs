use crate::backend::Backend;
use crate::tracker::PendingSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub pending: PendingSet,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, secure_cookies: bool) -> Self {
        Self {
            backend,
            pending: PendingSet::default(),
            secure_cookies,
        }
    }
}
