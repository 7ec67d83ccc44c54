use std::sync::Arc;

use finplan::engine::ConversationEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn ConversationEngine>,
}

impl AppState {
    pub fn new(engine: Arc<dyn ConversationEngine>) -> Self {
        AppState { engine }
    }
}
