use async_trait::async_trait;
use futures::stream;

use super::{task_message, ConversationEngine, EventStream};
use crate::errors::{EngineError, EngineResult};
use crate::models::event::Event;

/// An engine that returns pre-configured events for testing
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    events: Vec<Event>,
    failure: Option<(usize, String)>,
}

impl MockEngine {
    pub fn new(events: Vec<Event>) -> Self {
        MockEngine {
            events,
            failure: None,
        }
    }

    /// Fail with an upstream error after `count` of the configured events.
    pub fn failing_after<S: Into<String>>(mut self, count: usize, message: S) -> Self {
        self.failure = Some((count, message.into()));
        self
    }
}

#[async_trait]
impl ConversationEngine for MockEngine {
    async fn run_stream(&self, task: &str) -> EngineResult<EventStream> {
        let mut items: Vec<EngineResult<Event>> = vec![Ok(task_message(task))];
        match &self.failure {
            Some((count, message)) => {
                items.extend(self.events.iter().take(*count).cloned().map(Ok));
                items.push(Err(EngineError::Upstream(message.clone())));
            }
            None => items.extend(self.events.iter().cloned().map(Ok)),
        }
        Ok(Box::pin(stream::iter(items)))
    }
}
