//! The seam between the renderers and whatever produces conversation events.
//!
//! The multi-agent runtime itself lives outside this crate. [`replay::ReplayEngine`] plays back
//! a recorded transcript, and [`mock::MockEngine`] yields a fixed list for tests.
pub mod mock;
pub mod replay;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::EngineResult;
use crate::models::event::{Event, USER_SOURCE};

pub type EventStream = BoxStream<'static, EngineResult<Event>>;

#[async_trait]
pub trait ConversationEngine: Send + Sync {
    /// Start a conversation on `task` and stream its events in arrival order.
    async fn run_stream(&self, task: &str) -> EngineResult<EventStream>;
}

/// The runtime echoes the task back as the first event of every run.
pub(crate) fn task_message(task: &str) -> Event {
    Event::message(USER_SOURCE, task)
}
