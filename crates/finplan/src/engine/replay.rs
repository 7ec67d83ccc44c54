use std::path::PathBuf;
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::{task_message, ConversationEngine, EventStream};
use crate::errors::{EngineError, EngineResult};
use crate::models::event::Event;

/// Plays back a recorded conversation.
///
/// The transcript is JSON Lines: one wire-form event per line, blank lines ignored.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    path: PathBuf,
    delay: Duration,
}

impl ReplayEngine {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ReplayEngine {
            path: path.into(),
            delay: Duration::ZERO,
        }
    }

    /// Pause between recorded events, to pace playback like a live run.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ConversationEngine for ReplayEngine {
    async fn run_stream(&self, task: &str) -> EngineResult<EventStream> {
        let transcript =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| EngineError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        info!("Replaying transcript {}", self.path.display());

        let delay = self.delay;
        let first = task_message(task);
        Ok(Box::pin(stream! {
            yield Ok(first);
            for (index, line) in transcript.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let value = match serde_json::from_str::<Value>(line) {
                    Ok(value) => value,
                    Err(source) => {
                        yield Err(EngineError::Transcript { line: index + 1, source });
                        return;
                    }
                };
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(Event::from_value(value));
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventKind;
    use futures::StreamExt;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn transcript(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_replay_yields_task_then_recorded_events() {
        let file = transcript(&[
            r#"{"type": "TextMessage", "source": "advisor", "content": "Hello"}"#,
            "",
            r#"{"type": "Mystery", "source": "advisor"}"#,
        ]);
        let engine = ReplayEngine::new(file.path());
        let events: Vec<_> = engine.run_stream("VOO?").await.unwrap().collect().await;

        assert_eq!(events.len(), 3);
        assert!(events[0].as_ref().unwrap().is_from_user());
        assert_eq!(events[1].as_ref().unwrap().kind(), EventKind::Message);
        assert_eq!(events[2].as_ref().unwrap().kind(), EventKind::Unknown);
    }

    #[tokio::test]
    async fn test_replay_reports_bad_line_and_stops() {
        let file = transcript(&[
            r#"{"type": "TextMessage", "source": "advisor", "content": "Hello"}"#,
            "{not json",
            r#"{"type": "TextMessage", "source": "advisor", "content": "never"}"#,
        ]);
        let engine = ReplayEngine::new(file.path());
        let events: Vec<_> = engine.run_stream("VOO?").await.unwrap().collect().await;

        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], Err(EngineError::Transcript { line: 2, .. })));
    }

    #[tokio::test]
    async fn test_replay_missing_file() {
        let engine = ReplayEngine::new("/nonexistent/transcript.jsonl");
        let result = engine.run_stream("VOO?").await;
        assert!(matches!(result, Err(EngineError::Io { .. })));
    }
}
