use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use finplan::engine::replay::ReplayEngine;
use finplan::engine::{ConversationEngine, EventStream};
use finplan::models::event::EventKind;
use finplan::render::html::error_fragment;
use finplan::render::Renderer;
use finplan::request::PlanningRequest;
use futures::StreamExt;
use tracing::error;

use crate::display::{self, Theme};
use crate::OutputFormat;

pub struct ReplayArgs {
    pub transcript: PathBuf,
    pub query: String,
    pub format: OutputFormat,
    pub delay_ms: u64,
    pub theme: Theme,
}

pub async fn execute(args: ReplayArgs) -> Result<()> {
    let request = PlanningRequest::new(args.query);
    request.validate()?;

    let engine =
        ReplayEngine::new(&args.transcript).with_delay(Duration::from_millis(args.delay_ms));
    let events = engine
        .run_stream(&request.enhanced_query())
        .await
        .with_context(|| format!("Failed to start replay of {}", args.transcript.display()))?;

    match args.format {
        OutputFormat::Console => print_console(events, args.theme).await,
        OutputFormat::Html => write_html(events, &mut io::stdout()).await.map(|_| ()),
    }
}

async fn print_console(mut events: EventStream, theme: Theme) -> Result<()> {
    cliclack::intro(console::style(" finplan ").on_cyan().black())?;

    let mut renderer = Renderer::console();
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                if let Some(panel) = renderer.render(&event) {
                    display::print_panel(&panel, theme);
                }
                if event.kind() == EventKind::TaskResult {
                    break;
                }
            }
            Err(e) => {
                error!("Conversation failed: {}", e);
                display::print_error(&e.to_string());
                break;
            }
        }
    }

    cliclack::outro("Done")?;
    Ok(())
}

/// Write one markup fragment per rendered event, flushing after each. Returns the fragment count.
async fn write_html<W: Write>(mut events: EventStream, out: &mut W) -> Result<usize> {
    let mut renderer = Renderer::html();
    let mut written = 0;
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                if let Some(fragment) = renderer.render(&event) {
                    out.write_all(fragment.as_bytes())?;
                    out.flush()?;
                    written += 1;
                }
                if event.kind() == EventKind::TaskResult {
                    break;
                }
            }
            Err(e) => {
                error!("Conversation failed: {}", e);
                out.write_all(error_fragment(&e.to_string()).as_bytes())?;
                out.flush()?;
                written += 1;
                break;
            }
        }
    }
    Ok(written)
}
