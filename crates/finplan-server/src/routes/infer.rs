use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use finplan::engine::EventStream;
use finplan::models::event::EventKind;
use finplan::render::html::error_fragment;
use finplan::render::Renderer;
use finplan::request::PlanningRequest;
use futures::{stream::StreamExt, Stream};
use serde::Deserialize;
use serde_json::Value;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;

// Form fields arrive as strings from the page; the income may also be sent as a number.
#[derive(Debug, Deserialize)]
struct InferRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    risk_tolerance: Option<String>,
    #[serde(default)]
    time_horizon: Option<String>,
    #[serde(default)]
    annual_gross_income: Option<Value>,
}

impl InferRequest {
    fn into_planning_request(self) -> Result<PlanningRequest, ApiError> {
        let annual_gross_income = match self.annual_gross_income {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.trim().parse::<f64>().map_err(|_| {
                ApiError::BadRequest("Invalid 'annual_gross_income' format.".to_string())
            })?),
            Some(_) => {
                return Err(ApiError::BadRequest(
                    "Invalid 'annual_gross_income' format.".to_string(),
                ))
            }
        };

        Ok(PlanningRequest {
            query: self.query,
            risk_tolerance: self.risk_tolerance.filter(|s| !s.trim().is_empty()),
            time_horizon: self.time_horizon.filter(|s| !s.trim().is_empty()),
            annual_gross_income,
        })
    }
}

/// Chunked `text/html` body, one chunk per rendered fragment
pub struct HtmlStream {
    rx: ReceiverStream<String>,
}

impl HtmlStream {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for HtmlStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for HtmlStream {
    fn into_response(self) -> Response {
        let body = axum::body::Body::from_stream(self);
        (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            body,
        )
            .into_response()
    }
}

/// Render every event of one run into `tx`, stopping at the task result.
async fn stream_fragments(mut events: EventStream, tx: mpsc::Sender<String>) {
    let mut renderer = Renderer::html();

    loop {
        match timeout(Duration::from_millis(500), events.next()).await {
            Ok(Some(Ok(event))) => {
                if let Some(fragment) = renderer.render(&event) {
                    if tx.send(fragment).await.is_err() {
                        tracing::info!("Client disconnected, ending run");
                        break;
                    }
                }
                if event.kind() == EventKind::TaskResult {
                    break;
                }
            }
            Ok(Some(Err(e))) => {
                tracing::error!("Error processing conversation: {}", e);
                let _ = tx.send(error_fragment(&e.to_string())).await;
                break;
            }
            Ok(None) => break,
            // Heartbeat, used to end the run once the client has gone away.
            Err(_) => {
                if tx.is_closed() {
                    tracing::info!("Client disconnected, ending run");
                    break;
                }
            }
        }
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<InferRequest>,
) -> Result<HtmlStream, ApiError> {
    let request = request.into_planning_request()?;
    request.validate()?;

    let events = state.engine.run_stream(&request.enhanced_query()).await?;

    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(stream_fragments(events, tx));

    Ok(HtmlStream::new(ReceiverStream::new(rx)))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/infer", post(handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use finplan::engine::mock::MockEngine;
    use finplan::engine::replay::ReplayEngine;
    use finplan::models::event::Event;
    use finplan::models::tool::{ToolCall, ToolResult};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(engine: MockEngine) -> Router {
        routes(AppState::new(Arc::new(engine)))
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .uri("/infer")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn conversation() -> Vec<Event> {
        vec![
            Event::tool_call_request(
                "web_search_agent",
                vec![ToolCall::new("c1", "search_tool", r#"{"query":"VOO"}"#)],
            ),
            Event::tool_call_result("web_search_agent", vec![ToolResult::new("c1", "...")]),
            Event::message("financial_advisor_agent", "Buy index funds."),
            Event::task_result(
                vec![Event::message("financial_advisor_agent", "Buy index funds.")],
                Some("max messages"),
            ),
        ]
    }

    #[tokio::test]
    async fn test_infer_streams_fragments() {
        let response = app(MockEngine::new(conversation()))
            .oneshot(post_json(json!({"query": "Should I invest in VOO?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let html = body_text(response).await;
        assert_eq!(html.matches("<style>").count(), 1);
        assert_eq!(html.matches("<div class='event-block").count(), 4);
        assert!(html.contains("Market Researcher"));
        assert!(html.contains("Completed successfully"));
        assert!(html.contains("Final Answer:"));
        // The echoed task is never shown back to the user.
        assert!(!html.contains("Should I invest in VOO?"));
    }

    #[tokio::test]
    async fn test_infer_rejects_empty_query() {
        let response = app(MockEngine::default())
            .oneshot(post_json(json!({"query": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Missing or empty 'query'"));
    }

    #[tokio::test]
    async fn test_infer_rejects_bad_income() {
        let response = app(MockEngine::default())
            .oneshot(post_json(json!({"query": "VOO?", "annual_gross_income": "lots"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("annual_gross_income"));
    }

    #[tokio::test]
    async fn test_infer_reports_mid_stream_failure() {
        let engine = MockEngine::new(conversation()).failing_after(1, "search quota exhausted");
        let response = app(engine)
            .oneshot(post_json(json!({"query": "VOO?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("search_tool"));
        assert!(html.contains("event-error"));
        assert!(html.contains("search quota exhausted"));
        assert!(!html.contains("Final Answer:"));
    }

    #[tokio::test]
    async fn test_infer_missing_transcript_is_server_error() {
        let state = AppState::new(Arc::new(ReplayEngine::new("/nonexistent/run.jsonl")));
        let response = routes(state)
            .oneshot(post_json(json!({"query": "VOO?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_profile_fields_are_normalised() {
        let request: InferRequest = serde_json::from_value(json!({
            "query": "VOO?",
            "risk_tolerance": "",
            "time_horizon": "10 years",
            "annual_gross_income": "85000"
        }))
        .unwrap();
        let request = request.into_planning_request().unwrap();
        assert_eq!(request.risk_tolerance, None);
        assert_eq!(request.time_horizon.as_deref(), Some("10 years"));
        assert_eq!(request.annual_gross_income, Some(85000.0));

        let request: InferRequest =
            serde_json::from_value(json!({"query": "VOO?", "annual_gross_income": 120000}))
                .unwrap();
        assert_eq!(
            request.into_planning_request().unwrap().annual_gross_income,
            Some(120000.0)
        );
    }
}
