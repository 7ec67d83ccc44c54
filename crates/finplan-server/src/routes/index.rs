use axum::{response::Html, routing::get, Router};

const INDEX_PAGE: &str = include_str!("../../static/index.html");

async fn handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub fn routes() -> Router {
    Router::new().route("/", get(handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_index_serves_page_shell() {
        let response = routes()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("<title>Financial Planner</title>"));
        assert!(page.contains("/infer"));
    }
}
