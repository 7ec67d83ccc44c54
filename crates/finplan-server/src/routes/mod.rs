pub mod index;
pub mod infer;

use axum::Router;
use crate::state::AppState;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(index::routes())
        .merge(infer::routes(state))
}
