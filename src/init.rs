use crate::{
    middleware::mw_ctx::CtxState,
    routes::{ai_match, check_in, mint_nft, projects},
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    Router::new()
        .route("/hc", get(get_hc))
        .merge(ai_match::routes())
        .merge(check_in::routes())
        .merge(mint_nft::routes())
        .merge(projects::routes())
        .with_state(ctx_state.clone())
        .layer(TraceLayer::new_for_http())
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
