use std::future::ready;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::assets::Assets;
use crate::prometheus::{setup_metrics_recorder, track_metrics};
use crate::{relay, sink};

#[derive(Clone)]
pub struct State {
    pub sink: Arc<dyn sink::HitSink + Send + Sync>,
    pub assets: Arc<Assets>,
    pub redirect_url: String,
}

pub fn router<S: sink::HitSink + Send + Sync + 'static>(
    sink: S,
    redirect_url: String,
    metrics: bool,
) -> Router {
    let state = State {
        sink: Arc::new(sink),
        assets: Arc::new(Assets::new()),
        redirect_url,
    };

    let status_router = Router::new()
        .route("/_readiness", get(|| ready(StatusCode::OK)))
        .route("/_liveness", get(|| ready(StatusCode::OK)));

    let router = Router::new()
        .route("/", get(relay::index))
        .route("/*path", get(relay::badge))
        .merge(status_router)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state);

    // Don't install metrics unless asked to
    // Installing a global recorder when beacon is used as a library (during tests etc)
    // does not work well.
    if metrics {
        let recorder_handle = setup_metrics_recorder();

        router.route("/metrics", get(move || ready(recorder_handle.render())))
    } else {
        router
    }
}
