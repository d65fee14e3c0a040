use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::router;
use crate::sink::{CollectorSink, PrintSink};

pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = if config.print_sink {
        router::router(
            PrintSink {},
            config.redirect_url.clone(),
            config.export_prometheus,
        )
    } else {
        let sink = CollectorSink::new(
            config.collector_endpoint.clone(),
            config.delivery_timeout.0,
        )
        .expect("failed to create collector sink");

        router::router(sink, config.redirect_url.clone(), config.export_prometheus)
    };

    tracing::info!("listening on {:?}", listener.local_addr().unwrap());
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .unwrap()
}
