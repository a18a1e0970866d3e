pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod router;

use crate::errors::ReportApiError;
use crate::metrics_defs::REQUEST_DURATION;
use crate::router::{ReportRouter, RouterResponse};
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::Request;
use reports::row_source::RowSource;
use shared::admin_service::AdminService;
use shared::histogram;
use shared::http::run_http_service;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const READINESS_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Serves the configured reports and the admin endpoints until one of the
/// listeners fails.
pub async fn run(config: config::Config, source: Arc<dyn RowSource>) -> Result<(), ReportApiError> {
    let endpoints = config.resolve_reports()?;
    tracing::info!(reports = endpoints.len(), "Loaded report definitions");

    let ready = Arc::new(AtomicBool::new(false));
    tokio::spawn(probe_readiness(
        source.clone(),
        ready.clone(),
        READINESS_PROBE_INTERVAL,
    ));

    let router_service = ReportApiService {
        router: ReportRouter::new(endpoints, source)?,
    };
    let router_task = run_http_service(&config.listener.host, config.listener.port, router_service);

    let admin_service = AdminService::<ReportApiError>::new(ready);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    tokio::try_join!(router_task, admin_task)?;
    Ok(())
}

/// Pings the dataset store until it answers, then marks the service ready.
async fn probe_readiness(source: Arc<dyn RowSource>, ready: Arc<AtomicBool>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match source.ping().await {
            Ok(()) => {
                tracing::info!("Dataset store reachable, marking service ready");
                ready.store(true, Ordering::Relaxed);
                return;
            }
            Err(e) => tracing::warn!(error = %e, "Dataset store not reachable yet"),
        }
    }
}

struct ReportApiService {
    router: ReportRouter,
}

impl Service<Request<Incoming>> for ReportApiService {
    type Response = RouterResponse;
    type Error = ReportApiError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let router = self.router.clone();
        Box::pin(async move {
            let start = Instant::now();
            let report = router
                .report_name(req.uri().path())
                .unwrap_or("none")
                .to_string();

            let response = router.route(req).await?;

            histogram!(
                REQUEST_DURATION,
                "status" => response.status().as_u16().to_string(),
                "report" => report
            )
            .record(start.elapsed().as_secs_f64());
            Ok(response)
        })
    }
}
