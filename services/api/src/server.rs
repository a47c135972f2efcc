use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationRepository, InMemoryJobRepository, InMemoryUserRepository,
    LoggingNotifier,
};
use crate::routes::with_recruiting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use talent_match::config::AppConfig;
use talent_match::error::AppError;
use talent_match::telemetry;
use talent_match::workflows::recruiting::{AccountService, RecruitingService};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let vocabulary_size = config.matching.vocabulary.len();
    let auto_analyze = config.matching.auto_analyze;
    let recruiting_service = Arc::new(RecruitingService::new(
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(LoggingNotifier::default()),
        config.matching,
    ));
    let account_service = Arc::new(AccountService::new(Arc::new(
        InMemoryUserRepository::default(),
    )));

    let app = with_recruiting_routes(recruiting_service, account_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        vocabulary_size,
        auto_analyze,
        "talent match api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
