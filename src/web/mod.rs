//! Web layer
//!
//! Thin handlers over the services. Every response uses the envelope in
//! [`responses`]; errors are mapped to status codes in one place.

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};
use tracing::info;

use crate::{
    ai::AiGateway,
    config::Config,
    database::{
        Database,
        repositories::{AiUsageSeaOrmRepository, FoodScanCacheSeaOrmRepository},
    },
    services::{BudgetGate, FamilyMealPlanService, FoodScanService, UsageRecorder},
};

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;

pub use responses::{ApiResponse, handle_error};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub database: Database,
    pub food_scan_service: FoodScanService,
    pub meal_plan_service: FamilyMealPlanService,
    pub usage_repository: AiUsageSeaOrmRepository,
    pub cache_repository: FoodScanCacheSeaOrmRepository,
    pub usage_recorder: UsageRecorder,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Wire repositories and services over one database and AI gateway
    pub fn new(config: Config, database: Database, ai_gateway: Arc<dyn AiGateway>) -> Self {
        let connection = database.connection();
        let usage_repository = AiUsageSeaOrmRepository::new(connection.clone());
        let cache_repository = FoodScanCacheSeaOrmRepository::new(connection);

        let budget_gate = BudgetGate::new(usage_repository.clone());
        let usage_recorder = UsageRecorder::new(usage_repository.clone(), config.budget.clone());

        let food_scan_service = FoodScanService::new(
            cache_repository.clone(),
            budget_gate.clone(),
            usage_recorder.clone(),
            ai_gateway.clone(),
            config.scan.clone(),
            config.budget.clone(),
        );
        let meal_plan_service = FamilyMealPlanService::new(
            budget_gate,
            usage_recorder.clone(),
            ai_gateway,
            config.budget.clone(),
        );

        Self {
            config,
            database,
            food_scan_service,
            meal_plan_service,
            usage_repository,
            cache_repository,
            usage_recorder,
            start_time: chrono::Utc::now(),
        }
    }
}

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        let app = create_router(state)?;
        Ok(Self { app, addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("Listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

/// Build the router with all routes and middleware
pub fn create_router(state: AppState) -> Result<Router> {
    let request_timeout = state.config.web.request_timeout()?;
    let max_request_size = state.config.web.max_request_size;

    let router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/functions/v1/analyze-food",
            post(handlers::food_scan::analyze_food),
        )
        .nest("/api/v1", api_v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(
                    middleware::request_logging_middleware,
                ))
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(DefaultBodyLimit::max(max_request_size)),
        )
        .with_state(state);

    Ok(router)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/food-scans", post(handlers::food_scan::analyze_food))
        .route(
            "/family-meal-plans",
            post(handlers::meal_plan::create_family_meal_plan),
        )
        .route("/usage/{user_id}", get(handlers::usage::get_usage))
        .route("/cache/stats", get(handlers::usage::get_cache_stats))
}
