//! HTTP API for the club dues backend
//!
//! Wires the PostgreSQL repositories into the domain services and exposes
//! them over an Axum router. All business routes sit behind JWT
//! authentication; mutations additionally check roles in the handlers.
//!
//! # Route map
//!
//! - `/health`, `/health/ready`: public probes
//! - `/api/v1/dues`: generation, listing, summary, sweep, reschedule,
//!   deletion
//! - `/api/v1/payments`: recording, voiding, listing, receipt attachments
//! - `/api/v1/reports`: cash, arrears, projection, compliance, statistics
//! - `/api/v1/config`: club configuration CRUD

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use axum::Router;
use domain_dues::{DueGenerator, DueLedger, PaymentRecorder, ReportingEngine};
use domain_dues::{AttachmentStore, ConfigStore, DueStore, PaymentStore};
use domain_roster::PlayerDirectory;
use infra_db::{
    AttachmentRepository, ConfigRepository, DueRepository, PaymentRepository, PlayerRepository,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use crate::config::ApiConfig;
pub use crate::error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub generator: DueGenerator,
    pub ledger: DueLedger,
    pub recorder: PaymentRecorder,
    pub reports: ReportingEngine,
    pub config_store: Arc<dyn ConfigStore>,
}

impl AppState {
    /// Builds the state by wiring the repositories into the services
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let dues: Arc<dyn DueStore> = Arc::new(DueRepository::new(pool.clone()));
        let payments: Arc<dyn PaymentStore> = Arc::new(PaymentRepository::new(pool.clone()));
        let attachments: Arc<dyn AttachmentStore> =
            Arc::new(AttachmentRepository::new(pool.clone()));
        let config_store: Arc<dyn ConfigStore> = Arc::new(ConfigRepository::new(pool.clone()));
        let directory: Arc<dyn PlayerDirectory> = Arc::new(PlayerRepository::new(pool.clone()));

        let generator = DueGenerator::new(dues.clone(), directory.clone());
        let ledger = DueLedger::new(dues.clone(), payments.clone(), config_store.clone());
        let recorder = PaymentRecorder::new(
            ledger.clone(),
            payments.clone(),
            attachments.clone(),
            config_store.clone(),
        );
        let reports = ReportingEngine::new(dues, payments, directory);

        Self {
            pool,
            config,
            generator,
            ledger,
            recorder,
            reports,
            config_store,
        }
    }
}

/// Builds the full application router
pub fn create_router(state: AppState) -> Router {
    let dues_routes = Router::new()
        .route("/generate", post(handlers::dues::generate))
        .route("/", get(handlers::dues::list))
        .route("/overdue", get(handlers::dues::list_overdue))
        .route("/overdue/sweep", post(handlers::dues::sweep_overdue))
        .route("/summary/:year/:month", get(handlers::dues::period_summary))
        .route("/player/:player_id", get(handlers::dues::for_player))
        .route("/:id", get(handlers::dues::get).delete(handlers::dues::delete))
        .route("/:id/due-date", put(handlers::dues::reschedule));

    let payment_routes = Router::new()
        .route(
            "/",
            get(handlers::payments::list).post(handlers::payments::record),
        )
        .route("/due/:due_id", get(handlers::payments::for_due))
        .route(
            "/attachments/:attachment_id",
            get(handlers::payments::download_attachment),
        )
        .route("/:id", get(handlers::payments::get))
        .route("/:id/void", post(handlers::payments::void))
        .route(
            "/:id/attachments",
            get(handlers::payments::list_attachments).post(handlers::payments::attach_receipt),
        );

    let report_routes = Router::new()
        .route("/cash", get(handlers::reports::cash))
        .route("/arrears", get(handlers::reports::arrears))
        .route("/projection/:year/:month", get(handlers::reports::projection))
        .route("/compliance/:year/:month", get(handlers::reports::compliance))
        .route("/statistics", get(handlers::reports::statistics));

    let config_routes = Router::new()
        .route(
            "/",
            get(handlers::config::list).post(handlers::config::create),
        )
        .route(
            "/:key",
            get(handlers::config::get)
                .put(handlers::config::update)
                .delete(handlers::config::delete),
        );

    let protected = Router::new()
        .nest("/dues", dues_routes)
        .nest("/payments", payment_routes)
        .nest("/reports", report_routes)
        .nest("/config", config_routes)
        .layer(from_fn(middleware::audit_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::ready))
        .nest("/api/v1", protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
