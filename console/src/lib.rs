//! Facility Ops Console - application layer
//!
//! Runs the line-item form reconciler for the pest-control and facility
//! services console: purchase orders, purchase returns, material requests,
//! issues and receipts, invoices, plus vehicle and supplier master data.
//! Page controllers talk to either the REST API or an embedded store through
//! the same [`Backend`] seam.

pub mod backend;
pub mod config;
pub mod error;
pub mod pages;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

pub use backend::{connect, Backend, LocalBackend, RestBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use pages::{
    DocumentPage, MasterDataPage, MasterRecord, RecordList, SortDirection, SubmitOutcome, Toasts,
};
pub use store::LocalStore;

/// Load `.env` and configuration, install tracing and connect the backend
pub async fn bootstrap() -> anyhow::Result<(Config, Arc<dyn Backend>)> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    telemetry::init_tracing(&config.logging)?;

    tracing::info!("Starting Facility Ops Console");
    tracing::info!("Environment: {}", config.environment);

    let backend = connect(&config).await?;
    Ok((config, backend))
}
