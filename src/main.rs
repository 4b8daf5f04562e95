use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use bpr_core::CoreConfig;
use bpr_core::config::{policy_path_from_env_value, resolve_policy};
use bpr_core::constants::DEFAULT_PATIENT_DATA_DIR;

/// Main entry point for the BPR screening service
///
/// Resolves configuration once, then serves the REST API (with OpenAPI/Swagger UI).
///
/// # Environment Variables
/// - `BPR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "patient_data")
/// - `BPR_SCREENING_POLICY`: Optional screening policy YAML replacing the built-in table
/// - `API_KEY`: When set, every authenticated request must present it in `x-api-key`
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, binding, or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bpr_run=info".parse()?)
                .add_directive("bpr_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("BPR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let patient_data_dir = PathBuf::from(
        std::env::var("PATIENT_DATA_DIR").unwrap_or_else(|_| DEFAULT_PATIENT_DATA_DIR.into()),
    );
    if !patient_data_dir.exists() {
        anyhow::bail!(
            "Patient data directory does not exist: {}",
            patient_data_dir.display()
        );
    }

    let policy = resolve_policy(policy_path_from_env_value(
        std::env::var("BPR_SCREENING_POLICY").ok(),
    ))?;
    tracing::info!("screening policy {} in force", policy.version);

    let api_key = std::env::var("API_KEY").ok().filter(|key| !key.is_empty());
    if api_key.is_none() {
        tracing::warn!("API_KEY not set; requests are not checked for an API key");
    }

    let cfg = Arc::new(CoreConfig::new(patient_data_dir, policy)?);
    let app = router(AppState::new(cfg, api_key)?);

    tracing::info!("++ Starting BPR REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
