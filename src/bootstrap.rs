use std::sync::Arc;

use tracing::info;

use crate::api::handler::AppState;
use crate::config::Config;
use crate::error::AppResult;

pub fn initialize_app_state(config: Config) -> AppResult<AppState> {
    info!("Initializing application components ...");

    info!(
        "✅ Reconciliation configured: {} tenant(s), cutoff {}, excluded installment types {:?}",
        config.tenants.len(),
        config.cutoff_date,
        config.excluded_installment_types
    );
    info!("✅ Business API endpoint: {}", config.service_layer_url);

    Ok(AppState {
        config: Arc::new(config),
    })
}
