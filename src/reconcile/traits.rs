use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{AppResult, AuthError, UpdateError};
use crate::reconcile::calculator::InstallmentField;
use crate::service_layer::session::TenantSession;
use crate::store::models::DiscrepantRecord;

/// Supplies the records to reconcile. Batches come back in processing order;
/// tenants with nothing to fix are omitted entirely.
#[async_trait]
pub trait DiscrepancySource: Send + Sync {
    /// One batch per tenant with at least one discrepant record. A query
    /// failure aborts the whole fetch.
    async fn fetch_discrepant(
        &self,
        tenants: &[String],
    ) -> AppResult<Vec<(String, Vec<DiscrepantRecord>)>>;

    /// Releases the store connection. Called exactly once per run, on every
    /// exit path.
    async fn close(&self);
}

/// Applies corrections through the external business API.
#[async_trait]
pub trait CorrectionGateway: Send + Sync {
    async fn login(&self, tenant: &str) -> Result<TenantSession, AuthError>;

    async fn apply_correction(
        &self,
        session: &TenantSession,
        doc_entry: i64,
        field: InstallmentField,
        value: Decimal,
    ) -> Result<(), UpdateError>;
}
