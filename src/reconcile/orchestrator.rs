use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppResult;
use crate::reconcile::calculator::correction_for;
use crate::reconcile::report::{AppliedAdjustment, FailedAdjustment, RunReport};
use crate::reconcile::traits::{CorrectionGateway, DiscrepancySource};

/// Drives one reconciliation run: fetch discrepant batches, then per tenant
/// log in and patch each record, isolating failures at the record and tenant
/// boundaries. Tenants and records are processed strictly sequentially, so
/// outcome ordering is deterministic: tenant order, then document number
/// descending within a tenant.
pub struct Reconciler {
    store: Arc<dyn DiscrepancySource>,
    gateway: Arc<dyn CorrectionGateway>,
    tenants: Vec<String>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn DiscrepancySource>,
        gateway: Arc<dyn CorrectionGateway>,
        tenants: Vec<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            tenants,
        }
    }

    /// Runs end to end and always produces a report: a store failure becomes
    /// `status: ERROR` rather than an error return. The store connection is
    /// released exactly once, whatever happened before.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        info!(%run_id, tenants = self.tenants.len(), "starting reconciliation run");

        let outcome = self.process(run_id).await;

        self.store.close().await;
        info!(%run_id, "store connection released");

        match outcome {
            Ok(report) => {
                info!(
                    %run_id,
                    examined = report.total_examined,
                    applied = report.total_applied,
                    failed = report.total_failed,
                    "reconciliation run finished"
                );
                report
            }
            Err(err) => {
                error!(%run_id, error = %err, "reconciliation run aborted");
                RunReport::fatal(run_id, err.to_string())
            }
        }
    }

    async fn process(&self, run_id: Uuid) -> AppResult<RunReport> {
        let batches = self.store.fetch_discrepant(&self.tenants).await?;
        let total_examined: usize = batches.iter().map(|(_, records)| records.len()).sum();
        info!(
            %run_id,
            records = total_examined,
            tenants = batches.len(),
            "discrepant records located"
        );

        let mut applied = Vec::new();
        let mut failed = Vec::new();

        for (tenant, records) in &batches {
            info!(%run_id, %tenant, records = records.len(), "processing tenant");

            // A login failure writes off this tenant's whole batch but never
            // the run.
            let session = match self.gateway.login(tenant).await {
                Ok(session) => session,
                Err(err) => {
                    warn!(%run_id, %tenant, error = %err, "tenant login failed");
                    for record in records {
                        failed.push(FailedAdjustment::new(
                            tenant,
                            record,
                            format!("authentication failed: {}", err),
                        ));
                    }
                    continue;
                }
            };

            for record in records {
                let target = correction_for(record);
                info!(
                    %run_id,
                    %tenant,
                    doc_entry = record.doc_entry,
                    field = target.field.wire_name(),
                    from = %target.current_value,
                    to = %target.corrected_value,
                    "adjusting document"
                );

                match self
                    .gateway
                    .apply_correction(
                        &session,
                        record.doc_entry,
                        target.field,
                        target.corrected_value,
                    )
                    .await
                {
                    Ok(()) => applied.push(AppliedAdjustment::new(tenant, record, &target)),
                    Err(err) => {
                        error!(
                            %run_id,
                            %tenant,
                            doc_entry = record.doc_entry,
                            error = %err,
                            "adjustment failed"
                        );
                        failed.push(FailedAdjustment::new(tenant, record, err.to_string()));
                    }
                }
            }
        }

        Ok(RunReport::completed(run_id, total_examined, applied, failed))
    }
}
