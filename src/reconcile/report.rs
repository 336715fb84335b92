use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::reconcile::calculator::CorrectionTarget;
use crate::store::models::DiscrepantRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "ERROR")]
    Error,
}

/// One correction the business API accepted.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedAdjustment {
    pub doc_entry: i64,
    pub doc_num: i64,
    pub tenant: String,
    pub field: &'static str,
    pub previous_value: Decimal,
    pub new_value: Decimal,
    pub difference: Decimal,
}

impl AppliedAdjustment {
    pub fn new(tenant: &str, record: &DiscrepantRecord, target: &CorrectionTarget) -> Self {
        Self {
            doc_entry: record.doc_entry,
            doc_num: record.doc_num,
            tenant: tenant.to_string(),
            field: target.field.wire_name(),
            previous_value: target.current_value,
            new_value: target.corrected_value,
            difference: record.difference,
        }
    }
}

/// One correction that could not be applied, with the reason it failed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedAdjustment {
    pub doc_entry: i64,
    pub doc_num: i64,
    pub tenant: String,
    pub reason: String,
}

impl FailedAdjustment {
    pub fn new(tenant: &str, record: &DiscrepantRecord, reason: String) -> Self {
        Self {
            doc_entry: record.doc_entry,
            doc_num: record.doc_num,
            tenant: tenant.to_string(),
            reason,
        }
    }
}

/// Run-level aggregate returned to the caller. Finalized once, never mutated
/// after return.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied: Vec<AppliedAdjustment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedAdjustment>,
    pub total_examined: usize,
    pub total_applied: usize,
    pub total_failed: usize,
}

impl RunReport {
    /// Report for a run that made it through the tenant loop.
    pub fn completed(
        run_id: Uuid,
        total_examined: usize,
        applied: Vec<AppliedAdjustment>,
        failed: Vec<FailedAdjustment>,
    ) -> Self {
        let message = if !applied.is_empty() {
            Some(format!(
                "Adjusted {} invoices via the business API",
                applied.len()
            ))
        } else if failed.is_empty() {
            Some("No orders with installment totals out of balance were found".to_string())
        } else {
            None
        };

        let warning = if failed.is_empty() {
            None
        } else {
            Some(format!("{} invoices could not be adjusted", failed.len()))
        };

        Self {
            run_id,
            status: RunStatus::Success,
            message,
            warning,
            total_applied: applied.len(),
            total_failed: failed.len(),
            applied,
            failed,
            total_examined,
        }
    }

    /// Report for a run aborted by a store or configuration failure. Carries
    /// the top-level message instead of outcome detail.
    pub fn fatal(run_id: Uuid, message: String) -> Self {
        Self {
            run_id,
            status: RunStatus::Error,
            message: Some(message),
            warning: None,
            applied: Vec::new(),
            failed: Vec::new(),
            total_examined: 0,
            total_applied: 0,
            total_failed: 0,
        }
    }
}
