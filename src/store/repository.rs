use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::BigDecimal;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::reconcile::traits::DiscrepancySource;
use crate::store::models::DiscrepantRecord;

/// Locates discrepant documents in the tenant store. The pool is lazy: no
/// connection is opened until the first query, and `close` releases it once
/// per run.
pub struct StoreRepository {
    pool: PgPool,
    cutoff_date: NaiveDate,
    excluded_installment_types: Vec<i32>,
}

impl StoreRepository {
    pub fn connect(config: &Config) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect_lazy(&config.database_url)?;

        Ok(Self {
            pool,
            cutoff_date: config.cutoff_date,
            excluded_installment_types: config.excluded_installment_types.clone(),
        })
    }

    async fn fetch_tenant(&self, tenant: &str) -> AppResult<Vec<DiscrepantRecord>> {
        let rows = sqlx::query_as::<_, OrderRow>(&discrepancy_query(tenant))
            .bind(self.cutoff_date)
            .bind(&self.excluded_installment_types)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(DiscrepantRecord::from).collect())
    }
}

#[async_trait]
impl DiscrepancySource for StoreRepository {
    async fn fetch_discrepant(
        &self,
        tenants: &[String],
    ) -> AppResult<Vec<(String, Vec<DiscrepantRecord>)>> {
        let mut batches = Vec::new();

        for tenant in dedup_tenants(tenants) {
            let records = self.fetch_tenant(&tenant).await?;
            info!(tenant = %tenant, records = records.len(), "tenant queried");
            if !records.is_empty() {
                batches.push((tenant, records));
            }
        }

        Ok(batches)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Per-tenant discrepancy query. The tenant name selects the schema and
/// comes from operator configuration, never from request input; filters are
/// bound: $1 cutoff date, $2 excluded installment type codes.
fn discrepancy_query(tenant: &str) -> String {
    format!(
        r#"
        WITH flagged AS (
            SELECT
                o.doc_entry,
                o.doc_num,
                o.doc_date,
                o.currency,
                o.doc_total,
                o.doc_total_fc,
                o.installment_1,
                o.installment_2,
                o.installment_3,
                o.installment_count,
                CASE WHEN o.currency = 'USD' THEN o.doc_total_fc ELSE o.doc_total END
                    - (COALESCE(o.installment_1, 0)
                        + COALESCE(o.installment_2, 0)
                        + COALESCE(o.installment_3, 0)) AS difference
            FROM "{tenant}".orders o
            INNER JOIN shared.business_partners b ON b.card_code = o.card_code
            WHERE o.doc_date >= $1
              AND b.installment_type <> ALL($2)
        )
        SELECT *
        FROM flagged
        WHERE difference <> 0
        ORDER BY doc_num DESC
        "#
    )
}

/// First occurrence wins; later duplicates are dropped.
fn dedup_tenants(tenants: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tenants
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    doc_entry: i64,
    doc_num: i64,
    doc_date: NaiveDate,
    currency: String,
    doc_total: BigDecimal,
    doc_total_fc: BigDecimal,
    installment_1: Option<BigDecimal>,
    installment_2: Option<BigDecimal>,
    installment_3: Option<BigDecimal>,
    installment_count: Option<i32>,
    difference: BigDecimal,
}

impl From<OrderRow> for DiscrepantRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            doc_entry: row.doc_entry,
            doc_num: row.doc_num,
            doc_date: row.doc_date,
            currency: row.currency,
            doc_total: to_decimal(&row.doc_total),
            doc_total_fc: to_decimal(&row.doc_total_fc),
            installment_1: row.installment_1.as_ref().map(to_decimal),
            installment_2: row.installment_2.as_ref().map(to_decimal),
            installment_3: row.installment_3.as_ref().map(to_decimal),
            installment_count: row.installment_count,
            difference: to_decimal(&row.difference),
        }
    }
}

fn to_decimal(value: &BigDecimal) -> Decimal {
    Decimal::from_str(&value.to_string()).unwrap_or_default()
}
