use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One financial document whose recorded installment breakdown disagrees
/// with its computed total. Produced once per run by the locator query and
/// immutable afterwards; `difference` is non-zero by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepantRecord {
    /// Internal document key used by the business API.
    pub doc_entry: i64,
    /// Human-facing document number.
    pub doc_num: i64,
    pub doc_date: NaiveDate,
    pub currency: String,
    pub doc_total: Decimal,
    pub doc_total_fc: Decimal,
    pub installment_1: Option<Decimal>,
    pub installment_2: Option<Decimal>,
    pub installment_3: Option<Decimal>,
    /// Selects which installment field absorbs the correction.
    pub installment_count: Option<i32>,
    /// Signed gap between the document total and the installment sum.
    pub difference: Decimal,
}

impl DiscrepantRecord {
    /// The total the difference was computed against: the foreign-currency
    /// total for USD documents, the local total otherwise.
    pub fn effective_total(&self) -> Decimal {
        if self.currency == "USD" {
            self.doc_total_fc
        } else {
            self.doc_total
        }
    }
}
