use rust_decimal::Decimal;
use serde::Serialize;

use crate::store::models::DiscrepantRecord;

/// The three mutable installment attributes a document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallmentField {
    First,
    Second,
    Third,
}

impl InstallmentField {
    /// Field name as the business API expects it in a PATCH body.
    pub fn wire_name(&self) -> &'static str {
        match self {
            InstallmentField::First => "U_Monto_Plazo1",
            InstallmentField::Second => "U_Monto_Plazo2",
            InstallmentField::Third => "U_Monto_Plazo3",
        }
    }
}

/// Which field to patch and what to write into it.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionTarget {
    pub field: InstallmentField,
    pub current_value: Decimal,
    pub corrected_value: Decimal,
}

/// Decides which installment field absorbs the difference and computes its
/// corrected value. Total and deterministic: selector 2 targets the second
/// field, 3 the third, anything else (including missing) the first; absent
/// amounts count as zero. Safe on a zero difference (no-op correction).
pub fn correction_for(record: &DiscrepantRecord) -> CorrectionTarget {
    let (field, current) = match record.installment_count {
        Some(2) => (InstallmentField::Second, record.installment_2),
        Some(3) => (InstallmentField::Third, record.installment_3),
        _ => (InstallmentField::First, record.installment_1),
    };

    let current_value = current.unwrap_or(Decimal::ZERO);

    CorrectionTarget {
        field,
        current_value,
        corrected_value: current_value + record.difference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(
        count: Option<i32>,
        installments: [Option<Decimal>; 3],
        total: Decimal,
        difference: Decimal,
    ) -> DiscrepantRecord {
        DiscrepantRecord {
            doc_entry: 1001,
            doc_num: 90001,
            doc_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            currency: "COP".to_string(),
            doc_total: total,
            doc_total_fc: Decimal::ZERO,
            installment_1: installments[0],
            installment_2: installments[1],
            installment_3: installments[2],
            installment_count: count,
            difference,
        }
    }

    #[test]
    fn selector_two_targets_second_field() {
        let r = record(
            Some(2),
            [Some(dec!(50)), Some(dec!(40)), None],
            dec!(100),
            dec!(10),
        );
        let target = correction_for(&r);
        assert_eq!(target.field, InstallmentField::Second);
        assert_eq!(target.current_value, dec!(40));
        assert_eq!(target.corrected_value, dec!(50));
    }

    #[test]
    fn selector_three_targets_third_field() {
        let r = record(
            Some(3),
            [Some(dec!(30)), Some(dec!(30)), Some(dec!(30))],
            dec!(100),
            dec!(10),
        );
        let target = correction_for(&r);
        assert_eq!(target.field, InstallmentField::Third);
        assert_eq!(target.corrected_value, dec!(40));
    }

    #[test]
    fn any_other_selector_targets_first_field() {
        for count in [Some(1), Some(0), Some(-1), Some(7), None] {
            let r = record(count, [Some(dec!(20)), None, None], dec!(100), dec!(80));
            let target = correction_for(&r);
            assert_eq!(target.field, InstallmentField::First, "count={:?}", count);
            assert_eq!(target.corrected_value, dec!(100));
        }
    }

    #[test]
    fn absent_amount_counts_as_zero() {
        let r = record(Some(2), [Some(dec!(60)), None, None], dec!(100), dec!(40));
        let target = correction_for(&r);
        assert_eq!(target.current_value, Decimal::ZERO);
        assert_eq!(target.corrected_value, dec!(40));
    }

    // Single installment short by 70: the first field is lifted to the full
    // document total.
    #[test]
    fn single_installment_absorbs_whole_gap() {
        let r = record(Some(1), [Some(dec!(30)), None, None], dec!(100), dec!(70));
        let target = correction_for(&r);
        assert_eq!(target.field, InstallmentField::First);
        assert_eq!(target.corrected_value, dec!(100));
    }

    #[test]
    fn zero_difference_is_a_noop() {
        let r = record(Some(2), [Some(dec!(50)), Some(dec!(50)), None], dec!(100), dec!(0));
        let target = correction_for(&r);
        assert_eq!(target.current_value, target.corrected_value);
    }

    #[test]
    fn negative_difference_shrinks_the_field() {
        let r = record(
            Some(3),
            [Some(dec!(40)), Some(dec!(40)), Some(dec!(35))],
            dec!(100),
            dec!(-15),
        );
        let target = correction_for(&r);
        assert_eq!(target.corrected_value, dec!(20));
    }

    // Substituting the corrected value back into the three-field sum must
    // reproduce the document total the difference was computed against.
    #[test]
    fn corrected_sum_matches_document_total() {
        let cases = [
            record(Some(1), [Some(dec!(30)), None, None], dec!(100), dec!(70)),
            record(
                Some(2),
                [Some(dec!(50)), Some(dec!(49.99)), None],
                dec!(100),
                dec!(0.01),
            ),
            record(
                Some(3),
                [Some(dec!(33.33)), Some(dec!(33.33)), Some(dec!(33.33))],
                dec!(100),
                dec!(0.01),
            ),
        ];

        for r in cases {
            let target = correction_for(&r);
            let mut parts = [
                r.installment_1.unwrap_or(Decimal::ZERO),
                r.installment_2.unwrap_or(Decimal::ZERO),
                r.installment_3.unwrap_or(Decimal::ZERO),
            ];
            let slot = match target.field {
                InstallmentField::First => 0,
                InstallmentField::Second => 1,
                InstallmentField::Third => 2,
            };
            parts[slot] = target.corrected_value;
            let sum: Decimal = parts.iter().copied().sum();
            assert_eq!(sum, r.effective_total());
            assert_eq!(target.corrected_value, target.current_value + r.difference);
        }
    }

    #[test]
    fn usd_documents_reconcile_against_the_foreign_total() {
        let mut r = record(Some(1), [Some(dec!(20)), None, None], dec!(85000), dec!(5));
        r.currency = "USD".to_string();
        r.doc_total_fc = dec!(25);
        assert_eq!(r.effective_total(), dec!(25));

        let target = correction_for(&r);
        assert_eq!(target.corrected_value, dec!(25));
    }

    #[test]
    fn wire_names_match_the_business_api_fields() {
        assert_eq!(InstallmentField::First.wire_name(), "U_Monto_Plazo1");
        assert_eq!(InstallmentField::Second.wire_name(), "U_Monto_Plazo2");
        assert_eq!(InstallmentField::Third.wire_name(), "U_Monto_Plazo3");
    }
}
