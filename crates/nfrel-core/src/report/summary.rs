//! Audit totals over assembled records.

use rust_decimal::Decimal;

use crate::models::record::{FiscalRecord, ReportSummary};

/// Count and total the records, in the order given.
///
/// Always a sequential fold over document order, so the same records give
/// the same total on every run.
pub fn summarize(records: &[FiscalRecord]) -> ReportSummary {
    records.iter().fold(ReportSummary::default(), |mut summary, record| {
        summary.record_count += 1;
        summary.total_value = summary.total_value.saturating_add(record.valor);
        if record.is_flagged() {
            summary.flagged_count += 1;
        }
        if record.valor.is_zero() {
            summary.zero_valued_count += 1;
        }

        let status = summary.by_status.entry(record.situacao.clone()).or_default();
        status.count += 1;
        status.total = status.total.saturating_add(record.valor);

        summary
    })
}

/// Records whose amount is zero, for cross-checking against the document.
pub fn zero_valued(records: &[FiscalRecord]) -> impl Iterator<Item = (usize, &FiscalRecord)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.valor == Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Anomaly, StatusTotal};
    use pretty_assertions::assert_eq;

    fn record(situacao: &str, cents: i64) -> FiscalRecord {
        FiscalRecord {
            emissao: "01/01/2024".into(),
            serie: Some("1".into()),
            numero: "100".into(),
            situacao: situacao.into(),
            chave_acesso: String::new(),
            cfop: None,
            valor: Decimal::new(cents, 2),
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn test_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.total_value, Decimal::ZERO);
        assert!(summary.by_status.is_empty());
    }

    #[test]
    fn test_totals_and_breakdown() {
        let mut flagged = record("Normal", 0);
        flagged.anomalies.push(Anomaly::UnparsedAmount { raw: "abc".into() });

        let records = vec![
            record("Normal", 123456),
            record("Cancelada", 1000),
            record("Normal", -500),
            flagged,
        ];

        let summary = summarize(&records);
        assert_eq!(summary.record_count, records.len());
        assert_eq!(summary.total_value, Decimal::new(123956, 2));
        assert_eq!(summary.flagged_count, 1);
        assert_eq!(summary.zero_valued_count, 1);
        assert_eq!(
            summary.by_status.get("Normal"),
            Some(&StatusTotal {
                count: 3,
                total: Decimal::new(122956, 2)
            })
        );
        assert_eq!(summary.by_status["Cancelada"].count, 1);
    }

    #[test]
    fn test_total_matches_record_sum() {
        let records: Vec<FiscalRecord> = (1..=250).map(|i| record("Normal", i * 37 + 1)).collect();
        let expected: Decimal = records.iter().map(|r| r.valor).sum();

        assert_eq!(summarize(&records).total_value, expected);
        assert_eq!(summarize(&records), summarize(&records));
    }

    #[test]
    fn test_zero_valued() {
        let records = vec![record("Normal", 100), record("Inutilizada", 0)];
        let zeros: Vec<usize> = zero_valued(&records).map(|(i, _)| i).collect();
        assert_eq!(zeros, vec![1]);
        assert_eq!(summarize(&records).zero_valued_count, zeros.len());
    }
}
