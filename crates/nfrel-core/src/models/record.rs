//! Canonical fiscal records and report totals.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named fiscal field, in canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Issue date/time (Emissão).
    Emissao,
    /// Series (Série).
    Serie,
    /// Invoice number (Número).
    Numero,
    /// Status label (Situação).
    Situacao,
    /// Access key (Chave de acesso).
    ChaveAcesso,
    /// Fiscal operation code.
    Cfop,
    /// Amount.
    Valor,
}

impl Field {
    /// Every field, in output order.
    pub const ALL: [Field; 7] = [
        Field::Emissao,
        Field::Serie,
        Field::Numero,
        Field::Situacao,
        Field::ChaveAcesso,
        Field::Cfop,
        Field::Valor,
    ];

    /// Machine name used as the mapping key.
    pub fn key(self) -> &'static str {
        match self {
            Field::Emissao => "emissao",
            Field::Serie => "serie",
            Field::Numero => "numero",
            Field::Situacao => "situacao",
            Field::ChaveAcesso => "chave_acesso",
            Field::Cfop => "cfop",
            Field::Valor => "valor",
        }
    }

    /// Column label as printed on the report.
    pub fn label(self) -> &'static str {
        match self {
            Field::Emissao => "Emissão",
            Field::Serie => "Série",
            Field::Numero => "Número",
            Field::Situacao => "Situação",
            Field::ChaveAcesso => "Chave de acesso",
            Field::Cfop => "CFOP",
            Field::Valor => "Valor (R$)",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Something the auditor should look at on a retained record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// The amount cell was blank or not a number; `valor` was set to zero.
    UnparsedAmount { raw: String },
    /// The access key cell held something other than up to 44 digits; it was left empty.
    InvalidAccessKey { raw: String },
    /// The row had fewer cells than the column layout.
    MissingFields { expected: usize, found: usize },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnparsedAmount { raw } => write!(f, "unparsed amount {:?}", raw),
            Anomaly::InvalidAccessKey { raw } => write!(f, "invalid access key {:?}", raw),
            Anomaly::MissingFields { expected, found } => {
                write!(f, "row has {} of {} columns", found, expected)
            }
        }
    }
}

/// One invoice line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalRecord {
    /// Issue timestamp, kept as printed.
    pub emissao: String,

    /// Series, absent under the reduced layout.
    pub serie: Option<String>,

    /// Invoice number.
    pub numero: String,

    /// Status label (Normal, Cancelada, Inutilizada, ...).
    pub situacao: String,

    /// Access key: digits only, or empty.
    pub chave_acesso: String,

    /// Fiscal operation code, absent under the reduced layout.
    pub cfop: Option<String>,

    /// Amount in currency units.
    pub valor: Decimal,

    /// Recovered problems on this row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<Anomaly>,
}

/// A field value for tabular display or export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Amount(Decimal),
    Null,
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Amount(d) => write!(f, "{:.2}", d),
            FieldValue::Null => Ok(()),
        }
    }
}

impl FiscalRecord {
    /// Value of a single field.
    pub fn get(&self, field: Field) -> FieldValue<'_> {
        fn text(s: &Option<String>) -> FieldValue<'_> {
            match s {
                Some(s) => FieldValue::Text(s),
                None => FieldValue::Null,
            }
        }

        match field {
            Field::Emissao => FieldValue::Text(&self.emissao),
            Field::Serie => text(&self.serie),
            Field::Numero => FieldValue::Text(&self.numero),
            Field::Situacao => FieldValue::Text(&self.situacao),
            Field::ChaveAcesso => FieldValue::Text(&self.chave_acesso),
            Field::Cfop => text(&self.cfop),
            Field::Valor => FieldValue::Amount(self.valor),
        }
    }

    /// The record as an ordered field name to value mapping.
    pub fn fields(&self) -> [(&'static str, FieldValue<'_>); 7] {
        Field::ALL.map(|field| (field.key(), self.get(field)))
    }

    /// Whether the record needs a manual look.
    pub fn is_flagged(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// Count and total for one status label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotal {
    pub count: usize,
    pub total: Decimal,
}

/// Totals for comparison against the document's printed totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of records.
    pub record_count: usize,

    /// Sum of every `valor`, in document order.
    pub total_value: Decimal,

    /// Records carrying at least one anomaly.
    pub flagged_count: usize,

    /// Records whose amount came out as zero.
    #[serde(default)]
    pub zero_valued_count: usize,

    /// Count and total per status label.
    pub by_status: BTreeMap<String, StatusTotal>,
}

/// Outcome of comparing the computed total with a printed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub printed_total: Decimal,
    pub computed_total: Decimal,
    /// `computed_total - printed_total`.
    pub difference: Decimal,
    pub matches: bool,
}

impl ReportSummary {
    /// Compare against the total printed on the source document.
    pub fn reconcile(&self, printed_total: Decimal, tolerance: Decimal) -> Reconciliation {
        let difference = self.total_value.saturating_sub(printed_total);
        Reconciliation {
            printed_total,
            computed_total: self.total_value,
            difference,
            matches: difference.abs() <= tolerance.abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> FiscalRecord {
        FiscalRecord {
            emissao: "01/01/2024".into(),
            serie: None,
            numero: "100".into(),
            situacao: "Normal".into(),
            chave_acesso: "1234".into(),
            cfop: Some("5102".into()),
            valor: Decimal::new(123456, 2),
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn test_fields_are_in_canonical_order() {
        let rec = record();
        let keys: Vec<&str> = rec.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["emissao", "serie", "numero", "situacao", "chave_acesso", "cfop", "valor"]
        );
        assert_eq!(rec.get(Field::Serie), FieldValue::Null);
        assert_eq!(rec.get(Field::Cfop), FieldValue::Text("5102"));
        assert_eq!(rec.get(Field::Valor), FieldValue::Amount(Decimal::new(123456, 2)));
        assert_eq!(rec.get(Field::Valor).to_string(), "1234.56");
    }

    #[test]
    fn test_serialized_field_order() {
        let json = serde_json::to_string(&record()).unwrap();
        let positions: Vec<usize> = ["emissao", "serie", "numero", "situacao", "chave_acesso", "cfop", "valor"]
            .iter()
            .map(|k| json.find(&format!("\"{}\"", k)).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(!json.contains("anomalies"));
    }

    #[test]
    fn test_reconcile() {
        let summary = ReportSummary {
            record_count: 2,
            total_value: Decimal::new(124456, 2),
            ..Default::default()
        };

        let exact = summary.reconcile(Decimal::new(124456, 2), Decimal::ZERO);
        assert!(exact.matches);
        assert_eq!(exact.difference, Decimal::ZERO);

        let off = summary.reconcile(Decimal::new(124400, 2), Decimal::new(1, 2));
        assert!(!off.matches);
        assert_eq!(off.difference, Decimal::new(56, 2));

        let close = summary.reconcile(Decimal::new(124455, 2), Decimal::new(1, 2));
        assert!(close.matches);
    }
}
