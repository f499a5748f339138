//! Column layouts and positional field mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::document::RawRow;
use crate::models::record::Field;

/// Column layout of a report export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSchema {
    /// Emissão, Série, Número, Situação, Chave de acesso, CFOP, Valor.
    Full,
    /// Emissão, Número, Situação, Chave de acesso, Valor.
    Reduced,
}

const FULL_FIELDS: [Field; 7] = Field::ALL;

const REDUCED_FIELDS: [Field; 5] = [
    Field::Emissao,
    Field::Numero,
    Field::Situacao,
    Field::ChaveAcesso,
    Field::Valor,
];

impl ColumnSchema {
    /// Pick the layout from the number of columns seen in the document.
    pub fn for_column_count(columns: usize) -> Self {
        if columns == FULL_FIELDS.len() {
            ColumnSchema::Full
        } else {
            ColumnSchema::Reduced
        }
    }

    /// Fields in column order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            ColumnSchema::Full => &FULL_FIELDS,
            ColumnSchema::Reduced => &REDUCED_FIELDS,
        }
    }

    /// Number of columns.
    pub fn width(self) -> usize {
        self.fields().len()
    }

    /// Column index of a field, if the layout has it.
    pub fn position(self, field: Field) -> Option<usize> {
        self.fields().iter().position(|f| *f == field)
    }
}

impl fmt::Display for ColumnSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSchema::Full => f.write_str("full"),
            ColumnSchema::Reduced => f.write_str("reduced"),
        }
    }
}

/// How the layout is chosen for a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSelection {
    /// From the observed column count.
    #[default]
    Auto,
    Full,
    Reduced,
}

impl SchemaSelection {
    pub fn resolve(self, observed_columns: usize) -> ColumnSchema {
        match self {
            SchemaSelection::Auto => ColumnSchema::for_column_count(observed_columns),
            SchemaSelection::Full => ColumnSchema::Full,
            SchemaSelection::Reduced => ColumnSchema::Reduced,
        }
    }
}

impl FromStr for SchemaSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SchemaSelection::Auto),
            "full" | "7" => Ok(SchemaSelection::Full),
            "reduced" | "5" => Ok(SchemaSelection::Reduced),
            other => Err(format!("unknown schema '{}', expected auto, full or reduced", other)),
        }
    }
}

impl fmt::Display for SchemaSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSelection::Auto => f.write_str("auto"),
            SchemaSelection::Full => f.write_str("full"),
            SchemaSelection::Reduced => f.write_str("reduced"),
        }
    }
}

/// Where a field's value comes from in a mapped row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// The layout has no column for this field.
    NotInSchema,
    /// The layout has the column but the row is too short.
    Missing,
    /// The raw cell, untouched.
    Cell(Option<&'a str>),
}

/// A data row with its cells assigned to fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRow<'a> {
    slots: [Slot<'a>; 7],
    /// Columns the layout expects.
    pub expected: usize,
    /// Cells the row actually has.
    pub found: usize,
}

impl<'a> MappedRow<'a> {
    pub fn slot(&self, field: Field) -> Slot<'a> {
        self.slots[field as usize]
    }

    /// Whether the row had fewer cells than the layout.
    pub fn is_short(&self) -> bool {
        self.found < self.expected
    }
}

/// Maps positional cells onto named fields for one layout.
#[derive(Debug, Clone, Copy)]
pub struct SchemaMapper {
    schema: ColumnSchema,
}

impl SchemaMapper {
    pub fn new(schema: ColumnSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> ColumnSchema {
        self.schema
    }

    /// Assign cells to fields. Short rows leave trailing fields missing;
    /// cells beyond the layout are ignored.
    pub fn map<'a>(&self, row: &'a RawRow) -> MappedRow<'a> {
        let mut slots = [Slot::NotInSchema; 7];

        for (index, field) in self.schema.fields().iter().enumerate() {
            slots[*field as usize] = match row.cell(index) {
                Some(cell) => Slot::Cell(cell),
                None => Slot::Missing,
            };
        }

        MappedRow {
            slots,
            expected: self.schema.width(),
            found: row.len(),
        }
    }
}
