//! Cell and row rules for fiscal report tables.

pub mod amounts;
pub mod cells;
pub mod patterns;
pub mod rows;
pub mod schema;

pub use amounts::{format_brl_amount, parse_brl_amount, AmountStep, MonetaryParser, ParsedAmount, BRL_NORMALIZATION};
pub use cells::{sanitize_access_key, sanitize_cell, LineBreak};
pub use rows::{RowClass, RowClassifier};
pub use schema::{ColumnSchema, MappedRow, SchemaMapper, SchemaSelection, Slot};
