//! Data models: raw page tables in, canonical fiscal records out.

pub mod config;
pub mod document;
pub mod record;
