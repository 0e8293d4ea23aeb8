// Adapters layer: concrete implementations for external systems (tracking API, spreadsheet files).

pub mod http;
pub mod spreadsheet;
