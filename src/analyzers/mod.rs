pub mod query_engine;
pub mod query_report;

pub use query_engine::QueryEngine;
pub use query_report::QueryReport;
