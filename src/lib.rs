pub mod aggregate;
pub mod app;
pub mod chart;
pub mod clock;
pub mod config;
pub mod format;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod oracle;
pub mod report;
pub mod valuation;
