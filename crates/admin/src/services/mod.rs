//! Back-office services.
//!
//! - `analytics` - Dashboard figures from the raw aggregates
//! - `campaigns` - Newsletter delivery with bounded concurrency
//! - `csv` - CSV documents for the exports
//!
//! Email and uploads are the storefront's services.

pub mod analytics;
pub mod campaigns;
pub mod csv;

pub use campaigns::{CampaignReport, send_campaign};
pub use csv::CsvWriter;
