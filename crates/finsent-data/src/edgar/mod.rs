//! SEC EDGAR data fetching.
//!
//! This module provides access to SEC EDGAR filings including:
//! - Company CIK lookup from ticker symbols
//! - Submissions history and per-form filing selection
//! - Primary document download
//!
//! # Example
//!
//! ```no_run
//! use finsent_data::edgar::EdgarClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new("Jane Doe jane@example.com")?;
//!     let cik = client.get_company_cik("AAPL").await?;
//!     let filings = client.get_company_filings(&cik).await?;
//!
//!     for filing in filings.candidates(&["10-K", "10-Q"]).into_iter().take(2) {
//!         let html = client.get_filing_document(&cik, &filing).await?;
//!         println!("{} {} ({} bytes)", filing.form, filing.filing_date, html.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod filings;

pub use client::{DEFAULT_RATE_LIMIT, EdgarClient};
pub use filings::{
    CikLookup, CompanyFilings, FilingHistory, FilingInfo, FormQuota, RecentFilings, StoredFiling,
};
