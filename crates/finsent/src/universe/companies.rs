//! Companies whose filings are collected.

use serde::{Deserialize, Serialize};

/// A filer, identified by CIK or by ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Display name.
    pub name: String,
    /// Central Index Key, unpadded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    /// Exchange ticker, used to look up the CIK when it is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

impl Company {
    /// Company with a known CIK and ticker.
    pub fn new(name: impl Into<String>, cik: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cik: Some(cik.into()),
            ticker: Some(ticker.into()),
        }
    }
}

/// The default wealth-management universe.
#[derive(Debug, Clone)]
pub struct CompanyUniverse {
    companies: Vec<Company>,
}

impl Default for CompanyUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanyUniverse {
    /// Universe with the default companies.
    pub fn new() -> Self {
        Self {
            companies: Self::default_companies(),
        }
    }

    /// Universe with the given companies, or the defaults if none are given.
    pub fn from_companies(companies: Vec<Company>) -> Self {
        if companies.is_empty() {
            Self::new()
        } else {
            Self { companies }
        }
    }

    /// Companies in collection order.
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    fn default_companies() -> Vec<Company> {
        vec![
            Company::new("Apple", "320193", "AAPL"),
            Company::new("Amazon", "1018724", "AMZN"),
            Company::new("Google", "1652044", "GOOGL"),
            Company::new("Microsoft", "789019", "MSFT"),
            Company::new("Tesla", "1326801", "TSLA"),
            Company::new("JPMorgan Chase", "19617", "JPM"),
            Company::new("Bank of America", "70858", "BAC"),
            Company::new("Goldman Sachs", "886982", "GS"),
            Company::new("BlackRock", "1364742", "BLK"),
            Company::new("Berkshire Hathaway", "1067983", "BRK-B"),
        ]
    }
}
