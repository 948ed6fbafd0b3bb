//! SEC EDGAR submissions data and filing selection.
//!
//! This module provides functionality to:
//! - Map ticker symbols to CIK numbers
//! - Parse the submissions API's parallel-array filing history
//! - List candidate filings and track per-form quotas
//! - Name downloaded filings on disk and recover their metadata later

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

/// Lookup table for converting ticker symbols to CIK numbers.
///
/// CIK (Central Index Key) is a unique identifier assigned by the SEC to
/// companies filing with EDGAR.
#[derive(Debug, Clone, Default)]
pub struct CikLookup {
    /// Map from ticker to (CIK, company name)
    ticker_to_cik: HashMap<String, (String, String)>,
}

/// Raw company ticker data from SEC JSON.
/// The SEC returns: {"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}
#[derive(Debug, Deserialize)]
struct CompanyTicker {
    cik_str: u64,
    ticker: String,
    title: String,
}

impl CikLookup {
    /// Parse the body of `company_tickers.json`.
    pub fn from_json(body: &str) -> Result<Self> {
        let data: HashMap<String, CompanyTicker> = serde_json::from_str(body)
            .map_err(|e| DataError::EdgarApi(format!("Failed to parse company tickers: {}", e)))?;

        let ticker_to_cik = data
            .into_values()
            .map(|c| (c.ticker.to_uppercase(), (c.cik_str.to_string(), c.title)))
            .collect();

        Ok(Self { ticker_to_cik })
    }

    /// Look up CIK by ticker symbol.
    ///
    /// # Returns
    /// Optional tuple of (CIK, company name)
    pub fn get_cik(&self, ticker: &str) -> Option<&(String, String)> {
        self.ticker_to_cik.get(&ticker.to_uppercase())
    }

    /// Number of tickers in the table.
    pub fn len(&self) -> usize {
        self.ticker_to_cik.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.ticker_to_cik.is_empty()
    }

    /// Pad CIK to 10 digits as required by SEC.
    ///
    /// SEC EDGAR submissions URLs require CIKs to be zero-padded to 10 digits.
    ///
    /// # Example
    /// ```
    /// # use finsent_data::edgar::filings::CikLookup;
    /// let padded = CikLookup::pad_cik("320193");
    /// assert_eq!(padded, "0000320193");
    /// ```
    pub fn pad_cik(cik: &str) -> String {
        format!("{:0>10}", cik)
    }

    /// Strip zero padding; archive paths use the bare number.
    ///
    /// ```
    /// # use finsent_data::edgar::filings::CikLookup;
    /// assert_eq!(CikLookup::unpad_cik("0000320193"), "320193");
    /// ```
    pub fn unpad_cik(cik: &str) -> String {
        let trimmed = cik.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Validate a CIK string: 1 to 10 ASCII digits.
    pub fn validate(cik: &str) -> Result<()> {
        if cik.is_empty() || cik.len() > 10 || !cik.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DataError::InvalidCik(cik.to_string()));
        }
        Ok(())
    }
}

/// Company filings data from SEC EDGAR submissions API.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyFilings {
    /// Central Index Key
    pub cik: String,
    /// Company name
    pub name: String,
    /// Filing history
    pub filings: FilingHistory,
}

/// Container for filing history data.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingHistory {
    /// Recent filings
    pub recent: RecentFilings,
}

/// Recent filings data.
///
/// The SEC API returns filing information as parallel arrays where
/// each index corresponds to a single filing, most recent first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    /// Accession numbers (unique filing identifiers)
    #[serde(default)]
    pub accession_number: Vec<String>,
    /// Form types (e.g., "10-K", "10-Q", "8-K")
    #[serde(default)]
    pub form: Vec<String>,
    /// Filing dates in YYYY-MM-DD format
    #[serde(default)]
    pub filing_date: Vec<String>,
    /// Primary document filenames
    #[serde(default)]
    pub primary_document: Vec<String>,
}

impl RecentFilings {
    /// Number of complete rows (arrays can disagree in length on bad data).
    fn len(&self) -> usize {
        self.accession_number
            .len()
            .min(self.form.len())
            .min(self.filing_date.len())
            .min(self.primary_document.len())
    }
}

/// Information about a specific filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingInfo {
    /// Accession number with dashes (e.g., "0000320193-23-000077")
    pub accession_number: String,
    /// Form type (e.g., "10-K", "10-Q")
    pub form: String,
    /// Filing date
    pub filing_date: NaiveDate,
    /// Primary document filename
    pub primary_document: String,
}

impl CompanyFilings {
    /// Parse a submissions API response body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| DataError::EdgarApi(format!("Failed to parse company filings: {}", e)))
    }

    /// All filings of a specific form type, most recent first.
    pub fn find_all_by_form(&self, form_type: &str) -> Vec<FilingInfo> {
        self.candidates(&[form_type])
    }

    /// Filings whose form is in `form_types`, in the order the SEC returns
    /// them (newest first).
    ///
    /// Rows with unparseable dates are skipped. Quotas are applied by the
    /// caller with a [`FormQuota`] as filings are actually stored.
    pub fn candidates<S: AsRef<str>>(&self, form_types: &[S]) -> Vec<FilingInfo> {
        let wanted: Vec<&str> = form_types.iter().map(AsRef::as_ref).collect();
        let mut selected = Vec::new();

        for i in 0..self.filings.recent.len() {
            if !wanted.contains(&self.filings.recent.form[i].as_str()) {
                continue;
            }
            match self.filing_at_index(i) {
                Ok(filing) => selected.push(filing),
                Err(e) => tracing::debug!(index = i, error = %e, "skipping malformed filing row"),
            }
        }

        selected
    }

    /// Extract filing information at a specific index.
    fn filing_at_index(&self, idx: usize) -> Result<FilingInfo> {
        let recent = &self.filings.recent;

        let filing_date = NaiveDate::parse_from_str(&recent.filing_date[idx], "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid filing date: {}", e)))?;

        Ok(FilingInfo {
            accession_number: recent.accession_number[idx].clone(),
            form: recent.form[idx].clone(),
            filing_date,
            primary_document: recent.primary_document[idx].clone(),
        })
    }
}

impl FilingInfo {
    /// Get the URL to the primary document for this filing.
    ///
    /// # Example
    /// ```
    /// # use finsent_data::edgar::filings::FilingInfo;
    /// # use chrono::NaiveDate;
    /// let filing = FilingInfo {
    ///     accession_number: "0000320193-23-000077".to_string(),
    ///     form: "10-K".to_string(),
    ///     filing_date: NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
    ///     primary_document: "aapl-20230930.htm".to_string(),
    /// };
    /// let url = filing.document_url("0000320193");
    /// assert!(url.contains("edgar/data/320193/"));
    /// ```
    pub fn document_url(&self, cik: &str) -> String {
        format!(
            "https://www.sec.gov/Archives/edgar/data/{}/{}/{}",
            CikLookup::unpad_cik(cik),
            self.accession_number.replace('-', ""),
            self.primary_document
        )
    }

    /// File name used when the filing is stored on disk:
    /// `{accession without dashes}_{form with '/' as '_'}_{YYYY-MM-DD}.txt`.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.txt",
            self.accession_number.replace('-', ""),
            self.form.replace('/', "_"),
            self.filing_date.format("%Y-%m-%d")
        )
    }
}

/// Per-form filing quota.
///
/// A slot is consumed only by a filing that ends up on disk, so a failed
/// download leaves room for the next candidate of the same form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormQuota {
    per_type: usize,
    counts: HashMap<String, usize>,
}

impl FormQuota {
    /// Quota of `per_type` filings for each form in `form_types`.
    pub fn new<S: AsRef<str>>(form_types: &[S], per_type: usize) -> Self {
        Self {
            per_type,
            counts: form_types.iter().map(|f| (f.as_ref().to_string(), 0)).collect(),
        }
    }

    /// Whether `form` is tracked and still has an open slot.
    pub fn wants(&self, form: &str) -> bool {
        self.counts.get(form).is_some_and(|&n| n < self.per_type)
    }

    /// Count a stored filing of `form`.
    pub fn record(&mut self, form: &str) {
        if let Some(n) = self.counts.get_mut(form) {
            *n += 1;
        }
    }

    /// Filings counted so far for `form`.
    pub fn count(&self, form: &str) -> usize {
        self.counts.get(form).copied().unwrap_or(0)
    }

    /// True once every tracked form is full.
    pub fn is_complete(&self) -> bool {
        self.counts.values().all(|&n| n >= self.per_type)
    }
}

/// Metadata recovered from a stored filing's file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFiling {
    /// Accession number without dashes
    pub accession_number: String,
    /// Form type, with `_` mapped back to `/` (e.g. "10-K/A")
    pub form: String,
    /// Filing date as written in the name
    pub filing_date: String,
}

impl StoredFiling {
    /// Parse a stem produced by [`FilingInfo::file_name`].
    ///
    /// The accession number is the first segment and the date the last, so
    /// amended forms like `10-K_A` survive the round trip.
    pub fn from_stem(stem: &str) -> Option<Self> {
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 3 {
            return None;
        }
        let accession_number = parts[0].to_string();
        let filing_date = parts[parts.len() - 1].to_string();
        let form = parts[1..parts.len() - 1].join("/");
        if accession_number.is_empty() || form.is_empty() || filing_date.is_empty() {
            return None;
        }
        Some(Self {
            accession_number,
            form,
            filing_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_filings() -> CompanyFilings {
        let body = r#"{
            "cik": "320193",
            "name": "Apple Inc.",
            "filings": {
                "recent": {
                    "accessionNumber": ["a-1", "a-2", "a-3", "a-4", "a-5", "a-6", "a-7"],
                    "form": ["8-K", "10-Q", "10-Q", "4", "10-K", "10-Q", "8-K"],
                    "filingDate": ["2024-05-03", "2024-05-02", "2024-02-02", "2024-01-15", "2023-11-03", "bad-date", "2023-08-01"],
                    "primaryDocument": ["d1.htm", "d2.htm", "d3.htm", "d4.xml", "d5.htm", "d6.htm", "d7.htm"]
                }
            }
        }"#;
        CompanyFilings::from_json(body).unwrap()
    }

    #[rstest]
    #[case("320193", "0000320193")]
    #[case("1234", "0000001234")]
    #[case("1234567890", "1234567890")]
    fn test_pad_cik(#[case] cik: &str, #[case] expected: &str) {
        assert_eq!(CikLookup::pad_cik(cik), expected);
    }

    #[rstest]
    #[case("0000320193", "320193")]
    #[case("19617", "19617")]
    #[case("0000000000", "0")]
    fn test_unpad_cik(#[case] cik: &str, #[case] expected: &str) {
        assert_eq!(CikLookup::unpad_cik(cik), expected);
    }

    #[test]
    fn test_validate_cik() {
        assert!(CikLookup::validate("320193").is_ok());
        assert!(CikLookup::validate("0000320193").is_ok());
        assert!(matches!(CikLookup::validate(""), Err(DataError::InvalidCik(_))));
        assert!(matches!(CikLookup::validate("AAPL"), Err(DataError::InvalidCik(_))));
        assert!(matches!(CikLookup::validate("12345678901"), Err(DataError::InvalidCik(_))));
    }

    #[test]
    fn test_cik_lookup_from_json() {
        let body = r#"{"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
                       "1": {"cik_str": 789019, "ticker": "msft", "title": "MICROSOFT CORP"}}"#;
        let lookup = CikLookup::from_json(body).unwrap();
        assert_eq!(lookup.len(), 2);
        let (cik, name) = lookup.get_cik("aapl").unwrap();
        assert_eq!(cik, "320193");
        assert_eq!(name, "Apple Inc.");
        assert!(lookup.get_cik("MSFT").is_some());
        assert!(lookup.get_cik("NOPE").is_none());
    }

    #[test]
    fn test_document_url() {
        let filing = FilingInfo {
            accession_number: "0000320193-23-000077".to_string(),
            form: "10-K".to_string(),
            filing_date: NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
            primary_document: "aapl-20230930.htm".to_string(),
        };

        assert_eq!(
            filing.document_url("320193"),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000077/aapl-20230930.htm"
        );
        assert_eq!(filing.file_name(), "000032019323000077_10-K_2023-11-03.txt");
    }

    #[test]
    fn test_candidates_keep_recency_order() {
        let filings = sample_filings();
        let candidates = filings.candidates(&["10-K", "10-Q", "8-K"]);

        let accessions: Vec<&str> = candidates.iter().map(|f| f.accession_number.as_str()).collect();
        assert_eq!(accessions, vec!["a-1", "a-2", "a-3", "a-5", "a-7"]);
        assert_eq!(candidates[1].form, "10-Q");
    }

    #[test]
    fn test_candidates_skip_bad_rows_and_other_forms() {
        let filings = sample_filings();
        let selected = filings.candidates(&["10-Q"]);
        let accessions: Vec<&str> = selected.iter().map(|f| f.accession_number.as_str()).collect();
        // a-6 has an unparseable date
        assert_eq!(accessions, vec!["a-2", "a-3"]);

        assert!(filings.find_all_by_form("S-1").is_empty());
    }

    #[test]
    fn test_form_quota_counts_only_recorded_filings() {
        let mut quota = FormQuota::new(&["10-K", "10-Q"], 1);
        assert!(quota.wants("10-K"));
        assert!(!quota.wants("8-K"));
        assert!(!quota.is_complete());

        quota.record("10-K");
        quota.record("8-K");
        assert!(!quota.wants("10-K"));
        assert_eq!(quota.count("10-K"), 1);
        assert_eq!(quota.count("8-K"), 0);
        assert!(quota.wants("10-Q"));

        quota.record("10-Q");
        assert!(quota.is_complete());
    }

    #[test]
    fn test_mismatched_arrays_truncate() {
        let body = r#"{"cik": "1", "name": "X", "filings": {"recent": {
            "accessionNumber": ["a", "b"], "form": ["10-K"],
            "filingDate": ["2024-01-01", "2024-01-02"], "primaryDocument": ["x", "y"]}}}"#;
        let filings = CompanyFilings::from_json(body).unwrap();
        assert_eq!(filings.candidates(&["10-K"]).len(), 1);
    }

    #[rstest]
    #[case("000032019323000077_10-K_2023-11-03", "10-K", "2023-11-03")]
    #[case("000032019323000077_10-K_A_2023-11-03", "10-K/A", "2023-11-03")]
    #[case("000001961724000001_8-K_2024-01-12", "8-K", "2024-01-12")]
    fn test_stored_filing_from_stem(#[case] stem: &str, #[case] form: &str, #[case] date: &str) {
        let parsed = StoredFiling::from_stem(stem).unwrap();
        assert_eq!(parsed.form, form);
        assert_eq!(parsed.filing_date, date);
    }

    #[test]
    fn test_stored_filing_rejects_short_stems() {
        assert!(StoredFiling::from_stem("notes").is_none());
        assert!(StoredFiling::from_stem("a_b").is_none());
    }
}
