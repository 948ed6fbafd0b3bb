//! Filesystem round trip for the SQLite cache and stored filing names.

use chrono::{Duration, NaiveDate};
use finsent_data::cache::{CacheSource, FilingRecord, SqliteCache};
use finsent_data::edgar::{CompanyFilings, StoredFiling};

const SUBMISSIONS: &str = r#"{
    "cik": "19617",
    "name": "JPMORGAN CHASE & CO",
    "filings": {
        "recent": {
            "accessionNumber": ["0000019617-24-000100", "0000019617-24-000090", "0000019617-24-000080"],
            "form": ["10-K/A", "10-Q", "10-K"],
            "filingDate": ["2024-03-01", "2024-02-15", "2024-02-10"],
            "primaryDocument": ["jpm-a.htm", "jpm-q.htm", "jpm-k.htm"]
        }
    }
}"#;

#[test]
fn cache_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("finsent.db");

    {
        let cache = SqliteCache::new(&path).unwrap();
        cache
            .put_response("edgar:submissions:19617", CacheSource::Edgar, SUBMISSIONS)
            .unwrap();
    }

    let cache = SqliteCache::new(&path).unwrap();
    let body = cache
        .get_response("edgar:submissions:19617", Duration::days(1))
        .unwrap()
        .expect("cached body");
    let filings = CompanyFilings::from_json(&body).unwrap();
    assert_eq!(filings.name, "JPMORGAN CHASE & CO");
}

#[test]
fn stored_names_round_trip_through_index() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SqliteCache::new(dir.path().join("finsent.db")).unwrap();
    let filings = CompanyFilings::from_json(SUBMISSIONS).unwrap();

    let selected = filings.candidates(&["10-K/A", "10-K", "10-Q"]);
    assert_eq!(selected.len(), 3);

    for filing in &selected {
        let name = filing.file_name();
        let path = dir.path().join(&name);
        std::fs::write(&path, "<html></html>").unwrap();
        cache
            .record_filing(&FilingRecord {
                accession: filing.accession_number.clone(),
                cik: "19617".to_string(),
                form: filing.form.clone(),
                filing_date: filing.filing_date.to_string(),
                primary_document: filing.primary_document.clone(),
                path: path.display().to_string(),
            })
            .unwrap();

        let stem = name.trim_end_matches(".txt");
        let parsed = StoredFiling::from_stem(stem).unwrap();
        assert_eq!(parsed.form, filing.form);
        assert_eq!(
            NaiveDate::parse_from_str(&parsed.filing_date, "%Y-%m-%d").unwrap(),
            filing.filing_date
        );
    }

    let stats = cache.get_stats().unwrap();
    assert_eq!(stats.filings, 3);
    assert_eq!(stats.companies, 1);
}
