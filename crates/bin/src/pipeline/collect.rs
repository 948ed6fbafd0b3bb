//! Data collection: SEC filings, FRED indicators and policy uncertainty.
//!
//! Each phase writes its raw output under the data layout before the next
//! one starts. Failures on a single company, filing or series are logged
//! and skipped; a phase fails only when it cannot run at all or produces
//! nothing.

use super::cache_manager::ResponseCache;
use chrono::{NaiveDate, Utc};
use finsent::universe::Company;
use finsent::{Config, DataLayout, count_files};
use finsent_corpus::economic::{describe_indicator, policy_context};
use finsent_corpus::prepare::COMBINED_ECONOMIC_CONTEXT;
use finsent_data::cache::{CacheSource, FilingRecord};
use finsent_data::edgar::{CikLookup, CompanyFilings, EdgarClient, FilingInfo, FormQuota};
use finsent_data::error::DataError;
use finsent_data::fred::{
    DEFAULT_INDICATORS, DEFAULT_POLICY_SERIES, FredClient, ObservationQuery, SeriesInfo,
    frame_points, observations_frame, parse_observations, parse_series_info, tag_series,
};
use finsent_output::{CollectionSummary, PhaseResult};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use serde::Serialize;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Observations fetched per economic indicator.
const INDICATOR_OBSERVATIONS: usize = 24;

/// Raw policy uncertainty observations.
pub(crate) const POLICY_DATA_CSV: &str = "policy_uncertainty_data.csv";

/// Policy uncertainty context sentences.
pub(crate) const POLICY_CONTEXT_JSON: &str = "policy_uncertainty_context.json";

/// Policy uncertainty download summary.
pub(crate) const POLICY_SUMMARY_JSON: &str = "download_summary.json";

const SEC_PHASE: &str = "SEC filings";
const FRED_PHASE: &str = "FRED data";
const POLICY_PHASE: &str = "Policy uncertainty";

/// Error type for collection phases.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CollectError {
    /// Client or parsing error.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    /// Polars DataFrame error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The phase produced no output.
    #[error("No {0} data was downloaded")]
    NoData(&'static str),
}

/// Which collection phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Phases {
    pub sec: bool,
    pub fred: bool,
    pub policy: bool,
}

impl Phases {
    /// Selected phases; no selection means all of them.
    pub(crate) const fn from_flags(sec: bool, fred: bool, policy: bool) -> Self {
        if !sec && !fred && !policy {
            Self {
                sec: true,
                fred: true,
                policy: true,
            }
        } else {
            Self { sec, fred, policy }
        }
    }
}

/// Run the selected phases in order and summarize what is on disk.
pub(crate) async fn run_collection(
    config: &Config,
    phases: Phases,
    cache: &ResponseCache,
) -> CollectionSummary {
    let start = Instant::now();
    let layout = config.layout();
    let mut results = Vec::with_capacity(3);

    tracing::info!(root = %layout.root().display(), "starting data collection");

    results.push(if phases.sec {
        tracing::info!("=== PHASE 1: SEC EDGAR filings ===");
        match collect_sec(config, &layout, cache).await {
            Ok(stats) => {
                tracing::info!(
                    downloaded = stats.downloaded,
                    existing = stats.existing,
                    failed = stats.failed,
                    "SEC filings collection completed"
                );
                PhaseResult::succeeded(SEC_PHASE)
            }
            Err(e) => {
                tracing::error!(error = %e, "SEC filings collection failed");
                PhaseResult::failed(SEC_PHASE, e)
            }
        }
    } else {
        PhaseResult::skipped(SEC_PHASE, "not requested")
    });

    let api_key = config.fred_api_key();
    if api_key.is_none() && (phases.fred || phases.policy) {
        tracing::warn!("FRED API key not configured, skipping FRED and policy uncertainty collection");
        tracing::info!("Get a free key at https://fred.stlouisfed.org/docs/api/api_key.html and set api_keys.fred or FRED_API_KEY");
    }

    results.push(match (phases.fred, api_key) {
        (false, _) => PhaseResult::skipped(FRED_PHASE, "not requested"),
        (true, None) => PhaseResult::skipped(FRED_PHASE, "no FRED API key"),
        (true, Some(key)) => {
            tracing::info!("=== PHASE 2: FRED economic data ===");
            match collect_fred(config, key, &layout, cache).await {
                Ok(texts) => {
                    tracing::info!(descriptions = texts, "FRED data collection completed");
                    PhaseResult::succeeded(FRED_PHASE)
                }
                Err(e) => {
                    tracing::error!(error = %e, "FRED data collection failed");
                    PhaseResult::failed(FRED_PHASE, e)
                }
            }
        }
    });

    results.push(match (phases.policy, api_key) {
        (false, _) => PhaseResult::skipped(POLICY_PHASE, "not requested"),
        (true, None) => PhaseResult::skipped(POLICY_PHASE, "no FRED API key"),
        (true, Some(key)) => {
            tracing::info!("=== PHASE 3: Policy uncertainty data ===");
            match collect_policy(config, key, &layout, cache).await {
                Ok(texts) => {
                    tracing::info!(descriptions = texts, "policy uncertainty collection completed");
                    PhaseResult::succeeded(POLICY_PHASE)
                }
                Err(e) => {
                    tracing::error!(error = %e, "policy uncertainty collection failed");
                    PhaseResult::failed(POLICY_PHASE, e)
                }
            }
        }
    });

    let summary = summarize(&layout, results, start.elapsed());
    tracing::info!(
        duration_secs = summary.duration_secs,
        successful = summary.successful_phases(),
        phases = summary.phases.len(),
        "collection complete"
    );
    summary
}

/// Count collected files per source.
pub(crate) fn summarize(
    layout: &DataLayout,
    phases: Vec<PhaseResult>,
    elapsed: Duration,
) -> CollectionSummary {
    CollectionSummary {
        phases,
        sec_files: count_files(&layout.sec_filings_dir(), &["txt"]),
        fred_files: count_files(&layout.fred_data_dir(), &["json", "txt"]),
        policy_files: count_files(&layout.policy_dir(), &["json", "csv"]),
        duration_secs: elapsed.as_secs_f64(),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SecStats {
    downloaded: usize,
    existing: usize,
    failed: usize,
}

impl SecStats {
    fn add(&mut self, other: Self) {
        self.downloaded += other.downloaded;
        self.existing += other.existing;
        self.failed += other.failed;
    }
}

async fn collect_sec(
    config: &Config,
    layout: &DataLayout,
    cache: &ResponseCache,
) -> Result<SecStats, CollectError> {
    if config.uses_default_user_agent() {
        tracing::warn!("using the example SEC user agent; set user_agents.sec to your name and email");
    }
    let client = EdgarClient::with_rate_limit(&config.user_agents.sec, config.rate_limits.sec_interval())?;
    let dir = layout.sec_filings_dir();
    fs::create_dir_all(&dir)?;

    let universe = config.collection.universe();
    let companies = universe.companies().to_vec();
    let form_types = &config.collection.form_types;
    let per_type = config.collection.filings_per_type;
    let concurrency = config.collection.concurrency;

    let pb = ProgressBar::new(companies.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| CollectError::Io(std::io::Error::other(e)))?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Fetching filings for {} companies ({} concurrent)...",
        companies.len(),
        concurrency
    ));

    let mut totals = SecStats::default();
    let mut failed_companies = 0;
    let results: Vec<(String, Result<SecStats, CollectError>)> = stream::iter(companies)
        .map(|company| {
            let client = &client;
            let dir = dir.as_path();
            async move {
                let result =
                    collect_company(client, cache, &company, form_types, per_type, dir).await;
                (company.name, result)
            }
        })
        .buffer_unordered(concurrency)
        .inspect(|_| pb.inc(1))
        .collect()
        .await;

    for (name, result) in results {
        match result {
            Ok(stats) => {
                tracing::info!(
                    company = %name,
                    downloaded = stats.downloaded,
                    existing = stats.existing,
                    "collected filings"
                );
                totals.add(stats);
            }
            Err(e) => {
                pb.suspend(|| tracing::warn!(company = %name, error = %e, "failed to collect filings"));
                failed_companies += 1;
            }
        }
    }
    pb.finish_with_message(format!(
        "Downloaded {} filings ({} already on disk)",
        totals.downloaded, totals.existing
    ));

    if failed_companies > 0 && failed_companies == universe.companies().len() {
        return Err(CollectError::NoData("SEC filing"));
    }
    Ok(totals)
}

async fn resolve_cik(
    client: &EdgarClient,
    cache: &ResponseCache,
    company: &Company,
) -> Result<String, CollectError> {
    if let Some(cik) = &company.cik {
        CikLookup::validate(cik)?;
        return Ok(CikLookup::unpad_cik(cik));
    }
    let Some(ticker) = company.ticker.as_deref() else {
        return Err(DataError::CikNotFound(company.name.clone()).into());
    };
    if let Some(cik) = cache.get_cik(ticker).await {
        return Ok(cik);
    }
    let cik = CikLookup::unpad_cik(&client.get_company_cik(ticker).await?);
    cache.put_cik(ticker, &cik, &company.name).await;
    Ok(cik)
}

async fn collect_company(
    client: &EdgarClient,
    cache: &ResponseCache,
    company: &Company,
    form_types: &[String],
    per_type: usize,
    dir: &Path,
) -> Result<SecStats, CollectError> {
    let cik = resolve_cik(client, cache, company).await?;
    let key = format!("edgar:submissions:{}", CikLookup::pad_cik(&cik));
    let body = cache
        .get_or_fetch(&key, CacheSource::Edgar, || client.get_submissions_json(&cik))
        .await?;
    let filings = CompanyFilings::from_json(&body)?;

    let cik_ref = cik.as_str();
    let (stats, saved) = download_filings(
        &company.name,
        filings.candidates(form_types),
        FormQuota::new(form_types, per_type),
        dir,
        move |filing: FilingInfo| async move { client.get_filing_document(cik_ref, &filing).await },
    )
    .await?;

    for (filing, path) in saved {
        cache
            .record_filing(&FilingRecord {
                accession: filing.accession_number,
                cik: cik.clone(),
                form: filing.form,
                filing_date: filing.filing_date.format("%Y-%m-%d").to_string(),
                primary_document: filing.primary_document,
                path: path.display().to_string(),
            })
            .await;
    }
    Ok(stats)
}

/// Store filings from `candidates` (newest first) until `quota` is full.
///
/// Filings already on disk and successful downloads consume the quota; a
/// failed download is logged and the next candidate of that form is tried.
/// Returns the stats and the newly written filings.
async fn download_filings<F, Fut>(
    company: &str,
    candidates: Vec<FilingInfo>,
    mut quota: FormQuota,
    dir: &Path,
    mut fetch: F,
) -> Result<(SecStats, Vec<(FilingInfo, PathBuf)>), CollectError>
where
    F: FnMut(FilingInfo) -> Fut,
    Fut: Future<Output = Result<String, DataError>>,
{
    let mut stats = SecStats::default();
    let mut saved = Vec::new();

    for filing in candidates {
        if quota.is_complete() {
            break;
        }
        if !quota.wants(&filing.form) {
            continue;
        }
        let path = dir.join(filing.file_name());
        if path.exists() {
            tracing::debug!(file = %path.display(), "filing already on disk");
            quota.record(&filing.form);
            stats.existing += 1;
            continue;
        }
        match fetch(filing.clone()).await {
            Ok(document) => {
                fs::write(&path, document)?;
                tracing::debug!(company, form = %filing.form, date = %filing.filing_date, "saved filing");
                quota.record(&filing.form);
                stats.downloaded += 1;
                saved.push((filing, path));
            }
            Err(e) => {
                tracing::warn!(
                    company,
                    accession = %filing.accession_number,
                    error = %e,
                    "failed to download filing"
                );
                stats.failed += 1;
            }
        }
    }
    Ok((stats, saved))
}

async fn fetch_series_info(
    client: &FredClient,
    cache: &ResponseCache,
    source: CacheSource,
    series_id: &str,
) -> Result<SeriesInfo, DataError> {
    let key = format!("fred:series:{series_id}");
    let body = cache
        .get_or_fetch(&key, source, || client.series_info_raw(series_id))
        .await?;
    parse_series_info(series_id, &body)
}

async fn fetch_observations(
    client: &FredClient,
    cache: &ResponseCache,
    source: CacheSource,
    series_id: &str,
    query: ObservationQuery,
) -> Result<String, DataError> {
    cache
        .get_or_fetch(&query.cache_key(series_id), source, || {
            client.observations_raw(series_id, query)
        })
        .await
}

#[derive(Serialize)]
struct IndicatorFile<'a> {
    indicator: &'a finsent_data::fred::Indicator,
    series_info: &'a SeriesInfo,
    series_data: serde_json::Value,
    text_descriptions: &'a [String],
}

async fn collect_fred(
    config: &Config,
    api_key: &str,
    layout: &DataLayout,
    cache: &ResponseCache,
) -> Result<usize, CollectError> {
    let client = FredClient::with_rate_limit(api_key, config.rate_limits.fred_interval())?;
    let dir = layout.fred_data_dir();
    fs::create_dir_all(&dir)?;

    let mut all_texts = Vec::new();
    for indicator in &DEFAULT_INDICATORS {
        let id = indicator.series_id;
        tracing::info!(indicator = indicator.name, series_id = id, "processing indicator");

        let info = match fetch_series_info(&client, cache, CacheSource::Fred, id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(series_id = id, error = %e, "could not fetch series metadata");
                continue;
            }
        };
        let query = ObservationQuery::latest(INDICATOR_OBSERVATIONS);
        let body = match fetch_observations(&client, cache, CacheSource::Fred, id, query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(series_id = id, error = %e, "could not fetch observations");
                continue;
            }
        };
        let observations = parse_observations(&body)?;

        let texts = describe_indicator(indicator, &observations);
        if texts.is_empty() {
            tracing::warn!(series_id = id, "no text descriptions generated");
            continue;
        }

        let file = IndicatorFile {
            indicator,
            series_info: &info,
            series_data: serde_json::from_str(&body)?,
            text_descriptions: &texts,
        };
        fs::write(dir.join(indicator.file_name()), serde_json::to_string_pretty(&file)?)?;
        tracing::info!(series_id = id, descriptions = texts.len(), "generated text descriptions");
        all_texts.extend(texts);
    }

    if all_texts.is_empty() {
        return Err(CollectError::NoData("FRED"));
    }

    let combined: String = all_texts.iter().map(|t| format!("{t}\n\n")).collect();
    fs::write(dir.join(COMBINED_ECONOMIC_CONTEXT), combined)?;
    Ok(all_texts.len())
}

#[derive(Debug, Serialize)]
struct DateRange {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct PolicyDownloadSummary {
    download_date: String,
    total_series: usize,
    total_observations: usize,
    date_range: DateRange,
    series_included: Vec<&'static str>,
    context_descriptions_count: usize,
}

#[derive(Debug, Serialize)]
struct PolicyRow<'a> {
    date: &'a str,
    value: f64,
    series_id: &'a str,
    series_name: &'a str,
}

/// Write a tagged observations frame as CSV. Returns the rows written.
pub(crate) fn write_policy_csv(df: &DataFrame, path: &Path) -> Result<usize, CollectError> {
    let dates = df.column("date")?.cast(&DataType::String)?;
    let dates = dates.str()?;
    let values = df.column("value")?.f64()?;
    let ids = df.column("series_id")?.str()?;
    let names = df.column("series_name")?.str()?;

    let mut wtr = csv::Writer::from_path(path)?;
    let mut rows = 0;
    for i in 0..df.height() {
        let (Some(date), Some(value), Some(series_id), Some(series_name)) =
            (dates.get(i), values.get(i), ids.get(i), names.get(i))
        else {
            continue;
        };
        wtr.serialize(PolicyRow {
            date,
            value,
            series_id,
            series_name,
        })?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

async fn collect_policy(
    config: &Config,
    api_key: &str,
    layout: &DataLayout,
    cache: &ResponseCache,
) -> Result<usize, CollectError> {
    let client = FredClient::with_rate_limit(api_key, config.rate_limits.policy_interval())?;
    let dir = layout.policy_dir();
    fs::create_dir_all(&dir)?;

    let mut combined: Option<DataFrame> = None;
    let mut contexts = Vec::new();
    let mut total_series = 0;
    let mut range: Option<(NaiveDate, NaiveDate)> = None;

    for series in &DEFAULT_POLICY_SERIES {
        let id = series.series_id;
        tracing::info!(series = series.name, series_id = id, "processing policy series");

        let info = match fetch_series_info(&client, cache, CacheSource::Policy, id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(series_id = id, error = %e, "could not fetch series metadata, skipping");
                continue;
            }
        };
        let query = ObservationQuery::full_history();
        let body = match fetch_observations(&client, cache, CacheSource::Policy, id, query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(series_id = id, error = %e, "could not fetch observations, skipping");
                continue;
            }
        };

        let frame = observations_frame(&parse_observations(&body)?)?;
        if frame.height() == 0 {
            tracing::warn!(series_id = id, "no data to process");
            continue;
        }
        let points = frame_points(&frame)?;
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            range = Some(match range {
                Some((start, end)) => (start.min(first.0), end.max(last.0)),
                None => (first.0, last.0),
            });
        }

        let context = policy_context(info.title.as_deref(), &points);
        tracing::info!(series_id = id, descriptions = context.len(), "generated context descriptions");
        contexts.extend(context);

        let tagged = tag_series(frame, id, series.name)?;
        match combined.as_mut() {
            Some(df) => {
                df.vstack_mut(&tagged)?;
            }
            None => combined = Some(tagged),
        }
        total_series += 1;
    }

    let (Some(combined), Some((start, end))) = (combined, range) else {
        return Err(CollectError::NoData("policy uncertainty"));
    };

    let rows = write_policy_csv(&combined, &dir.join(POLICY_DATA_CSV))?;
    fs::write(
        dir.join(POLICY_CONTEXT_JSON),
        serde_json::to_string_pretty(&contexts)?,
    )?;

    let summary = PolicyDownloadSummary {
        download_date: Utc::now().to_rfc3339(),
        total_series,
        total_observations: rows,
        date_range: DateRange {
            start: start.format("%Y-%m-%d").to_string(),
            end: end.format("%Y-%m-%d").to_string(),
        },
        series_included: DEFAULT_POLICY_SERIES.iter().map(|s| s.series_id).collect(),
        context_descriptions_count: contexts.len(),
    };
    fs::write(
        dir.join(POLICY_SUMMARY_JSON),
        serde_json::to_string_pretty(&summary)?,
    )?;
    tracing::info!(dir = %dir.display(), observations = rows, "saved policy uncertainty data");

    Ok(contexts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsent_data::fred::Observation;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    fn filing(accession: &str, form: &str, date: &str) -> FilingInfo {
        FilingInfo {
            accession_number: accession.to_string(),
            form: form.to_string(),
            filing_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            primary_document: format!("{accession}.htm"),
        }
    }

    fn sample_candidates() -> Vec<FilingInfo> {
        vec![
            filing("k-1", "10-K", "2024-11-01"),
            filing("q-1", "10-Q", "2024-08-01"),
            filing("k-2", "10-K", "2023-11-01"),
            filing("k-3", "10-K", "2022-11-01"),
        ]
    }

    #[tokio::test]
    async fn test_failed_download_leaves_quota_open() {
        let dir = tempfile::tempdir().unwrap();
        let forms = ["10-K".to_string(), "10-Q".to_string()];
        let mut requested = Vec::new();

        let (stats, saved) = download_filings(
            "Apple",
            sample_candidates(),
            FormQuota::new(&forms, 1),
            dir.path(),
            |f: FilingInfo| {
                requested.push(f.accession_number.clone());
                async move {
                    if f.accession_number == "k-1" {
                        Err(DataError::Parse("boom".to_string()))
                    } else {
                        Ok(format!("<html>{}</html>", f.accession_number))
                    }
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(requested, vec!["k-1", "q-1", "k-2"]);
        assert_eq!(stats, SecStats { downloaded: 2, existing: 0, failed: 1 });
        let accessions: Vec<&str> = saved.iter().map(|(f, _)| f.accession_number.as_str()).collect();
        assert_eq!(accessions, vec!["q-1", "k-2"]);
        assert!(dir.path().join(sample_candidates()[2].file_name()).is_file());
        assert!(!dir.path().join(sample_candidates()[0].file_name()).exists());
    }

    #[tokio::test]
    async fn test_files_on_disk_count_toward_quota() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = sample_candidates();
        fs::write(dir.path().join(candidates[0].file_name()), "old").unwrap();
        let mut requested = Vec::new();

        let (stats, saved) = download_filings(
            "Apple",
            candidates,
            FormQuota::new(&["10-K"], 2),
            dir.path(),
            |f: FilingInfo| {
                requested.push(f.accession_number.clone());
                async { Ok::<_, DataError>("<html></html>".to_string()) }
            },
        )
        .await
        .unwrap();

        assert_eq!(requested, vec!["k-2"]);
        assert_eq!(stats, SecStats { downloaded: 1, existing: 1, failed: 0 });
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn test_phase_flags() {
        assert_eq!(
            Phases::from_flags(false, false, false),
            Phases {
                sec: true,
                fred: true,
                policy: true
            }
        );
        assert_eq!(
            Phases::from_flags(false, true, false),
            Phases {
                sec: false,
                fred: true,
                policy: false
            }
        );
    }

    #[test]
    fn test_write_policy_csv() {
        let dir = tempfile::tempdir().unwrap();
        let monthly = observations_frame(&[obs("2024-02-01", "150.5"), obs("2024-01-01", ".")]).unwrap();
        let mut df = tag_series(monthly, "USEPUINDXM", "US_Monthly").unwrap();
        let global = observations_frame(&[obs("2024-01-01", "200")]).unwrap();
        df.vstack_mut(&tag_series(global, "GEPUCURRENT", "Global").unwrap())
            .unwrap();

        let path = dir.path().join(POLICY_DATA_CSV);
        assert_eq!(write_policy_csv(&df, &path).unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,value,series_id,series_name");
        assert_eq!(lines[1], "2024-02-01,150.5,USEPUINDXM,US_Monthly");
        assert_eq!(lines[2], "2024-01-01,200.0,GEPUCURRENT,Global");
    }

    #[test]
    fn test_summarize_counts_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        layout.create_all().unwrap();
        fs::write(layout.sec_filings_dir().join("a_10-K_2024-01-01.txt"), "x").unwrap();
        fs::write(layout.policy_dir().join(POLICY_DATA_CSV), "x").unwrap();
        fs::write(layout.policy_dir().join(POLICY_SUMMARY_JSON), "{}").unwrap();

        let summary = summarize(
            &layout,
            vec![PhaseResult::succeeded(SEC_PHASE)],
            Duration::from_secs(2),
        );
        assert_eq!(summary.sec_files, 1);
        assert_eq!(summary.fred_files, 0);
        assert_eq!(summary.policy_files, 2);
        assert_eq!(summary.successful_phases(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_skips_fred_phases() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.data_dir = dir.path().to_path_buf();

        let phases = Phases {
            sec: false,
            fred: true,
            policy: true,
        };
        let summary = run_collection(&config, phases, &ResponseCache::disabled()).await;
        assert_eq!(summary.successful_phases(), 0);
        assert!(
            summary.phases[1..]
                .iter()
                .all(|p| p.detail.as_deref() == Some("no FRED API key"))
        );
    }
}
