//! Observation tables as polars DataFrames.

use super::series::Observation;
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use polars::prelude::*;

/// Build a `date`/`value` frame from raw observations.
///
/// Missing values are dropped and rows are sorted by date ascending.
pub fn observations_frame(observations: &[Observation]) -> Result<DataFrame> {
    let dates: Vec<&str> = observations.iter().map(|o| o.date.as_str()).collect();
    let values: Vec<Option<f64>> = observations.iter().map(Observation::numeric).collect();

    let df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("value".into(), values).into(),
    ])?;

    let df = df
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .filter(col("value").is_not_null().and(col("date").is_not_null()))
        .sort(["date"], SortMultipleOptions::default())
        .collect()?;

    Ok(df)
}

/// Tag a policy series frame with its id and name.
pub fn tag_series(df: DataFrame, series_id: &str, series_name: &str) -> Result<DataFrame> {
    let df = df
        .lazy()
        .with_columns([
            lit(series_id).alias("series_id"),
            lit(series_name).alias("series_name"),
        ])
        .collect()?;
    Ok(df)
}

/// Extract `(date, value)` pairs from a frame built by [`observations_frame`].
pub fn frame_points(df: &DataFrame) -> Result<Vec<(NaiveDate, f64)>> {
    let dates = df.column("date")?.cast(&DataType::String)?;
    let dates = dates.str()?;
    let values = df.column("value")?.f64()?;

    let mut points = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(date), Some(value)) = (dates.get(i), values.get(i)) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid observation date {}: {}", date, e)))?;
        points.push((date, value));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_observations_frame_drops_missing_and_sorts() {
        let raw = vec![
            obs("2024-03-01", "120.5"),
            obs("2024-02-01", "."),
            obs("2024-01-01", "99.25"),
        ];
        let df = observations_frame(&raw).unwrap();
        assert_eq!(df.height(), 2);

        let points = frame_points(&df).unwrap();
        assert_eq!(points[0].0, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_relative_eq!(points[0].1, 99.25);
        assert_relative_eq!(points[1].1, 120.5);
    }

    #[test]
    fn test_tag_series() {
        let df = observations_frame(&[obs("2024-01-01", "1.0")]).unwrap();
        let df = tag_series(df, "USEPUINDXM", "US_Economic_Policy_Uncertainty_Monthly").unwrap();
        assert_eq!(df.width(), 4);
        let ids = df.column("series_id").unwrap().str().unwrap().get(0);
        assert_eq!(ids, Some("USEPUINDXM"));
    }

    #[test]
    fn test_empty_input() {
        let df = observations_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert!(frame_points(&df).unwrap().is_empty());
    }
}
