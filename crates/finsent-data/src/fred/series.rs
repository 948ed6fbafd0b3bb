//! FRED series definitions and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An economic indicator tracked for context text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Indicator {
    /// Short key used in file names (`{key lowercased}_data.json`)
    #[serde(skip)]
    pub key: &'static str,
    /// FRED series id
    pub series_id: &'static str,
    /// Human readable name
    pub name: &'static str,
    /// Publication frequency
    pub frequency: &'static str,
    /// One-sentence description, used verbatim in generated text
    pub description: &'static str,
}

impl Indicator {
    /// File name of the per-indicator JSON output.
    pub fn file_name(&self) -> String {
        format!("{}_data.json", self.key.to_lowercase())
    }
}

/// The six indicators collected by default.
pub const DEFAULT_INDICATORS: [Indicator; 6] = [
    Indicator {
        key: "GDP",
        series_id: "GDP",
        name: "Gross Domestic Product",
        frequency: "quarterly",
        description: "The total value of goods and services produced in the US",
    },
    Indicator {
        key: "CPI",
        series_id: "CPIAUCSL",
        name: "Consumer Price Index",
        frequency: "monthly",
        description: "Measures inflation by tracking changes in consumer prices",
    },
    Indicator {
        key: "UNEMPLOYMENT",
        series_id: "UNRATE",
        name: "Unemployment Rate",
        frequency: "monthly",
        description: "Percentage of the labor force that is unemployed",
    },
    Indicator {
        key: "FEDERAL_FUNDS_RATE",
        series_id: "FEDFUNDS",
        name: "Federal Funds Rate",
        frequency: "monthly",
        description: "The interest rate at which banks lend to each other overnight",
    },
    Indicator {
        key: "CONSUMER_SENTIMENT",
        series_id: "UMCSENT",
        name: "University of Michigan Consumer Sentiment",
        frequency: "monthly",
        description: "Measures consumer confidence and economic outlook",
    },
    Indicator {
        key: "MANUFACTURING_PMI",
        series_id: "NAPM",
        name: "ISM Manufacturing PMI",
        frequency: "monthly",
        description: "Purchasing Managers Index indicating manufacturing sector health",
    },
];

/// An Economic Policy Uncertainty series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicySeries {
    /// FRED series id
    pub series_id: &'static str,
    /// Name written to the `series_name` column
    pub name: &'static str,
    /// Description of the index
    pub description: &'static str,
}

/// EPU series collected by default.
pub const DEFAULT_POLICY_SERIES: [PolicySeries; 5] = [
    PolicySeries {
        series_id: "USEPUINDXD",
        name: "US_Economic_Policy_Uncertainty_Daily",
        description: "Daily US Economic Policy Uncertainty Index based on newspaper coverage",
    },
    PolicySeries {
        series_id: "USEPUINDXM",
        name: "US_Economic_Policy_Uncertainty_Monthly",
        description: "Monthly US Economic Policy Uncertainty Index",
    },
    PolicySeries {
        series_id: "GEPUCURRENT",
        name: "Global_Economic_Policy_Uncertainty",
        description: "Global Economic Policy Uncertainty Index (GDP-weighted average of 20 countries)",
    },
    PolicySeries {
        series_id: "EPUMONETARY",
        name: "Monetary_Policy_Uncertainty",
        description: "Economic Policy Uncertainty Index: Monetary Policy Category",
    },
    PolicySeries {
        series_id: "GEPUWEIGHTS",
        name: "Global_EPU_Weights",
        description: "Global Economic Policy Uncertainty Index: Weights",
    },
];

/// Series metadata from `/fred/series`.
///
/// Only the fields used downstream are typed; the rest are kept so the
/// record can be written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    /// Series id
    pub id: String,
    /// Series title
    #[serde(default)]
    pub title: Option<String>,
    /// Remaining metadata fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeriesResponse {
    #[serde(default)]
    pub(crate) seriess: Vec<SeriesInfo>,
}

/// A single observation. FRED encodes values as strings, with `"."` for missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date, `YYYY-MM-DD`
    pub date: String,
    /// Raw value
    pub value: String,
}

impl Observation {
    /// Parsed value, `None` for missing or non-numeric entries.
    pub fn numeric(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObservationsResponse {
    #[serde(default)]
    pub(crate) observations: Vec<Observation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3.5", Some(3.5))]
    #[case(" 27610.128 ", Some(27610.128))]
    #[case(".", None)]
    #[case("", None)]
    #[case("NaN", None)]
    fn test_observation_numeric(#[case] raw: &str, #[case] expected: Option<f64>) {
        let obs = Observation {
            date: "2024-01-01".to_string(),
            value: raw.to_string(),
        };
        assert_eq!(obs.numeric(), expected);
    }

    #[test]
    fn test_indicator_file_name() {
        assert_eq!(DEFAULT_INDICATORS[0].file_name(), "gdp_data.json");
        assert_eq!(DEFAULT_INDICATORS[3].file_name(), "federal_funds_rate_data.json");
    }

    #[test]
    fn test_series_info_keeps_extra_fields() {
        let body = r#"{"id": "UNRATE", "title": "Unemployment Rate", "units": "Percent"}"#;
        let info: SeriesInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.title.as_deref(), Some("Unemployment Rate"));
        assert_eq!(info.extra.get("units").and_then(Value::as_str), Some("Percent"));

        let back = serde_json::to_value(&info).unwrap();
        assert_eq!(back["units"], "Percent");
    }

    #[test]
    fn test_indicator_serializes_without_key() {
        let value = serde_json::to_value(DEFAULT_INDICATORS[1]).unwrap();
        assert_eq!(value["series_id"], "CPIAUCSL");
        assert!(value.get("key").is_none());
    }
}
