//! Descriptive text for economic indicator and policy uncertainty series.

use chrono::NaiveDate;
use finsent_data::fred::{Indicator, Observation};

/// Observations considered when describing an indicator.
pub const RECENT_WINDOW: usize = 12;

/// Observations back used for the year-over-year policy comparison.
pub const YEAR_LOOKBACK: usize = 12;

/// Year-over-year change (percent) above which a policy sentence is emitted.
pub const SIGNIFICANT_YEAR_CHANGE_PCT: f64 = 10.0;

const DEFAULT_POLICY_TITLE: &str = "Policy Uncertainty Index";

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Describe an indicator from observations sorted newest first.
///
/// Only numeric values among the first [`RECENT_WINDOW`] observations are
/// used. Returns nothing when fewer than two values remain.
pub fn describe_indicator(indicator: &Indicator, observations: &[Observation]) -> Vec<String> {
    let values: Vec<f64> = observations
        .iter()
        .take(RECENT_WINDOW)
        .filter_map(Observation::numeric)
        .collect();
    describe_values(indicator.name, indicator.description, &values)
}

/// Three sentences on the current level, the latest change and the recent average.
///
/// `values` are newest first.
pub fn describe_values(name: &str, description: &str, values: &[f64]) -> Vec<String> {
    if values.len() < 2 {
        return Vec::new();
    }

    let current = values[0];
    let previous = values[1];
    let change = current - previous;
    let change_pct = percent_change(current, previous);

    let (trend, sentiment, conditions) = if change > 0.0 {
        ("increased", "positive", "improving")
    } else if change < 0.0 {
        ("decreased", "negative", "declining")
    } else {
        ("remained stable", "neutral", "stable")
    };

    let current_text = format!(
        "The {name} is currently {current:.2}. {description}. \
         This represents a {trend} from the previous period."
    );

    let trend_text = format!(
        "Economic indicator analysis: {name} has {trend} by {:.2} ({:.1}%) from the previous \
         measurement period. This {sentiment} movement suggests {conditions} economic conditions.",
        change.abs(),
        change_pct.abs(),
    );

    let context_text = if values.len() >= 4 {
        let average = values[..4].iter().sum::<f64>() / 4.0;
        let position = if current > average * 1.05 {
            "above recent historical levels"
        } else if current < average * 0.95 {
            "below recent historical levels"
        } else {
            "in line with recent historical levels"
        };
        format!(
            "The current {name} reading of {current:.2} is {position}, \
             compared to the recent average of {average:.2}."
        )
    } else {
        format!("The {name} shows a current reading of {current:.2}.")
    };

    vec![current_text, trend_text, context_text]
}

/// Context sentences for a policy uncertainty series.
///
/// `points` must be sorted by date ascending with missing values removed.
pub fn policy_context(title: Option<&str>, points: &[(NaiveDate, f64)]) -> Vec<String> {
    let Some(&(latest_date, latest)) = points.last() else {
        return Vec::new();
    };
    let title = title.filter(|t| !t.trim().is_empty()).unwrap_or(DEFAULT_POLICY_TITLE);
    let date = latest_date.format("%Y-%m-%d");

    let mut descriptions = Vec::new();

    if points.len() > 1 {
        let previous = points[points.len() - 2].1;
        let change = latest - previous;
        let change_pct = percent_change(latest, previous);
        let (trend, direction) = if change > 0.0 {
            ("increased", "higher")
        } else if change < 0.0 {
            ("decreased", "lower")
        } else {
            ("remained unchanged", "stable")
        };
        descriptions.push(format!(
            "As of {date}, the {title} stands at {latest:.2}, which has {trend} by {:.2} points \
             ({:.1}%) from the previous reading. This indicates {direction} policy uncertainty in the market.",
            change.abs(),
            change_pct.abs(),
        ));
    } else {
        descriptions.push(format!(
            "As of {date}, the {title} stands at {latest:.2}. \
             This represents the current level of policy uncertainty."
        ));
    }

    if points.len() >= YEAR_LOOKBACK {
        let year_ago = points[points.len() - YEAR_LOOKBACK].1;
        let year_change = latest - year_ago;
        let year_change_pct = percent_change(latest, year_ago);
        if year_change_pct.abs() > SIGNIFICANT_YEAR_CHANGE_PCT {
            let (verb, adjective) = if year_change > 0.0 {
                ("increased", "more")
            } else {
                ("decreased", "less")
            };
            descriptions.push(format!(
                "Compared to one year ago, policy uncertainty has {verb} by {:.1}%, \
                 indicating a {adjective} uncertain policy environment.",
                year_change_pct.abs(),
            ));
        }
    }

    descriptions
}
