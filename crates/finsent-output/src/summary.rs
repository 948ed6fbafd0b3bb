//! Terminal and Markdown summaries.

use finsent_corpus::{DatasetAnalysis, Label, PreparationSummary};
use finsent_model::{ClassificationMetrics, InferenceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

fn rule(output: &mut String, c: &str) {
    output.push_str(&c.repeat(60));
    output.push('\n');
}

/// Scores of a model on one labeled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Where the labeled examples came from
    pub dataset_name: String,
    /// Number of labeled examples
    pub examples: usize,
    /// Mean cross-entropy
    pub loss: f64,
    /// Scores
    pub metrics: ClassificationMetrics,
}

impl EvaluationSummary {
    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let m = &self.metrics;
        let mut output = String::new();

        output.push_str(&format!("\nModel Performance: {}\n", self.dataset_name));
        rule(&mut output, "=");
        output.push_str(&format!("  Examples:   {}\n", self.examples));
        output.push_str(&format!("  Accuracy:   {:.2}%\n", m.accuracy * 100.0));
        output.push_str(&format!("  Precision:  {:.2}%\n", m.precision * 100.0));
        output.push_str(&format!("  Recall:     {:.2}%\n", m.recall * 100.0));
        output.push_str(&format!("  F1-Score:   {:.2}%\n", m.f1 * 100.0));
        output.push_str(&format!("  Loss:       {:.4}\n", self.loss));

        output.push_str("\nPer-class report:\n");
        rule(&mut output, "-");
        output.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>10} {:>10}\n",
            "Label", "Precision", "Recall", "F1", "Support"
        ));
        for (label, report) in &m.per_class {
            output.push_str(&format!(
                "{:<10} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
                label, report.precision, report.recall, report.f1, report.support
            ));
        }

        output.push_str("\nConfusion matrix (rows: true, columns: predicted):\n");
        rule(&mut output, "-");
        output.push_str(&format!("{:<10}", ""));
        for label in Label::ALL {
            output.push_str(&format!(" {:>10}", label.as_str()));
        }
        output.push('\n');
        for (label, row) in Label::ALL.iter().zip(m.confusion_matrix.counts()) {
            output.push_str(&format!("{:<10}", label.as_str()));
            for count in row {
                output.push_str(&format!(" {count:>10}"));
            }
            output.push('\n');
        }
        rule(&mut output, "=");

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let m = &self.metrics;
        let mut output = String::new();

        output.push_str(&format!("# Model Performance: {}\n\n", self.dataset_name));
        output.push_str(&format!("- **Examples:** {}\n", self.examples));
        output.push_str(&format!("- **Accuracy:** {:.2}%\n", m.accuracy * 100.0));
        output.push_str(&format!("- **Precision:** {:.2}%\n", m.precision * 100.0));
        output.push_str(&format!("- **Recall:** {:.2}%\n", m.recall * 100.0));
        output.push_str(&format!("- **F1-Score:** {:.2}%\n\n", m.f1 * 100.0));

        output.push_str("| Label | Precision | Recall | F1 | Support |\n");
        output.push_str("|-------|-----------|--------|----|---------|\n");
        for (label, report) in &m.per_class {
            output.push_str(&format!(
                "| {} | {:.4} | {:.4} | {:.4} | {} |\n",
                label, report.precision, report.recall, report.f1, report.support
            ));
        }

        output
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evaluation: {} ({} examples)", self.dataset_name, self.examples)?;
        writeln!(f, "  Accuracy: {:.2}%", self.metrics.accuracy * 100.0)?;
        writeln!(f, "  F1-Score: {:.2}%", self.metrics.f1 * 100.0)?;
        Ok(())
    }
}

/// Render inference results grouped by category, in input order.
pub fn inference_report(results: &[InferenceResult]) -> String {
    let mut output = String::new();
    rule(&mut output, "=");
    output.push_str("Running Inference Examples\n");
    rule(&mut output, "=");

    let mut current: Option<&str> = None;
    for result in results {
        if current != Some(result.category.as_str()) {
            output.push_str(&format!("\n--- {} ---\n", result.category));
            current = Some(&result.category);
        }
        output.push_str(&format!("\nText: {}\n", result.text));
        output.push_str(&format!(
            "Predicted: {} (Confidence: {:.2}%)\n",
            result.prediction.label.as_str().to_uppercase(),
            result.prediction.confidence * 100.0
        ));
    }
    output.push('\n');
    rule(&mut output, "=");
    output
}

/// Render a per-source dataset breakdown.
pub fn analysis_report(analysis: &DatasetAnalysis) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\nDataset Analysis ({} examples)\n",
        analysis.total_examples
    ));
    rule(&mut output, "=");

    let total = analysis.total_examples.max(1) as f64;
    for (label, count) in &analysis.label_distribution {
        output.push_str(&format!(
            "  {:<10} {:>6} ({:.1}%)\n",
            label,
            count,
            *count as f64 / total * 100.0
        ));
    }

    for (source, breakdown) in &analysis.sources {
        output.push_str(&format!("\n{} ({} examples)\n", source, breakdown.total));
        rule(&mut output, "-");
        for (label, count) in &breakdown.labels {
            output.push_str(&format!("  {label}: {count}\n"));
            for sample in breakdown.samples.get(label).into_iter().flatten() {
                output.push_str(&format!("    - {sample}\n"));
            }
        }
    }
    rule(&mut output, "=");
    output
}

/// Render the outcome of corpus preparation.
pub fn preparation_report(summary: &PreparationSummary) -> String {
    let mut output = String::new();
    output.push_str("\nTraining Data Preparation\n");
    rule(&mut output, "=");
    output.push_str(&format!("  SEC filings:        {}\n", summary.counts.sec_filings));
    output.push_str(&format!("  FRED data:          {}\n", summary.counts.fred_data));
    output.push_str(&format!(
        "  Policy uncertainty: {}\n",
        summary.counts.policy_uncertainty
    ));
    output.push_str(&format!("  Duplicates removed: {}\n", summary.duplicates_removed));
    output.push_str(&format!("  Total examples:     {}\n", summary.total_examples));
    for (label, count) in &summary.label_distribution {
        output.push_str(&format!("    {label}: {count}\n"));
    }
    rule(&mut output, "=");
    output
}

/// Outcome of one collection phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Finished without a stage-level error
    Succeeded,
    /// Not run
    Skipped,
    /// Stopped by an error
    Failed,
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Succeeded => "SUCCESS",
            Self::Skipped => "SKIPPED",
            Self::Failed => "FAILED",
        })
    }
}

/// Result of a single collection phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    /// Phase name
    pub name: String,
    /// Outcome
    pub status: PhaseStatus,
    /// Reason for a skip or failure
    pub detail: Option<String>,
}

impl PhaseResult {
    /// Successful phase.
    pub fn succeeded(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: PhaseStatus::Succeeded,
            detail: None,
        }
    }

    /// Skipped phase.
    pub fn skipped(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: PhaseStatus::Skipped,
            detail: Some(reason.into()),
        }
    }

    /// Failed phase.
    pub fn failed(name: &str, error: impl fmt::Display) -> Self {
        Self {
            name: name.to_string(),
            status: PhaseStatus::Failed,
            detail: Some(error.to_string()),
        }
    }
}

/// Summary of a collection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Phases in run order
    pub phases: Vec<PhaseResult>,
    /// SEC filing files on disk
    pub sec_files: usize,
    /// FRED files on disk
    pub fred_files: usize,
    /// Policy uncertainty files on disk
    pub policy_files: usize,
    /// Wall time in seconds
    pub duration_secs: f64,
}

impl CollectionSummary {
    /// Phases that succeeded.
    pub fn successful_phases(&self) -> usize {
        self.phases
            .iter()
            .filter(|p| p.status == PhaseStatus::Succeeded)
            .count()
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        output.push_str("\nData Collection Summary\n");
        rule(&mut output, "=");
        for phase in &self.phases {
            output.push_str(&format!("  {:<22} {}", phase.name, phase.status));
            if let Some(detail) = &phase.detail {
                output.push_str(&format!(" ({detail})"));
            }
            output.push('\n');
        }
        rule(&mut output, "-");
        output.push_str(&format!("  SEC filings:          {} files\n", self.sec_files));
        output.push_str(&format!("  FRED data:            {} files\n", self.fred_files));
        output.push_str(&format!("  Policy uncertainty:   {} files\n", self.policy_files));
        output.push_str(&format!(
            "  Successful phases:    {}/{}\n",
            self.successful_phases(),
            self.phases.len()
        ));
        output.push_str(&format!("  Duration:             {:.1}s\n", self.duration_secs));
        rule(&mut output, "=");
        output
    }
}
