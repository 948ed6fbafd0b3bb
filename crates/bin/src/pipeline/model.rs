//! Training, evaluation, inference and dataset analysis.

use finsent::Config;
use finsent_corpus::{Dataset, analyze_dataset};
use finsent_model::{
    BaseModel, SentimentClassifier, Trainer, evaluate_builtin, evaluate_dataset, infer, load_model,
    run_inference_examples,
};
use finsent_output::{
    EvaluationSummary, TRAINING_DATA_CSV, TrainingReport, TrainingReportBuilder, analysis_report,
    inference_report,
};
use std::error::Error;
use std::path::Path;

/// Category name for texts given on the command line.
const INPUT_CATEGORY: &str = "Input";

fn training_data(config: &Config) -> Result<Dataset, Box<dyn Error>> {
    let path = config.layout().processed_dir().join(TRAINING_DATA_CSV);
    Ok(Dataset::read_csv(&path)?)
}

fn load_finetuned(config: &Config) -> Result<SentimentClassifier, Box<dyn Error>> {
    let dir = config.model_dir();
    tracing::info!(dir = %dir.display(), "loading fine-tuned model");
    load_model(&dir).map_err(|e| {
        format!(
            "could not load model from {}: {} (run `finsent train` first)",
            dir.display(),
            e
        )
        .into()
    })
}

/// Fine-tune on the prepared corpus and write the model and report.
pub(crate) fn run_train(config: &Config) -> Result<TrainingReport, Box<dyn Error>> {
    let dataset = training_data(config)?;
    tracing::info!(examples = dataset.len(), "loaded training data");
    dataset.log_label_distribution();

    let base: BaseModel = config.model.base_model.parse()?;
    let output_dir = config.model_dir();
    let args = config.model.training_args.clone();

    let trainer = Trainer::new(args.clone())?
        .with_model_name(&config.model.model_name)
        .with_output_dir(&output_dir);
    let outcome = trainer.fit_dataset(&base, &dataset)?;

    let report = TrainingReportBuilder::new()
        .model_name(&config.model.model_name)
        .training_args(args)
        .outcome(&outcome)
        .dataset(&dataset)
        .build()?;
    let path = report.write_to_dir(&output_dir)?;

    let summary = EvaluationSummary {
        dataset_name: "validation split".to_string(),
        examples: outcome.validation_examples,
        loss: outcome.evaluation.loss,
        metrics: outcome.evaluation.metrics.clone(),
    };
    println!("{}", summary.to_ascii_table());
    println!("Model saved to: {}", output_dir.display());
    println!("Training results saved to: {}", path.display());
    Ok(report)
}

/// Score the fine-tuned model on the built-in set or a labeled CSV.
pub(crate) fn run_evaluate(
    config: &Config,
    dataset: Option<&Path>,
) -> Result<EvaluationSummary, Box<dyn Error>> {
    let classifier = load_finetuned(config)?;

    let summary = match dataset {
        Some(path) => {
            let dataset = Dataset::read_csv(path)?;
            let evaluation = evaluate_dataset(&classifier, &dataset)?;
            EvaluationSummary {
                dataset_name: path.display().to_string(),
                examples: dataset.len(),
                loss: evaluation.loss,
                metrics: evaluation.metrics,
            }
        }
        None => {
            let evaluation = evaluate_builtin(&classifier)?;
            EvaluationSummary {
                dataset_name: "built-in examples".to_string(),
                examples: evaluation.predictions.len(),
                loss: evaluation.loss,
                metrics: evaluation.metrics,
            }
        }
    };

    println!("{}", summary.to_ascii_table());
    if dataset.is_none() {
        println!("Note: these results are based on a small example dataset.");
        println!("Pass --dataset with a labeled CSV for a real measure of performance.");
    }
    Ok(summary)
}

/// Predict sentiment for `texts`, or for the built-in examples when empty.
pub(crate) fn run_infer(config: &Config, texts: &[String]) -> Result<(), Box<dyn Error>> {
    let classifier = load_finetuned(config)?;
    let results = if texts.is_empty() {
        run_inference_examples(&classifier)
    } else {
        infer(&classifier, INPUT_CATEGORY, texts)
    };
    print!("{}", inference_report(&results));
    Ok(())
}

/// Print label and source breakdown of the prepared corpus.
pub(crate) fn run_analyze(config: &Config) -> Result<(), Box<dyn Error>> {
    let dataset = training_data(config)?;
    print!("{}", analysis_report(&analyze_dataset(&dataset)));
    Ok(())
}
