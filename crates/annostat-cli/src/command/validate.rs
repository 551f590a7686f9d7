//! Classifier validation command
//!
//! Scores predictions against gold labels and prints accuracy, kappa,
//! per-class metrics, the confusion matrix and an error analysis.

use std::{collections::BTreeMap, path::PathBuf};

use annostat_validation::{
    ClassificationObservation, ValidationMetrics, ValidationThresholds, discrepancy::ErrorAnalysis,
    metrics::Verdict,
};
use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::util::{self, Output, Report};

#[derive(Debug, Clone, Args)]
pub(crate) struct ValidateArg {
    /// Path to the classification observations JSON file
    observations: PathBuf,
    /// Also compute metrics per observation group
    #[arg(long)]
    by_group: bool,
    /// Path to a thresholds JSON file
    #[arg(long)]
    thresholds: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Write the JSON report to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    metrics: ValidationMetrics,
    verdict: Verdict,
    errors: ErrorAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<BTreeMap<String, ValidationMetrics>>,
}

pub(crate) fn run(arg: &ValidateArg) -> anyhow::Result<()> {
    let observations =
        util::read_json_file::<Vec<ClassificationObservation>, _>("observations", &arg.observations)?;
    let thresholds =
        util::read_config_file::<ValidationThresholds>("thresholds", arg.thresholds.as_deref())?;

    if observations.is_empty() {
        println!("no data to evaluate");
        return Ok(());
    }

    let metrics = ValidationMetrics::compute(&observations).context("Failed to compute validation metrics")?;
    let groups = arg
        .by_group
        .then(|| ValidationMetrics::compute_grouped(&observations))
        .transpose()
        .context("Failed to compute per-group metrics")?;
    let report = ValidationReport {
        verdict: metrics.evaluate(&thresholds),
        errors: ErrorAnalysis::analyze(&observations),
        metrics,
        groups,
    };

    if arg.json || arg.output.is_some() {
        let report = Report::new("validate", &arg.observations, report);
        return Output::save_json(&report, arg.output.as_deref());
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &ValidationReport) {
    let metrics = &report.metrics;

    println!("Validation Report");
    println!("=================\n");
    println!(
        "Samples:   {} ({} correct)",
        metrics.total_samples, metrics.correct_predictions
    );
    println!("Accuracy:  {:.3}", metrics.accuracy);
    println!(
        "Kappa:     {:.3} ({}; observed {:.3}, expected {:.3})",
        metrics.kappa, metrics.kappa_interpretation, metrics.agreement.observed, metrics.agreement.expected
    );
    println!(
        "Micro P/R/F1: {:.3} / {:.3} / {:.3}",
        metrics.precision, metrics.recall, metrics.f1
    );
    println!(
        "Avg confidence: {}   Avg processing time: {} ms",
        util::format_opt(metrics.average_confidence, 3),
        util::format_opt(metrics.average_processing_time_ms, 1)
    );
    println!();

    println!("Per-class metrics");
    println!(
        "  {:<20} {:>9} {:>9} {:>9} {:>8}",
        "Label", "Precision", "Recall", "F1", "Support"
    );
    println!("  {}", "-".repeat(59));
    for (label, class) in &metrics.class_metrics {
        println!(
            "  {:<20} {:>9.3} {:>9.3} {:>9.3} {:>8}",
            label, class.precision, class.recall, class.f1, class.support
        );
    }
    println!();

    print_confusion_matrix(metrics);
    println!();

    if let Some(groups) = &report.groups {
        println!("Per-group metrics");
        println!(
            "  {:<20} {:>8} {:>9} {:>9} {:>9}",
            "Group", "Samples", "Accuracy", "Kappa", "F1"
        );
        println!("  {}", "-".repeat(59));
        for (group, m) in groups {
            println!(
                "  {:<20} {:>8} {:>9.3} {:>9.3} {:>9.3}",
                group, m.total_samples, m.accuracy, m.kappa, m.f1
            );
        }
        println!();
    }

    let errors = &report.errors;
    println!(
        "Errors: {} ({:.1}%)",
        errors.total_errors,
        errors.error_rate * 100.0
    );
    for error in &errors.common_errors {
        let examples = if error.examples.is_empty() {
            String::new()
        } else {
            format!(" [{}]", error.examples.join(", "))
        };
        println!(
            "  {} -> {}: {}{examples}",
            error.gold, error.predicted, error.frequency
        );
    }
    for suggestion in &errors.suggestions {
        println!("  * {suggestion}");
    }
    println!();

    if report.verdict.passed {
        println!("Verdict: PASS");
    } else {
        println!("Verdict: FAIL");
        for failure in &report.verdict.failures {
            println!("  - {failure}");
        }
    }
}

/// Rows are gold labels, columns predicted labels.
fn print_confusion_matrix(metrics: &ValidationMetrics) {
    let matrix = &metrics.confusion_matrix;
    let labels = matrix.labels().collect::<Vec<_>>();

    println!("Confusion matrix (rows: gold, columns: predicted)");
    print!("  {:<20}", "");
    for label in &labels {
        print!(" {label:>10}");
    }
    println!();
    for gold in &labels {
        print!("  {gold:<20}");
        for predicted in &labels {
            print!(" {:>10}", matrix.count(predicted, gold));
        }
        println!();
    }
}
