//! Strategy profile command
//!
//! Prints reaction rates per strategy, mediator statistics and the
//! descriptive tests relating strategies, reactions and mediators.

use std::path::PathBuf;

use annostat_mediation::{ProfileConfig, ProfileReport, StrategyObservation, StrategyProfiler};
use anyhow::Context;
use clap::Args;

use crate::util::{self, Output, Report};

#[derive(Debug, Clone, Args)]
pub(crate) struct ProfileArg {
    /// Path to the strategy observations JSON file
    rows: PathBuf,
    /// Path to a profile config JSON file (reaction labels, hypotheses)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Write the JSON report to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ProfileArg) -> anyhow::Result<()> {
    let rows = util::read_json_file::<Vec<StrategyObservation>, _>("strategy observations", &arg.rows)?;
    let config = util::read_config_file::<ProfileConfig>("profile config", arg.config.as_deref())?;

    if rows.is_empty() {
        println!("no data to evaluate");
        return Ok(());
    }

    let profiler = StrategyProfiler::new(config);
    let report = profiler
        .report(&rows)
        .context("Failed to build strategy profile")?;

    if arg.json || arg.output.is_some() {
        let report = Report::new("profile", &arg.rows, report);
        return Output::save_json(&report, arg.output.as_deref());
    }
    print_report(&report, profiler.config().significance_level);
    Ok(())
}

fn print_report(report: &ProfileReport, alpha: f64) {
    println!("Strategy Profile ({} observations)", report.observation_count);
    println!("==========================================\n");

    println!(
        "  {:<20} {:>6} {:>10} {:>10} {:>10} {:>13}",
        "Strategy", "Total", "Positive%", "Neutral%", "Negative%", "Effectiveness"
    );
    println!("  {}", "-".repeat(74));
    for profile in &report.strategies {
        println!(
            "  {:<20} {:>6} {:>9.1}% {:>9.1}% {:>9.1}% {:>13.1}",
            profile.strategy,
            profile.total,
            profile.positive_percent,
            profile.neutral_percent,
            profile.negative_percent,
            profile.effectiveness,
        );
    }
    println!();

    for (mediator, by_strategy) in &report.mediator_summaries {
        println!("Mediator {mediator}");
        println!(
            "  {:<20} {:>6} {:>9} {:>9} {:>9} {:>9}",
            "Strategy", "n", "Mean", "Std", "Min", "Max"
        );
        for (strategy, stats) in by_strategy {
            println!(
                "  {:<20} {:>6} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
                strategy, stats.count, stats.mean, stats.std_dev, stats.min, stats.max
            );
        }
        if let Some(anova) = report.anovas.get(mediator) {
            println!(
                "  ANOVA: F({}, {}) = {}, p = {:.4}, eta² = {}",
                anova.df_between,
                anova.df_within,
                util::format_opt(anova.f_statistic, 3),
                anova.p_value,
                util::format_opt(anova.eta_squared, 3),
            );
        }
        println!();
    }

    if !report.correlations.is_empty() {
        println!("Mediator-reaction correlations");
        for c in &report.correlations {
            println!(
                "  {:<20} r = {:>7.3}  p = {:.4}  {} {}",
                c.mediator,
                c.correlation.r,
                c.correlation.p_value,
                c.strength,
                if c.significant { "*" } else { "" },
            );
        }
        println!();
    }

    if let Some(chi) = &report.chi_square {
        println!(
            "Chi-square: {:.3} (df {}), p = {:.4}, Cramer's V = {:.3} ({})",
            chi.statistic, chi.degrees_of_freedom, chi.p_value, chi.cramers_v, chi.association
        );
        println!();
    }

    if !report.pairwise.is_empty() {
        println!("Pairwise odds ratios (positive reaction)");
        for pair in &report.pairwise {
            println!(
                "  {} vs {}: OR = {:.3}, p = {:.4}{}",
                pair.first,
                pair.second,
                pair.odds.odds_ratio,
                pair.odds.p_value,
                if pair.significant { " *" } else { "" },
            );
        }
        println!();
    }

    if !report.hypotheses.is_empty() {
        println!("Hypotheses");
        for check in &report.hypotheses {
            println!(
                "  {}: {} mean {:.3} vs {:.3}, ratio {} (threshold {:.1}) -> {}",
                check.name,
                check.mediator,
                check.higher_mean,
                check.lower_mean,
                util::format_opt(check.ratio, 2),
                check.ratio_threshold,
                if check.validated { "validated" } else { "not validated" },
            );
        }
    }
    println!("(* significant at alpha = {alpha})");
}
