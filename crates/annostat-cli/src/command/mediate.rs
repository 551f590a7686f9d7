//! Mediation analysis command

use std::path::PathBuf;

use annostat_mediation::{MediationConfig, MediationObservation, MediationOrchestrator, MediationResult};
use anyhow::Context;
use clap::Args;

use crate::util::{self, Output, Report};

#[derive(Debug, Clone, Args)]
pub(crate) struct MediateArg {
    /// Path to the mediation observations JSON file
    observations: PathBuf,
    /// Path to a mediation config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Analyze mediators one after another instead of in parallel
    #[arg(long)]
    sequential: bool,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
    /// Write the JSON result to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &MediateArg) -> anyhow::Result<()> {
    let observations =
        util::read_json_file::<Vec<MediationObservation>, _>("observations", &arg.observations)?;
    let mut config = util::read_config_file::<MediationConfig>("mediation config", arg.config.as_deref())?;
    if arg.sequential {
        config.parallel = false;
    }

    if observations.is_empty() {
        println!("no data to evaluate");
        return Ok(());
    }

    let result = MediationOrchestrator::new(config)
        .run(&observations)
        .context("Failed to run mediation analysis")?;

    if arg.json || arg.output.is_some() {
        let report = Report::new("mediate", &arg.observations, result);
        return Output::save_json(&report, arg.output.as_deref());
    }
    print_result(&result);
    Ok(())
}

fn print_result(result: &MediationResult) {
    println!("Mediation Analysis ({} observations)", result.observation_count);
    println!("==========================================\n");

    if result.convergence {
        println!(
            "  {:<20} {:>5} {:>9} {:>9} {:>9} {:>9} {:>10} {:>9} {:>8}",
            "Mediator", "n", "a", "b", "c", "c'", "Indirect", "p", "Type"
        );
        println!("  {}", "-".repeat(98));
        for path in &result.paths {
            println!(
                "  {:<20} {:>5} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>10.4} {:>9.4} {:>8}",
                path.mediator,
                path.n,
                path.a,
                path.b,
                path.c,
                path.c_prime,
                path.indirect_effect,
                path.p_value,
                path.mediation_type.to_string(),
            );
        }
        println!();
    } else {
        println!("insufficient data for mediation analysis\n");
    }

    for skipped in &result.skipped {
        println!("  skipped {}: {}", skipped.mediator, skipped.reason);
    }
    if !result.skipped.is_empty() {
        println!();
    }

    println!("Total effect:    {}", util::format_opt(result.total_effect, 4));
    println!("Direct effect:   {}", util::format_opt(result.direct_effect, 4));
    println!("Indirect effect: {:.4}", result.total_indirect_effect);
    println!(
        "Mediated:        {}%",
        util::format_opt(result.total_mediation_percent, 1)
    );
}
