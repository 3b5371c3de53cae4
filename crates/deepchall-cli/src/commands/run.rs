//! Run command implementation.

use std::path::Path;

use anyhow::Result;
use deepchall_ops::{PairReport, Registry, RunConfig, RunStats, Runner};

/// Load the configuration at `path`, run every pair and print the results.
pub fn execute(registry: &Registry, path: &Path, json: bool) -> Result<()> {
    let config = RunConfig::load(path)?;
    let runner = Runner::new(registry, config)?;
    let reports = runner.run();

    if json {
        let values: Vec<_> = reports.iter().map(PairReport::to_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    for report in &reports {
        println!("{} x {}", report.lang, report.net);
        match &report.outcome {
            Ok(stats) => print_stats(stats),
            Err(err) => println!("  failed: {err}"),
        }
        println!();
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    println!("{} runs, {} failed", reports.len(), failed);
    Ok(())
}

fn print_stats(stats: &RunStats) {
    let lengths = match (
        stats.min_training_sample_length,
        stats.max_training_sample_length,
    ) {
        (Some(min), Some(max)) => format!("length {min}..={max}"),
        _ => "no samples".to_string(),
    };
    println!(
        "  training:  {} generated, {} skipped, {} used ({})",
        stats.training_samples_generated,
        stats.training_samples_skipped,
        stats.training_samples_used,
        lengths
    );
    println!(
        "  correct:   {}/{} ({:.1}%)",
        stats.correct_generated,
        stats.test_samples,
        stats.accuracy * 100.0
    );
    if let Some(avg) = stats.avg_length {
        println!("  avg len:   {avg:.2}");
    }
    println!("  time:      {:.3}s", stats.training_time_secs);
}
