use crate::error::CliError;
use engine_runtime::execution::summary::RunSummary;

pub fn print_summary(summary: &RunSummary, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!(
        "Read {} rows in {} batches",
        summary.rows_read, summary.batches_read
    );
    println!("{:<24} {:>12} {:>10} {:>10}", "Target", "Rows", "Batches", "Skipped");
    for target in &summary.targets {
        println!(
            "{:<24} {:>12} {:>10} {:>10}",
            target.target_id, target.rows_written, target.batches_written, target.batches_skipped
        );
    }
    Ok(())
}
