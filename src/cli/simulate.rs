//! Simulate command implementation.

use super::output::format_text;
use super::{CliError, OutputFormat};
use hexcolony::Scenario;
use std::path::Path;

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or built.
pub(crate) fn execute(
    path: &Path,
    ticks: Option<u32>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut scenario = Scenario::load(path)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))?;
    if let Some(ticks) = ticks {
        scenario.ticks = ticks;
    }

    for problem in scenario.validate() {
        tracing::warn!(%problem, "scenario problem");
    }

    let outcome = scenario.run()?;

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&outcome));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
