//! Template command implementation.

use super::CliError;
use hexcolony::Scenario;
use std::path::Path;

/// Execute the template command.
///
/// # Errors
///
/// Returns an error if the example cannot be written.
pub(crate) fn execute(output: Option<&Path>) -> Result<(), CliError> {
    let scenario = Scenario::example();
    match output {
        Some(path) => {
            scenario.save(path)?;
            println!("Example scenario written to: {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&scenario)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}
