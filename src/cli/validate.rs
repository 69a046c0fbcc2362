//! Scenario validation command implementation.

use super::CliError;
use hexcolony::Scenario;
use std::path::Path;

/// Label for the cross-reference checks in [`Scenario::validate`].
const CONSISTENCY_CHECK: &str = "Scenario is consistent";

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be parsed or has problems.
pub(crate) fn execute(path: &Path) -> Result<(), CliError> {
    println!("Validating: {}", path.display());
    println!();

    let scenario = match Scenario::load(path) {
        Ok(scenario) => {
            print_check("Scenario parses", true);
            scenario
        }
        Err(e) => {
            print_check("Scenario parses", false);
            return Err(CliError::new(format!("Failed to load {}: {e}", path.display())));
        }
    };

    let colony = scenario.colony();
    print_check("Ledger configuration", colony.is_ok());
    colony?;

    let problems = scenario.validate();
    print_check(CONSISTENCY_CHECK, problems.is_empty());
    for problem in &problems {
        println!("      {problem}");
    }
    if !problems.is_empty() {
        return Err(CliError::new(format!("{} problem(s) found", problems.len())));
    }

    println!();
    println!("Summary:");
    println!("  Territories:  {}", scenario.territories.len());
    println!("  Templates:    {}", scenario.templates.len());
    println!("  Placements:   {}", scenario.placements.len());
    println!("  Ticks:        {}", scenario.ticks);
    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    println!("{}", check_line(name, ok));
}

fn check_line(name: &str, ok: bool) -> String {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    format!("  {symbol} {name}: {status}")
}
