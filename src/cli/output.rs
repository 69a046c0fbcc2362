//! Output formatting utilities for CLI.

use hexcolony::scenario::{PlacementOutcome, ScenarioOutcome, TickSnapshot};

/// Format a scenario outcome as human-readable text.
pub(super) fn format_text(outcome: &ScenarioOutcome) -> String {
    let mut output = String::new();

    output.push_str("Placements\n");
    for placement in &outcome.placements {
        output.push_str(&format_placement(placement));
        output.push('\n');
    }
    output.push('\n');

    output.push_str("Ticks\n");
    for snapshot in &outcome.ticks {
        output.push_str(&format_tick(snapshot));
        output.push('\n');
    }
    output.push('\n');

    output.push_str(&format!(
        "Buildings: {} enabled of {} registered\n",
        outcome.enabled, outcome.registered
    ));

    output
}

fn format_placement(placement: &PlacementOutcome) -> String {
    let request = &placement.request;
    let status = match (&placement.actor, &placement.error) {
        (Some(actor), _) => format!("actor {}", actor.0),
        (None, Some(error)) => format!("failed: {error}"),
        (None, None) => "failed".to_string(),
    };
    format!(
        "  [tick {}] player {} {} at {}: {status}",
        request.at_tick, request.player, request.template, request.anchor
    )
}

fn format_tick(snapshot: &TickSnapshot) -> String {
    let mut line = format!("  {:>4}:", snapshot.tick);
    for (resource, ledger) in &snapshot.ledgers {
        line.push_str(&format!(" {resource} {:.1} ({:+.1})", ledger.current, ledger.delta));
    }
    if !snapshot.disabled.is_empty() {
        let ids: Vec<String> = snapshot.disabled.iter().map(|a| a.0.to_string()).collect();
        line.push_str(&format!(" [disabled {}]", ids.join(", ")));
    }
    line
}
