#![no_main]

use arbitrary::Arbitrary;
use hexcolony::{
    Building, BuildingKind, BuildingManager, BuildingTemplate, EconomyConfig, EconomySystem,
    LedgerConfig, ResourceMap, ResourceType,
};
use libfuzzer_sys::fuzz_target;

/// Structured input for economy fuzzing.
#[derive(Arbitrary, Debug)]
struct EconomyInput {
    /// Per-resource (initial, max); `None` leaves the resource untracked.
    ledgers: [Option<(f64, Option<f64>)>; 3],
    /// Per-actor changes, indexed like `ResourceType::ALL`.
    actors: Vec<[Option<f64>; 3]>,
    /// Costs attempted between ticks.
    spends: Vec<[Option<f64>; 3]>,
    /// Number of ticks (capped).
    ticks: u8,
}

fn to_map(entries: &[Option<f64>; 3]) -> ResourceMap {
    ResourceType::ALL
        .into_iter()
        .zip(entries)
        .filter_map(|(resource, amount)| amount.map(|a| (resource, a)))
        .collect()
}

fuzz_target!(|input: EconomyInput| {
    let config = EconomyConfig {
        resources: ResourceType::ALL
            .into_iter()
            .zip(input.ledgers)
            .filter_map(|(resource, ledger)| {
                ledger.map(|(initial, max)| (resource, LedgerConfig { initial, max }))
            })
            .collect(),
    };
    // Invalid configurations are rejected up front; nothing else to check.
    let Ok(mut system) = EconomySystem::new(&config) else {
        return;
    };

    let mut manager = BuildingManager::new();
    for changes in input.actors.iter().take(256) {
        let mut template = BuildingTemplate::new("fuzz", BuildingKind::Base);
        template.net_change = to_map(changes);
        manager.register(Building::from(template));
    }

    let mut spends = input.spends.iter().cycle();
    for _ in 0..input.ticks.min(32) {
        let before = manager.enabled_count();
        let report = system.update_economy(&mut manager);
        assert_eq!(manager.enabled_count() + report.disabled.len(), before);

        for (resource, ledger) in system.ledgers() {
            assert!(
                ledger.current >= 0.0 && ledger.current <= ledger.max,
                "{resource} ledger out of bounds: {ledger:?}"
            );
        }

        if let Some(cost) = spends.next() {
            let cost = to_map(cost);
            if cost.values().all(|v| *v >= 0.0) {
                let snapshot = system.ledgers().clone();
                if system.try_spend(&cost).is_err() {
                    assert_eq!(&snapshot, system.ledgers(), "failed spend changed ledgers");
                }
            }
        }
    }
});
