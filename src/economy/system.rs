//! Global resource ledgers and the per-tick aggregation pass.
//!
//! # Tick
//!
//! Actors are visited in registration order against a running delta that
//! starts at zero for every configured resource:
//!
//! ```text
//! projected[r] = current[r] + running[r] + change[r]
//! ```
//!
//! If any projected amount would be negative the actor is disabled for good
//! and none of its changes are folded in, including changes to resources it
//! did not starve. Otherwise its changes join the running delta. After the
//! pass every ledger records the delta and clamps `current + delta` to
//! `[0, max]`.
//!
//! Resources without a ledger are ignored: never checked, never tracked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::economy::{ActorId, BuildingManager, EconomyActor, ResourceMap, ResourceType};
use crate::error::EconomyError;
use crate::notify::{SubscriptionId, Subscribers};

/// Initial state of one ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Starting amount.
    pub initial: f64,
    /// Storage cap. `None` means unbounded.
    pub max: Option<f64>,
}

impl LedgerConfig {
    /// Bounded ledger starting at `initial`.
    #[must_use]
    pub const fn bounded(initial: f64, max: f64) -> Self {
        Self {
            initial,
            max: Some(max),
        }
    }
}

/// Which ledgers exist and how they start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// One entry per tracked resource.
    pub resources: BTreeMap<ResourceType, LedgerConfig>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            resources: ResourceType::ALL
                .into_iter()
                .map(|r| (r, LedgerConfig::default()))
                .collect(),
        }
    }
}

/// Current state of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    /// Amount held.
    pub current: f64,
    /// Storage cap (`f64::INFINITY` when unbounded).
    pub max: f64,
    /// Net change applied by the last tick, before clamping.
    pub delta: f64,
}

impl ResourceLedger {
    fn from_config(resource: ResourceType, config: LedgerConfig) -> Result<Self, EconomyError> {
        let max = config.max.unwrap_or(f64::INFINITY);
        if max.is_nan() || max < 0.0 {
            return Err(EconomyError::InvalidLedger {
                resource,
                reason: "maximum must be a non-negative number",
            });
        }
        if !config.initial.is_finite() || config.initial < 0.0 {
            return Err(EconomyError::InvalidLedger {
                resource,
                reason: "initial amount must be finite and non-negative",
            });
        }
        Ok(Self {
            current: config.initial.min(max),
            max,
            delta: 0.0,
        })
    }
}

/// Ledger change notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceEvent {
    /// Resource that changed.
    pub resource: ResourceType,
    /// Ledger state after the change.
    pub ledger: ResourceLedger,
}

/// Outcome of one economy tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Actors disabled during this tick, in visiting order.
    pub disabled: Vec<ActorId>,
    /// Net delta per tracked resource.
    pub deltas: ResourceMap,
}

/// Owner of the colony's resource ledgers.
#[derive(Debug)]
pub struct EconomySystem {
    ledgers: BTreeMap<ResourceType, ResourceLedger>,
    events: Subscribers<ResourceEvent>,
}

impl EconomySystem {
    /// Build ledgers from configuration.
    ///
    /// Initial amounts above the cap are clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidLedger`] for negative or non-finite
    /// initial amounts and for negative or NaN caps.
    pub fn new(config: &EconomyConfig) -> Result<Self, EconomyError> {
        let mut ledgers = BTreeMap::new();
        for (&resource, &ledger) in &config.resources {
            ledgers.insert(resource, ResourceLedger::from_config(resource, ledger)?);
        }
        Ok(Self {
            ledgers,
            events: Subscribers::new(),
        })
    }

    /// Ledger for a resource, if it is tracked.
    #[must_use]
    pub fn ledger(&self, resource: ResourceType) -> Option<&ResourceLedger> {
        self.ledgers.get(&resource)
    }

    /// Current amount, zero for untracked resources.
    #[must_use]
    pub fn amount(&self, resource: ResourceType) -> f64 {
        self.ledgers.get(&resource).map_or(0.0, |l| l.current)
    }

    /// All ledgers in resource order.
    #[must_use]
    pub fn ledgers(&self) -> &BTreeMap<ResourceType, ResourceLedger> {
        &self.ledgers
    }

    /// Subscribe to ledger changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&ResourceEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Detach a ledger listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Run one tick over every enabled actor, in registration order.
    pub fn update_economy<A: EconomyActor>(
        &mut self,
        manager: &mut BuildingManager<A>,
    ) -> TickReport {
        let mut running: ResourceMap = self.ledgers.keys().map(|&r| (r, 0.0)).collect();
        let mut disabled = Vec::new();

        for (index, actor) in manager.all_actors_mut().iter_mut().enumerate() {
            if !actor.is_enabled() {
                continue;
            }

            let change = actor.net_resource_change();
            if let Some((resource, projected)) = self.first_shortfall(&running, change) {
                actor.disable();
                disabled.push(ActorId(index));
                tracing::info!(actor = index, %resource, projected, "actor disabled");
                continue;
            }

            for (resource, amount) in actor.net_resource_change() {
                if let Some(total) = running.get_mut(resource) {
                    *total += amount;
                }
            }
        }

        let before = self.ledgers.clone();
        for (resource, ledger) in &mut self.ledgers {
            let delta = running.get(resource).copied().unwrap_or(0.0);
            ledger.delta = delta;
            ledger.current = (ledger.current + delta).clamp(0.0, ledger.max);
        }
        self.emit_changes(&before);

        tracing::trace!(disabled = disabled.len(), "economy tick complete");
        TickReport {
            disabled,
            deltas: running,
        }
    }

    /// First tracked resource an actor would drive below zero.
    ///
    /// NaN projections count as shortfalls.
    fn first_shortfall(
        &self,
        running: &ResourceMap,
        change: &ResourceMap,
    ) -> Option<(ResourceType, f64)> {
        change.iter().find_map(|(resource, amount)| {
            let ledger = self.ledgers.get(resource)?;
            let so_far = running.get(resource).copied().unwrap_or(0.0);
            let projected = ledger.current + so_far + amount;
            (projected < 0.0 || projected.is_nan()).then_some((*resource, projected))
        })
    }

    /// True if every cost entry is covered by the current amount.
    ///
    /// Untracked resources count as zero and an empty cost is always
    /// affordable. A non-finite cost is never affordable, even against a
    /// ledger holding infinity, so paying cannot turn a ledger into NaN or
    /// push it past its cap.
    #[must_use]
    pub fn check_for_sufficient_resources(&self, cost: &ResourceMap) -> bool {
        self.shortfall(cost).is_none()
    }

    /// First cost entry the ledgers cannot cover, in resource order.
    #[must_use]
    pub fn shortfall(&self, cost: &ResourceMap) -> Option<EconomyError> {
        cost.iter().find_map(|(&resource, &required)| {
            let available = self.amount(resource);
            let covered = required.is_finite() && available >= required;
            (!covered).then_some(EconomyError::InsufficientResources {
                resource,
                required,
                available,
            })
        })
    }

    /// Subtract a cost from the ledgers without re-validating it.
    ///
    /// Callers must have confirmed the cost with
    /// [`Self::check_for_sufficient_resources`] in the same exclusive scope.
    /// Paying an unaffordable cost is a programming error and trips a debug
    /// assertion. Untracked resources are skipped.
    pub fn pay_resource(&mut self, cost: &ResourceMap) {
        debug_assert!(
            self.check_for_sufficient_resources(cost),
            "pay_resource called with insufficient funds: {cost:?}"
        );
        let before = self.ledgers.clone();
        for (resource, amount) in cost {
            if let Some(ledger) = self.ledgers.get_mut(resource) {
                ledger.current -= amount;
            }
        }
        self.emit_changes(&before);
    }

    /// Check and pay a cost under one exclusive borrow.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientResources`] naming the first
    /// resource found short; the ledgers are left untouched.
    pub fn try_spend(&mut self, cost: &ResourceMap) -> Result<(), EconomyError> {
        if let Some(err) = self.shortfall(cost) {
            return Err(err);
        }
        self.pay_resource(cost);
        Ok(())
    }

    fn emit_changes(&mut self, before: &BTreeMap<ResourceType, ResourceLedger>) {
        for (resource, ledger) in &self.ledgers {
            let changed = before.get(resource).is_none_or(|old| {
                old.current.to_bits() != ledger.current.to_bits()
                    || old.delta.to_bits() != ledger.delta.to_bits()
            });
            if changed {
                self.events.notify(&ResourceEvent {
                    resource: *resource,
                    ledger: *ledger,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{Building, BuildingKind, BuildingTemplate};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn actor(changes: &[(ResourceType, f64)]) -> Building {
        let mut template = BuildingTemplate::new("test", BuildingKind::Base);
        for &(resource, amount) in changes {
            template = template.with_net_change(resource, amount);
        }
        Building::from(template)
    }

    fn economy(resources: &[(ResourceType, LedgerConfig)]) -> EconomySystem {
        let config = EconomyConfig {
            resources: resources.iter().copied().collect(),
        };
        EconomySystem::new(&config).unwrap()
    }

    fn cost(entries: &[(ResourceType, f64)]) -> ResourceMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_default_config_tracks_everything_unbounded() {
        let system = EconomySystem::new(&EconomyConfig::default()).unwrap();
        for resource in ResourceType::ALL {
            let ledger = system.ledger(resource).unwrap();
            assert_eq!(ledger.current, 0.0);
            assert!(ledger.max.is_infinite());
        }
    }

    #[test]
    fn test_invalid_ledger_rejected() {
        let negative_max = EconomyConfig {
            resources: [(ResourceType::Metal, LedgerConfig::bounded(0.0, -1.0))].into(),
        };
        assert!(matches!(
            EconomySystem::new(&negative_max),
            Err(EconomyError::InvalidLedger { resource: ResourceType::Metal, .. })
        ));

        let nan_initial = EconomyConfig {
            resources: [(
                ResourceType::Power,
                LedgerConfig {
                    initial: f64::NAN,
                    max: None,
                },
            )]
            .into(),
        };
        assert!(EconomySystem::new(&nan_initial).is_err());
    }

    #[test]
    fn test_initial_clamped_to_max() {
        let system = economy(&[(ResourceType::Metal, LedgerConfig::bounded(500.0, 100.0))]);
        assert_eq!(system.amount(ResourceType::Metal), 100.0);
    }

    #[test]
    fn test_lone_consumer_disabled() {
        let mut system = EconomySystem::new(&EconomyConfig::default()).unwrap();
        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Metal, -100.0)]));

        let report = system.update_economy(&mut manager);

        assert_eq!(report.disabled, vec![ActorId(0)]);
        assert!(!manager.all_actors()[0].is_enabled());
        assert_eq!(system.amount(ResourceType::Metal), 0.0);
    }

    #[test]
    fn test_order_decides_who_is_disabled() {
        let mut system = EconomySystem::new(&EconomyConfig::default()).unwrap();
        let mut manager = BuildingManager::new();
        for (power, metal) in [(200.0, 0.0), (-100.0, 200.0), (-200.0, 300.0), (-100.0, 150.0)] {
            manager.register(actor(&[(ResourceType::Power, power), (ResourceType::Metal, metal)]));
        }

        let report = system.update_economy(&mut manager);

        assert_eq!(report.disabled, vec![ActorId(2)]);
        assert_eq!(manager.enabled_count(), 3);
        assert_eq!(system.amount(ResourceType::Power), 0.0);
        assert_eq!(system.amount(ResourceType::Metal), 350.0);
        assert_eq!(report.deltas.get(&ResourceType::Metal), Some(&350.0));
    }

    #[test]
    fn test_rejection_frees_headroom_for_later_actors() {
        let mut system = economy(&[(ResourceType::Power, LedgerConfig::bounded(50.0, 100.0))]);
        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Power, -80.0)]));
        manager.register(actor(&[(ResourceType::Power, -50.0)]));

        let report = system.update_economy(&mut manager);

        assert_eq!(report.disabled, vec![ActorId(0)]);
        assert_eq!(system.amount(ResourceType::Power), 0.0);
    }

    #[test]
    fn test_disabled_actor_stays_off() {
        let mut system = EconomySystem::new(&EconomyConfig::default()).unwrap();
        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Power, -10.0)]));
        system.update_economy(&mut manager);

        // Plenty of power now, but the actor never comes back.
        manager.register(actor(&[(ResourceType::Power, 100.0)]));
        let report = system.update_economy(&mut manager);
        let third = system.update_economy(&mut manager);

        assert!(report.disabled.is_empty());
        assert!(third.disabled.is_empty());
        assert!(!manager.all_actors()[0].is_enabled());
        assert_eq!(system.amount(ResourceType::Power), 200.0);
    }

    #[test]
    fn test_untracked_resource_ignored() {
        let mut system = economy(&[(ResourceType::Metal, LedgerConfig::default())]);
        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Magma, -1000.0), (ResourceType::Metal, 5.0)]));

        let report = system.update_economy(&mut manager);

        assert!(report.disabled.is_empty());
        assert!(system.ledger(ResourceType::Magma).is_none());
        assert_eq!(system.amount(ResourceType::Metal), 5.0);
        assert!(!report.deltas.contains_key(&ResourceType::Magma));
    }

    #[test]
    fn test_clamped_to_max_but_delta_recorded() {
        let mut system = economy(&[(ResourceType::Metal, LedgerConfig::bounded(90.0, 100.0))]);
        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Metal, 25.0)]));

        system.update_economy(&mut manager);

        let ledger = system.ledger(ResourceType::Metal).unwrap();
        assert_eq!(ledger.current, 100.0);
        assert_eq!(ledger.delta, 25.0);
    }

    #[test]
    fn test_nan_change_rejects_actor() {
        let mut system = EconomySystem::new(&EconomyConfig::default()).unwrap();
        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Power, f64::NAN)]));

        let report = system.update_economy(&mut manager);

        assert_eq!(report.disabled, vec![ActorId(0)]);
        assert_eq!(system.amount(ResourceType::Power), 0.0);
    }

    #[test]
    fn test_spend_protocol() {
        let mut system = economy(&[
            (ResourceType::Metal, LedgerConfig::bounded(80.0, 100.0)),
            (ResourceType::Power, LedgerConfig::bounded(50.0, 100.0)),
            (ResourceType::Magma, LedgerConfig::bounded(0.0, 100.0)),
        ]);

        let affordable = cost(&[(ResourceType::Metal, 30.0), (ResourceType::Power, 20.0)]);
        assert!(system.check_for_sufficient_resources(&affordable));
        system.pay_resource(&affordable);
        assert_eq!(system.amount(ResourceType::Metal), 50.0);
        assert_eq!(system.amount(ResourceType::Power), 30.0);
        assert_eq!(system.amount(ResourceType::Magma), 0.0);

        assert!(!system.check_for_sufficient_resources(&cost(&[(ResourceType::Metal, 200.0)])));
        assert!(!system.check_for_sufficient_resources(&cost(&[
            (ResourceType::Metal, 50.0),
            (ResourceType::Magma, 10.0),
        ])));
        assert_eq!(system.amount(ResourceType::Metal), 50.0);
    }

    #[test]
    fn test_empty_cost_always_affordable() {
        let system = economy(&[]);
        assert!(system.check_for_sufficient_resources(&ResourceMap::new()));
        assert!(system.check_for_sufficient_resources(&cost(&[(ResourceType::Metal, 0.0)])));
        assert!(!system.check_for_sufficient_resources(&cost(&[(ResourceType::Metal, 0.5)])));
    }

    #[test]
    fn test_non_finite_cost_unaffordable() {
        let system = economy(&[(ResourceType::Metal, LedgerConfig::bounded(10.0, 100.0))]);
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let price = cost(&[(ResourceType::Metal, amount)]);
            assert!(!system.check_for_sufficient_resources(&price), "{amount} accepted");
        }
    }

    #[test]
    fn test_infinite_ledger_refuses_infinite_cost() {
        let mut system = economy(&[(ResourceType::Magma, LedgerConfig::default())]);
        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Magma, f64::INFINITY)]));
        let report = system.update_economy(&mut manager);
        assert!(report.disabled.is_empty());
        assert_eq!(system.amount(ResourceType::Magma), f64::INFINITY);

        let price = cost(&[(ResourceType::Magma, f64::INFINITY)]);
        assert!(system.try_spend(&price).is_err());
        assert!(system.check_for_sufficient_resources(&cost(&[(ResourceType::Magma, 1e300)])));
        assert_eq!(system.amount(ResourceType::Magma), f64::INFINITY);
    }

    #[test]
    fn test_try_spend_leaves_ledgers_on_failure() {
        let mut system = economy(&[(ResourceType::Metal, LedgerConfig::bounded(10.0, 100.0))]);
        let err = system
            .try_spend(&cost(&[(ResourceType::Metal, 5.0), (ResourceType::Power, 1.0)]))
            .unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientResources {
                resource: ResourceType::Power,
                required: 1.0,
                available: 0.0,
            }
        );
        assert_eq!(system.amount(ResourceType::Metal), 10.0);

        system.try_spend(&cost(&[(ResourceType::Metal, 4.0)])).unwrap();
        assert_eq!(system.amount(ResourceType::Metal), 6.0);
    }

    #[test]
    #[should_panic(expected = "insufficient funds")]
    #[cfg(debug_assertions)]
    fn test_overpay_trips_assertion() {
        let mut system = economy(&[(ResourceType::Metal, LedgerConfig::default())]);
        system.pay_resource(&cost(&[(ResourceType::Metal, 1.0)]));
    }

    #[test]
    fn test_events_only_on_change() {
        let mut system = economy(&[
            (ResourceType::Metal, LedgerConfig::default()),
            (ResourceType::Power, LedgerConfig::default()),
        ]);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        system.subscribe(move |event| sink.borrow_mut().push(event.resource));

        let mut manager = BuildingManager::new();
        manager.register(actor(&[(ResourceType::Metal, 3.0)]));
        system.update_economy(&mut manager);
        assert_eq!(*log.borrow(), vec![ResourceType::Metal]);

        // Same delta, different amount: Metal fires again, Power stays quiet.
        system.update_economy(&mut manager);
        assert_eq!(*log.borrow(), vec![ResourceType::Metal, ResourceType::Metal]);

        system.pay_resource(&cost(&[(ResourceType::Metal, 1.0)]));
        assert_eq!(log.borrow().len(), 3);
    }
}
