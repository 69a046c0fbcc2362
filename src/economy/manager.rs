//! Ordered registry of economy actors.

use serde::{Deserialize, Serialize};

use crate::economy::{Building, EconomyActor};

/// Position of an actor in its registry.
///
/// Ids are handed out in registration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub usize);

/// Append-only list of actors. Registration order is the order the economy
/// tick visits them in, so it decides who gets disabled first.
#[derive(Debug, Clone)]
pub struct BuildingManager<A = Building> {
    actors: Vec<A>,
}

impl<A> Default for BuildingManager<A> {
    fn default() -> Self {
        Self { actors: Vec::new() }
    }
}

impl<A: EconomyActor> BuildingManager<A> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an actor. Registering equal actors twice yields two
    /// independent contributions.
    pub fn register(&mut self, actor: A) -> ActorId {
        let id = ActorId(self.actors.len());
        self.actors.push(actor);
        id
    }

    /// All actors in registration order.
    #[must_use]
    pub fn all_actors(&self) -> &[A] {
        &self.actors
    }

    /// Mutable view in registration order, for the economy tick.
    pub(crate) fn all_actors_mut(&mut self) -> &mut [A] {
        &mut self.actors
    }

    /// Look up an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&A> {
        self.actors.get(id.0)
    }

    /// Iterate with ids, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &A)> {
        self.actors.iter().enumerate().map(|(i, a)| (ActorId(i), a))
    }

    /// Number of registered actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Actors still contributing.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.actors.iter().filter(|a| a.is_enabled()).count()
    }
}
