//! Resource kinds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of colony-wide resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// Construction material.
    Metal,
    /// Electrical output.
    Power,
    /// Geothermal feedstock.
    Magma,
}

impl ResourceType {
    /// Every resource type, in ledger order.
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Metal,
        ResourceType::Power,
        ResourceType::Magma,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ResourceType::Metal => "Metal",
            ResourceType::Power => "Power",
            ResourceType::Magma => "Magma",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signed amounts keyed by resource, iterated in a fixed order.
pub type ResourceMap = BTreeMap<ResourceType, f64>;
