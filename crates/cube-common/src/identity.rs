//! Coordinate identity: the typed comparator used to decide whether two
//! coordinates describe the same quantity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies a coordinate by name and units.
///
/// Two coordinates are the same quantity if and only if their identities are
/// equal. `standard_name` is a recognized physical identity (e.g.
/// `forecast_period`); `long_name` is a free-form label. Unit comparison is
/// textual: unit conversion is out of scope for this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoordIdentity {
    /// Recognized standard name, if any.
    pub standard_name: Option<String>,
    /// Free-form descriptive name.
    pub long_name: Option<String>,
    /// Units string (compared verbatim).
    pub units: String,
    /// Arbitrary per-coordinate attributes; part of identity equality.
    pub attributes: BTreeMap<String, String>,
}

impl CoordIdentity {
    /// Identity with a recognized standard name.
    pub fn standard(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            standard_name: Some(name.into()),
            long_name: None,
            units: units.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Identity with only a free-form long name.
    pub fn named(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            standard_name: None,
            long_name: Some(name.into()),
            units: units.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a per-coordinate attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Best available name: standard name first, then long name.
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or("unknown")
    }

    /// Whether this coordinate carries a recognized standard name.
    pub fn is_standard(&self) -> bool {
        self.standard_name.is_some()
    }
}
