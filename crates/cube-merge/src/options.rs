//! Merge configuration.

use cube_common::FillValueTable;
use serde::{Deserialize, Serialize};

/// Default promotion priority for dimension coordinates, by standard name.
///
/// When several co-varying coordinates could define the same axis, the one
/// whose standard name appears earliest here wins; coordinates with standard
/// names missing from the list rank after listed ones, and coordinates with
/// no standard name rank last.
pub fn default_dim_priority() -> Vec<String> {
    [
        "forecast_period",
        "forecast_reference_time",
        "time",
        "height",
        "air_pressure",
        "pressure",
        "model_level_number",
        "latitude",
        "longitude",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Options controlling a merge call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Fail on duplicate cubes (true) or keep them as extra results (false).
    pub unique: bool,
    /// Standard-name priority order for dimension-coordinate promotion.
    pub dim_priority: Vec<String>,
    /// Default fill values per dtype, used when members disagree or are unset.
    pub fill_defaults: FillValueTable,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            unique: true,
            dim_priority: default_dim_priority(),
            fill_defaults: FillValueTable::default(),
        }
    }
}

impl MergeOptions {
    /// Options with duplicate cubes tolerated.
    pub fn non_unique() -> Self {
        Self {
            unique: false,
            ..Default::default()
        }
    }
}
