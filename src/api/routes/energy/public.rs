//! Public types for the energy API

use serde::Deserialize;

use crate::energy::EnergyMode;

/// Partial update of the energy state. Absent fields are left as is,
/// `selected_model: null` clears the selection.
#[derive(Deserialize, Default)]
pub struct EnergyUpdate {
    pub eco_mode: Option<bool>,
    pub mode: Option<EnergyMode>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub selected_model: Option<Option<String>>,
}

// Distinguishes an explicit null from a missing field
fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
