//! Eco mode and model routing state shared by the chat flow and the API

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnergyMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct EnergyState {
    pub eco_mode: bool,
    pub mode: EnergyMode,
    pub selected_model: Option<String>,
}

impl Default for EnergyState {
    fn default() -> Self {
        Self {
            eco_mode: true,
            mode: EnergyMode::Auto,
            selected_model: None,
        }
    }
}

impl EnergyState {
    /// Pinning a model switches to manual routing. Clearing the
    /// selection leaves the mode alone.
    pub fn select_model(&mut self, model: Option<String>) {
        if model.is_some() {
            self.mode = EnergyMode::Manual;
        }
        self.selected_model = model;
    }

    pub fn set_mode(&mut self, mode: EnergyMode) {
        self.mode = mode;
        if mode == EnergyMode::Auto {
            self.selected_model = None;
        }
    }

    pub fn reset(&mut self) {
        self.set_mode(EnergyMode::Auto);
    }

    pub fn toggle_eco(&mut self) -> bool {
        self.eco_mode = !self.eco_mode;
        self.eco_mode
    }

    pub fn set_eco(&mut self, on: bool) {
        self.eco_mode = on;
    }

    /// Whether the backend should skip its carbon-aware routing
    pub fn bypass_eco(&self) -> bool {
        !self.eco_mode
    }
}
