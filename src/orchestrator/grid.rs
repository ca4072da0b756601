//! Grid carbon status with an offline fallback

use serde::Serialize;

use super::client::OrchestratorClient;

/// Used for regions the backend doesn't report an intensity for
const DEFAULT_INTENSITY: f64 = 300.0;

/// Approximate grid intensity (g CO₂/kWh) by ISO country code, shown
/// when the backend can't be reached
const FALLBACK_INTENSITY: &[(&str, f64)] = &[
    ("USA", 380.0),
    ("CAN", 120.0),
    ("BRA", 80.0),
    ("GBR", 200.0),
    ("DEU", 340.0),
    ("FRA", 60.0),
    ("IND", 650.0),
    ("CHN", 580.0),
    ("AUS", 520.0),
    ("JPN", 450.0),
    ("NOR", 20.0),
    ("SWE", 30.0),
    ("POL", 700.0),
    ("ZAF", 800.0),
    ("RUS", 420.0),
    ("KOR", 410.0),
    ("IDN", 600.0),
    ("MEX", 350.0),
    ("ARG", 250.0),
    ("SAU", 550.0),
];

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum IntensityLabel {
    High,
    Moderate,
    Clean,
}

pub fn intensity_label(intensity: f64) -> IntensityLabel {
    if intensity > 400.0 {
        IntensityLabel::High
    } else if intensity > 200.0 {
        IntensityLabel::Moderate
    } else {
        IntensityLabel::Clean
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct RegionStatus {
    pub name: String,
    pub intensity: f64,
    pub label: IntensityLabel,
    pub score: Option<f64>,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct GridStatus {
    pub live: bool,
    pub regions: Vec<RegionStatus>,
}

pub fn fallback_regions() -> Vec<RegionStatus> {
    FALLBACK_INTENSITY
        .iter()
        .map(|(code, intensity)| RegionStatus {
            name: code.to_string(),
            intensity: *intensity,
            label: intensity_label(*intensity),
            score: None,
        })
        .collect()
}

/// Current grid status. Never fails: an unreachable backend yields the
/// fallback table marked as not live.
pub async fn grid_status(client: &OrchestratorClient) -> GridStatus {
    match client.grid_map().await {
        Ok(map) => GridStatus {
            live: true,
            regions: map
                .regions
                .into_iter()
                .map(|r| {
                    let intensity = r.carbon_intensity_g_per_kwh.unwrap_or(DEFAULT_INTENSITY);
                    RegionStatus {
                        name: r.name,
                        intensity,
                        label: intensity_label(intensity),
                        score: Some(r.score),
                    }
                })
                .collect(),
        },
        Err(e) => {
            tracing::warn!("Grid map unavailable, using fallback regions: {}", e);
            GridStatus {
                live: false,
                regions: fallback_regions(),
            }
        }
    }
}
