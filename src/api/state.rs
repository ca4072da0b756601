use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::energy::EnergyState;
use crate::jobs::StatsSnapshot;
use crate::orchestrator::OrchestratorClient;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub client: OrchestratorClient,
    // Eco mode and model routing, changed through the energy routes
    pub energy: EnergyState,
    // Kept current by the stats refresh job
    pub stats: StatsSnapshot,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        let client = OrchestratorClient::new(&config.backend_url);
        Self {
            db,
            config,
            client,
            energy: EnergyState::default(),
            stats: StatsSnapshot::default(),
        }
    }
}
