//! Configuration for the multi-phase simulator

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use uw_rust::{validate_endpoints, NodeId, SimulationConfig, UwError};

/// Node counts simulated by default, in order
pub const DEFAULT_PHASES: [usize; 5] = [150, 250, 500, 750, 1000];

/// Configuration for a phase series
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct PhaseSimConfig {
    /// Network sizes to simulate, one transfer each
    pub phases: Vec<usize>,

    pub source: NodeId,
    pub destination: NodeId,

    /// Random seed (None = generate random)
    #[serde(skip)]
    pub seed: Option<[u8; 32]>,

    /// Log every hop and escalation through the `log` facade
    pub log_hops: bool,

    /// Geometry, energy and handover settings shared by every phase
    pub simulation: SimulationConfig,

    pub output: OutputConfig,
}

impl Default for PhaseSimConfig {
    fn default() -> Self {
        Self {
            phases: DEFAULT_PHASES.to_vec(),
            source: 1,
            destination: 150,
            seed: None,
            log_hops: false,
            simulation: SimulationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PhaseSimConfig {
    /// Get or generate seed
    pub fn resolve_seed(&self) -> [u8; 32] {
        uw_rust::resolve_seed(self.seed)
    }

    /// Endpoints must exist in every phase, so they are checked against the smallest one
    pub fn validate(&self) -> Result<(), UwError> {
        let smallest = match self.phases.iter().min() {
            Some(&n) => n,
            None => return Err(UwError::InvalidConfig("no phases configured".to_string())),
        };

        for (i, n) in self.phases.iter().enumerate() {
            if self.phases[..i].contains(n) {
                return Err(UwError::InvalidConfig(format!(
                    "phase node count {} listed twice",
                    n
                )));
            }
        }

        self.simulation.validate()?;
        validate_endpoints(smallest, self.source, self.destination)
    }

    /// Derive one seed per phase from the master seed
    pub fn phase_seeds(&self, master: [u8; 32]) -> Vec<[u8; 32]> {
        let mut rng = StdRng::from_seed(master);
        self.phases
            .iter()
            .map(|_| {
                let mut seed = [0u8; 32];
                rng.fill_bytes(&mut seed);
                seed
            })
            .collect()
    }
}

/// Where to write series results
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Per-phase summary as CSV
    pub csv: Option<String>,

    /// Full results (paths and node snapshots) as YAML
    pub yaml: Option<String>,
}
