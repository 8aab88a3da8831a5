//! Statistics and results for the multi-phase simulator

use indexmap::IndexMap;
use serde::Serialize;
use uw_rust::{NodeId, PhaseResult, TransferStatus, UwError};

/// Results of a full phase series, keyed by node count in run order
#[derive(Debug)]
pub struct PhaseSeriesResult {
    /// Seed used for the series
    pub seed_used: [u8; 32],

    pub source: NodeId,
    pub destination: NodeId,

    pub phases: IndexMap<usize, PhaseResult>,

    /// Phases aborted by the escalation ceiling, in run order
    pub failed: IndexMap<usize, UwError>,

    /// Forwarding events written to the log (zero unless `log_hops`)
    pub events_logged: usize,
}

/// One line of the `(node count, time, energy)` series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummaryRow {
    pub node_count: usize,
    pub elapsed_secs: f64,
    pub simulated_secs: f64,
    pub remaining_energy: f64,
    pub active_nodes: usize,
    pub hops: usize,
    pub delivered: bool,
}

impl From<&PhaseResult> for PhaseSummaryRow {
    fn from(phase: &PhaseResult) -> Self {
        Self {
            node_count: phase.node_count,
            elapsed_secs: phase.elapsed.as_secs_f64(),
            simulated_secs: phase.transfer.simulated_time,
            remaining_energy: phase.remaining_energy,
            active_nodes: phase.active_node_count(),
            hops: phase.transfer.path.hop_count(),
            delivered: phase.transfer.delivered(),
        }
    }
}

#[derive(Serialize)]
struct PhaseFailure {
    node_count: usize,
    error: String,
}

#[derive(Serialize)]
struct SeriesReport<'a> {
    source: NodeId,
    destination: NodeId,
    summary: Vec<PhaseSummaryRow>,
    failed: Vec<PhaseFailure>,
    phases: Vec<&'a PhaseResult>,
}

impl PhaseSeriesResult {
    pub fn rows(&self) -> Vec<PhaseSummaryRow> {
        self.phases.values().map(PhaseSummaryRow::from).collect()
    }

    pub fn delivered_count(&self) -> usize {
        self.phases
            .values()
            .filter(|p| p.transfer.delivered())
            .count()
    }

    /// Per-phase summary as CSV, header first
    pub fn to_csv(&self) -> String {
        let mut out = String::from(
            "node_count,elapsed_secs,simulated_secs,remaining_energy,active_nodes,hops,delivered\n",
        );
        for row in self.rows() {
            out.push_str(&format!(
                "{},{:.6},{:.6},{:.2},{},{},{}\n",
                row.node_count,
                row.elapsed_secs,
                row.simulated_secs,
                row.remaining_energy,
                row.active_nodes,
                row.hops,
                row.delivered
            ));
        }
        out
    }

    /// Summary plus every phase's path and node snapshot, for plotting tools
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let report = SeriesReport {
            source: self.source,
            destination: self.destination,
            summary: self.rows(),
            failed: self
                .failed
                .iter()
                .map(|(&node_count, e)| PhaseFailure {
                    node_count,
                    error: e.to_string(),
                })
                .collect(),
            phases: self.phases.values().collect(),
        };
        serde_yaml::to_string(&report)
    }

    /// Print a summary of the series results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Underwater Handover Simulation Results          ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Seed: {:?}", self.seed_used);
        println!("  Source: {}  Destination: {}", self.source, self.destination);
        println!("  Phases: {}\n", self.phases.len() + self.failed.len());

        println!(
            "{:>8} {:>12} {:>12} {:>10} {:>8} {:>6}  status",
            "nodes", "wall (s)", "sim (s)", "energy", "active", "hops"
        );
        for phase in self.phases.values() {
            let row = PhaseSummaryRow::from(phase);
            let status = match phase.transfer.status {
                TransferStatus::Delivered => "delivered".to_string(),
                TransferStatus::Stalled { at, reason } => {
                    format!("stalled at {} ({:?})", at, reason)
                }
            };
            println!(
                "{:>8} {:>12.6} {:>12.6} {:>10.2} {:>8} {:>6}  {}",
                row.node_count,
                row.elapsed_secs,
                row.simulated_secs,
                row.remaining_energy,
                row.active_nodes,
                row.hops,
                status
            );
        }
        for (node_count, e) in &self.failed {
            println!("{:>8} failed: {}", node_count, e);
        }
        println!();

        println!(
            "Delivered: {}/{}",
            self.delivered_count(),
            self.phases.len() + self.failed.len()
        );
        if self.events_logged > 0 {
            println!("Events logged: {}", self.events_logged);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::super::config::PhaseSimConfig;
    use super::super::runner::PhaseRunner;
    use super::*;

    fn series() -> PhaseSeriesResult {
        let config = PhaseSimConfig {
            phases: vec![30, 60],
            source: 2,
            destination: 30,
            seed: Some([4u8; 32]),
            ..Default::default()
        };
        PhaseRunner::new(config).run().unwrap()
    }

    #[test]
    fn test_rows_follow_phase_order() {
        let result = series();
        let rows = result.rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].node_count, 30);
        assert_eq!(rows[1].node_count, 60);
        for (row, phase) in rows.iter().zip(result.phases.values()) {
            assert_eq!(row.hops, phase.transfer.path.hop_count());
            assert_eq!(row.remaining_energy, phase.remaining_energy);
            assert_eq!(row.delivered, phase.transfer.delivered());
        }
    }

    #[test]
    fn test_csv_has_header_and_one_line_per_phase() {
        let csv = series().to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("node_count,elapsed_secs"));
        assert!(lines[1].starts_with("30,"));
        assert!(lines[2].starts_with("60,"));
        assert_eq!(lines[1].split(',').count(), 7);
    }

    #[test]
    fn test_yaml_report_contains_paths() {
        let yaml = series().to_yaml().unwrap();
        assert!(yaml.contains("summary:"));
        assert!(yaml.contains("path:"));
        assert!(yaml.contains("role: Source"));
        assert!(yaml.contains("failed: []"));
    }
}
