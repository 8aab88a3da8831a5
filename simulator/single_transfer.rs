//! Hand-built transfers over tiny networks, one per routing situation
//!
//! Run with: cargo run --example single_transfer

use log::info;
use simple_logger::SimpleLogger;
use uw_rust::{
    run_transfer, NodeId, Position, RecordingSink, SimulationConfig, TransferReport, UwError,
    UwNetwork,
};

fn build(nodes: &[(NodeId, f64, f64)], edges: &[(NodeId, NodeId)]) -> Result<UwNetwork, UwError> {
    let mut network = UwNetwork::new();
    for &(id, x, range) in nodes {
        network.add_node(id, Position::new(x, 0.0, 0.0), range, 100.0)?;
    }
    for &(a, b) in edges {
        network.add_edge(a, b)?;
    }
    Ok(network)
}

fn show(title: &str, network: &UwNetwork, report: &TransferReport, sink: &RecordingSink) {
    println!("\n== {} ==", title);
    for hop in report.path.hops() {
        println!("  ({}, {}, {:.2})", hop.from, hop.to, hop.distance);
    }
    println!("  status: {:?}", report.status);
    println!("  escalations: {}", sink.escalations());
    for node in network.nodes() {
        println!(
            "  node {}: energy {:.1} range {:.2} visited {}",
            node.id(),
            node.energy(),
            node.signal_range(),
            node.is_visited()
        );
    }
}

fn run(title: &str, nodes: &[(NodeId, f64, f64)], edges: &[(NodeId, NodeId)], destination: NodeId) -> Result<(), UwError> {
    let mut network = build(nodes, edges)?;
    let mut sink = RecordingSink::new();
    let report = run_transfer(&mut network, 1, destination, &SimulationConfig::default(), &mut sink)?;
    show(title, &network, &report, &sink);
    Ok(())
}

fn main() -> Result<(), UwError> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();

    info!("running hand-built transfers");

    run("direct delivery", &[(1, 0.0, 20.0), (2, 10.0, 20.0)], &[(1, 2)], 2)?;
    run(
        "bridged delivery",
        &[(1, 0.0, 20.0), (2, 15.0, 20.0), (3, 30.0, 20.0)],
        &[(1, 2), (2, 3), (1, 3)],
        3,
    )?;
    run(
        "handover escalation",
        &[(1, 0.0, 20.0), (2, 40.0, 20.0)],
        &[(1, 2)],
        2,
    )?;
    run(
        "isolated destination",
        &[(1, 0.0, 20.0), (2, 10.0, 20.0), (3, 300.0, 20.0)],
        &[(1, 2)],
        3,
    )?;

    Ok(())
}
