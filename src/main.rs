//! Run a simulation on one of the built-in topologies.

use clap::{Parser, ValueEnum};
use itertools::Itertools;
use ssbgpsim::bgp::ShortestPathExtender;
use ssbgpsim::delay::RandomDelayGenerator;
use ssbgpsim::engine::Engine;
use ssbgpsim::protocol::{Detection, Protocol};
use ssbgpsim::runner::RepetitionRunner;
use ssbgpsim::topology::{Topology, TopologyBuilder};
use ssbgpsim::{NodeId, Time, TopologyError};

/// Built-in topologies. Node 0 has a link to every other node, and nodes 1, 2 and 3 form a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Topo {
    /// Cycle with link costs 1, -1 and 2, where the routing loop is recurrent.
    Cycle,
    /// Cycle with link costs -3, 1 and 2, where the routing loop is absorbed.
    Absorbent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    Bgp,
    Ssbgp,
    Issbgp,
}

impl From<Variant> for Detection {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Bgp => Detection::None,
            Variant::Ssbgp => Detection::Weak,
            Variant::Issbgp => Detection::Strong,
        }
    }
}

/// Simulate BGP, SS-BGP or ISS-BGP repeatedly on a small topology.
#[derive(Debug, Parser)]
struct Cli {
    /// Topology to simulate.
    #[clap(long = "topo", short = 't', value_enum, default_value = "cycle")]
    topo: Topo,
    /// Protocol deployed on every node.
    #[clap(long = "protocol", short = 'p', value_enum, default_value = "ssbgp")]
    protocol: Variant,
    /// Destination node.
    #[clap(long, short, default_value_t = 0)]
    destination: NodeId,
    /// Number of repetitions.
    #[clap(long = "repetitions", short = 'r', default_value_t = 1)]
    repetitions: usize,
    /// Minimum message delay.
    #[clap(long, default_value_t = 0)]
    min_delay: Time,
    /// Maximum message delay.
    #[clap(long, default_value_t = 0)]
    max_delay: Time,
    /// Seed of the first repetition. A random seed is picked if omitted.
    #[clap(long, short)]
    seed: Option<u64>,
    /// Maximum simulated time.
    #[clap(long, default_value_t = 1000)]
    threshold: Time,
    /// Minimum route advertisement interval.
    #[clap(long, default_value_t = 0)]
    mrai: Time,
}

fn build_topology(topo: Topo, protocol: Protocol) -> Result<Topology, TopologyError> {
    let costs: [(NodeId, NodeId, i32); 6] = match topo {
        Topo::Cycle => [(1, 0, 0), (2, 0, 0), (3, 0, 0), (1, 2, 1), (2, 3, -1), (3, 1, 2)],
        Topo::Absorbent => [(1, 0, 0), (2, 0, 0), (3, 0, 0), (1, 2, -3), (2, 3, 1), (3, 1, 2)],
    };
    let mut builder = TopologyBuilder::new();
    for id in 0..4 {
        builder.add_node(id, protocol.clone());
    }
    for (tail, head, cost) in costs {
        builder.add_link(tail, head, ShortestPathExtender::new(cost))?;
    }
    Ok(builder.build())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_timed();

    let args = Cli::parse();

    let protocol = Protocol::new(args.protocol.into(), args.mrai);
    let mut topology = build_topology(args.topo, protocol)?;
    let mut engine = Engine::new();

    let runner = RepetitionRunner::new(args.destination, args.repetitions, args.threshold);
    let delays = match args.seed {
        Some(seed) => RandomDelayGenerator::new(args.min_delay, args.max_delay, seed),
        None => RandomDelayGenerator::with_random_seed(args.min_delay, args.max_delay),
    };
    for summary in runner.run(&mut engine, &mut topology, delays)? {
        println!(
            "run {} (seed {}): {} at t={}, {} messages, {} exports, {} detections",
            summary.repetition,
            summary.seed,
            if summary.terminated { "terminated" } else { "did not terminate" },
            summary.time,
            summary.messages,
            summary.exports,
            summary.detections,
        );
    }

    // state of the last repetition
    for node in topology.nodes() {
        let disabled = topology
            .out_neighbors(node.id())
            .into_iter()
            .filter(|n| !node.protocol.is_enabled(*n))
            .join(", ");
        println!(
            "node {}: {} via {:?}, disabled: [{}]",
            node.id(),
            node.protocol.selected_route(),
            node.protocol.selected_neighbor(),
            disabled
        );
    }

    Ok(())
}
