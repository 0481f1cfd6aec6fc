// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

// Thin orchestration CLI around the footpath routing library. It plays the
// "graph supplier" role: a snapshot of an already-extracted pedestrian
// network is loaded from disk and handed to the engine. Building snapshots
// from OSM (and drawing the results) lives in other tooling.

use anyhow::{Context, Result, bail};
use clap::Parser;
use footpath::NodeId;
use footpath::heuristic::{GreatCircle, Heuristic, StraightLine};
use footpath::path::evaluate_cost;
use footpath::search::{Route, SearchReport, Strategy, search};
use footpath::street_graph::{Position, StreetGraph};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Find a route between two nodes with one strategy
    Route {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        from: NodeId,
        #[arg(long)]
        to: NodeId,
        #[arg(long, value_enum, default_value = "ucs")]
        mode: Mode,
        #[arg(long, value_enum, default_value = "straight-line")]
        heuristic: HeuristicKind,
    },
    /// Run both strategies on the same pair and compare cost and effort
    Compare {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        from: NodeId,
        #[arg(long)]
        to: NodeId,
        #[arg(long, value_enum, default_value = "straight-line")]
        heuristic: HeuristicKind,
    },
    /// Find the cheapest reachable point of interest in the snapshot
    Nearest {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        from: NodeId,
        #[arg(long, value_enum, default_value = "straight-line")]
        heuristic: HeuristicKind,
    },
}

#[derive(clap::ValueEnum, Copy, Clone, Debug)]
enum Mode {
    Ucs,
    Astar,
}

#[derive(clap::ValueEnum, Copy, Clone, Debug)]
enum HeuristicKind {
    StraightLine,
    GreatCircle,
}

impl HeuristicKind {
    fn as_heuristic(self) -> &'static dyn Heuristic {
        match self {
            HeuristicKind::StraightLine => &StraightLine,
            HeuristicKind::GreatCircle => &GreatCircle,
        }
    }
}

/// On-disk graph snapshot, as written by the extraction tooling.
#[derive(Debug, Serialize, Deserialize)]
struct GraphSnapshot {
    nodes: Vec<SnapshotNode>,
    edges: Vec<SnapshotEdge>,
    #[serde(default)]
    pois: Vec<SnapshotPoi>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotNode {
    id: NodeId,
    x: Option<f64>,
    y: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEdge {
    from: NodeId,
    to: NodeId,
    length_m: Option<f64>,
}

/// A point of interest (bus stop, etc.) already attached to a graph node by
/// the extraction step. The engine itself never reads these.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotPoi {
    node: NodeId,
    name: Option<String>,
    ref_code: Option<String>,
}

impl SnapshotPoi {
    fn label(&self) -> String {
        match (&self.name, &self.ref_code) {
            (Some(name), Some(code)) => format!("{name} [{code}]"),
            (Some(name), None) => name.clone(),
            (None, Some(code)) => format!("[{code}]"),
            (None, None) => "(unnamed)".to_string(),
        }
    }
}

fn load_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let file =
        File::open(path).with_context(|| format!("opening graph snapshot {}", path.display()))?;
    let snapshot: GraphSnapshot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing graph snapshot {}", path.display()))?;
    Ok(snapshot)
}

fn build_graph(snapshot: &GraphSnapshot) -> StreetGraph {
    let mut graph = StreetGraph::new();
    for node in &snapshot.nodes {
        let position = match (node.x, node.y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        };
        graph.add_node(node.id, position);
    }
    for edge in &snapshot.edges {
        graph.add_edge(edge.from, edge.to, edge.length_m);
    }
    graph
}

fn print_report(label: &str, graph: &StreetGraph, report: &SearchReport) -> Result<()> {
    match &report.route {
        Some(route) => {
            // Independent re-pricing; a mismatch here means the graph
            // changed underneath us or the engine is broken.
            let checked =
                evaluate_cost(graph, &route.nodes).context("re-pricing the returned route")?;
            println!("{label}: cost {:.2} m over {} hops", route.cost, route.hops());
            println!(
                "{label}: expanded {} nodes, relaxed {} edges, frontier peak {}, stale skips {}",
                report.stats.nodes_expanded,
                report.stats.edges_relaxed,
                report.stats.max_frontier,
                report.stats.stale_skips
            );
            if (checked - route.cost).abs() > f64::EPSILON {
                bail!(
                    "recorded cost {} disagrees with re-priced cost {}",
                    route.cost,
                    checked
                );
            }
            let rendered: Vec<String> = route.nodes.iter().map(|n| n.to_string()).collect();
            println!("{label}: {}", rendered.join(" -> "));
        }
        None => {
            println!(
                "{label}: no route (expanded {} nodes before the frontier drained)",
                report.stats.nodes_expanded
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Route {
            graph,
            from,
            to,
            mode,
            heuristic,
        } => {
            let snapshot = load_snapshot(&graph)?;
            let graph = build_graph(&snapshot);
            println!(
                "Loaded {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
            let strategy = match mode {
                Mode::Ucs => Strategy::UniformCost,
                Mode::Astar => Strategy::AStar(heuristic.as_heuristic()),
            };
            let report = search(&graph, from, to, strategy)?;
            print_report("route", &graph, &report)?;
        }
        Commands::Compare {
            graph,
            from,
            to,
            heuristic,
        } => {
            let snapshot = load_snapshot(&graph)?;
            let graph = build_graph(&snapshot);
            println!(
                "Loaded {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
            let ucs = search(&graph, from, to, Strategy::UniformCost)?;
            let astar = search(&graph, from, to, Strategy::AStar(heuristic.as_heuristic()))?;
            print_report("ucs", &graph, &ucs)?;
            print_report("astar", &graph, &astar)?;
            if let (Some(u), Some(a)) = (&ucs.route, &astar.route) {
                println!(
                    "summary: cost {:.2} vs {:.2} m, expansions {} vs {}",
                    u.cost, a.cost, ucs.stats.nodes_expanded, astar.stats.nodes_expanded
                );
            }
        }
        Commands::Nearest {
            graph,
            from,
            heuristic,
        } => {
            let snapshot = load_snapshot(&graph)?;
            let graph_built = build_graph(&snapshot);
            if snapshot.pois.is_empty() {
                bail!("snapshot has no points of interest");
            }
            // One search per candidate, engine invoked sequentially; the
            // engine itself stays single-query.
            let mut best: Option<(&SnapshotPoi, Route)> = None;
            for poi in &snapshot.pois {
                if poi.node == from {
                    continue;
                }
                let report = match search(
                    &graph_built,
                    from,
                    poi.node,
                    Strategy::AStar(heuristic.as_heuristic()),
                ) {
                    Ok(report) => report,
                    Err(e) => {
                        // A POI attached to a node the snapshot forgot to
                        // include is the extractor's bug, not ours.
                        tracing::warn!(poi = %poi.label(), error = %e, "skipping poi");
                        continue;
                    }
                };
                if let Some(route) = report.route {
                    let better = match &best {
                        Some((_, incumbent)) => route.cost < incumbent.cost,
                        None => true,
                    };
                    if better {
                        best = Some((poi, route));
                    }
                }
            }
            match best {
                Some((poi, route)) => {
                    println!(
                        "nearest poi: {} at node {} ({:.2} m, {} hops)",
                        poi.label(),
                        poi.node,
                        route.cost,
                        route.hops()
                    );
                    let rendered: Vec<String> = route.nodes.iter().map(|n| n.to_string()).collect();
                    println!("route: {}", rendered.join(" -> "));
                }
                None => println!("no point of interest is reachable from {from}"),
            }
        }
    }

    Ok(())
}
