// SPDX-License-Identifier: MIT OR Apache-2.0
//! OrdoPlay Dataflow Runner - headless graph host
//!
//! Loads a graph layout, binds it against a small set of host objects and
//! ticks it at a fixed delta time, logging the output value every tick.

use clap::Parser;
use ordoplay_dataflow::nodes::create_builtin_registry;
use ordoplay_dataflow::{
    Color, GraphError, GraphLayout, GraphSettings, GraphValue, LayoutError, NodeGraph,
    ObjectRecord, ObjectTable, SharedValue, Value, ValueType,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load and tick an OrdoPlay dataflow graph", long_about = None)]
struct Cli {
    /// Graph layout file (RON)
    graph: PathBuf,
    /// Graph settings file (RON)
    #[arg(short, long)]
    settings: Option<PathBuf>,
    /// Number of ticks to run
    #[arg(short, long, default_value_t = 8)]
    ticks: u32,
    /// Delta time per tick, in seconds
    #[arg(short, long, default_value_t = 0.25)]
    dt: f32,
    /// Write the graph layout back out after the run
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum RunnerError {
    #[error("Failed to read settings: {0}")]
    Settings(#[from] std::io::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Host values exposed to graphs as the `host` object
struct HostClock {
    time: SharedValue<f32>,
    delta: SharedValue<f32>,
    tick: SharedValue<i32>,
}

impl HostClock {
    fn new() -> Self {
        Self {
            time: SharedValue::new(0.0),
            delta: SharedValue::new(0.0),
            tick: SharedValue::new(0),
        }
    }

    fn objects(&self) -> ObjectTable {
        let host = ObjectRecord::new()
            .with_member::<f32>("time", Arc::new(self.time.clone()))
            .with_member::<f32>("delta", Arc::new(self.delta.clone()))
            .with_member::<i32>("tick", Arc::new(self.tick.clone()));
        let mut objects = ObjectTable::new();
        objects.insert("host", host);
        objects
    }

    fn advance(&self, delta_time: f32) {
        self.time.set(self.time.get() + delta_time);
        self.delta.set(delta_time);
        self.tick.set(self.tick.get() + 1);
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    tracing::info!("Starting OrdoPlay Dataflow Runner v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Run failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ordoplay_dataflow=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn run(cli: &Cli) -> Result<(), RunnerError> {
    let settings = match &cli.settings {
        Some(path) => GraphSettings::load(path)?,
        None => GraphSettings::default(),
    };
    let layout = GraphLayout::load(&cli.graph)?;
    let registry = create_builtin_registry();
    let clock = HostClock::new();

    let (mut graph, report) =
        NodeGraph::from_layout(&layout, &registry, &clock.objects(), settings)?;
    if !report.is_complete() {
        tracing::warn!(
            unresolved = report.unresolved,
            "Some host bindings did not resolve and read as zero"
        );
    }

    graph.init()?;
    tracing::debug!(inputs = ?graph.input_nodes(), "Input nodes");

    for tick in 1..=cli.ticks {
        clock.advance(cli.dt);
        graph.update(cli.dt)?;
        match output_value(&graph)? {
            Some(value) => tracing::info!(tick, time = clock.time.get(), ?value, "Tick"),
            None => tracing::info!(tick, time = clock.time.get(), "Tick (no output)"),
        }
    }

    if let Some(path) = &cli.save {
        graph.to_layout().save(path)?;
        tracing::info!(?path, "Saved layout");
    }
    Ok(())
}

/// Output of the graph in whatever type its output node produces
fn output_value(graph: &NodeGraph) -> Result<Option<Value>, GraphError> {
    let Some(value_type) = graph
        .output_node()
        .and_then(|id| graph.node(id).and_then(|node| node.output_type()))
    else {
        return Ok(None);
    };

    let value = match value_type {
        ValueType::Bool => graph.get_value::<bool>()?.into_value(),
        ValueType::Int => graph.get_value::<i32>()?.into_value(),
        ValueType::Float => graph.get_value::<f32>()?.into_value(),
        ValueType::Vector2 => graph.get_value::<[f32; 2]>()?.into_value(),
        ValueType::Vector3 => graph.get_value::<[f32; 3]>()?.into_value(),
        ValueType::Vector4 => graph.get_value::<[f32; 4]>()?.into_value(),
        ValueType::Color => graph.get_value::<Color>()?.into_value(),
        ValueType::String => graph.get_value::<String>()?.into_value(),
    };
    Ok(Some(value))
}
