use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use workfunnel::router::MethodTable;
use workfunnel::{
    AppConfig, AppService, Controller, ControllerError, Counters, DispatchTree, HandlerRef,
    HandlerRequest, HttpServer, RuntimeConfig, WorkLoop,
};

#[derive(Parser)]
#[command(name = "workfunnel")]
#[command(version, about = "Serialized dispatch-tree HTTP service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server with the node-tree controllers
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,

        /// YAML configuration file (section -> key -> value)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn parse_node_id(req: &HandlerRequest) -> Result<u64, ControllerError> {
    let raw = req
        .get_path_param("id")
        .ok_or_else(|| ControllerError::not_found("node"))?;
    raw.parse()
        .map_err(|_| ControllerError::not_found(format!("node {raw}")))
}

/// The node-tree controller: every operation touches the dispatch tree, so
/// every handler is serialized.
fn nodes_controller() -> Controller {
    let mut nodes = Controller::new("nodes");

    nodes.register(
        "/",
        MethodTable::new().get(HandlerRef::serialized(|_req, tree| Ok(tree.summary_json()))),
    );

    nodes.register(
        "/{id}",
        MethodTable::new()
            .get(HandlerRef::serialized(|req, tree| {
                let id = parse_node_id(req)?;
                tree.node_json(id)
                    .ok_or_else(|| ControllerError::not_found(format!("node {id}")).into())
            }))
            .put(HandlerRef::serialized(|req, tree| {
                let id = parse_node_id(req)?;
                let data = req.body.clone().unwrap_or(Value::Null);
                tree.update_data(id, data)?;
                Ok(json!({ "id": id, "updated": true }))
            }))
            .delete(HandlerRef::serialized(|req, tree| {
                let id = parse_node_id(req)?;
                let removed = tree.remove(id)?;
                Ok(json!({ "id": id, "removed": removed }))
            })),
    );

    nodes.register(
        "/{id}/children",
        MethodTable::new().post(HandlerRef::serialized(|req, tree| {
            let id = parse_node_id(req)?;
            let body = req.body.as_ref();
            let name = body
                .and_then(|b| b.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("node");
            let data = body
                .and_then(|b| b.get("data"))
                .cloned()
                .unwrap_or(Value::Null);
            let child = tree.create_child(id, name, data)?;
            Ok(json!({ "id": child, "parent": id }))
        })),
    );

    nodes
}

fn root_controller() -> Controller {
    let mut root = Controller::new("root");
    root.register(
        "/",
        MethodTable::new().get(HandlerRef::direct(|_req| {
            Ok(json!({ "service": "workfunnel", "version": env!("CARGO_PKG_VERSION") }))
        })),
    );
    root.mount("nodes", Arc::new(nodes_controller()));
    root
}

fn serve(addr: &str, config: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::empty(),
    };
    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let work_loop = WorkLoop::spawn(DispatchTree::new(), runtime.stack_size)?;
    let service = AppService::new(
        Arc::new(root_controller()),
        work_loop.queue(),
        Arc::new(Counters::new()),
        Arc::new(config),
    );

    let handle = HttpServer(service).start(addr, work_loop)?;
    info!(addr, "Server started");
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server terminated: {e:?}"))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Serve { addr, config } => serve(addr, config.as_ref()),
    }
}
