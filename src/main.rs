//! `spa-router`: inspect and exercise a route table from the command line.
//!
//! Views are simulated: eager routes get a placeholder handle, lazy routes a
//! loader that takes a short while to "download".

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use spa_router::config::{load_config, parse_config, ConfigWatcher, RouteConfig, RouterConfig};
use spa_router::lifecycle::{wait_for_signal, Shutdown, StopReason};
use spa_router::observability::logging::init_logging;
use spa_router::{
    LazyView, NavigationOutcome, NavigationTarget, ResolvedRoute, RouteTable, Router, ViewHandle,
    ViewRegistry,
};

const DEMO_ROUTES: &str = r#"
[[routes]]
path = "/"
name = "login"
view = "LoginPage"

[[routes]]
path = "/user"
name = "user"
view = "UserPage"

[[routes]]
path = "/patient-manage"
name = "PatientManage"
view = "PatientManage"

[[routes]]
path = "/patient/:id"
name = "PatientPage"
view = "PatientPage"
props = true

[[routes.children]]
path = "3d-view"
name = "Patient3D"
view = "Patient3D"
props = true

[[routes]]
path = "/admin"
name = "AdminPage"
view = "AdminPage"

[[routes]]
path = "/bluetooth"
name = "BlueTooth"
view = "BlueTooth"
lazy = true
"#;

const SIMULATED_FETCH: Duration = Duration::from_millis(150);

#[derive(Parser)]
#[command(name = "spa-router")]
#[command(about = "Inspect and exercise a client-side route table", long_about = None)]
struct Cli {
    /// Route file (TOML). The built-in demo table is used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset. Overrides the route file.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the flattened route table
    Routes,
    /// Resolve a location without navigating
    Resolve { path: String },
    /// Generate the path of a named route
    Href {
        name: String,
        /// Parameters as key=value
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Navigate through paths (starting with '/') or route names, then print the history
    Navigate {
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Watch the route file and apply changes until interrupted
    Watch,
}

#[derive(Serialize)]
struct RouteReport<'a> {
    pattern: &'a str,
    name: Option<&'a str>,
    view: &'a str,
    full_path: &'a str,
    params: &'a HashMap<String, String>,
    query: &'a HashMap<String, String>,
    hash: Option<&'a str>,
    props: Option<HashMap<String, String>>,
    meta: &'a HashMap<String, String>,
    matched: Vec<&'a str>,
}

impl<'a> RouteReport<'a> {
    fn new(resolved: &'a ResolvedRoute, table: &'a RouteTable) -> Self {
        Self {
            pattern: resolved.route.pattern.source(),
            name: resolved.name(),
            view: resolved.route.view.label(),
            full_path: &resolved.full_path,
            params: &resolved.params,
            query: &resolved.query,
            hash: resolved.hash.as_deref(),
            props: resolved.props(),
            meta: &resolved.route.meta,
            matched: resolved
                .matched
                .iter()
                .filter_map(|id| table.get(*id))
                .map(|route| route.pattern.source())
                .collect(),
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

/// Registry with a placeholder for every view key in the route file.
fn simulated_registry(routes: &[RouteConfig], registry: ViewRegistry) -> ViewRegistry {
    routes.iter().fold(registry, |registry, route| {
        let registry = if route.lazy {
            let key = route.view.clone();
            registry.with_loader(
                route.view.clone(),
                LazyView::new(route.view.clone(), move || {
                    let key = key.clone();
                    async move {
                        tokio::time::sleep(SIMULATED_FETCH).await;
                        Ok(ViewHandle::new(key))
                    }
                }),
            )
        } else {
            registry.with_component(route.view.clone(), ViewHandle::new(route.view.clone()))
        };
        simulated_registry(&route.children, registry)
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: RouterConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => parse_config(DEMO_ROUTES)?,
    };
    init_logging(
        cli.log_level
            .as_deref()
            .unwrap_or(&config.observability.log_level),
    );

    let registry = simulated_registry(&config.routes, ViewRegistry::new());
    let router = Router::from_config(&config, registry)?;
    tracing::info!(routes = router.table().len(), "Route table loaded");

    match cli.command {
        Commands::Routes => {
            for route in router.table().all() {
                println!(
                    "{:>3}  {:<28} {:<16} {}{}",
                    route.id.0,
                    route.pattern.source(),
                    route.name.as_deref().unwrap_or("-"),
                    route.view.label(),
                    if route.view.is_lazy() { " (lazy)" } else { "" },
                );
            }
        }
        Commands::Resolve { path } => {
            let resolved = router.resolve(&path)?;
            let table = router.table();
            print_json(&RouteReport::new(&resolved, &table))?;
        }
        Commands::Href { name, params } => {
            let params: HashMap<String, String> = params.into_iter().collect();
            println!("{}", router.href(&name, &params)?);
        }
        Commands::Navigate { targets } => {
            for target in targets {
                let target = if target.starts_with('/') {
                    NavigationTarget::Path(target)
                } else {
                    NavigationTarget::named(target, HashMap::<String, String>::new())
                };
                match router.navigate(target.clone()).await {
                    NavigationOutcome::Committed(route) => {
                        let view = router
                            .active()
                            .map(|active| active.view.name().to_string())
                            .unwrap_or_default();
                        println!("committed  {:<28} -> {}", route.full_path, view);
                    }
                    NavigationOutcome::Cancelled(reason) => {
                        println!("cancelled  {:?}: {:?}", target, reason);
                    }
                    NavigationOutcome::Failed(error) => {
                        println!("failed     {:?}: {}", target, error);
                    }
                }
            }
            print_json(&router.history())?;
        }
        Commands::Watch => {
            let Some(path) = cli.config.as_deref() else {
                return Err("watch requires --config".into());
            };
            let (watcher, updates) = ConfigWatcher::spawn(path)?;
            let shutdown = Shutdown::new();

            let mut reloader = tokio::spawn({
                let router = router.clone();
                let shutdown_rx = shutdown.subscribe();
                async move { router.apply_updates(updates, shutdown_rx).await }
            });

            tracing::info!(path = ?watcher.path(), "Watching route file, ctrl-c to stop");
            tokio::select! {
                _ = wait_for_signal() => {
                    shutdown.trigger(StopReason::Signal);
                    reloader.await?;
                }
                finished = &mut reloader => {
                    finished?;
                    shutdown.trigger(StopReason::WatcherClosed);
                }
            }
            tracing::info!(
                reason = shutdown.reason().map_or("unknown", |r| r.as_str()),
                "Shutdown complete"
            );
        }
    }

    Ok(())
}
