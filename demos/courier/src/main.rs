//! courier: a single courier guided by Delegate MAS routing.
//!
//! Packages are scattered over a 5 × 5 district grid.  Each package's agent
//! advertises itself with feasibility waves; once the tables have warmed up,
//! the courier repeatedly explores from the nearest waiting package, follows
//! the best route it hears back, and delivers every package on it.
//!
//! ```text
//! courier [scenario.toml] [packages.csv]
//! ```
//!
//! Both arguments are optional; the embedded defaults below are used when
//! they are missing.  Log verbosity follows `RUST_LOG` (default `info`).

mod network;

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use dm_core::{AgentId, PackageId, Point, SimConfig, Tick};
use dm_routing::{Package, RoutingConfig, load_packages_csv, load_packages_reader};
use dm_sim::{Sim, SimBuilder, SimObserver, TickReport};
use dm_spatial::NetworkRoad;

use network::build_grid;

// ── Embedded scenario ─────────────────────────────────────────────────────────

const DEFAULT_SCENARIO: &str = r#"
[sim]
tick_duration_ms = 60000
total_ticks      = 240
seed             = 42

[routing]
feasibility_interval = 5
max_feasibility_hops = 3
exploration_hops     = 4
broadcast_range      = 900.0
evaporation          = 0.9

[courier]
warmup_ticks    = 10
ticks_per_stop  = 6
start_x         = 0.0
start_y         = 0.0
"#;

const DEFAULT_PACKAGES: &str = "\
package_id,pickup_x,pickup_y,delivery_x,delivery_y\n\
0,100.0,0.0,600.0,400.0\n\
1,900.0,500.0,1400.0,900.0\n\
2,1600.0,1000.0,2000.0,1500.0\n\
3,2100.0,1700.0,1500.0,2000.0\n\
4,0.0,1500.0,400.0,2000.0\n\
5,500.0,2100.0,1000.0,1900.0\n\
6,2000.0,0.0,1500.0,400.0\n\
7,1000.0,1000.0,100.0,1100.0\n\
";

// ── Scenario file ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct Scenario {
    sim:     SimConfig,
    routing: RoutingConfig,
    courier: CourierConfig,
}

#[derive(Deserialize)]
#[serde(default)]
struct CourierConfig {
    /// Ticks of feasibility waves before the courier first explores.
    warmup_ticks:   u64,
    /// Ticks the courier spends driving to and serving one package.
    ticks_per_stop: u64,
    start_x:        f64,
    start_y:        f64,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self { warmup_ticks: 10, ticks_per_stop: 6, start_x: 0.0, start_y: 0.0 }
    }
}

fn load_scenario(path: Option<&str>) -> Result<Scenario> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading scenario {p}"))?,
        None => DEFAULT_SCENARIO.to_owned(),
    };
    toml::from_str(&text).context("parsing scenario TOML")
}

fn load_packages(path: Option<&str>) -> Result<Vec<Package>> {
    let packages = match path {
        Some(p) => load_packages_csv(Path::new(p)).with_context(|| format!("loading manifest {p}"))?,
        None => load_packages_reader(Cursor::new(DEFAULT_PACKAGES))?,
    };
    Ok(packages)
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MessageTally {
    ticks:     u64,
    delivered: u64,
    dropped:   u64,
}

impl SimObserver for MessageTally {
    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        self.ticks += 1;
        self.delivered += report.delivered();
        self.dropped += report.dropped();
        if tick.0 % 50 == 0 {
            info!(%tick, active = report.ticked, delivered = report.delivered(), "progress");
        }
    }
}

// ── Courier ───────────────────────────────────────────────────────────────────

/// The waiting package closest to `at`, by straight-line distance to its
/// pickup point.
fn nearest_waiting(sim: &Sim<NetworkRoad>, at: Point) -> Option<PackageId> {
    sim.packages()
        .filter(|p| p.needs_pickup())
        .min_by(|a, b| {
            let da = a.pickup_location().distance(at);
            let db = b.pickup_location().distance(at);
            da.total_cmp(&db)
        })
        .map(|p| p.id)
}

/// Ask the explorer for a route starting at `first`'s agent.  Falls back to
/// `first` alone if nothing came back.
fn plan_route(
    sim:      &mut Sim<NetworkRoad>,
    explorer: AgentId,
    first:    PackageId,
    tally:    &mut MessageTally,
) -> Result<Vec<PackageId>> {
    let Some(agent) = sim.agent_for(first).map(|a| a.id()) else {
        return Ok(vec![]);
    };
    let known = sim.explorer(explorer).map_or(0, |e| e.routes().len());
    sim.explore(explorer, agent)?;
    sim.run_ticks(1, tally)?;

    // Only routes reported for this request; the longest wins.
    let route: Vec<PackageId> = sim
        .explorer(explorer)
        .and_then(|e| e.routes().get(known..))
        .and_then(|fresh| fresh.iter().max_by_key(|r| r.path.len()))
        .map(|r| r.path.agents().filter_map(|a| sim.agent(a).map(|pa| pa.package_id())).collect())
        .unwrap_or_default();

    if route.is_empty() {
        warn!(package = %first, "exploration returned nothing");
        return Ok(vec![first]);
    }
    Ok(route)
}

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .context("creating log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let scenario = load_scenario(args.first().map(String::as_str))?;
    let packages = load_packages(args.get(1).map(String::as_str))?;

    println!("=== courier: Delegate MAS routing ===");
    println!(
        "Packages: {}  |  Ticks: {}  |  Seed: {}",
        packages.len(),
        scenario.sim.total_ticks,
        scenario.sim.seed
    );

    // 1. Road network.
    let network = build_grid();
    println!("Road network: {} nodes, {} edges", network.node_count(), network.edge_count());

    // 2. Sim.
    let mut sim = SimBuilder::new(scenario.sim.clone(), scenario.routing, NetworkRoad::new(network))
        .packages(packages)
        .build()?;
    let mut courier_at = Point::new(scenario.courier.start_x, scenario.courier.start_y);
    let explorer = sim.add_explorer(courier_at)?;

    // 3. Warm up the path tables.
    let mut tally = MessageTally::default();
    let t0 = Instant::now();
    sim.run_ticks(scenario.courier.warmup_ticks, &mut tally)?;

    // 4. Serve packages route by route until time runs out.
    let end = scenario.sim.end_tick();
    let mut delivered = Vec::new();
    while sim.clock.current_tick < end {
        let Some(first) = nearest_waiting(&sim, courier_at) else {
            info!("every package delivered");
            break;
        };

        let route = plan_route(&mut sim, explorer, first, &mut tally)?;
        info!(tick = %sim.clock.current_tick, stops = route.len(), "following route");

        for package in route {
            if sim.clock.current_tick >= end {
                break;
            }
            let Some(pkg) = sim.package(package) else { continue };
            if !pkg.needs_pickup() {
                continue;
            }
            let delivery = pkg.delivery_location();

            sim.pickup_package(package)?;
            sim.run_ticks(scenario.courier.ticks_per_stop, &mut tally)?;
            sim.deliver_package(package)?;

            courier_at = delivery;
            sim.move_explorer(explorer, courier_at)?;
            delivered.push(package);
        }
    }
    let elapsed = t0.elapsed();

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s ({} ticks)", elapsed.as_secs_f64(), tally.ticks);
    println!("  messages delivered : {}", tally.delivered);
    println!("  messages dropped   : {}", tally.dropped);
    println!("  delivery order     : {delivered:?}");
    println!();

    println!("{:<12} {:<14} {:<8} {:<10}", "Package", "State", "Routes", "Pheromone");
    println!("{}", "-".repeat(46));
    for p in sim.packages() {
        let (routes, pheromone) = sim
            .agent_for(p.id)
            .map_or((0, 0.0), |a| (a.path_table().len(), a.path_table().total_intensity()));
        println!("{:<12} {:<14} {:<8} {:<10.3}", p.id.0, p.state().as_str(), routes, pheromone);
    }

    Ok(())
}
