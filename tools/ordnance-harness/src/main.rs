//! ordnance-harness: headless runner for content packs and scenarios.
//!
//! Usage:
//!   ordnance-harness inspect --content pack.json
//!   ordnance-harness run --content pack.json --scenario scenario.json
//!   ordnance-harness replicate --content pack.json --scenario scenario.json --drop-every 3

mod scenario;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use glam::Vec2;
use serde::Serialize;

use ordnance_core::enums::Role;
use ordnance_sim::replication::LoopbackTransport;
use ordnance_sim::{EngineConfig, ProjectileEngine, ProjectileId};

use scenario::Prepared;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "inspect" => cmd_inspect(&args[2..]),
        "run" => cmd_run(&args[2..]),
        "replicate" => cmd_replicate(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Reports go to stdout, so logs always go to stderr.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn print_usage() {
    eprintln!(
        "ordnance-harness: headless projectile engine runner\n\
         \n\
         Commands:\n\
         \n\
         inspect    Load a content pack and print every finalized descriptor\n\
         \n\
           --content <path>   Content pack JSON\n\
         \n\
         run        Run a scenario and print one JSON tick report per line\n\
         \n\
           --content <path>   Content pack JSON\n\
           --scenario <path>  Scenario JSON (config, targets, shots)\n\
           --ticks <N>        Override the scenario tick count\n\
         \n\
         replicate  Run a scenario on an authority and a replica linked by a\n\
                    loopback transport and report trajectory divergence\n\
         \n\
           --content <path>   Content pack JSON\n\
           --scenario <path>  Scenario JSON\n\
           --ticks <N>        Override the scenario tick count\n\
           --drop-every <N>   Drop every N-th creation message\n\
         \n\
         Logging: RUST_LOG (default info), LOG_FORMAT=json\n"
    );
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn parse_path(args: &[String], flag: &str) -> PathBuf {
    match parse_value(args, flag) {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("Error: {flag} <path> is required");
            process::exit(1);
        }
    }
}

fn parse_count(args: &[String], flag: &str) -> Option<u64> {
    parse_value(args, flag).and_then(|v| v.parse().ok())
}

fn prepare_or_exit(content: &Path, scenario: &Path) -> Prepared {
    match scenario::prepare(content, scenario) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(%e, "failed to serialize output line"),
    }
}

// --- Inspect command ---

#[derive(Serialize)]
struct DescriptorSummary<'a> {
    id: Option<u16>,
    name: &'a str,
    range: f32,
    estimated_damage: f32,
    draw_size: f32,
    light_radius: f32,
    despawn_hit: bool,
}

fn cmd_inspect(args: &[String]) {
    let content = parse_path(args, "--content");
    let registry = match scenario::load_registry(&content) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    for d in registry.iter() {
        print_json(&DescriptorSummary {
            id: d.id.map(|id| id.0),
            name: &d.name,
            range: d.range,
            estimated_damage: d.estimate_damage(),
            draw_size: d.draw_size,
            light_radius: d.presentation.light_radius,
            despawn_hit: d.despawn_hit,
        });
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let prepared = prepare_or_exit(&parse_path(args, "--content"), &parse_path(args, "--scenario"));
    let ticks = parse_count(args, "--ticks").unwrap_or(prepared.scenario.ticks);

    let mut engine = ProjectileEngine::new(Arc::clone(&prepared.registry), prepared.scenario.config.clone());
    let mut world = prepared.world();

    let mut hits = 0usize;
    let mut removed = 0usize;
    let mut faults = 0u32;
    for tick in 0..ticks {
        for (descriptor, ctx) in prepared.schedule.get(&tick).into_iter().flatten() {
            engine.create(&mut world, descriptor, ctx.clone());
        }
        let report = engine.tick(&mut world);
        hits += report.hits.len();
        removed += report.removed.len();
        faults += report.faults;
        print_json(&report);
    }

    let log = world.log();
    tracing::info!(
        ticks,
        elapsed_secs = engine.time().elapsed_secs(),
        hits,
        removed,
        faults,
        killed = log.killed.len(),
        fires = log.fires.len(),
        units = log.units.len(),
        live = engine.live_count(),
        "scenario finished"
    );
}

// --- Replicate command ---

#[derive(Serialize)]
struct DivergenceLine {
    tick: u64,
    authority_live: usize,
    replica_live: usize,
    /// Projectiles whose replica position differs from the authority's.
    diverged: usize,
    max_error: f32,
}

fn positions(engine: &ProjectileEngine) -> HashMap<ProjectileId, Vec2> {
    engine.projectiles().map(|p| (p.id(), p.position)).collect()
}

fn cmd_replicate(args: &[String]) {
    let prepared = prepare_or_exit(&parse_path(args, "--content"), &parse_path(args, "--scenario"));
    let ticks = parse_count(args, "--ticks").unwrap_or(prepared.scenario.ticks);
    let drop_every = parse_count(args, "--drop-every").unwrap_or(0) as usize;

    let authority_config = EngineConfig {
        role: Role::Authority,
        ..prepared.scenario.config.clone()
    };
    let replica_config = EngineConfig {
        role: Role::Replica,
        ..prepared.scenario.config.clone()
    };
    let mut authority = ProjectileEngine::new(Arc::clone(&prepared.registry), authority_config);
    let mut replica = ProjectileEngine::new(Arc::clone(&prepared.registry), replica_config);
    let mut authority_world = prepared.world();
    let mut replica_world = prepared.world();
    let mut transport = LoopbackTransport::dropping_every(drop_every);

    let mut total_diverged = 0usize;
    for tick in 0..ticks {
        for (descriptor, ctx) in prepared.schedule.get(&tick).into_iter().flatten() {
            authority.create_replicated(&mut authority_world, &mut transport, descriptor, ctx.clone());
        }
        for payload in transport.drain() {
            replica.receive(&mut replica_world, &payload);
        }
        authority.tick(&mut authority_world);
        replica.tick(&mut replica_world);

        // Slot identities only line up while no message has been dropped.
        let expected = positions(&authority);
        let actual = positions(&replica);
        let mut diverged = 0;
        let mut max_error = 0.0f32;
        for (id, position) in &expected {
            match actual.get(id) {
                Some(other) => {
                    let error = position.distance(*other);
                    if error > 0.0 {
                        diverged += 1;
                        max_error = max_error.max(error);
                    }
                }
                None => diverged += 1,
            }
        }
        total_diverged += diverged;
        print_json(&DivergenceLine {
            tick,
            authority_live: authority.live_count(),
            replica_live: replica.live_count(),
            diverged,
            max_error,
        });
    }

    tracing::info!(ticks, drop_every, total_diverged, "replication run finished");
}
