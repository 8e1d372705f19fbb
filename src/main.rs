//! bench-teleport - offline tooling for the bench store
//!
//! Usage: bench-teleport <command>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

use bench_teleport::app::{BenchApp, UiEvent};
use bench_teleport::bench::{
    self, BenchKey, BenchRegistry, BenchStore, CategoryResolver, LoadSummary, ZoneNames,
};
use bench_teleport::category::{CategoryIndex, FavoriteCategories};
use bench_teleport::config::{self, Config};
use bench_teleport::file_store::JsonFileStore;
use bench_teleport::geometry::Vec2;
use bench_teleport::host::{AnchorMarker, PersistenceStore, WorldQuery};
use bench_teleport::logging;
use bench_teleport::sim::SimHost;
use bench_teleport::teleport::TeleportRequest;

#[derive(Parser)]
#[command(name = "bench-teleport")]
#[command(about = "Inspect, migrate and exercise a bench store")]
struct Cli {
    /// Config file (defaults to ~/.bench-teleport/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print categories and benches in menu order
    Inspect {
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Import a legacy flat bench list into the store
    Migrate {
        /// File holding the flat payload
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Print the stored benches in the legacy flat format
    Export {
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Run the record / merge / protect / teleport walkthrough in memory
    Simulate,
}

/// World stand-in with no live scene. Each scene is its own zone.
struct OfflineWorld;

impl WorldQuery for OfflineWorld {
    fn zone_key(&self, scene: &str) -> Option<String> {
        (!scene.is_empty()).then(|| scene.to_string())
    }

    fn anchor_markers(&self) -> Vec<AnchorMarker> {
        Vec::new()
    }

    fn camera_view_width(&self) -> Option<f32> {
        None
    }

    fn overlaps_terrain(&self, _center: Vec2, _size: Vec2) -> bool {
        false
    }
}

struct Loaded {
    store: JsonFileStore,
    zones: ZoneNames,
    favorites: FavoriteCategories,
    registry: BenchRegistry,
    summary: LoadSummary,
}

fn open_store(path: Option<PathBuf>) -> Result<JsonFileStore> {
    let path = path.unwrap_or_else(JsonFileStore::default_path);
    JsonFileStore::open(&path).with_context(|| format!("Failed to open store {}", path.display()))
}

fn load(path: Option<PathBuf>, config: &Config) -> Result<Loaded> {
    let store = open_store(path)?;
    let zones = bench::load_zone_names(&store);
    let favorites = bench::load_favorite_categories(&store);
    let mut registry = BenchRegistry::new(&config.get_registry());
    let summary = {
        let resolver = CategoryResolver::new(&zones, &OfflineWorld);
        BenchStore::new().load_benches(&store, &mut registry, &resolver)
    };
    Ok(Loaded {
        store,
        zones,
        favorites,
        registry,
        summary,
    })
}

fn inspect(path: Option<PathBuf>, config: &Config) -> Result<()> {
    let loaded = load(path, config)?;
    let resolver = CategoryResolver::new(&loaded.zones, &OfflineWorld);
    let mut index = CategoryIndex::new();
    index.rebuild(&loaded.registry, &resolver, &loaded.favorites);

    println!(
        "{} ({} benches, {} categories)",
        loaded.store.path().display(),
        loaded.registry.len(),
        index.category_count()
    );
    for anomaly in &loaded.summary.anomalies {
        println!("  ! {}", anomaly);
    }

    for category in index.category_names() {
        let star = if loaded.favorites.contains(category) { "*" } else { " " };
        println!("{} {}", star, category);
        for record in index.records_in(category, &loaded.registry) {
            let star = if record.is_favorite { "*" } else { " " };
            println!("    {} {:<24} {}", star, record.display_name, record.key);
        }
    }
    Ok(())
}

fn migrate(input: &Path, path: Option<PathBuf>, config: &Config) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read flat payload {}", input.display()))?;
    let mut loaded = load(path, config)?;

    let report = {
        let resolver = CategoryResolver::new(&loaded.zones, &OfflineWorld);
        bench::decode_flat(&raw, &resolver)
    };
    for anomaly in &report.anomalies {
        println!("  ! {}", anomaly);
    }

    let imported = report.records.len();
    loaded.registry.replace_records(report.records);
    loaded.registry.mark_dirty();
    BenchStore::new().save_benches(&mut loaded.store, &mut loaded.registry)?;
    loaded.store.request_autosave()?;

    info!(imported, kept = loaded.registry.len(), "Migrated flat bench list");
    println!(
        "Imported {} benches into {}",
        loaded.registry.len(),
        loaded.store.path().display()
    );
    Ok(())
}

fn export(path: Option<PathBuf>, config: &Config) -> Result<()> {
    let loaded = load(path, config)?;
    println!("{}", bench::encode_flat(loaded.registry.records()));
    Ok(())
}

fn simulate(config: &Config) -> Result<()> {
    let mut host = SimHost::new("Area_01");
    host.add_zone("Area_01", "AREA");
    host.add_zone("Cave_01", "CAVE");
    host.add_localized("AREA", "Greenway");
    host.add_localized("CAVE", "Hollow");
    host.add_marker("Area_01", "Bench_A", Vec2::new(10.0, 0.0));
    host.add_marker("Area_01", "Bench_B", Vec2::new(200.0, 0.0));
    host.add_marker("Area_01", "Bench_C", Vec2::new(220.0, 5.0));
    host.add_marker("Cave_01", "Bench_X", Vec2::new(-30.0, 4.0));
    host.add_transition("Cave_01", "left1", false);
    host.add_transition("Cave_01", "door1", false);
    host.camera_width = Some(50.0);
    host.sitting = true;

    let frame = Duration::from_millis(16);
    let confirm = config.get_teleport().bench_confirm_delay();
    let mut app = BenchApp::new(host, config);
    let summary = app.start_session();
    println!("session started with {} benches", summary.records);

    let mut now = Instant::now();
    for marker in ["Bench_A", "Bench_B", "Bench_C"] {
        app.on_bench_sat("Area_01", marker, now);
        now += confirm;
        app.tick(now);
        now += frame;
        let notice = app
            .host()
            .last_notice()
            .map(|n| n.text.clone())
            .unwrap_or_default();
        println!(
            "sat on {:<8} -> {} benches ({})",
            marker,
            app.registry().len(),
            notice
        );
    }

    let bench_a = BenchKey::new("Area_01", "Bench_A");
    app.toggle_favorite(&bench_a)?;
    match app.delete(&bench_a) {
        Ok(()) => println!("deleted favorite {} (unexpected)", bench_a),
        Err(e) => println!("delete {} refused: {}", bench_a, e),
    }
    println!("{} benches remain", app.registry().len());

    app.host_mut().sitting = false;
    app.start_teleport(TeleportRequest::to_marker("Cave_01", "Bench_X"), now)?;
    let mut last_phase = "";
    let deadline = now + config.get_teleport().scene_load_timeout() * 4;
    while now < deadline {
        app.host_mut().advance_frame();
        let events = app.tick(now);
        let phase = app.orchestrator().phase().name();
        if phase != last_phase {
            println!("teleport phase: {}", phase);
            last_phase = phase;
        }
        let finished = events.into_iter().find_map(|event| match event {
            UiEvent::TeleportFinished(outcome) => Some(outcome),
            _ => None,
        });
        if let Some(outcome) = finished {
            println!("teleport finished: {:?}", outcome);
            break;
        }
        now += frame;
    }

    for (scene, entry) in &app.host().transition_requests {
        println!("transition requested: {} via {}", scene, entry);
    }
    for line in logging::get_last_logs(5).iter().rev() {
        println!("log: {}", line);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init();
    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    logging::set_debug(config.get_debug_log());

    match cli.command {
        Command::Inspect { store } => inspect(store, &config),
        Command::Migrate { input, store } => migrate(&input, store, &config),
        Command::Export { store } => export(store, &config),
        Command::Simulate => simulate(&config),
    }
}
