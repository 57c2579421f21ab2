use chrono::Local;
use clap::Parser;

use world_export::config::ExportConfig;
use world_export::pipeline;
use world_export::seeds::ExportSeeds;

#[derive(Parser, Debug)]
#[command(name = "world_export")]
#[command(about = "Bake zone terrain and world geometry into static server data")]
struct Args {
    /// Path to the export config JSON file
    #[arg(short, long, default_value = "export_config.json")]
    config: String,

    /// Master seed for terrain synthesis (random if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Write a PNG preview beside each heightmap
    #[arg(long)]
    preview: bool,
}

fn main() {
    let args = Args::parse();

    let mut config = match ExportConfig::load(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: cannot load config {}: {e}", args.config);
            std::process::exit(1);
        }
    };

    if let Some(dir) = args.output_dir {
        config.output_dir = dir.into();
    }
    if args.preview {
        config.preview = true;
    }

    // CLI seed wins, then the config file, then a random one
    let master = args
        .seed
        .or(config.seed)
        .unwrap_or_else(rand::random);
    let seeds = ExportSeeds::from_master(master);

    println!(
        "World export started {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("Exporting {} zones with seed: {}", config.zones.len(), master);
    println!("Output directory: {}", config.output_dir.display());

    let summary = match pipeline::run_export(&config, seeds) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: export run failed: {e}");
            std::process::exit(1);
        }
    };

    println!("Done.");
    println!(
        "  zones processed: {} ({} heightmaps skipped, {} scenes skipped)",
        summary.zones_exported, summary.heightmaps_skipped, summary.scenes_skipped
    );
    println!("  region tiles written: {}", summary.tiles_written);
    println!(
        "  obstacles: {} extracted, {} kept after filtering",
        summary.obstacles_raw, summary.obstacles_kept
    );
    println!("  spawn points: {}", summary.spawn_points);
    if summary.shapes_skipped > 0 {
        println!("  unsupported shapes skipped: {}", summary.shapes_skipped);
    }
    if summary.nan_coerced > 0 {
        println!(
            "  samples outside coverage set to 0.0: {}",
            summary.nan_coerced
        );
    }
}
