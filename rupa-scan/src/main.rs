//! rupa-scan - Turntable scan reconstruction and part identification
//!
//! # Usage
//!
//! ```bash
//! # Identify a scanned part against the patterns listed in rupa-scan.toml
//! rupa-scan identify Escaneo.csv --seed 7
//!
//! # Align two clouds directly
//! rupa-scan align pattern.csv Escaneo.csv
//!
//! # Rebuild a scan from recorded rays with a different config
//! rupa-scan --config tuned.toml reconstruct rays.csv -o Escaneo.csv
//!
//! # Preview pose parameters on the first recorded profile
//! rupa-scan preview rays.csv --samples 36
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, Subcommand};

use rupa_scan::io::{read_cloud, read_ray_log, write_cloud};
use rupa_scan::{
    Error, Result, RotationalAligner, ScanConfig, ScanSession, SimilarityScorer, preview,
    triangulate,
};

#[derive(Parser)]
#[command(name = "rupa-scan")]
#[command(about = "Laser-triangulation scan reconstruction and shape identification")]
struct Args {
    /// Configuration file (default: rupa-scan.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare a scanned cloud with every configured pattern
    Identify {
        /// Scanned point cloud (CSV)
        scan: PathBuf,

        /// Subsampling seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// Compare patterns in parallel
        #[arg(long)]
        parallel: bool,

        /// Write the scan, aligned to the best pattern, to this CSV file
        #[arg(long)]
        export_aligned: Option<PathBuf>,
    },

    /// Find the rotation aligning one cloud to another
    Align {
        /// Reference point cloud (CSV)
        pattern: PathBuf,

        /// Cloud to rotate onto the reference (CSV)
        comparison: PathBuf,
    },

    /// Reconstruct a scan from a recorded ray log
    Reconstruct {
        /// Ray log (CSV)
        rays: PathBuf,

        /// Output point cloud
        #[arg(short, long, default_value = "Escaneo.csv")]
        output: PathBuf,
    },

    /// Build a revolution preview from the first recorded sample
    Preview {
        /// Ray log (CSV)
        rays: PathBuf,

        /// Copies around the axis (overrides config)
        #[arg(long)]
        samples: Option<usize>,

        /// Output point cloud
        #[arg(short, long, default_value = "preview.csv")]
        output: PathBuf,
    },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = ScanConfig::load_or_default(args.config.as_deref(), Path::new("."))?;

    match args.command {
        Command::Identify {
            scan,
            seed,
            parallel,
            export_aligned,
        } => {
            if seed.is_some() {
                config.identification.seed = seed;
            }
            config.identification.parallel |= parallel;
            identify(&config, &scan, export_aligned.as_deref())
        }
        Command::Align {
            pattern,
            comparison,
        } => align(&config, &pattern, &comparison),
        Command::Reconstruct { rays, output } => reconstruct(&config, &rays, &output),
        Command::Preview {
            rays,
            samples,
            output,
        } => {
            let samples = samples.unwrap_or(config.preview.samples);
            preview_scan(&config, &rays, samples, &output)
        }
    }
}

fn identify(config: &ScanConfig, scan_path: &Path, export: Option<&Path>) -> Result<()> {
    let registry = config.registry()?;
    let scan = read_cloud(scan_path)?;

    // Setup signal handler
    let cancel = Arc::new(AtomicBool::new(false));
    let c = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received interrupt, stopping after current pattern");
        c.store(true, Ordering::Relaxed);
    }) {
        log::warn!("Ctrl-C handler unavailable: {}", e);
    }

    let result = config
        .engine()
        .identify_with_cancel(&scan, &registry, &cancel)?;

    for record in &result.records {
        match &record.failure {
            Some(reason) => println!("{:<24} {:>7.2}%  (skipped: {})", record.name, record.similarity, reason),
            None => println!("{:<24} {:>7.2}%", record.name, record.similarity),
        }
    }
    let best = result.best();
    println!(
        "Best match: {} ({:.2}%) - {} (threshold {:.2}%)",
        best.name,
        best.similarity,
        if result.approved { "APPROVED" } else { "REJECTED" },
        result.threshold
    );

    if let Some(path) = export {
        match &best.artifacts {
            Some(artifacts) => write_cloud(path, &artifacts.aligned)?,
            None => log::warn!("No aligned cloud to export: best pattern was not compared"),
        }
    }
    Ok(())
}

fn align(config: &ScanConfig, pattern_path: &Path, comparison_path: &Path) -> Result<()> {
    let (pattern, _) = read_cloud(pattern_path)?.centered();
    let (comparison, _) = read_cloud(comparison_path)?.centered();
    for (cloud, path) in [(&pattern, pattern_path), (&comparison, comparison_path)] {
        if cloud.is_empty() || !cloud.is_finite() {
            return Err(Error::invalid_data(
                path.display().to_string(),
                "point cloud is empty or not finite",
            ));
        }
    }

    let result = RotationalAligner::new(config.alignment).align(&pattern, &comparison);
    let similarity = SimilarityScorer::new(config.similarity).score(&pattern, result.distance);

    println!("Angle:      {:.3}°", result.angle_deg);
    println!("Chamfer:    {:.6}", result.distance);
    println!("Similarity: {:.2}% ({})", similarity, config.similarity.law);
    Ok(())
}

fn reconstruct(config: &ScanConfig, rays_path: &Path, output: &Path) -> Result<()> {
    let samples = read_ray_log(rays_path)?;
    let mut session = ScanSession::new(config.pose);
    for sample in &samples {
        session.add_sample(sample.angle_deg, &sample.rays);
    }
    let cloud = session.finish();
    write_cloud(output, &cloud)
}

fn preview_scan(config: &ScanConfig, rays_path: &Path, samples: usize, output: &Path) -> Result<()> {
    let recorded = read_ray_log(rays_path)?;
    let first = recorded.first().ok_or_else(|| {
        Error::invalid_data(rays_path.display().to_string(), "ray log has no samples")
    })?;

    let profile = triangulate(&first.rays, &config.pose);
    let cloud = preview(&profile, &config.pose, samples);
    log::info!(
        "Preview: {} profile points x {} copies = {} points",
        profile.len(),
        samples,
        cloud.len()
    );
    write_cloud(output, &cloud)
}
