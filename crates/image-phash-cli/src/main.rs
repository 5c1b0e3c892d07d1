use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use image_phash_core::{
    dct_hash_from_file, hamming_distance, mh_hash_from_file, DctHash, Fingerprint, MhHash,
    DCT_SIMILARITY_THRESHOLD, MH_SIMILARITY_THRESHOLD,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::Serialize;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "image-phash")]
#[command(about = "Compute and compare perceptual image hashes")]
#[command(version)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// 64-bit DCT hash
    Dct,
    /// 576-bit Marr-Hildreth hash
    Mh,
    /// Both hashes
    Both,
}

#[derive(Subcommand)]
enum Commands {
    /// Print perceptual hashes of image files
    Hash {
        /// Image files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Hash algorithm to run
        #[arg(long, value_enum, default_value_t = Algorithm::Dct)]
        algorithm: Algorithm,

        /// Emit JSON records instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },

    /// Compare two images and report their Hamming distance
    Compare {
        /// First image
        a: PathBuf,

        /// Second image
        b: PathBuf,

        /// Hash algorithm to compare with
        #[arg(long, value_enum, default_value_t = Algorithm::Dct)]
        algorithm: Algorithm,

        /// Bit-distance threshold overriding the built-in default
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Scan a directory and group near-duplicate images by DCT hash
    Scan {
        /// Directory to scan recursively
        directory: PathBuf,

        /// Bit-distance threshold for grouping
        #[arg(long, default_value_t = DCT_SIMILARITY_THRESHOLD)]
        threshold: u32,

        /// Number of worker threads (0 = one per CPU)
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Emit JSON groups instead of a text report
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct HashRecord {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    dct: Option<DctHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mh: Option<MhHash>,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Map -v occurrences onto the log filter
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Hash {
            files,
            algorithm,
            json,
        } => hash_files(&files, algorithm, json),
        Commands::Compare {
            a,
            b,
            algorithm,
            threshold,
        } => compare_files(&a, &b, algorithm, threshold),
        Commands::Scan {
            directory,
            threshold,
            threads,
            json,
        } => scan_directory(&directory, threshold, threads, json),
    }
}

fn hash_files(files: &[PathBuf], algorithm: Algorithm, json: bool) -> Result<(), anyhow::Error> {
    for path in files {
        let record = hash_one(path, algorithm)
            .with_context(|| format!("failed to hash {}", path.display()))?;

        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            match (record.dct, record.mh) {
                (Some(dct), Some(mh)) => println!("{}\t{}\t{}", dct, mh, path.display()),
                (Some(dct), None) => println!("{}\t{}", dct, path.display()),
                (None, Some(mh)) => println!("{}\t{}", mh, path.display()),
                (None, None) => unreachable!("hash_one always computes at least one hash"),
            }
        }
    }
    Ok(())
}

fn hash_one(path: &Path, algorithm: Algorithm) -> Result<HashRecord, anyhow::Error> {
    let dct = match algorithm {
        Algorithm::Dct | Algorithm::Both => Some(dct_hash_from_file(path)?),
        Algorithm::Mh => None,
    };
    let mh = match algorithm {
        Algorithm::Mh | Algorithm::Both => Some(mh_hash_from_file(path)?),
        Algorithm::Dct => None,
    };
    Ok(HashRecord {
        path: path.to_path_buf(),
        dct,
        mh,
    })
}

fn compare_files(
    a: &Path,
    b: &Path,
    algorithm: Algorithm,
    threshold: Option<u32>,
) -> Result<(), anyhow::Error> {
    let (fingerprint_a, fingerprint_b, default_threshold) = match algorithm {
        Algorithm::Dct => (
            Fingerprint::Dct(dct_hash_from_file(a)?),
            Fingerprint::Dct(dct_hash_from_file(b)?),
            DCT_SIMILARITY_THRESHOLD,
        ),
        Algorithm::Mh => (
            Fingerprint::Mh(mh_hash_from_file(a)?),
            Fingerprint::Mh(mh_hash_from_file(b)?),
            MH_SIMILARITY_THRESHOLD,
        ),
        Algorithm::Both => bail!("pick one algorithm to compare with: dct or mh"),
    };

    let threshold = threshold.unwrap_or(default_threshold);
    let distance = hamming_distance(&fingerprint_a, &fingerprint_b)?;
    let verdict = if distance <= threshold {
        "similar"
    } else {
        "distinct"
    };

    println!(
        "{} bits differ (threshold {}): {}",
        distance, threshold, verdict
    );
    Ok(())
}

fn scan_directory(
    directory: &Path,
    threshold: u32,
    threads: usize,
    json: bool,
) -> Result<(), anyhow::Error> {
    use rayon::prelude::*;

    if !directory.is_dir() {
        bail!("{} is not a directory", directory.display());
    }

    let files: Vec<PathBuf> = WalkDir::new(directory)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image_path(p))
        .collect();
    info!("found {} image files", files.len());

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("##-"),
    );
    progress.set_message("Computing image hashes...");

    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("failed to build thread pool")?;

    let hashed: Vec<(PathBuf, DctHash)> = pool.install(|| {
        files
            .par_iter()
            .filter_map(|path| {
                let result = dct_hash_from_file(path);
                progress.inc(1);
                match result {
                    Ok(hash) => Some((path.clone(), hash)),
                    Err(e) => {
                        warn!("skipping {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect()
    });
    progress.finish_with_message(format!("hashed {} images", hashed.len()));

    // Greedy grouping against each group's first member.
    let mut groups: Vec<Vec<(PathBuf, DctHash)>> = Vec::new();
    for (path, hash) in hashed {
        match groups
            .iter_mut()
            .find(|group| group[0].1.is_similar(&hash, threshold))
        {
            Some(group) => group.push((path, hash)),
            None => groups.push(vec![(path, hash)]),
        }
    }
    groups.retain(|group| group.len() > 1);

    if json {
        let records: Vec<Vec<HashRecord>> = groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|(path, hash)| HashRecord {
                        path: path.clone(),
                        dct: Some(*hash),
                        mh: None,
                    })
                    .collect()
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if groups.is_empty() {
        println!("no near-duplicates found");
    } else {
        for (i, group) in groups.iter().enumerate() {
            println!("group {} ({} images):", i + 1, group.len());
            for (path, hash) in group {
                println!("  {}\t{}", hash, path.display());
            }
        }
    }

    Ok(())
}

fn is_image_path(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tif" | "tiff"
        ),
        None => false,
    }
}
