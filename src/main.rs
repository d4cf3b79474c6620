//! Scanhash CLI
//!
//! A command-line front end for the SHA-256d nonce search engine.
//!
//! # Commands
//!
//! - `kernels` - List compression kernels and whether this CPU runs them
//! - `scan` - Search a block header's nonce space (multi-threaded)
//! - `benchmark` - Measure hashrate per kernel

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use scanhash::config::{default_config_path, MinerConfig};
use scanhash::engine::{new_scanner, BlockHeader, KernelKind, NonceRange, ShareTarget, Work};
use scanhash::search::{search, SearchOptions};

#[derive(Parser)]
#[command(name = "scanhash")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "Multi-threaded SHA-256d nonce search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List compression kernels
    Kernels,

    /// Search for a nonce that meets the target
    Scan {
        /// 80-byte block header as hex (its nonce field is ignored)
        #[arg(long)]
        header: String,

        /// Target difficulty (number of leading zero bits)
        #[arg(short, long)]
        bits: Option<u32>,

        /// First nonce to try
        #[arg(long, default_value = "0")]
        start: u32,

        /// One past the last nonce to try (default: 2^32)
        #[arg(long)]
        end: Option<u64>,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Kernel name (see `scanhash kernels`)
        #[arg(short, long)]
        kernel: Option<String>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Kernel to benchmark (default: all available)
        #[arg(short, long)]
        kernel: Option<String>,

        /// Number of nonces per kernel
        #[arg(short, long, default_value = "1000000")]
        count: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Kernels => cmd_kernels(),
        Commands::Scan {
            header,
            bits,
            start,
            end,
            threads,
            kernel,
        } => cmd_scan(cli.config, &header, bits, start, end, threads, kernel),
        Commands::Benchmark { kernel, count } => cmd_benchmark(kernel, count),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_kernels() -> anyhow::Result<()> {
    let best = KernelKind::best();
    println!("{:<10} {:>5}  {}", "KERNEL", "LANES", "STATUS");
    for kind in KernelKind::ALL {
        let status = match (kind.is_available(), kind == best) {
            (true, true) => "available (default)",
            (true, false) => "available",
            (false, _) => "unsupported",
        };
        println!("{:<10} {:>5}  {}", kind.name(), kind.lanes(), status);
    }
    Ok(())
}

fn cmd_scan(
    config_path: Option<PathBuf>,
    header_hex: &str,
    bits: Option<u32>,
    start: u32,
    end: Option<u64>,
    threads: Option<usize>,
    kernel: Option<String>,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => MinerConfig::load(&path)?,
        None => MinerConfig::load_or_default(&default_config_path())?,
    };

    // Command-line flags override the config file
    if let Some(bits) = bits {
        config.target_bits = bits;
    }
    if threads.is_some() {
        config.threads = threads;
    }
    if kernel.is_some() {
        config.kernel = kernel;
    }
    config.validate()?;

    let header = BlockHeader::from_hex(header_hex)?;
    let range = match end {
        Some(end) => NonceRange::new(start, end)?,
        None => NonceRange::from_start(start),
    };
    let target = config.target();
    let work = Work::from_header(&header, target);

    let options = SearchOptions {
        kind: config.kernel_kind()?,
        threads: config.threads.unwrap_or_else(num_cpus::get),
        chunk_size: config.chunk_size,
        report_interval: Some(Duration::from_secs(2)),
    };

    println!("\n=== Scanhash ===");
    println!("Kernel:     {} ({} lanes)", options.kind, options.kind.lanes());
    println!("Threads:    {}", options.threads);
    println!("Difficulty: {} bits (ceiling {:#010x})", config.target_bits, target.ceiling());
    println!("Range:      {:#010x}..{:#x}", range.start(), range.end());
    println!("================\n");

    let report = search(&work, range, &options)?;

    match report.nonce {
        Some(nonce) => {
            if !header.meets(nonce, target) {
                anyhow::bail!(
                    "Kernel {} reported nonce {:#010x} which fails verification",
                    options.kind,
                    nonce
                );
            }
            let mut hash = header.sha256d_with_nonce(nonce);
            hash.reverse();

            println!("Found valid nonce!");
            println!("  Nonce:  {} ({:#010x})", nonce, nonce);
            println!("  Hash:   {}", hex::encode(hash));
            println!("  Header: {}", hex::encode(header.with_nonce(nonce).as_bytes()));
        }
        None => println!("No nonce in range meets the target."),
    }
    println!(
        "  Hashes: {} ({:.0} H/s, {:.2}s)",
        report.hashes,
        report.hashrate(),
        report.elapsed.as_secs_f64()
    );

    Ok(())
}

fn cmd_benchmark(kernel: Option<String>, count: u32) -> anyhow::Result<()> {
    let kinds = match kernel {
        Some(name) => vec![name.parse::<KernelKind>()?],
        None => KernelKind::available(),
    };

    println!("Running benchmark with {} nonces per kernel...", count);

    // A target nothing meets, so every nonce in the range is evaluated.
    let work = Work::from_header(&BlockHeader::new([0x42; 80]), ShareTarget::DIFFICULTY_ONE);
    let range = NonceRange::new(0, u64::from(count))?;

    println!("\nResults:");
    for kind in kinds {
        let mut scanner = new_scanner(kind)?;
        scanner.prepare_work(&work);

        let start = Instant::now();
        let outcome = scanner.scan(range)?;
        let elapsed = start.elapsed();

        println!(
            "  {:<10} {:>12.0} H/s  ({} hashes in {:.2}s)",
            kind.name(),
            outcome.hashes() as f64 / elapsed.as_secs_f64(),
            outcome.hashes(),
            elapsed.as_secs_f64()
        );
    }

    Ok(())
}
