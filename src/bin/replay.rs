use clap::Parser;
use unlink::utils::logger;
use unlink::utils::validation::{validate_path, validate_range, MAX_THREADS};
use unlink::core::recording;
use unlink::{reclaim_retired, Operation, UnlinkError};

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay a recorded operation sequence against the lock free stack")]
struct Args {
    /// JSON file holding a list of operations, e.g. [{"op":"push","item":1},{"op":"pop"}]
    #[arg(short, long, conflicts_with = "generate")]
    input: Option<String>,

    /// Generate this many operations instead of reading a file
    #[arg(long)]
    generate: Option<usize>,

    #[arg(long, default_value = "0")]
    seed: u64,

    /// Write the operations that were replayed to this file
    #[arg(short, long)]
    output: Option<String>,

    #[arg(long, default_value = "8")]
    threads: usize,

    /// Replay the same sequence this many times on fresh stacks
    #[arg(long, default_value = "1")]
    rounds: usize,

    #[arg(short, long)]
    verbose: bool,
}

fn load_operations(args: &Args) -> unlink::Result<Vec<Operation<i64>>> {
    match (&args.input, args.generate) {
        (Some(path), _) => {
            validate_path("input", path)?;
            recording::load_operations(path)
        }
        (None, Some(count)) => recording::generate_operations(count, args.seed),
        (None, None) => Err(UnlinkError::MissingConfigError {
            field: "--input or --generate".to_string(),
        }),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    validate_range("threads", args.threads, 1, MAX_THREADS)?;
    validate_range("rounds", args.rounds, 1, usize::MAX)?;

    let ops = match load_operations(&args) {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    tracing::info!("🔁 Replaying {} operations on {} threads, {} round(s)", ops.len(), args.threads, args.rounds);

    if let Some(path) = &args.output {
        validate_path("output", path)?;
        recording::save_operations(path, &ops)?;
    }

    let summary = recording::replay_rounds(&ops, args.threads, args.rounds)?;
    tracing::debug!(?summary, "Replay finished");

    let reclaimed = reclaim_retired();
    tracing::debug!(reclaimed, "Final reclamation pass");
    println!("✅ {} round(s) replayed without losing elements", summary.rounds);

    Ok(())
}
