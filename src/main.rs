//! Command-line answer checker.

use clap::Parser;
use mimalloc::MiMalloc;

use answer_verify::config::Config;
use answer_verify::verify::AnswerChecker;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "answer-verify", version)]
#[command(about = "Grades a candidate answer against a reference and prints the verdict as JSON")]
#[command(
    after_help = "Backend settings come from ANSWER_* environment variables \
    (ANSWER_BACKEND, ANSWER_MODEL_DIR, ANSWER_DEVICE, ANSWER_EMBEDDINGS_URL, \
    ANSWER_SEMANTIC_THRESHOLD, ...). Logging follows RUST_LOG."
)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// Load the embedding backend before checking
    #[arg(long)]
    preload: bool,

    /// Answer being graded
    candidate: String,

    /// Expected answer
    reference: String,

    /// Semantic threshold for this check (default from ANSWER_SEMANTIC_THRESHOLD)
    threshold: Option<f32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let checker = AnswerChecker::from_config(&config)?;

    tracing::info!(
        backend = %config.backend,
        device = %config.device,
        threshold = checker.default_threshold(),
        "Answer checker ready"
    );

    if args.preload {
        let ready = checker.preload_model().await;
        tracing::info!(ready, status = %checker.backend_status(), "Preload finished");
    }

    let verdict = checker
        .check_answer(&args.candidate, &args.reference, args.threshold)
        .await;

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
