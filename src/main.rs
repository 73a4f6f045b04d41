use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fraudwatch_monitor::client::types::TransactionFeatures;
use fraudwatch_monitor::commands;
use fraudwatch_monitor::config::Config;

#[derive(Parser)]
#[command(
    name = "fraudwatch",
    version,
    about = "Terminal monitoring client for a real-time fraud and phishing detection service"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Live command-center view: poll the backend until Ctrl+C
    Watch {
        /// Override the configured poll interval
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Fetch and print the current status snapshot
    Status,
    /// Inject a simulated attack burst, then refresh the status view
    SimulateAttack,
    /// Analyze a message for phishing markers
    AnalyzeText {
        /// The message text to analyze
        text: String,
    },
    /// Run batch anomaly analysis over a JSON file of transactions
    AnalyzeBatch {
        /// Path to a JSON array of transactions
        #[arg(long)]
        file: String,
    },
    /// Score a single transaction for fraud
    Score(ScoreArgs),
    /// Check a message for prompt-injection patterns
    CheckMessage {
        /// The message to screen
        message: String,
    },
    /// Interactive assistant chat with injection screening on every message
    Chat,
}

#[derive(Args)]
struct ScoreArgs {
    #[arg(long, default_value = "PK-ACC0042")]
    account_id: String,
    #[arg(long, default_value_t = 5000.0)]
    amount: f64,
    #[arg(long, default_value = "Raast Transfer")]
    transaction_type: String,
    #[arg(long, default_value = "Easypaisa")]
    recipient_bank: String,
    #[arg(long, default_value = "Karachi")]
    sender_city: String,
    #[arg(long, default_value = "Lahore")]
    recipient_city: String,
    #[arg(long, default_value_t = 1)]
    tx_count_last_5s: u32,
    #[arg(long, default_value_t = 120_000.0)]
    time_delta_ms: f64,
    #[arg(long, default_value_t = 14)]
    hour_of_day: u8,
    #[arg(long, default_value_t = 5)]
    unique_recipients_last_10tx: u32,
    #[arg(long)]
    is_new_device: bool,
    #[arg(long)]
    location_change: bool,
}

impl From<ScoreArgs> for TransactionFeatures {
    fn from(args: ScoreArgs) -> Self {
        Self {
            account_id: args.account_id,
            amount: args.amount,
            transaction_type: args.transaction_type,
            recipient_bank: args.recipient_bank,
            sender_city: args.sender_city,
            recipient_city: args.recipient_city,
            tx_count_last_5s: args.tx_count_last_5s,
            time_delta_ms: args.time_delta_ms,
            hour_of_day: args.hour_of_day,
            unique_recipients_last_10tx: args.unique_recipients_last_10tx,
            is_new_device: args.is_new_device,
            location_change: args.location_change,
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=debug for poll detail)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Command::Watch { interval_ms } => commands::watch(&config, interval_ms).await,
        Command::Status => commands::status(&config).await,
        Command::SimulateAttack => commands::simulate_attack(&config).await,
        Command::AnalyzeText { text } => commands::analyze_text(&config, &text).await,
        Command::AnalyzeBatch { file } => commands::analyze_batch(&config, &file).await,
        Command::Score(args) => commands::score(&config, &args.into()).await,
        Command::CheckMessage { message } => commands::check_message(&config, &message).await,
        Command::Chat => commands::chat(&config).await,
    }
}
