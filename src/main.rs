use anyhow::Result;
use clap::{Parser, Subcommand};

use repair_ai::cli;
use repair_ai::mock;

#[derive(Debug, Parser)]
#[command(name = "repair-ai")]
#[command(about = "Multilingual AI device-repair assistant")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check backend connectivity and local setup
    Status,
    /// Ask a repair question
    Ask {
        /// The question to ask
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
        /// Read the answer aloud regardless of confidence
        #[arg(long)]
        speak: bool,
    },
    /// Check repair steps for anomalies
    Detect {
        /// The repair steps to analyze
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
        /// Read the result aloud
        #[arg(long)]
        speak: bool,
    },
    /// Resolve a translation key
    Translate {
        /// Dotted key path, e.g. `askCard.title`
        key: String,
        /// Screen section: home, ask, detect
        #[arg(long, default_value = "home")]
        section: String,
        /// Language key (default: the current UI language)
        #[arg(long)]
        lang: Option<String>,
    },
    /// List available UI languages
    Languages,
    /// Show or set the UI language
    Language {
        /// Language key to switch to
        key: Option<String>,
    },
    /// Show, set or cycle the color theme
    Theme {
        /// Theme key to switch to
        key: Option<String>,
        /// Switch to the next theme
        #[arg(long, conflicts_with = "key")]
        toggle: bool,
    },
    /// Speak text with the system synthesizer
    Speak {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
        /// Locale tag, e.g. `fr-FR` (default: the current UI language's voice)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Show request statistics
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Run a local stand-in backend
    MockServer {
        /// Address to bind
        #[arg(long, default_value = mock::DEFAULT_ADDR)]
        addr: String,
        /// Score at which `/detect` reports an anomaly
        #[arg(long, default_value_t = mock::DEFAULT_ANOMALY_THRESHOLD)]
        anomaly_threshold: f64,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `api.base_url`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Status => cli::run_status(),
        Commands::Ask { question, speak } => cli::run_ask(&question.join(" "), speak),
        Commands::Detect { text, speak } => cli::run_detect(&text.join(" "), speak),
        Commands::Translate { key, section, lang } => {
            cli::run_translate(&key, &section, lang.as_deref())
        }
        Commands::Languages => cli::run_languages(),
        Commands::Language { key } => cli::run_language(key.as_deref()),
        Commands::Theme { key, toggle } => cli::run_theme(key.as_deref(), toggle),
        Commands::Speak { text, lang } => cli::run_speak(&text.join(" "), lang.as_deref()),
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::MockServer {
            addr,
            anomaly_threshold,
        } => cli::run_mock_server(&addr, anomaly_threshold),
    }
}
