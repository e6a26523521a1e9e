//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `repair-ai status`: backend connectivity and local setup
//! - `repair-ai ask` / `repair-ai detect`: the two repair screens
//! - `repair-ai translate | languages | language | theme`: UI state
//! - `repair-ai speak`: text-to-speech
//! - `repair-ai stats`: request log summary
//! - `repair-ai config show|init|set|reset`: configuration management
//! - `repair-ai mock-server`: local stand-in backend

use anyhow::Result;
use colored::Colorize;

use crate::analytics::logger::{self, RequestLogger};
use crate::analytics::reporter::{self, Stats};
use crate::api::ApiClient;
use crate::config::{self, AppConfig};
use crate::context::{AppContext, FileStore, MemoryStore, THEMES};
use crate::flow::{self, AskView, DetectView};
use crate::i18n::{LANGUAGES, Section, TranslationTable, find_language};
use crate::mock::{self, MockOptions};
use crate::presentation::{self, ConfidenceTier};
use crate::speech::{self, SpeechOptions, SystemSpeech};

/// Output format for `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

fn build_client(cfg: &AppConfig) -> ApiClient {
    ApiClient::from_config(&cfg.api).with_logger(RequestLogger::from_config(&cfg.logging))
}

/// Application context backed by `~/.repair-ai/state.json`, or by memory
/// when there is no home directory.
fn load_context() -> Result<AppContext> {
    let table = TranslationTable::builtin()?;
    Ok(match FileStore::default_location() {
        Some(store) => AppContext::load(store, table),
        None => AppContext::load(MemoryStore::new(), table),
    })
}

fn speech_options(cfg: &AppConfig, language: &str) -> SpeechOptions {
    SpeechOptions {
        language: language.to_string(),
        rate: Some(cfg.speech.rate),
        pitch: Some(cfg.speech.pitch),
    }
}

fn say(cfg: &AppConfig, ctx: &AppContext, text: &str) {
    if !cfg.speech.enabled {
        return;
    }
    let options = speech_options(cfg, ctx.language().code);
    speech::speak_text(&SystemSpeech, cfg.api.platform, text, &options);
}

// ---------------------------------------------------------------------------
// repair-ai status
// ---------------------------------------------------------------------------

/// Home screen status card plus local setup checks.
pub fn run_status() -> Result<()> {
    let cfg = config::load();
    let ctx = load_context()?;
    let client = build_client(&cfg);

    println!("{}", ctx.t("title", Section::Home).bold().cyan());
    println!("{}", ctx.t("subtitle", Section::Home).dimmed());
    println!("{}", "=".repeat(50));

    let Ok(status) = client.check_connectivity();
    let label_key = match (status.connected, status.source.is_degraded()) {
        (true, true) => "status.demo",
        (true, false) => "status.connected",
        (false, _) => "status.offline",
    };
    print_health_item(
        &ctx.t(label_key, Section::Home),
        status.connected,
        &status.message,
    );
    print_health_item("Backend", true, client.base_url());
    print_health_item("Platform", true, &cfg.api.platform.to_string());

    let language = ctx.language();
    print_health_item(
        "Language",
        true,
        &format!("{} {} ({})", language.flag, language.native_name, language.key),
    );
    print_health_item("Theme", true, ctx.theme().name);
    print_health_item(
        "Speech",
        cfg.speech.enabled,
        if cfg.speech.enabled {
            "enabled"
        } else {
            "disabled (set REPAIR_AI_SPEECH=1 to enable)"
        },
    );

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.repair-ai/config.toml found"
        } else {
            "not found (run `repair-ai config init` to create)"
        },
    );

    let log_path = RequestLogger::from_config(&cfg.logging)
        .path()
        .map(|p| p.to_path_buf());
    let log_detail = match &log_path {
        Some(path) if path.exists() => {
            format!("{} entries", logger::read_all_entries(path).len())
        }
        Some(_) => "no log file yet".to_string(),
        None => "disabled".to_string(),
    };
    print_health_item(
        "Request log",
        log_path.as_ref().is_some_and(|p| p.exists()),
        &log_detail,
    );

    if !status.connected {
        println!();
        println!(
            "  {} Start a local backend with `repair-ai mock-server`",
            "Hint:".dimmed()
        );
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// repair-ai ask
// ---------------------------------------------------------------------------

pub fn run_ask(question: &str, speak: bool) -> Result<()> {
    let cfg = config::load();
    let ctx = load_context()?;
    let client = build_client(&cfg);

    println!("{}", ctx.t("title", Section::Ask).bold().cyan());
    println!("{}", "=".repeat(50));

    let Some(view) = flow::ask(&client, question) else {
        println!("{}", ctx.t("instructions", Section::Ask).yellow());
        return Ok(());
    };

    print_answer(&ctx, &view);

    if speak || view.auto_speak {
        say(&cfg, &ctx, &view.result.answer);
    }
    Ok(())
}

fn print_answer(ctx: &AppContext, view: &AskView) {
    println!("  {} {}", "Question:".bold(), view.question);
    println!();
    for line in view.result.answer.lines() {
        println!("  {line}");
    }
    println!();

    if let Some(percent) = view.confidence_percent {
        let badge = format!("{} ({percent}%)", view.tier_label);
        println!("  {}", colorize_tier(view.result.confidence, &badge));
    }
    if view.needs_verification {
        println!("  {}", ctx.t("lowConfidence", Section::Ask).red());
    }
    if view.result.is_safe_response {
        println!("  {} {}", "✓".green(), ctx.t("safeResponse", Section::Ask).dimmed());
    }
    if view.result.source.is_degraded() {
        println!(
            "  {}",
            format!("source: {}", view.result.source).dimmed()
        );
    }
}

// ---------------------------------------------------------------------------
// repair-ai detect
// ---------------------------------------------------------------------------

pub fn run_detect(text: &str, speak: bool) -> Result<()> {
    let cfg = config::load();
    let ctx = load_context()?;
    let client = build_client(&cfg);

    println!("{}", ctx.t("title", Section::Detect).bold().cyan());
    println!("{}", "=".repeat(50));

    if !text.trim().is_empty() && !client.check_health() {
        print_health_item(
            &ctx.t("status.offline", Section::Home),
            false,
            client.base_url(),
        );
    }

    let view = flow::detect(&client, text)
        .map_err(|_| anyhow::anyhow!(ctx.t("emptyInput", Section::Detect)))?;

    print_detection(&view);

    if speak || view.auto_speak {
        say(&cfg, &ctx, &view.result.issue_label);
    }
    Ok(())
}

fn print_detection(view: &DetectView) {
    let result = &view.result;
    let headline = if result.is_anomaly {
        result.issue_label.red().bold()
    } else {
        result.issue_label.green().bold()
    };
    println!("  {headline}");

    let badge = format!("{} ({}%)", view.tier_label, result.confidence_percent);
    let confidence = Some(f64::from(result.confidence_percent) / 100.0);
    println!("  {}", colorize_tier(confidence, &badge));
    println!();

    for (i, step) in result.recommended_steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    if result.source.is_degraded() {
        println!();
        println!("  {}", format!("source: {}", result.source).dimmed());
    }
}

/// Color text with the tier color of `confidence`.
fn colorize_tier(confidence: Option<f64>, text: &str) -> colored::ColoredString {
    match presentation::tier(confidence) {
        Some(ConfidenceTier::High) => text.green(),
        Some(ConfidenceTier::Medium) => text.yellow(),
        Some(ConfidenceTier::Low) => text.red(),
        None => text.dimmed(),
    }
}

// ---------------------------------------------------------------------------
// repair-ai translate | languages | language | theme
// ---------------------------------------------------------------------------

/// Resolve one key, as the UI would.
pub fn run_translate(key: &str, section: &str, language: Option<&str>) -> Result<()> {
    let section: Section = section.parse()?;
    let ctx = load_context()?;
    let language = match language {
        Some(key) => find_language(key)
            .ok_or_else(|| anyhow::anyhow!("unknown language '{key}'"))?
            .key,
        None => ctx.language().key,
    };

    let list = ctx.table().resolve_list(key, section, language);
    if list.is_empty() {
        println!("{}", ctx.table().resolve(key, section, language));
    } else {
        for item in list {
            println!("• {item}");
        }
    }
    Ok(())
}

/// List the language catalog with translation coverage.
pub fn run_languages() -> Result<()> {
    let ctx = load_context()?;
    let current = ctx.language().key;

    println!("{}", "Languages".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "    {:<4} {:<8} {:<12} {:<16} Coverage",
        "Key", "Voice", "Language", "Native"
    );
    println!("    {}", "-".repeat(56));

    for language in LANGUAGES {
        let (translated, total) = Section::ALL
            .iter()
            .map(|&section| ctx.table().coverage(section, language.key))
            .fold((0, 0), |(t, n), (dt, dn)| (t + dt, n + dn));
        let pct = if total == 0 {
            0.0
        } else {
            translated as f64 / total as f64 * 100.0
        };

        let line = format!(
            "{} {:<4} {:<8} {:<12} {:<16} {:>5.1}%",
            language.flag,
            language.key,
            language.code,
            language.display_name,
            language.native_name,
            pct,
        );
        if language.key == current {
            println!("{} {}", "▸".green().bold(), line.bold());
        } else {
            println!("  {line}");
        }
    }
    Ok(())
}

/// Show or persist the UI language.
pub fn run_language(key: Option<&str>) -> Result<()> {
    let mut ctx = load_context()?;
    let language = match key {
        Some(key) => ctx.set_language(key)?,
        None => ctx.language(),
    };
    let verb = if key.is_some() { "Language set to" } else { "Language:" };
    println!(
        "{} {} {} {} ({})",
        "✓".green().bold(),
        verb,
        language.flag,
        language.native_name.bold(),
        language.key,
    );
    Ok(())
}

/// Show, set or cycle the color theme.
pub fn run_theme(key: Option<&str>, toggle: bool) -> Result<()> {
    let mut ctx = load_context()?;
    let theme = match (key, toggle) {
        (Some(key), _) => ctx.set_theme(key)?,
        (None, true) => ctx.toggle_theme(),
        (None, false) => {
            println!("{}", "Themes".bold().cyan());
            for theme in THEMES {
                let marker = if theme.key == ctx.theme().key {
                    "▸".green().bold()
                } else {
                    " ".normal()
                };
                println!(
                    "{} {:<8} {:<20} primary {} background {}",
                    marker, theme.key, theme.name, theme.primary, theme.background
                );
            }
            return Ok(());
        }
    };
    println!(
        "{} Theme set to {} ({})",
        "✓".green().bold(),
        theme.name.bold(),
        theme.key
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// repair-ai speak
// ---------------------------------------------------------------------------

pub fn run_speak(text: &str, locale: Option<&str>) -> Result<()> {
    let cfg = config::load();
    if !cfg.speech.enabled {
        println!(
            "{}",
            "Speech is disabled (set REPAIR_AI_SPEECH=1 to enable).".yellow()
        );
        return Ok(());
    }

    let locale = match locale {
        Some(locale) => locale.to_string(),
        None => load_context()?.language().code.to_string(),
    };
    if !speech::supported_voices().contains(&locale.as_str()) {
        println!(
            "{}",
            format!("No known voice for {locale}; the system default will be used.").yellow()
        );
    }
    speech::speak_text(
        &SystemSpeech,
        cfg.api.platform,
        text,
        &speech_options(&cfg, &locale),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// repair-ai stats
// ---------------------------------------------------------------------------

/// Summarize the request log.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let logger = RequestLogger::from_config(&cfg.logging);
    let Some(path) = logger.path() else {
        println!(
            "{}",
            "Request logging is disabled (set REPAIR_AI_LOG=1 to enable).".yellow()
        );
        return Ok(());
    };

    let stats = reporter::compute_stats(path, days);
    if stats.total_requests == 0 {
        println!(
            "{}",
            "No data yet. Ask a question or run a detection to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }
    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "Repair AI Request Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("  {} {}", "Total requests:".bold(), stats.total_requests);
    println!();

    let dist = &stats.source_distribution;
    println!("{}", "Source Distribution".bold().cyan());
    println!(
        "  Live: {} ({:.0}%)  Fallback: {} ({:.0}%)  Demo: {} ({:.0}%)  Unreachable: {} ({:.0}%)",
        dist.live,
        dist.pct(dist.live),
        dist.fallback,
        dist.pct(dist.fallback),
        dist.demo,
        dist.pct(dist.demo),
        dist.unreachable,
        dist.pct(dist.unreachable),
    );
    println!();

    println!("{}", "Operations".bold().cyan());
    println!(
        "  {:<10} {:>6} {:>6} {:>9} {:>6} {:>12} {:>14}",
        "Operation", "Count", "Live", "Fallback", "Demo", "Unreachable", "Avg live (ms)"
    );
    println!("  {}", "-".repeat(69));
    for (i, op) in stats.operation_stats.iter().enumerate() {
        let line = format!(
            "  {:<10} {:>6} {:>6} {:>9} {:>6} {:>12} {:>14.1}",
            op.operation,
            op.count,
            op.live,
            op.fallback,
            op.demo,
            op.unreachable,
            op.avg_live_latency_ms,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let value = serde_json::json!({
        "total_requests": stats.total_requests,
        "source_distribution": {
            "live": stats.source_distribution.live,
            "fallback": stats.source_distribution.fallback,
            "demo": stats.source_distribution.demo,
            "unreachable": stats.source_distribution.unreachable,
        },
        "operations": stats.operation_stats.iter().map(|op| serde_json::json!({
            "operation": op.operation,
            "count": op.count,
            "live": op.live,
            "fallback": op.fallback,
            "demo": op.demo,
            "unreachable": op.unreachable,
            "avg_live_latency_ms": op.avg_live_latency_ms,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &Stats) {
    println!("operation,count,live,fallback,demo,unreachable,avg_live_latency_ms");
    for op in &stats.operation_stats {
        println!(
            "{},{},{},{},{},{},{:.1}",
            op.operation,
            op.count,
            op.live,
            op.fallback,
            op.demo,
            op.unreachable,
            op.avg_live_latency_ms,
        );
    }
}

// ---------------------------------------------------------------------------
// repair-ai config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective Repair AI Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.repair-ai/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.repair-ai/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".repair-ai.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".repair-ai.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "REPAIR_AI_* environment variables".dimmed()
    );

    Ok(())
}

/// Write a default config file at `~/.repair-ai/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point at your backend.".dimmed());
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// repair-ai mock-server
// ---------------------------------------------------------------------------

pub fn run_mock_server(addr: &str, anomaly_threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&anomaly_threshold) {
        anyhow::bail!("anomaly threshold must be between 0 and 1, got {anomaly_threshold}");
    }
    mock::serve(
        addr,
        MockOptions {
            anomaly_threshold,
            ..MockOptions::default()
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn speech_options_follow_config() {
        let mut cfg = AppConfig::default();
        cfg.speech.rate = 1.2;
        let options = speech_options(&cfg, "de-DE");
        assert_eq!(options.language, "de-DE");
        assert_eq!(options.rate, Some(1.2));
        assert_eq!(options.pitch, Some(1.0));
    }

    #[test]
    fn mock_server_rejects_bad_threshold() {
        assert!(run_mock_server("127.0.0.1:0", 1.5).is_err());
    }
}
