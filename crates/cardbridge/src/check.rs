// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cardbridge check-config` command implementation.
//!
//! The configuration has already been loaded and validated by the time this
//! runs. Checks whether it is complete enough to serve and probes each
//! adapter's health.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use cardbridge_config::model::BridgeConfig;
use cardbridge_core::{BridgeError, ConversationStore, HealthStatus, PluginAdapter};
use cardbridge_storage::SqliteConversationStore;
use cardbridge_trello::TrelloTracker;
use cardbridge_whatsapp::WhatsAppTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

/// Run the `cardbridge check-config` command.
///
/// Fails when any check fails. Warnings alone do not.
pub async fn run_check(config: &BridgeConfig, plain: bool) -> Result<(), BridgeError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let serve_ready = check_serve_ready(config);
    let ready = serve_ready.status == CheckStatus::Pass;

    let mut results = vec![serve_ready, check_store(config).await];
    if ready {
        results.push(check_tracker(config).await);
    }
    results.push(check_sidecar(config).await);

    println!();
    println!("  cardbridge check-config");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render(result, use_color));
    }
    println!();

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    if failed > 0 {
        return Err(BridgeError::Config(format!("{failed} check(s) failed")));
    }
    println!("  Configuration OK.");
    println!();
    Ok(())
}

fn render(result: &CheckResult, use_color: bool) -> String {
    let ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<16} {message} ({ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<16} {} ({ms}ms)", result.name, result.message)
    }
}

fn check_serve_ready(config: &BridgeConfig) -> CheckResult {
    let start = Instant::now();
    let (status, message) = match cardbridge_config::validate_for_serve(config) {
        Ok(()) => (CheckStatus::Pass, "complete".to_string()),
        Err(errors) => {
            let missing: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            (CheckStatus::Fail, missing.join("; "))
        }
    };
    CheckResult {
        name: "config".into(),
        status,
        message,
        duration: start.elapsed(),
    }
}

async fn check_store(config: &BridgeConfig) -> CheckResult {
    let start = Instant::now();
    let store = SqliteConversationStore::new(config.storage.clone());
    let outcome = match store.initialize().await {
        Ok(()) => {
            let health = store.health_check().await;
            let _ = store.close().await;
            health
        }
        Err(e) => Err(e),
    };
    from_health("store", outcome, start)
}

async fn check_tracker(config: &BridgeConfig) -> CheckResult {
    let start = Instant::now();
    let outcome = match TrelloTracker::new(&config.trello) {
        Ok(tracker) => tracker.health_check().await,
        Err(e) => Err(e),
    };
    from_health("trello", outcome, start)
}

async fn check_sidecar(config: &BridgeConfig) -> CheckResult {
    let start = Instant::now();
    let outcome = match WhatsAppTransport::new(config.whatsapp.clone()) {
        Ok(transport) => transport.health_check().await,
        Err(e) => Err(e),
    };
    let mut result = from_health("whatsapp", outcome, start);
    // The sidecar may legitimately be down while the config is being checked.
    if result.status == CheckStatus::Fail {
        result.status = CheckStatus::Warn;
    }
    result
}

fn from_health(
    name: &str,
    outcome: Result<HealthStatus, BridgeError>,
    start: Instant,
) -> CheckResult {
    let (status, message) = match outcome {
        Ok(HealthStatus::Healthy) => (CheckStatus::Pass, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (CheckStatus::Warn, reason),
        Ok(HealthStatus::Unhealthy(reason)) => (CheckStatus::Fail, reason),
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    CheckResult {
        name: name.to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_not_serve_ready() {
        let result = check_serve_ready(&BridgeConfig::default());
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("trello.api_key"));
    }

    #[tokio::test]
    async fn store_check_passes_on_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BridgeConfig::default();
        config.storage.database_path = dir.path().join("c.db").to_string_lossy().into_owned();

        let result = check_store(&config).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }

    #[test]
    fn plain_rendering_tags_status() {
        let result = CheckResult {
            name: "store".into(),
            status: CheckStatus::Warn,
            message: "slow".into(),
            duration: Duration::from_millis(3),
        };
        let line = render(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("slow (3ms)"));
    }
}
