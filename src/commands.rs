use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::client::types::{
    BatchAnalysis, ChatMessage, FlaggedTransaction, FraudVerdict, InjectionVerdict,
    PhishingAnalysis, StreamStatus, Transaction, TransactionFeatures,
};
use crate::client::ApiClient;
use crate::config::Config;
use crate::status::feed::StatusFeed;
use crate::status::poller::{run_status_poller, RefreshHandle};

/// How many rolling alerts the live view prints per frame.
const WATCH_ALERT_ROWS: usize = 8;

/// Live command-center view: runs the poller until Ctrl+C, printing one
/// frame per interval.
pub async fn watch(config: &Config, interval_ms: Option<u64>) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let interval = Duration::from_millis(interval_ms.unwrap_or(config.watch.poll_interval_ms));

    let feed = StatusFeed::new(config.watch.history_capacity);
    let refresh = RefreshHandle::new();
    let shutdown = CancellationToken::new();

    let poller = tokio::spawn(run_status_poller(
        client,
        feed.clone(),
        interval,
        refresh.clone(),
        shutdown.clone(),
    ));

    println!("Watching live status (Ctrl+C to stop)");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(interval) => render_frame(&feed).await,
        }
    }

    shutdown.cancel();
    let _ = poller.await;
    Ok(())
}

async fn render_frame(feed: &StatusFeed) {
    let now = chrono::Utc::now().format("%H:%M:%S");
    let link = if feed.is_connected().await {
        "CONNECTED"
    } else {
        "DISCONNECTED"
    };

    match feed.latest_snapshot().await {
        Some(status) => {
            let attack = if feed.is_under_attack().await {
                "  ** UNDER ATTACK **"
            } else {
                ""
            };
            println!(
                "{now} UTC | {link} | risk {} | {:.1} tx/s | {} active | {} blocked today | {} processed{attack}",
                status.risk_level,
                status.transactions_per_second,
                status.active_threats,
                status.blocked_today,
                status.total_processed,
            );

            let alerts = feed.rolling_alerts().await;
            for alert in alerts.iter().take(WATCH_ALERT_ROWS) {
                print_alert_row(alert);
            }
            if alerts.len() > WATCH_ALERT_ROWS {
                println!("  ... {} more in rolling history", alerts.len() - WATCH_ALERT_ROWS);
            }
        }
        None => println!("{now} UTC | {link} | waiting for first snapshot"),
    }
}

fn print_alert_row(alert: &FlaggedTransaction) {
    println!(
        "  {:<8} {:<12} amount {:>12.2}  risk {:.2}  {}",
        alert.status,
        alert.account_id,
        alert.amount,
        alert.risk_score,
        alert.summary(),
    );
}

/// One-shot snapshot fetch.
pub async fn status(config: &Config) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let status = client.stream_status().await?;
    print_snapshot(&status);
    Ok(())
}

fn print_snapshot(status: &StreamStatus) {
    println!("risk level:       {}", status.risk_level);
    println!("throughput:       {:.1} tx/s", status.transactions_per_second);
    println!("active threats:   {}", status.active_threats);
    println!("blocked today:    {}", status.blocked_today);
    println!("total processed:  {}", status.total_processed);

    if !status.threat_timeline.is_empty() {
        println!("timeline:");
        for point in &status.threat_timeline {
            println!("  {:<8} {:>4} threats / {:>5} total", point.time, point.threats, point.total);
        }
    }

    if status.recent_alerts.is_empty() {
        println!("no recent alerts");
    } else {
        println!("recent alerts:");
        for alert in &status.recent_alerts {
            print_alert_row(alert);
        }
    }
}

/// Trigger a simulated attack burst, then refresh the status view once.
pub async fn simulate_attack(config: &Config) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let outcome = client.simulate_attack().await?;

    println!("{}", outcome.message);
    println!("injected: {}", outcome.injected_count);
    for alert in &outcome.flagged {
        print_alert_row(alert);
    }

    println!();
    let status = client.stream_status().await?;
    print_snapshot(&status);
    Ok(())
}

/// Analyze free text for phishing markers.
pub async fn analyze_text(config: &Config, text: &str) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let analysis = client.analyze_text(text).await?;
    print_phishing_analysis(&analysis);
    Ok(())
}

fn print_phishing_analysis(analysis: &PhishingAnalysis) {
    let verdict = if analysis.is_phishing {
        "PHISHING"
    } else {
        "CLEAN"
    };
    println!(
        "{verdict} | {} | confidence {:.0}%",
        analysis.risk_label,
        analysis.confidence * 100.0
    );
    for marker in &analysis.markers {
        println!("  marker: {marker}");
    }
    println!("{}", analysis.explanation);
    println!("recommendation: {}", analysis.recommendation);
}

/// Submit a JSON file of transactions for batch analysis.
pub async fn analyze_batch(config: &Config, path: &str) -> eyre::Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("Failed to read transactions file '{}': {}", path, e))?;
    let transactions: Vec<Transaction> = serde_json::from_str(&content)
        .map_err(|e| eyre::eyre!("Failed to parse transactions file '{}': {}", path, e))?;

    let client = ApiClient::new(&config.api)?;
    let analysis = client.analyze_transactions(&transactions).await?;
    print_batch_analysis(&analysis);
    Ok(())
}

fn print_batch_analysis(analysis: &BatchAnalysis) {
    println!(
        "analyzed {} transactions, {} flagged",
        analysis.total_analyzed, analysis.total_flagged
    );
    for alert in &analysis.flagged {
        print_alert_row(alert);
    }
}

/// Score a single transaction.
pub async fn score(config: &Config, features: &TransactionFeatures) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let verdict = client.score_transaction(features).await?;
    print_fraud_verdict(&verdict);
    Ok(())
}

fn print_fraud_verdict(verdict: &FraudVerdict) {
    let headline = if verdict.is_fraud { "FRAUD" } else { "LEGITIMATE" };
    println!(
        "{headline} | {} | probability {:.1}%",
        verdict.risk_label,
        verdict.fraud_probability * 100.0
    );
    println!(
        "{} of {:.2} ({})",
        verdict.transaction_type, verdict.amount, verdict.account_id
    );
    if let Some(attack_type) = &verdict.attack_type {
        println!("attack type: {attack_type}");
    }
    println!("reason: {}", verdict.reason);
    println!("recommendation: {}", verdict.recommendation);

    println!("model breakdown:");
    println!("  isolation forest  {:.3}", verdict.model_breakdown.isolation_forest);
    if let Some(xgb) = verdict.model_breakdown.xgboost {
        println!("  xgboost           {:.3}", xgb);
    }
    println!("  ensemble          {:.3}", verdict.model_breakdown.ensemble);

    println!("feature importance:");
    for feature in &verdict.feature_importance {
        println!("  {:<22} {:.3}  {}", feature.label, feature.score, feature.value);
    }
}

/// One-shot prompt-injection check of a message.
pub async fn check_message(config: &Config, message: &str) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let verdict = client.check_agent_message(message).await?;
    print_injection_verdict(&verdict);
    Ok(())
}

fn print_injection_verdict(verdict: &InjectionVerdict) {
    if verdict.is_injection {
        println!(
            "INTERCEPTED | {} | confidence {:.0}% | severity {}",
            verdict.attack_type,
            verdict.confidence * 100.0,
            verdict.severity
        );
        for instruction in &verdict.injected_instructions {
            println!("  injected: {instruction}");
        }
    } else {
        println!("SAFE | confidence {:.0}%", verdict.confidence * 100.0);
    }
    println!("{}", verdict.explanation);
    if let Some(safe_response) = &verdict.safe_response {
        println!("suggested response: {safe_response}");
    }
}

const CHAT_WELCOME: &str = "Hello! I'm the AI banking assistant. I can help you with account \
inquiries, transfers, and transaction history. How can I assist you today?";

/// Interactive sandbox chat: every user line is screened for prompt
/// injection before it reaches the assistant. Type /quit to leave.
pub async fn chat(config: &Config) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let mut history = vec![ChatMessage::assistant(CHAT_WELCOME)];
    let mut intercepted = 0u32;
    let mut safe = 0u32;

    println!("agent: {CHAT_WELCOME}");
    println!("(messages are screened for prompt injection; /quit to exit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "/quit" || message == "/exit" {
            break;
        }

        let verdict = match client.check_agent_message(message).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(error = %e, "Message screening failed");
                println!("screening unavailable, message not sent - try again");
                continue;
            }
        };

        if verdict.is_injection {
            intercepted += 1;
            print_injection_verdict(&verdict);
            continue;
        }

        history.push(ChatMessage::user(message));
        match client.chat(&history).await {
            Ok(reply) => {
                println!("agent: {reply}");
                history.push(ChatMessage::assistant(reply));
                safe += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat turn failed");
                println!("agent unavailable - try again");
                history.pop();
            }
        }
    }

    println!("session: {safe} safe, {intercepted} intercepted");
    Ok(())
}
