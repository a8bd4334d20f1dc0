//! supportlens-cli — terminal frontend for the SupportLens HTTP API
//!
//! Talks to a running supportlens-server and mirrors the dashboard flows:
//! `chat` sends a message to the support bot and then records the turn as a
//! trace, exactly like the web chat does.
//!
//! # Subcommands
//! - `chat <message> [--no-record]`       — ask the support bot, log the trace
//! - `traces [--category <name>] [--json]` — list recorded traces, newest first
//! - `analytics [--json]`                  — aggregate statistics
//! - `status`                              — show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "supportlens-cli",
    version,
    about = "SupportLens — chatbot trace recording and analytics CLI"
)]
struct Cli {
    /// SupportLens HTTP server URL (overrides SUPPORTLENS_HTTP_URL env var)
    #[arg(long, env = "SUPPORTLENS_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send a message to the support bot and record the trace
    Chat {
        /// Customer message to send
        message: String,

        /// Print the reply without recording a trace
        #[arg(long)]
        no_record: bool,
    },

    /// List recorded traces, most recent first
    Traces {
        /// Only show traces with this category (e.g. "Billing", "Account Access")
        #[arg(long)]
        category: Option<String>,

        /// Output the raw JSON array instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics across all traces
    Analytics {
        /// Output the raw JSON object instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Show SupportLens server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

/// A chat reply from POST /chat
#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub response_time_ms: i64,
}

/// A recorded trace from POST /traces or GET /traces
#[derive(Debug, Deserialize)]
pub struct Trace {
    pub id: String,
    pub user_message: String,
    pub bot_response: String,
    pub category: String,
    pub timestamp: String,
    pub response_time_ms: i64,
}

/// One category's slice of the analytics summary
#[derive(Debug, Deserialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub percentage: f64,
}

/// The full summary from GET /analytics
#[derive(Debug, Deserialize)]
pub struct Analytics {
    pub total_traces: i64,
    pub by_category: Vec<CategoryStat>,
    pub avg_response_time_ms: f64,
}

// ============================================================================
// Output Formatting
// ============================================================================

/// Render a millisecond latency the way the dashboard does: plain
/// milliseconds below one second, one-decimal seconds above.
pub fn format_millis(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{}ms", ms.round() as i64)
    } else {
        format!("{:.1}s", ms / 1000.0)
    }
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}…", cut)
    } else {
        text.to_string()
    }
}

/// Shorten an RFC 3339 timestamp to "YYYY-MM-DD HH:MM" for table rows.
/// Anything too short to carry that much is passed through untouched.
pub fn short_timestamp(ts: &str) -> String {
    if ts.len() >= 16 {
        ts[..16].replacen('T', " ", 1)
    } else {
        ts.to_string()
    }
}

/// One table row for a trace listing.
pub fn format_trace_line(trace: &Trace) -> String {
    format!(
        "{}  {:<15}  {:>7}  {}",
        short_timestamp(&trace.timestamp),
        trace.category,
        format_millis(trace.response_time_ms as f64),
        truncate(&trace.user_message, 60),
    )
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn blocking_client(timeout_secs: u64) -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}

/// Read an error body's "error" field, falling back to the raw text.
fn server_error_message(resp: reqwest::blocking::Response) -> String {
    let body = resp.text().unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or(body)
}

/// Send one message to the support bot and (unless opted out) record the
/// turn as a trace, the same two-step flow the dashboard chat uses.
fn do_chat(server: &str, message: &str, no_record: bool) -> anyhow::Result<()> {
    // Generous timeout: the reply comes from a live model call.
    let client = blocking_client(60)?;

    let url = format!("{}/chat", server);
    let resp = client
        .post(&url)
        .json(&serde_json::json!({ "message": message }))
        .send();

    let resp = match resp {
        Ok(r) => r,
        Err(e) => {
            eprintln!("supportlens-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        eprintln!(
            "supportlens-cli: server returned {}: {}",
            status,
            server_error_message(resp)
        );
        std::process::exit(1);
    }

    let reply: ChatReply = match resp.json() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("supportlens-cli: failed to parse chat response: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", reply.response);
    println!();
    println!("({})", format_millis(reply.response_time_ms as f64));

    if no_record {
        return Ok(());
    }

    // Record the turn. The reply was already delivered, so a recording
    // failure is reported but does not fail the command — same tolerance
    // the dashboard has.
    let trace_url = format!("{}/traces", server);
    let record = client
        .post(&trace_url)
        .json(&serde_json::json!({
            "user_message": message,
            "bot_response": reply.response,
            "response_time_ms": reply.response_time_ms,
        }))
        .send();

    match record {
        Ok(r) if r.status().is_success() => {
            let trace: Trace = r.json()?;
            println!("Recorded trace {} — classified as {}", trace.id, trace.category);
        }
        Ok(r) => {
            let status = r.status();
            eprintln!(
                "supportlens-cli: trace not recorded ({}): {}",
                status,
                server_error_message(r)
            );
        }
        Err(e) => {
            eprintln!("supportlens-cli: trace not recorded: {}", e);
        }
    }

    Ok(())
}

/// List traces, optionally filtered by category.
fn do_traces(server: &str, category: Option<&str>, json_output: bool) -> anyhow::Result<()> {
    let client = blocking_client(10)?;

    let url = format!("{}/traces", server);
    let mut req = client.get(&url);
    if let Some(name) = category {
        req = req.query(&[("category", name)]);
    }

    let resp = match req.send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("supportlens-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        eprintln!(
            "supportlens-cli: server returned {}: {}",
            status,
            server_error_message(resp)
        );
        std::process::exit(1);
    }

    if json_output {
        let body: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let traces: Vec<Trace> = match resp.json() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("supportlens-cli: failed to parse trace list: {}", e);
            std::process::exit(1);
        }
    };

    if traces.is_empty() {
        eprintln!("No traces found");
        return Ok(());
    }

    for trace in &traces {
        println!("{}", format_trace_line(trace));
    }
    println!();
    println!(
        "{} trace{} shown",
        traces.len(),
        if traces.len() == 1 { "" } else { "s" }
    );

    Ok(())
}

/// Show the analytics summary.
fn do_analytics(server: &str, json_output: bool) -> anyhow::Result<()> {
    let client = blocking_client(10)?;

    let url = format!("{}/analytics", server);
    let resp = match client.get(&url).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("supportlens-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        eprintln!(
            "supportlens-cli: server returned {}: {}",
            status,
            server_error_message(resp)
        );
        std::process::exit(1);
    }

    if json_output {
        let body: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let summary: Analytics = match resp.json() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("supportlens-cli: failed to parse analytics: {}", e);
            std::process::exit(1);
        }
    };

    println!("Total traces:      {}", summary.total_traces);
    println!(
        "Avg response time: {}",
        format_millis(summary.avg_response_time_ms)
    );

    if !summary.by_category.is_empty() {
        println!();
        println!("By category:");
        for stat in &summary.by_category {
            println!(
                "  {:<15}  {:>4}  ({}%)",
                stat.category, stat.count, stat.percentage
            );
        }
    }

    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = blocking_client(10)?;

    let url = format!("{}/health", server);
    let resp = client.get(&url).send();

    match resp {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("SupportLens server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:            {}", body["version"].as_str().unwrap_or("?"));
            println!("PostgreSQL:         {}", body["postgresql"].as_str().unwrap_or("?"));
        }
        Ok(r) => {
            let status = r.status();
            eprintln!("supportlens-cli: server unhealthy (HTTP {})", status);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("supportlens-cli: cannot reach {} — {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Chat { message, no_record } => do_chat(&server, &message, no_record),
        Commands::Traces { category, json } => do_traces(&server, category.as_deref(), json),
        Commands::Analytics { json } => do_analytics(&server, json),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("supportlens-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_trace(category: &str, message: &str, ms: i64) -> Trace {
        Trace {
            id: "7b5c24ab-1234-5678-9abc-def012345678".to_string(),
            user_message: message.to_string(),
            bot_response: "Sure, I can help with that.".to_string(),
            category: category.to_string(),
            timestamp: "2026-08-14T09:30:15.123456Z".to_string(),
            response_time_ms: ms,
        }
    }

    // ========================================================================
    // TEST 1: format_millis — sub-second values stay in milliseconds
    // ========================================================================
    #[test]
    fn test_format_millis_sub_second() {
        assert_eq!(format_millis(890.0), "890ms");
        assert_eq!(format_millis(0.0), "0ms");
        assert_eq!(format_millis(999.4), "999ms");
    }

    // ========================================================================
    // TEST 2: format_millis — one second and above become decimal seconds
    // ========================================================================
    #[test]
    fn test_format_millis_seconds() {
        assert_eq!(format_millis(1000.0), "1.0s");
        assert_eq!(format_millis(1480.0), "1.5s");
        assert_eq!(format_millis(3000.0), "3.0s");
        assert_eq!(format_millis(12345.0), "12.3s");
    }

    // ========================================================================
    // TEST 3: truncate — short text passes through untouched
    // ========================================================================
    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate("hello", 60), "hello");
        assert_eq!(truncate("", 60), "");
        let exactly = "a".repeat(60);
        assert_eq!(truncate(&exactly, 60), exactly);
    }

    // ========================================================================
    // TEST 4: truncate — long text is cut and marked with an ellipsis
    // ========================================================================
    #[test]
    fn test_truncate_long_text() {
        let long = "b".repeat(100);
        let cut = truncate(&long, 60);
        assert_eq!(cut.chars().count(), 61, "60 chars + ellipsis");
        assert!(cut.ends_with('…'));
        assert!(cut.starts_with(&"b".repeat(60)));
    }

    // ========================================================================
    // TEST 5: truncate counts characters, not bytes
    // ========================================================================
    #[test]
    fn test_truncate_multibyte() {
        let text = "å".repeat(70);
        let cut = truncate(&text, 60);
        assert_eq!(cut.chars().count(), 61);
        assert!(cut.ends_with('…'));
    }

    // ========================================================================
    // TEST 6: short_timestamp — RFC 3339 shortens to date + minutes
    // ========================================================================
    #[test]
    fn test_short_timestamp() {
        assert_eq!(
            short_timestamp("2026-08-14T09:30:15.123456Z"),
            "2026-08-14 09:30"
        );
        assert_eq!(short_timestamp("2026-08-14T09:30:15Z"), "2026-08-14 09:30");
    }

    // ========================================================================
    // TEST 7: short_timestamp — too-short input is passed through
    // ========================================================================
    #[test]
    fn test_short_timestamp_passthrough() {
        assert_eq!(short_timestamp("2026-08-14"), "2026-08-14");
        assert_eq!(short_timestamp(""), "");
    }

    // ========================================================================
    // TEST 8: format_trace_line — carries timestamp, category, time, message
    // ========================================================================
    #[test]
    fn test_format_trace_line_fields() {
        let trace = mock_trace("Billing", "Why was I charged twice this month?", 1240);
        let line = format_trace_line(&trace);

        assert!(line.starts_with("2026-08-14 09:30"));
        assert!(line.contains("Billing"));
        assert!(line.contains("1.2s"));
        assert!(line.contains("Why was I charged twice this month?"));
    }

    // ========================================================================
    // TEST 9: format_trace_line — long messages are truncated in the row
    // ========================================================================
    #[test]
    fn test_format_trace_line_truncates_message() {
        let long_message = "c".repeat(200);
        let trace = mock_trace("Refund", &long_message, 500);
        let line = format_trace_line(&trace);

        assert!(line.contains('…'));
        assert!(!line.contains(&"c".repeat(61)));
    }

    // ========================================================================
    // TEST 10: API response types parse the server's JSON shapes
    // ========================================================================
    #[test]
    fn test_response_types_deserialize() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"response": "You can reset it from the login page.", "response_time_ms": 912}"#,
        )
        .expect("chat reply should parse");
        assert_eq!(reply.response_time_ms, 912);

        let summary: Analytics = serde_json::from_str(
            r#"{
                "total_traces": 5,
                "by_category": [
                    {"category": "Billing", "count": 3, "percentage": 60.0},
                    {"category": "General Inquiry", "count": 2, "percentage": 40.0}
                ],
                "avg_response_time_ms": 3000.0
            }"#,
        )
        .expect("analytics should parse");
        assert_eq!(summary.total_traces, 5);
        assert_eq!(summary.by_category.len(), 2);
        assert_eq!(summary.by_category[1].category, "General Inquiry");

        let trace: Trace = serde_json::from_str(
            r#"{
                "id": "7b5c24ab-1234-5678-9abc-def012345678",
                "user_message": "I want a refund for my last charge",
                "bot_response": "I can help with that.",
                "category": "Refund",
                "timestamp": "2026-08-14T09:30:15.123456Z",
                "response_time_ms": 1480
            }"#,
        )
        .expect("trace should parse");
        assert_eq!(trace.category, "Refund");
    }
}
