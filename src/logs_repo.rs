// Recent, safe log lines from the system journal and the Docker event
// stream. Everything here is best-effort: a missing binary, a timeout or a
// parse failure contributes nothing.

use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::models::LogEntry;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Words that mark a journal message as too sensitive to re-expose.
const SENSITIVE_MARKERS: &[&str] = &["password", "key", "secret", "token", "auth"];

pub struct LogsRepo {
    max_entries: usize,
}

impl LogsRepo {
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    /// Assemble recent entries from all sources, newest-biased, capped at
    /// `max_entries`. A cap of zero disables the subprocess work entirely.
    pub async fn collect(&self) -> Vec<LogEntry> {
        if self.max_entries == 0 {
            return Vec::new();
        }
        let mut logs = Vec::new();
        logs.extend(docker_events().await);
        logs.extend(journal_warnings().await);
        logs.extend(ssh_logins().await);
        if logs.len() > self.max_entries {
            logs.split_off(logs.len() - self.max_entries)
        } else {
            logs
        }
    }
}

/// Run a command with a hard timeout; stdout on success, None otherwise.
async fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let result = timeout(COMMAND_TIMEOUT, Command::new(program).args(args).output())
        .await
        .ok()?
        .ok()?;
    if !result.status.success() {
        return None;
    }
    String::from_utf8(result.stdout).ok()
}

fn clock_now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Container lifecycle events from the last five minutes (action + name
/// only). Exec events are too noisy to carry.
async fn docker_events() -> Vec<LogEntry> {
    let Some(out) = command_stdout(
        "docker",
        &[
            "events",
            "--since",
            "5m",
            "--until",
            "0s",
            "--format",
            "{{.Action}} {{.Actor.Attributes.name}}",
        ],
    )
    .await
    else {
        return Vec::new();
    };

    let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .take(5)
        .rev()
        .filter_map(|line| {
            let (action, name) = line.split_once(' ')?;
            if action.starts_with("exec_") {
                return None;
            }
            Some(LogEntry {
                time: clock_now(),
                level: "info".into(),
                source: "docker".into(),
                message: format!("{name} {action}"),
            })
        })
        .collect()
}

/// Journal entries at warning priority or worse. Messages naming secrets
/// are dropped rather than redacted.
async fn journal_warnings() -> Vec<LogEntry> {
    let Some(out) = command_stdout(
        "journalctl",
        &[
            "-p",
            "4",
            "-n",
            "10",
            "--no-pager",
            "-o",
            "json",
            "--output-fields=MESSAGE,_SYSTEMD_UNIT,__REALTIME_TIMESTAMP",
        ],
    )
    .await
    else {
        return Vec::new();
    };

    let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .take(3)
        .rev()
        .filter_map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).ok()?;
            let message = truncate_chars(entry["MESSAGE"].as_str().unwrap_or(""), 50);
            let lowered = message.to_lowercase();
            if SENSITIVE_MARKERS.iter().any(|m| lowered.contains(m)) {
                return None;
            }
            let unit = entry["_SYSTEMD_UNIT"].as_str().unwrap_or("system");
            let source = truncate_chars(unit.trim_end_matches(".service"), 10);
            let time = entry["__REALTIME_TIMESTAMP"]
                .as_str()
                .and_then(|us| us.parse::<i64>().ok())
                .and_then(|us| chrono::DateTime::from_timestamp(us / 1_000_000, 0))
                .map(|t| {
                    t.with_timezone(&chrono::Local)
                        .format("%H:%M:%S")
                        .to_string()
                })
                .unwrap_or_else(|| "--:--:--".into());
            Some(LogEntry {
                time,
                level: "warn".into(),
                source,
                message,
            })
        })
        .collect()
}

/// Successful SSH logins: user and method, never the peer address.
async fn ssh_logins() -> Vec<LogEntry> {
    let Some(out) = command_stdout(
        "journalctl",
        &["-u", "sshd", "-n", "20", "--no-pager", "-o", "cat"],
    )
    .await
    else {
        return Vec::new();
    };

    out.lines()
        .filter_map(|line| {
            let rest = line.split_once("Accepted ")?.1;
            let mut words = rest.split_whitespace();
            let method = words.next()?;
            if words.next()? != "for" {
                return None;
            }
            let user = words.next()?;
            Some(LogEntry {
                time: clock_now(),
                level: "success".into(),
                source: "ssh".into(),
                message: format!("Login: {user} via {method}"),
            })
        })
        .collect()
}
