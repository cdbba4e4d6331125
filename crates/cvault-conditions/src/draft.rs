//! # Condition Drafting Assistant
//!
//! Extracts candidate conditions from free text with fixed heuristic
//! rules. **Advisory only**: the output is lossy, best-effort pattern
//! matching — not semantic understanding and not a security boundary.
//! Nothing here ever binds to a vault; a draft becomes real only when an
//! authorized human passes it to `create` explicitly.
//!
//! ## Rules
//!
//! - `after 2026-06-15` / `after 15 june 2026` → a time lock at that
//!   date, midnight UTC.
//! - `attendance > 75` / `attendance >= 75%` → a threshold on the
//!   "attendance" metric (same for "grade").
//! - `approved by …` / `approval` / `approve` → an approval condition;
//!   the description names admin when the text mentions one.

use serde::{Deserialize, Serialize};

use cvault_core::Timestamp;

use crate::condition::{Condition, ThresholdOperator};

/// A candidate condition awaiting human confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftCondition {
    /// The extracted condition.
    pub condition: Condition,
    /// Why the assistant proposed it.
    pub description: String,
    /// The text fragment that triggered the rule.
    pub matched: String,
}

/// Run every heuristic over `text`, returning zero or more drafts.
pub fn draft_conditions(text: &str) -> Vec<DraftCondition> {
    let lowered = text.to_ascii_lowercase();
    let tokens = tokenize(&lowered);

    let mut drafts = Vec::new();
    drafts.extend(scan_time_locks(&tokens));
    drafts.extend(scan_thresholds(&tokens, "attendance"));
    drafts.extend(scan_thresholds(&tokens, "grade"));
    drafts.extend(scan_approval(&lowered));
    drafts
}

// ─── Tokenizer ───────────────────────────────────────────────────────

/// Split on whitespace, spacing out comparison operators so glued forms
/// like `attendance>75%` tokenize the same as spaced ones. `>=` is
/// shielded with a sentinel so the lone-`>` pass cannot split it.
fn tokenize(lowered: &str) -> Vec<String> {
    lowered
        .replace(">=", " \u{1} ")
        .replace('>', " > ")
        .replace('\u{1}', ">=")
        .split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | '(' | ')')))
        .filter(|tok| !tok.is_empty())
        .map(str::to_string)
        .collect()
}

// ─── Time locks ──────────────────────────────────────────────────────

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == name || (name.len() >= 3 && m.starts_with(name)))
        .map(|i| i as u32 + 1)
}

fn midnight(y: i32, mo: u32, d: u32) -> Option<Timestamp> {
    Timestamp::from_ymd_hms(y, mo, d, 0, 0, 0).ok()
}

/// `YYYY-MM-DD` as a midnight-UTC timestamp.
fn parse_iso_date(tok: &str) -> Option<Timestamp> {
    let mut parts = tok.splitn(3, '-');
    let y: i32 = parts.next()?.parse().ok()?;
    let mo: u32 = parts.next()?.parse().ok()?;
    let d: u32 = parts.next()?.parse().ok()?;
    midnight(y, mo, d)
}

fn scan_time_locks(tokens: &[String]) -> Vec<DraftCondition> {
    let mut drafts = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if tok != "after" {
            continue;
        }
        // "after 2026-06-15"
        if let Some(unlock_at) = tokens.get(i + 1).and_then(|t| parse_iso_date(t)) {
            drafts.push(DraftCondition {
                condition: Condition::TimeLock { unlock_at },
                description: format!("release after {unlock_at}"),
                matched: tokens[i..=i + 1].join(" "),
            });
            continue;
        }
        // "after 15 june 2026"
        if let (Some(d), Some(mo), Some(y)) = (
            tokens.get(i + 1).and_then(|t| t.parse::<u32>().ok()),
            tokens.get(i + 2).and_then(|t| month_number(t)),
            tokens.get(i + 3).and_then(|t| t.parse::<i32>().ok()),
        ) {
            if let Some(unlock_at) = midnight(y, mo, d) {
                drafts.push(DraftCondition {
                    condition: Condition::TimeLock { unlock_at },
                    description: format!("release after {unlock_at}"),
                    matched: tokens[i..=i + 3].join(" "),
                });
            }
        }
    }
    drafts
}

// ─── Thresholds ──────────────────────────────────────────────────────

fn parse_target(tok: &str) -> Option<f64> {
    tok.trim_end_matches('%').parse().ok()
}

fn scan_thresholds(tokens: &[String], metric: &str) -> Vec<DraftCondition> {
    let mut drafts = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if tok != metric {
            continue;
        }
        let operator = match tokens.get(i + 1).map(String::as_str) {
            Some(">") => ThresholdOperator::Gt,
            Some(">=") => ThresholdOperator::Ge,
            _ => continue,
        };
        let Some(target) = tokens.get(i + 2).and_then(|t| parse_target(t)) else {
            continue;
        };
        drafts.push(DraftCondition {
            condition: Condition::Threshold {
                metric: metric.to_string(),
                operator,
                target,
            },
            description: format!("{metric} {operator} {target}"),
            matched: tokens[i..=i + 2].join(" "),
        });
    }
    drafts
}

// ─── Approvals ───────────────────────────────────────────────────────

fn scan_approval(lowered: &str) -> Vec<DraftCondition> {
    if !lowered.contains("approv") {
        return Vec::new();
    }
    let role = if lowered.contains("admin") {
        "admin"
    } else {
        "faculty"
    };
    let matched = if lowered.contains("approved by") {
        "approved by"
    } else {
        "approv"
    };
    vec![DraftCondition {
        condition: Condition::Approval {
            required_approver: None,
        },
        description: format!("requires {role} approval"),
        matched: matched.to_string(),
    }]
}
