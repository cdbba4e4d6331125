//! # `cvault draft` — Drafting Assistant at the Terminal
//!
//! Runs the heuristic condition extractor over the given text and
//! prints the candidate conditions as JSON. Advisory output for a human
//! to review; nothing is created.

use clap::Args;

use cvault_conditions::draft_conditions;

/// Arguments for the `draft` subcommand.
#[derive(Args, Debug)]
pub struct DraftArgs {
    /// Free text describing release conditions, e.g.
    /// "release after 2026-06-15 if attendance > 80%".
    pub text: Vec<String>,
}

/// Extract drafts and print them.
pub fn run(args: DraftArgs) -> anyhow::Result<()> {
    let text = args.text.join(" ");
    let drafts = draft_conditions(&text);
    if drafts.is_empty() {
        eprintln!("no conditions recognized (the extractor is heuristic and lossy)");
    }
    println!("{}", serde_json::to_string_pretty(&drafts)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_accepts_plain_text() {
        let args = DraftArgs {
            text: vec!["attendance".into(), ">".into(), "75%".into()],
        };
        assert!(run(args).is_ok());
    }
}
