//! History trim command handler.

use std::path::Path;

use anyhow::{Context, Result};

use masgent::agent::{trim_with_report, TrimOutcome};
use masgent::session::{find_orphaned_results, read_history};

/// Trim a JSON history file and write the result to `output` or stdout.
///
/// Diagnostics go to stderr so stdout can be piped as JSON.
pub(crate) fn cmd_trim(input: &Path, window: usize, output: Option<&Path>) -> Result<()> {
    let history = read_history(input)
        .with_context(|| format!("Failed to read history from {}", input.display()))?;

    let orphans = find_orphaned_results(&history);
    if !orphans.is_empty() {
        eprintln!(
            "Warning: {} tool result(s) without a preceding call: {}",
            orphans.len(),
            orphans.join(", ")
        );
    }

    let (trimmed, outcome) = trim_with_report(history, window);

    let json = serde_json::to_string_pretty(&trimmed)?;
    match output {
        Some(path) => std::fs::write(path, format!("{}\n", json))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }

    eprintln!("{}", summarize(&outcome, window));
    Ok(())
}

fn summarize(outcome: &TrimOutcome, window: usize) -> String {
    match outcome {
        TrimOutcome::Unchanged { len } => {
            format!("Unchanged: {} message(s) fit window {}", len, window)
        }
        TrimOutcome::Trimmed {
            before,
            after,
            system_preserved,
            ..
        } => {
            let note = if *system_preserved {
                " (system prompt kept)"
            } else {
                ""
            };
            format!(
                "Trimmed: {} -> {} message(s) with window {}{}",
                before, after, window, note
            )
        }
        TrimOutcome::NoSafeCut { len } => format!(
            "No safe cut point: kept all {} message(s) for window {}",
            len, window
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masgent::session::{History, Message};
    use tempfile::TempDir;

    fn write_history(dir: &TempDir, history: &[Message]) -> std::path::PathBuf {
        let path = dir.path().join("history.json");
        std::fs::write(&path, serde_json::to_string(history).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_trim_to_output_file() {
        let dir = TempDir::new().unwrap();
        let mut history = vec![Message::system("sys")];
        for i in 0..6 {
            history.push(Message::user(&format!("q{}", i)));
            history.push(Message::model(&format!("a{}", i)));
        }
        let input = write_history(&dir, &history);
        let output = dir.path().join("out.json");

        cmd_trim(&input, 4, Some(&output)).unwrap();

        let trimmed: History =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(trimmed.len(), 5);
        assert!(trimmed[0].is_system());
        assert_eq!(trimmed[4].text(), "a5");
    }

    #[test]
    fn test_trim_rejects_invalid_message() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"[{"origin":"user","parts":[]}]"#).unwrap();
        let err = cmd_trim(&path, 2, None).unwrap_err();
        assert!(format!("{:#}", err).contains("message at index 0"));
    }

    #[test]
    fn test_trim_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = cmd_trim(&dir.path().join("missing.json"), 2, None).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read history from"));
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            summarize(&TrimOutcome::Unchanged { len: 3 }, 10),
            "Unchanged: 3 message(s) fit window 10"
        );
        assert!(summarize(&TrimOutcome::NoSafeCut { len: 12 }, 10).contains("kept all 12"));

        let history: History = (0..5).map(|i| Message::user(&format!("q{}", i))).collect();
        let (_, outcome) = trim_with_report(history, 2);
        assert_eq!(
            summarize(&outcome, 2),
            "Trimmed: 5 -> 2 message(s) with window 2"
        );
    }
}
