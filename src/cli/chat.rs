//! AI-mode command handler (interactive + single message).

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use masgent::agent::{AgentRuntime, ConversationLoop, EchoRuntime};
use masgent::config::Config;
use masgent::session::{Message, Part};

/// Longest part preview shown by the `history` command, in characters.
const PREVIEW_CHARS: usize = 80;

/// Run AI mode, either for a single message or as a REPL.
pub(crate) async fn cmd_chat(
    mut config: Config,
    message: Option<String>,
    window: Option<usize>,
) -> Result<()> {
    if let Some(size) = window {
        config.window.size = size;
    }

    let mut conversation = ConversationLoop::from_config(EchoRuntime, &config);

    if let Some(msg) = message {
        let reply = conversation
            .process(&msg)
            .await
            .with_context(|| "Failed to process message")?;
        println!("{}", reply);
        return Ok(());
    }

    println!("Masgent AI Mode");
    println!(
        "Runtime: {}, window: {} messages",
        conversation.runtime().name(),
        config.window.size
    );
    println!("Type 'help' for commands, 'exit' or 'quit' to stop.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                match input {
                    "" => continue,
                    "quit" | "exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    "history" => print_history(conversation.history()),
                    _ => match conversation.process(input).await {
                        Ok(reply) => {
                            println!();
                            println!("{}", reply);
                            println!();
                        }
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            eprintln!();
                        }
                    },
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }

    let dropped = conversation.end();
    masgent::log_component!(info, "cli", "Conversation ended", dropped = dropped);
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  help     Show this message");
    println!("  history  Show the messages currently kept in the window");
    println!("  exit     Leave AI mode (also: quit, Ctrl-D)");
    println!("Anything else is sent to the assistant.");
    println!();
}

fn print_history(history: &[Message]) {
    if history.is_empty() {
        println!("(no messages)");
    }
    for (i, message) in history.iter().enumerate() {
        let parts: Vec<String> = message.parts.iter().map(describe_part).collect();
        println!("[{}] {}: {}", i, message.origin, parts.join(" | "));
    }
    println!();
}

/// One-line summary of a part for the `history` listing.
fn describe_part(part: &Part) -> String {
    match part {
        Part::Instruction { content } | Part::Text { content } => preview(content),
        Part::ToolCall { call_id, name, .. } => format!("tool call {} ({})", name, call_id),
        Part::ToolResult { call_id, .. } => format!("tool result ({})", call_id),
    }
}

/// First line of `text`, cut to [`PREVIEW_CHARS`] characters.
fn preview(text: &str) -> String {
    let text = text.trim_end();
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else if line.len() < text.len() {
        format!("{}...", line)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text() {
        assert_eq!(preview("Generate a POSCAR"), "Generate a POSCAR");
    }

    #[test]
    fn test_preview_multiline() {
        assert_eq!(preview("first\nsecond"), "first...");
    }

    #[test]
    fn test_preview_long_multibyte() {
        let text = "å".repeat(100);
        let out = preview(&text);
        assert_eq!(out.chars().count(), PREVIEW_CHARS + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_describe_tool_parts() {
        let call = Part::tool_call("c1", "generate_vasp_poscar", "{}");
        assert_eq!(describe_part(&call), "tool call generate_vasp_poscar (c1)");
        let result = Part::tool_result("c1", "ok");
        assert_eq!(describe_part(&result), "tool result (c1)");
    }
}
