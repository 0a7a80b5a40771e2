use std::io::{self, Write};

use colored::Colorize;
use folio_assistant::{Assistant, Reaction, RejectReason, SubmitOutcome};
use folio_core::Message;
use folio_observability::{create_session_span, new_request_id};
use tracing::Instrument;

use crate::render::render_terminal;

/// A line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Say(String),
    New,
    End,
    /// 1-based message number; the last reply when absent
    Retry(Option<usize>),
    React(usize, Reaction),
    Copy(usize),
    History,
    Load(String),
    ClearHistory,
    /// List the starter prompts, or send the n-th one
    Quick(Option<usize>),
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
/new              start a fresh conversation (the current one is archived)
/end              archive the conversation and close the widget
/retry [n]        regenerate reply n (default: the last reply)
/like n           toggle a like on reply n
/dislike n        toggle a dislike on reply n
/copy n           print message n as plain text
/history          list archived conversations
/load <id>        reopen an archived conversation
/clear-history    delete all archived conversations
/quick [n]        show starter questions, or ask question n
/help             show this help
/quit             leave";

/// Parse a prompt line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(ChatCommand::Say(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();
    let number = |arg: Option<&str>| arg.and_then(|a| a.parse::<usize>().ok()).filter(|n| *n > 0);

    let command = match (name.as_str(), arg) {
        ("new", None) => ChatCommand::New,
        ("end", None) => ChatCommand::End,
        ("retry", None) => ChatCommand::Retry(None),
        ("retry", Some(_)) => match number(arg) {
            Some(n) => ChatCommand::Retry(Some(n)),
            None => ChatCommand::Invalid(line.to_string()),
        },
        ("like", _) | ("dislike", _) => {
            let reaction = if name == "like" {
                Reaction::Like
            } else {
                Reaction::Dislike
            };
            match number(arg) {
                Some(n) => ChatCommand::React(n, reaction),
                None => ChatCommand::Invalid(line.to_string()),
            }
        }
        ("copy", _) => match number(arg) {
            Some(n) => ChatCommand::Copy(n),
            None => ChatCommand::Invalid(line.to_string()),
        },
        ("history", None) => ChatCommand::History,
        ("load", Some(id)) => ChatCommand::Load(id.to_string()),
        ("clear-history", None) => ChatCommand::ClearHistory,
        ("quick", None) => ChatCommand::Quick(None),
        ("quick", Some(_)) => match number(arg) {
            Some(n) => ChatCommand::Quick(Some(n)),
            None => ChatCommand::Invalid(line.to_string()),
        },
        ("help", _) => ChatCommand::Help,
        ("quit", _) | ("exit", _) => ChatCommand::Quit,
        _ => ChatCommand::Invalid(line.to_string()),
    };
    Some(command)
}

fn print_message(assistant: &Assistant, number: usize, message: &Message) {
    if message.is_user() {
        println!("{} {}", format!("[{}] You:", number).cyan().bold(), message.content);
    } else {
        let fragment = assistant.renderer().render(&message.content);
        let marker = match assistant.reaction(&message.id) {
            Some(Reaction::Like) => " 👍",
            Some(Reaction::Dislike) => " 👎",
            None => "",
        };
        println!("{}{}", format!("[{}] Assistant:", number).green().bold(), marker);
        println!("{}", render_terminal(&fragment));
    }
}

fn print_transcript(assistant: &Assistant) {
    for (i, message) in assistant.messages().iter().enumerate() {
        print_message(assistant, i + 1, message);
        println!();
    }
}

fn print_quick_questions(assistant: &Assistant) {
    let questions = assistant.quick_questions();
    if questions.is_empty() {
        println!("{}", "Starter questions are only offered in a fresh conversation.".dimmed());
        return;
    }
    println!("{}", "Quick questions:".cyan());
    for (i, question) in questions.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), question);
    }
}

fn report_rejection(reason: &RejectReason) {
    println!("{}", format!("⚠️  {}", reason).yellow());
}

fn show_outcome(assistant: &Assistant, outcome: SubmitOutcome, debug: bool) {
    match outcome {
        SubmitOutcome::Replied(receipt) => {
            let messages = assistant.messages();
            if let Some((i, message)) = messages
                .iter()
                .enumerate()
                .find(|(_, m)| m.id == receipt.message_id)
            {
                print_message(assistant, i + 1, message);
            }
            if debug {
                eprintln!("{}", format!("[DEBUG] reply source: {}", receipt.source).dimmed());
            }
        }
        SubmitOutcome::Rejected(reason) => report_rejection(&reason),
        SubmitOutcome::Discarded => {
            println!("{}", "Reply discarded: the conversation changed.".dimmed());
        }
    }
}

fn request_span(assistant: &Assistant) -> tracing::Span {
    let session_id = assistant.session_id().unwrap_or_default();
    create_session_span(&session_id, Some(&new_request_id()))
}

fn message_id_at(assistant: &Assistant, number: usize) -> Option<String> {
    assistant
        .messages()
        .get(number.checked_sub(1)?)
        .map(|m| m.id.clone())
}

async fn print_history(assistant: &Assistant) {
    let entries = assistant.history().await;
    if entries.is_empty() {
        println!("{}", "No archived conversations.".dimmed());
        return;
    }
    for entry in entries {
        println!(
            "  {}  {}  {}",
            entry.session_id.dimmed(),
            entry.title,
            format!("({} messages)", entry.message_count()).dimmed()
        );
    }
}

/// Interactive widget session on stdin/stdout
pub async fn run_chat(assistant: Assistant, debug: bool) -> anyhow::Result<()> {
    println!("{}", "💬 Folio assistant".cyan().bold());
    println!(
        "{}",
        if assistant.is_offline() {
            "Offline mode: scripted replies only. Type /help for commands."
        } else {
            "Type /help for commands."
        }
        .dimmed()
    );
    println!();

    assistant.open();
    print_transcript(&assistant);
    print_quick_questions(&assistant);
    println!();

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let Some(command) = parse_command(&input) else {
            continue;
        };

        match command {
            ChatCommand::Say(text) => {
                let outcome = assistant.submit(&text).instrument(request_span(&assistant)).await;
                show_outcome(&assistant, outcome, debug);
            }
            ChatCommand::Quick(None) => print_quick_questions(&assistant),
            ChatCommand::Quick(Some(n)) => match assistant.quick_questions().get(n - 1).cloned() {
                Some(question) => {
                    println!("{} {}", "You:".cyan().bold(), question);
                    let outcome = assistant
                        .submit(&question)
                        .instrument(request_span(&assistant))
                        .await;
                    show_outcome(&assistant, outcome, debug);
                }
                None => println!("{}", format!("No quick question {}", n).yellow()),
            },
            ChatCommand::New => {
                assistant.new_chat().await;
                println!("{}", "✨ New conversation".cyan());
                print_transcript(&assistant);
                print_quick_questions(&assistant);
            }
            ChatCommand::End => {
                assistant.end_chat().await;
                println!("{}", "👋 Conversation ended.".cyan());
                break;
            }
            ChatCommand::Retry(number) => {
                let index = match number {
                    Some(n) => n - 1,
                    None => assistant.messages().len().saturating_sub(1),
                };
                let outcome = assistant.retry(index).instrument(request_span(&assistant)).await;
                show_outcome(&assistant, outcome, debug);
            }
            ChatCommand::React(n, reaction) => {
                let Some(id) = message_id_at(&assistant, n) else {
                    println!("{}", format!("No message {}", n).yellow());
                    continue;
                };
                match assistant.react(&id, reaction) {
                    Ok(Some(_)) => println!("{}", format!("Reaction set on message {}", n).green()),
                    Ok(None) => println!("{}", format!("Reaction cleared on message {}", n).dimmed()),
                    Err(reason) => report_rejection(&reason),
                }
            }
            ChatCommand::Copy(n) => {
                let Some(id) = message_id_at(&assistant, n) else {
                    println!("{}", format!("No message {}", n).yellow());
                    continue;
                };
                match assistant.copy(&id) {
                    Ok(text) => {
                        println!("{}", format!("📋 Copied message {}:", n).green());
                        println!("{}", text);
                    }
                    Err(reason) => report_rejection(&reason),
                }
            }
            ChatCommand::History => print_history(&assistant).await,
            ChatCommand::Load(id) => {
                if assistant.load_from_history(&id).await {
                    println!("{}", "📂 Conversation restored".cyan());
                    print_transcript(&assistant);
                } else {
                    println!("{}", format!("No archived conversation {}", id).yellow());
                }
            }
            ChatCommand::ClearHistory => {
                if assistant.clear_history().await {
                    println!("{}", "🗑  History cleared".green());
                } else {
                    println!("{}", "Could not clear history".red());
                }
            }
            ChatCommand::Help => println!("{}", HELP),
            ChatCommand::Quit => {
                assistant.close();
                break;
            }
            ChatCommand::Invalid(line) => {
                println!("{}", format!("Unknown command: {} (try /help)", line).yellow());
            }
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_said() {
        assert_eq!(
            parse_command("  What tech do you use?  "),
            Some(ChatCommand::Say("What tech do you use?".to_string()))
        );
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse_command("/new"), Some(ChatCommand::New));
        assert_eq!(parse_command("/END"), Some(ChatCommand::End));
        assert_eq!(parse_command("/retry"), Some(ChatCommand::Retry(None)));
        assert_eq!(parse_command("/retry 4"), Some(ChatCommand::Retry(Some(4))));
        assert_eq!(
            parse_command("/like 2"),
            Some(ChatCommand::React(2, Reaction::Like))
        );
        assert_eq!(
            parse_command("/dislike 2"),
            Some(ChatCommand::React(2, Reaction::Dislike))
        );
        assert_eq!(parse_command("/copy 3"), Some(ChatCommand::Copy(3)));
        assert_eq!(
            parse_command("/load abc-123"),
            Some(ChatCommand::Load("abc-123".to_string()))
        );
        assert_eq!(parse_command("/clear-history"), Some(ChatCommand::ClearHistory));
        assert_eq!(parse_command("/quick 1"), Some(ChatCommand::Quick(Some(1))));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn test_bad_arguments() {
        for line in ["/like", "/like zero", "/copy 0", "/retry x", "/load", "/bogus"] {
            assert!(
                matches!(parse_command(line), Some(ChatCommand::Invalid(_))),
                "{} should be invalid",
                line
            );
        }
    }
}
