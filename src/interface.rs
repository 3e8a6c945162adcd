use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiClient, Menu};
use crate::cart::{CartBoard, CartPoller, CartView};
use crate::config::AppConfig;
use crate::logger::{Logger, SessionMetrics};
use crate::transcript::{Sender, Transcript};
use crate::utils::{find_char_boundary, format_age, render_fragment};
use chrono::Local;
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{Config, CompletionType, Context, Editor, Helper, Highlighter, Validator};

/// Available slash commands for tab-completion.
const COMMANDS: &[&str] = &[
    "/help", "/quit", "/exit", "/menu", "/cart", "/history", "/clear", "/stats",
];

/// Rustyline helper providing slash-command tab-completion and inline hints.
#[derive(Helper, Validator, Highlighter)]
struct CommandCompleter;

impl Hinter for CommandCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        // Only hint when cursor is at end and line starts with '/'
        if pos != line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }

        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && **cmd != line)
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        if !prefix.starts_with('/') || prefix.contains(' ') {
            return Ok((0, vec![]));
        }

        let matches: Vec<Pair> = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

/// What a submitted line should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Submission<'a> {
    /// Whitespace-only input: no transcript entry, no request.
    Empty,
    /// A local slash command, trimmed.
    Command(&'a str),
    /// A chat message for the bot, trimmed.
    Message(&'a str),
}

/// Classify a submitted line. Button click and Enter land here the same
/// way, so both send paths share this guard.
pub fn classify_submission(line: &str) -> Submission<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Submission::Empty
    } else if trimmed.starts_with('/') {
        Submission::Command(trimmed)
    } else {
        Submission::Message(trimmed)
    }
}

pub fn print_banner() {
    println!("{}", "====================================".bright_cyan());
    println!("{}", "          PIZZABOT  v0.1.0          ".bright_cyan().bold());
    println!("{}", "====================================".bright_cyan());
    println!("{}", " Your friendly pizza-ordering assistant 🍕".bright_white());
    println!("{}\n", " Type /help for commands or /quit to exit".dimmed());
}

/// Start a spinner animation in a background thread. This is the terminal
/// equivalent of the "bot is typing" placeholder.
/// Returns an `Arc<AtomicBool>` — set it to `false` to stop the spinner.
fn start_spinner(message: &str) -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    let msg = message.to_string();

    std::thread::spawn(move || {
        let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let mut i = 0;
        while running_clone.load(Ordering::Relaxed) {
            print!("\r{} {} ", frames[i % frames.len()].to_string().cyan(), msg.dimmed());
            let _ = io::stdout().flush();
            std::thread::sleep(std::time::Duration::from_millis(80));
            i += 1;
        }
        // Clear the spinner line
        print!("\r{}\r", " ".repeat(msg.len() + 4));
        let _ = io::stdout().flush();
    });

    running
}

/// Stop a running spinner.
fn stop_spinner(handle: &Arc<AtomicBool>) {
    handle.store(false, Ordering::Relaxed);
    // Give the spinner thread time to clear the line
    std::thread::sleep(std::time::Duration::from_millis(100));
}

/// Render the two labeled menu sections from the returned fragments.
fn display_menu(menu: &Menu) {
    println!("\n{}", "━━━━━━━━━━━━━━ Menu ━━━━━━━━━━━━━━".bright_green().bold());
    println!("{}", "🍕 Pizzas".bright_yellow().bold());
    println!("{}", render_fragment(&menu.pizzas));
    println!("\n{}", "🧀 Customizations".bright_yellow().bold());
    println!("{}", render_fragment(&menu.customizations));
    println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_green());
}

/// Print the latest cart snapshot. Values may be stale if recent
/// refreshes failed; the age line makes that visible.
fn display_cart(view: &CartView) {
    match (&view.summary, &view.fetched_at) {
        (Some(summary), Some(at)) => {
            println!("\n{}", "━━━━━━━━━━━ Your Cart ━━━━━━━━━━━".bright_green().bold());
            println!("{}", render_fragment(&summary.items));
            println!("{}", render_fragment(&summary.total).bright_white().bold());
            let age = Local::now().signed_duration_since(*at).num_seconds();
            println!("{}", format!("(updated {})", format_age(age)).dimmed());
            println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_green());
        }
        _ => println!("{}", "Cart not loaded yet (no successful poll so far).".yellow()),
    }
}

fn display_user_entry(text: &str) {
    println!("{} {}", "👤 You:".bright_blue().bold(), text);
}

fn display_bot_entry(text: &str) {
    println!("{} {}", "🤖 Bot:".bright_green().bold(), text);
}

fn display_error_entry(text: &str) {
    println!("{} {}", "❌ Bot:".red().bold(), text.red());
}

fn display_history(transcript: &Transcript) {
    if transcript.is_empty() {
        println!("{}", "No conversation history yet.".yellow());
        return;
    }
    println!("\n{}", "Conversation History:".bright_cyan().bold());
    for (i, entry) in transcript.iter().enumerate() {
        let label = match (entry.sender, entry.error) {
            (Sender::User, _) => "you".bright_blue(),
            (Sender::Bot, false) => "bot".bright_green(),
            (Sender::Bot, true) => "bot (error)".red(),
        };
        println!("\n{}. [{}] {}", i + 1, label, entry.at.format("%H:%M:%S").to_string().dimmed());
        let preview = if entry.text.len() > 100 {
            let end = find_char_boundary(&entry.text, 100);
            format!("{}...", &entry.text[..end])
        } else {
            entry.text.clone()
        };
        println!("{}", preview.dimmed());
    }
    println!();
}

fn print_help() {
    println!("\n{}", "Available Commands:".bright_cyan().bold());
    println!("  {}  - Exit the program", "/quit, /exit".green());
    println!("  {}         - Show this help", "/help".green());
    println!("  {}         - Show the pizza menu", "/menu".green());
    println!("  {}         - Show your current cart", "/cart".green());
    println!("  {}      - Show conversation history", "/history".green());
    println!("  {}        - Clear conversation history", "/clear".green());
    println!("  {}        - Show session statistics", "/stats".green());
    println!("\n{}\n", "Anything else you type is sent to the pizza bot.".dimmed());
}

// Interactive chat entry point
pub async fn start_repl(config: &AppConfig) {
    print_banner();

    let client = match ApiClient::new(config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            println!("{} {}", "✗ Invalid backend configuration:".red().bold(), e);
            return;
        }
    };
    println!(
        "{} {} → {}",
        "✓ Backend:".green(),
        client.base_url().bright_white(),
        client.endpoint().path().dimmed()
    );

    let logger = Arc::new(Logger::new(&config.log_dir).expect("Failed to create log directory"));
    let mut metrics = SessionMetrics::new();

    // Load the menu once on startup; on failure the error goes to the
    // session log and the display stays as it was.
    match client.fetch_menu().await {
        Ok(menu) => {
            display_menu(&menu);
            let _ = logger.log_menu_loaded();
        }
        Err(e) => {
            let _ = logger.log_error(&format!("Menu load failed: {:#}", e));
        }
    }

    // Background cart refresh, stopped when the REPL exits.
    let board = Arc::new(CartBoard::new());
    let poller = CartPoller::spawn(
        client.clone(),
        board.clone(),
        logger.clone(),
        Duration::from_secs(config.cart_poll_secs),
    );

    // Set up rustyline editor with tab-completion. A submitted line and a
    // pressed Enter are the same event here, so both send paths match.
    let rl_config = Config::builder()
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(100)
        .build();
    let mut rl = Editor::with_config(rl_config).expect("Failed to create line editor");
    rl.set_helper(Some(CommandCompleter));

    let mut transcript = Transcript::new();

    loop {
        let readline = rl.readline(&"> ".bright_cyan().bold().to_string());
        let line = match readline {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                println!("{} {}", "✗ Input error:".red(), e);
                continue;
            }
        };

        let line = match classify_submission(&line) {
            // Whitespace-only submission: no entry, no request.
            Submission::Empty => continue,
            Submission::Command("/quit" | "/exit") => {
                println!("Goodbye!");
                break;
            }
            Submission::Command("/help") => {
                print_help();
                continue;
            }
            Submission::Command("/menu") => {
                match client.fetch_menu().await {
                    Ok(menu) => {
                        display_menu(&menu);
                        let _ = logger.log_menu_loaded();
                    }
                    Err(e) => {
                        let _ = logger.log_error(&format!("Menu load failed: {:#}", e));
                        println!("{}", "Menu is unavailable right now.".yellow());
                    }
                }
                continue;
            }
            Submission::Command("/cart") => {
                display_cart(&board.snapshot());
                continue;
            }
            Submission::Command("/history") => {
                display_history(&transcript);
                continue;
            }
            Submission::Command("/clear") => {
                transcript.clear();
                println!("{}", "✓ Conversation history cleared.".green());
                continue;
            }
            Submission::Command("/stats") => {
                metrics.display();
                let view = board.snapshot();
                println!(
                    "Cart refreshes: {} ok, {} failed",
                    view.refreshes.to_string().green(),
                    view.failures.to_string().red()
                );
                continue;
            }
            Submission::Command(other) => {
                println!("{} {}", "Unknown command:".yellow(), other);
                println!("{}", "Type /help for the command list.".dimmed());
                continue;
            }
            Submission::Message(msg) => msg.to_string(),
        };

        // Chat message: append the user entry before the network call.
        transcript.push_user(&line);
        display_user_entry(&line);
        metrics.messages_sent += 1;
        let _ = logger.log_message_sent(&line);

        let spinner = if config.typing_indicator {
            Some(start_spinner("Bot is typing..."))
        } else {
            None
        };
        let result = client.send_message(&line).await;
        if let Some(ref spinner) = spinner {
            stop_spinner(spinner);
        }

        match result {
            Ok(reply) => {
                transcript.push_bot(&reply.response);
                transcript.trim(config.max_transcript_entries);
                display_bot_entry(&reply.response);
                metrics.bot_replies += 1;
                let _ = logger.log_reply(&reply.response);
            }
            Err(e) => {
                // Exactly one error entry per failed send. The line stays
                // in rustyline history for up-arrow recall.
                metrics.send_errors += 1;
                let _ = logger.log_error(&format!("Send failed: {:#}", e));
                transcript.push_error();
                transcript.trim(config.max_transcript_entries);
                display_error_entry(crate::transcript::SEND_FAILED_TEXT);
            }
        }
    }

    poller.stop();

    println!("\n{}", "Session ended.".bright_cyan());
    metrics.display();
    let view = board.snapshot();
    println!(
        "Cart refreshes: {} ok, {} failed",
        view.refreshes.to_string().green(),
        view.failures.to_string().red()
    );
}
