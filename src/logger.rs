use crate::utils::find_char_boundary;
use anyhow::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Timestamped per-session log file. The web front end sent its failures
/// to `console.error`; those land here instead.
pub struct Logger {
    log_file: PathBuf,
}

#[derive(Debug, Default)]
pub struct SessionMetrics {
    pub messages_sent: usize,
    pub bot_replies: usize,
    pub send_errors: usize,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_rate(&self) -> f64 {
        if self.messages_sent == 0 {
            return 0.0;
        }
        (self.bot_replies as f64 / self.messages_sent as f64) * 100.0
    }

    pub fn display(&self) {
        use colored::Colorize;
        println!("\n{}", "━━━━━━━━━ Session Statistics ━━━━━━━━━".bright_cyan().bold());
        println!("Messages sent: {}", self.messages_sent);
        println!("Bot replies: {}", self.bot_replies.to_string().green());
        println!("Send errors: {}", self.send_errors.to_string().red());
        println!("Reply rate: {:.1}%", self.reply_rate());
        println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan());
    }
}

impl Logger {
    pub fn new(log_dir: &str) -> Result<Self> {
        let dir = PathBuf::from(log_dir);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_file = dir.join(format!("session_{}.log", timestamp));

        Ok(Self { log_file })
    }

    pub fn log(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }

    pub fn log_message_sent(&self, message: &str) -> Result<()> {
        self.log(&format!("SENT: {}", message))
    }

    pub fn log_reply(&self, reply: &str) -> Result<()> {
        let preview = if reply.len() > 200 {
            format!("{}...", &reply[..find_char_boundary(reply, 200)])
        } else {
            reply.to_string()
        };
        self.log(&format!("REPLY: {}", preview))
    }

    pub fn log_menu_loaded(&self) -> Result<()> {
        self.log("MENU: loaded")
    }

    pub fn log_error(&self, error: &str) -> Result<()> {
        self.log(&format!("ERROR: {}", error))
    }
}
