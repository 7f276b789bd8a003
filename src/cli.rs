use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "sweep-inbox",
    about = "Terminal inbox for the cleaning marketplace chat backend"
)]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the TUI inbox
    Run {
        /// Thread to select once the list has loaded
        #[arg(long, value_name = "THREAD_ID")]
        open: Option<String>,
    },
    /// Print the signed-in user's threads and exit
    Threads,
    /// Start a conversation with another user
    CreateThread {
        /// User id of the other participant
        #[arg(long = "with", value_name = "USER_ID")]
        participant: String,
        /// Booking/task the conversation is about
        #[arg(long, value_name = "TASK_ID")]
        task: Option<String>,
        /// Launch the TUI focused on the new thread
        #[arg(long)]
        open: bool,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Run { open: None })
    }
}
