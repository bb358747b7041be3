use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "diario")]
#[command(about = "Keep a daily journal entry and checklist from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name for Supabase configuration and session
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Day to work on: YYYY-MM-DD, today, yesterday or tomorrow
    #[arg(long, global = true, value_name = "DATE")]
    pub date: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the journal entry and tasks for the day
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the journal entry for the day
    #[command(alias = "edit")]
    Write {
        /// Entry text (stdin or $EDITOR when omitted)
        text: Vec<String>,
        /// Save an empty entry
        #[arg(long, conflicts_with = "text")]
        clear: bool,
    },
    /// Manage the day's tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Authenticate CLI profile with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    #[command(alias = "new")]
    Add {
        /// Task title
        title: Vec<String>,
    },
    /// Flip a task between done and open
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with Supabase email/password and store session in keychain
    Login {
        /// Supabase account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Supabase account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create a Supabase account
    Register {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Display name used in greetings
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },
    /// Show auth status for profile
    Status,
    /// Logout profile and clear stored session
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
