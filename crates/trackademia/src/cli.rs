//! Clap derive structures for the `trackademia` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// trackademia -- keep track of books, lectures, and what you learned
#[derive(Debug, Parser)]
#[command(
    name = "trackademia",
    version,
    about = "Track books, lectures, and topics from the command line",
    long_about = "Record the books you study from and a dated log of lectures,\n\
        each with the topics covered and how difficult they felt.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "TRACKADEMIA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Project id (overrides profile)
    #[arg(long, env = "TRACKADEMIA_PROJECT", global = true)]
    pub project: Option<String>,

    /// Web API key of the project
    #[arg(long, env = "TRACKADEMIA_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Account email (overrides profile)
    #[arg(long, short = 'e', global = true)]
    pub email: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TRACKADEMIA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TRACKADEMIA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new account
    Signup(SignupArgs),

    /// Show or complete your profile
    #[command(alias = "me")]
    Account(AccountArgs),

    /// Manage books and course materials
    #[command(alias = "b")]
    Books(BooksArgs),

    /// Log and review lectures
    #[command(alias = "lec", alias = "l")]
    Lectures(LecturesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Name shown on your profile (the email comes from --email or the profile)
    #[arg(long)]
    pub display_name: Option<String>,
}

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Show your profile
    Show,

    /// Declare your degree program (required before tracking)
    SetupDegree {
        /// Degree program, e.g. "BSc Mathematics"
        degree: String,
    },

    /// Change profile fields
    Edit {
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        degree: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BOOKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub command: BooksCommand,
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// List your books, newest first
    #[command(alias = "ls")]
    List,

    /// Show one book
    #[command(alias = "get")]
    Show {
        /// Book id
        book: String,
    },

    /// Register a book
    Add {
        #[arg(long, short = 't')]
        title: String,

        #[arg(long, short = 'a')]
        author: String,

        /// Public URL of a cover image
        #[arg(long)]
        cover_url: Option<String>,
    },

    /// Change a book's fields
    Edit {
        /// Book id
        book: String,

        #[arg(long, short = 't')]
        title: Option<String>,

        #[arg(long, short = 'a')]
        author: Option<String>,

        /// New cover URL; an empty value removes the cover
        #[arg(long)]
        cover_url: Option<String>,
    },

    /// Delete a book (its lectures are kept)
    #[command(alias = "rm")]
    Delete {
        /// Book id
        book: String,
    },

    /// Upload a cover image and attach it to a book
    Cover {
        /// Book id
        book: String,

        /// Image file (jpeg, png, gif or webp)
        image: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LECTURES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LecturesArgs {
    #[command(subcommand)]
    pub command: LecturesCommand,
}

#[derive(Debug, Subcommand)]
pub enum LecturesCommand {
    /// List a book's lectures, newest day first
    #[command(alias = "ls")]
    List {
        /// Book id
        book: String,
    },

    /// Show the lecture to study today (today's, else the latest)
    Today {
        /// Book id
        book: String,
    },

    /// Show one lecture with its topics
    #[command(alias = "get")]
    Show {
        /// Lecture id
        lecture: String,
    },

    /// Log a lecture
    Add {
        /// Book id
        book: String,

        /// Calendar day (YYYY-MM-DD), defaults to today
        #[arg(long, short = 'd')]
        date: Option<String>,

        /// Topic as "name::explanation[::easy|moderate|difficult]" (repeatable)
        #[arg(long = "topic", short = 't', required = true)]
        topics: Vec<String>,
    },

    /// Change a lecture's day or replace its topics
    Edit {
        /// Lecture id
        lecture: String,

        #[arg(long, short = 'd')]
        date: Option<String>,

        /// Replacement topics (repeatable)
        #[arg(long = "topic", short = 't')]
        topics: Vec<String>,
    },

    /// Delete a lecture
    #[command(alias = "rm")]
    Delete {
        /// Lecture id
        lecture: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets redacted)
    Show,

    /// Store the account password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long = "for")]
        target: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
