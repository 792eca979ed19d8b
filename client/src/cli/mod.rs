use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use client::vehicle::SectionId;
use shared::types::Role;

pub mod commands;
pub mod render;

#[derive(Parser)]
#[command(version, about = "Look up vehicle registration records", long_about = None)]
#[command(propagate_version = true)]
#[command(name = "rcview")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session token (as printed by `rcview login`)
    #[arg(long, global = true, env = "RCVIEW_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Obtain a session token
    #[command(subcommand)]
    Login(LoginCommand),
    /// Show the signed-in user
    Whoami,
    /// Look up a registration number
    Search(SearchArgs),
    /// Reveal the full form of a masked registration number (audited)
    Unmask(UnmaskArgs),
    /// Show remaining searches for today
    RateLimit,
    /// Manage recently searched numbers
    Recent {
        #[command(subcommand)]
        command: Option<RecentCommand>,
    },
    /// Administration
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
pub enum LoginCommand {
    /// Development login (only on backends running in dev mode)
    Dev,
    /// Print the Google sign-in URL
    Url,
    /// Take the token out of the URL the sign-in flow redirected to
    Capture { url: String },
}

#[derive(Args)]
pub struct SearchArgs {
    pub registration_number: String,
    /// Only show fields whose name or value contains this text
    #[arg(long)]
    pub filter: Option<String>,
    /// Only show one section (owner, rc, vehicle, insurance, puc, loan, permit, other)
    #[arg(long)]
    pub section: Option<SectionId>,
}

#[derive(Args)]
pub struct UnmaskArgs {
    pub registration_number: String,
    /// Acknowledge that the reveal is recorded in the audit log
    #[arg(long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum RecentCommand {
    List,
    Remove { registration_number: String },
    Clear,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// List users
    Users {
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a user, or re-enable an existing email
    AddUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "USER")]
        role: Role,
        /// Disable Google sign-in for this user
        #[arg(long)]
        no_sso: bool,
    },
    RemoveUser { id: String },
    SetRole { id: String, role: Role },
    /// Show or change rate-limit and cache settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Search totals and top searchers
    Stats,
    /// Search audit log
    Logs {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,
    Set {
        #[arg(long)]
        cache_ttl_days: Option<u32>,
        #[arg(long)]
        rate_limit_per_second: Option<u32>,
        #[arg(long)]
        rate_limit_per_day: Option<u32>,
    },
}
