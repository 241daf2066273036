//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

use crate::domain::LookupKind;

/// Shoe shop inventory and order management
#[derive(Parser, Debug)]
#[command(name = "shop-backend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage user accounts
    User(UserArgs),

    /// Manage categories, manufacturers, suppliers and delivery points
    Lookup(LookupArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the user command
#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create an account with its shop profile
    Create {
        #[arg(long)]
        username: String,

        #[arg(long, env = "SHOP_USER_PASSWORD")]
        password: String,

        /// admin, manager, client or guest
        #[arg(long, default_value = "client")]
        role: String,

        #[arg(long)]
        full_name: String,
    },
}

/// Arguments for the lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    #[command(subcommand)]
    pub action: LookupAction,
}

#[derive(Subcommand, Debug)]
pub enum LookupAction {
    /// Add a row; for delivery points the name is the address
    Add {
        #[arg(value_enum)]
        kind: LookupKind,
        name: String,
    },
    /// List rows of one table
    List {
        #[arg(value_enum)]
        kind: LookupKind,
    },
    /// Remove a row by id
    Remove {
        #[arg(value_enum)]
        kind: LookupKind,
        id: i32,
    },
}
