use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use runtime::{AppConfig, CliArgs};

use card_portal::contract::model::{CardStatus, ExpiryMonth, Role};

mod commands;
mod render;

/// cardctl - terminal client for the card management portal
#[derive(Parser)]
#[command(name = "cardctl")]
#[command(about = "cardctl - terminal client for the card management portal")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Answer "yes" to delete confirmations
    #[arg(short, long)]
    yes: bool,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration
    Check,
    #[command(flatten)]
    Portal(PortalCommand),
}

/// Commands that need the API and the stored session.
#[derive(Subcommand)]
enum PortalCommand {
    /// Sign in and remember the session
    Login(CredentialArgs),
    /// Create an account and sign in
    Register(CredentialArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in account and reachable screens
    Whoami,
    /// Your cards
    Cards {
        #[command(subcommand)]
        command: CardsCommand,
    },
    /// Your block requests
    Blocks {
        #[command(subcommand)]
        command: BlocksCommand,
    },
    /// Move money between two of your cards
    Transfer(TransferArgs),
    /// Administration (ADMIN role only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Args)]
struct PageArgs {
    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Page size (defaults to client.page_size)
    #[arg(long)]
    size: Option<u32>,
}

#[derive(Args)]
struct FilterArgs {
    /// Last four digits of the card number
    #[arg(long = "last4")]
    last_four_digits: Option<String>,
    /// ACTIVE, BLOCKED, EXPIRED or ALL
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    min_balance: Option<Decimal>,
    #[arg(long)]
    max_balance: Option<Decimal>,
}

#[derive(Subcommand)]
enum CardsCommand {
    /// List your cards
    List {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Ask an administrator to block a card
    Block { card_id: i64 },
}

#[derive(Subcommand)]
enum BlocksCommand {
    /// List your block requests
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Cancel a pending block request
    Cancel { id: i64 },
}

#[derive(Args)]
struct TransferArgs {
    #[arg(long)]
    from: i64,
    #[arg(long)]
    to: i64,
    #[arg(long)]
    amount: Decimal,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Manage accounts
    Users {
        #[command(subcommand)]
        command: AdminUsersCommand,
    },
    /// Manage all cards
    Cards {
        #[command(subcommand)]
        command: AdminCardsCommand,
    },
    /// Decide on block requests
    Blocks {
        #[command(subcommand)]
        command: AdminBlocksCommand,
    },
}

#[derive(Subcommand)]
enum AdminUsersCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "USER")]
        role: Role,
    },
    /// Change a user's role
    Role { id: i64, role: Role },
    /// Toggle the account lock
    Lock { id: i64 },
    /// Toggle whether the account is enabled
    Enable { id: i64 },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AdminCardsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    Create {
        /// Owner's user id
        #[arg(long)]
        user: i64,
        /// YYYY-MM
        #[arg(long)]
        expiry: ExpiryMonth,
        #[arg(long, default_value = "ACTIVE")]
        status: CardStatus,
        #[arg(long)]
        balance: Decimal,
    },
    Status { id: i64, status: CardStatus },
    Expiry { id: i64, expiry: ExpiryMonth },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AdminBlocksCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Approve {
        id: i64,
        #[arg(long)]
        comment: String,
    },
    Reject {
        id: i64,
        #[arg(long)]
        comment: String,
    },
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        api_url: cli.api_url.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, config.home_dir());
    tracing::info!(api = %config.client.api_base_url, "cardctl starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command.unwrap_or(Commands::Portal(PortalCommand::Whoami)) {
        Commands::Check => commands::check_config(&config),
        Commands::Portal(command) => commands::run(config, command, cli.yes).await,
    }
}
