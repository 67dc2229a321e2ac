//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "market-admin")]
#[command(about = "Marketplace admin console from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Also write logs to a daily file in this directory
    #[arg(long, env = "MARKET_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Backend connection settings
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Base URL of the primary API
    #[arg(long, env = "MARKET_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Base URL of the legacy API (defaults to the primary URL)
    #[arg(long, env = "MARKET_LEGACY_API_URL", global = true)]
    pub legacy_api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "MARKET_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Where the session token is kept
    #[arg(long, env = "MARKET_TOKEN_FILE", default_value = "./.market/session.json", global = true)]
    pub token_file: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long, env = "MARKET_EMAIL")]
        email: String,
        #[arg(long, env = "MARKET_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who the stored session belongs to
    Whoami,

    /// Print one page of a list as JSON lines
    List(ListArgs),

    /// Show one row of a list page in full
    Show {
        #[command(flatten)]
        list: ListArgs,

        /// Row id
        #[arg(long)]
        id: i64,
    },

    /// Export one page of a list as CSV
    Export {
        #[command(flatten)]
        list: ListArgs,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Submit a create form
    Create {
        resource: ResourceKind,

        /// Form field, repeatable
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,

        /// Order line item, repeatable (orders only)
        #[arg(long = "item", value_name = "VOUCHER:QTY:PRICE")]
        items: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    pub resource: ResourceKind,

    /// Free-text search
    #[arg(long, short = 'q')]
    pub filter: Option<String>,

    /// Status filter, e.g. active/suspended or an order status
    #[arg(long)]
    pub status: Option<String>,

    /// Sort field
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Rows per page: 10, 20 or 50
    #[arg(long, default_value_t = 10)]
    pub page_size: u64,

    /// Resource-specific filter such as vendorId=3, repeatable
    #[arg(long = "where", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub extra: Vec<(String, String)>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Affiliate,
    Member,
    Vendor,
    Voucher,
    Inventory,
    Order,
    Redeem,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
