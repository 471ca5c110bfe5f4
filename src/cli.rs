use clap::{Parser, Subcommand};

use crate::domain::matching::MatchPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "listflex-sync",
    version,
    about = "Sync Listflex integration list ids from the Google Sheets master list."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Point every active integration of a tenant at its sheet list id.
    Update {
        /// Tenant name from the configuration file.
        tenant: String,

        /// Worksheet to read instead of the configured one.
        #[arg(long)]
        worksheet: Option<String>,

        /// Overrides the tenant's match policy.
        #[arg(long, value_parser = parse_match_policy)]
        match_policy: Option<MatchPolicy>,

        /// Log the patched values without writing or saving anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the active integrations of a worksheet. No browser is started.
    List {
        #[arg(long)]
        tenant: Option<String>,

        #[arg(long, required_unless_present = "tenant")]
        worksheet: Option<String>,
    },
    /// List the configured tenants.
    Tenants,
}

fn parse_match_policy(value: &str) -> Result<MatchPolicy, String> {
    value
        .parse()
        .map_err(|_| format!("expected 'first' or 'all', got '{value}'"))
}
