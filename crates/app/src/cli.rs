//! Command line definition.

use std::path::PathBuf;

use agenda_domain::Resource;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agenda")]
#[command(author, version, about = "Agenda API client", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./agenda.toml when present)
    #[arg(long, global = true, env = "AGENDA_CONFIG")]
    pub config: Option<PathBuf>,

    /// API base URL (overrides configuration)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        /// Account e-mail
        email: String,

        /// Account password
        #[arg(long, env = "AGENDA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and a business
    Register {
        /// Owner name
        #[arg(long)]
        name: String,

        /// Account e-mail
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "AGENDA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Business name
        #[arg(long)]
        business: String,

        /// Contact phone
        #[arg(long)]
        phone: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user and business
    Me,

    /// List a resource
    List {
        /// clients, appointments, packages, transactions or schedules
        resource: Resource,

        /// Query filter as key=value, repeatable
        #[arg(long = "filter", value_parser = parse_pair)]
        filters: Vec<(String, String)>,
    },

    /// Show one item of a resource
    Show {
        /// clients, appointments, packages, transactions or schedules
        resource: Resource,

        /// Item id
        id: String,
    },

    /// Create an item from a JSON payload
    Create {
        /// clients, appointments, packages, transactions or schedules
        resource: Resource,

        /// JSON payload
        payload: String,
    },

    /// Delete an item
    Delete {
        /// clients, appointments, packages, transactions or schedules
        resource: Resource,

        /// Item id
        id: String,
    },

    /// Show free slots for a day
    Slots {
        /// Day as YYYY-MM-DD
        date: NaiveDate,

        /// Restrict to one professional
        #[arg(long)]
        professional: Option<String>,

        /// Service being booked
        #[arg(long)]
        service: Option<String>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "agenda",
            "list",
            "appointments",
            "--filter",
            "status=confirmed",
        ])
        .unwrap();

        match cli.command {
            Command::List { resource, filters } => {
                assert_eq!(resource, Resource::Appointments);
                assert_eq!(filters, vec![("status".to_string(), "confirmed".to_string())]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_rejects_bad_filter() {
        assert!(parse_pair("no-equals").is_err());
        assert!(parse_pair("=value").is_err());
    }
}
