//! Command-line interface for Cinelist.

mod commands;

use clap::{Parser, Subcommand};

/// Cinelist - movie watchlist server
#[derive(Parser)]
#[command(name = "cinelist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create an administrator account
    CreateAdmin {
        /// Login name
        username: String,
        /// Plain-text password, hashed before storage
        password: String,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
    },

    /// Validate the effective configuration and exit
    #[command(alias = "check")]
    CheckConfig,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["cinelist"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_create_admin_args() {
        let cli = Cli::try_parse_from([
            "cinelist",
            "create-admin",
            "root",
            "s3cret",
            "--email",
            "root@example.com",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::CreateAdmin {
                username,
                password,
                email,
            }) => {
                assert_eq!(username, "root");
                assert_eq!(password, "s3cret");
                assert_eq!(email.as_deref(), Some("root@example.com"));
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn test_create_admin_requires_password() {
        assert!(Cli::try_parse_from(["cinelist", "create-admin", "root"]).is_err());
    }
}
