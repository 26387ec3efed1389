use clap::{Parser, Subcommand};

/// Chirpy: short-message backend
#[derive(Parser)]
#[command(name = "chirpy", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Keep everything in process memory instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Revoke a refresh token
    Revoke {
        #[arg(long)]
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve_defaults() {
        let cli = Cli::try_parse_from(["chirpy"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from(["chirpy", "serve", "--port", "9000", "--memory"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port, memory }) => {
                assert_eq!(port, Some(9000));
                assert!(memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_revoke_requires_token() {
        assert!(Cli::try_parse_from(["chirpy", "revoke"]).is_err());
        let cli = Cli::try_parse_from(["chirpy", "revoke", "--token", "abc"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Revoke { token }) if token == "abc"));
    }
}
