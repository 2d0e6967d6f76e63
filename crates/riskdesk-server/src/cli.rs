use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "riskdesk")]
#[command(author, version, about = "Risk classification for banking support requests")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "riskdesk.yaml")]
    pub config: String,

    /// API key for the generative backend; without one the service runs deterministic
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Ignore any configured backend and classify with the lexicon only
    #[arg(long, global = true)]
    pub deterministic: bool,

    /// Signal lexicon file overriding the built-in table
    #[arg(long, global = true)]
    pub lexicon: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "RISKDESK_LOG_JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Listen address
        #[arg(short = 'l', long)]
        listen: Option<String>,

        /// Listen port
        #[arg(short = 'P', long)]
        port: Option<u16>,
    },

    /// Classify a single question and print the decision
    Classify {
        /// Customer question
        question: String,

        /// Customer name used in the advice
        #[arg(short = 'n', long, default_value = "John")]
        name: String,

        /// Customer id for the context lookup
        #[arg(long, default_value_t = 123)]
        customer_id: u64,

        /// Quote balances without pending transactions
        #[arg(long)]
        exclude_pending: bool,

        /// Print the decision bundle as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the evaluation scenarios and report the pass rate
    Eval {
        /// YAML scenario file (defaults to the built-in suite)
        #[arg(short, long)]
        scenarios: Option<PathBuf>,

        /// Exit non-zero below this pass rate (0.0 - 1.0)
        #[arg(long, default_value_t = 1.0, value_parser = parse_rate)]
        min_pass_rate: f64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("pass rate must be between 0.0 and 1.0, got {}", rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "riskdesk",
            "classify",
            "I lost my card",
            "--name",
            "Ana",
            "--deterministic",
            "--config",
            "other.yaml",
        ]);

        assert!(cli.deterministic);
        assert_eq!(cli.config, "other.yaml");
        match cli.command {
            Commands::Classify {
                question,
                name,
                customer_id,
                exclude_pending,
                ..
            } => {
                assert_eq!(question, "I lost my card");
                assert_eq!(name, "Ana");
                assert_eq!(customer_id, 123);
                assert!(!exclude_pending);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_pass_rate_bounds() {
        assert!(Cli::try_parse_from(["riskdesk", "eval", "--min-pass-rate", "0.8"]).is_ok());
        assert!(Cli::try_parse_from(["riskdesk", "eval", "--min-pass-rate", "1.5"]).is_err());
    }
}
