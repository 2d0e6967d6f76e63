//! riskdesk Server
//!
//! The `riskdesk` service around the orchestrator: YAML configuration, the
//! command line, the HTTP surface, and the evaluation suite.

pub mod cli;
pub mod config;
pub mod evals;
pub mod routes;
pub mod state;

pub use cli::{Cli, Commands};
pub use config::ServiceConfig;
pub use routes::create_router;
pub use state::{build_orchestrator, describe_metrics, AppState};
