//! Command plumbing shared by the subcommands.

pub mod auth;

use std::sync::Arc;

use shopper_client::{
    ClientConfig, Context, ErrorLog, HttpTransport, TransportError,
};
use shopper_core::{Attributes, EmailError};
use thiserror::Error;

/// Errors that stop a command before or after the client runs.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not build HTTP client: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Attributes must be a JSON object: {0}")]
    InvalidAttributes(serde_json::Error),

    #[error("Could not render state: {0}")]
    Output(serde_json::Error),
}

/// A client context plus the error log the CLI reads back at exit.
pub struct Shell {
    pub ctx: Context<HttpTransport>,
    errors: ErrorLog,
}

impl Shell {
    /// Connect to the configured backend.
    pub fn connect(config: &ClientConfig) -> Result<Self, CliError> {
        let errors = ErrorLog::new();
        let ctx = Context::connect(config)?.with_errors(Arc::new(errors.clone()));
        Ok(Self { ctx, errors })
    }

    /// Print the final state as JSON on stdout and every reported error on
    /// stderr. Returns `false` if anything was reported.
    #[allow(clippy::print_stdout, clippy::print_stderr)]
    pub fn finish(&self) -> Result<bool, CliError> {
        let state = self.ctx.store().snapshot();
        let rendered = serde_json::to_string_pretty(&state).map_err(CliError::Output)?;
        println!("{rendered}");

        let reported = self.errors.take();
        for message in &reported {
            eprintln!("error: {message}");
        }
        Ok(reported.is_empty())
    }
}

/// Parse a JSON object given on the command line.
pub fn parse_attributes(raw: &str) -> Result<Attributes, CliError> {
    serde_json::from_str(raw).map_err(CliError::InvalidAttributes)
}
