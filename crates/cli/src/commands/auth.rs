//! Login and signup commands.

use secrecy::SecretString;
use shopper_core::{Credentials, Email};

use super::{CliError, Shell};

/// Sign in with the given email and password.
pub async fn login(shell: &Shell, email: &str, password: String) -> Result<(), CliError> {
    let credentials = credentials(email, password)?;
    shell.ctx.auth().login(&credentials).await;
    Ok(())
}

/// Create an account and sign in.
pub async fn signup(shell: &Shell, email: &str, password: String) -> Result<(), CliError> {
    let credentials = credentials(email, password)?;
    shell.ctx.auth().signup(&credentials).await;
    Ok(())
}

fn credentials(email: &str, password: String) -> Result<Credentials, CliError> {
    Ok(Credentials::new(Email::parse(email)?, SecretString::from(password)))
}
