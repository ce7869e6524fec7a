//! Sign-in command handlers

use anyhow::{Context, Result};

use technova_core::{Credentials, JsonPersistence, MockAuthenticator, Portal};

use crate::editor::value_or_prompt;
use crate::output::Output;

/// Sign in or register; missing fields are prompted for
pub fn login(
    portal: &mut Portal<JsonPersistence>,
    email: Option<String>,
    password: Option<String>,
    username: Option<String>,
    register: bool,
    output: &Output,
) -> Result<()> {
    let username = match (register, username) {
        (true, username) => Some(value_or_prompt(username, "Username")?),
        (false, username) => username,
    };
    let email = value_or_prompt(email, "Email")?;
    let password = value_or_prompt(password, "Password")?;

    let credentials = Credentials {
        email,
        password,
        username,
        register,
    };
    let user = portal
        .login(&MockAuthenticator, &credentials)
        .context("Sign-in failed")?;

    if output.is_json() {
        output.json(user);
    } else {
        output.success(&format!("Signed in as {}", user.username));
    }
    Ok(())
}

/// Sign out
pub fn logout(portal: &mut Portal<JsonPersistence>, output: &Output) -> Result<()> {
    match portal.logout().context("Failed to clear session")? {
        Some(user) => output.success(&format!("Signed out {}", user.username)),
        None => output.message("Not signed in."),
    }
    Ok(())
}

/// Show the signed-in user
pub fn whoami(portal: &Portal<JsonPersistence>, output: &Output) -> Result<()> {
    output.print_user(portal.session());
    Ok(())
}
