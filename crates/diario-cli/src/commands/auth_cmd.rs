use diario_core::auth::SignUpOutcome;
use diario_core::identity::IdentityProvider;

use crate::auth::clear_stored_session;
use crate::cli::AuthCommands;
use crate::commands::common::{open_identity, resolve_profile_settings};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { email, password } => {
            let (profile_name, identity) = open_identity(profile)?;
            let session = identity.sign_in(&email, &password).await?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in profile '{profile_name}' as {email_label}");
            Ok(())
        }
        AuthCommands::Register {
            email,
            password,
            name,
        } => {
            let (profile_name, identity) = open_identity(profile)?;
            match identity.sign_up(&email, &password, name.as_deref()).await? {
                SignUpOutcome::SignedIn(session) => {
                    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                    println!("Registered and signed in profile '{profile_name}' as {email_label}");
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!("Registered {email}. Confirm the address from your inbox, then run `diario auth login`.");
                }
            }
            Ok(())
        }
        AuthCommands::Status => {
            let (profile_name, settings) = resolve_profile_settings(profile)?;
            if settings.is_none() {
                println!("Profile '{profile_name}' is not configured.");
                return Ok(());
            }

            let (_, identity) = open_identity(Some(&profile_name))?;
            identity.current_session().await?;
            if let Some(session) = identity.auth_session() {
                let identity_view = session.to_session();
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} ({}, expires_at={})",
                    profile_name,
                    email_label,
                    identity_view.greeting_name(),
                    session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let (profile_name, settings) = resolve_profile_settings(profile)?;
            if settings.is_some() {
                let (_, identity) = open_identity(Some(&profile_name))?;
                identity.current_session().await?;
                identity.sign_out().await?;
            } else {
                clear_stored_session(&profile_name)?;
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}
