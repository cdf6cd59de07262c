use clap::Subcommand;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Set a new password for an identity user")]
    ResetPassword {
        #[arg(help = "Email of the user")]
        email: String,
        #[arg(long, help = "New password")]
        password: String,
    },

    #[command(about = "Mark an identity user's email as confirmed")]
    ConfirmEmail {
        #[arg(help = "Email of the user")]
        email: String,
    },
}

pub async fn handle(
    cmd: AuthCommands,
    state: &AppState,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::ResetPassword { email, password } => {
            let user = state.identity.admin_find_user(&email).await?;
            state
                .identity
                .admin_update_user(user.id, &json!({ "password": password }))
                .await?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", json!({ "userId": user.id, "passwordReset": true }))
                }
                OutputFormat::Text => println!("Password reset for {} ({})", email, user.id),
            }
            Ok(())
        }
        AuthCommands::ConfirmEmail { email } => {
            let user = state.identity.admin_find_user(&email).await?;
            state
                .identity
                .admin_update_user(user.id, &json!({ "email_confirm": true }))
                .await?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", json!({ "userId": user.id, "emailConfirmed": true }))
                }
                OutputFormat::Text => println!("Email confirmed for {} ({})", email, user.id),
            }
            Ok(())
        }
    }
}
