use anyhow::Context;
use clap::Subcommand;
use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::models::{Phase, Session};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "List sessions, optionally filtered by phase")]
    List {
        #[arg(long, help = "Phase filter: waiting, live or ended")]
        phase: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },

    #[command(about = "Force-end a stuck session")]
    End {
        #[arg(help = "Session id")]
        id: Uuid,
    },
}

pub async fn handle(
    cmd: SessionCommands,
    state: &AppState,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        SessionCommands::List { phase, limit } => {
            let mut query = state
                .db
                .from("sessions")
                .order("createdAt", false)
                .limit(limit);
            if let Some(raw) = phase {
                let phase: Phase = raw
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))
                    .context("invalid --phase")?;
                query = query.eq("phase", phase);
            }

            let sessions: Vec<Session> = query.fetch().await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sessions)?),
                OutputFormat::Text => {
                    for s in &sessions {
                        println!(
                            "{}  {}  practitioner={}  guest={}  channel={}",
                            s.id, s.phase, s.practitioner_id, s.guest_id, s.agora_channel
                        );
                    }
                    println!("({} sessions)", sessions.len());
                }
            }
            Ok(())
        }
        SessionCommands::End { id } => {
            let session = state.sessions.force_end(id).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
                OutputFormat::Text => println!("Session {} is now {}", session.id, session.phase),
            }
            Ok(())
        }
    }
}
