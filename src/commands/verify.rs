use anyhow::{Result, bail};
use aws_smithy_types::{
    DateTime,
    date_time::Format,
    error::display::DisplayErrorContext,
};
use clap::Args;
use tracing::warn;

use super::session_label;
use crate::{aws, config::SessionConfig};

#[derive(Debug, Clone, Args)]
pub struct VerifyCommand {}

impl VerifyCommand {
    /// Every session is checked even after a failure.
    pub async fn execute(self, session: &SessionConfig) -> Result<()> {
        let configs = aws::resolve(session, None)?;
        let mut failed = 0;

        for config in &configs {
            let label = session_label(config);
            match config.retrieve().await {
                Ok(creds) => {
                    let expiration = creds
                        .expiry()
                        .and_then(|expiry| DateTime::from(expiry).fmt(Format::DateTime).ok())
                        .unwrap_or_else(|| "never".to_string());
                    println!(
                        "{label}: {} (expires {expiration})",
                        mask_access_key_id(creds.access_key_id())
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(session = label, "Failed to retrieve credentials");
                    eprintln!("{label}: {}", DisplayErrorContext(&e));
                }
            }
        }

        if failed > 0 {
            bail!(
                "{} of {} session(s) failed to provide credentials",
                failed,
                configs.len()
            );
        }
        Ok(())
    }
}

fn mask_access_key_id(access_key_id: &str) -> String {
    let chars: Vec<char> = access_key_id.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}
