use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::session_label;
use crate::{aws, config::SessionConfig};

#[derive(Debug, Clone, Args)]
pub struct ResolveCommand {
    #[arg(short = 'd', long, help = "Show which session serves this domain (repeatable)")]
    pub domain: Vec<String>,
}

impl ResolveCommand {
    pub fn execute(self, session: &SessionConfig) -> Result<()> {
        let configs = aws::resolve(session, None).context("Failed to resolve AWS sessions")?;
        info!("Resolved {} session(s)", configs.len());

        for config in &configs {
            let region = config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{}\tregion={}", session_label(config), region);
        }

        for domain in &self.domain {
            match configs.for_domain(domain) {
                Some(config) => println!("{domain} -> {}", session_label(config)),
                None => println!("{domain} -> no matching session"),
            }
        }

        Ok(())
    }
}
