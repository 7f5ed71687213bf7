use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::{
    commands::{CompletionsCommand, ResolveCommand, VerifyCommand},
    config::{SessionConfig, parse_domain_role},
};

#[derive(Debug, Clone, Parser)]
#[command(name = "aws-dns-session", version, about = "Resolve AWS sessions for DNS providers, one per IAM role", long_about = None)]
pub struct Cli {
    #[arg(short = 'p', long, global = true, help = "Shared credentials file profile")]
    pub profile: Option<String>,

    #[arg(long, global = true, help = "AWS region attached to every session")]
    pub region: Option<String>,

    #[arg(long, global = true, help = "IAM role ARN assumed for domains without their own role")]
    pub assume_role: Option<String>,

    #[arg(long, global = true, help = "External ID passed when assuming roles")]
    pub assume_role_external_id: Option<String>,

    #[arg(long, global = true, help = "Session name recorded for assumed roles")]
    pub role_session_name: Option<String>,

    #[arg(
        long = "domain-role",
        global = true,
        value_name = "DOMAIN=ROLE_ARN",
        value_parser = parse_domain_role,
        help = "IAM role ARN used for a domain (repeatable)"
    )]
    pub domain_roles: Vec<(String, String)>,

    #[arg(long, global = true, value_name = "SECONDS", help = "Requested STS session length")]
    pub session_duration: Option<u64>,

    #[arg(long, global = true, help = "Maximum attempts for AWS API calls")]
    pub api_retries: Option<u32>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Show the sessions resolved from the given options")]
    Resolve(ResolveCommand),
    #[command(about = "Retrieve credentials for every resolved session")]
    Verify(VerifyCommand),
    #[command(about = "Generate shell completion scripts for aws-dns-session")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            profile: self.profile.clone(),
            region: self.region.clone(),
            assume_role: self.assume_role.clone(),
            assume_role_external_id: self.assume_role_external_id.clone(),
            domain_roles: self.domain_roles.iter().cloned().collect(),
            role_session_name: self.role_session_name.clone(),
            session_duration: self.session_duration.map(Duration::from_secs),
            api_retries: self.api_retries,
        }
    }

    pub async fn execute(self) -> Result<()> {
        let session = self.session_config();
        let command = self
            .command
            .unwrap_or(Commands::Resolve(ResolveCommand { domain: Vec::new() }));

        match command {
            Commands::Resolve(cmd) => cmd.execute(&session),
            Commands::Verify(cmd) => cmd.execute(&session).await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}
