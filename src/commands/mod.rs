pub mod completions;
pub mod resolve;
pub mod verify;

pub use completions::CompletionsCommand;
pub use resolve::ResolveCommand;
pub use verify::VerifyCommand;

use crate::aws::ResolvedConfig;

/// Label identifying a resolved session in command output
pub(crate) fn session_label(config: &ResolvedConfig) -> &str {
    config.role_arn().unwrap_or("(base credentials)")
}
