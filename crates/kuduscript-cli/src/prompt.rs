//! Interactive overwrite confirmation.
//!
//! Uses dialoguer for the terminal prompt.

use std::io;

use dialoguer::{Confirm, theme::ColorfulTheme};

use kuduscript_core::output::ConfirmOverwrite;

/// Asks on the terminal unless prompts are suppressed.
pub struct OverwritePrompt {
    /// Answer yes without asking (`-y`)
    assume_yes: bool,
    theme: ColorfulTheme,
}

impl OverwritePrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            theme: ColorfulTheme::default(),
        }
    }
}

impl ConfirmOverwrite for OverwritePrompt {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        if self.assume_yes {
            tracing::debug!(message, "prompt suppressed, overwriting");
            return Ok(true);
        }

        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(|dialoguer::Error::IO(e)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_prompt_always_confirms() {
        let mut prompt = OverwritePrompt::new(true);
        assert!(prompt.confirm("deploy.cmd already exists, overwrite?").unwrap());
    }
}
