//! Terminal confirmation before deleting.
//!
//! Lists every reduced path, then asks with dialoguer. The answer defaults
//! to "no".

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};

use purge_core::commands::{DeleteConfirmer, write_path_list};
use purge_core::stream::PathSet;

const PROMPT: &str = "Are you sure you want to delete the above paths?";

pub struct PromptConfirmer<W: Write = io::Stdout> {
    /// Output writer (for testing)
    writer: W,
    /// Canned answer instead of prompting (for testing)
    answer: Option<bool>,
    theme: ColorfulTheme,
}

impl PromptConfirmer<io::Stdout> {
    pub fn new() -> Self {
        Self {
            writer: io::stdout(),
            answer: None,
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> PromptConfirmer<W> {
    #[cfg(test)]
    pub fn with_writer(writer: W, answer: Option<bool>) -> Self {
        Self {
            writer,
            answer,
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> DeleteConfirmer for PromptConfirmer<W> {
    fn confirm(&mut self, paths: &PathSet) -> Result<bool> {
        writeln!(self.writer)?;
        write_path_list(paths, &mut self.writer)?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "  {} path(s) selected",
            style(paths.len()).bold()
        )?;
        self.writer.flush()?;

        if let Some(answer) = self.answer {
            return Ok(answer);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(PROMPT)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}
