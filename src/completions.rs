//! Completion script output for the supported shells

use anyhow::{anyhow, Result};
use clap::Command;
use clap_complete::{generate, shells};
use std::io;
use std::str::FromStr;

/// Shells tether can emit a completion script for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    /// Render the completion script for `cmd` into `out`. The script
    /// is named after the command, so the output can be piped straight
    /// into a completions directory.
    pub fn write_completions(self, cmd: &mut Command, out: &mut dyn io::Write) {
        let bin_name = cmd.get_name().to_string();
        match self {
            Shell::Bash => generate(shells::Bash, cmd, bin_name, out),
            Shell::Zsh => generate(shells::Zsh, cmd, bin_name, out),
            Shell::Fish => generate(shells::Fish, cmd, bin_name, out),
        }
    }
}

impl FromStr for Shell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            _ => Err(anyhow!("Unknown shell '{s}'; choose bash, zsh or fish")),
        }
    }
}
