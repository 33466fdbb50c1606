// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kord completions <shell>`
//!
//! ```bash
//! kord completions zsh > ~/.zfunc/_kord
//! kord completions fish > ~/.config/fish/completions/kord.fish
//! ```

use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `C` under its own binary name
pub fn write_completions<C: CommandFactory>(shell: Shell, out: &mut dyn Write) {
    let mut cmd = C::command();
    let bin = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin, out);
}

#[cfg(test)]
#[path = "completions_tests.rs"]
mod tests;
