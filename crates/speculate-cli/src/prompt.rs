//! Yes/no confirmations.
//!
//! On a terminal the prompt goes through dialoguer; with piped stdin one line
//! is read, so scripts can answer by echoing `y` or `n`.

use dialoguer::Confirm;
use speculate_core::SpeculateError;
use std::io::{BufRead, IsTerminal, Write};

/// Ask a yes/no question. Declining or interrupting both come back as
/// `UserCancelled`.
pub fn confirm(question: &str, default: bool) -> anyhow::Result<()> {
    let yes = if std::io::stdin().is_terminal() {
        match Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact_opt()
        {
            Ok(Some(answer)) => answer,
            // Esc / q
            Ok(None) => false,
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => {
                return Err(SpeculateError::UserCancelled { interrupted: true }.into());
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        read_answer(question, default, std::io::stdin().lock())?
    };
    if yes {
        Ok(())
    } else {
        Err(SpeculateError::UserCancelled { interrupted: false }.into())
    }
}

fn read_answer(question: &str, default: bool, mut input: impl BufRead) -> anyhow::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    print!("{question} {hint} ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(parse_answer(&line, default))
}

fn parse_answer(line: &str, default: bool) -> bool {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}
