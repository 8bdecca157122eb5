//! Terminal I/O for CLI commands
//!
//! Prompts read one line from stdin. Passwords are read without echo when
//! stdin is a terminal. Command output is JSON on stdout.

use std::io::{self, BufRead, IsTerminal, Write};

use serde::Serialize;

use super::errors::{CliError, CliResult};

/// Prompt on stderr and read one line from stdin
pub fn prompt_line(label: &str) -> CliResult<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}: ", label)?;
    stderr.flush()?;

    read_value(&mut io::stdin().lock(), label)
}

/// Read a secret. Interactive terminals get a no-echo prompt; piped input
/// is read as a plain line.
pub fn prompt_password(label: &str) -> CliResult<String> {
    if !io::stdin().is_terminal() {
        return read_value(&mut io::stdin().lock(), label);
    }

    let value = rpassword::prompt_password(format!("{}: ", label))?;
    if value.trim().is_empty() {
        return Err(CliError::io_error(format!("{} is required", label)));
    }
    Ok(value)
}

/// One line without its terminator. Blank lines are an error.
fn read_value<R: BufRead>(reader: &mut R, label: &str) -> CliResult<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.trim().is_empty() {
        return Err(CliError::io_error(format!("{} is required", label)));
    }
    Ok(value)
}

/// Write a value as pretty JSON to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piped_value_keeps_inner_spaces() {
        let mut input = io::Cursor::new("pass word 1\r\nnext\n");
        assert_eq!(read_value(&mut input, "Password").unwrap(), "pass word 1");
    }

    #[test]
    fn test_blank_or_missing_value_is_error() {
        let mut blank = io::Cursor::new("   \n");
        assert!(read_value(&mut blank, "Password").is_err());

        let mut empty = io::Cursor::new("");
        assert!(read_value(&mut empty, "Username").is_err());
    }
}
