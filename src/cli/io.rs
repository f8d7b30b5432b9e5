//! Shell command parsing and JSON line output
//!
//! - Input: one command per line
//! - Output: one JSON response object per line
//! - UTF-8 only
//!
//! Responses share stdout with diagnostics: plain progress lines with
//! `diagnostics: text`, JSON log lines with `json`. Only `off` leaves
//! response lines alone on stdout.

use std::io::Write;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// One shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// read <name>
    Read { name: String },
    /// write <name> <payload...>
    Write { name: String, payload: String },
    /// stats
    Stats,
    /// exit
    Exit,
}

/// Parse one input line
///
/// Returns `Ok(None)` for a blank line. The write payload is the rest of
/// the line after the name, inner whitespace preserved.
pub fn parse_command(line: &str) -> CliResult<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = split_token(line);
    let command = match verb {
        "read" => {
            let (name, extra) = split_token(rest);
            if name.is_empty() || !extra.is_empty() {
                return Err(CliError::invalid_command("Usage: read <name>"));
            }
            ShellCommand::Read {
                name: name.to_string(),
            }
        }
        "write" => {
            let (name, payload) = split_token(rest);
            if name.is_empty() || payload.is_empty() {
                return Err(CliError::invalid_command("Usage: write <name> <payload>"));
            }
            ShellCommand::Write {
                name: name.to_string(),
                payload: payload.to_string(),
            }
        }
        "stats" if rest.is_empty() => ShellCommand::Stats,
        "exit" if rest.is_empty() => ShellCommand::Exit,
        other => {
            return Err(CliError::invalid_command(format!("Unknown command: {}", other)));
        }
    };

    Ok(Some(command))
}

/// First whitespace-delimited token and the trimmed remainder
fn split_token(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (s, ""),
    }
}

/// Write a success response line
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(out, &response)
}

/// Write an error response line
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(out, &response)
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read() {
        assert_eq!(
            parse_command("read notes\n").unwrap(),
            Some(ShellCommand::Read {
                name: "notes".into()
            })
        );
    }

    #[test]
    fn test_parse_write_keeps_inner_spaces() {
        assert_eq!(
            parse_command("write notes  hello   world ").unwrap(),
            Some(ShellCommand::Write {
                name: "notes".into(),
                payload: "hello   world".into(),
            })
        );
    }

    #[test]
    fn test_parse_blank_and_keywords() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("stats").unwrap(), Some(ShellCommand::Stats));
        assert_eq!(parse_command("exit").unwrap(), Some(ShellCommand::Exit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("read").is_err());
        assert!(parse_command("read a b").is_err());
        assert!(parse_command("write notes").is_err());
        assert!(parse_command("exit now").is_err());
        let err = parse_command("delete notes").unwrap_err();
        assert_eq!(err.message(), "Unknown command: delete");
    }

    #[test]
    fn test_response_lines() {
        let mut out = Vec::new();
        write_response(&mut out, serde_json::json!({"size": 4})).unwrap();
        write_error(&mut out, "RWSTORE_NOT_FOUND", "Record not found: x").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["data"]["size"], 4);
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(lines[1]["code"], "RWSTORE_NOT_FOUND");
    }
}
