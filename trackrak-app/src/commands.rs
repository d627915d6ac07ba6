use std::path::PathBuf;
use trackrak_shared::Masked;

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { email: String, password: Masked<String> },
    Navigate,
    Retry,
    Activate,
    Dismiss,
    Reopen,
    Close,
    /// Point the console host at another page, optionally with saved markup
    Page { url: String, html: Option<PathBuf> },
    Status,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty input")]
    Empty,

    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  login <email> <password>   submit the login form
  go                         open the in-store offers page
  retry                      re-check the page for a signed-in session
  activate                   activate every available offer
  dismiss                    close the panel
  reopen | close             toolbar signals
  page <url> [html-file]     change the current page
  status                     print the stored session
  quit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("login", [email, password]) => Command::Login {
            email: email.to_string(),
            password: Masked::from(*password),
        },
        ("login", _) => return Err(CommandError::Usage("login <email> <password>")),
        ("go" | "navigate", []) => Command::Navigate,
        ("retry", []) => Command::Retry,
        ("activate", []) => Command::Activate,
        ("dismiss", []) => Command::Dismiss,
        ("reopen", []) => Command::Reopen,
        ("close", []) => Command::Close,
        ("page", [url]) => Command::Page { url: url.to_string(), html: None },
        ("page", [url, path]) => Command::Page {
            url: url.to_string(),
            html: Some(PathBuf::from(path)),
        },
        ("page", _) => return Err(CommandError::Usage("page <url> [html-file]")),
        ("status", []) => Command::Status,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };
    Ok(command)
}
