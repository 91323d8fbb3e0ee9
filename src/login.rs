use crate::error::JournalError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

// RE-#####/YY
static CONTRACT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^RE-\d{5}/\d{2}$").expect("contract number pattern"));

const MIN_PASSWORD_CHARS: usize = 6;

/// Local login state. Nothing leads back to `LoggedOut`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    LoggedOut,
    LoggedIn { owner_id: String },
}

impl Session {
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            Session::LoggedOut => None,
            Session::LoggedIn { owner_id } => Some(owner_id),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::LoggedIn { .. })
    }
}

/// Checks the credentials' shape and returns the accepted identifier.
///
/// This is a form check only, nothing is verified against a server.
pub fn attempt_login(identifier: &str, password: &str) -> Result<String, JournalError> {
    let identifier = identifier.trim();

    if !CONTRACT_NUMBER.is_match(identifier) {
        debug!("rejected malformed contract number");
        return Err(JournalError::MalformedIdentifier);
    }

    if password.chars().count() < MIN_PASSWORD_CHARS {
        debug!("rejected short password");
        return Err(JournalError::ShortPassword);
    }

    info!(owner_id = identifier, "login accepted");
    Ok(identifier.to_string())
}
