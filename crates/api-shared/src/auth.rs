//! Session extraction.
//!
//! The session collaborator in front of Wardview forwards the signed-in user
//! as plain headers. They are trusted verbatim: there is no signature or
//! token to check, so anything that can reach the server can claim any role.

use http::HeaderMap;
use wardview_core::SessionUser;

pub const SESSION_NAME_HEADER: &str = "x-session-name";
pub const SESSION_ROLE_HEADER: &str = "x-session-role";
pub const SESSION_PATIENT_ID_HEADER: &str = "x-session-patient-id";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionHeaderError {
    #[error("missing header {0}")]
    Missing(&'static str),
    #[error("header {0} is not valid UTF-8")]
    NotText(&'static str),
}

fn header(headers: &HeaderMap, name: &'static str) -> Result<Option<String>, SessionHeaderError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(|s| s.trim().to_owned())
                .map_err(|_| SessionHeaderError::NotText(name))
        })
        .transpose()
}

/// Build the session user from request headers.
///
/// Name and role are required; an unrecognised role is not an error and
/// resolves to the deny-all profile downstream.
pub fn session_from_headers(headers: &HeaderMap) -> Result<SessionUser, SessionHeaderError> {
    let name = header(headers, SESSION_NAME_HEADER)?
        .filter(|s| !s.is_empty())
        .ok_or(SessionHeaderError::Missing(SESSION_NAME_HEADER))?;
    let role = header(headers, SESSION_ROLE_HEADER)?
        .filter(|s| !s.is_empty())
        .ok_or(SessionHeaderError::Missing(SESSION_ROLE_HEADER))?;
    let patient_id = header(headers, SESSION_PATIENT_ID_HEADER)?;

    Ok(SessionUser::new(name, role, patient_id))
}
