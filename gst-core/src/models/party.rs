use thiserror::Error;

use super::Gstin;
use crate::jurisdictions::JurisdictionRegistry;

/// Problems with a seller profile or client record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartyError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("unknown state code {0:02}")]
    UnknownJurisdiction(u8),

    #[error("GSTIN {gstin} is registered in state {gstin_state:02}, not {state_code:02}")]
    GstinStateMismatch {
        gstin: String,
        gstin_state: u8,
        state_code: u8,
    },
}

/// Shared checks for anything that names a party and its home state.
pub(crate) fn validate_party(
    name: &str,
    gstin: Option<&Gstin>,
    state_code: u8,
    registry: &JurisdictionRegistry,
) -> Result<(), PartyError> {
    if name.trim().is_empty() {
        return Err(PartyError::EmptyName);
    }
    if registry.lookup(state_code).is_none() {
        return Err(PartyError::UnknownJurisdiction(state_code));
    }
    if let Some(gstin) = gstin {
        if gstin.state_code() != state_code {
            return Err(PartyError::GstinStateMismatch {
                gstin: gstin.to_string(),
                gstin_state: gstin.state_code(),
                state_code,
            });
        }
    }
    Ok(())
}
