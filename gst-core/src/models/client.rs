use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Gstin;
use super::party::{PartyError, validate_party};
use crate::jurisdictions::JurisdictionRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub gstin: Option<Gstin>,
    /// Place of supply for invoices raised to this client.
    pub state_code: u8,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// For creating new clients (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub gstin: Option<Gstin>,
    pub state_code: u8,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewClient {
    pub fn validate(
        &self,
        registry: &JurisdictionRegistry,
    ) -> Result<(), PartyError> {
        validate_party(&self.name, self.gstin.as_ref(), self.state_code, registry)
    }
}

impl Client {
    pub fn validate(
        &self,
        registry: &JurisdictionRegistry,
    ) -> Result<(), PartyError> {
        validate_party(&self.name, self.gstin.as_ref(), self.state_code, registry)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unregistered_client_only_needs_known_state() {
        let registry = JurisdictionRegistry::india();
        let client = NewClient {
            name: "Meera Textiles".to_string(),
            gstin: None,
            state_code: 33,
            address: None,
            email: None,
            phone: None,
        };

        assert_eq!(client.validate(&registry), Ok(()));
    }

    #[test]
    fn client_gstin_must_match_state() {
        let registry = JurisdictionRegistry::india();
        let client = NewClient {
            name: "Meera Textiles".to_string(),
            gstin: Some(Gstin::parse("33AAACI1195H1ZT").unwrap()),
            state_code: 32,
            address: None,
            email: None,
            phone: None,
        };

        assert!(matches!(
            client.validate(&registry),
            Err(PartyError::GstinStateMismatch { gstin_state: 33, state_code: 32, .. })
        ));
    }
}
