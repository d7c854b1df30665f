use serde::{Deserialize, Serialize};

use super::Gstin;
use super::party::{PartyError, validate_party};
use crate::jurisdictions::{Jurisdiction, JurisdictionRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
}

/// The seller: whoever issues the invoices. There is exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_name: String,
    pub gstin: Option<Gstin>,
    /// Home jurisdiction; the seller side of every tax split.
    pub state_code: u8,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bank: Option<BankDetails>,
    pub upi_id: Option<String>,
}

impl BusinessProfile {
    /// Checks the name, that the state code exists and that a GSTIN, if
    /// given, was issued in that state.
    pub fn validate(
        &self,
        registry: &JurisdictionRegistry,
    ) -> Result<(), PartyError> {
        validate_party(
            &self.business_name,
            self.gstin.as_ref(),
            self.state_code,
            registry,
        )
    }

    pub fn home_jurisdiction<'r>(
        &self,
        registry: &'r JurisdictionRegistry,
    ) -> Result<&'r Jurisdiction, PartyError> {
        registry
            .lookup(self.state_code)
            .ok_or(PartyError::UnknownJurisdiction(self.state_code))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(state_code: u8, gstin: Option<&str>) -> BusinessProfile {
        BusinessProfile {
            business_name: "Asha Rao Studio".to_string(),
            gstin: gstin.map(|g| Gstin::parse(g).expect("valid gstin")),
            state_code,
            address: None,
            email: None,
            phone: None,
            bank: None,
            upi_id: None,
        }
    }

    #[test]
    fn validate_accepts_matching_gstin() {
        let registry = JurisdictionRegistry::india();

        assert_eq!(profile(29, Some("29ABCDE1234F1ZW")).validate(&registry), Ok(()));
        assert_eq!(profile(29, None).validate(&registry), Ok(()));
    }

    #[test]
    fn validate_rejects_gstin_from_other_state() {
        let registry = JurisdictionRegistry::india();

        assert_eq!(
            profile(29, Some("27AAPFU0939F1ZV")).validate(&registry),
            Err(PartyError::GstinStateMismatch {
                gstin: "27AAPFU0939F1ZV".to_string(),
                gstin_state: 27,
                state_code: 29,
            })
        );
    }

    #[test]
    fn validate_rejects_unknown_state() {
        let registry = JurisdictionRegistry::india();

        assert_eq!(
            profile(28, None).validate(&registry),
            Err(PartyError::UnknownJurisdiction(28))
        );
    }

    #[test]
    fn validate_rejects_blank_name() {
        let registry = JurisdictionRegistry::india();
        let mut blank = profile(29, None);
        blank.business_name = " ".to_string();

        assert_eq!(blank.validate(&registry), Err(PartyError::EmptyName));
    }

    #[test]
    fn home_jurisdiction_resolves_state() {
        let registry = JurisdictionRegistry::india();

        let home = profile(29, None).home_jurisdiction(&registry).unwrap();

        assert_eq!(home.name(), "Karnataka");
    }
}
