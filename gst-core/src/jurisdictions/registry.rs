use std::collections::BTreeMap;

use thiserror::Error;

use super::INDIA;
use super::jurisdiction::Jurisdiction;
use crate::models::Gstin;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The same code appeared twice while building a registry.
    #[error("duplicate jurisdiction code {0:02}")]
    DuplicateCode(u8),

    /// A code that was expected to resolve did not.
    #[error("unknown jurisdiction code {0:02}")]
    UnknownJurisdiction(u8),
}

/// Read-only lookup of jurisdictions by code.
///
/// Typical lifetime:
/// 1. Build with [`JurisdictionRegistry::india`] (or `new` for fixtures).
/// 2. Share by reference for the life of the process.
///
/// Lookups never fail: unknown codes come back as `None`. Callers that
/// treat an unknown code as a data-integrity problem use [`require`].
///
/// [`require`]: JurisdictionRegistry::require
#[derive(Debug, Clone)]
pub struct JurisdictionRegistry {
    by_code: BTreeMap<u8, Jurisdiction>,
}

impl JurisdictionRegistry {
    /// Build a registry from an arbitrary set of jurisdictions.
    ///
    /// # Errors
    /// * [`RegistryError::DuplicateCode`] if two entries share a code.
    pub fn new<I>(jurisdictions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Jurisdiction>,
    {
        let mut by_code = BTreeMap::new();
        for jurisdiction in jurisdictions {
            let code = jurisdiction.code();
            if by_code.insert(code, jurisdiction).is_some() {
                return Err(RegistryError::DuplicateCode(code));
            }
        }
        Ok(Self { by_code })
    }

    /// The authoritative GST state code table.
    pub fn india() -> Self {
        let by_code = INDIA
            .iter()
            .map(|&(code, name)| (code, Jurisdiction::new(code, name)))
            .collect();
        Self { by_code }
    }

    pub fn lookup(
        &self,
        code: u8,
    ) -> Option<&Jurisdiction> {
        self.by_code.get(&code)
    }

    /// Resolve a textual code such as `"07"` or `"7"`.
    pub fn lookup_str(
        &self,
        code: &str,
    ) -> Option<&Jurisdiction> {
        code.trim()
            .parse::<u8>()
            .ok()
            .and_then(|code| self.lookup(code))
    }

    /// Like [`lookup`](Self::lookup), but an absent code is an error.
    pub fn require(
        &self,
        code: u8,
    ) -> Result<&Jurisdiction, RegistryError> {
        self.lookup(code)
            .ok_or(RegistryError::UnknownJurisdiction(code))
    }

    /// Home jurisdiction of a GSTIN holder.
    pub fn for_gstin(
        &self,
        gstin: &Gstin,
    ) -> Option<&Jurisdiction> {
        self.lookup(gstin.state_code())
    }

    /// All entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &Jurisdiction> {
        self.by_code.values()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for JurisdictionRegistry {
    fn default() -> Self {
        Self::india()
    }
}
