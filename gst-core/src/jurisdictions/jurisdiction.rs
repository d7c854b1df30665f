use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One taxing region: a GST state code and its display name.
///
/// Two jurisdictions are equal when their codes are equal. The name is for
/// display only and never takes part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jurisdiction {
    code: u8,
    name: String,
}

impl Jurisdiction {
    pub fn new(
        code: u8,
        name: impl Into<String>,
    ) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Two-digit code as printed on invoices and embedded in GSTINs.
    pub fn padded_code(&self) -> String {
        format!("{:02}", self.code)
    }
}

impl PartialEq for Jurisdiction {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.code == other.code
    }
}

impl Eq for Jurisdiction {}

impl Hash for Jurisdiction {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.code.hash(state);
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.padded_code())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn padded_code_has_two_digits() {
        assert_eq!(Jurisdiction::new(7, "Delhi").padded_code(), "07");
        assert_eq!(Jurisdiction::new(29, "Karnataka").padded_code(), "29");
        assert_eq!(Jurisdiction::new(97, "Other Territory").padded_code(), "97");
    }

    #[test]
    fn equality_ignores_display_name() {
        assert_eq!(
            Jurisdiction::new(29, "Karnataka"),
            Jurisdiction::new(29, "KA")
        );
        assert_ne!(
            Jurisdiction::new(29, "Karnataka"),
            Jurisdiction::new(27, "Karnataka")
        );
    }

    #[test]
    fn display_includes_name_and_code() {
        assert_eq!(
            Jurisdiction::new(7, "Delhi").to_string(),
            "Delhi (07)"
        );
    }
}
