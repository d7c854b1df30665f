use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LineValidationError, TaxableLine};

/// A reusable catalogue entry that pre-fills invoice lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: i64,
    pub name: String,
    pub sac_code: Option<String>,
    pub unit_price: Decimal,
    /// GST rate as a percentage, e.g. `18` for 18%.
    pub tax_rate: Decimal,
    pub created_at: DateTime<Utc>,
}

/// For creating new service items (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServiceItem {
    pub name: String,
    pub sac_code: Option<String>,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
}

impl NewServiceItem {
    /// Runs the same checks a line built from this item would, at quantity 1.
    pub fn validate(&self) -> Result<(), LineValidationError> {
        TaxableLine::new(&self.name, Decimal::ONE, self.unit_price, self.tax_rate).map(|_| ())
    }
}

impl ServiceItem {
    /// An invoice line for `quantity` units at the catalogue price and rate.
    pub fn to_line(
        &self,
        quantity: Decimal,
    ) -> Result<TaxableLine, LineValidationError> {
        TaxableLine::new(&self.name, quantity, self.unit_price, self.tax_rate)
            .map(|line| line.with_sac_code(self.sac_code.clone()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn to_line_copies_price_rate_and_code() {
        let item = ServiceItem {
            id: 1,
            name: "Logo design".to_string(),
            sac_code: Some("998391".to_string()),
            unit_price: dec!(15000),
            tax_rate: dec!(18),
            created_at: Utc::now(),
        };

        let line = item.to_line(dec!(2)).unwrap();

        assert_eq!(line.description(), "Logo design");
        assert_eq!(line.sac_code(), Some("998391"));
        assert_eq!(line.taxable_amount(), dec!(30000));
        assert_eq!(line.tax_rate(), dec!(18));
    }

    #[test]
    fn validate_rejects_out_of_range_rate() {
        let item = NewServiceItem {
            name: "Consulting".to_string(),
            sac_code: None,
            unit_price: dec!(2500),
            tax_rate: dec!(118),
        };

        assert_eq!(item.validate(), Err(LineValidationError::RateOutOfRange(dec!(118))));
    }
}
