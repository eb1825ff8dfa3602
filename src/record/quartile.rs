//! Journal impact-factor quartile

use serde::{Deserialize, Serialize};

use crate::Error;

/// Impact-factor quartile of the publishing journal (Q1 is the top quartile).
///
/// Serialized as the integers `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ImpactQuartile {
    /// Top quartile
    Q1,
    /// Second quartile
    Q2,
    /// Third quartile
    Q3,
    /// Bottom quartile
    Q4,
}

impl ImpactQuartile {
    /// Ordinal value `1..=4`.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }
}

impl TryFrom<u8> for ImpactQuartile {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Q1),
            2 => Ok(Self::Q2),
            3 => Ok(Self::Q3),
            4 => Ok(Self::Q4),
            other => Err(Error::InvalidInput(format!(
                "impact factor quartile must be 1-4, got {other}"
            ))),
        }
    }
}

impl From<ImpactQuartile> for u8 {
    fn from(quartile: ImpactQuartile) -> Self {
        quartile.ordinal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartile_ordinal_roundtrip() {
        for n in 1..=4u8 {
            assert_eq!(ImpactQuartile::try_from(n).unwrap().ordinal(), n);
        }
    }

    #[test]
    fn test_quartile_out_of_range() {
        assert!(ImpactQuartile::try_from(0).is_err());
        assert!(ImpactQuartile::try_from(5).is_err());
    }

    #[test]
    fn test_quartile_serde_as_integer() {
        let json = serde_json::to_string(&ImpactQuartile::Q3).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<ImpactQuartile>("7").is_err());
    }
}
