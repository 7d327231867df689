use serde::{Deserialize, Serialize};
use std::fmt;

/// The share of an imposed tax borne by buyers:
/// `supply / (|demand| + supply)`.
///
/// The result lies in [0, 1] for a non-negative supply elasticity. When both
/// elasticities are zero the ratio is undefined, which is reported as an
/// error rather than letting NaN leak into downstream scoring.
pub fn buyer_share(demand_elasticity: f64, supply_elasticity: f64) -> Result<f64, IncidenceError> {
    let denominator = demand_elasticity.abs() + supply_elasticity;
    if denominator == 0.0 {
        return Err(IncidenceError::Degenerate);
    }
    Ok(supply_elasticity / denominator)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidenceError {
    /// Both elasticities were zero, so no party can be assigned the burden.
    Degenerate,
}

impl fmt::Display for IncidenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidenceError::Degenerate => {
                write!(f, "tax incidence is undefined when both elasticities are zero")
            }
        }
    }
}

impl std::error::Error for IncidenceError {}

/// Narrative interpretation of a buyer share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidenceBand {
    BuyersBearMost,
    EvenlySplit,
    SellersBearMost,
}

impl IncidenceBand {
    pub fn from_share(share: f64) -> Self {
        if share > 0.6 {
            Self::BuyersBearMost
        } else if share < 0.4 {
            Self::SellersBearMost
        } else {
            Self::EvenlySplit
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BuyersBearMost => "buyers bear most of the burden",
            Self::EvenlySplit => "evenly split",
            Self::SellersBearMost => "sellers bear most of the burden",
        }
    }

    /// One-sentence explanation suitable for end-of-question feedback.
    pub const fn narrative(self) -> &'static str {
        match self {
            Self::BuyersBearMost => {
                "Buyers are less flexible than sellers, so they bear most of the tax burden."
            }
            Self::EvenlySplit => {
                "Both parties have similar flexibility, so the tax burden is relatively evenly split."
            }
            Self::SellersBearMost => {
                "Sellers are less flexible than buyers, so they absorb most of the tax burden."
            }
        }
    }
}
