use serde::Serialize;

use super::scoring;

/// Static teaching content the rendering layer shows alongside the quiz:
/// what each elasticity means, how tax incidence is derived, and how points
/// are awarded.
#[derive(Debug, Clone, Serialize)]
pub struct Explainer {
    pub demand: ConceptSection,
    pub supply: ConceptSection,
    pub incidence: IncidenceSection,
    pub scoring: ScoringSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConceptSection {
    pub title: &'static str,
    pub summary: &'static str,
    pub ranges: Vec<RangeNote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeNote {
    pub range: &'static str,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidenceSection {
    pub title: &'static str,
    pub summary: &'static str,
    pub formula: &'static str,
    pub notes: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringSection {
    pub title: &'static str,
    pub summary: &'static str,
    pub awards: Vec<AwardNote>,
    pub max_question_points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwardNote {
    pub quantity: &'static str,
    pub max_points: u32,
}

impl Explainer {
    pub fn standard() -> Self {
        Self {
            demand: ConceptSection {
                title: "Price Elasticity of Demand",
                summary: "How much consumers change their purchasing when prices change: \
                          consumer sensitivity to price. Always negative, since a higher \
                          price lowers the quantity demanded.",
                ranges: vec![
                    RangeNote {
                        range: "-0.1 to -0.5",
                        note: "Inelastic (necessities, addictions)",
                    },
                    RangeNote {
                        range: "-0.5 to -1.5",
                        note: "Moderate elasticity",
                    },
                    RangeNote {
                        range: "-1.5 to -5",
                        note: "Very elastic (luxuries, many substitutes)",
                    },
                ],
            },
            supply: ConceptSection {
                title: "Price Elasticity of Supply",
                summary: "How much producers change their output when prices change: \
                          producer flexibility. Always non-negative, since a higher price \
                          draws out more supply.",
                ranges: vec![
                    RangeNote {
                        range: "0 to 0.5",
                        note: "Inelastic (hard to increase production)",
                    },
                    RangeNote {
                        range: "0.5 to 1.5",
                        note: "Moderate elasticity",
                    },
                    RangeNote {
                        range: "1.5+",
                        note: "Very elastic (easy to ramp up production)",
                    },
                ],
            },
            incidence: IncidenceSection {
                title: "Tax Incidence (Who Really Pays?)",
                summary: "When a tariff or tax is imposed, the burden splits between buyers \
                          and sellers according to their relative flexibility.",
                formula: "buyer's share = supply elasticity / (|demand elasticity| + supply elasticity)",
                notes: vec![
                    "A share of 0.8 means buyers pay 80% of the tax through higher prices.",
                    "A share of 0.2 means sellers absorb 80% of the tax.",
                    "The less flexible party (lower elasticity) bears more of the burden.",
                ],
            },
            scoring: ScoringSection {
                title: "Scoring",
                summary: "Points decay exponentially with the distance between your guess \
                          and the reference value. The closer the guess, the more points.",
                awards: vec![
                    AwardNote {
                        quantity: "demand elasticity",
                        max_points: scoring::DEMAND_MAX_POINTS,
                    },
                    AwardNote {
                        quantity: "supply elasticity",
                        max_points: scoring::SUPPLY_MAX_POINTS,
                    },
                    AwardNote {
                        quantity: "tax incidence",
                        max_points: scoring::INCIDENCE_MAX_POINTS,
                    },
                ],
                max_question_points: scoring::MAX_QUESTION_POINTS,
            },
        }
    }
}
