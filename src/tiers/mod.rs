//! Fixed sponsorship tier table.

/// The literal tier id that carries an operator-entered amount and note.
pub const CUSTOM_TIER_ID: &str = "custom";

/// A named sponsorship pricing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub id: &'static str,
    pub name: &'static str,
    pub price: i64,
}

/// Enumerated tiers, highest value first. Mirrors the public form's options.
pub const TIERS: [Tier; 5] = [
    Tier { id: "naming-rights", name: "Naming Rights", price: 5000 },
    Tier { id: "platinum", name: "Platinum", price: 2000 },
    Tier { id: "gold", name: "Gold", price: 1000 },
    Tier { id: "silver", name: "Silver", price: 500 },
    Tier { id: "bronze", name: "Bronze", price: 300 },
];

/// Resolve a tier id to its canonical entry. `custom` is not in the table;
/// callers resolve it with the operator-supplied amount and note.
pub fn resolve(tier_id: &str) -> Option<Tier> {
    TIERS.iter().copied().find(|t| t.id == tier_id)
}
