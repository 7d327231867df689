use super::domain::GoodRecord;

/// Built-in reference goods with textbook-style elasticity estimates, so the
/// service can start without an external dataset file.
pub(crate) fn standard_goods() -> Vec<GoodRecord> {
    [
        ("Crude Oil", -0.4, 0.15),
        ("Gasoline", -0.25, 0.6),
        ("Cigarettes", -0.45, 1.0),
        ("Insulin", -0.05, 0.3),
        ("Electricity", -0.3, 0.4),
        ("Salt", -0.1, 0.7),
        ("Coffee", -0.55, 0.8),
        ("Movie Tickets", -0.9, 2.5),
        ("Fresh Tomatoes", -1.2, 2.2),
        ("Air Travel", -1.5, 0.9),
        ("Restaurant Meals", -2.3, 1.8),
        ("Luxury Cars", -3.0, 1.4),
    ]
    .iter()
    .map(|(name, demand, supply)| GoodRecord {
        name: (*name).to_string(),
        demand_elasticity: *demand,
        supply_elasticity: *supply,
    })
    .collect()
}
