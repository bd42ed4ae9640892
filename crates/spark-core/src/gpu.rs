use serde::{Deserialize, Serialize};

/// GPU offer from the backend catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gpu {
    pub id: String,
    pub name: String,
    /// VRAM label, e.g. "24GB"
    pub vram: String,
    /// Hourly cost in dollars
    pub cost: f64,
    pub available: bool,
    /// Estimated training time label, e.g. "2h 15m"
    pub estimated_time: String,
}

impl Gpu {
    /// Estimated hours parsed from the time label, 1.0 when unparseable
    pub fn estimated_hours(&self) -> f64 {
        parse_duration_hours(&self.estimated_time).unwrap_or(1.0)
    }

    /// Estimated job cost in dollars
    pub fn estimated_cost(&self) -> f64 {
        self.estimated_hours() * self.cost
    }
}

/// Parse labels like "2h 15m", "45m" or "3h" into fractional hours.
pub fn parse_duration_hours(label: &str) -> Option<f64> {
    let mut hours = 0.0;
    let mut matched = false;
    for part in label.split_whitespace() {
        let unit_start = part.char_indices().last()?.0;
        let (number, unit) = part.split_at(unit_start);
        let value: f64 = number.parse().ok()?;
        match unit {
            "h" => hours += value,
            "m" => hours += value / 60.0,
            _ => return None,
        }
        matched = true;
    }
    matched.then_some(hours)
}
