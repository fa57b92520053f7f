use chrono::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationGrant {
    #[serde(default)]
    pub compute_allocated: f64,
    #[serde(default)]
    pub compute_used: f64,
    #[serde(default)]
    pub end: String,
}

/// One system an allocation grants time on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSystem {
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub allocation: AllocationGrant,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub project_name: String,
    #[serde(default)]
    pub pi: String,
    #[serde(default)]
    pub project_id: i64,
    #[serde(default)]
    pub systems: Vec<AllocationSystem>,
}

/// Payload of the allocations endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Allocations {
    #[serde(default)]
    pub active: Vec<Allocation>,
    #[serde(default)]
    pub inactive: Vec<Allocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationsPage {
    #[default]
    Active,
    Expired,
}

impl AllocationsPage {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("expired") {
            AllocationsPage::Expired
        } else {
            AllocationsPage::Active
        }
    }
}

/// Per-system columns of the allocations table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemColumn {
    Systems,
    Awarded,
    Remaining,
    Expires,
}

impl Allocations {
    /// Rows for a page, sorted by project title.
    pub fn rows(&self, page: AllocationsPage) -> Vec<&Allocation> {
        let source = match page {
            AllocationsPage::Active => &self.active,
            AllocationsPage::Expired => &self.inactive,
        };
        let mut rows: Vec<&Allocation> = source.iter().collect();
        rows.sort_by_key(|a| a.project_name.to_lowercase());
        rows
    }
}

impl Allocation {
    /// One cell per system, in the order the backend listed them.
    pub fn column(&self, column: SystemColumn) -> Vec<String> {
        self.systems
            .iter()
            .map(|system| match column {
                SystemColumn::Systems => system.name.clone(),
                SystemColumn::Awarded => format_units(system.allocation.compute_allocated),
                SystemColumn::Remaining => {
                    format_units((system.allocation.compute_allocated - system.allocation.compute_used).max(0.0))
                }
                SystemColumn::Expires => format_expiry(&system.allocation.end),
            })
            .collect()
    }
}

fn format_units(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn format_expiry(end: &str) -> String {
    DateTime::parse_from_rfc3339(end)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| end.to_string())
}
