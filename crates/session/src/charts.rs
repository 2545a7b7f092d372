//! Fixed dataset rendered for chart replies.

pub const CHART_INTRO: &str =
    "Here's the SDM (Service Desk Management) analysis for the last annual maintenance period:";
pub const CATEGORY_CHART_TITLE: &str = "Incident Distribution by Category";
pub const MONTHLY_CHART_TITLE: &str = "Monthly Incident Tracking";
pub const INSIGHTS_HEADING: &str = "Key Insights:";

/// (label, detail) pairs listed under the charts.
pub const KEY_INSIGHTS: [(&str, &str); 5] = [
    (
        "Total Incidents",
        "714 incidents recorded over the annual period",
    ),
    ("Resolution Rate", "97.3% of incidents successfully resolved"),
    (
        "Peak Month",
        "December had the highest incident count with 72 incidents",
    ),
    (
        "Primary Category",
        "Hardware Issues account for 35% of all incidents",
    ),
    (
        "Trend",
        "Steady increase in incident volume during Q4, likely due to year-end operations",
    ),
];

pub const INCIDENTS_COLOR: u32 = 0x3b82f6;
pub const RESOLVED_COLOR: u32 = 0x10b981;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryShare {
    pub name: &'static str,
    pub value: u32,
    /// 0xRRGGBB
    pub color: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyIncidents {
    pub month: &'static str,
    pub incidents: u32,
    pub resolved: u32,
}

pub const INCIDENT_CATEGORIES: [CategoryShare; 5] = [
    CategoryShare {
        name: "Hardware Issues",
        value: 35,
        color: 0x3b82f6,
    },
    CategoryShare {
        name: "Software Problems",
        value: 25,
        color: 0x8b5cf6,
    },
    CategoryShare {
        name: "Network Issues",
        value: 20,
        color: 0x06b6d4,
    },
    CategoryShare {
        name: "User Requests",
        value: 15,
        color: 0x10b981,
    },
    CategoryShare {
        name: "Other",
        value: 5,
        color: 0xf59e0b,
    },
];

const fn month(month: &'static str, incidents: u32, resolved: u32) -> MonthlyIncidents {
    MonthlyIncidents {
        month,
        incidents,
        resolved,
    }
}

pub const MONTHLY_INCIDENTS: [MonthlyIncidents; 12] = [
    month("Jan", 45, 42),
    month("Feb", 52, 50),
    month("Mar", 48, 46),
    month("Apr", 61, 58),
    month("May", 55, 53),
    month("Jun", 58, 57),
    month("Jul", 63, 61),
    month("Aug", 59, 57),
    month("Sep", 67, 65),
    month("Oct", 70, 68),
    month("Nov", 64, 62),
    month("Dec", 72, 70),
];

pub fn monthly_incident_total() -> u32 {
    MONTHLY_INCIDENTS.iter().map(|entry| entry.incidents).sum()
}

pub fn category_total() -> u32 {
    INCIDENT_CATEGORIES.iter().map(|category| category.value).sum()
}

/// Rounded percentage of the category total, as printed on pie slices.
pub fn share_percent(category: &CategoryShare) -> u32 {
    let total = category_total();
    if total == 0 {
        return 0;
    }
    (category.value * 100 + total / 2) / total
}

/// Largest bar value, used to scale the monthly chart.
pub fn monthly_peak() -> u32 {
    MONTHLY_INCIDENTS
        .iter()
        .map(|entry| entry.incidents.max(entry.resolved))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_shares_cover_the_whole_pie() {
        assert_eq!(category_total(), 100);
        let percents: Vec<u32> = INCIDENT_CATEGORIES.iter().map(share_percent).collect();
        assert_eq!(percents, vec![35, 25, 20, 15, 5]);
    }

    #[test]
    fn monthly_series_never_resolves_more_than_reported() {
        assert_eq!(MONTHLY_INCIDENTS.len(), 12);
        assert!(
            MONTHLY_INCIDENTS
                .iter()
                .all(|entry| entry.resolved <= entry.incidents)
        );
        assert_eq!(monthly_peak(), 72);
    }

    #[test]
    fn insights_agree_with_the_series() {
        assert_eq!(monthly_incident_total(), 714);
        let peak = MONTHLY_INCIDENTS
            .iter()
            .max_by_key(|entry| entry.incidents)
            .map(|entry| entry.month);
        assert_eq!(peak, Some("Dec"));
        assert!(KEY_INSIGHTS[0].1.starts_with("714"));
    }
}
