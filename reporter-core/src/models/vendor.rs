//! Vendor listing types.

use serde::{Deserialize, Serialize};

/// A region under a vendor and the financial reports available for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region code, such as `US` or `JP`.
    pub code: String,
    /// Report types available in this region.
    pub reports: Vec<String>,
}

/// A vendor with its financial regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRegions {
    /// Vendor number.
    pub vendor_id: String,
    /// Regions in service order.
    pub regions: Vec<Region>,
}

impl VendorRegions {
    /// Distinct report names across all regions, in first-seen order.
    pub fn report_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for report in self.regions.iter().flat_map(|r| r.reports.iter()) {
            if !names.contains(report) {
                names.push(report.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_names_are_distinct_and_ordered() {
        let vendor = VendorRegions {
            vendor_id: "80012345".to_string(),
            regions: vec![
                Region {
                    code: "US".to_string(),
                    reports: vec!["Financial".to_string()],
                },
                Region {
                    code: "JP".to_string(),
                    reports: vec!["Financial".to_string(), "Detail".to_string()],
                },
            ],
        };
        assert_eq!(vendor.report_names(), vec!["Financial", "Detail"]);
    }
}
