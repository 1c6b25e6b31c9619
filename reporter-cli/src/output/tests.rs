//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use chrono::NaiveDate;
    use reporter_core::{AccessToken, Region, Report, VendorRegions};

    fn vendors() -> Vec<VendorRegions> {
        vec![VendorRegions {
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
        }]
    }

    #[test]
    fn test_token_with_expiry() {
        let token =
            AccessToken::new("abc").with_expiry(NaiveDate::from_ymd_opt(2024, 9, 24).unwrap());
        assert_eq!(TextFormatter::new().format_token(&token), "abc\texpires 2024-09-24");
        assert_eq!(TextFormatter::new().format_token(&AccessToken::new("abc")), "abc");
    }

    #[test]
    fn test_list_one_per_line() {
        let items = vec!["1".to_string(), "2".to_string()];
        assert_eq!(TextFormatter::new().format_list(&items), "1\n2");
        assert_eq!(TextFormatter::new().format_list(&[]), "");
    }

    #[test]
    fn test_regions_lines() {
        assert_eq!(
            TextFormatter::new().format_regions(&vendors()),
            "80012345\tUS\tFinancial\n80012345\tJP\tFinancial,Detail"
        );
    }

    #[test]
    fn test_report_is_tsv() {
        let mut report = Report::new(vec!["a".to_string(), "b".to_string()]).unwrap();
        report.push_row(vec!["x".into(), 1.into()]).unwrap();
        assert_eq!(TextFormatter::new().format_report(&report), "a\tb\nx\t1\n");
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use reporter_core::{AccessToken, Report};

    #[test]
    fn test_token_json() {
        let json = JsonFormatter::new(false)
            .format_token(&AccessToken::new("abc"))
            .unwrap();
        assert_eq!(json, r#"{"accessToken":"abc"}"#);
    }

    #[test]
    fn test_reports_json() {
        let reports = vec!["Financial".to_string()];
        let json = JsonFormatter::new(false)
            .format_reports("80012345", &reports)
            .unwrap();
        assert_eq!(json, r#"{"vendor":"80012345","reports":["Financial"]}"#);
    }

    #[test]
    fn test_report_json_pretty() {
        let mut report = Report::new(vec!["n".to_string()]).unwrap();
        report.push_row(vec![2.into()]).unwrap();
        let json = JsonFormatter::new(true).format_report(&report).unwrap();
        assert!(json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"][0]["n"], 2);
    }
}
