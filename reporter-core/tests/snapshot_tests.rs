//! Integration tests for core report and request types.

use reporter_core::{
    DateParams, OperationKind, Report, ReporterError, RequestDescriptor, RequestParams, Value,
};

#[test]
fn test_report_json_shape_is_stable() {
    let mut report = Report::new(vec!["Provider".to_string(), "Units".to_string()]).unwrap();
    report.push_row(vec!["APPLE".into(), 12.into()]).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert_eq!(
        json,
        r#"{"columns":["Provider","Units"],"rows":[{"Provider":"APPLE","Units":12}]}"#
    );
}

#[test]
fn test_empty_report_serializes_without_rows() {
    let report = Report::new(vec!["a".to_string()]).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_descriptor_for_vendor_list_needs_nothing() {
    let desc = RequestDescriptor::build(OperationKind::VendorList, RequestParams::new()).unwrap();
    assert_eq!(desc.command(), "getVendors");
    assert_eq!(desc.vendor_id(), None);
}

#[test]
fn test_invalid_request_is_reported_before_anything_else() {
    let err = RequestDescriptor::build(
        OperationKind::ReportFetch,
        RequestParams::new().vendor("V1").date(DateParams::sales("2024").unwrap()),
    )
    .unwrap_err();
    assert!(matches!(err, ReporterError::InvalidRequest(ref m) if m.contains("report name")));
}

#[test]
fn test_value_accessors() {
    assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
    assert_eq!(Value::Float(2.5).as_i64(), None);
    assert_eq!(Value::from("x").as_str(), Some("x"));
}
