//! Vendor and region listing parsers.
//!
//! In `Robot.XML` mode the service answers with `<Vendors>` and
//! `<VendorsAndRegions>` documents. In `Normal` mode the vendor list is one
//! identifier per line.

use reporter_core::{Region, ReporterError, VendorRegions};
use tracing::debug;

use crate::xml::{
    self, NUMBER_RE, REGION_BLOCK_RE, REPORT_RE, VENDOR_BLOCK_RE, VENDOR_ID_RE,
};

/// Parses a vendor list answer.
///
/// # Errors
///
/// Returns `ReporterError::MalformedResponse` for an XML document that is
/// not a vendor list, including a service `<Error>` document.
pub fn parse_vendor_list(text: &str) -> Result<Vec<String>, ReporterError> {
    let vendors = if xml::looks_like_xml(text) {
        expect_root(text, "Vendors")?;
        xml::all(&VENDOR_ID_RE, text)
    } else {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    };

    debug!(count = vendors.len(), "Parsed vendor list");
    Ok(vendors)
}

/// Parses a vendors-and-regions answer.
///
/// # Errors
///
/// Returns `ReporterError::MalformedResponse` if the answer is not a
/// `<VendorsAndRegions>` document, or a vendor or region lacks its number or
/// code.
pub fn parse_vendors_and_regions(text: &str) -> Result<Vec<VendorRegions>, ReporterError> {
    if !xml::looks_like_xml(text) {
        return Err(ReporterError::malformed(
            "vendors and regions answer is not XML",
        ));
    }
    expect_root(text, "VendorsAndRegions")?;

    let mut vendors = Vec::new();
    for block in xml::blocks(&VENDOR_BLOCK_RE, text) {
        let vendor_id = xml::first(&NUMBER_RE, block)
            .ok_or_else(|| ReporterError::malformed("vendor without a <Number>"))?;

        let regions = xml::blocks(&REGION_BLOCK_RE, block)
            .into_iter()
            .map(parse_region)
            .collect::<Result<Vec<_>, _>>()?;

        vendors.push(VendorRegions { vendor_id, regions });
    }

    debug!(count = vendors.len(), "Parsed vendors and regions");
    Ok(vendors)
}

fn parse_region(block: &str) -> Result<Region, ReporterError> {
    let code = xml::first(&xml::CODE_RE, block)
        .ok_or_else(|| ReporterError::malformed("region without a <Code>"))?;
    Ok(Region {
        code,
        reports: xml::all(&REPORT_RE, block),
    })
}

fn expect_root(text: &str, expected: &str) -> Result<(), ReporterError> {
    if let Some(err) = xml::parse_service_error(text) {
        let code = err.code.map(|c| format!(" {c}")).unwrap_or_default();
        return Err(ReporterError::malformed(format!(
            "service error{code}: {}",
            err.message
        )));
    }
    match xml::root_name(text) {
        Some(root) if root == expected => Ok(()),
        Some(root) => Err(ReporterError::malformed(format!(
            "expected <{expected}>, found <{root}>"
        ))),
        None => Err(ReporterError::malformed(format!("expected <{expected}>"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VENDORS_AND_REGIONS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<VendorsAndRegions>
    <Vendor>
        <Number>80012345</Number>
        <Region>
            <Code>US</Code>
            <Reports>
                <Report>Financial</Report>
            </Reports>
        </Region>
        <Region>
            <Code>JP</Code>
            <Reports>
                <Report>Financial</Report>
            </Reports>
        </Region>
    </Vendor>
    <Vendor>
        <Number>80067891</Number>
        <Region>
            <Code>US</Code>
            <Reports>
                <Report>Financial</Report>
            </Reports>
        </Region>
    </Vendor>
</VendorsAndRegions>
"#;

    #[test]
    fn test_vendor_list_xml() {
        let text = "<?xml version=\"1.0\"?>\n<Vendors>\n<Vendor>80012345</Vendor><Vendor>80067891</Vendor>\n</Vendors>\n";
        assert_eq!(parse_vendor_list(text).unwrap(), vec!["80012345", "80067891"]);
    }

    #[test]
    fn test_vendor_list_lines() {
        let text = "80012345\r\n\n80067891\n";
        assert_eq!(parse_vendor_list(text).unwrap(), vec!["80012345", "80067891"]);
    }

    #[test]
    fn test_vendor_list_keeps_duplicates() {
        assert_eq!(parse_vendor_list("1\n1\n").unwrap(), vec!["1", "1"]);
    }

    #[test]
    fn test_empty_vendor_list() {
        assert!(parse_vendor_list("<Vendors></Vendors>").unwrap().is_empty());
    }

    #[test]
    fn test_error_document_is_malformed() {
        let text = "<Error><Code>101</Code><Message>Invalid command.</Message></Error>";
        let err = parse_vendor_list(text).unwrap_err();
        assert!(matches!(err, ReporterError::MalformedResponse(ref m) if m.contains("101")));
    }

    #[test]
    fn test_vendors_and_regions() {
        let vendors = parse_vendors_and_regions(VENDORS_AND_REGIONS).unwrap();
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].vendor_id, "80012345");
        let codes: Vec<_> = vendors[0].regions.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["US", "JP"]);
        assert_eq!(vendors[1].regions[0].reports, vec!["Financial"]);
    }

    #[test]
    fn test_vendors_and_regions_requires_xml() {
        assert!(matches!(
            parse_vendors_and_regions("80012345\n"),
            Err(ReporterError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_vendors_and_regions("<Vendors></Vendors>"),
            Err(ReporterError::MalformedResponse(ref m)) if m.contains("<Vendors>")
        ));
    }

    #[test]
    fn test_region_without_code_is_malformed() {
        let text = "<VendorsAndRegions><Vendor><Number>1</Number><Region><Reports/></Region></Vendor></VendorsAndRegions>";
        assert!(parse_vendors_and_regions(text).is_err());
    }
}
