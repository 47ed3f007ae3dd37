//! Common test utilities for integration tests

use std::io::{Cursor, Write};

/// Actual total load for one zone: PT60M from 2024-01-01T00:00Z, quantities 10/20/30.
#[allow(dead_code)]
pub const LOAD_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
  <mRID>6b6b8f7e3c9d4d9b</mRID>
  <revisionNumber>1</revisionNumber>
  <type>A65</type>
  <process.processType>A16</process.processType>
  <createdDateTime>2024-01-02T10:00:00Z</createdDateTime>
  <time_Period.timeInterval>
    <start>2024-01-01T00:00Z</start>
    <end>2024-01-01T03:00Z</end>
  </time_Period.timeInterval>
  <TimeSeries>
    <mRID>1</mRID>
    <businessType>A04</businessType>
    <objectAggregation>A01</objectAggregation>
    <outBiddingZone_Domain.mRID codingScheme="A01">10YCZ-CEPS-----N</outBiddingZone_Domain.mRID>
    <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>
    <curveType>A01</curveType>
    <Period>
      <timeInterval>
        <start>2024-01-01T00:00Z</start>
        <end>2024-01-01T03:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>2</position><quantity>20</quantity></Point>
      <Point><position>1</position><quantity>10</quantity></Point>
      <Point><position>3</position><quantity>30</quantity></Point>
    </Period>
  </TimeSeries>
</GL_MarketDocument>"#;

/// Day-ahead prices with a gap at position 2.
#[allow(dead_code)]
pub const PRICE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <mRID>prices-1</mRID>
  <type>A44</type>
  <TimeSeries>
    <mRID>1</mRID>
    <businessType>A62</businessType>
    <in_Domain.mRID codingScheme="A01">10YCZ-CEPS-----N</in_Domain.mRID>
    <out_Domain.mRID codingScheme="A01">10YCZ-CEPS-----N</out_Domain.mRID>
    <currency_Unit.name>EUR</currency_Unit.name>
    <Period>
      <timeInterval>
        <start>2023-12-31T23:00Z</start>
        <end>2024-01-01T23:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>85.23</price.amount></Point>
      <Point><position>3</position><price.amount>-1.5</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#;

/// Acknowledgement for a query that matched nothing.
#[allow(dead_code)]
pub const NO_DATA_ACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
  <mRID>ack-1</mRID>
  <createdDateTime>2024-01-02T10:00:00Z</createdDateTime>
  <Reason>
    <code>999</code>
    <text>No matching data found for Data item ACTUAL_TOTAL_LOAD_R3 [17.1.A] (10YCZ-CEPS-----N) and interval 2024-01-01T00:00:00.000Z/2024-01-02T00:00:00.000Z.</text>
  </Reason>
</Acknowledgement_MarketDocument>"#;

/// Acknowledgement rejecting the query for a reason other than missing data.
#[allow(dead_code)]
pub const REJECTED_ACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
  <mRID>ack-2</mRID>
  <Reason>
    <code>999</code>
    <text>The amount of requested data exceeds allowed limit.</text>
  </Reason>
</Acknowledgement_MarketDocument>"#;

/// Builds a load document with `series` × `periods` × `points` points.
///
/// Series `s`, period `m` starts on day `m + 1` of January 2024 at a PT15M resolution;
/// the quantity of point `k` is `s * 100 + m * 10 + k`.
#[allow(dead_code)]
pub fn synthetic_document(series: usize, periods: usize, points: usize) -> String {
    let mut xml = String::from("<GL_MarketDocument><mRID>synthetic</mRID><type>A65</type>");
    for s in 0..series {
        xml.push_str(&format!("<TimeSeries><mRID>{}</mRID>", s + 1));
        for m in 0..periods {
            xml.push_str(&format!(
                "<Period><timeInterval><start>2024-01-{:02}T00:00Z</start>\
                 <end>2024-01-{:02}T00:00Z</end></timeInterval><resolution>PT15M</resolution>",
                m + 1,
                m + 2
            ));
            for k in 1..=points {
                xml.push_str(&format!(
                    "<Point><position>{k}</position><quantity>{}</quantity></Point>",
                    s * 100 + m * 10 + k
                ));
            }
            xml.push_str("</Period>");
        }
        xml.push_str("</TimeSeries>");
    }
    xml.push_str("</GL_MarketDocument>");
    xml
}

/// Builds an in-memory ZIP archive with the given entries.
#[allow(dead_code)]
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
