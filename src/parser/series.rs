use super::resolution::Resolution;
use super::xml_tree::XmlElement;
use crate::constants::{PERIOD_TAGS, POINT_TAG, TIME_SERIES_TAG};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;

/// A point-level value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// One `Point`: its position, computed timestamp and measured fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub position: u32,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<(String, FieldValue)>,
}

/// One `Period` (or `Available_Period`) with its points ordered by position.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodGroup {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub resolution: Resolution,
    /// Period children other than `timeInterval`, `resolution` and `Point`
    pub attributes: Vec<XmlElement>,
    pub points: Vec<PointRecord>,
}

/// One `TimeSeries` with the document-level attributes it inherits.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    /// Document-level children (`mRID`, `type`, `time_Period`, ...) other than series
    pub document: Vec<XmlElement>,
    /// Series children other than periods, kept as nested elements
    pub attributes: Vec<XmlElement>,
    pub periods: Vec<PeriodGroup>,
}

fn is_period(element: &XmlElement) -> bool {
    PERIOD_TAGS.contains(&element.name.as_str())
}

/// Walks a market document: document → series → period → point.
///
/// Document types differ only in which optional elements appear; the walk is the
/// same for all of them. A document without `TimeSeries` yields an empty vector.
pub fn walk_document(root: &XmlElement) -> AppResult<Vec<SeriesGroup>> {
    let document: Vec<XmlElement> = root
        .children
        .iter()
        .filter(|c| c.name != TIME_SERIES_TAG)
        .cloned()
        .collect();

    root.children
        .iter()
        .filter(|c| c.name == TIME_SERIES_TAG)
        .map(|series| walk_series(series, &document))
        .collect()
}

fn walk_series(series: &XmlElement, document: &[XmlElement]) -> AppResult<SeriesGroup> {
    let attributes = series
        .children
        .iter()
        .filter(|c| !is_period(c))
        .cloned()
        .collect();

    let periods = series
        .children
        .iter()
        .filter(|c| is_period(c))
        .map(walk_period)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(SeriesGroup {
        document: document.to_vec(),
        attributes,
        periods,
    })
}

fn walk_period(period: &XmlElement) -> AppResult<PeriodGroup> {
    let start = parse_instant(required_text(period, &["timeInterval", "start"])?)?;
    let end = parse_instant(required_text(period, &["timeInterval", "end"])?)?;
    let resolution: Resolution = required_text(period, &["resolution"])?.parse()?;

    let attributes = period
        .children
        .iter()
        .filter(|c| !matches!(c.name.as_str(), "timeInterval" | "resolution") && c.name != POINT_TAG)
        .cloned()
        .collect();

    let mut points = period
        .children
        .iter()
        .filter(|c| c.name == POINT_TAG)
        .map(|point| walk_point(point, start, resolution))
        .collect::<AppResult<Vec<_>>>()?;
    // Stable: repeated positions keep provider order
    points.sort_by_key(|p| p.position);

    Ok(PeriodGroup {
        start,
        end,
        resolution,
        attributes,
        points,
    })
}

fn walk_point(
    point: &XmlElement,
    start: DateTime<Utc>,
    resolution: Resolution,
) -> AppResult<PointRecord> {
    let raw_position = required_text(point, &["position"])?;
    let position: u32 = raw_position
        .parse()
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| {
            AppError::MalformedResponseError(format!("Invalid point position: {raw_position}"))
        })?;
    let timestamp = resolution.advance(start, position - 1)?;

    let mut raw_fields = Vec::new();
    flatten_indexed(
        point.children.iter().filter(|c| c.name != "position"),
        "",
        &mut raw_fields,
    );

    let fields = raw_fields
        .into_iter()
        .map(|(name, text)| {
            let value = if is_numeric_field(&name) {
                FieldValue::Number(parse_number(&name, &text)?)
            } else {
                FieldValue::Text(text)
            };
            Ok((name, value))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(PointRecord {
        position,
        timestamp,
        fields,
    })
}

/// Quantities and price amounts are numeric; everything else stays text.
fn is_numeric_field(name: &str) -> bool {
    let leaf = name.rsplit('.').next().unwrap_or(name);
    // Drop a repeat index such as `amount[2]`
    let leaf = leaf.split('[').next().unwrap_or(leaf).to_ascii_lowercase();
    leaf.ends_with("quantity") || leaf == "amount"
}

fn parse_number(name: &str, text: &str) -> AppResult<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            AppError::MalformedResponseError(format!(
                "Field '{name}' has a non-numeric value: '{text}'"
            ))
        })
}

fn required_text<'a>(element: &'a XmlElement, path: &[&str]) -> AppResult<&'a str> {
    element.text_at(path).ok_or_else(|| {
        AppError::MalformedResponseError(format!(
            "<{}> is missing {}",
            element.name,
            path.join("/")
        ))
    })
}

/// Parses provider instants such as `2024-01-01T00:00Z` or `2024-01-01T00:00:00Z`.
pub fn parse_instant(text: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%MZ")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::MalformedResponseError(format!("Invalid timestamp: {text}")))
}

/// Flattens an element into dotted `name -> text` pairs.
///
/// Leaves map to their (possibly empty) text; nested blocks recurse with their name
/// as prefix. A name seen twice is joined with `"; "` in document order.
pub fn flatten_element(element: &XmlElement, prefix: &str, out: &mut Vec<(String, String)>) {
    let name = format!("{prefix}{}", element.name);
    if element.is_leaf() {
        let text = element.text.clone().unwrap_or_default();
        match out.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, value)) => {
                value.push_str("; ");
                value.push_str(&text);
            }
            None => out.push((name, text)),
        }
        return;
    }
    let nested_prefix = format!("{name}.");
    for child in &element.children {
        flatten_element(child, &nested_prefix, out);
    }
}

/// Flattens point children into dotted `name -> text` pairs without merging repeats.
///
/// The n-th sibling (n >= 2) sharing a name is suffixed `[n]`, so two `Financial_Price`
/// blocks give `Financial_Price.amount` and `Financial_Price[2].amount`. Each leaf keeps
/// its own text and is parsed on its own.
fn flatten_indexed<'a>(
    elements: impl IntoIterator<Item = &'a XmlElement>,
    prefix: &str,
    out: &mut Vec<(String, String)>,
) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for element in elements {
        let count = seen.entry(element.name.as_str()).or_insert(0);
        *count += 1;
        let name = if *count == 1 {
            format!("{prefix}{}", element.name)
        } else {
            format!("{prefix}{}[{count}]", element.name)
        };
        if element.is_leaf() {
            out.push((name, element.text.clone().unwrap_or_default()));
        } else {
            flatten_indexed(&element.children, &format!("{name}."), out);
        }
    }
}
