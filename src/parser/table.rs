use super::series::{flatten_element, FieldValue, SeriesGroup};
use crate::errors::AppResult;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::collections::HashMap;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const PERIOD_START_COLUMN: &str = "period.start";
pub const PERIOD_END_COLUMN: &str = "period.end";
pub const RESOLUTION_COLUMN: &str = "period.resolution";
pub const POSITION_COLUMN: &str = "point.position";

/// Result of normalizing a response.
#[derive(Debug, Clone)]
pub enum Table {
    /// One row per point, attributes broadcast from document, series and period
    Flat(DataFrame),
    /// Series → periods → points, with series attributes kept as element trees
    Nested(Vec<SeriesGroup>),
}

impl Table {
    /// Builds the flat or nested form from walked series.
    pub fn from_groups(groups: Vec<SeriesGroup>, flatten: bool) -> AppResult<Self> {
        if flatten {
            Ok(Self::Flat(rows_to_dataframe(&flatten_groups(&groups))?))
        } else {
            Ok(Self::Nested(groups))
        }
    }

    /// Number of rows (flat) or points (nested).
    pub fn height(&self) -> usize {
        match self {
            Self::Flat(df) => df.height(),
            Self::Nested(groups) => groups
                .iter()
                .flat_map(|g| &g.periods)
                .map(|p| p.points.len())
                .sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Returns the flat DataFrame, flattening the nested form when needed.
    pub fn into_dataframe(self) -> AppResult<DataFrame> {
        match self {
            Self::Flat(df) => Ok(df),
            Self::Nested(groups) => rows_to_dataframe(&flatten_groups(&groups)),
        }
    }

    pub fn as_nested(&self) -> Option<&[SeriesGroup]> {
        match self {
            Self::Nested(groups) => Some(groups),
            Self::Flat(_) => None,
        }
    }
}

/// A single cell of the flat table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Timestamp(instant) => instant.to_rfc3339(),
        }
    }
}

/// Named cells of one output row, in column order of first appearance.
pub type Row = Vec<(String, Cell)>;

fn push_text_cells(row: &mut Row, pairs: Vec<(String, String)>) {
    for (name, text) in pairs {
        // Empty leaves are null cells
        if !text.is_empty() {
            row.push((name, Cell::Text(text)));
        }
    }
}

fn flatten_all<'a>(
    elements: impl IntoIterator<Item = &'a super::xml_tree::XmlElement>,
    prefix: &str,
) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for element in elements {
        flatten_element(element, prefix, &mut out);
    }
    out
}

/// Expands walked series into one row per point.
///
/// Rows keep document series order, then period order, then position order.
pub fn flatten_groups(groups: &[SeriesGroup]) -> Vec<Row> {
    let mut rows = Vec::new();

    for group in groups {
        let mut series_cells = Row::new();
        push_text_cells(&mut series_cells, flatten_all(&group.document, "doc."));
        push_text_cells(&mut series_cells, flatten_all(&group.attributes, "ts."));

        for period in &group.periods {
            let mut period_cells = series_cells.clone();
            period_cells.push((PERIOD_START_COLUMN.to_string(), Cell::Timestamp(period.start)));
            period_cells.push((PERIOD_END_COLUMN.to_string(), Cell::Timestamp(period.end)));
            period_cells.push((
                RESOLUTION_COLUMN.to_string(),
                Cell::Text(period.resolution.to_string()),
            ));
            push_text_cells(&mut period_cells, flatten_all(&period.attributes, "period."));

            for point in &period.points {
                let mut row = period_cells.clone();
                row.push((
                    POSITION_COLUMN.to_string(),
                    Cell::Integer(i64::from(point.position)),
                ));
                row.push((TIMESTAMP_COLUMN.to_string(), Cell::Timestamp(point.timestamp)));
                for (name, value) in &point.fields {
                    let cell = match value {
                        FieldValue::Number(n) => Cell::Number(*n),
                        FieldValue::Text(t) if t.is_empty() => continue,
                        FieldValue::Text(t) => Cell::Text(t.clone()),
                    };
                    row.push((format!("point.{name}"), cell));
                }
                rows.push(row);
            }
        }
    }

    rows
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Number,
    Integer,
    Timestamp,
}

fn kind_of(cell: &Cell) -> ColumnKind {
    match cell {
        Cell::Text(_) => ColumnKind::Text,
        Cell::Number(_) => ColumnKind::Number,
        Cell::Integer(_) => ColumnKind::Integer,
        Cell::Timestamp(_) => ColumnKind::Timestamp,
    }
}

fn build_series(name: &str, kind: ColumnKind, cells: &[Option<&Cell>]) -> AppResult<Series> {
    let series = match kind {
        ColumnKind::Number => Series::new(
            name,
            cells
                .iter()
                .map(|c| match c {
                    Some(Cell::Number(v)) => Some(*v),
                    _ => None,
                })
                .collect::<Vec<Option<f64>>>(),
        ),
        ColumnKind::Integer => Series::new(
            name,
            cells
                .iter()
                .map(|c| match c {
                    Some(Cell::Integer(v)) => Some(*v),
                    _ => None,
                })
                .collect::<Vec<Option<i64>>>(),
        ),
        ColumnKind::Timestamp => Series::new(
            name,
            cells
                .iter()
                .map(|c| match c {
                    Some(Cell::Timestamp(t)) => Some(t.timestamp_millis()),
                    _ => None,
                })
                .collect::<Vec<Option<i64>>>(),
        )
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        ColumnKind::Text => Series::new(
            name,
            cells
                .iter()
                .map(|c| c.map(Cell::render))
                .collect::<Vec<Option<String>>>(),
        ),
    };
    Ok(series)
}

fn empty_frame() -> AppResult<DataFrame> {
    let columns = [
        (PERIOD_START_COLUMN, ColumnKind::Timestamp),
        (PERIOD_END_COLUMN, ColumnKind::Timestamp),
        (RESOLUTION_COLUMN, ColumnKind::Text),
        (POSITION_COLUMN, ColumnKind::Integer),
        (TIMESTAMP_COLUMN, ColumnKind::Timestamp),
    ];
    let series = columns
        .iter()
        .map(|(name, kind)| build_series(name, *kind, &[]))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(DataFrame::new(series)?)
}

/// Converts rows into a rectangular DataFrame.
///
/// The column set is the union of all cell names in first-seen order; missing cells are
/// null. A column whose cells disagree on type falls back to text.
pub fn rows_to_dataframe(rows: &[Row]) -> AppResult<DataFrame> {
    if rows.is_empty() {
        return empty_frame();
    }

    let mut names: Vec<&str> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        for (name, _) in row {
            if !index.contains_key(name.as_str()) {
                index.insert(name.as_str(), names.len());
                names.push(name.as_str());
            }
        }
    }

    let mut grid: Vec<Vec<Option<&Cell>>> = vec![vec![None; rows.len()]; names.len()];
    for (r, row) in rows.iter().enumerate() {
        for (name, cell) in row {
            grid[index[name.as_str()]][r] = Some(cell);
        }
    }

    let series = names
        .iter()
        .zip(&grid)
        .map(|(name, cells)| {
            let mut kinds = cells.iter().flatten().map(|c| kind_of(c));
            let first = kinds.next().unwrap_or(ColumnKind::Text);
            let kind = if kinds.all(|k| k == first) {
                first
            } else {
                ColumnKind::Text
            };
            build_series(name, kind, cells)
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(DataFrame::new(series)?)
}
