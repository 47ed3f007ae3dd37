mod archive;
mod document;
mod normalizer;
mod resolution;
mod series;
mod table;
mod xml_tree;

// Re-export public API
pub use archive::{is_zip, unpack_xml_documents};
pub use document::{parse_document, Acknowledgement, Reason, ResponseDocument};
pub use normalizer::{normalize, parse_groups};
pub use resolution::Resolution;
pub use series::{parse_instant, FieldValue, PeriodGroup, PointRecord, SeriesGroup};
pub use table::{
    flatten_groups, rows_to_dataframe, Cell, Row, Table, PERIOD_END_COLUMN, PERIOD_START_COLUMN,
    POSITION_COLUMN, RESOLUTION_COLUMN, TIMESTAMP_COLUMN,
};
pub use xml_tree::{parse_tree, peek_root_name, XmlElement};
