use super::archive::{is_zip, unpack_xml_documents};
use super::document::{parse_document, ResponseDocument};
use super::series::{walk_document, SeriesGroup};
use super::table::Table;
use crate::errors::AppResult;
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

/// Normalizes a provider response into a table with one row per point.
///
/// `raw` is either a single XML document or a ZIP archive of XML documents. Archive
/// entries are normalized in parallel and concatenated in archive order.
///
/// # Errors
///
/// * `NoDataError` / `ProviderError` when the body is an acknowledgement document
/// * `MalformedResponseError` for unparsable XML, unknown roots, missing period
///   fields or invalid numeric values
/// * `UnsupportedResolutionError` for resolutions outside the supported set
pub fn normalize(raw: &[u8], flatten: bool) -> AppResult<Table> {
    let start = Instant::now();
    let groups = parse_groups(raw)?;
    let table = Table::from_groups(groups, flatten)?;
    debug!(
        rows = table.height(),
        flatten,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Normalized response"
    );
    Ok(table)
}

/// Walks every document in `raw` and returns their series in order.
pub fn parse_groups(raw: &[u8]) -> AppResult<Vec<SeriesGroup>> {
    if !is_zip(raw) {
        return parse_single(raw);
    }

    let documents = unpack_xml_documents(raw)?;
    let per_document = documents
        .par_iter()
        .map(|(name, body)| {
            let groups = parse_single(body)?;
            debug!(entry = %name, series = groups.len(), "Parsed archive entry");
            Ok(groups)
        })
        .collect::<AppResult<Vec<Vec<SeriesGroup>>>>()?;

    Ok(per_document.into_iter().flatten().collect())
}

fn parse_single(content: &[u8]) -> AppResult<Vec<SeriesGroup>> {
    match parse_document(content)? {
        ResponseDocument::Data(root) => walk_document(&root),
        ResponseDocument::Acknowledgement(ack) => Err(ack.into_error()),
    }
}
