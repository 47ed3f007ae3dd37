use crate::errors::{AppError, AppResult};
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// `true` when the body starts with a ZIP local-file header.
pub fn is_zip(content: &[u8]) -> bool {
    content.starts_with(ZIP_MAGIC)
}

/// Reads every `.xml` entry of an in-memory archive, in archive order.
///
/// Directory entries and non-XML files are skipped.
pub fn unpack_xml_documents(content: &[u8]) -> AppResult<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(content)).map_err(|e| {
        AppError::MalformedResponseError(format!("Failed to read ZIP archive: {e}"))
    })?;

    let mut documents = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            AppError::MalformedResponseError(format!("Failed to read entry {i} from ZIP: {e}"))
        })?;
        let name = entry.name().to_string();
        if entry.is_dir() || !name.to_ascii_lowercase().ends_with(".xml") {
            debug!(entry = %name, "Skipping non-XML archive entry");
            continue;
        }

        let mut body = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut body).map_err(|e| {
            AppError::MalformedResponseError(format!("Failed to decompress {name}: {e}"))
        })?;
        documents.push((name, body));
    }

    debug!(documents = documents.len(), "Unpacked ZIP response");
    Ok(documents)
}

#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::FileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
