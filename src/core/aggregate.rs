use crate::core::language::detect_language;
use crate::core::{VideoRecord, VideoRow, CSV_HEADERS};
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::path::Path;
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output order: year ascending (as text), views descending with missing
/// views last, comment count descending, then video id.
pub fn compare_records(a: &VideoRecord, b: &VideoRecord) -> Ordering {
    a.year
        .cmp(&b.year)
        .then_with(|| match (a.views, b.views) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.comment_count.cmp(&a.comment_count))
        .then_with(|| a.video_id.cmp(&b.video_id))
}

/// Sorts records and attaches the detected title language.
pub fn aggregate(mut records: Vec<VideoRecord>) -> Vec<VideoRow> {
    records.sort_by(compare_records);
    records
        .into_iter()
        .map(|record| {
            let language = detect_language(record.video_title.as_deref().unwrap_or_default());
            VideoRow::new(record, language)
        })
        .collect()
}

/// CSV bytes, BOM first. The header row is written even for an empty table.
pub fn to_csv_bytes(rows: &[VideoRow]) -> Result<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);
        writer.write_record(CSV_HEADERS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// Writes the table to `path`, replacing any existing file.
pub async fn write_csv(path: &Path, rows: &[VideoRow]) -> Result<()> {
    let bytes = to_csv_bytes(rows)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    if tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false) {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to remove old {}", path.display()))?;
    }

    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
