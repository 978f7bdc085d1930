//! Transcript CSV writer.
//!
//! Output is UTF-8 with a leading byte-order mark so spreadsheet tools open
//! non-ASCII diary text correctly.

use std::path::Path;

use coach_models::TranscriptEntry;
use tracing::info;

use crate::atomic::atomic_write;
use crate::error::Result;

/// UTF-8 byte-order mark written at the start of the transcript.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Transcript column names in output order.
pub const TRANSCRIPT_COLUMNS: [&str; 5] = ["batch_start", "batch_end", "source", "content", "type"];

/// Serialize transcript rows to CSV bytes, BOM and header included.
pub fn encode_transcript(entries: &[TranscriptEntry]) -> Result<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);
        writer.write_record(TRANSCRIPT_COLUMNS)?;
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buf)
}

/// Write the transcript to `path` atomically.
///
/// An empty transcript still produces a file with the header row.
pub fn write_transcript(path: &Path, entries: &[TranscriptEntry]) -> Result<()> {
    let data = encode_transcript(entries)?;
    atomic_write(path, &data)?;
    info!(path = %path.display(), rows = entries.len(), "Wrote transcript");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn entry(source: &str, content: &str) -> TranscriptEntry {
        TranscriptEntry {
            batch_start: 0,
            batch_end: 499,
            source: source.into(),
            content: content.into(),
            kind: "TextMessage".into(),
        }
    }

    #[test]
    fn test_encode_starts_with_bom_and_header() {
        let bytes = encode_transcript(&[]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "batch_start,batch_end,source,content,type\n");
    }

    #[test]
    fn test_encode_quotes_multiline_content() {
        let bytes = encode_transcript(&[entry("coaching_agent", "第一點,\n第二點")]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();

        assert_eq!(
            text,
            "batch_start,batch_end,source,content,type\n\
             0,499,coaching_agent,\"第一點,\n第二點\",TextMessage\n"
        );
    }

    #[test]
    fn test_write_transcript_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("positive_thinking_log.csv");
        let entries = vec![entry("user", "task"), entry("data_agent", "summary")];

        write_transcript(&path, &entries).unwrap();

        let raw = fs::read(&path).unwrap();
        let mut reader = csv::Reader::from_reader(&raw[UTF8_BOM.len()..]);
        let rows: Vec<TranscriptEntry> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, entries);
    }
}
