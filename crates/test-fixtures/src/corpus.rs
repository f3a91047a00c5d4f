use std::path::{Path, PathBuf};

/// `topic_NNN`, the one meaningful token of a topic document.
pub fn topic_token(i: usize) -> String {
    format!("topic_{i:03}")
}

/// `n` single-topic documents: "Notes on topic_000", "Notes on topic_001", ...
pub fn topic_documents(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Notes on {}", topic_token(i))).collect()
}

/// A query that embeds exactly like document `i` under `FixtureEmbedder`.
pub fn topic_query(i: usize) -> String {
    format!("notes about {}", topic_token(i))
}

/// Write a CSV file with a header row. Panics on I/O failure.
pub fn write_csv(dir: &Path, file_name: &str, headers: &[&str], rows: &[Vec<String>]) -> PathBuf {
    let path = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path)
        .unwrap_or_else(|e| panic!("failed to create {}: {e}", path.display()));
    writer
        .write_record(headers)
        .unwrap_or_else(|e| panic!("failed to write header: {e}"));
    for row in rows {
        writer
            .write_record(row)
            .unwrap_or_else(|e| panic!("failed to write row: {e}"));
    }
    writer
        .flush()
        .unwrap_or_else(|e| panic!("failed to flush {}: {e}", path.display()));
    path
}
