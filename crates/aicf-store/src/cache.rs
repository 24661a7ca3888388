//! The content-addressed staging cache: `.cache/llm/<source>/chunk-<N>.json`.
//!
//! Chunks are immutable once placed. IDs are allocated per source by
//! scanning for the highest existing `N` at startup; duplicates (same
//! content hash already staged for that source) are dropped, not rewritten.

use crate::Result;
use crate::fs::write_atomic;
use crate::layout::StoreLayout;
use aicf_types::{CacheChunk, RawRecord, Source, content_hash};
use std::collections::HashSet;
use std::path::PathBuf;

/// Outcome of staging one record.
#[derive(Debug, PartialEq, Eq)]
pub enum StageResult {
    Written(u64),
    Duplicate,
}

/// Name of the per-source last-processed marker file.
///
/// Records every content hash this source has ever staged, so a payload
/// re-captured by a later polling cycle is recognized as processed even
/// after its chunk was consolidated and its per-conversation file absorbed
/// into a session.
const SEEN_FILE: &str = ".seen.json";

/// Single-writer cache handle for one source.
pub struct CacheWriter {
    dir: PathBuf,
    next_id: u64,
    seen_hashes: HashSet<String>,
}

impl CacheWriter {
    /// Open the cache directory for a source, scanning existing chunks for
    /// the next free ID and loading the seen-hash marker.
    pub fn open(layout: &StoreLayout, source: Source) -> Result<Self> {
        let dir = layout.source_cache_dir(source);
        std::fs::create_dir_all(&dir)?;

        let mut next_id = 1u64;
        let mut seen_hashes = load_seen(&dir.join(SEEN_FILE))?;

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(id) = parse_chunk_id(&name) else {
                continue;
            };
            next_id = next_id.max(id + 1);

            if let Ok(text) = std::fs::read_to_string(entry.path()) {
                if let Ok(chunk) = serde_json::from_str::<CacheChunk>(&text) {
                    seen_hashes.insert(chunk.content_hash);
                }
            }
        }

        Ok(Self {
            dir,
            next_id,
            seen_hashes,
        })
    }

    /// Stage one record. Duplicate payloads are skipped; a failed write is
    /// fatal for the run, there is no partial success for a single record.
    pub fn stage(&mut self, record: RawRecord) -> Result<StageResult> {
        let hash = content_hash(&record.raw_data);
        if self.seen_hashes.contains(&hash) {
            return Ok(StageResult::Duplicate);
        }

        let chunk_id = self.next_id;
        let chunk = CacheChunk::from_record(record, chunk_id, hash.clone());
        let path = self.dir.join(format!("chunk-{}.json", chunk_id));

        let body = serde_json::to_string_pretty(&chunk)?;
        write_atomic(&path, &body)?;

        // Marker after chunk: a crash between the two re-stages nothing,
        // because the chunk scan re-derives the hash on reopen.
        self.next_id += 1;
        self.seen_hashes.insert(hash);
        self.save_seen()?;

        Ok(StageResult::Written(chunk_id))
    }

    fn save_seen(&self) -> Result<()> {
        let mut hashes: Vec<&String> = self.seen_hashes.iter().collect();
        hashes.sort();
        let body = serde_json::to_string_pretty(&hashes)?;
        write_atomic(&self.dir.join(SEEN_FILE), &body)
    }
}

fn load_seen(path: &PathBuf) -> Result<HashSet<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let hashes: Vec<String> = serde_json::from_str(&text)?;
            Ok(hashes.into_iter().collect())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(err) => Err(err.into()),
    }
}

/// One staged chunk and where it lives.
#[derive(Debug)]
pub struct StagedChunk {
    pub path: PathBuf,
    pub chunk: CacheChunk,
}

/// Every staged chunk plus the files that would not parse as chunks.
/// Unreadable chunks stay in the cache for the next cycle's retry.
#[derive(Debug, Default)]
pub struct StagedListing {
    pub chunks: Vec<StagedChunk>,
    pub unreadable: Vec<String>,
}

/// Enumerate every staged chunk across all source subdirectories, ordered by
/// `(source, chunk_id)` so retries are deterministic.
pub fn list_staged(layout: &StoreLayout) -> Result<StagedListing> {
    let mut listing = StagedListing::default();

    for source in Source::ALL {
        let dir = layout.source_cache_dir(source);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if parse_chunk_id(&name).is_none() {
                continue;
            }

            let text = match std::fs::read_to_string(entry.path()) {
                Ok(text) => text,
                Err(err) => {
                    listing
                        .unreadable
                        .push(format!("{}: {}", entry.path().display(), err));
                    continue;
                }
            };
            match serde_json::from_str::<CacheChunk>(&text) {
                Ok(chunk) => listing.chunks.push(StagedChunk {
                    path: entry.path(),
                    chunk,
                }),
                Err(err) => {
                    listing
                        .unreadable
                        .push(format!("{}: {}", entry.path().display(), err));
                }
            }
        }
    }

    listing.chunks.sort_by(|a, b| {
        (a.chunk.source, a.chunk.chunk_id).cmp(&(b.chunk.source, b.chunk.chunk_id))
    });
    Ok(listing)
}

fn parse_chunk_id(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix("chunk-")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(text: &str) -> RawRecord {
        RawRecord {
            source: Source::Augment,
            conversation_id: format!("conv-{}", text),
            workspace_id: "ws".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            raw_data: json!({"request_message": text}),
        }
    }

    #[test]
    fn test_ids_are_monotonic() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();

        assert_eq!(writer.stage(record("a")).unwrap(), StageResult::Written(1));
        assert_eq!(writer.stage(record("b")).unwrap(), StageResult::Written(2));
    }

    #[test]
    fn test_ids_resume_after_reopen() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());

        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        writer.stage(record("a")).unwrap();
        writer.stage(record("b")).unwrap();
        drop(writer);

        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        assert_eq!(writer.stage(record("c")).unwrap(), StageResult::Written(3));
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();

        writer.stage(record("same")).unwrap();
        assert_eq!(writer.stage(record("same")).unwrap(), StageResult::Duplicate);

        let staged = list_staged(&layout).unwrap();
        assert_eq!(staged.chunks.len(), 1);
    }

    #[test]
    fn test_duplicates_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());

        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        writer.stage(record("same")).unwrap();
        drop(writer);

        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        assert_eq!(writer.stage(record("same")).unwrap(), StageResult::Duplicate);
    }

    #[test]
    fn test_duplicates_survive_consolidation() {
        // Once a payload has ever been staged, deleting its chunk (what
        // consolidation does) must not make it stage again.
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());

        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        writer.stage(record("same")).unwrap();
        drop(writer);

        std::fs::remove_file(
            layout.source_cache_dir(Source::Augment).join("chunk-1.json"),
        )
        .unwrap();

        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        assert_eq!(writer.stage(record("same")).unwrap(), StageResult::Duplicate);
    }

    #[test]
    fn test_list_staged_is_ordered() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        writer.stage(record("a")).unwrap();
        writer.stage(record("b")).unwrap();
        writer.stage(record("c")).unwrap();

        let staged = list_staged(&layout).unwrap();
        let ids: Vec<u64> = staged.chunks.iter().map(|s| s.chunk.chunk_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_unreadable_chunk_is_reported_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        let mut writer = CacheWriter::open(&layout, Source::Augment).unwrap();
        writer.stage(record("good")).unwrap();

        let bad = layout.source_cache_dir(Source::Augment).join("chunk-99.json");
        std::fs::write(&bad, "not json").unwrap();

        let staged = list_staged(&layout).unwrap();
        assert_eq!(staged.chunks.len(), 1);
        assert_eq!(staged.unreadable.len(), 1);
    }
}
