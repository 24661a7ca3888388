//! Cache consolidation: every staged chunk becomes a per-conversation
//! AICF + markdown pair under `recent/`, then the chunk is deleted.
//!
//! Chunks are processed in ascending `(source, chunkId)` order so retries
//! are deterministic. The dedup set is the hashes already materialized in
//! `recent/`; within a run, freshly materialized hashes join the set so a
//! payload captured twice only lands once.

use crate::report::ConsolidationReport;
use crate::{Error, Result};
use aicf_engine::{Conversation, analyze};
use aicf_store::{ConversationDoc, StoreLayout, aicf, list_staged, markdown, write_atomic};
use aicf_types::AnalysisResult;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Cap on a single cache-to-AICF materialization.
const MATERIALIZE_TIMEOUT: Duration = Duration::from_secs(30);

pub fn consolidate_cache(layout: &StoreLayout) -> Result<ConsolidationReport> {
    let mut report = ConsolidationReport::default();

    let listing = list_staged(layout)?;
    for unreadable in listing.unreadable {
        report.failures += 1;
        report
            .diagnostics
            .push(format!("unreadable chunk left for retry: {}", unreadable));
    }

    let mut materialized = known_hashes(layout, &mut report)?;

    for staged in listing.chunks {
        let chunk = &staged.chunk;
        let started = Instant::now();

        if materialized.contains(&chunk.content_hash) {
            report.duplicates += 1;
            std::fs::remove_file(&staged.path)?;
            continue;
        }

        // A chunk with no reconstructable messages still materializes with
        // an empty analysis; its hash must enter the store or the chunk
        // would wedge the cache forever.
        let (model, analysis) = match Conversation::from_chunk(chunk) {
            Some(conversation) => (conversation.model.clone(), analyze(&conversation)),
            None => (None, AnalysisResult::default()),
        };

        let doc = ConversationDoc {
            timestamp: chunk.timestamp.clone(),
            conversation_id: chunk.conversation_id.clone(),
            content_hash: chunk.content_hash.clone(),
            model,
            analysis,
        };

        let Some(stem) = doc.file_stem() else {
            report.failures += 1;
            report.diagnostics.push(format!(
                "chunk {} has unusable timestamp {:?}, left for retry",
                staged.path.display(),
                chunk.timestamp
            ));
            continue;
        };

        let aicf_path = layout.recent_dir().join(format!("{}.aicf", stem));
        let md_path = layout.ai_dir().join(format!("{}.md", stem));

        // Pair order matters for crash recovery: markdown first, AICF last,
        // chunk deletion after both. An interrupted run leaves either a
        // retryable chunk or a complete pair, never an AICF without its
        // markdown.
        write_atomic(&md_path, &markdown::render(&doc))?;
        write_atomic(&aicf_path, &aicf::render(&doc))?;
        std::fs::remove_file(&staged.path)?;

        materialized.insert(chunk.content_hash.clone());
        report.materialized += 1;

        if started.elapsed() > MATERIALIZE_TIMEOUT {
            return Err(Error::InvalidOperation(format!(
                "materialization of chunk {} exceeded {}s",
                chunk.chunk_id,
                MATERIALIZE_TIMEOUT.as_secs()
            )));
        }
    }

    Ok(report)
}

/// Hashes already present in `recent/`.
fn known_hashes(
    layout: &StoreLayout,
    report: &mut ConsolidationReport,
) -> Result<HashSet<String>> {
    let mut hashes = HashSet::new();

    let Ok(entries) = std::fs::read_dir(layout.recent_dir()) else {
        return Ok(hashes);
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_none_or(|e| e != "aicf") {
            continue;
        }
        let text = std::fs::read_to_string(&path)?;
        match aicf::parse(&text) {
            Ok(doc) => {
                hashes.insert(doc.content_hash);
            }
            Err(err) => {
                report
                    .diagnostics
                    .push(format!("unparseable file in recent/: {}: {}", path.display(), err));
            }
        }
    }

    Ok(hashes)
}
