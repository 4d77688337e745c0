//! Full-history search.
//!
//! Phase 1 asks the store for structured matches on the plain-text columns.
//! Phase 2 walks every remaining message, decodes its body, and tests the
//! decoded text, which is how messages stored only as rich-text blobs are
//! found. Phase 2 is a full scan, so cost grows with the whole history. It is
//! only meant for user-initiated searches.

use std::cmp::Reverse;
use std::collections::HashSet;

use imarchive_types::error::ArchiveError;
use imarchive_types::message::{Message, ProcessedMessage};
use tracing::debug;

use crate::decoder;
use crate::mapper;
use crate::repository::ArchiveStore;
use crate::timestamp;

/// Search parameters.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub term: String,
    pub limit: u32,
    /// Rows per Phase-2 scan batch.
    pub batch_size: u32,
}

/// Newest first, ties by descending row id.
fn newest_first(message: &Message) -> Reverse<(Option<i128>, i64)> {
    Reverse((timestamp::sort_key(message.date), message.id))
}

/// Run both search phases and return at most `limit` merged results, newest first.
///
/// A store failure in either phase aborts the whole search. A message whose
/// body cannot be decoded is treated as a non-match.
pub async fn search<S: ArchiveStore>(
    store: &S,
    request: &SearchRequest,
) -> Result<Vec<ProcessedMessage>, ArchiveError> {
    let term = request.term.trim();
    if term.is_empty() {
        return Err(ArchiveError::InvalidArgument(
            "search term must not be empty".to_string(),
        ));
    }
    if request.limit == 0 {
        return Ok(Vec::new());
    }
    let limit = request.limit as usize;
    let batch_size = request.batch_size.max(1);

    let mut seen = HashSet::new();
    let mut matches: Vec<Message> = store
        .search_text(term, request.limit)
        .await?
        .into_iter()
        .filter(|m| seen.insert(m.id))
        .collect();
    let structured = matches.len();

    let needle = term.to_lowercase();
    let mut decoded: Vec<Message> = Vec::new();
    let mut after_id = i64::MIN;
    let mut scanned = 0usize;
    loop {
        let batch = store.scan_messages(after_id, batch_size).await?;
        let Some(last) = batch.last() else {
            break;
        };
        after_id = last.id;
        scanned += batch.len();
        let exhausted = batch.len() < batch_size as usize;

        for message in batch {
            if seen.contains(&message.id) {
                continue;
            }
            match decoder::recover_content(&message) {
                Ok(text) if text.to_lowercase().contains(&needle) => {
                    seen.insert(message.id);
                    decoded.push(message);
                }
                Ok(_) => {}
                Err(e) => debug!(message_id = message.id, error = %e, "no searchable content"),
            }
        }

        // Only the newest `limit` decoded matches can survive the final cut.
        if decoded.len() > limit {
            decoded.sort_by_key(newest_first);
            decoded.truncate(limit);
        }
        if exhausted {
            break;
        }
    }

    debug!(
        term = %term,
        structured,
        decoded = decoded.len(),
        scanned,
        "search phases complete"
    );

    matches.append(&mut decoded);
    matches.sort_by_key(newest_first);
    matches.truncate(limit);

    Ok(mapper::process_messages(store, &matches).await?)
}
