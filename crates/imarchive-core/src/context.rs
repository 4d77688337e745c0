//! "Jump to message" support: a chronological window centered on a target.

use imarchive_types::error::ArchiveError;
use imarchive_types::message::MessageContext;
use tracing::info;

use crate::mapper;
use crate::pagination;
use crate::repository::ArchiveStore;

/// Load up to `half_width` messages on each side of `target_id` in a chat.
///
/// When the target is not part of the chat's displayable timeline, the most
/// recent `fallback_page_size` messages are returned with `target_index: None`
/// instead of an error.
pub async fn locate<S: ArchiveStore>(
    store: &S,
    chat_id: i64,
    target_id: i64,
    half_width: u32,
    fallback_page_size: u32,
) -> Result<MessageContext, ArchiveError> {
    let timeline = store.chat_timeline(chat_id).await?;

    let Some(pos) = timeline.iter().position(|&id| id == target_id) else {
        info!(chat_id, target_id, "target message not in chat, falling back to latest page");
        let page = pagination::get_page(store, chat_id, fallback_page_size, 0).await?;
        return Ok(MessageContext {
            messages: page.messages,
            target_index: None,
        });
    };

    let (start, end) = window_bounds(pos, timeline.len(), half_width as usize);
    let records = store.messages_by_ids(chat_id, &timeline[start..end]).await?;
    let messages = mapper::process_messages(store, &records).await?;
    let target_index = messages.iter().position(|m| m.id == target_id);

    Ok(MessageContext {
        messages,
        target_index,
    })
}

/// Half-open slice bounds `[start, end)` around `pos`, clamped to `len`.
fn window_bounds(pos: usize, len: usize, half_width: usize) -> (usize, usize) {
    let start = pos.saturating_sub(half_width);
    let end = pos.saturating_add(half_width).saturating_add(1).min(len);
    (start, end)
}
