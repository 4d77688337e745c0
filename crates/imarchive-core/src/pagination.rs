//! Offset-based, backward-in-time paging through a chat thread.

use imarchive_types::error::ArchiveError;
use imarchive_types::message::MessagePage;

use crate::mapper;
use crate::repository::ArchiveStore;

/// Load `page_size` messages of a chat, skipping the `offset` most recent.
///
/// The store returns newest first; the page is handed back in chronological
/// order. `has_more` is set when the page came back full, so a thread whose
/// length is an exact multiple of `page_size` costs one extra empty fetch.
pub async fn get_page<S: ArchiveStore>(
    store: &S,
    chat_id: i64,
    page_size: u32,
    offset: u32,
) -> Result<MessagePage, ArchiveError> {
    if page_size == 0 {
        return Err(ArchiveError::InvalidArgument(
            "page size must be at least 1".to_string(),
        ));
    }

    let mut records = store.message_page(chat_id, page_size, offset).await?;
    records.reverse();

    let messages = mapper::process_messages(store, &records).await?;
    let has_more = messages.len() == page_size as usize;
    tracing::debug!(chat_id, offset, returned = messages.len(), has_more, "loaded message page");

    Ok(MessagePage { messages, has_more })
}
