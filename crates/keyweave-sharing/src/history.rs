//! Paged access to historical keys.

use keyweave_core::KeyMaterial;

use crate::error::Result;
use crate::graph::KeyRecord;
use crate::sharing::Sharing;

/// Finite, restartable pages of `(block, key)` pairs, oldest first.
///
/// The offset only advances after a page has been fully unwrapped, so a
/// failed page can be retried with another `next_page` call, or a new pager
/// can pick up from a saved [`offset`](Self::offset) via
/// [`resume_from`](Self::resume_from).
pub struct KeyHistoryPager<'a> {
    sharing: &'a Sharing,
    entries: Vec<(u64, KeyRecord)>,
    page_size: usize,
    offset: usize,
}

impl<'a> KeyHistoryPager<'a> {
    pub(crate) fn new(sharing: &'a Sharing, entries: Vec<(u64, KeyRecord)>, page_size: usize) -> Self {
        Self {
            sharing,
            entries,
            page_size: page_size.max(1),
            offset: 0,
        }
    }

    /// Fetch the next page. `Ok(None)` once every entry has been returned.
    ///
    /// Entries whose edge key the caller does not hold are skipped, so a page
    /// may be shorter than the page size.
    pub async fn next_page(&mut self) -> Result<Option<Vec<(u64, KeyMaterial)>>> {
        if self.offset >= self.entries.len() {
            return Ok(None);
        }
        let end = self
            .offset
            .saturating_add(self.page_size)
            .min(self.entries.len());
        let page = self
            .sharing
            .unwrap_entries(&self.entries[self.offset..end])
            .await?;
        self.offset = end;
        Ok(Some(page))
    }

    /// Entries consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Continue from a previously saved offset.
    pub fn resume_from(&mut self, offset: usize) {
        self.offset = offset.min(self.entries.len());
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every entry has been returned.
    pub fn is_finished(&self) -> bool {
        self.offset >= self.entries.len()
    }
}

impl std::fmt::Debug for KeyHistoryPager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHistoryPager")
            .field("len", &self.entries.len())
            .field("page_size", &self.page_size)
            .field("offset", &self.offset)
            .finish()
    }
}
