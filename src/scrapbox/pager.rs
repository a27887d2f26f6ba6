use log::debug;

use super::source::{ApiError, PageSource};
use super::types::Page;

/// Batch size used by the page list.
pub const DEFAULT_PAGE_LIMIT: usize = 500;

/// Cursor over the page listing. Each `read` fetches the next batch;
/// there is no read-all loop, callers ask for more when they want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub skip: usize,
    pub limit: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

impl Pager {
    pub fn new(limit: usize) -> Self {
        Self { skip: 0, limit }
    }

    /// Fetches one batch and advances `skip` by the number of pages returned.
    pub async fn read(&mut self, source: &dyn PageSource) -> Result<Vec<Page>, ApiError> {
        let pages = source.list_pages(self.skip, self.limit).await?;
        self.skip += pages.len();
        Ok(pages)
    }

    /// Writing pages is not supported. Logs the attempt and returns.
    pub fn write(&self, title: &str, body: &str) {
        debug!(
            "Ignoring write of '{}' ({} bytes): pages are read-only",
            title,
            body.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubSource;

    #[tokio::test]
    async fn test_read_advances_skip_by_batch_size() {
        let source = StubSource::new().with_listing(1200);
        let mut pager = Pager::default();
        assert_eq!(pager, Pager { skip: 0, limit: 500 });

        let first = pager.read(&source).await.unwrap();
        assert_eq!(first.len(), 500);
        assert_eq!(pager.skip, 500);

        let second = pager.read(&source).await.unwrap();
        assert_eq!(second.len(), 500);
        assert_eq!(second[0].title, "page-500");
        assert_eq!(pager.skip, 1000);

        let third = pager.read(&source).await.unwrap();
        assert_eq!(third.len(), 200);
        assert_eq!(pager.skip, 1200);

        assert!(pager.read(&source).await.unwrap().is_empty());
        assert_eq!(pager.skip, 1200);
    }

    #[tokio::test]
    async fn test_failed_read_leaves_skip_unchanged() {
        let source = StubSource::new().failing_listing();
        let mut pager = Pager { skip: 40, limit: 20 };

        assert!(pager.read(&source).await.is_err());
        assert_eq!(pager.skip, 40);
    }

    #[test]
    fn test_write_is_a_no_op() {
        let pager = Pager::new(10);
        pager.write("Title", "body");
        assert_eq!(pager, Pager::new(10));
    }
}
