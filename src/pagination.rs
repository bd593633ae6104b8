use crate::domain::options::QueryOptions;
use crate::domain::page::{PageEnvelope, last_page};
use crate::repository::QuerySource;
use crate::repository::errors::QueryResult;

/// Materializes the page described by `options` from an ordered source.
///
/// A page beyond the last one holding data is replaced by that last page, so
/// the returned `page` is always the page actually served.
pub fn paginate<S: QuerySource>(
    source: &S,
    options: &QueryOptions,
) -> QueryResult<PageEnvelope<S::Item>> {
    let page_size = options.page_size.max(1);
    let total_count = source.count()?;

    let mut page = options.page.max(1);
    if total_count <= (page - 1).saturating_mul(page_size) {
        page = last_page(total_count, page_size);
    }

    let offset = (page - 1).saturating_mul(page_size);
    let data = source.fetch(offset, Some(page_size))?;

    Ok(PageEnvelope {
        page,
        page_size,
        total_count,
        data,
    })
}
