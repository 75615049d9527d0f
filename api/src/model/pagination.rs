use kernel::model::list::PaginatedList;
use serde::Serialize;

/// The listing envelope: `data`, `meta`, `links`.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub last_page: i64,
}

#[derive(Debug, Serialize)]
pub struct PageLinks {
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl<T> Paginated<T> {
    pub fn new<U>(list: PaginatedList<U>, base_path: &str) -> Self
    where
        T: From<U>,
    {
        let last_page = list.last_page();
        let PaginatedList {
            total,
            page,
            per_page,
            items,
        } = list;
        let next = (page < last_page).then(|| format!("{base_path}?page={}", page + 1));
        let prev = (page > 1).then(|| format!("{base_path}?page={}", page - 1));
        Self {
            data: items.into_iter().map(T::from).collect(),
            meta: PageMeta {
                total,
                page,
                per_page,
                last_page,
            },
            links: PageLinks { next, prev },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(total: i64, page: i64) -> PaginatedList<i64> {
        PaginatedList {
            total,
            page,
            per_page: 10,
            items: vec![],
        }
    }

    #[test]
    fn a_middle_page_links_both_ways() {
        let paginated: Paginated<i64> = Paginated::new(list_of(31, 2), "/api/v1/offices");
        assert_eq!(paginated.meta.last_page, 4);
        assert_eq!(paginated.links.next.as_deref(), Some("/api/v1/offices?page=3"));
        assert_eq!(paginated.links.prev.as_deref(), Some("/api/v1/offices?page=1"));
    }

    #[test]
    fn the_first_page_has_no_prev_link() {
        let paginated: Paginated<i64> = Paginated::new(list_of(31, 1), "/api/v1/offices");
        assert!(paginated.links.prev.is_none());
        assert_eq!(paginated.links.next.as_deref(), Some("/api/v1/offices?page=2"));
    }

    #[test]
    fn the_last_page_has_no_next_link() {
        let paginated: Paginated<i64> = Paginated::new(list_of(31, 4), "/api/v1/offices");
        assert!(paginated.links.next.is_none());
    }

    #[test]
    fn an_empty_listing_has_neither_link() {
        let paginated: Paginated<i64> = Paginated::new(list_of(0, 1), "/api/v1/offices");
        assert!(paginated.links.next.is_none());
        assert!(paginated.links.prev.is_none());
        assert_eq!(paginated.meta.last_page, 1);
    }
}
