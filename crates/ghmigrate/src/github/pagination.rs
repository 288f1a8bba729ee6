//! `Link`-header cursors and the page walker shared by every list endpoint.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::error::GitHubError;
use crate::sync::{ProgressCallback, PullProgress, emit};

/// Items requested per page.
pub const PAGE_SIZE: u32 = 100;

static PAGE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]page=(\d+)").expect("page regex is valid"));

/// Page cursor from a `Link` header. Zero means the relation was absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListPages {
    pub prev: u32,
    pub next: u32,
    pub last: u32,
}

/// Parse a GitHub `Link` header into a page cursor.
///
/// Relations other than `next`, `prev` and `last` are ignored. A recognised
/// relation whose URL carries no `page=<n>` is an error.
pub fn parse_link_header(header: &str) -> Result<ListPages, GitHubError> {
    let mut pages = ListPages::default();

    for link in header.split(',') {
        let link = link.trim();
        if link.is_empty() {
            continue;
        }

        let mut parts = link.split(';');
        let url = parts.next().unwrap_or_default().trim();
        let rel = parts
            .map(str::trim)
            .find_map(|p| p.strip_prefix("rel="))
            .map(|r| r.trim_matches('"'));

        let slot = match rel {
            Some("next") => &mut pages.next,
            Some("prev") => &mut pages.prev,
            Some("last") => &mut pages.last,
            _ => continue,
        };

        *slot = PAGE_PARAM
            .captures(url)
            .and_then(|c| c[1].parse::<u32>().ok())
            .ok_or_else(|| GitHubError::LinkHeader {
                header: link.to_string(),
            })?;
    }

    Ok(pages)
}

/// Append the paging query to an API path.
pub fn paged(path: &str, page: u32) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}per_page={PAGE_SIZE}&page={page}")
}

/// One fetched page and the cursor it reported.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pages: ListPages,
}

/// Outcome of a walk: everything accumulated, plus the error that stopped
/// it early, if any.
#[derive(Debug)]
pub struct PageWalk<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
    pub error: Option<GitHubError>,
}

impl<T> PageWalk<T> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// All items, or the error that interrupted the walk.
    pub fn into_result(self, resource: &str) -> Result<Vec<T>, GitHubError> {
        match self.error {
            None => Ok(self.items),
            Some(err) => {
                warn!(
                    resource,
                    pages_fetched = self.pages_fetched,
                    partial_items = self.items.len(),
                    error = %err,
                    "Page walk failed, discarding partial results"
                );
                Err(err)
            }
        }
    }
}

/// The page to fetch after `current`, or `None` once exhausted.
///
/// `known_last` is the last page announced by an earlier response.
pub fn next_page(current: u32, known_last: u32, pages: ListPages) -> Option<u32> {
    if pages.last == 0 {
        return None;
    }
    if known_last > 0 && current >= known_last {
        return None;
    }
    if pages.next == 0 || pages.next <= current || pages.next > pages.last {
        return None;
    }
    Some(pages.next)
}

/// Walk a paginated resource from page 1 until its cursor is exhausted.
///
/// Pages are fetched strictly one after another and none is fetched twice.
/// A failing page stops the walk; items from earlier pages are kept.
pub async fn walk_pages<T, F, Fut>(
    resource: &str,
    on_progress: Option<&ProgressCallback>,
    mut fetch: F,
) -> PageWalk<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, GitHubError>>,
{
    let mut walk = PageWalk {
        items: Vec::new(),
        pages_fetched: 0,
        error: None,
    };
    let mut page = 1u32;
    let mut known_last = 0u32;

    loop {
        debug!(resource, page, "Fetching page");
        let Page { items, pages } = match fetch(page).await {
            Ok(p) => p,
            Err(err) => {
                walk.error = Some(err);
                return walk;
            }
        };

        walk.pages_fetched += 1;
        let count = items.len();
        walk.items.extend(items);

        emit(
            on_progress,
            PullProgress::FetchedPage {
                resource: resource.to_string(),
                page,
                count,
                total_so_far: walk.items.len(),
                last_page: (pages.last > 0).then_some(pages.last),
            },
        );

        match next_page(page, known_last, pages) {
            Some(next) => {
                known_last = pages.last;
                page = next;
            }
            None => break,
        }
    }

    debug!(
        resource,
        pages = walk.pages_fetched,
        items = walk.items.len(),
        "Finished walking pages"
    );
    walk
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const BASE: &str = "https://api.github.com/orgs/acme/members";

    fn link(rel: &str, page: u32) -> String {
        format!("<{BASE}?per_page=100&page={page}>; rel=\"{rel}\"")
    }

    #[test]
    fn parses_next_prev_last() {
        let header = [link("prev", 1), link("next", 3), link("last", 5), link("first", 1)].join(", ");
        let pages = parse_link_header(&header).unwrap();
        assert_eq!(
            pages,
            ListPages {
                prev: 1,
                next: 3,
                last: 5
            }
        );
    }

    #[test]
    fn empty_header_yields_zero_cursor() {
        assert_eq!(parse_link_header("").unwrap(), ListPages::default());
        assert_eq!(parse_link_header("  ").unwrap(), ListPages::default());
    }

    #[test]
    fn per_page_is_not_mistaken_for_page() {
        let header = format!("<{BASE}?page=4&per_page=100>; rel=\"last\"");
        assert_eq!(parse_link_header(&header).unwrap().last, 4);
    }

    #[test]
    fn relation_without_page_number_is_an_error() {
        let header = format!("{}, <{BASE}?per_page=100>; rel=\"last\"", link("next", 2));
        let err = parse_link_header(&header).unwrap_err();
        match err {
            GitHubError::LinkHeader { header } => assert!(header.contains("rel=\"last\"")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn paged_appends_query() {
        assert_eq!(paged("/orgs/acme/members", 2), "/orgs/acme/members?per_page=100&page=2");
        assert_eq!(paged("/search?q=x", 1), "/search?q=x&per_page=100&page=1");
    }

    #[test]
    fn next_page_stop_rules() {
        let cursor = |next, last| ListPages { prev: 0, next, last };
        assert_eq!(next_page(1, 0, cursor(2, 3)), Some(2));
        assert_eq!(next_page(1, 0, cursor(2, 0)), None);
        assert_eq!(next_page(3, 3, cursor(4, 5)), None);
        assert_eq!(next_page(2, 3, cursor(0, 3)), None);
        assert_eq!(next_page(2, 3, cursor(2, 3)), None);
        assert_eq!(next_page(2, 3, cursor(4, 3)), None);
    }

    /// Serve pages from a table and count how often each page is requested.
    struct FakeResource {
        pages: HashMap<u32, Result<(Vec<u32>, ListPages), ()>>,
        calls: RefCell<Vec<u32>>,
    }

    impl FakeResource {
        fn new(pages: Vec<(u32, Result<(Vec<u32>, ListPages), ()>)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        async fn fetch(&self, page: u32) -> Result<Page<u32>, GitHubError> {
            self.calls.borrow_mut().push(page);
            match self.pages.get(&page) {
                Some(Ok((items, pages))) => Ok(Page {
                    items: items.clone(),
                    pages: *pages,
                }),
                _ => Err(GitHubError::Api {
                    status: 500,
                    message: format!("page {page} failed"),
                }),
            }
        }
    }

    #[tokio::test]
    async fn last_zero_returns_first_page_even_with_next() {
        let resource = FakeResource::new(vec![(
            1,
            Ok((
                vec![1, 2],
                ListPages {
                    prev: 0,
                    next: 2,
                    last: 0,
                },
            )),
        )]);

        let walk = walk_pages("members", None, |p| resource.fetch(p)).await;

        assert!(walk.is_complete());
        assert_eq!(walk.items, vec![1, 2]);
        assert_eq!(walk.pages_fetched, 1);
        assert_eq!(*resource.calls.borrow(), vec![1]);
    }

    #[tokio::test]
    async fn walks_to_last_page_exactly_once() {
        let resource = FakeResource::new(vec![
            (
                1,
                Ok((
                    vec![1],
                    ListPages {
                        prev: 0,
                        next: 2,
                        last: 3,
                    },
                )),
            ),
            (
                2,
                Ok((
                    vec![2],
                    ListPages {
                        prev: 1,
                        next: 3,
                        last: 3,
                    },
                )),
            ),
            (
                3,
                Ok((
                    vec![3],
                    ListPages {
                        prev: 2,
                        next: 0,
                        last: 0,
                    },
                )),
            ),
        ]);

        let walk = walk_pages("members", None, |p| resource.fetch(p)).await;

        assert_eq!(walk.into_result("members").unwrap(), vec![1, 2, 3]);
        assert_eq!(*resource.calls.borrow(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn stops_at_announced_last_even_if_final_page_lies() {
        let resource = FakeResource::new(vec![
            (
                1,
                Ok((
                    vec![1],
                    ListPages {
                        prev: 0,
                        next: 2,
                        last: 2,
                    },
                )),
            ),
            (
                2,
                Ok((
                    vec![2],
                    ListPages {
                        prev: 1,
                        next: 3,
                        last: 4,
                    },
                )),
            ),
        ]);

        let walk = walk_pages("members", None, |p| resource.fetch(p)).await;

        assert_eq!(walk.items, vec![1, 2]);
        assert_eq!(*resource.calls.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn error_keeps_partial_items() {
        let resource = FakeResource::new(vec![(
            1,
            Ok((
                vec![1, 2],
                ListPages {
                    prev: 0,
                    next: 2,
                    last: 3,
                },
            )),
        )]);

        let walk = walk_pages("members", None, |p| resource.fetch(p)).await;

        assert!(!walk.is_complete());
        assert_eq!(walk.items, vec![1, 2]);
        assert_eq!(walk.pages_fetched, 1);
        let err = walk.into_result("members").unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn emits_progress_per_page() {
        use std::sync::{Arc, Mutex};

        let resource = FakeResource::new(vec![
            (
                1,
                Ok((
                    vec![1, 2],
                    ListPages {
                        prev: 0,
                        next: 2,
                        last: 2,
                    },
                )),
            ),
            (2, Ok((vec![3], ListPages::default()))),
        ]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |event| {
            if let PullProgress::FetchedPage {
                page,
                total_so_far,
                last_page,
                ..
            } = event
            {
                sink.lock().unwrap().push((page, total_so_far, last_page));
            }
        });

        walk_pages("members", Some(&callback), |p| resource.fetch(p)).await;

        assert_eq!(*seen.lock().unwrap(), vec![(1, 2, Some(2)), (2, 3, None)]);
    }
}
