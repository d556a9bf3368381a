pub mod types;

pub use types::{RawPage, SearchResult};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::api::{self, ApiError, ApiSurface};
use crate::config::{CodeSettings, CommitsSettings, ReposSettings};

/// The API never serves results past this window, however many pages are
/// requested. Enforced once, at result construction.
pub const RESULT_WINDOW: usize = 1000;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// One fetched page plus whether the response advertised a further page via
/// its `Link` header.
#[derive(Debug)]
pub struct FetchedPage {
    pub page: RawPage,
    pub has_next: bool,
}

/// How one page is fetched. The paginate loop is identical for every search
/// surface; implementations differ only in endpoint and query.
#[async_trait]
pub trait PageFetcher {
    async fn fetch_page(&self, page: u32) -> Result<FetchedPage, SearchError>;
}

/// Production fetcher: one GET per page against a search endpoint.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
    query: String,
    per_page: u32,
    debug_echo: bool,
}

impl HttpPageFetcher {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        endpoint: &str,
        headers: HeaderMap,
        query: String,
        per_page: u32,
        debug_echo: bool,
    ) -> Self {
        let url = format!("{}/search/{endpoint}", api_base.trim_end_matches('/'));
        Self {
            client,
            url,
            headers,
            query,
            per_page,
            debug_echo,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, page: u32) -> Result<FetchedPage, SearchError> {
        let params = [
            ("q".to_string(), self.query.clone()),
            ("per_page".to_string(), self.per_page.to_string()),
            ("page".to_string(), page.to_string()),
        ];
        if self.debug_echo && page == 1 {
            api::print_debug_info("GET", &self.url, &self.headers, Some(params.as_slice()), None);
        }

        let response = self
            .client
            .get(&self.url)
            .headers(self.headers.clone())
            .query(&params)
            .send()
            .await
            .map_err(|source| ApiError::Connect {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        let has_next = has_next_link(response.headers());
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: crate::api::truncate_body(&body),
            }
            .into());
        }

        let page = response.json::<RawPage>().await.map_err(ApiError::Decode)?;
        Ok(FetchedPage { page, has_next })
    }
}

/// True when the `Link` header carries a `rel="next"` relation.
fn has_next_link(headers: &HeaderMap) -> bool {
    headers
        .get(LINK)
        .and_then(|value| value.to_str().ok())
        .map(|link| link.split(',').any(|part| part.contains("rel=\"next\"")))
        .unwrap_or(false)
}

/// Drive repeated page fetches until a stop condition: max pages reached, an
/// empty page, the result window reached, no next link, or a failed fetch.
///
/// A failed page is terminal for pagination but not for the command: whatever
/// accumulated so far is returned. Count metadata is captured from the first
/// page that carries it; later pages' values are ignored.
#[instrument(skip(fetcher, query), fields(query = %query))]
pub async fn paginate<F>(fetcher: &F, query: String, max_pages: u32) -> SearchResult
where
    F: PageFetcher + Sync,
{
    let mut items = Vec::new();
    let mut total_count = None;
    let mut incomplete_results = false;

    for page in 1..=max_pages {
        let fetched = match fetcher.fetch_page(page).await {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(page, error = %err, "stopping pagination");
                break;
            }
        };
        if total_count.is_none() {
            total_count = fetched.page.total_count;
            incomplete_results = fetched.page.incomplete_results.unwrap_or(false);
        }
        if fetched.page.items.is_empty() {
            break;
        }
        items.extend(fetched.page.items);
        debug!(page, accumulated = items.len(), "page appended");
        if items.len() >= RESULT_WINDOW || !fetched.has_next {
            break;
        }
    }

    items.truncate(RESULT_WINDOW);
    let total_count = total_count.unwrap_or(items.len() as u64);
    SearchResult {
        query,
        total_count,
        incomplete_results,
        items,
    }
}

/// Append a `key:value` qualifier for each supplied filter, one leading
/// space each, in the given order.
fn qualified_query(base: &str, qualifiers: &[(&str, Option<&str>)]) -> String {
    let mut query = base.to_string();
    for (key, value) in qualifiers {
        if let Some(value) = value {
            query.push(' ');
            query.push_str(key);
            query.push(':');
            query.push_str(value);
        }
    }
    query
}

/// Synchronous repository search: each page blocks the calling flow. Drives
/// the shared paginate loop on a current-thread runtime; the client lives for
/// exactly one call.
pub fn search_repositories(
    settings: &ReposSettings,
    debug_echo: bool,
) -> Result<SearchResult, SearchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let client = api::build_client(settings.verify_tls)?;
    let headers = api::build_headers(settings.token.as_deref(), ApiSurface::Search);
    let fetcher = HttpPageFetcher::new(
        client,
        &settings.api_base,
        "repositories",
        headers,
        settings.query.clone(),
        settings.per_page,
        debug_echo,
    );
    Ok(runtime.block_on(paginate(&fetcher, settings.query.clone(), settings.max_pages)))
}

/// Code search with `repo:` / `language:` / `path:` qualifiers appended for
/// supplied filters.
pub async fn search_code(
    settings: &CodeSettings,
    debug_echo: bool,
) -> Result<SearchResult, SearchError> {
    let client = api::build_client(settings.verify_tls)?;
    let headers = api::build_headers(settings.token.as_deref(), ApiSurface::Search);
    let query = qualified_query(
        &settings.query,
        &[
            ("repo", settings.repo.as_deref()),
            ("language", settings.language.as_deref()),
            ("path", settings.path.as_deref()),
        ],
    );
    let fetcher = HttpPageFetcher::new(
        client,
        &settings.api_base,
        "code",
        headers,
        query.clone(),
        settings.per_page,
        debug_echo,
    );
    Ok(paginate(&fetcher, query, settings.max_pages).await)
}

/// Commit search with `repo:` / `author:` / `committer:` qualifiers appended
/// for supplied filters.
pub async fn search_commits(
    settings: &CommitsSettings,
    debug_echo: bool,
) -> Result<SearchResult, SearchError> {
    let client = api::build_client(settings.verify_tls)?;
    let headers = api::build_headers(settings.token.as_deref(), ApiSurface::Search);
    let query = qualified_query(
        &settings.query,
        &[
            ("repo", settings.repo.as_deref()),
            ("author", settings.author.as_deref()),
            ("committer", settings.committer.as_deref()),
        ],
    );
    let fetcher = HttpPageFetcher::new(
        client,
        &settings.api_base,
        "commits",
        headers,
        query.clone(),
        settings.per_page,
        debug_echo,
    );
    Ok(paginate(&fetcher, query, settings.max_pages).await)
}
