//! Content store access - pages and fragments from the CMS

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use walkdir::WalkDir;

use super::{Fragment, PageDoc};
use crate::config::ApiStoreConfig;

/// Read access to the editorial document store.
///
/// Both lookups are fallible: an `Err` means the store itself could not
/// answer (network, parse), `Ok(None)` means the document does not exist.
/// Callers that must degrade gracefully (the resolver) treat the two alike.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a page by slug. `preview` asks for draft content where the
    /// backing store supports it.
    async fn page_by_slug(&self, slug: &str, preview: bool) -> Result<Option<PageDoc>>;

    /// Fetch a reusable fragment by id
    async fn fragment_by_id(&self, id: &str) -> Result<Option<Fragment>>;

    /// All known page slugs, for the `list` and `check` commands
    async fn page_slugs(&self) -> Result<Vec<String>>;

    /// All known fragment ids
    async fn fragment_ids(&self) -> Result<Vec<String>>;
}

/// In-memory store, loadable from a directory of JSON documents.
///
/// Layout mirrors the CMS export format: `pages/<slug>.json` and
/// `fragments/<id>.json`. Used for local development and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: HashMap<String, PageDoc>,
    fragments: HashMap<String, Fragment>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all documents under a content directory.
    ///
    /// Unparseable documents are skipped with a warning rather than failing
    /// the whole load; a content mistake should not take the site down.
    pub fn from_dir<P: AsRef<Path>>(content_dir: P) -> Result<Self> {
        let content_dir = content_dir.as_ref();
        let mut store = Self::new();

        for entry in WalkDir::new(content_dir.join("pages"))
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !is_json_file(path) {
                continue;
            }
            match load_json::<PageDoc>(path) {
                Ok(mut page) => {
                    if page.slug.is_empty() {
                        page.slug = file_stem(path);
                    }
                    store.insert_page(page);
                }
                Err(e) => tracing::warn!("Skipping page document {:?}: {}", path, e),
            }
        }

        for entry in WalkDir::new(content_dir.join("fragments"))
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !is_json_file(path) {
                continue;
            }
            match load_json::<Fragment>(path) {
                Ok(mut fragment) => {
                    if fragment.id.is_empty() {
                        fragment.id = file_stem(path);
                    }
                    store.insert_fragment(fragment);
                }
                Err(e) => tracing::warn!("Skipping fragment document {:?}: {}", path, e),
            }
        }

        tracing::info!(
            "Loaded {} pages and {} fragments from {:?}",
            store.pages.len(),
            store.fragments.len(),
            content_dir
        );
        Ok(store)
    }

    pub fn insert_page(&mut self, page: PageDoc) {
        self.pages.insert(page.slug.clone(), page);
    }

    pub fn insert_fragment(&mut self, fragment: Fragment) {
        self.fragments.insert(fragment.id.clone(), fragment);
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn page_by_slug(&self, slug: &str, _preview: bool) -> Result<Option<PageDoc>> {
        Ok(self.pages.get(slug).cloned())
    }

    async fn fragment_by_id(&self, id: &str) -> Result<Option<Fragment>> {
        Ok(self.fragments.get(id).cloned())
    }

    async fn page_slugs(&self) -> Result<Vec<String>> {
        let mut slugs: Vec<_> = self.pages.keys().cloned().collect();
        slugs.sort();
        Ok(slugs)
    }

    async fn fragment_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<_> = self.fragments.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// Thin client for a hosted document store with a GROQ-style query endpoint.
///
/// Queries go out as `GET {base_url}?query=<urlencoded>` with an optional
/// bearer token; the response envelope is `{"result": <document|null>}`.
pub struct ApiStore {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiStore {
    pub fn new(config: &ApiStoreConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build content store HTTP client")?;

        let token = config.resolve_token();
        Ok(Self {
            http,
            base_url: config.query_url(),
            token,
        })
    }

    /// Run one GROQ query and return the unwrapped `result` value
    async fn query(&self, groq: &str, preview: bool) -> Result<serde_json::Value> {
        let mut url = format!(
            "{}?query={}",
            self.base_url,
            utf8_percent_encode(groq, NON_ALPHANUMERIC)
        );
        if preview {
            url.push_str("&perspective=previewDrafts");
        }

        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Content store request failed")?
            .error_for_status()
            .context("Content store returned an error status")?;

        let envelope: serde_json::Value = response
            .json()
            .await
            .context("Content store returned invalid JSON")?;
        Ok(envelope
            .get("result")
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl ContentStore for ApiStore {
    async fn page_by_slug(&self, slug: &str, preview: bool) -> Result<Option<PageDoc>> {
        let groq = format!(
            "*[_type == \"page\" && slug.current == \"{}\"][0]{{\"slug\": slug.current, title, hero, sections}}",
            escape_groq(slug)
        );
        let result = self.query(&groq, preview).await?;
        if result.is_null() {
            return Ok(None);
        }
        let page = serde_json::from_value(result).context("Malformed page document")?;
        Ok(Some(page))
    }

    async fn fragment_by_id(&self, id: &str) -> Result<Option<Fragment>> {
        let groq = format!(
            "*[_type == \"fragment\" && _id == \"{}\"][0]{{\"id\": _id, title, sections}}",
            escape_groq(id)
        );
        let result = self.query(&groq, false).await?;
        if result.is_null() {
            return Ok(None);
        }
        let fragment = serde_json::from_value(result).context("Malformed fragment document")?;
        Ok(Some(fragment))
    }

    async fn page_slugs(&self) -> Result<Vec<String>> {
        let result = self
            .query("*[_type == \"page\"].slug.current", false)
            .await?;
        Ok(serde_json::from_value(result).unwrap_or_default())
    }

    async fn fragment_ids(&self) -> Result<Vec<String>> {
        let result = self.query("*[_type == \"fragment\"]._id", false).await?;
        Ok(serde_json::from_value(result).unwrap_or_default())
    }
}

/// Escape a value for embedding inside a double-quoted GROQ string literal
fn escape_groq(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn is_json_file(path: &Path) -> bool {
    path.is_file() && path.extension().map(|ext| ext == "json").unwrap_or(false)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
