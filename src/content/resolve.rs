//! Fragment resolution - flattens fragment references into concrete sections
//!
//! Pages reference reusable fragments through `fragmentRef` placeholder
//! sections. Resolution splices each referenced fragment's own sections in
//! place of the placeholder, recursively, so the renderer only ever sees
//! displayable blocks. The fragment graph lives in the CMS and is untrusted:
//! references can dangle, repeat, or form cycles, and none of that may crash
//! a page render.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use super::{ContentStore, PageDoc, Section};

/// Resolve a full page into its flat block list: `[hero, ...sections]` with
/// every fragment reference expanded.
///
/// Each call uses a fresh visited set, so concurrent renders of different
/// pages cannot interfere with one another.
pub async fn resolve_page(store: &dyn ContentStore, page: &PageDoc) -> Vec<Section> {
    let mut blocks = Vec::with_capacity(page.sections.len() + 1);
    if let Some(hero) = &page.hero {
        blocks.push(hero.clone());
    }
    blocks.extend(page.sections.iter().cloned());

    let mut seen = HashSet::new();
    resolve_sections(store, &blocks, &mut seen).await
}

/// Resolve an ordered section list, expanding fragment references in place.
///
/// Guarantees:
/// - non-reference sections pass through unchanged, order preserved;
/// - a fragment's sections land exactly where its reference sat;
/// - no fragment id is expanded more than once per `seen` set, which bounds
///   recursion on cyclic data and deduplicates sibling references;
/// - a missing id, unknown fragment, or store failure drops the reference
///   silently; resolution itself never fails.
///
/// Fetches happen sequentially in document order, at most one per distinct
/// fragment id.
pub fn resolve_sections<'a>(
    store: &'a dyn ContentStore,
    sections: &'a [Section],
    seen: &'a mut HashSet<String>,
) -> Pin<Box<dyn Future<Output = Vec<Section>> + Send + 'a>> {
    // Boxed because async recursion needs an indirected future type.
    Box::pin(async move {
        let mut resolved = Vec::with_capacity(sections.len());

        for section in sections {
            if !section.is_fragment_ref() {
                resolved.push(section.clone());
                continue;
            }

            let Some(id) = section.fragment_ref_id() else {
                tracing::debug!("Dropping fragment reference with no id");
                continue;
            };

            // Already expanded somewhere in this resolution (duplicate or cycle)
            if !seen.insert(id.to_string()) {
                tracing::debug!("Dropping repeated fragment reference: {}", id);
                continue;
            }

            match store.fragment_by_id(id).await {
                Ok(Some(fragment)) => {
                    let nested = resolve_sections(store, &fragment.sections, seen).await;
                    resolved.extend(nested);
                }
                Ok(None) => {
                    tracing::warn!("Fragment not found, dropping reference: {}", id);
                }
                Err(e) => {
                    // Treated exactly like not-found: omit the branch
                    tracing::warn!("Fragment fetch failed, dropping reference {}: {}", id, e);
                }
            }
        }

        resolved
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::section::FRAGMENT_REF;
    use crate::content::{Fragment, MemoryStore};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::json;

    fn text(label: &str) -> Section {
        Section::new("richText").with_field("body", json!(label))
    }

    fn fragment_ref(id: &str) -> Section {
        Section::new(FRAGMENT_REF).with_field("fragmentId", json!(id))
    }

    fn fragment(id: &str, sections: Vec<Section>) -> Fragment {
        Fragment {
            id: id.to_string(),
            title: None,
            sections,
            extra: Default::default(),
        }
    }

    async fn resolve(store: &MemoryStore, sections: &[Section]) -> Vec<Section> {
        let mut seen = HashSet::new();
        resolve_sections(store, sections, &mut seen).await
    }

    #[tokio::test]
    async fn test_identity_without_references() {
        let store = MemoryStore::new();
        let sections = vec![text("a"), text("b"), text("c")];
        let resolved = resolve(&store, &sections).await;
        assert_eq!(resolved, sections);
    }

    #[tokio::test]
    async fn test_single_reference_splices_in_place() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment("f", vec![text("A"), text("B")]));

        let sections = vec![text("X"), fragment_ref("f"), text("Y")];
        let resolved = resolve(&store, &sections).await;
        assert_eq!(resolved, vec![text("X"), text("A"), text("B"), text("Y")]);
    }

    #[tokio::test]
    async fn test_nested_references() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment("outer", vec![text("A"), fragment_ref("inner")]));
        store.insert_fragment(fragment("inner", vec![text("B")]));

        let resolved = resolve(&store, &[fragment_ref("outer")]).await;
        assert_eq!(resolved, vec![text("A"), text("B")]);
    }

    #[tokio::test]
    async fn test_self_reference_expands_once() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment("f", vec![text("A"), fragment_ref("f")]));

        let resolved = resolve(&store, &[fragment_ref("f")]).await;
        assert_eq!(resolved, vec![text("A")]);
    }

    #[tokio::test]
    async fn test_pure_self_reference_yields_nothing() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment("f", vec![fragment_ref("f")]));

        let resolved = resolve(&store, &[fragment_ref("f")]).await;
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_mutual_cycle_terminates() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment("a", vec![text("A"), fragment_ref("b")]));
        store.insert_fragment(fragment("b", vec![text("B"), fragment_ref("a")]));

        let resolved = resolve(&store, &[fragment_ref("a")]).await;
        assert_eq!(resolved, vec![text("A"), text("B")]);
    }

    #[tokio::test]
    async fn test_missing_fragment_dropped() {
        let store = MemoryStore::new();
        let resolved = resolve(&store, &[fragment_ref("missing")]).await;
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_reference_without_id_dropped() {
        let store = MemoryStore::new();
        let bare = Section::new(FRAGMENT_REF);
        let resolved = resolve(&store, &[text("X"), bare, text("Y")]).await;
        assert_eq!(resolved, vec![text("X"), text("Y")]);
    }

    #[tokio::test]
    async fn test_sibling_duplicates_expand_first_only() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment("f", vec![text("A")]));

        let sections = vec![fragment_ref("f"), text("M"), fragment_ref("f")];
        let resolved = resolve(&store, &sections).await;
        assert_eq!(resolved, vec![text("A"), text("M")]);
    }

    #[tokio::test]
    async fn test_resolved_list_has_no_references() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment(
            "f",
            vec![text("A"), fragment_ref("g"), fragment_ref("f")],
        ));
        store.insert_fragment(fragment("g", vec![text("B")]));

        let resolved = resolve(&store, &[fragment_ref("f"), fragment_ref("nope")]).await;
        assert!(resolved.iter().all(|s| !s.is_fragment_ref()));
    }

    /// Store whose fragment lookups always fail, for failure-path tests
    struct FailingStore;

    #[async_trait]
    impl ContentStore for FailingStore {
        async fn page_by_slug(&self, _slug: &str, _preview: bool) -> Result<Option<PageDoc>> {
            Err(anyhow!("store down"))
        }

        async fn fragment_by_id(&self, _id: &str) -> Result<Option<Fragment>> {
            Err(anyhow!("store down"))
        }

        async fn page_slugs(&self) -> Result<Vec<String>> {
            Err(anyhow!("store down"))
        }

        async fn fragment_ids(&self) -> Result<Vec<String>> {
            Err(anyhow!("store down"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_treated_as_not_found() {
        let store = FailingStore;
        let mut seen = HashSet::new();
        let sections = vec![text("X"), fragment_ref("f"), text("Y")];
        let resolved = resolve_sections(&store, &sections, &mut seen).await;
        assert_eq!(resolved, vec![text("X"), text("Y")]);
    }

    #[tokio::test]
    async fn test_resolve_page_prepends_hero() {
        let mut store = MemoryStore::new();
        store.insert_fragment(fragment("f", vec![text("A")]));

        let page = PageDoc {
            slug: "home".to_string(),
            title: None,
            hero: Some(Section::new("hero").with_field("title", json!("Welcome"))),
            sections: vec![fragment_ref("f"), text("B")],
            extra: Default::default(),
        };

        let resolved = resolve_page(&store, &page).await;
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].kind, "hero");
        assert_eq!(resolved[1], text("A"));
        assert_eq!(resolved[2], text("B"));
    }

    #[tokio::test]
    async fn test_resolve_page_without_hero() {
        let store = MemoryStore::new();
        let page = PageDoc {
            slug: "home".to_string(),
            title: None,
            hero: None,
            sections: vec![text("A")],
            extra: Default::default(),
        };

        let resolved = resolve_page(&store, &page).await;
        assert_eq!(resolved, vec![text("A")]);
    }
}
