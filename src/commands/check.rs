//! Validate the content graph
//!
//! The resolver drops broken references silently so a page render never
//! fails; this command is where editors get told what it dropped. It walks
//! every page, follows fragment references depth-first, and reports dangling
//! references, reference cycles, and unregistered block types.

use anyhow::{bail, Result};
use std::future::Future;
use std::pin::Pin;

use crate::content::{ContentStore, Section};
use crate::render::is_registered;
use crate::InnstaStay;

/// Problems found in the content graph
#[derive(Debug, Default)]
pub struct Report {
    /// Fragment references whose target does not exist
    pub dangling: Vec<String>,
    /// Fragment references that close a cycle
    pub cycles: Vec<String>,
    /// Sections whose discriminator has no registered renderer
    pub unknown_kinds: Vec<String>,
}

impl Report {
    pub fn problem_count(&self) -> usize {
        self.dangling.len() + self.cycles.len() + self.unknown_kinds.len()
    }
}

/// Check all pages and print a report; fails when problems are found
pub async fn run(app: &InnstaStay) -> Result<()> {
    let store = app.open_store()?;
    let report = check_all(store.as_ref()).await?;

    for entry in &report.dangling {
        println!("dangling reference: {}", entry);
    }
    for entry in &report.cycles {
        println!("reference cycle:    {}", entry);
    }
    for entry in &report.unknown_kinds {
        println!("unknown block type: {}", entry);
    }

    let problems = report.problem_count();
    if problems > 0 {
        bail!("Found {} content problem(s)", problems);
    }
    println!("Content graph is clean.");
    Ok(())
}

/// Walk every page in the store
pub async fn check_all(store: &dyn ContentStore) -> Result<Report> {
    let mut report = Report::default();

    for slug in store.page_slugs().await? {
        let Some(page) = store.page_by_slug(&slug, false).await? else {
            continue;
        };
        let mut blocks: Vec<Section> = Vec::new();
        if let Some(hero) = &page.hero {
            blocks.push(hero.clone());
        }
        blocks.extend(page.sections.iter().cloned());

        let context = format!("page {}", slug);
        let mut path = Vec::new();
        check_sections(store, &blocks, &context, &mut path, &mut report).await?;
    }

    Ok(report)
}

/// Depth-first walk over a section list, following fragment references.
///
/// `path` is the stack of fragment ids currently being expanded: a reference
/// to an id already on the stack is a cycle. Unlike the resolver's visited
/// set, revisiting an id off the stack is allowed here, since a shared
/// fragment referenced from two pages is legitimate.
fn check_sections<'a>(
    store: &'a dyn ContentStore,
    sections: &'a [Section],
    context: &'a str,
    path: &'a mut Vec<String>,
    report: &'a mut Report,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        for section in sections {
            if !section.is_fragment_ref() {
                if !section.kind.is_empty() && !is_registered(&section.kind) {
                    report
                        .unknown_kinds
                        .push(format!("{} -> {}", context, section.kind));
                }
                continue;
            }

            let Some(id) = section.fragment_ref_id() else {
                report.dangling.push(format!("{} -> (no id)", context));
                continue;
            };

            if path.iter().any(|p| p == id) {
                report.cycles.push(format!("{} -> {}", context, id));
                continue;
            }

            match store.fragment_by_id(id).await? {
                Some(fragment) => {
                    path.push(id.to_string());
                    let nested_context = format!("fragment {}", id);
                    check_sections(store, &fragment.sections, &nested_context, path, report)
                        .await?;
                    path.pop();
                }
                None => {
                    report.dangling.push(format!("{} -> {}", context, id));
                }
            }
        }
        Ok(())
    })
}
