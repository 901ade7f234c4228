//! Render a single page to a file or stdout

use anyhow::{bail, Result};
use std::path::Path;

use crate::content::resolve_page;
use crate::render::TemplateRenderer;
use crate::InnstaStay;

/// Resolve and render one page by slug
pub async fn run(app: &InnstaStay, slug: &str, output: Option<&Path>) -> Result<()> {
    let store = app.open_store()?;
    let renderer = TemplateRenderer::new()?;

    let Some(page) = store.page_by_slug(slug, false).await? else {
        bail!("No page with slug: {}", slug);
    };

    let blocks = resolve_page(store.as_ref(), &page).await;
    let title = page.title.as_deref().unwrap_or(&page.slug);
    let html = renderer.render_page(&app.config, title, &blocks)?;

    match output {
        Some(path) => {
            std::fs::write(path, &html)?;
            println!("Rendered {} to {:?}", slug, path);
        }
        None => println!("{}", html),
    }

    Ok(())
}
