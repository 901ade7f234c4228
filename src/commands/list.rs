//! List store content

use anyhow::Result;

use crate::InnstaStay;

/// List store content by type
pub async fn run(app: &InnstaStay, content_type: &str) -> Result<()> {
    let store = app.open_store()?;

    match content_type {
        "page" | "pages" => {
            let slugs = store.page_slugs().await?;
            println!("Pages ({}):", slugs.len());
            for slug in slugs {
                match store.page_by_slug(&slug, false).await? {
                    Some(page) => println!(
                        "  {} - {} ({} sections)",
                        slug,
                        page.title.as_deref().unwrap_or("(untitled)"),
                        page.sections.len()
                    ),
                    None => println!("  {}", slug),
                }
            }
        }
        "fragment" | "fragments" => {
            let ids = store.fragment_ids().await?;
            println!("Fragments ({}):", ids.len());
            for id in ids {
                match store.fragment_by_id(&id).await? {
                    Some(fragment) => println!(
                        "  {} - {} ({} sections)",
                        id,
                        fragment.title.as_deref().unwrap_or("(untitled)"),
                        fragment.sections.len()
                    ),
                    None => println!("  {}", id),
                }
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: page, fragment", content_type);
        }
    }

    Ok(())
}
