//! Section rendering using embedded Tera templates
//!
//! Each resolved section is dispatched through a static registry keyed by its
//! `_type` discriminator. Unknown or malformed blocks render nothing; a
//! content-authoring mistake must never take a page down. Extending the set
//! of supported block types means adding a registry entry and a template, not
//! touching the resolver.

pub mod adapt;

use anyhow::Result;
use lazy_static::lazy_static;
use pulldown_cmark::{html, Options, Parser};
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Section;

/// Render Markdown (the CMS rich-text source format) to HTML
pub(crate) fn markdown_to_html(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(input, options);
    let mut output = String::with_capacity(input.len() * 2);
    html::push_html(&mut output, parser);
    output
}

/// A renderer for one block type
type RenderFn = fn(&TemplateRenderer, &Section) -> Result<String>;

lazy_static! {
    /// Static registry: discriminator -> render function
    static ref REGISTRY: HashMap<&'static str, RenderFn> = {
        let mut registry: HashMap<&'static str, RenderFn> = HashMap::new();
        registry.insert("hero", render_hero);
        registry.insert("richText", render_prose);
        registry.insert("hotelCarousel", render_hotel_carousel);
        registry.insert("poiGrid", render_poi_grid);
        registry.insert("imageBanner", render_image_banner);
        registry.insert("secondaryCta", render_cta_group);
        registry.insert("faq", render_faq);
        registry
    };
}

/// Whether a block-type discriminator has a registered renderer
pub fn is_registered(kind: &str) -> bool {
    REGISTRY.contains_key(kind)
}

/// Template renderer with embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("templates/layout.html")),
            ("not_found.html", include_str!("templates/not_found.html")),
            ("blocks/hero.html", include_str!("templates/blocks/hero.html")),
            (
                "blocks/rich_text.html",
                include_str!("templates/blocks/rich_text.html"),
            ),
            (
                "blocks/hotel_carousel.html",
                include_str!("templates/blocks/hotel_carousel.html"),
            ),
            (
                "blocks/poi_grid.html",
                include_str!("templates/blocks/poi_grid.html"),
            ),
            (
                "blocks/image_banner.html",
                include_str!("templates/blocks/image_banner.html"),
            ),
            (
                "blocks/secondary_cta.html",
                include_str!("templates/blocks/secondary_cta.html"),
            ),
            ("blocks/faq.html", include_str!("templates/blocks/faq.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render one resolved section.
    ///
    /// Returns `None` for an empty or unregistered discriminator, and also
    /// when the template itself fails; the caller simply skips the block.
    pub fn render_section(&self, section: &Section) -> Option<String> {
        if section.kind.is_empty() {
            return None;
        }
        let render = REGISTRY.get(section.kind.as_str())?;
        match render(self, section) {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!("Failed to render {} block: {}", section.kind, e);
                None
            }
        }
    }

    /// Render a full page: each block wrapped in a uniquely-keyed container,
    /// composed into the layout template.
    ///
    /// The container key is the section's own `_key` when present, else its
    /// position index.
    pub fn render_page(
        &self,
        config: &SiteConfig,
        page_title: &str,
        blocks: &[Section],
    ) -> Result<String> {
        let mut body = String::new();
        for (index, section) in blocks.iter().enumerate() {
            let Some(html) = self.render_section(section) else {
                continue;
            };
            let key = section
                .key
                .clone()
                .unwrap_or_else(|| index.to_string());
            body.push_str(&format!(
                "<section class=\"block block-{}\" data-key=\"{}\">\n{}\n</section>\n",
                section.kind, key, html
            ));
        }

        let mut context = Context::new();
        context.insert("site_title", &config.title);
        context.insert("site_description", &config.description);
        context.insert("site_url", &config.url);
        context.insert("language", &config.language);
        context.insert("page_title", page_title);
        context.insert("body", &body);
        Ok(self.tera.render("layout.html", &context)?)
    }

    /// Render the 404 page
    pub fn render_not_found(&self, config: &SiteConfig) -> Result<String> {
        let mut context = Context::new();
        context.insert("site_title", &config.title);
        context.insert("language", &config.language);
        Ok(self.tera.render("not_found.html", &context)?)
    }
}

fn render_block<T: serde::Serialize>(
    renderer: &TemplateRenderer,
    template: &str,
    view: &T,
) -> Result<String> {
    let mut context = Context::new();
    context.insert("block", view);
    Ok(renderer.tera.render(template, &context)?)
}

fn render_hero(renderer: &TemplateRenderer, section: &Section) -> Result<String> {
    render_block(renderer, "blocks/hero.html", &adapt::adapt_hero(section))
}

fn render_prose(renderer: &TemplateRenderer, section: &Section) -> Result<String> {
    render_block(renderer, "blocks/rich_text.html", &adapt::adapt_prose(section))
}

fn render_hotel_carousel(renderer: &TemplateRenderer, section: &Section) -> Result<String> {
    render_block(
        renderer,
        "blocks/hotel_carousel.html",
        &adapt::adapt_hotel_carousel(section),
    )
}

fn render_poi_grid(renderer: &TemplateRenderer, section: &Section) -> Result<String> {
    render_block(renderer, "blocks/poi_grid.html", &adapt::adapt_poi_grid(section))
}

fn render_image_banner(renderer: &TemplateRenderer, section: &Section) -> Result<String> {
    render_block(
        renderer,
        "blocks/image_banner.html",
        &adapt::adapt_image_banner(section),
    )
}

fn render_cta_group(renderer: &TemplateRenderer, section: &Section) -> Result<String> {
    render_block(
        renderer,
        "blocks/secondary_cta.html",
        &adapt::adapt_cta_group(section),
    )
}

fn render_faq(renderer: &TemplateRenderer, section: &Section) -> Result<String> {
    render_block(renderer, "blocks/faq.html", &adapt::adapt_faq(section))
}
