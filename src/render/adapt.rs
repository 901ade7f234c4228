//! Block adapters - lax CMS sections to strict view-models
//!
//! The CMS is forgiving about shapes: fields go missing, the same concept
//! shows up under synonymous names (`title` vs `headline`), images arrive as
//! bare strings or nested asset objects. Adapters absorb all of that here,
//! once, so templates never null-check. Every view-model field has a defined
//! default: empty string, empty list, `primary` variant, `center` alignment.

use serde::Serialize;
use serde_json::Value;

use super::markdown_to_html;
use crate::content::Section;

/// Pick the best available URL out of an image-like value.
///
/// Precedence is fixed and relied on downstream: explicit `src` field,
/// then generic `url`, then nested `asset.url`, then empty. A bare string
/// is already a URL.
pub fn pick_image_url(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if let Some(url) = value.as_str() {
        return url.to_string();
    }
    value
        .get("src")
        .and_then(Value::as_str)
        .or_else(|| value.get("url").and_then(Value::as_str))
        .or_else(|| {
            value
                .get("asset")
                .and_then(|a| a.get("url"))
                .and_then(Value::as_str)
        })
        .unwrap_or("")
        .to_string()
}

/// First non-empty string among the named fields, else empty
fn first_str(section: &Section, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| section.str_field(name).filter(|s| !s.is_empty()))
        .unwrap_or("")
        .to_string()
}

fn str_of(value: &Value, name: &str) -> String {
    value
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn first_str_of(value: &Value, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str).filter(|s| !s.is_empty()))
        .unwrap_or("")
        .to_string()
}

/// Hero banner view-model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroView {
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub cta_label: String,
    pub cta_href: String,
    pub alignment: String,
}

pub fn adapt_hero(section: &Section) -> HeroView {
    let (cta_label, cta_href) = match section.fields.get("cta") {
        Some(cta) => (str_of(cta, "label"), str_of(cta, "href")),
        None => (first_str(section, &["ctaLabel"]), first_str(section, &["ctaHref"])),
    };

    let alignment = first_str(section, &["alignment"]);
    HeroView {
        title: first_str(section, &["title", "headline"]),
        subtitle: first_str(section, &["subtitle", "subheadline"]),
        image: pick_image_url(section.fields.get("image")),
        cta_label,
        cta_href,
        alignment: if alignment.is_empty() {
            "center".to_string()
        } else {
            alignment
        },
    }
}

/// Rich text view-model; `body` is rendered HTML
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProseView {
    pub title: String,
    pub body: String,
}

pub fn adapt_prose(section: &Section) -> ProseView {
    ProseView {
        title: first_str(section, &["title", "headline"]),
        body: markdown_to_html(&first_str(section, &["body", "text"])),
    }
}

/// One hotel card in a carousel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelCardView {
    pub name: String,
    pub image: String,
    pub area: String,
    pub rating: String,
    pub href: String,
}

/// Hotel carousel view-model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelCarouselView {
    pub title: String,
    pub hotels: Vec<HotelCardView>,
}

pub fn adapt_hotel_carousel(section: &Section) -> HotelCarouselView {
    let hotels = section
        .array_field("hotels")
        .map(|items| {
            items
                .iter()
                .map(|item| HotelCardView {
                    name: first_str_of(item, &["name", "title"]),
                    image: pick_image_url(item.get("image")),
                    area: str_of(item, "area"),
                    rating: str_of(item, "rating"),
                    href: first_str_of(item, &["href", "url"]),
                })
                .collect()
        })
        .unwrap_or_default();

    HotelCarouselView {
        title: first_str(section, &["title", "headline"]),
        hotels,
    }
}

/// One point-of-interest tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiView {
    pub name: String,
    pub image: String,
    pub blurb: String,
    pub distance: String,
}

/// Point-of-interest / feature grid view-model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiGridView {
    pub title: String,
    pub items: Vec<PoiView>,
}

pub fn adapt_poi_grid(section: &Section) -> PoiGridView {
    let items = section
        .array_field("items")
        .or_else(|| section.array_field("pois"))
        .map(|items| {
            items
                .iter()
                .map(|item| PoiView {
                    name: first_str_of(item, &["name", "title"]),
                    image: pick_image_url(item.get("image")),
                    blurb: first_str_of(item, &["blurb", "description"]),
                    distance: str_of(item, "distance"),
                })
                .collect()
        })
        .unwrap_or_default();

    PoiGridView {
        title: first_str(section, &["title", "headline"]),
        items,
    }
}

/// Full-width image banner view-model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageBannerView {
    pub image: String,
    pub alt: String,
    pub caption: String,
    pub href: String,
}

pub fn adapt_image_banner(section: &Section) -> ImageBannerView {
    ImageBannerView {
        image: pick_image_url(section.fields.get("image")),
        alt: first_str(section, &["alt"]),
        caption: first_str(section, &["caption"]),
        href: first_str(section, &["href", "url"]),
    }
}

/// One call-to-action button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaButtonView {
    pub label: String,
    pub href: String,
    pub variant: String,
}

/// Secondary call-to-action group view-model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaGroupView {
    pub title: String,
    pub body: String,
    pub buttons: Vec<CtaButtonView>,
}

pub fn adapt_cta_group(section: &Section) -> CtaGroupView {
    let buttons = section
        .array_field("buttons")
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    let variant = str_of(item, "variant");
                    CtaButtonView {
                        label: first_str_of(item, &["label", "text"]),
                        href: first_str_of(item, &["href", "url"]),
                        variant: if variant.is_empty() {
                            "primary".to_string()
                        } else {
                            variant
                        },
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    CtaGroupView {
        title: first_str(section, &["title", "headline"]),
        body: markdown_to_html(&first_str(section, &["body", "text"])),
        buttons,
    }
}

/// One FAQ entry; `answer` is rendered HTML
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqEntryView {
    pub question: String,
    pub answer: String,
}

/// FAQ list view-model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqView {
    pub title: String,
    pub entries: Vec<FaqEntryView>,
}

pub fn adapt_faq(section: &Section) -> FaqView {
    let entries = section
        .array_field("items")
        .or_else(|| section.array_field("questions"))
        .map(|items| {
            items
                .iter()
                .map(|item| FaqEntryView {
                    question: str_of(item, "question"),
                    answer: markdown_to_html(&str_of(item, "answer")),
                })
                .collect()
        })
        .unwrap_or_default();

    FaqView {
        title: first_str(section, &["title", "headline"]),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hero_headline_fallback() {
        let section = Section::new("hero").with_field("headline", json!("Book direct"));
        let view = adapt_hero(&section);
        assert_eq!(view.title, "Book direct");
    }

    #[test]
    fn test_hero_title_wins_over_headline() {
        let section = Section::new("hero")
            .with_field("title", json!("Title"))
            .with_field("headline", json!("Headline"));
        assert_eq!(adapt_hero(&section).title, "Title");
    }

    #[test]
    fn test_hero_defaults_never_missing() {
        let view = adapt_hero(&Section::new("hero"));
        assert_eq!(view.title, "");
        assert_eq!(view.subtitle, "");
        assert_eq!(view.image, "");
        assert_eq!(view.cta_label, "");
        assert_eq!(view.alignment, "center");
    }

    #[test]
    fn test_hero_nested_cta() {
        let section = Section::new("hero")
            .with_field("cta", json!({"label": "Check rates", "href": "/rates"}));
        let view = adapt_hero(&section);
        assert_eq!(view.cta_label, "Check rates");
        assert_eq!(view.cta_href, "/rates");
    }

    #[test]
    fn test_image_precedence_chain() {
        assert_eq!(
            pick_image_url(Some(&json!({"src": "a", "url": "b", "asset": {"url": "c"}}))),
            "a"
        );
        assert_eq!(
            pick_image_url(Some(&json!({"url": "b", "asset": {"url": "c"}}))),
            "b"
        );
        assert_eq!(pick_image_url(Some(&json!({"asset": {"url": "c"}}))), "c");
        assert_eq!(pick_image_url(Some(&json!({}))), "");
        assert_eq!(pick_image_url(None), "");
        assert_eq!(pick_image_url(Some(&json!("bare-url"))), "bare-url");
    }

    #[test]
    fn test_prose_markdown_body() {
        let section = Section::new("richText")
            .with_field("body", json!("Stay **direct** and save"));
        let view = adapt_prose(&section);
        assert!(view.body.contains("<strong>direct</strong>"));
    }

    #[test]
    fn test_cta_group_variant_default() {
        let section = Section::new("secondaryCta").with_field(
            "buttons",
            json!([
                {"label": "Book", "href": "/book"},
                {"label": "Call", "href": "/call", "variant": "ghost"}
            ]),
        );
        let view = adapt_cta_group(&section);
        assert_eq!(view.buttons[0].variant, "primary");
        assert_eq!(view.buttons[1].variant, "ghost");
    }

    #[test]
    fn test_hotel_carousel_lax_items() {
        let section = Section::new("hotelCarousel").with_field(
            "hotels",
            json!([
                {"name": "Town Inn Suites", "image": {"asset": {"url": "img"}}},
                {"title": "Pantages Hotel"}
            ]),
        );
        let view = adapt_hotel_carousel(&section);
        assert_eq!(view.hotels.len(), 2);
        assert_eq!(view.hotels[0].image, "img");
        assert_eq!(view.hotels[1].name, "Pantages Hotel");
        assert_eq!(view.hotels[1].image, "");
    }

    #[test]
    fn test_faq_entries_default_empty() {
        let view = adapt_faq(&Section::new("faq"));
        assert_eq!(view.title, "");
        assert!(view.entries.is_empty());
    }

    #[test]
    fn test_poi_grid_accepts_pois_synonym() {
        let section = Section::new("poiGrid")
            .with_field("pois", json!([{"name": "CN Tower", "distance": "1.2 km"}]));
        let view = adapt_poi_grid(&section);
        assert_eq!(view.items[0].name, "CN Tower");
        assert_eq!(view.items[0].distance, "1.2 km");
    }
}
