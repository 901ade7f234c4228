//! Page, Fragment and Section models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Discriminator value for fragment-reference placeholder sections
pub const FRAGMENT_REF: &str = "fragmentRef";

/// One discriminated unit of page content (hero, rich text, carousel, FAQ, ...).
///
/// The CMS emits loosely-typed documents: which fields are present varies by
/// editor and schema version, so everything beyond the discriminator and the
/// identity key stays as raw JSON. The adapter layer in `render::adapt` is the
/// single place where these lax shapes become strict view-models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Block-type discriminator (`hero`, `richText`, `fragmentRef`, ...)
    #[serde(rename = "_type", default)]
    pub kind: String,

    /// Identity key assigned by the CMS, used for stable list rendering
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// All remaining type-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Section {
    /// Create an empty section of the given kind
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            key: None,
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mainly for tests and fixtures
    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Get a string field, treating non-strings as absent
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Get an array field, treating non-arrays as absent
    pub fn array_field(&self, name: &str) -> Option<&Vec<Value>> {
        self.fields.get(name).and_then(Value::as_array)
    }

    /// Whether this section is a fragment-reference placeholder
    pub fn is_fragment_ref(&self) -> bool {
        self.kind == FRAGMENT_REF
    }

    /// Referenced fragment id for a `fragmentRef` section.
    ///
    /// Two equivalent addressing shapes exist in the dataset: a direct
    /// `fragmentId` string and a `fragment: { _ref }` reference object. The
    /// first non-empty one wins; an empty string counts as missing.
    pub fn fragment_ref_id(&self) -> Option<&str> {
        let direct = self.str_field("fragmentId").filter(|id| !id.is_empty());
        if direct.is_some() {
            return direct;
        }
        self.fields
            .get("fragment")
            .and_then(|f| f.get("_ref"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// A page document: slug-addressed, with an optional hero and ordered sections.
///
/// Mutated only in the CMS; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDoc {
    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub hero: Option<Section>,

    /// Ordered content sections; order is display order
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Additional document fields we do not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reusable fragment: a named collection of sections referenced by pages.
///
/// Fragment section lists may themselves contain `fragmentRef` entries and
/// must be treated as untrusted, possibly cyclic input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
