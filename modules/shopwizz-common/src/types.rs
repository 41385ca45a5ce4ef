use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// --- Query Intent ---

/// Structured shopping intent extracted from one user turn.
/// Produced by the language model, consumed by the search orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Filter set attached to a query intent. Keys keep the order they
/// appeared in the JSON object: the orchestrator appends filter values
/// to the upstream query string in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(serde_json::Map<String, Value>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

// --- Chat History ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    /// Anything else the client sends; dropped when building the prompt.
    Other,
}

impl<'de> Deserialize<'de> for ChatRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let role = String::deserialize(deserializer)?;
        Ok(match role.as_str() {
            "user" => ChatRole::User,
            "assistant" => ChatRole::Assistant,
            _ => ChatRole::Other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// --- Canonical Product ---

/// The normalized, UI-stable representation of one shopping result,
/// independent of which upstream provider produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub prices: Vec<String>,
    pub typical_prices: TypicalPrices,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub extensions: Vec<String>,
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub sizes: SizeMap,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypicalPrices {
    pub low: String,
    pub high: String,
    pub shown_price: String,
}

impl TypicalPrices {
    /// Upstream carries no genuine low/high range, so all three slots
    /// hold the single extracted price.
    pub fn uniform(price: impl Into<String>) -> Self {
        let price = price.into();
        Self {
            low: price.clone(),
            high: price.clone(),
            shown_price: price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub media_type: String,
    pub link: String,
}

impl MediaItem {
    pub fn image(link: impl Into<String>) -> Self {
        Self {
            media_type: "image".to_string(),
            link: link.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub text: String,
}

/// One purchasable variant, keyed in [`SizeMap`] by its human label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_link: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

/// Label → variant map that serializes as a JSON object and keeps
/// upstream variant order. Labels are unique; a re-inserted label
/// replaces the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeMap(Vec<(String, SizeOption)>);

impl SizeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, label: &str) -> Option<&SizeOption> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, o)| o)
    }

    pub fn insert(&mut self, label: impl Into<String>, option: SizeOption) {
        let label = label.into();
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = option,
            None => self.0.push((label, option)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SizeOption)> {
        self.0.iter().map(|(l, o)| (l, o))
    }
}

impl Serialize for SizeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, option) in &self.0 {
            map.serialize_entry(label, option)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SizeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SizeMapVisitor;

        impl<'de> Visitor<'de> for SizeMapVisitor {
            type Value = SizeMap;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of size labels to options")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SizeMap, A::Error> {
                let mut sizes = SizeMap::new();
                while let Some((label, option)) = access.next_entry::<String, SizeOption>()? {
                    sizes.insert(label, option);
                }
                Ok(sizes)
            }
        }

        deserializer.deserialize_map(SizeMapVisitor)
    }
}
