use serde::Deserialize;

/// Top-level SerpAPI search response. Only the shopping results are
/// consumed; everything else in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub shopping_results: Vec<RawShoppingItem>,
}

/// One raw Google Shopping result as SerpAPI returns it. Every field is
/// optional: upstream shapes drift between engines and result types, so
/// the normalizer decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShoppingItem {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extracted_price: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default)]
    pub variants: Vec<RawVariant>,
    #[serde(default)]
    pub sizes: Vec<RawVariant>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub features: Vec<RawFeature>,
    /// SerpAPI calls the store "source".
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
    /// SerpAPI calls shipping info "delivery".
    #[serde(default)]
    pub delivery: Option<String>,
    #[serde(default)]
    pub shipping: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default)]
    pub reviews_link: Option<String>,
    #[serde(default)]
    pub serpapi_product_api: Option<String>,
}

impl RawShoppingItem {
    pub fn store(&self) -> Option<&str> {
        self.store.as_deref().or(self.source.as_deref())
    }

    pub fn shipping(&self) -> Option<&str> {
        self.shipping.as_deref().or(self.delivery.as_deref())
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref().or(self.product_link.as_deref())
    }

    pub fn upstream_id(&self) -> Option<&str> {
        self.product_id.as_deref().or(self.id.as_deref())
    }

    /// Variant list under whichever key upstream used.
    pub fn variant_entries(&self) -> &[RawVariant] {
        if !self.variants.is_empty() {
            &self.variants
        } else {
            &self.sizes
        }
    }
}

/// Gallery entries come back either as bare URL strings or as objects
/// with a `link` or `url` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawImage {
    Url(String),
    Object {
        #[serde(default)]
        link: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl RawImage {
    pub fn link(&self) -> Option<&str> {
        match self {
            RawImage::Url(url) => Some(url),
            RawImage::Object { link, url } => link.as_deref().or(url.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVariant {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub serpapi_link: Option<String>,
    #[serde(default)]
    pub selected: Option<bool>,
}

impl RawVariant {
    /// Human label for the variant: size first, then title.
    pub fn label(&self) -> Option<&str> {
        self.size.as_deref().or(self.title.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
}
