//! Fragrance × format matrix.
//!
//! Candles and sachets are not stored as individual records: every fragrance
//! lists the formats it is poured into, and each (fragrance, format) pair is
//! turned into a concrete [`Product`] with a derived id, name, price,
//! description, tags and characteristics.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::domain::aggregates::{Category, Discount, Product};
use crate::domain::value_objects::{Money, Slug};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Sachet,
    Candle,
    Jar,
}

impl FormatType {
    pub fn category(&self) -> Category {
        match self {
            Self::Sachet => Category::Sachets,
            Self::Candle | Self::Jar => Category::Candles,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Sachet => "Sachet",
            Self::Candle => "Candle",
            Self::Jar => "Candle in a tin",
        }
    }

    fn is_candle(&self) -> bool {
        !matches!(self, Self::Sachet)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub id: String,
    pub name: String,
    pub format_type: FormatType,
    pub size: String,
    pub description: String,
    pub base_price: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragrance {
    pub id: String,
    pub name: String,
    pub description: String,
    pub available_formats: Vec<String>,
    pub color: String,
}

impl Fragrance {
    pub fn is_available_in(&self, format_id: &str) -> bool {
        self.available_formats.iter().any(|f| f == format_id)
    }
}

/// Physical details of a format that only matter for product characteristics.
struct FormatDetails {
    shape: &'static str,
    dimensions: &'static str,
    weight: &'static str,
    burn_time: Option<&'static str>,
    tags: &'static [&'static str],
}

fn format_details(format_id: &str) -> Option<FormatDetails> {
    let d = match format_id {
        "sachet-hearts" => FormatDetails { shape: "Hearts", dimensions: "8×6 cm", weight: "15g", burn_time: None, tags: &["hearts"] },
        "sachet-clouds" => FormatDetails { shape: "Clouds", dimensions: "7×5 cm", weight: "12g", burn_time: None, tags: &["clouds"] },
        "sachet-florence" => FormatDetails { shape: "Florentine", dimensions: "10×8 cm", weight: "18g", burn_time: None, tags: &["florentine"] },
        "candle-glass-190" => FormatDetails { shape: "", dimensions: "Ø8×12 cm", weight: "320g", burn_time: Some("up to 45 hours"), tags: &[] },
        "candle-glass-100" => FormatDetails { shape: "", dimensions: "Ø7×9 cm", weight: "180g", burn_time: Some("up to 25 hours"), tags: &[] },
        "jar-iron-120" => FormatDetails { shape: "", dimensions: "Ø7×10 cm", weight: "220g", burn_time: Some("up to 30 hours"), tags: &[] },
        "jar-iron-50" => FormatDetails { shape: "", dimensions: "Ø6×7 cm", weight: "120g", burn_time: Some("up to 15 hours"), tags: &[] },
        _ => return None,
    };
    Some(d)
}

/// Scent pyramid and search tags of a fragrance.
fn fragrance_profile(fragrance_id: &str) -> (&'static str, &'static [&'static str]) {
    match fragrance_id {
        "ruby-grapefruit" => ("Top notes: ruby grapefruit, zest. Heart: white flowers. Base: musk.", &["grapefruit", "citrus", "ruby"]),
        "mint-lemon" => ("Top notes: fresh mint, lemon leaf. Heart: green herbs. Base: woody accords.", &["mint", "lemon", "freshness"]),
        "clean-cotton" => ("Top notes: ozone, sea breeze. Heart: cotton, lily. Base: musk, cedar.", &["cotton", "clean", "freshness"]),
        "prosecco-guava" => ("Top notes: sparkling prosecco, guava. Heart: peach, jasmine. Base: vanilla, amber.", &["prosecco", "guava", "celebration"]),
        "spicy-orange" => ("Top notes: spiced orange, cinnamon. Heart: clove, nutmeg. Base: sandalwood, patchouli.", &["orange", "spices", "warmth"]),
        "mango-mandarin" => ("Top notes: juicy mango, mandarin. Heart: tropical fruit. Base: coconut, vanilla.", &["mango", "mandarin", "tropics"]),
        "moss-fern" => ("Top notes: green leaves, dew. Heart: moss, fern. Base: earth, wood.", &["moss", "fern", "forest"]),
        "northern-cranberry" => ("Top notes: northern cranberry, lingonberry. Heart: pine, juniper. Base: amber, musk.", &["cranberry", "berries", "winter"]),
        "pear-caramel" => ("Top notes: juicy pear, caramel. Heart: vanilla, cream. Base: sugar, musk.", &["pear", "caramel", "sweet"]),
        "sage-sea-salt" => ("Top notes: sea salt, ozone. Heart: sage, eucalyptus. Base: driftwood, amber.", &["sage", "sea salt", "herbs"]),
        "maple-pecan" => ("Top notes: maple syrup, pecan. Heart: cinnamon, nutmeg. Base: vanilla, caramel.", &["maple", "pecan", "nuts"]),
        "pink-pepper-bergamot" => ("Top notes: pink pepper, bergamot. Heart: cardamom, lavender. Base: cedar, musk.", &["pink pepper", "bergamot", "spices"]),
        "apricot-jam" => ("Top notes: ripe apricot, peach. Heart: sugar, vanilla. Base: caramel, musk.", &["apricot", "jam", "sweet"]),
        "cactus-aloe" => ("Top notes: cactus, aloe. Heart: green leaves, cucumber. Base: white musk, cedar.", &["cactus", "aloe", "greenery"]),
        _ => ("", &[]),
    }
}

const SACHET_IMAGES: [&str; 2] = [
    "https://images.pexels.com/photos/5938596/pexels-photo-5938596.jpeg?auto=compress&cs=tinysrgb&w=800",
    "https://images.pexels.com/photos/7262774/pexels-photo-7262774.jpeg?auto=compress&cs=tinysrgb&w=800",
];
const CANDLE_IMAGES: [&str; 2] = [
    "https://images.pexels.com/photos/6454579/pexels-photo-6454579.jpeg?auto=compress&cs=tinysrgb&w=800",
    "https://images.pexels.com/photos/8413058/pexels-photo-8413058.jpeg?auto=compress&cs=tinysrgb&w=800",
];

/// FNV-1a; stable across runs so generated records do not churn.
fn stable_hash(s: &str) -> u32 {
    s.bytes().fold(0x811c_9dc5u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193))
}

/// The static fragrance and format tables plus per-pair discounts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FragranceMatrix {
    pub formats: Vec<Format>,
    pub fragrances: Vec<Fragrance>,
    #[serde(default)]
    pub discounts: HashMap<String, Discount>,
}

impl FragranceMatrix {
    pub fn standard() -> Self {
        Self { formats: standard_formats(), fragrances: standard_fragrances(), discounts: HashMap::new() }
    }

    pub fn fragrance(&self, id: &str) -> Option<&Fragrance> {
        self.fragrances.iter().find(|f| f.id == id)
    }

    pub fn format(&self, id: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.id == id)
    }

    pub fn formats_for_fragrance(&self, fragrance_id: &str) -> Vec<&Format> {
        match self.fragrance(fragrance_id) {
            Some(fragrance) => self.formats.iter().filter(|f| fragrance.is_available_in(&f.id)).collect(),
            None => vec![],
        }
    }

    pub fn fragrances_for_format(&self, format_id: &str) -> Vec<&Fragrance> {
        self.fragrances.iter().filter(|f| f.is_available_in(format_id)).collect()
    }

    /// Formats sold under a catalog category; empty for non-aromatic categories.
    pub fn formats_in_category(&self, category: Category) -> Vec<&Format> {
        self.formats.iter().filter(|f| f.format_type.category() == category).collect()
    }

    /// Flips whether `fragrance_id` is offered in `format_id`. Returns the new availability.
    pub fn toggle_availability(&mut self, fragrance_id: &str, format_id: &str) -> Result<bool, MatrixError> {
        if self.format(format_id).is_none() {
            return Err(MatrixError::UnknownFormat(format_id.to_string()));
        }
        let fragrance = self
            .fragrances
            .iter_mut()
            .find(|f| f.id == fragrance_id)
            .ok_or_else(|| MatrixError::UnknownFragrance(fragrance_id.to_string()))?;
        if fragrance.is_available_in(format_id) {
            fragrance.available_formats.retain(|f| f != format_id);
            Ok(false)
        } else {
            fragrance.available_formats.push(format_id.to_string());
            Ok(true)
        }
    }

    pub fn set_discount(&mut self, fragrance_id: &str, format_id: &str, percent: u8) -> Result<(), MatrixError> {
        if percent >= 100 {
            return Err(MatrixError::InvalidDiscount(percent));
        }
        let key = pair_id(fragrance_id, format_id);
        if percent == 0 {
            self.discounts.remove(&key);
        } else {
            self.discounts.insert(key, Discount { percent, active: true });
        }
        Ok(())
    }

    /// Builds the product for one (fragrance, format) pair.
    pub fn product(&self, fragrance_id: &str, format_id: &str) -> Result<Product, MatrixError> {
        let fragrance = self.fragrance(fragrance_id).ok_or_else(|| MatrixError::UnknownFragrance(fragrance_id.to_string()))?;
        let format = self.format(format_id).ok_or_else(|| MatrixError::UnknownFormat(format_id.to_string()))?;
        if !fragrance.is_available_in(format_id) {
            return Err(MatrixError::Unavailable { fragrance: fragrance_id.to_string(), format: format_id.to_string() });
        }
        let mut product = generate_product(fragrance, format);
        if let Some(discount) = self.discounts.get(&product.id).filter(|d| d.active) {
            // percent < 100 is checked in set_discount
            let _ = product.apply_discount(discount.percent);
        }
        Ok(product)
    }

    /// Every available pair, in fragrance order then the fragrance's format order.
    pub fn generate_all(&self) -> Vec<Product> {
        self.fragrances
            .iter()
            .flat_map(move |fragrance| {
                fragrance
                    .available_formats
                    .iter()
                    .filter_map(move |format_id| self.product(&fragrance.id, format_id).ok())
            })
            .collect()
    }
}

pub fn pair_id(fragrance_id: &str, format_id: &str) -> String {
    format!("{fragrance_id}-{format_id}")
}

fn generate_product(fragrance: &Fragrance, format: &Format) -> Product {
    let details = format_details(&format.id);
    let (notes, fragrance_tags) = fragrance_profile(&fragrance.id);
    let id = pair_id(&fragrance.id, &format.id);
    let hash = stable_hash(&id);

    let name = match format.format_type {
        FormatType::Sachet => {
            let shape = details.as_ref().map(|d| d.shape).filter(|s| !s.is_empty()).unwrap_or(format.size.as_str());
            format!("Sachet \"{}\" {}", fragrance.name, shape)
        }
        FormatType::Candle => format!("Candle \"{}\" {} (glass)", fragrance.name, format.size),
        FormatType::Jar => format!("Candle \"{}\" {} (tin)", fragrance.name, format.size),
    };

    let usage = if format.format_type.is_candle() {
        "Burn in a well-ventilated room. Never leave a burning candle unattended."
    } else {
        "Place in a wardrobe, drawer or car for a long-lasting scent."
    };
    let description = format!("{}. {}. {} {}", fragrance.description, format.description, notes, usage);

    let type_tags: &[&str] = match format.format_type {
        FormatType::Sachet => &["sachet", "air freshener"],
        FormatType::Candle | FormatType::Jar => &["candle", "cosiness"],
    };
    let format_tags = details.as_ref().map(|d| d.tags).unwrap_or(&[]);
    let mut tags: Vec<String> = Vec::new();
    for tag in fragrance_tags.iter().chain(type_tags).chain(format_tags) {
        if !tags.iter().any(|t| t.as_str() == *tag) {
            tags.push(tag.to_string());
        }
    }

    let category = format.format_type.category();
    let mut characteristics = BTreeMap::new();
    characteristics.insert("Fragrance".to_string(), fragrance.name.clone());
    characteristics.insert("Format".to_string(), format.name.clone());
    characteristics.insert("Size".to_string(), format.size.clone());
    characteristics.insert("Type".to_string(), format.format_type.label().to_string());
    characteristics.insert("Category".to_string(), category.title().to_string());
    let composition = if format.format_type.is_candle() { "100% soy wax, cotton wick" } else { "Natural herbs, essential oils" };
    characteristics.insert("Composition".to_string(), composition.to_string());
    if let Some(d) = &details {
        characteristics.insert("Dimensions".to_string(), d.dimensions.to_string());
        characteristics.insert("Weight".to_string(), d.weight.to_string());
    } else {
        characteristics.insert("Weight".to_string(), format.size.clone());
    }
    if format.format_type.is_candle() {
        if let Some(burn) = details.as_ref().and_then(|d| d.burn_time) {
            characteristics.insert("Burn time".to_string(), burn.to_string());
        }
        characteristics.insert("Wick".to_string(), "Cotton".to_string());
    }

    let images = if format.format_type.is_candle() { &CANDLE_IMAGES } else { &SACHET_IMAGES };

    Product {
        slug: Slug::from_parts([fragrance.name.as_str(), format.name.as_str(), format.size.as_str()]).ok().map(|s| s.to_string()),
        id,
        name,
        category,
        price: format.base_price.clone(),
        original_price: None,
        discount: None,
        image: images[(hash % 2) as usize].to_string(),
        description,
        in_stock: true,
        rating: 4.5,
        reviews: 50 + hash % 200,
        tags,
        characteristics,
        fragrance: Some(fragrance.id.clone()),
        format: Some(format.id.clone()),
        custom_set: None,
    }
}

fn format(id: &str, name: &str, format_type: FormatType, size: &str, description: &str, base_price: i64) -> Format {
    Format {
        id: id.to_string(),
        name: name.to_string(),
        format_type,
        size: size.to_string(),
        description: description.to_string(),
        base_price: Money::rub(base_price),
    }
}

pub fn standard_formats() -> Vec<Format> {
    vec![
        format("sachet-hearts", "Sachet \"Hearts\"", FormatType::Sachet, "15g", "Decorative heart-shaped sachets", 450),
        format("sachet-clouds", "Sachet \"Clouds\"", FormatType::Sachet, "12g", "Airy cloud-shaped sachets", 380),
        format("sachet-florence", "Florentine sachet", FormatType::Sachet, "18g", "Premium sachet in the Florentine style", 620),
        format("candle-glass-190", "Glass candle 190ml", FormatType::Candle, "190ml", "Large candle in a glass tumbler", 1490),
        format("candle-glass-100", "Glass candle 100ml", FormatType::Candle, "100ml", "Compact candle in a glass tumbler", 1150),
        format("jar-iron-120", "Tin jar 120ml", FormatType::Jar, "120ml", "Large candle in a tin jar", 1290),
        format("jar-iron-50", "Tin jar 50ml", FormatType::Jar, "50ml", "Small candle in a tin jar", 890),
    ]
}

const ALL_FORMATS: &[&str] = &["sachet-hearts", "sachet-clouds", "sachet-florence", "candle-glass-190", "candle-glass-100", "jar-iron-120", "jar-iron-50"];
const SACHETS_AND_SMALL: &[&str] = &["sachet-hearts", "sachet-clouds", "sachet-florence", "candle-glass-100", "jar-iron-120", "jar-iron-50"];
const CANDLES_ONLY: &[&str] = &["candle-glass-190", "candle-glass-100", "jar-iron-120", "jar-iron-50"];
const SMALL_CANDLES: &[&str] = &["candle-glass-100", "jar-iron-120", "jar-iron-50"];

fn fragrance(id: &str, name: &str, description: &str, formats: &[&str], color: &str) -> Fragrance {
    Fragrance {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        available_formats: formats.iter().map(|f| f.to_string()).collect(),
        color: color.to_string(),
    }
}

pub fn standard_fragrances() -> Vec<Fragrance> {
    vec![
        fragrance("ruby-grapefruit", "Ruby Grapefruit", "A bright citrus scent of ruby grapefruit", ALL_FORMATS, "#dc2626"),
        fragrance("mint-lemon", "Mint & Lemon Leaf", "A refreshing mint scent with lemon notes", ALL_FORMATS, "#16a34a"),
        fragrance("clean-cotton", "Clean Cotton", "A gentle scent of fresh cotton", &["sachet-hearts", "sachet-clouds", "sachet-florence", "jar-iron-50"], "#f8fafc"),
        fragrance("prosecco-guava", "Prosecco & Guava", "A festive scent with prosecco and guava notes", CANDLES_ONLY, "#fbbf24"),
        fragrance("spicy-orange", "Spiced Orange", "A warm citrus scent with spicy notes", SACHETS_AND_SMALL, "#ea580c"),
        fragrance("mango-mandarin", "Mango & Mandarin", "A tropical fruit scent", SACHETS_AND_SMALL, "#f59e0b"),
        fragrance("moss-fern", "Moss & Fern", "An earthy forest scent", CANDLES_ONLY, "#15803d"),
        fragrance("northern-cranberry", "Northern Cranberry", "A wintry berry scent", &["sachet-hearts", "sachet-clouds", "sachet-florence", "jar-iron-120", "jar-iron-50"], "#dc2626"),
        fragrance("pear-caramel", "Caramel Pear", "A sweet dessert scent", SMALL_CANDLES, "#d97706"),
        fragrance("sage-sea-salt", "Sage & Sea Salt", "A herbal mineral scent", ALL_FORMATS, "#059669"),
        fragrance("maple-pecan", "Maple Pecan", "A nutty autumn scent", SMALL_CANDLES, "#92400e"),
        fragrance("pink-pepper-bergamot", "Pink Pepper & Bergamot", "A spicy citrus scent", SACHETS_AND_SMALL, "#ec4899"),
        fragrance("apricot-jam", "Apricot Jam", "A sweet fruity scent", SMALL_CANDLES, "#f97316"),
        fragrance("cactus-aloe", "Cactus & Aloe", "A fresh green scent", SACHETS_AND_SMALL, "#10b981"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("unknown fragrance: {0}")]
    UnknownFragrance(String),
    #[error("unknown format: {0}")]
    UnknownFormat(String),
    #[error("fragrance {fragrance} is not available in format {format}")]
    Unavailable { fragrance: String, format: String },
    #[error("discount must be below 100 percent, got {0}")]
    InvalidDiscount(u8),
}
