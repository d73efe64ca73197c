//! Hand-written catalog records: books, baskets and candle stands.

use std::collections::BTreeMap;

use crate::domain::aggregates::{Category, Product};
use crate::domain::value_objects::Money;

struct BaseRecord {
    id: &'static str,
    slug: &'static str,
    name: &'static str,
    category: Category,
    price: i64,
    image: &'static str,
    description: &'static str,
    rating: f32,
    reviews: u32,
    tags: &'static [&'static str],
    characteristics: &'static [(&'static str, &'static str)],
}

impl BaseRecord {
    fn into_product(self) -> Product {
        Product {
            id: self.id.to_string(),
            slug: Some(self.slug.to_string()),
            name: self.name.to_string(),
            category: self.category,
            price: Money::rub(self.price),
            original_price: None,
            discount: None,
            image: self.image.to_string(),
            description: self.description.to_string(),
            in_stock: true,
            rating: self.rating,
            reviews: self.reviews,
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            characteristics: self
                .characteristics
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            fragrance: None,
            format: None,
            custom_set: None,
        }
    }
}

const BOOK_IMAGE: &str = "https://images.pexels.com/photos/4866041/pexels-photo-4866041.jpeg?auto=compress&cs=tinysrgb&w=800";
const GOALS_IMAGE: &str = "https://images.pexels.com/photos/5711937/pexels-photo-5711937.jpeg?auto=compress&cs=tinysrgb&w=800";
const BASKET_IMAGE: &str = "https://images.pexels.com/photos/4792488/pexels-photo-4792488.jpeg?auto=compress&cs=tinysrgb&w=800";
const ORGANIZER_IMAGE: &str = "https://images.pexels.com/photos/6436293/pexels-photo-6436293.jpeg?auto=compress&cs=tinysrgb&w=800";
const STAND_IMAGE: &str = "https://images.pexels.com/photos/8413058/pexels-photo-8413058.jpeg?auto=compress&cs=tinysrgb&w=800";

pub fn base_products() -> Vec<Product> {
    let records = [
        BaseRecord {
            id: "book-001",
            slug: "fruit-and-berry-alphabet-from-a-to-z",
            name: "The Fruit & Berry Alphabet from A to Z",
            category: Category::Books,
            price: 890,
            image: BOOK_IMAGE,
            description: "Book. A complete guide to more than 100 fruits and berries: their properties, how to grow them, recipes and storage tips. A companion for gardeners and healthy-eating enthusiasts.",
            rating: 4.8,
            reviews: 2847,
            tags: &["book", "fruit", "berries", "reference", "gardening", "alphabet"],
            characteristics: &[("Author", "A.V. Sadovnikov"), ("Publisher", "Priroda"), ("Year", "2023"), ("Pages", "280"), ("Dimensions", "21×14×2 cm"), ("Weight", "450g"), ("Binding", "Hardcover")],
        },
        BaseRecord {
            id: "book-002",
            slug: "turning-dreams-into-real-goals",
            name: "Turning Dreams into Real Goals",
            category: Category::Books,
            price: 750,
            image: GOALS_IMAGE,
            description: "Book. A practical guide to setting and reaching goals with proven planning methods, motivation techniques and step-by-step action plans for personal and professional growth.",
            rating: 4.6,
            reviews: 1234,
            tags: &["book", "dreams", "goals", "planning", "motivation", "success"],
            characteristics: &[("Author", "M.P. Tseleustremlenny"), ("Publisher", "Uspekh"), ("Year", "2023"), ("Pages", "220"), ("Dimensions", "20×13×1.5 cm"), ("Weight", "320g"), ("Binding", "Hardcover")],
        },
        BaseRecord {
            id: "book-003",
            slug: "diary-of-an-orderly-woman",
            name: "Diary of an Orderly Woman",
            category: Category::Books,
            price: 820,
            image: BOOK_IMAGE,
            description: "Book. A personal journal for day planning, self-development and a balanced life, with sections for goals, gratitude and reflection.",
            rating: 4.7,
            reviews: 987,
            tags: &["book", "diary", "woman", "planning", "self-development", "harmony"],
            characteristics: &[("Author", "E.A. Garmonova"), ("Publisher", "Zhensky Mir"), ("Year", "2023"), ("Pages", "240"), ("Dimensions", "19×12×2 cm"), ("Weight", "380g"), ("Binding", "Hardcover")],
        },
        BaseRecord {
            id: "basket-001",
            slug: "large-woven-rattan-basket",
            name: "Large woven rattan basket",
            category: Category::Baskets,
            price: 2890,
            image: BASKET_IMAGE,
            description: "A large natural rattan basket for laundry, toys or decor. Handmade in Indonesia, holds up to 15 kg.",
            rating: 4.8,
            reviews: 345,
            tags: &["rattan", "large", "storage", "natural", "woven"],
            characteristics: &[("Material", "100% rattan"), ("Dimensions", "45×35×30 cm"), ("Volume", "47 litres"), ("Weight", "1200g"), ("Max load", "15 kg")],
        },
        BaseRecord {
            id: "basket-002",
            slug: "set-of-3-jute-baskets",
            name: "Set of 3 jute baskets",
            category: Category::Baskets,
            price: 1890,
            image: BASKET_IMAGE,
            description: "Three eco-friendly jute baskets in different sizes with sturdy handles. Machine washable at 30°C.",
            rating: 4.7,
            reviews: 267,
            tags: &["jute", "set", "eco", "organization", "assorted sizes"],
            characteristics: &[("Material", "Jute"), ("Pieces", "3"), ("Dimensions", "S: 20×15 cm, M: 25×20 cm, L: 30×25 cm"), ("Weight", "800g"), ("Care", "Machine wash 30°C")],
        },
        BaseRecord {
            id: "basket-003",
            slug: "cosmetics-organizer-with-compartments",
            name: "Cosmetics organizer with compartments",
            category: Category::Baskets,
            price: 1450,
            image: ORGANIZER_IMAGE,
            description: "A bamboo organizer with six compartments for cosmetics and accessories. Moisture-resistant finish.",
            rating: 4.9,
            reviews: 423,
            tags: &["organizer", "cosmetics", "bamboo", "compartments", "stylish"],
            characteristics: &[("Material", "Bamboo"), ("Compartments", "6"), ("Dimensions", "25×20×15 cm"), ("Weight", "650g")],
        },
        BaseRecord {
            id: "stand-001",
            slug: "classic-wooden-candle-stand",
            name: "Wooden candle stand \"Classic\"",
            category: Category::Baskets,
            price: 890,
            image: STAND_IMAGE,
            description: "An oak candle stand that protects surfaces from wax. Hand-finished with natural oil.",
            rating: 4.7,
            reviews: 156,
            tags: &["stand", "wood", "oak", "candles", "protection"],
            characteristics: &[("Material", "Solid oak"), ("Dimensions", "Ø12×2 cm"), ("Weight", "180g"), ("Fits", "Candles up to 10 cm across")],
        },
        BaseRecord {
            id: "stand-002",
            slug: "vintage-patterned-metal-stand",
            name: "Metal stand \"Vintage\" with pattern",
            category: Category::Baskets,
            price: 1290,
            image: STAND_IMAGE,
            description: "A metal stand with a vintage pattern and anti-corrosion coating. Heat resistant up to 200°C.",
            rating: 4.8,
            reviews: 203,
            tags: &["stand", "metal", "vintage", "pattern", "elegance"],
            characteristics: &[("Material", "Coated metal"), ("Dimensions", "Ø15×3 cm"), ("Weight", "320g"), ("Heat resistance", "Up to 200°C")],
        },
    ];
    records.into_iter().map(BaseRecord::into_product).collect()
}
