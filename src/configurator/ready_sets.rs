//! The ready-made gift set templates.

use super::{ReadySet, SetSlot, SlotKind};
use crate::domain::value_objects::Money;

fn fragrance_slot(format_id: &str, quantity: u32, label: &str) -> SetSlot {
    SetSlot { kind: SlotKind::FragranceChoice { format_id: format_id.to_string() }, quantity, label: label.to_string() }
}

fn product_choice(product_ids: &[&str], quantity: u32, label: &str) -> SetSlot {
    SetSlot {
        kind: SlotKind::ProductChoice { product_ids: product_ids.iter().map(|s| s.to_string()).collect() },
        quantity,
        label: label.to_string(),
    }
}

fn fixed(product_id: &str, quantity: u32, label: &str) -> SetSlot {
    SetSlot { kind: SlotKind::Fixed { product_id: product_id.to_string() }, quantity, label: label.to_string() }
}

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn ready_sets() -> Vec<ReadySet> {
    vec![
        ReadySet {
            id: "mini-aroma-set".into(),
            name: "Mini Aroma set".into(),
            description: "A perfect start for a cosy atmosphere with your favourite scent.".into(),
            image: "https://images.pexels.com/photos/6454579/pexels-photo-6454579.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            slots: vec![
                fragrance_slot("candle-glass-100", 1, "Glass candle 100ml"),
                fragrance_slot("sachet-clouds", 1, "Sachet \"Clouds\""),
            ],
            original_price: Money::rub(1150 + 380),
            discount_price: Money::rub(1350),
            tags: tags(&["mini", "aroma", "candle", "sachet", "gift"]),
        },
        ReadySet {
            id: "aroma-reading-set".into(),
            name: "Aroma & Reading set".into(),
            description: "A pleasant scent and an inspiring book for relaxing evenings.".into(),
            image: "https://images.pexels.com/photos/4866041/pexels-photo-4866041.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            slots: vec![
                fragrance_slot("candle-glass-190", 1, "Glass candle 190ml"),
                fragrance_slot("sachet-hearts", 1, "Sachet \"Hearts\""),
                product_choice(&["book-001", "book-002", "book-003"], 1, "Book of your choice"),
            ],
            original_price: Money::rub(1490 + 450 + 750),
            discount_price: Money::rub(2390),
            tags: tags(&["reading", "relax", "book", "candle", "sachet"]),
        },
        ReadySet {
            id: "double-cozy-set".into(),
            name: "Double Cosiness set".into(),
            description: "Twice the cosiness: two scented candles, a sachet and a stylish stand.".into(),
            image: "https://images.pexels.com/photos/8413058/pexels-photo-8413058.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            slots: vec![
                fragrance_slot("candle-glass-100", 2, "Glass candle 100ml"),
                fragrance_slot("sachet-florence", 1, "Florentine sachet"),
                product_choice(&["stand-001", "stand-002"], 1, "Stand of your choice"),
            ],
            original_price: Money::rub(2 * 1150 + 620 + 890),
            discount_price: Money::rub(3490),
            tags: tags(&["cosiness", "candles", "sachet", "stand", "gift"]),
        },
        ReadySet {
            id: "full-order-set".into(),
            name: "Perfect Order set".into(),
            description: "Everything for an organized space and a pleasant atmosphere.".into(),
            image: "https://images.pexels.com/photos/6436293/pexels-photo-6436293.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            slots: vec![
                fragrance_slot("jar-iron-120", 1, "Tin jar candle 120ml"),
                fragrance_slot("sachet-clouds", 2, "Sachet \"Clouds\""),
                fixed("book-001", 1, "Book \"The Fruit & Berry Alphabet\""),
                fixed("basket-003", 1, "Cosmetics organizer"),
            ],
            original_price: Money::rub(1290 + 2 * 380 + 890 + 1450),
            discount_price: Money::rub(3990),
            tags: tags(&["organization", "order", "candle", "sachet", "book", "organizer"]),
        },
        ReadySet {
            id: "premium-harmony-set".into(),
            name: "Premium Harmony set".into(),
            description: "A refined set for perfect harmony and order in your home.".into(),
            image: "https://images.pexels.com/photos/4792488/pexels-photo-4792488.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            slots: vec![
                fragrance_slot("candle-glass-190", 2, "Glass candle 190ml"),
                fragrance_slot("sachet-florence", 2, "Florentine sachet"),
                fixed("book-001", 1, "Book \"The Fruit & Berry Alphabet\""),
                fixed("book-003", 1, "Book \"Diary of an Orderly Woman\""),
                fixed("basket-001", 1, "Large woven rattan basket"),
            ],
            original_price: Money::rub(2 * 1490 + 2 * 620 + 890 + 820 + 2890),
            discount_price: Money::rub(7990),
            tags: tags(&["premium", "harmony", "gift", "candles", "sachets", "books", "basket"]),
        },
    ]
}
