//! Static storefront content: consultation services and blog posts.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub duration: String,
    pub image: String,
    pub features: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub date: String,
    pub author: String,
    pub tags: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn services() -> Vec<Service> {
    vec![
        Service {
            id: "1".into(),
            name: "Space organization".into(),
            description: "Hands-on help organizing and structuring your home".into(),
            price: Money::rub(3500),
            duration: "3 hours".into(),
            image: "https://images.pexels.com/photos/4792488/pexels-photo-4792488.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            features: strings(&["Assessment of the current space", "Personal organization plan", "Practical recommendations", "Choice of storage systems"]),
        },
        Service {
            id: "2".into(),
            name: "Astrology for the home".into(),
            description: "Harmonizing a space with astrological principles".into(),
            price: Money::rub(2800),
            duration: "2 hours".into(),
            image: "https://images.pexels.com/photos/8197530/pexels-photo-8197530.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            features: strings(&["Energy analysis of the home", "Favourable zones", "Colour recommendations", "Choice of materials"]),
        },
        Service {
            id: "3".into(),
            name: "Psychology of comfort".into(),
            description: "Creating a cosy atmosphere that supports emotional well-being".into(),
            price: Money::rub(3200),
            duration: "2.5 hours".into(),
            image: "https://images.pexels.com/photos/6956993/pexels-photo-6956993.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            features: strings(&["Psychological analysis of the space", "Working with emotional triggers", "Comfort zones", "Lighting recommendations"]),
        },
    ]
}

pub fn blog_posts() -> Vec<BlogPost> {
    vec![
        BlogPost {
            id: "1".into(),
            title: "How scents shape the atmosphere at home".into(),
            excerpt: "Discover how aromatherapy helps create a cosy, harmonious space".into(),
            content: "An in-depth look at how scents affect mood and the atmosphere of a home...".into(),
            image: "https://images.pexels.com/photos/6444241/pexels-photo-6444241.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            date: "2024-01-15".into(),
            author: "Anna Petrova".into(),
            tags: strings(&["scents", "atmosphere", "home"]),
        },
        BlogPost {
            id: "2".into(),
            title: "5 books that help you tidy up".into(),
            excerpt: "A selection of the best books on creating and keeping order at home".into(),
            content: "A review of popular books on organizing your space...".into(),
            image: "https://images.pexels.com/photos/4866041/pexels-photo-4866041.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            date: "2024-01-10".into(),
            author: "Maria Sidorova".into(),
            tags: strings(&["books", "order", "organization"]),
        },
        BlogPost {
            id: "3".into(),
            title: "Storage secrets for a small flat".into(),
            excerpt: "Practical tips for making the most of limited space".into(),
            content: "Effective storage solutions for small rooms...".into(),
            image: "https://images.pexels.com/photos/6436293/pexels-photo-6436293.jpeg?auto=compress&cs=tinysrgb&w=800".into(),
            date: "2024-01-05".into(),
            author: "Elena Ivanova".into(),
            tags: strings(&["storage", "small flat", "organization"]),
        },
    ]
}

pub fn service(id: &str) -> Option<Service> {
    services().into_iter().find(|s| s.id == id)
}

pub fn blog_post(id: &str) -> Option<BlogPost> {
    blog_posts().into_iter().find(|p| p.id == id)
}

/// Posts carrying `tag` (case-insensitive), newest first.
pub fn blog_posts_tagged(tag: &str) -> Vec<BlogPost> {
    let tag = tag.to_lowercase();
    let mut posts: Vec<BlogPost> = blog_posts().into_iter().filter(|p| p.tags.iter().any(|t| t.to_lowercase() == tag)).collect();
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}
