//! Example: Build a small blog with authors, posts and comments, then clean it up.
//!
//! This shows:
//! - Typed models registered with the default maker
//! - Grouped definitions (`published:Post`) layered over a base definition
//! - Relations created on demand with `factory|Model`
//! - A callback that runs between the two saves of `create`
//! - Reverse-order cleanup with `delete_saved`
//!
//! Run with:
//! ```
//! cargo run -p fixture-factory --example blog
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use fixture_factory::prelude::*;
use tracing_subscriber::EnvFilter;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Default)]
struct Author {
    id: Option<u64>,
    name: String,
    email: String,
}

impl Model for Author {
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        let text = || {
            value
                .clone()
                .into_string()
                .ok_or_else(|| AttributeError::mismatch(name, "a string"))
        };
        match name {
            "name" => self.name = text()?,
            "email" => self.email = text()?,
            _ => return Err(AttributeError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "name" => Some(Value::from(self.name.as_str())),
            _ => None,
        }
    }

    fn invoke(&mut self, method: &str) -> Option<bool> {
        match method {
            "save" => {
                self.id.get_or_insert_with(|| NEXT_ID.fetch_add(1, Ordering::Relaxed));
                Some(true)
            }
            "delete" => Some(self.id.take().is_some()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Post {
    id: Option<u64>,
    title: String,
    author_id: Option<u64>,
    status: String,
    slug: String,
}

impl Model for Post {
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "title" => {
                self.title = value
                    .into_string()
                    .ok_or_else(|| AttributeError::mismatch(name, "a string"))?;
            }
            "status" => {
                self.status = value
                    .into_string()
                    .ok_or_else(|| AttributeError::mismatch(name, "a string"))?;
            }
            "author_id" => self.author_id = value.as_u64(),
            _ => return Err(AttributeError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "title" => Some(Value::from(self.title.as_str())),
            _ => None,
        }
    }

    fn invoke(&mut self, method: &str) -> Option<bool> {
        match method {
            "save" => {
                if self.author_id.is_none() {
                    return Some(false);
                }
                self.id.get_or_insert_with(|| NEXT_ID.fetch_add(1, Ordering::Relaxed));
                Some(true)
            }
            "delete" => Some(self.id.take().is_some()),
            _ => None,
        }
    }

    fn validation_errors(&self) -> Option<String> {
        self.author_id.is_none().then(|| "author is required".to_string())
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut factory = Factory::with_config(FactoryConfig::from_env().with_seed(2024));
    factory
        .register_model::<Author>("Author")
        .register_model::<Post>("Post")
        .define(
            "Author",
            attributes! {
                "name" => "name",
                "email" => "unique:email",
            },
        )
        .define(
            "Post",
            attributes! {
                "title" => "sentence|3;6",
                "author_id" => Kind::factory("Author"),
                "status" => Kind::literal("draft"),
            },
        )
        .define_with_callback(
            "published:Post",
            attributes! { "status" => Kind::literal("published") },
            |post, persisted| {
                // Slugs are derived once the title is final.
                post.with_mut(|post: &mut Post| {
                    post.slug = post.title.to_lowercase().replace(' ', "-");
                });
                tracing::info!(persisted, "Published {post:?}");
            },
        );

    let drafts = factory.seed(2, "Post")?;
    let published = factory.create("published:Post")?;
    tracing::info!("Created {} drafts and one published post", drafts.len());

    if let Some(slug) = published.with(|post: &Post| post.slug.clone()) {
        tracing::info!("Published slug: {slug}");
    }

    // An orphan post fails validation and stays pending.
    let orphan = factory.create_with("Post", &attributes! { "author_id" => Value::NULL });
    if let Err(e) = orphan {
        tracing::warn!("{e}");
    }

    tracing::info!(
        "Pending: {}, saved: {}",
        factory.pending().len(),
        factory.saved().len()
    );

    factory.delete_saved()?;
    tracing::info!("Cleanup complete, saved: {}", factory.saved().len());

    Ok(())
}
