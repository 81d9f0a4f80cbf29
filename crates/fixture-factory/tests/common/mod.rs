//! Shared models and helpers for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use fixture_factory::prelude::*;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

fn string(name: &str, value: Value) -> Result<String, AttributeError> {
    value
        .into_string()
        .ok_or_else(|| AttributeError::mismatch(name, "a string"))
}

#[derive(Debug, Default)]
pub struct User {
    pub id: Option<u64>,
    pub name: String,
    pub email: String,
    pub role: String,
    pub saves: u32,
    pub deleted: bool,
}

impl Model for User {
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "id" => self.id = value.as_u64(),
            "name" => self.name = string(name, value)?,
            "email" => self.email = string(name, value)?,
            "role" => self.role = string(name, value)?,
            _ => return Err(AttributeError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "name" => Some(Value::from(self.name.as_str())),
            "email" => Some(Value::from(self.email.as_str())),
            "role" => Some(Value::from(self.role.as_str())),
            _ => None,
        }
    }

    fn invoke(&mut self, method: &str) -> Option<bool> {
        match method {
            "save" => {
                self.id.get_or_insert_with(next_id);
                self.saves += 1;
                Some(true)
            }
            "delete" => {
                self.deleted = true;
                Some(true)
            }
            _ => None,
        }
    }
}

/// A post refuses to save without a title.
#[derive(Debug, Default)]
pub struct Post {
    pub id: Option<u64>,
    pub title: String,
    pub author_id: Option<u64>,
    pub published: bool,
    pub saves: u32,
}

impl Model for Post {
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "id" => self.id = value.as_u64(),
            "title" => self.title = string(name, value)?,
            "author_id" => self.author_id = value.as_u64(),
            "published" => {
                self.published = value
                    .as_bool()
                    .ok_or_else(|| AttributeError::mismatch(name, "a boolean"))?;
            }
            _ => return Err(AttributeError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "title" => Some(Value::from(self.title.as_str())),
            "author_id" => Some(Value::from(self.author_id)),
            "published" => Some(Value::from(self.published)),
            _ => None,
        }
    }

    fn invoke(&mut self, method: &str) -> Option<bool> {
        match method {
            "save" => {
                self.saves += 1;
                if self.title.is_empty() {
                    return Some(false);
                }
                self.id.get_or_insert_with(next_id);
                Some(true)
            }
            "delete" => Some(self.id.is_some()),
            _ => None,
        }
    }

    fn validation_errors(&self) -> Option<String> {
        self.title
            .is_empty()
            .then(|| "title can't be blank".to_string())
    }
}

/// A model with no persistence methods.
#[derive(Debug, Default)]
pub struct Tag {
    pub label: String,
}

impl Model for Tag {
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "label" => self.label = string(name, value)?,
            _ => return Err(AttributeError::Unknown(name.to_string())),
        }
        Ok(())
    }
}

/// A seeded factory with `User`, `Post` and `Tag` registered and defined.
pub fn blog_factory() -> Factory {
    let mut factory = Factory::with_config(FactoryConfig::default().with_seed(7));
    factory
        .register_model::<User>("User")
        .register_model::<Post>("Post")
        .register_model::<Tag>("Tag")
        .define(
            "User",
            attributes! {
                "name" => "name",
                "email" => "unique:email",
                "role" => Kind::literal("member"),
            },
        )
        .define(
            "Post",
            attributes! {
                "title" => "sentence|2;5",
                "author_id" => Kind::factory("User"),
            },
        )
        .define("Tag", attributes! { "label" => "word" });
    factory
}

/// A seeded factory building [`Record`]s for any definition.
pub fn record_factory() -> Factory {
    Factory::with_records(FactoryConfig::default().with_seed(11))
}

pub fn name_of(instance: &Instance) -> String {
    instance
        .get("name")
        .and_then(Value::into_string)
        .unwrap_or_default()
}
