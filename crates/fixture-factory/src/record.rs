//! A schemaless model for definitions that have no Rust type behind them.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::error::AttributeError;
use crate::model::Model;
use crate::value::Value;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Generic in-memory record.
///
/// `save` assigns a sequential `id` (unless one was generated) and marks the record
/// persisted. `delete` succeeds only for persisted records.
#[derive(Debug, Clone, Default)]
pub struct Record {
    type_name: String,
    attributes: IndexMap<String, Value>,
    persisted: bool,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

impl Model for Record {
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn invoke(&mut self, method: &str) -> Option<bool> {
        match method {
            "save" => {
                let has_id = self.attributes.get("id").is_some_and(|id| !id.is_null());
                if !has_id {
                    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
                    self.attributes.insert("id".to_string(), Value::from(id));
                }
                self.persisted = true;
                Some(true)
            }
            "delete" => Some(std::mem::take(&mut self.persisted)),
            _ => None,
        }
    }

    fn to_json(&self) -> Json {
        let fields: Map<String, Json> = self
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();

        let mut object = Map::new();
        object.insert("model".to_string(), Json::from(self.type_name.as_str()));
        object.insert("fields".to_string(), Json::Object(fields));
        Json::Object(object)
    }
}
