//! Definition registry: attribute maps and callbacks per model identifier.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{FactoryError, Result};
use crate::kind::Attributes;
use crate::model::Instance;

/// Separates a group from the concrete type name in `group:Type`.
pub const GROUP_DELIMITER: char = ':';

/// Per-model hook run after attributes are assigned.
///
/// The flag reports whether the instance was pending or saved when the callback ran.
pub type Callback = Rc<dyn Fn(&Instance, bool)>;

/// A model identifier split into its optional group and concrete type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelId<'a> {
    /// The identifier as registered, group included.
    pub full: &'a str,
    pub group: Option<&'a str>,
    /// Name handed to the maker.
    pub type_name: &'a str,
}

impl<'a> ModelId<'a> {
    pub fn parse(id: &'a str) -> Self {
        match id.split_once(GROUP_DELIMITER) {
            Some((group, type_name)) => Self {
                full: id,
                group: Some(group),
                type_name,
            },
            None => Self {
                full: id,
                group: None,
                type_name: id,
            },
        }
    }
}

impl fmt::Display for ModelId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full)
    }
}

/// Stored attributes and callback for one model identifier.
#[derive(Clone, Default)]
pub struct Definition {
    pub attributes: Attributes,
    pub callback: Option<Callback>,
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("attributes", &self.attributes)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Attributes and callback effective for one build.
#[derive(Clone, Default)]
pub struct Resolved {
    pub attributes: Attributes,
    pub callback: Option<Callback>,
}

#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: HashMap<String, Definition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the definition for `model_id`, replacing any previous one.
    pub fn define(
        &mut self,
        model_id: impl Into<String>,
        attributes: Attributes,
        callback: Option<Callback>,
    ) {
        self.definitions.insert(
            model_id.into(),
            Definition {
                attributes,
                callback,
            },
        );
    }

    pub fn get(&self, model_id: &str) -> Option<&Definition> {
        self.definitions.get(model_id)
    }

    /// The attributes stored for `model_id`.
    pub fn attributes(&self, model_id: &str) -> Result<&Attributes> {
        self.get(model_id)
            .map(|definition| &definition.attributes)
            .ok_or_else(|| FactoryError::NoDefinedFactory(model_id.to_string()))
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.definitions.contains_key(model_id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn model_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolves the effective definition for `model_id`.
    ///
    /// The full identifier must be defined. For `group:Type` the bare `Type`
    /// definition, when present, supplies base attributes that the grouped definition
    /// overrides key by key. The grouped callback wins over the bare one.
    pub fn resolve(&self, model_id: &str) -> Result<Resolved> {
        let id = ModelId::parse(model_id);
        let definition = self
            .get(id.full)
            .ok_or_else(|| FactoryError::NoDefinedFactory(id.full.to_string()))?;

        let base = id.group.and_then(|_| self.get(id.type_name));
        let Some(base) = base else {
            return Ok(Resolved {
                attributes: definition.attributes.clone(),
                callback: definition.callback.clone(),
            });
        };

        let mut attributes = base.attributes.clone();
        for (key, kind) in &definition.attributes {
            attributes.insert(key.clone(), kind.clone());
        }

        Ok(Resolved {
            attributes,
            callback: definition
                .callback
                .clone()
                .or_else(|| base.callback.clone()),
        })
    }
}
