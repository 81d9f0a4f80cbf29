//! Construction and persistence hooks.
//!
//! Each hook has a convention-based default and an override slot:
//!
//! | Hook    | Default                                      | Override                 |
//! |---------|----------------------------------------------|--------------------------|
//! | Maker   | `Default` of the type registered by name     | [`MakerFn`]              |
//! | Setter  | [`Model::set_attribute`]                     | [`SetterFn`]             |
//! | Saver   | [`Model::invoke`] with the save method name  | [`PersistFn`]            |
//! | Deleter | [`Model::invoke`] with the delete method name| [`PersistFn`]            |

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{FactoryError, Result};
use crate::model::{Instance, Model};
use crate::value::Value;

pub type MakerFn = Rc<dyn Fn(&str) -> Option<Box<dyn Model>>>;
pub type SetterFn = Rc<dyn Fn(&Instance, &str, Value) -> Result<()>>;
pub type PersistFn = Rc<dyn Fn(&Instance) -> bool>;

type Constructor = fn() -> Box<dyn Model>;

fn construct<T: Model + Default>() -> Box<dyn Model> {
    Box::new(T::default())
}

/// Model types the default maker can construct by name.
#[derive(Default, Clone)]
pub struct ModelRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ModelRegistry {
    pub fn register<T: Model + Default>(&mut self, type_name: impl Into<String>) {
        self.constructors.insert(type_name.into(), construct::<T>);
    }

    pub fn make(&self, type_name: &str) -> Option<Box<dyn Model>> {
        self.constructors.get(type_name).map(|constructor| constructor())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("ModelRegistry").field("types", &names).finish()
    }
}

/// Hook configuration held by a factory.
#[derive(Clone)]
pub struct Hooks {
    pub(crate) models: ModelRegistry,
    pub(crate) save_method: String,
    pub(crate) delete_method: String,
    pub(crate) maker: Option<MakerFn>,
    pub(crate) setter: Option<SetterFn>,
    pub(crate) saver: Option<PersistFn>,
    pub(crate) deleter: Option<PersistFn>,
}

impl Hooks {
    pub fn new(save_method: impl Into<String>, delete_method: impl Into<String>) -> Self {
        Self {
            models: ModelRegistry::default(),
            save_method: save_method.into(),
            delete_method: delete_method.into(),
            maker: None,
            setter: None,
            saver: None,
            deleter: None,
        }
    }

    /// Builds a blank model of `type_name`, wrapped for `model_id`.
    pub fn make(&self, model_id: &str, type_name: &str) -> Result<Instance> {
        let model = match &self.maker {
            Some(maker) => maker(type_name),
            None => self.models.make(type_name),
        };

        model
            .map(|model| Instance::new(model_id, model))
            .ok_or_else(|| FactoryError::ModelNotFound(type_name.to_string()))
    }

    pub fn set(&self, instance: &Instance, name: &str, value: Value) -> Result<()> {
        if let Some(setter) = &self.setter {
            return setter(instance, name, value);
        }

        instance
            .set(name, value)
            .map_err(|source| FactoryError::Attribute {
                model: instance.model_id().to_string(),
                source,
            })
    }

    /// Runs the saver, returning whether the save succeeded.
    pub fn save(&self, instance: &Instance) -> Result<bool> {
        if let Some(saver) = &self.saver {
            return Ok(saver(instance));
        }

        instance
            .invoke(&self.save_method)
            .ok_or_else(|| FactoryError::SaveMethodNotFound {
                model: instance.model_id().to_string(),
                method: self.save_method.clone(),
            })
    }

    /// Runs the deleter, returning whether the delete succeeded.
    pub fn delete(&self, instance: &Instance) -> Result<bool> {
        if let Some(deleter) = &self.deleter {
            return Ok(deleter(instance));
        }

        instance
            .invoke(&self.delete_method)
            .ok_or_else(|| FactoryError::DeleteMethodNotFound {
                model: instance.model_id().to_string(),
                method: self.delete_method.clone(),
            })
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new("save", "delete")
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("models", &self.models)
            .field("save_method", &self.save_method)
            .field("delete_method", &self.delete_method)
            .field("custom_maker", &self.maker.is_some())
            .field("custom_setter", &self.setter.is_some())
            .field("custom_saver", &self.saver.is_some())
            .field("custom_deleter", &self.deleter.is_some())
            .finish()
    }
}
