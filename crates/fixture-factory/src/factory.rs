//! The factory engine.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::FactoryConfig;
use crate::definitions::{Callback, Definition, DefinitionRegistry, ModelId};
use crate::error::{FactoryError, Result};
use crate::generators::{self, Faker, Generator, GeneratorRegistry, Locale};
use crate::hooks::Hooks;
use crate::kind::{Attributes, Kind};
use crate::lifecycle::Tracker;
use crate::model::{Instance, Model};
use crate::record::Record;
use crate::value::Value;

/// Builds, persists and cleans up fixture instances.
///
/// # Example
///
/// ```rust,ignore
/// let mut factory = Factory::new();
/// factory.register_model::<User>("User");
/// factory.define("User", attributes! {
///     "name" => "name",
///     "email" => "unique:email",
/// });
///
/// let user = factory.create("User")?;
/// let drafts = factory.seed(3, "Post")?;
///
/// factory.delete_saved()?;
/// ```
pub struct Factory {
    config: FactoryConfig,
    definitions: DefinitionRegistry,
    tracker: Tracker,
    hooks: Hooks,
    generators: GeneratorRegistry,
    faker: Option<Faker>,
}

impl Factory {
    /// Creates a factory with default configuration and the built-in generators.
    pub fn new() -> Self {
        Self::with_config(FactoryConfig::default())
    }

    pub fn with_config(config: FactoryConfig) -> Self {
        let hooks = Hooks::new(config.save_method.clone(), config.delete_method.clone());
        Self {
            config,
            definitions: DefinitionRegistry::new(),
            tracker: Tracker::new(),
            hooks,
            generators: GeneratorRegistry::with_builtins(),
            faker: None,
        }
    }

    /// Creates a factory whose maker builds a [`Record`] for any type name.
    pub fn with_records(config: FactoryConfig) -> Self {
        let mut factory = Self::with_config(config);
        factory.set_custom_maker(|type_name| {
            Some(Box::new(Record::new(type_name)) as Box<dyn Model>)
        });
        factory
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Registers (or replaces) the definition for `model_id`.
    pub fn define(&mut self, model_id: impl Into<String>, attributes: Attributes) -> &mut Self {
        self.definitions.define(model_id, attributes, None);
        self
    }

    /// Registers a definition with a callback run after every build.
    pub fn define_with_callback<F>(
        &mut self,
        model_id: impl Into<String>,
        attributes: Attributes,
        callback: F,
    ) -> &mut Self
    where
        F: Fn(&Instance, bool) + 'static,
    {
        let callback: Callback = Rc::new(callback);
        self.definitions.define(model_id, attributes, Some(callback));
        self
    }

    /// The definition stored for `model_id`.
    pub fn definition(&self, model_id: &str) -> Result<&Definition> {
        self.definitions
            .get(model_id)
            .ok_or_else(|| FactoryError::NoDefinedFactory(model_id.to_string()))
    }

    pub fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    /// Makes `T` constructible by the default maker under `type_name`.
    pub fn register_model<T: Model + Default>(
        &mut self,
        type_name: impl Into<String>,
    ) -> &mut Self {
        let type_name = type_name.into();
        if self.hooks.models.contains(&type_name) {
            debug!(type_name, "Replacing registered model type");
        }
        self.hooks.models.register::<T>(type_name);
        self
    }

    pub fn register_generator(
        &mut self,
        name: impl Into<String>,
        generator: impl Generator + 'static,
    ) -> &mut Self {
        self.generators.register(name, generator);
        self
    }

    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    pub fn set_save_method(&mut self, method: impl Into<String>) -> &mut Self {
        let method = method.into();
        self.config.save_method = method.clone();
        self.hooks.save_method = method;
        self
    }

    pub fn set_delete_method(&mut self, method: impl Into<String>) -> &mut Self {
        let method = method.into();
        self.config.delete_method = method.clone();
        self.hooks.delete_method = method;
        self
    }

    pub fn set_custom_maker<F>(&mut self, maker: F) -> &mut Self
    where
        F: Fn(&str) -> Option<Box<dyn Model>> + 'static,
    {
        self.hooks.maker = Some(Rc::new(maker));
        self
    }

    pub fn set_custom_setter<F>(&mut self, setter: F) -> &mut Self
    where
        F: Fn(&Instance, &str, Value) -> Result<()> + 'static,
    {
        self.hooks.setter = Some(Rc::new(setter));
        self
    }

    pub fn set_custom_saver<F>(&mut self, saver: F) -> &mut Self
    where
        F: Fn(&Instance) -> bool + 'static,
    {
        self.hooks.saver = Some(Rc::new(saver));
        self
    }

    pub fn set_custom_deleter<F>(&mut self, deleter: F) -> &mut Self
    where
        F: Fn(&Instance) -> bool + 'static,
    {
        self.hooks.deleter = Some(Rc::new(deleter));
        self
    }

    /// Changes the provider locale. The provider is rebuilt on next use.
    pub fn set_locale(&mut self, locale: Locale) -> &mut Self {
        self.config.locale = locale;
        self.faker = None;
        self
    }

    /// The random-data provider, created on first use.
    pub fn faker(&mut self) -> &mut Faker {
        let config = &self.config;
        self.faker.get_or_insert_with(|| {
            debug!(locale = %config.locale, seeded = config.seed.is_some(), "Creating faker");
            match config.seed {
                Some(seed) => Faker::seeded(config.locale, seed),
                None => Faker::new(config.locale),
            }
        })
    }

    /// Builds an instance of `model_id` without persisting it.
    pub fn instance(&mut self, model_id: &str) -> Result<Instance> {
        self.instance_with(model_id, &Attributes::new())
    }

    /// Builds an instance, with `overrides` replacing defined attributes.
    pub fn instance_with(&mut self, model_id: &str, overrides: &Attributes) -> Result<Instance> {
        let instance = self.make(model_id, overrides, false)?;
        self.trigger_callback(&instance)?;
        Ok(instance)
    }

    /// Builds and persists an instance of `model_id`.
    pub fn create(&mut self, model_id: &str) -> Result<Instance> {
        self.create_with(model_id, &Attributes::new())
    }

    /// Builds and persists an instance, with `overrides` replacing defined attributes.
    ///
    /// When the model has a callback, the instance is saved once before and once
    /// after the callback runs.
    pub fn create_with(&mut self, model_id: &str, overrides: &Attributes) -> Result<Instance> {
        let instance = self.make(model_id, overrides, true)?;
        self.persist(&instance)?;

        if self.trigger_callback(&instance)? {
            self.persist(&instance)?;
        }

        Ok(instance)
    }

    /// Creates `times` instances in order, stopping at the first failure.
    pub fn seed(&mut self, times: usize, model_id: &str) -> Result<Vec<Instance>> {
        self.seed_with(times, model_id, &Attributes::new())
    }

    pub fn seed_with(
        &mut self,
        times: usize,
        model_id: &str,
        overrides: &Attributes,
    ) -> Result<Vec<Instance>> {
        debug!(model = model_id, times, "Seeding");
        (0..times)
            .map(|_| self.create_with(model_id, overrides))
            .collect()
    }

    /// Generates and assigns attributes for an already built instance.
    ///
    /// The definition is resolved from the instance's model identifier and merged with
    /// `overrides`. Keys are resolved in order, each one assigned before the next is
    /// generated. Returns the assigned values.
    pub fn attributes_for(
        &mut self,
        instance: &Instance,
        overrides: &Attributes,
    ) -> Result<IndexMap<String, Value>> {
        let mut attributes = self.definitions.resolve(instance.model_id())?.attributes;
        for (key, kind) in overrides {
            attributes.insert(key.clone(), kind.clone());
        }

        let mut assigned = IndexMap::with_capacity(attributes.len());
        for (key, kind) in attributes {
            let value = self.generate(&kind, instance)?;
            self.hooks.set(instance, &key, value.clone())?;
            assigned.insert(key, value);
        }

        Ok(assigned)
    }

    /// Resolves one kind for `owner`.
    pub fn generate(&mut self, kind: &Kind, owner: &Instance) -> Result<Value> {
        generators::dispatch(self, kind, owner)
    }

    fn make(&mut self, model_id: &str, overrides: &Attributes, track: bool) -> Result<Instance> {
        let id = ModelId::parse(model_id);
        if !self.definitions.contains(id.full) {
            return Err(FactoryError::NoDefinedFactory(id.full.to_string()));
        }

        let instance = self.hooks.make(id.full, id.type_name)?;
        if track {
            self.tracker.mark_pending(&instance);
        }

        self.attributes_for(&instance, overrides)?;
        debug!(model = model_id, instance = %instance.id(), "Built instance");
        Ok(instance)
    }

    fn persist(&mut self, instance: &Instance) -> Result<()> {
        if !self.hooks.save(instance)? {
            return Err(FactoryError::SaveFailed {
                model: instance.model_id().to_string(),
                instance: instance.id(),
                errors: instance.validation_errors(),
            });
        }

        self.tracker.mark_saved(instance);
        debug!(model = instance.model_id(), instance = %instance.id(), "Saved instance");
        Ok(())
    }

    /// Runs the model's callback, returning whether one was registered.
    fn trigger_callback(&mut self, instance: &Instance) -> Result<bool> {
        let Some(callback) = self.definitions.resolve(instance.model_id())?.callback else {
            return Ok(false);
        };

        callback(instance, self.is_pending_or_saved(instance));
        Ok(true)
    }

    /// Instances awaiting their first successful save, oldest first.
    pub fn pending(&self) -> Vec<Instance> {
        self.tracker.pending().snapshot()
    }

    /// Successfully saved instances, in save order.
    pub fn saved(&self) -> Vec<Instance> {
        self.tracker.saved().snapshot()
    }

    pub fn is_pending(&self, instance: &Instance) -> bool {
        self.tracker.is_pending(instance)
    }

    pub fn is_saved(&self, instance: &Instance) -> bool {
        self.tracker.is_saved(instance)
    }

    pub fn is_pending_or_saved(&self, instance: &Instance) -> bool {
        self.tracker.is_pending_or_saved(instance)
    }

    /// Deletes every saved instance, newest first.
    ///
    /// Every instance is attempted and removed from the saved set whether or not its
    /// delete succeeds. Failures are reported together as
    /// [`FactoryError::DeletingFailed`] once all instances have been processed.
    pub fn delete_saved(&mut self) -> Result<&mut Self> {
        if self.tracker.saved().is_empty() {
            debug!("No saved instances to delete");
            return Ok(self);
        }

        let saved = self.tracker.saved().snapshot();
        let total = saved.len();
        let mut failures = Vec::new();

        for instance in saved.iter().rev() {
            match self.hooks.delete(instance) {
                Ok(true) => {}
                Ok(false) => failures.push(FactoryError::DeleteFailed {
                    model: instance.model_id().to_string(),
                    instance: instance.id(),
                }),
                Err(e) => failures.push(e),
            }
            self.tracker.evict(instance);
        }

        if failures.is_empty() {
            info!("Deleted {total} saved instances");
            return Ok(self);
        }

        for failure in &failures {
            warn!("{failure}");
        }
        warn!("Deleted {} of {total} saved instances", total - failures.len());
        Err(FactoryError::DeletingFailed(failures))
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("config", &self.config)
            .field("models", &self.definitions.model_ids())
            .field("hooks", &self.hooks)
            .field("pending", &self.tracker.pending().len())
            .field("saved", &self.tracker.saved().len())
            .finish_non_exhaustive()
    }
}
