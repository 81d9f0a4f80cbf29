//! Attribute generation.
//!
//! This module resolves a [`Kind`] into a concrete [`Value`]:
//! - literals are cloned
//! - invocables are called with the owning instance and the [`Faker`] provider
//! - named descriptors are looked up in the [`GeneratorRegistry`]
//!
//! Built-in generators:
//! - [`FakeFormatter`]: locale-aware fake data (`name`, `email`, `sentence|3;8`, ...)
//! - [`RelationGenerator`]: `factory|Model`, builds or creates a related instance

mod faker;
mod relation;

use std::collections::HashMap;
use std::rc::Rc;

use rand::Rng;

use crate::error::{FactoryError, Result};
use crate::factory::Factory;
use crate::kind::{Descriptor, Kind};
use crate::model::Instance;
use crate::value::Value;

pub use faker::{Faker, Locale, UnknownLocale};
pub use relation::RelationGenerator;

/// Attempts made for a `unique:` descriptor before giving up.
pub const MAX_UNIQUE_ATTEMPTS: usize = 10_000;

/// A named generator implementation.
///
/// Generators receive the factory itself, so they may build or create other
/// instances while producing a value.
pub trait Generator {
    fn generate(
        &self,
        factory: &mut Factory,
        descriptor: &Descriptor,
        owner: &Instance,
    ) -> Result<Value>;
}

impl<F> Generator for F
where
    F: Fn(&mut Factory, &Descriptor, &Instance) -> Result<Value>,
{
    fn generate(
        &self,
        factory: &mut Factory,
        descriptor: &Descriptor,
        owner: &Instance,
    ) -> Result<Value> {
        self(factory, descriptor, owner)
    }
}

/// Delegates to the factory's [`Faker`] provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeFormatter;

impl Generator for FakeFormatter {
    fn generate(
        &self,
        factory: &mut Factory,
        descriptor: &Descriptor,
        _owner: &Instance,
    ) -> Result<Value> {
        factory.faker().format(descriptor)
    }
}

/// Generator implementations by name.
#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Rc<dyn Generator>>,
}

impl GeneratorRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Creates a registry holding the relation generator and every fake formatter.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("factory", RelationGenerator);
        for name in Faker::FORMATTERS {
            registry.register(*name, FakeFormatter);
        }
        registry
    }

    /// Registers or replaces a generator.
    pub fn register(&mut self, name: impl Into<String>, generator: impl Generator + 'static) {
        self.generators.insert(name.into(), Rc::new(generator));
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Generator>> {
        self.generators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Resolves one kind for `owner`.
pub(crate) fn dispatch(factory: &mut Factory, kind: &Kind, owner: &Instance) -> Result<Value> {
    match kind {
        Kind::Literal(value) => Ok(value.clone()),
        Kind::Invocable(f) => Ok(f(owner, factory.faker())),
        Kind::Named(descriptor) => dispatch_named(factory, descriptor, owner),
    }
}

fn dispatch_named(
    factory: &mut Factory,
    descriptor: &Descriptor,
    owner: &Instance,
) -> Result<Value> {
    let generator = factory
        .generators()
        .get(&descriptor.name)
        .ok_or_else(|| FactoryError::UnknownGenerator(descriptor.name.clone()))?;

    if descriptor.optional && !factory.faker().rng().gen_bool(0.5) {
        return Ok(Value::NULL);
    }

    if !descriptor.unique {
        return generator.generate(factory, descriptor, owner);
    }

    for _ in 0..MAX_UNIQUE_ATTEMPTS {
        let value = generator.generate(factory, descriptor, owner)?;
        if factory.faker().remember_unique(descriptor.as_str(), &value) {
            return Ok(value);
        }
    }

    Err(FactoryError::UniqueExhausted(descriptor.to_string()))
}
