//! Loading definitions from registration units and definition directories.
//!
//! A registration unit is anything that calls [`Factory::define`]: an in-code
//! closure, or a JSON definition file found by [`Factory::load_factories`].
//!
//! Definition file format:
//!
//! ```json
//! {
//!   "User": {
//!     "name": "name",
//!     "email": "unique:email",
//!     "role": { "value": "member" },
//!     "age": 30
//!   },
//!   "admin:User": { "role": { "value": "admin" } }
//! }
//! ```
//!
//! Strings are generator descriptors, `{"value": ...}` wraps a literal, and any other
//! JSON value is used literally.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value as Json;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{FactoryError, Result};
use crate::factory::Factory;
use crate::kind::{Attributes, Kind};
use crate::value::Value;

/// Extension of definition files picked up from definition directories.
pub const DEFINITION_EXTENSION: &str = "json";

/// A unit of definitions applied to a factory.
pub trait Definitions {
    fn register(&self, factory: &mut Factory) -> Result<()>;
}

impl<F> Definitions for F
where
    F: Fn(&mut Factory),
{
    fn register(&self, factory: &mut Factory) -> Result<()> {
        self(factory);
        Ok(())
    }
}

/// Definitions parsed from one JSON file.
#[derive(Debug, Clone)]
pub struct DefinitionFile {
    pub path: PathBuf,
    pub models: IndexMap<String, Attributes>,
}

impl DefinitionFile {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let raw: IndexMap<String, IndexMap<String, Json>> = match serde_json::from_str(content) {
            Ok(raw) => raw,
            Err(source) => return Err(FactoryError::Definition { path, source }),
        };

        let models = raw
            .into_iter()
            .map(|(model_id, fields)| {
                let attributes = fields
                    .into_iter()
                    .map(|(name, json)| (name, kind_from_json(json)))
                    .collect();
                (model_id, attributes)
            })
            .collect();

        Ok(Self { path, models })
    }
}

impl Definitions for DefinitionFile {
    fn register(&self, factory: &mut Factory) -> Result<()> {
        for (model_id, attributes) in &self.models {
            factory.define(model_id.clone(), attributes.clone());
        }
        debug!(path = %self.path.display(), models = self.models.len(), "Registered definitions");
        Ok(())
    }
}

fn kind_from_json(json: Json) -> Kind {
    match json {
        Json::String(descriptor) => Kind::named(&descriptor),
        Json::Object(mut object) if object.len() == 1 && object.contains_key("value") => {
            Kind::Literal(Value::Json(object.remove("value").unwrap_or(Json::Null)))
        }
        other => Kind::Literal(Value::Json(other)),
    }
}

impl Factory {
    /// Applies a registration unit.
    pub fn load(&mut self, definitions: &impl Definitions) -> Result<&mut Self> {
        definitions.register(self)?;
        Ok(self)
    }

    /// Loads every definition file below each directory in `paths`.
    ///
    /// Each path must be an existing directory, checked before anything is loaded
    /// from it. Files are applied in file-name order, recursing into subdirectories.
    pub fn load_factories<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<&mut Self> {
        for path in paths {
            let path = path.as_ref();
            if !path.is_dir() {
                return Err(FactoryError::DirectoryNotFound(path.to_path_buf()));
            }

            let mut loaded = 0usize;
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::from)?;
                if !entry.file_type().is_file() || !is_definition_file(entry.path()) {
                    continue;
                }

                DefinitionFile::read(entry.path())?.register(self)?;
                loaded += 1;
            }

            info!("Loaded {loaded} definition files from {}", path.display());
        }

        Ok(self)
    }
}

fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DEFINITION_EXTENSION))
}
