//! Test fixture factories.
//!
//! Model definitions map attribute names to value kinds: literals, closures, or named
//! generators such as `name`, `unique:email` and `factory|User`. The [`Factory`] builds
//! instances from those definitions, persists them through configurable hooks, tracks
//! which instances are pending or saved, and deletes everything it saved in reverse
//! order when a test is done.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fixture_factory::prelude::*;
//!
//! let mut factory = Factory::with_records(FactoryConfig::from_env());
//! factory
//!     .define("User", attributes! {
//!         "name" => "name",
//!         "email" => "unique:email",
//!     })
//!     .define("Post", attributes! {
//!         "title" => "sentence|3;8",
//!         "author_id" => Kind::factory("User"),
//!     })
//!     .define("draft:Post", attributes! {
//!         "status" => Kind::literal("draft"),
//!     });
//!
//! let posts = factory.seed(3, "draft:Post")?;
//! factory.delete_saved()?;
//! ```

pub mod config;
pub mod definitions;
pub mod error;
pub mod factory;
pub mod generators;
pub mod hooks;
pub mod kind;
pub mod lifecycle;
pub mod loader;
pub mod model;
pub mod record;
pub mod value;

pub use config::FactoryConfig;
pub use error::{AttributeError, FactoryError, Result};
pub use factory::Factory;
pub use generators::{Faker, Generator, Locale};
pub use kind::{Attributes, Descriptor, Kind};
pub use loader::{DefinitionFile, Definitions};
pub use model::{Instance, InstanceId, Model};
pub use record::Record;
pub use value::Value;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::attributes;
    pub use crate::config::FactoryConfig;
    pub use crate::error::{AttributeError, FactoryError};
    pub use crate::factory::Factory;
    pub use crate::generators::{Faker, Generator, Locale};
    pub use crate::kind::{Attributes, Descriptor, Kind};
    pub use crate::loader::Definitions;
    pub use crate::model::{Instance, Model};
    pub use crate::record::Record;
    pub use crate::value::Value;
}
