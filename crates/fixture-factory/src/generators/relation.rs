//! Relational attributes (`factory|Model`).

use tracing::debug;

use crate::error::{FactoryError, Result};
use crate::factory::Factory;
use crate::kind::{Attributes, Descriptor};
use crate::model::Instance;
use crate::value::Value;

use super::Generator;

/// Produces a related instance for `factory|Model` descriptors.
///
/// When the owner is being persisted (pending or saved) the related model is created
/// too, otherwise it is only built. The attribute receives the related primary key,
/// or the instance handle when the related model has none.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelationGenerator;

impl Generator for RelationGenerator {
    fn generate(
        &self,
        factory: &mut Factory,
        descriptor: &Descriptor,
        owner: &Instance,
    ) -> Result<Value> {
        let model_id = descriptor.arg(0).ok_or_else(|| {
            FactoryError::invalid_descriptor(descriptor.as_str(), "expected `factory|Model`")
        })?;

        let persist = factory.is_pending_or_saved(owner);
        debug!(owner = owner.model_id(), related = model_id, persist, "Generating relation");

        let related = if persist {
            factory.create_with(model_id, &Attributes::new())?
        } else {
            factory.instance_with(model_id, &Attributes::new())?
        };

        Ok(match related.primary_key() {
            Some(key) => key,
            None => Value::Instance(related),
        })
    }
}
