//! The backing-model contract and the shared instance handle.
//!
//! A factory never inspects model types at runtime. Everything it needs from a model
//! goes through the [`Model`] capability trait: attribute assignment, attribute reads
//! for relations, and named persistence methods (`save`/`delete` by default).

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AttributeError;
use crate::value::Value;

/// Upcast helper so trait objects can be downcast to their concrete model type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A model type the factory can populate and persist.
pub trait Model: AsAny + fmt::Debug {
    /// Assigns one attribute. Used by the default setter.
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError>;

    /// Reads one attribute back, if the model exposes it.
    fn get_attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Invokes a named persistence method such as `save` or `delete`.
    ///
    /// Returns `None` when the model has no method by that name, otherwise whether the
    /// call succeeded.
    fn invoke(&mut self, _method: &str) -> Option<bool> {
        None
    }

    /// Validation detail reported after a failed save.
    fn validation_errors(&self) -> Option<String> {
        None
    }

    /// Key used when another model refers to this one.
    fn primary_key(&self) -> Option<Value> {
        self.get_attribute("id")
            .or_else(|| self.get_attribute("_id"))
            .filter(|key| !key.is_null())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Identity of an [`Instance`].
///
/// Ids come from a process-wide counter, so an id is never reused after its
/// instance is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

impl InstanceId {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_INSTANCE: AtomicUsize = AtomicUsize::new(1);

struct Slot {
    id: InstanceId,
    model_id: String,
    model: RefCell<Box<dyn Model>>,
}

/// Shared handle to a constructed model.
///
/// Clones refer to the same model. Equality is identity, never attribute values.
#[derive(Clone)]
pub struct Instance(Rc<Slot>);

impl Instance {
    /// Wraps a model built for `model_id` (which may carry a `group:` prefix).
    pub fn new(model_id: impl Into<String>, model: Box<dyn Model>) -> Self {
        Self(Rc::new(Slot {
            id: InstanceId(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)),
            model_id: model_id.into(),
            model: RefCell::new(model),
        }))
    }

    pub fn id(&self) -> InstanceId {
        self.0.id
    }

    /// The model identifier this instance was built from.
    pub fn model_id(&self) -> &str {
        &self.0.model_id
    }

    pub fn borrow(&self) -> Ref<'_, dyn Model + 'static> {
        Ref::map(self.0.model.borrow(), |model| &**model)
    }

    pub fn borrow_mut(&self) -> RefMut<'_, dyn Model + 'static> {
        RefMut::map(self.0.model.borrow_mut(), |model| &mut **model)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.borrow().get_attribute(name)
    }

    pub fn set(&self, name: &str, value: Value) -> Result<(), AttributeError> {
        self.borrow_mut().set_attribute(name, value)
    }

    pub fn invoke(&self, method: &str) -> Option<bool> {
        self.borrow_mut().invoke(method)
    }

    pub fn validation_errors(&self) -> Option<String> {
        self.borrow().validation_errors()
    }

    pub fn primary_key(&self) -> Option<Value> {
        self.borrow().primary_key()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.borrow().to_json()
    }

    /// Runs `f` against the concrete model, if it is a `T`.
    pub fn with<T: Model, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let model = self.borrow();
        (*model).as_any().downcast_ref::<T>().map(f)
    }

    /// Runs `f` against the concrete model mutably, if it is a `T`.
    pub fn with_mut<T: Model, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut model = self.borrow_mut();
        (*model).as_any_mut().downcast_mut::<T>().map(f)
    }

    pub fn is<T: Model>(&self) -> bool {
        let model = self.borrow();
        (*model).as_any().is::<T>()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Instance");
        out.field("id", &self.id()).field("model_id", &self.0.model_id);
        match self.0.model.try_borrow() {
            Ok(model) => out.field("model", &model),
            Err(_) => out.field("model", &"<borrowed>"),
        };
        out.finish()
    }
}
