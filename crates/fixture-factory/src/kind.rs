//! Attribute kinds: how each attribute of a definition is produced.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::generators::Faker;
use crate::model::Instance;
use crate::value::Value;

/// Ordered attribute kinds of a definition or an override set.
pub type Attributes = IndexMap<String, Kind>;

/// Closure computing an attribute from the owning instance and the data provider.
pub type InvocableFn = Rc<dyn Fn(&Instance, &mut Faker) -> Value>;

/// Describes how one attribute value is produced.
#[derive(Clone)]
pub enum Kind {
    /// Used as-is.
    Literal(Value),
    /// Called with the owning instance and the random-data provider.
    Invocable(InvocableFn),
    /// Resolved through the factory's generator registry.
    Named(Descriptor),
}

impl Kind {
    pub fn literal(value: impl Into<Value>) -> Self {
        Kind::Literal(value.into())
    }

    pub fn invocable<F, V>(f: F) -> Self
    where
        F: Fn(&Instance, &mut Faker) -> V + 'static,
        V: Into<Value>,
    {
        Kind::Invocable(Rc::new(move |instance, faker| f(instance, faker).into()))
    }

    pub fn named(descriptor: &str) -> Self {
        Kind::Named(Descriptor::parse(descriptor))
    }

    /// Relation to another model, built or created alongside the owner.
    pub fn factory(model_id: &str) -> Self {
        Kind::named(&format!("factory|{model_id}"))
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Kind::Invocable(_) => f.write_str("Invocable(..)"),
            Kind::Named(descriptor) => f.debug_tuple("Named").field(descriptor).finish(),
        }
    }
}

/// Strings are generator descriptors. Use [`Kind::literal`] for literal text.
impl From<&str> for Kind {
    fn from(descriptor: &str) -> Self {
        Kind::named(descriptor)
    }
}

impl From<String> for Kind {
    fn from(descriptor: String) -> Self {
        Kind::named(&descriptor)
    }
}

impl From<Descriptor> for Kind {
    fn from(descriptor: Descriptor) -> Self {
        Kind::Named(descriptor)
    }
}

impl From<Value> for Kind {
    fn from(value: Value) -> Self {
        Kind::Literal(value)
    }
}

macro_rules! literal_kind_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Kind {
                fn from(value: $ty) -> Self {
                    Kind::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_kind_from!(serde_json::Value, Instance, bool, i32, i64, u32, u64, f64);

/// A named-generator request such as `unique:email` or `number|1;10`.
///
/// Grammar: `[unique:][optional:]name[|arg;arg;...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    raw: String,
    pub name: String,
    pub args: Vec<String>,
    pub unique: bool,
    pub optional: bool,
}

impl Descriptor {
    pub fn parse(raw: &str) -> Self {
        let mut rest = raw.trim();
        let mut unique = false;
        let mut optional = false;

        loop {
            if let Some(stripped) = rest.strip_prefix("unique:") {
                unique = true;
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix("optional:") {
                optional = true;
                rest = stripped;
            } else {
                break;
            }
        }

        let (name, args) = match rest.split_once('|') {
            Some((name, args)) => (
                name,
                args.split(';').map(|arg| arg.trim().to_string()).collect(),
            ),
            None => (rest, Vec::new()),
        };

        Self {
            raw: raw.to_string(),
            name: name.trim().to_string(),
            args,
            unique,
            optional,
        }
    }

    /// The descriptor as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .filter(|arg| !arg.is_empty())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Builds an [`Attributes`] map. Values go through `Kind::from`, so strings are
/// descriptors and numbers, booleans and [`Value`]s are literals.
///
/// ```rust,ignore
/// let attrs = attributes! {
///     "name" => "name",
///     "role" => Kind::literal("admin"),
///     "age" => 30,
/// };
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($key:expr => $kind:expr),+ $(,)?) => {{
        let mut attributes = $crate::Attributes::new();
        $(
            attributes.insert(::std::string::String::from($key), $crate::Kind::from($kind));
        )+
        attributes
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        let descriptor = Descriptor::parse("email");
        assert_eq!(descriptor.name, "email");
        assert!(descriptor.args.is_empty());
        assert!(!descriptor.unique);
        assert!(!descriptor.optional);
    }

    #[test]
    fn test_parse_args_and_modifiers() {
        let descriptor = Descriptor::parse("unique:optional:number|1; 100");
        assert_eq!(descriptor.name, "number");
        assert_eq!(descriptor.args, vec!["1", "100"]);
        assert!(descriptor.unique);
        assert!(descriptor.optional);
        assert_eq!(descriptor.to_string(), "unique:optional:number|1; 100");
    }

    #[test]
    fn test_parse_grouped_relation() {
        let descriptor = Descriptor::parse("factory|admin:User");
        assert_eq!(descriptor.name, "factory");
        assert_eq!(descriptor.arg(0), Some("admin:User"));
        assert_eq!(descriptor.arg(1), None);
    }

    #[test]
    fn test_attributes_macro() {
        let attrs = crate::attributes! {
            "name" => "name",
            "role" => Kind::literal("admin"),
            "age" => 30i64,
        };

        let keys: Vec<_> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "role", "age"]);
        assert!(matches!(attrs["name"], Kind::Named(_)));
        assert!(matches!(&attrs["role"], Kind::Literal(v) if v.as_str() == Some("admin")));
        assert!(matches!(&attrs["age"], Kind::Literal(v) if v.as_i64() == Some(30)));
    }
}
