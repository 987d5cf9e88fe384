//! Destination shapes and the traits that give the engine write access to them.

use crate::{
    descriptor::StructDescriptor,
    error::{Result, ScanError},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::{ConversionError, FromValue, Json, Value};
use serde::de::DeserializeOwned;
use std::{
    any::{Any, TypeId, type_name},
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    sync::Arc,
};
use uuid::Uuid;

/// Structural classification of a destination type.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Struct(&'static StructDescriptor),
    Map,
    Scalar,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Struct(_) => "struct",
            Shape::Map => "map",
            Shape::Scalar => "scalar",
        }
    }
}

/// Anything a row can be scanned into.
///
/// `shape` is static: it classifies the type, not a value, so it is checked
/// once when a scanner starts.
pub trait Destination: 'static {
    fn shape() -> Result<Shape>
    where
        Self: Sized;

    fn target(&mut self) -> Target<'_>;
}

/// Classifies `D`, failing with `InvalidDestination` when it cannot be scanned
/// into.
pub fn classify<D: Destination>() -> Result<Shape> {
    D::shape()
}

/// Write access to a destination, one variant per shape.
pub enum Target<'a> {
    Struct(&'a mut dyn Record),
    Map(&'a mut dyn MapTarget),
    Scalar(&'a mut dyn Receiver),
}

/// A typed slot that accepts one populated value.
pub trait Receiver {
    fn receive(&mut self, value: Value) -> std::result::Result<(), ConversionError>;
}

impl<T: FromValue> Receiver for T {
    fn receive(&mut self, value: Value) -> std::result::Result<(), ConversionError> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

/// A struct whose members can be addressed by declaration index.
pub trait Record {
    fn descriptor() -> &'static StructDescriptor
    where
        Self: Sized;

    /// Returns the member at `index`, or `None` for members that are not
    /// scan targets (unexported, ignored, out of range).
    fn member_mut(&mut self, index: usize) -> Option<Member<'_>>;
}

pub enum Member<'a> {
    Leaf(&'a mut dyn Receiver),
    Embedded(&'a mut dyn Embedded),
}

/// Access to an embedded struct member, allocating it on first write when it
/// is held behind an optional pointer.
pub trait Embedded {
    fn is_allocated(&self) -> bool;

    fn record_mut(&mut self) -> &mut dyn Record;
}

/// Static side of an embedded member type, used by generated descriptors.
pub trait Embed: Embedded {
    const LAZY: bool;

    fn descriptor() -> &'static StructDescriptor;
}

impl<T: Record + Default> Embedded for Option<Box<T>> {
    fn is_allocated(&self) -> bool {
        self.is_some()
    }

    fn record_mut(&mut self) -> &mut dyn Record {
        &mut **self.get_or_insert_with(Box::default)
    }
}

impl<T: Record + Default> Embed for Option<Box<T>> {
    const LAZY: bool = true;

    fn descriptor() -> &'static StructDescriptor {
        T::descriptor()
    }
}

impl<T: Record> Embedded for Box<T> {
    fn is_allocated(&self) -> bool {
        true
    }

    fn record_mut(&mut self) -> &mut dyn Record {
        &mut **self
    }
}

impl<T: Record> Embed for Box<T> {
    const LAZY: bool = false;

    fn descriptor() -> &'static StructDescriptor {
        T::descriptor()
    }
}

/// A string-keyed mapping that receives one entry per column.
pub trait MapTarget {
    fn insert_column(&mut self, column: &str, value: Value) -> Result<()>;
}

fn is_string_key<K: 'static>() -> bool {
    let id = TypeId::of::<K>();
    id == TypeId::of::<String>() || id == TypeId::of::<Box<str>>() || id == TypeId::of::<Arc<str>>()
}

fn string_key<K: 'static>(name: &str) -> Option<K> {
    let id = TypeId::of::<K>();
    let key: Box<dyn Any> = if id == TypeId::of::<String>() {
        Box::new(name.to_string())
    } else if id == TypeId::of::<Box<str>>() {
        Box::new(Box::<str>::from(name))
    } else if id == TypeId::of::<Arc<str>>() {
        Box::new(Arc::<str>::from(name))
    } else {
        return None;
    };
    key.downcast::<K>().ok().map(|key| *key)
}

fn map_shape<M: 'static, K: 'static>() -> Result<Shape> {
    if is_string_key::<K>() {
        Ok(Shape::Map)
    } else {
        Err(ScanError::invalid_destination(
            type_name::<M>(),
            format!("map must have string key, got: {}", type_name::<K>()),
        ))
    }
}

fn map_key<M: 'static, K: 'static>(column: &str) -> Result<K> {
    string_key::<K>(column).ok_or_else(|| {
        ScanError::invalid_destination(
            type_name::<M>(),
            format!("map must have string key, got: {}", type_name::<K>()),
        )
    })
}

impl<K, S> Destination for HashMap<K, Value, S>
where
    K: Eq + Hash + 'static,
    S: BuildHasher + 'static,
{
    fn shape() -> Result<Shape> {
        map_shape::<Self, K>()
    }

    fn target(&mut self) -> Target<'_> {
        Target::Map(self)
    }
}

impl<K, S> MapTarget for HashMap<K, Value, S>
where
    K: Eq + Hash + 'static,
    S: BuildHasher + 'static,
{
    fn insert_column(&mut self, column: &str, value: Value) -> Result<()> {
        let key = map_key::<Self, K>(column)?;
        self.insert(key, value);
        Ok(())
    }
}

impl<K> Destination for BTreeMap<K, Value>
where
    K: Ord + 'static,
{
    fn shape() -> Result<Shape> {
        map_shape::<Self, K>()
    }

    fn target(&mut self) -> Target<'_> {
        Target::Map(self)
    }
}

impl<K> MapTarget for BTreeMap<K, Value>
where
    K: Ord + 'static,
{
    fn insert_column(&mut self, column: &str, value: Value) -> Result<()> {
        let key = map_key::<Self, K>(column)?;
        self.insert(key, value);
        Ok(())
    }
}

macro_rules! scalar_destination {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Destination for $ty {
                fn shape() -> Result<Shape> {
                    Ok(Shape::Scalar)
                }

                fn target(&mut self) -> Target<'_> {
                    Target::Scalar(self)
                }
            }
        )*
    };
}

scalar_destination!(
    String,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    Value,
    serde_json::Value,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
);

impl<T: FromValue + 'static> Destination for Option<T> {
    fn shape() -> Result<Shape> {
        Ok(Shape::Scalar)
    }

    fn target(&mut self) -> Target<'_> {
        Target::Scalar(self)
    }
}

impl<T: FromValue + 'static> Destination for Vec<T> {
    fn shape() -> Result<Shape> {
        Ok(Shape::Scalar)
    }

    fn target(&mut self) -> Target<'_> {
        Target::Scalar(self)
    }
}

impl<T: DeserializeOwned + 'static> Destination for Json<T> {
    fn shape() -> Result<Shape> {
        Ok(Shape::Scalar)
    }

    fn target(&mut self) -> Target<'_> {
        Target::Scalar(self)
    }
}

impl<D: Destination> Destination for Box<D> {
    fn shape() -> Result<Shape> {
        D::shape()
    }

    fn target(&mut self) -> Target<'_> {
        (**self).target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_keyed_maps_are_maps() {
        assert!(matches!(classify::<HashMap<String, Value>>(), Ok(Shape::Map)));
        assert!(matches!(classify::<BTreeMap<Arc<str>, Value>>(), Ok(Shape::Map)));
        assert!(matches!(classify::<HashMap<Box<str>, Value>>(), Ok(Shape::Map)));
    }

    #[test]
    fn test_non_string_key_names_key_type() {
        let err = classify::<HashMap<i32, Value>>().unwrap_err();
        assert!(matches!(err, ScanError::InvalidDestination { .. }));
        assert!(err.to_string().ends_with("map must have string key, got: i32"));
    }

    #[test]
    fn test_scalars_and_boxes() {
        assert!(matches!(classify::<String>(), Ok(Shape::Scalar)));
        assert!(matches!(classify::<Box<String>>(), Ok(Shape::Scalar)));
        assert!(matches!(classify::<Vec<String>>(), Ok(Shape::Scalar)));
        assert!(matches!(classify::<Option<i64>>(), Ok(Shape::Scalar)));
    }

    #[test]
    fn test_map_target_inserts_column_keys() {
        let mut dst: HashMap<Arc<str>, Value> = HashMap::new();
        match dst.target() {
            Target::Map(map) => map.insert_column("foo", Value::from("foo val")).unwrap(),
            _ => panic!("expected map target"),
        }
        assert_eq!(dst.get("foo"), Some(&Value::from("foo val")));
    }

    #[test]
    fn test_receiver_overwrites_leaf() {
        let mut leaf = String::from("old");
        leaf.receive(Value::from("new")).unwrap();
        assert_eq!(leaf, "new");
        assert!(leaf.receive(Value::Null).is_err());
        assert_eq!(leaf, "new");
    }
}
