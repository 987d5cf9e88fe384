pub mod core;

pub use crate::core::{
    convert::{ConversionError, FromValue, Json},
    value::Value,
};
