pub mod convert;
pub mod value;
