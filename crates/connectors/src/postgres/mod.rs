pub mod connect;
pub mod decode;
pub mod query;
pub mod rows;
