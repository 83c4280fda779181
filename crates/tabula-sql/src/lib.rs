pub mod serializer;
pub use serializer::{Param, Params, Placeholder, Serializer};

pub mod ty;
pub use ty::{StorageTypes, Type};
