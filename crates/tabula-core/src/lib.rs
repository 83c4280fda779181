#[macro_use]
mod macros;

mod error;
pub use error::Error;

pub mod schema;
pub use schema::{Field, Table};

pub mod spec;
pub use spec::Spec;

pub mod visit;
pub use visit::Visit;

/// A Result type alias that uses Tabula's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
