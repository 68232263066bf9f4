pub mod error;
pub mod value;

pub use error::{ConfError, ErrorKind, Result, ValidationError, ValidationErrorKind};
pub use value::Value;
