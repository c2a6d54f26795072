pub mod types;

pub use types::{AppError, FieldError, TransportError};
