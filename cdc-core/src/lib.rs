pub mod error;
pub mod identity;

pub use error::StoreError;
pub use identity::Actor;

pub type StoreResult<T> = Result<T, StoreError>;
