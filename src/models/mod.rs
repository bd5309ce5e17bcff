// Option and descriptor types shared by the index manager and query executor

pub mod index;
pub mod query;
pub mod sort;

pub use index::*;
pub use query::*;
pub use sort::*;
