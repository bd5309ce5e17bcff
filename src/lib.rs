pub mod config;
pub mod db;
pub mod errors;
pub mod models;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use config::MongoDriverOptions;
pub use db::indexes::{create_index, has_index, list_indexes, remove_index, remove_index_by_option};
pub use db::query::{find_all, find_options, list};
pub use db::MongoDriver;
pub use errors::DriverError;
pub use models::{IndexDescriptor, IndexOption, ListOption, SortDirection};
