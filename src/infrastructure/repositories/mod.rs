pub mod source_repository;

pub use source_repository::{PgSourceRepository, SourceRepository};
