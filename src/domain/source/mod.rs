pub mod model;

pub use model::Source;
