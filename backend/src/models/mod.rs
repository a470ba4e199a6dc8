pub mod notebook;
pub mod repository;

pub use notebook::*;
pub use repository::*;
