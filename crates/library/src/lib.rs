mod error;
mod repository;

pub use error::{LibraryError, LibraryResult};
pub use repository::VideoRepository;
