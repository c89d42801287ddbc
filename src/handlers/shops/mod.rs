pub mod listing;
pub mod upload;

pub use listing::{delete, get, list};
pub use upload::upload;
