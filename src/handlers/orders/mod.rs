pub mod place;
pub mod query;
pub mod status;

pub use place::place;
pub use query::{by_status, by_user, get, pending};
pub use status::update_status;
