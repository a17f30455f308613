mod handler;
mod model;

pub use handler::{fans, follow, following, unfollow};
