pub mod api;
pub mod comments;

pub use api::{posts_from_listing, RedditClient, HOT_LIMIT};
pub use comments::flatten_listing;

#[cfg(test)]
mod tests;
