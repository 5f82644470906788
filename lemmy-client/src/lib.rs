pub mod api;

pub use api::{exact_match, provenance_body, LemmyClient};

#[cfg(test)]
mod tests;
