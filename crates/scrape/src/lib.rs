pub mod auth;
pub mod extract;
pub mod profile;
pub mod render;

#[cfg(test)]
pub(crate) mod testutil;

pub use auth::authenticate;
pub use profile::{extract_profile, normalize_profile_url, scrape_profile};
pub use render::normalize_url;
