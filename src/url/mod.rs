//! URL and text normalization helpers
//!
//! Pure functions used by the extractor and the traversal engine: link
//! resolution, inert-link detection, text cleanup, visit keys, paginated URL
//! construction and host keys.

mod host;
mod normalize;

pub use host::{host_key, same_host};
pub use normalize::{
    clean_text, is_inert_link, paged_url, parse_seed_url, resolve_link, visit_key,
};
