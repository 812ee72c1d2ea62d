//! Catalog access: categories, the upstream client and listing helpers

pub mod category;
pub mod pagination;
pub mod upstream;

pub use category::Category;
pub use pagination::{page_count, page_window, record_path, table_headers, turn_page};
pub use upstream::{validate_path, UpstreamClient, UpstreamResponse};
