mod http;
mod source;

pub use http::{ApiKeyStyle, HttpSource};
pub use source::FeedSource;
