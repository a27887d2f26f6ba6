pub mod client;
pub mod markup;
pub mod pager;
pub mod source;
pub mod types;

pub use client::ScrapboxClient;
pub use pager::Pager;
pub use source::{ApiError, PageSource};
pub use types::{Content, DEFAULT_BASE_URL, Link, Page, Project};
