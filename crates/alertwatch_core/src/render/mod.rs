//! Presentation adapter: normalized alerts to a static HTML page.

pub mod page;

pub use page::{escape_html, render_page, PageContext};
