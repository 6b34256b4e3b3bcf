//! HTML output for mdtree trees.

pub mod compiler;
pub mod escape;

#[cfg(test)]
mod tests;

pub use compiler::{markdown_to_html, render_html, RenderOptions};
pub use escape::{escape_href, escape_html, is_unsafe_url};
