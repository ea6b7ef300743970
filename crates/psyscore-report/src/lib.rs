//! psyscore-report: rendered results pages.

pub mod html;

pub use html::{generate_html, write_html_report};
