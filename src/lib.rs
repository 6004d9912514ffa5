//! The library code for the `podium` static site generator, which builds a
//! site listing conference talks. The architecture can be generally broken
//! down into three steps:
//!
//! 1. Parsing pages from source files on disk ([`crate::parser`])
//! 2. Selecting the talk pages among them ([`crate::talk`])
//! 3. Rendering every page to disk ([`crate::write`])
//!
//! The second step is deliberately small: a [`talk::TalkCollection`] filters
//! the parsed [`page::PageRecord`]s by URL path prefix and wraps each match in
//! a [`talk::TalkView`] exposing the talk's `url` and `title`. The listing is
//! handed to the writer explicitly and placed into every page's template
//! context as `talks`.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod markdown;
pub mod page;
pub mod parser;
pub mod talk;
pub mod value;
pub mod write;
