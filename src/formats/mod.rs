pub mod toc;

pub use toc::{SpriteName, TableOfContents, TocEntry};
