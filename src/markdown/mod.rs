//! # Markdown
//!
//! The small markdown dialect notes are written in. Parsing happens in
//! three independent passes:
//!
//! ```text
//! body ──[sections]──▶ Section { heading, content }
//! content ──[blocks]──▶ Segment::Blank | Segment::Block(Block)
//! line ──[inline]──▶ Vec<StyledSpan>
//! ```
//!
//! [`blocks::segment_blocks`] is the single place run boundaries are decided;
//! the height estimator and the block renderers both consume it.

pub mod blocks;
pub mod images;
pub mod inline;
pub mod sections;

pub use blocks::{segment_blocks, Segment};
pub use images::{extract_images, image_tag_count, strip_images, ImageRef};
pub use inline::parse_inline;
pub use sections::parse_sections;
