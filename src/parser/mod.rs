pub mod block;
pub mod registry;
pub mod salvage;
pub mod segmenter;

pub use block::{blocks_to_json, BlockError, TestBlock};
pub use registry::{schema_for_tag, TestKind, TestSchema};
pub use segmenter::{parse_blocks, parse_bytes};
