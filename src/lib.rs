//! vexlog - segmentation and recovery engine for robot test-run serial logs
//!
//! The robot firmware prints structured CSV test data straight to a serial
//! terminal, interleaved with unrelated log output and mangled by the lossy
//! link: truncated lines, garbled trailing bytes, duplicated headers. This
//! library scans a raw transcript, finds the test-run blocks, validates or
//! repairs their rows, and returns typed per-column numeric data.
//!
//! ## Module Structure
//!
//! - [`parser`] - The segmentation and recovery engine
//!   - `registry` - Static tag-to-schema table for the known test types
//!   - `segmenter` - State machine that delimits candidate blocks
//!   - `salvage` - Row validation and best-effort numeric repair
//!   - `block` - Typed block materialization and JSON projection
//!
//! Parsing is a pure, single-pass computation over an in-memory string:
//! no I/O, no shared state, safe to call from any number of threads. Every
//! failure is absorbed locally; a corrupt row or block never aborts the
//! rest of the transcript.

pub mod parser;

pub use parser::{parse_blocks, parse_bytes, TestBlock, TestKind};
