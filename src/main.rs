//! vexlog - dump the test blocks recovered from a transcript as JSON
//!
//! Thin consumer around the parsing engine, useful for piping captures into
//! plotting tools or eyeballing what survived a noisy run:
//!
//! ```text
//! vexlog capture.txt
//! ```

use anyhow::{Context, Result};

use vexlog::parser::{blocks_to_json, parse_bytes};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: vexlog <transcript>")?;
    let bytes =
        std::fs::read(&path).with_context(|| format!("failed to read transcript '{path}'"))?;

    // Serial captures routinely carry invalid UTF-8; decode is lossy
    let blocks = parse_bytes(&bytes);
    println!("{}", serde_json::to_string_pretty(&blocks_to_json(&blocks))?);

    Ok(())
}
