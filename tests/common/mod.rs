//! Common test utilities shared across all test modules
//!
//! Helpers for composing synthetic serial transcripts: clean blocks,
//! corrupted rows, and the noise that surrounds them in real captures.

/// A clean 6-column test_turn data row
pub const TURN_ROW: &str = "0.000,24.96,0.000,100.0,0.0,0.0";

/// A clean 13-column test_straight_v2 data row
pub const STRAIGHT_V2_ROW: &str =
    "0.02,10.0,350.0,351.0,-1.0,5.0,0.02,80.0,0.5,0.1,3.0,120.0,118.0";

/// The canonical test_minspeed header line
pub const MINSPEED_HEADER: &str = "time_s,power,diff";

/// Compose a transcript block: tag, optional header echo, rows, footer lines.
pub fn block_text(tag: &str, header: Option<&str>, rows: &[&str], footer: &[&str]) -> String {
    let mut out = String::new();
    out.push_str(tag);
    out.push('\n');
    if let Some(header) = header {
        out.push_str(header);
        out.push('\n');
    }
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    for line in footer {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// A minimal clean test_minspeed block with a completion footer
pub fn minspeed_block() -> String {
    block_text(
        "test_minspeed",
        Some(MINSPEED_HEADER),
        &["0.0,20,1.2", "0.1,20,1.1"],
        &["--- test_minspeed complete ---"],
    )
}

/// Unrelated firmware chatter that should never produce a block
pub fn noise_lines() -> String {
    "Booting brain...\n\
     [info] battery 12.4V\n\
     motor temp ok\n\n"
        .to_string()
}
