//! Block segmentation over raw terminal transcripts.
//!
//! A transcript is one long capture of everything the robot printed over the
//! serial link: test-run blocks interleaved with unrelated log output,
//! duplicated headers, and corrupted rows. The segmenter makes a single
//! forward pass with an explicit state machine:
//!
//! ```text
//! SeekingTag -> CollectingRows -> CollectingFooter -> SeekingTag
//! ```
//!
//! There is no backtracking; a consumed line is never re-read. The only
//! retrospective step is a bounded lookback window over the 5 most recently
//! visited lines, used to recover a sample count that was emitted out of
//! band for a corrupted block.

use super::block::{build_block, BlockError, TestBlock};
use super::registry::{schema_for_tag, TestSchema};
use super::salvage::{find_sample_count, is_data_row, try_salvage};

/// Footer lines start with this prefix
const FOOTER_PREFIX: &str = "---";

/// How many already-visited lines the out-of-band sample-count recovery may
/// inspect
const SAMPLE_COUNT_LOOKBACK: usize = 5;

/// Forward-only cursor over the transcript's lines
struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Up to `n` lines immediately preceding the cursor, oldest first
    fn lookback(&self, n: usize) -> &[&'a str] {
        &self.lines[self.pos.saturating_sub(n)..self.pos]
    }
}

/// Rows and metadata accumulated for one candidate block
struct BlockDraft {
    schema: &'static TestSchema,
    rows: Vec<String>,
    corrupted: bool,
    meta: Option<String>,
    expected_samples: Option<usize>,
}

impl BlockDraft {
    fn new(schema: &'static TestSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            corrupted: false,
            meta: None,
            expected_samples: None,
        }
    }
}

enum State {
    SeekingTag,
    CollectingRows(BlockDraft),
    CollectingFooter(BlockDraft),
}

/// Extract every recoverable test block from a raw transcript, in document
/// order of their opening tag.
///
/// Never fails: corrupt rows are dropped or repaired, and a block that
/// cannot be materialized is discarded without disturbing the rest of the
/// parse.
pub fn parse_blocks(text: &str) -> Vec<TestBlock> {
    let mut cursor = Cursor::new(text);
    let mut blocks: Vec<TestBlock> = Vec::new();
    let mut state = State::SeekingTag;

    loop {
        state = match state {
            State::SeekingTag => {
                let Some(line) = cursor.peek() else { break };
                match schema_for_tag(line.trim()) {
                    Some(schema) => {
                        cursor.bump();
                        skip_preamble(&mut cursor, schema);
                        State::CollectingRows(BlockDraft::new(schema))
                    }
                    None => {
                        cursor.bump();
                        State::SeekingTag
                    }
                }
            }

            State::CollectingRows(mut draft) => match cursor.peek() {
                None => State::CollectingFooter(draft),
                Some(raw) => {
                    let line = raw.trim();
                    // Stop conditions end the phase without consuming the line:
                    // the footer, a new tag, or a blank separator.
                    if line.is_empty()
                        || line.starts_with(FOOTER_PREFIX)
                        || schema_for_tag(line).is_some()
                    {
                        State::CollectingFooter(draft)
                    } else {
                        collect_row(line, &mut draft);
                        cursor.bump();
                        State::CollectingRows(draft)
                    }
                }
            },

            State::CollectingFooter(mut draft) => {
                collect_footer(&mut cursor, &mut draft);
                finish_block(draft, &mut blocks);
                State::SeekingTag
            }
        };
    }

    tracing::info!(blocks = blocks.len(), "parsed transcript");
    blocks
}

/// Lossy-decode a captured byte stream and parse it.
///
/// Serial captures routinely contain invalid UTF-8; corrupted bytes are
/// replaced before parsing.
pub fn parse_bytes(bytes: &[u8]) -> Vec<TestBlock> {
    parse_blocks(&String::from_utf8_lossy(bytes))
}

/// After a tag line: skip a run of blank lines, then at most one exact echo
/// of the canonical header.
fn skip_preamble(cursor: &mut Cursor<'_>, schema: &TestSchema) {
    while cursor.peek().is_some_and(|l| l.trim().is_empty()) {
        cursor.bump();
    }
    if cursor.peek().is_some_and(|l| l.trim() == schema.header()) {
        cursor.bump();
    }
}

/// Validate or salvage one candidate row. Unrecoverable lines are skipped
/// with no signal; the serial link is expected to drop bytes.
fn collect_row(line: &str, draft: &mut BlockDraft) {
    let ncols = draft.schema.column_count();
    if is_data_row(line, ncols) {
        draft.rows.push(line.to_string());
    } else if let Some(repaired) = try_salvage(line, ncols) {
        tracing::debug!(tag = draft.schema.tag(), original = line, "salvaged row");
        draft.rows.push(repaired);
        draft.corrupted = true;
    }
}

/// Consume the contiguous footer run and capture its metadata.
///
/// Any footer line containing "complete" becomes the completion annotation;
/// when several match, the last one wins. Every footer line is scanned for
/// the declared sample count, as is one trailing non-footer line that
/// mentions both "total" and "samples" (that line is not consumed). If the
/// count is still unknown and the block needed salvage, the lookback window
/// is checked for a count that arrived out of band.
fn collect_footer(cursor: &mut Cursor<'_>, draft: &mut BlockDraft) {
    while let Some(raw) = cursor.peek() {
        let line = raw.trim();
        if line.starts_with(FOOTER_PREFIX) {
            if line.contains("complete") {
                draft.meta = Some(line.to_string());
            }
            if let Some(count) = find_sample_count(line) {
                draft.expected_samples = Some(count);
            }
            cursor.bump();
            continue;
        }
        if line.contains("total") && line.contains("samples") {
            if let Some(count) = find_sample_count(line) {
                draft.expected_samples = Some(count);
            }
        }
        break;
    }

    if draft.expected_samples.is_none() && draft.corrupted {
        for previous in cursor.lookback(SAMPLE_COUNT_LOOKBACK) {
            if let Some(count) = find_sample_count(previous) {
                draft.expected_samples = Some(count);
                break;
            }
        }
    }
}

/// Materialize a draft, or discard it atomically
fn finish_block(draft: BlockDraft, blocks: &mut Vec<TestBlock>) {
    match build_block(
        draft.schema,
        &draft.rows,
        draft.meta,
        draft.expected_samples,
        draft.corrupted,
    ) {
        Ok(block) => blocks.push(block),
        Err(BlockError::Empty) => {
            tracing::debug!(tag = draft.schema.tag(), "block had no surviving rows");
        }
        Err(err) => {
            tracing::warn!(tag = draft.schema.tag(), error = %err, "discarded block");
        }
    }
}
