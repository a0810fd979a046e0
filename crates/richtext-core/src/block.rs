//! Content blocks and their annotation ranges.
//!
//! A [`Block`] is one unit of document structure (a paragraph, a heading, a
//! list item, ...). It owns its text plus two sets of half-open character
//! ranges: inline style ranges and entity ranges. Blocks are immutable
//! values; every edit produces a new `Block`.
//!
//! All offsets in this module are character offsets (Unicode scalar values),
//! never byte offsets. Ranges are `[start, end)`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::entity::EntityKey;

static NEXT_BLOCK_KEY: AtomicU64 = AtomicU64::new(1);

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

/// Stable identity of a block. Assigned at creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockKey(String);

impl BlockKey {
    /// Wrap an explicit key (e.g. one read back from a raw snapshot).
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a fresh key from a process-wide monotonic counter.
    pub fn generate() -> Self {
        let n = NEXT_BLOCK_KEY.fetch_add(1, Ordering::Relaxed);
        Self(format!("b{}", to_base36(n)))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Block-level structure tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Plain paragraph (the default).
    Paragraph,
    /// Top-level heading.
    HeadingOne,
    /// Second-level heading.
    HeadingTwo,
    /// Third-level heading.
    HeadingThree,
    /// Block quotation.
    Blockquote,
    /// Bulleted list item.
    UnorderedListItem,
    /// Numbered list item.
    OrderedListItem,
    /// Preformatted code block.
    CodeBlock,
    /// A host-defined block type, carried by its tag.
    Custom(String),
}

impl BlockType {
    /// The wire tag for this block type.
    pub fn as_tag(&self) -> &str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::HeadingOne => "heading-1",
            BlockType::HeadingTwo => "heading-2",
            BlockType::HeadingThree => "heading-3",
            BlockType::Blockquote => "blockquote",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::CodeBlock => "code-block",
            BlockType::Custom(tag) => tag,
        }
    }

    /// Parse a wire tag. Unknown tags become [`BlockType::Custom`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "paragraph" => BlockType::Paragraph,
            "heading-1" => BlockType::HeadingOne,
            "heading-2" => BlockType::HeadingTwo,
            "heading-3" => BlockType::HeadingThree,
            "blockquote" => BlockType::Blockquote,
            "unordered-list-item" => BlockType::UnorderedListItem,
            "ordered-list-item" => BlockType::OrderedListItem,
            "code-block" => BlockType::CodeBlock,
            other => BlockType::Custom(other.to_string()),
        }
    }

    /// Whether this type participates in list nesting (depth adjustment).
    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            BlockType::UnorderedListItem | BlockType::OrderedListItem
        )
    }
}

impl Default for BlockType {
    fn default() -> Self {
        BlockType::Paragraph
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Character-level style tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    /// Bold text.
    Bold,
    /// Italic text.
    Italic,
    /// Underlined text.
    Underline,
    /// Struck-through text.
    Strikethrough,
    /// Inline code.
    Code,
    /// A host-defined style, carried by its tag.
    Custom(String),
}

impl InlineStyle {
    /// The wire tag for this style.
    pub fn as_tag(&self) -> &str {
        match self {
            InlineStyle::Bold => "BOLD",
            InlineStyle::Italic => "ITALIC",
            InlineStyle::Underline => "UNDERLINE",
            InlineStyle::Strikethrough => "STRIKETHROUGH",
            InlineStyle::Code => "CODE",
            InlineStyle::Custom(tag) => tag,
        }
    }

    /// Parse a wire tag. Unknown tags become [`InlineStyle::Custom`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "BOLD" => InlineStyle::Bold,
            "ITALIC" => InlineStyle::Italic,
            "UNDERLINE" => InlineStyle::Underline,
            "STRIKETHROUGH" => InlineStyle::Strikethrough,
            "CODE" => InlineStyle::Code,
            other => InlineStyle::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A style applied over a half-open character range of one block.
///
/// Ranges of the *same* style never overlap within a block (they are merged
/// on construction); ranges of different styles may.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRange {
    /// The applied style.
    pub style: InlineStyle,
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl StyleRange {
    /// Create a style range over `[start, end)`.
    pub fn new(style: InlineStyle, start: usize, end: usize) -> Self {
        Self { style, start, end }
    }

    /// Whether the range contains the given character offset.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// An entity reference attached to a half-open character range of one block.
///
/// Ranges referencing the same entity key never overlap within a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRange {
    /// Key of the referenced entity in the document's registry.
    pub key: EntityKey,
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl EntityRange {
    /// Create an entity range over `[start, end)`.
    pub fn new(key: EntityKey, start: usize, end: usize) -> Self {
        Self { key, start, end }
    }

    /// Whether the range contains the given character offset.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Shift a `[start, end)` range for an insertion of `delta` characters at
/// `pos`. Ranges at or after the insertion point shift; ranges spanning it
/// extend.
fn range_after_insertion(start: usize, end: usize, pos: usize, delta: usize) -> (usize, usize) {
    if start >= pos {
        (start + delta, end + delta)
    } else if end > pos {
        (start, end + delta)
    } else {
        (start, end)
    }
}

/// Shift a `[start, end)` range for the deletion of `[del_start, del_end)`.
/// Returns `None` when the range is fully consumed by the deletion.
fn range_after_deletion(
    start: usize,
    end: usize,
    del_start: usize,
    del_end: usize,
) -> Option<(usize, usize)> {
    let delta = del_end - del_start;
    if end <= del_start {
        Some((start, end))
    } else if start >= del_end {
        Some((start - delta, end - delta))
    } else if start >= del_start && end <= del_end {
        None
    } else if start < del_start && end > del_end {
        Some((start, end - delta))
    } else if start < del_start {
        // Right part of the range was deleted.
        Some((start, del_start))
    } else {
        // Left part of the range was deleted.
        Some((del_start, end - delta))
    }
}

pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// One unit of document structure: text plus inline style and entity
/// annotation ranges.
///
/// `Block` is an immutable value; the `with_*` and edit methods all return a
/// new block sharing nothing mutable with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    key: BlockKey,
    block_type: BlockType,
    depth: usize,
    text: String,
    style_ranges: Vec<StyleRange>,
    entity_ranges: Vec<EntityRange>,
}

impl Block {
    /// Create a block with no annotation ranges at depth 0.
    pub fn new(key: BlockKey, block_type: BlockType, text: impl Into<String>) -> Self {
        Self {
            key,
            block_type,
            depth: 0,
            text: text.into(),
            style_ranges: Vec::new(),
            entity_ranges: Vec::new(),
        }
    }

    /// Create an empty paragraph with a freshly generated key.
    pub fn empty_paragraph() -> Self {
        Self::new(BlockKey::generate(), BlockType::Paragraph, "")
    }

    /// The block's stable key.
    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    /// The block's structure tag.
    pub fn block_type(&self) -> &BlockType {
        &self.block_type
    }

    /// List nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The block's raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the block holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Inline style ranges, sorted by start offset.
    pub fn style_ranges(&self) -> &[StyleRange] {
        &self.style_ranges
    }

    /// Entity ranges, sorted by start offset.
    pub fn entity_ranges(&self) -> &[EntityRange] {
        &self.entity_ranges
    }

    /// All styles applied at the given character offset.
    pub fn styles_at(&self, offset: usize) -> Vec<&InlineStyle> {
        self.style_ranges
            .iter()
            .filter(|r| r.contains(offset))
            .map(|r| &r.style)
            .collect()
    }

    /// The entity referenced at the given character offset, if any.
    pub fn entity_at(&self, offset: usize) -> Option<&EntityKey> {
        self.entity_ranges
            .iter()
            .find(|r| r.contains(offset))
            .map(|r| &r.key)
    }

    /// The full range of the entity covering `offset`, if any.
    pub fn entity_range_at(&self, offset: usize) -> Option<&EntityRange> {
        self.entity_ranges.iter().find(|r| r.contains(offset))
    }

    /// Whether every character in `[start, end)` carries `style`.
    ///
    /// Empty ranges are trivially covered. Same-style ranges are kept
    /// merged, so coverage means a single range spans the query.
    pub fn has_style_over(&self, style: &InlineStyle, start: usize, end: usize) -> bool {
        if start >= end {
            return true;
        }
        self.style_ranges
            .iter()
            .any(|r| r.style == *style && r.start <= start && end <= r.end)
    }

    /// Replace the structure tag.
    pub fn with_type(&self, block_type: BlockType) -> Self {
        let mut block = self.clone();
        block.block_type = block_type;
        block
    }

    /// Replace the nesting depth.
    pub fn with_depth(&self, depth: usize) -> Self {
        let mut block = self.clone();
        block.depth = depth;
        block
    }

    /// Replace the style ranges wholesale (sorted and same-style merged).
    pub fn with_style_ranges(&self, ranges: Vec<StyleRange>) -> Self {
        let mut block = self.clone();
        block.style_ranges = ranges;
        block.normalize_styles();
        block
    }

    /// Replace the entity ranges wholesale (sorted and same-key merged).
    pub fn with_entity_ranges(&self, ranges: Vec<EntityRange>) -> Self {
        let mut block = self.clone();
        block.entity_ranges = ranges;
        block.normalize_entities();
        block
    }

    fn normalize_styles(&mut self) {
        let len = self.len();
        self.style_ranges.retain(|r| r.start < r.end && r.start < len);
        for r in &mut self.style_ranges {
            r.end = r.end.min(len);
        }
        self.style_ranges
            .sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));

        let mut merged: Vec<StyleRange> = Vec::with_capacity(self.style_ranges.len());
        for range in self.style_ranges.drain(..) {
            if let Some(last) = merged
                .iter_mut()
                .rev()
                .find(|r| r.style == range.style && r.end >= range.start)
            {
                last.end = last.end.max(range.end);
            } else {
                merged.push(range);
            }
        }
        merged.sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));
        self.style_ranges = merged;
    }

    fn normalize_entities(&mut self) {
        let len = self.len();
        self.entity_ranges
            .retain(|r| r.start < r.end && r.start < len);
        for r in &mut self.entity_ranges {
            r.end = r.end.min(len);
        }
        self.entity_ranges
            .sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));

        let mut merged: Vec<EntityRange> = Vec::with_capacity(self.entity_ranges.len());
        for range in self.entity_ranges.drain(..) {
            if let Some(last) = merged
                .iter_mut()
                .rev()
                .find(|r| r.key == range.key && r.end >= range.start)
            {
                last.end = last.end.max(range.end);
            } else {
                merged.push(range);
            }
        }
        merged.sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));
        self.entity_ranges = merged;
    }

    /// Insert `text` at the given character offset, shifting annotation
    /// ranges. Ranges spanning the insertion point extend over it.
    pub fn insert_text(&self, offset: usize, text: &str) -> Self {
        if text.is_empty() {
            return self.clone();
        }
        let delta = text.chars().count();
        let at = byte_offset(&self.text, offset);

        let mut new_text = String::with_capacity(self.text.len() + text.len());
        new_text.push_str(&self.text[..at]);
        new_text.push_str(text);
        new_text.push_str(&self.text[at..]);

        let style_ranges = self
            .style_ranges
            .iter()
            .map(|r| {
                let (start, end) = range_after_insertion(r.start, r.end, offset, delta);
                StyleRange::new(r.style.clone(), start, end)
            })
            .collect();
        let entity_ranges = self
            .entity_ranges
            .iter()
            .map(|r| {
                let (start, end) = range_after_insertion(r.start, r.end, offset, delta);
                EntityRange::new(r.key.clone(), start, end)
            })
            .collect();

        Self {
            key: self.key.clone(),
            block_type: self.block_type.clone(),
            depth: self.depth,
            text: new_text,
            style_ranges,
            entity_ranges,
        }
    }

    /// Remove the character range `[start, end)`, shifting annotation
    /// ranges. Ranges fully inside the removal vanish; partial overlaps
    /// truncate.
    pub fn remove_range(&self, start: usize, end: usize) -> Self {
        if start >= end {
            return self.clone();
        }
        let from = byte_offset(&self.text, start);
        let to = byte_offset(&self.text, end);

        let mut new_text = String::with_capacity(self.text.len() - (to - from));
        new_text.push_str(&self.text[..from]);
        new_text.push_str(&self.text[to..]);

        let style_ranges = self
            .style_ranges
            .iter()
            .filter_map(|r| {
                range_after_deletion(r.start, r.end, start, end)
                    .map(|(s, e)| StyleRange::new(r.style.clone(), s, e))
            })
            .collect();
        let entity_ranges = self
            .entity_ranges
            .iter()
            .filter_map(|r| {
                range_after_deletion(r.start, r.end, start, end)
                    .map(|(s, e)| EntityRange::new(r.key.clone(), s, e))
            })
            .collect();

        Self {
            key: self.key.clone(),
            block_type: self.block_type.clone(),
            depth: self.depth,
            text: new_text,
            style_ranges,
            entity_ranges,
        }
    }

    /// Keep only the text from `offset` to the end, under the same key.
    pub fn tail_from(&self, offset: usize) -> Self {
        self.remove_range(0, offset)
    }

    /// Keep only the text before `offset`, under the same key.
    pub fn head_to(&self, offset: usize) -> Self {
        self.remove_range(offset, self.len())
    }

    /// Split at `offset` into a head (original key) and a tail (`tail_key`),
    /// distributing annotation ranges between the two.
    pub fn split_at(&self, offset: usize, tail_key: BlockKey) -> (Self, Self) {
        let head = self.head_to(offset);
        let mut tail = self.tail_from(offset);
        tail.key = tail_key;
        (head, tail)
    }

    /// Append another block's text and annotation ranges after this block's
    /// text, keeping this block's key, type, and depth.
    pub fn append(&self, other: &Self) -> Self {
        let shift = self.len();
        let mut block = self.clone();
        block.text.push_str(&other.text);
        block.style_ranges.extend(
            other
                .style_ranges
                .iter()
                .map(|r| StyleRange::new(r.style.clone(), r.start + shift, r.end + shift)),
        );
        block.entity_ranges.extend(
            other
                .entity_ranges
                .iter()
                .map(|r| EntityRange::new(r.key.clone(), r.start + shift, r.end + shift)),
        );
        block.normalize_styles();
        block.normalize_entities();
        block
    }

    /// Apply `style` over `[start, end)` (merged with touching same-style
    /// ranges).
    pub fn apply_style(&self, style: InlineStyle, start: usize, end: usize) -> Self {
        if start >= end {
            return self.clone();
        }
        let mut ranges = self.style_ranges.clone();
        ranges.push(StyleRange::new(style, start, end));
        self.with_style_ranges(ranges)
    }

    /// Remove `style` from `[start, end)`; a covering range may split in
    /// two.
    pub fn remove_style(&self, style: &InlineStyle, start: usize, end: usize) -> Self {
        if start >= end {
            return self.clone();
        }
        let mut ranges = Vec::with_capacity(self.style_ranges.len() + 1);
        for r in &self.style_ranges {
            if r.style != *style || r.end <= start || r.start >= end {
                ranges.push(r.clone());
                continue;
            }
            if r.start < start {
                ranges.push(StyleRange::new(r.style.clone(), r.start, start));
            }
            if r.end > end {
                ranges.push(StyleRange::new(r.style.clone(), end, r.end));
            }
        }
        self.with_style_ranges(ranges)
    }

    /// Reference `entity` over `[start, end)`, displacing any entity ranges
    /// that overlap the target range.
    pub fn apply_entity(&self, entity: EntityKey, start: usize, end: usize) -> Self {
        if start >= end {
            return self.clone();
        }
        let mut ranges = Vec::with_capacity(self.entity_ranges.len() + 1);
        for r in &self.entity_ranges {
            if r.end <= start || r.start >= end {
                ranges.push(r.clone());
                continue;
            }
            if r.start < start {
                ranges.push(EntityRange::new(r.key.clone(), r.start, start));
            }
            if r.end > end {
                ranges.push(EntityRange::new(r.key.clone(), end, r.end));
            }
        }
        ranges.push(EntityRange::new(entity, start, end));
        self.with_entity_ranges(ranges)
    }

    /// Drop every range referencing `entity`.
    pub fn remove_entity(&self, entity: &EntityKey) -> Self {
        let ranges = self
            .entity_ranges
            .iter()
            .filter(|r| r.key != *entity)
            .cloned()
            .collect();
        self.with_entity_ranges(ranges)
    }

    /// Drop entity coverage from `[start, end)` (overlapping ranges are
    /// truncated, covered ranges removed). Offsets are not shifted.
    pub fn clear_entities(&self, start: usize, end: usize) -> Self {
        if start >= end {
            return self.clone();
        }
        let mut ranges = Vec::with_capacity(self.entity_ranges.len());
        for r in &self.entity_ranges {
            if r.end <= start || r.start >= end {
                ranges.push(r.clone());
                continue;
            }
            if r.start < start {
                ranges.push(EntityRange::new(r.key.clone(), r.start, start));
            }
            if r.end > end {
                ranges.push(EntityRange::new(r.key.clone(), end, r.end));
            }
        }
        self.with_entity_ranges(ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> Block {
        Block::new(BlockKey::new("k1"), BlockType::Paragraph, text)
    }

    #[test]
    fn generated_keys_are_unique() {
        let a = BlockKey::generate();
        let b = BlockKey::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn insert_shifts_ranges() {
        let b = block("Hello world").apply_style(InlineStyle::Bold, 6, 11);
        let b = b.insert_text(0, ">> ");
        assert_eq!(b.text(), ">> Hello world");
        assert_eq!(b.style_ranges(), &[StyleRange::new(InlineStyle::Bold, 9, 14)]);
    }

    #[test]
    fn insert_inside_range_extends_it() {
        let b = block("Hello").apply_style(InlineStyle::Bold, 0, 5);
        let b = b.insert_text(2, "xx");
        assert_eq!(b.text(), "Hexxllo");
        assert_eq!(b.style_ranges(), &[StyleRange::new(InlineStyle::Bold, 0, 7)]);
    }

    #[test]
    fn insert_at_range_end_does_not_extend() {
        let b = block("Hello").apply_style(InlineStyle::Bold, 0, 5);
        let b = b.insert_text(5, "!");
        assert_eq!(b.style_ranges(), &[StyleRange::new(InlineStyle::Bold, 0, 5)]);
    }

    #[test]
    fn remove_range_adjusts_overlaps() {
        // "abcdefgh" with bold [2,6); delete [4,8) -> "abcd", bold [2,4).
        let b = block("abcdefgh").apply_style(InlineStyle::Bold, 2, 6);
        let b = b.remove_range(4, 8);
        assert_eq!(b.text(), "abcd");
        assert_eq!(b.style_ranges(), &[StyleRange::new(InlineStyle::Bold, 2, 4)]);
    }

    #[test]
    fn remove_range_drops_covered_ranges() {
        let b = block("abcdef").apply_style(InlineStyle::Italic, 2, 4);
        let b = b.remove_range(1, 5);
        assert_eq!(b.text(), "af");
        assert!(b.style_ranges().is_empty());
    }

    #[test]
    fn remove_range_handles_multibyte_text() {
        let b = block("aéb😀c");
        let b = b.remove_range(1, 4);
        assert_eq!(b.text(), "ac");
    }

    #[test]
    fn split_distributes_ranges() {
        let b = block("Hello world")
            .apply_style(InlineStyle::Bold, 0, 5)
            .apply_style(InlineStyle::Italic, 6, 11);
        let (head, tail) = b.split_at(6, BlockKey::new("k2"));
        assert_eq!(head.text(), "Hello ");
        assert_eq!(tail.text(), "world");
        assert_eq!(head.style_ranges(), &[StyleRange::new(InlineStyle::Bold, 0, 5)]);
        assert_eq!(tail.style_ranges(), &[StyleRange::new(InlineStyle::Italic, 0, 5)]);
        assert_eq!(tail.key(), &BlockKey::new("k2"));
    }

    #[test]
    fn append_shifts_incoming_ranges() {
        let left = block("abc");
        let right = Block::new(BlockKey::new("k2"), BlockType::Paragraph, "def")
            .apply_style(InlineStyle::Bold, 1, 3);
        let joined = left.append(&right);
        assert_eq!(joined.text(), "abcdef");
        assert_eq!(joined.key(), &BlockKey::new("k1"));
        assert_eq!(joined.style_ranges(), &[StyleRange::new(InlineStyle::Bold, 4, 6)]);
    }

    #[test]
    fn same_style_ranges_merge() {
        let b = block("abcdef")
            .apply_style(InlineStyle::Bold, 0, 3)
            .apply_style(InlineStyle::Bold, 3, 6);
        assert_eq!(b.style_ranges(), &[StyleRange::new(InlineStyle::Bold, 0, 6)]);
        assert!(b.has_style_over(&InlineStyle::Bold, 1, 5));
    }

    #[test]
    fn remove_style_splits_covering_range() {
        let b = block("abcdef").apply_style(InlineStyle::Bold, 0, 6);
        let b = b.remove_style(&InlineStyle::Bold, 2, 4);
        assert_eq!(
            b.style_ranges(),
            &[
                StyleRange::new(InlineStyle::Bold, 0, 2),
                StyleRange::new(InlineStyle::Bold, 4, 6),
            ]
        );
        assert!(!b.has_style_over(&InlineStyle::Bold, 0, 6));
    }

    #[test]
    fn apply_entity_displaces_overlap() {
        let b = block("abcdef")
            .apply_entity(EntityKey::new("1"), 0, 6)
            .apply_entity(EntityKey::new("2"), 2, 4);
        assert_eq!(b.entity_at(0), Some(&EntityKey::new("1")));
        assert_eq!(b.entity_at(3), Some(&EntityKey::new("2")));
        assert_eq!(b.entity_at(5), Some(&EntityKey::new("1")));
        assert_eq!(b.entity_ranges().len(), 3);
    }

    #[test]
    fn clear_entities_truncates() {
        let b = block("abcdef").apply_entity(EntityKey::new("1"), 0, 6);
        let b = b.clear_entities(2, 6);
        assert_eq!(b.entity_ranges(), &[EntityRange::new(EntityKey::new("1"), 0, 2)]);
    }
}
