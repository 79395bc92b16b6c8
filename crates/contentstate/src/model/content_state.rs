// Copyright 2026 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The editing-side document model ("contentstate").
//!
//! A document is an ordered list of [`Block`]s plus an entity map. Each block
//! carries flat text annotated with inline style ranges and entity ranges.
//! All offsets and lengths are UTF-16 code units, matching the JavaScript
//! editor that produces and consumes this JSON.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ConverterError;

pub type EntityKey = u32;
pub type EntityData = Map<String, Value>;

pub mod block_type {
    pub const UNSTYLED: &str = "unstyled";
    pub const ATOMIC: &str = "atomic";
    pub const CODE_BLOCK: &str = "code-block";
    pub const ORDERED_LIST_ITEM: &str = "ordered-list-item";
    pub const UNORDERED_LIST_ITEM: &str = "unordered-list-item";
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentState {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub entity_map: BTreeMap<EntityKey, Entity>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub inline_style_ranges: Vec<InlineStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<EntityRange>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: EntityKey,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub mutability: Mutability,
    #[serde(default)]
    pub data: EntityData,
}

/// How the editor treats the text covered by an entity. Passed through
/// untouched by the converter.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutability {
    #[default]
    Mutable,
    Immutable,
    Segmented,
}

impl ContentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize the JSON wire format.
    pub fn from_json(json: &str) -> Result<Self, ConverterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the JSON wire format, indented by four spaces.
    pub fn to_json_pretty(&self) -> Result<String, ConverterError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Add an entity under the next unused key and return that key.
    pub fn add_entity(&mut self, entity: Entity) -> EntityKey {
        let key = self
            .entity_map
            .keys()
            .next_back()
            .map_or(0, |last| last + 1);
        self.entity_map.insert(key, entity);
        key
    }

    /// Check every structural invariant of the model.
    pub fn validate(&self) -> Result<(), ConverterError> {
        self.check_range_bounds()?;
        self.check_entity_references()?;
        for (index, block) in self.blocks.iter().enumerate() {
            block.check_style_ranges(index)?;
        }
        Ok(())
    }

    /// Check that every style and entity range lies within its block's
    /// text.
    pub fn check_range_bounds(&self) -> Result<(), ConverterError> {
        for (index, block) in self.blocks.iter().enumerate() {
            let len = block.text_len();
            let ranges = block
                .inline_style_ranges
                .iter()
                .map(|r| (r.offset, r.length))
                .chain(block.entity_ranges.iter().map(|r| (r.offset, r.length)));
            for (offset, length) in ranges {
                if offset.checked_add(length).map_or(true, |end| end > len) {
                    return Err(ConverterError::RangeOutOfBounds {
                        block: block.label(index),
                        offset,
                        length,
                    });
                }
            }
        }
        Ok(())
    }

    /// Check the invariants the exporter depends on: every entity range
    /// refers to an existing entity, and entity ranges within a block are
    /// disjoint.
    pub fn check_entity_references(&self) -> Result<(), ConverterError> {
        for (index, block) in self.blocks.iter().enumerate() {
            if let Some(range) = block
                .entity_ranges
                .iter()
                .find(|r| !self.entity_map.contains_key(&r.key))
            {
                return Err(ConverterError::MissingEntity {
                    block: block.label(index),
                    key: range.key,
                });
            }
            let spans = block
                .entity_ranges
                .iter()
                .map(|r| (r.offset, r.end()));
            if has_overlap(spans) {
                return Err(ConverterError::OverlappingEntityRanges {
                    block: block.label(index),
                });
            }
        }
        Ok(())
    }

    /// Bring ranges into canonical form: empty ranges are removed,
    /// overlapping or touching ranges of the same style are merged and every
    /// range list is sorted by offset.
    pub fn normalize(&mut self) {
        for block in &mut self.blocks {
            block.normalize_ranges();
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

impl Block {
    pub fn new(block_type: &str, depth: usize) -> Self {
        Self {
            key: String::new(),
            block_type: block_type.to_owned(),
            depth,
            text: String::new(),
            inline_style_ranges: Vec::new(),
            entity_ranges: Vec::new(),
            data: Map::new(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    pub fn with_style(mut self, offset: usize, length: usize, style: &str) -> Self {
        self.inline_style_ranges.push(InlineStyleRange {
            offset,
            length,
            style: style.to_owned(),
        });
        self
    }

    pub fn with_entity(
        mut self,
        offset: usize,
        length: usize,
        key: EntityKey,
    ) -> Self {
        self.entity_ranges.push(EntityRange {
            offset,
            length,
            key,
        });
        self
    }

    /// Length of the text in UTF-16 code units.
    pub fn text_len(&self) -> usize {
        utf16_len(&self.text)
    }

    fn label(&self, index: usize) -> String {
        if self.key.is_empty() {
            format!("#{index}")
        } else {
            self.key.clone()
        }
    }

    fn check_style_ranges(&self, index: usize) -> Result<(), ConverterError> {
        let mut by_style: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();
        for range in &self.inline_style_ranges {
            by_style
                .entry(range.style.as_str())
                .or_default()
                .push((range.offset, range.end()));
        }
        for (style, spans) in by_style {
            if has_overlap(spans) {
                return Err(ConverterError::OverlappingStyleRanges {
                    block: self.label(index),
                    style: style.to_owned(),
                });
            }
        }
        Ok(())
    }

    fn normalize_ranges(&mut self) {
        let mut ranges = std::mem::take(&mut self.inline_style_ranges);
        ranges.retain(|r| r.length > 0);
        ranges.sort_by(|a, b| {
            a.style.cmp(&b.style).then(a.offset.cmp(&b.offset))
        });

        let mut merged: Vec<InlineStyleRange> = Vec::new();
        for range in ranges {
            match merged.last_mut() {
                Some(last)
                    if last.style == range.style
                        && range.offset <= last.end() =>
                {
                    let end = last.end().max(range.end());
                    last.length = end - last.offset;
                }
                _ => merged.push(range),
            }
        }
        merged.sort_by(|a, b| {
            a.offset.cmp(&b.offset).then_with(|| a.style.cmp(&b.style))
        });
        self.inline_style_ranges = merged;

        self.entity_ranges.retain(|r| r.length > 0);
        self.entity_ranges.sort_by_key(|r| r.offset);
    }
}

impl InlineStyleRange {
    /// Offset one past the last covered code unit.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }
}

impl EntityRange {
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }
}

impl Entity {
    pub fn new(entity_type: &str, mutability: Mutability) -> Self {
        Self {
            entity_type: entity_type.to_owned(),
            mutability,
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_owned(), value.into());
        self
    }
}

/// Length of `text` in UTF-16 code units.
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Deterministic five character block key derived from the block's position.
pub(crate) fn block_key(index: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = index;
    let mut key = [b'0'; 5];
    for slot in key.iter_mut().rev() {
        *slot = DIGITS[n % 36];
        n /= 36;
    }
    String::from_utf8_lossy(&key).into_owned()
}

/// Whether any two of the given half-open spans share an offset. Empty spans
/// never overlap anything.
fn has_overlap(spans: impl IntoIterator<Item = (usize, usize)>) -> bool {
    let mut spans: Vec<(usize, usize)> =
        spans.into_iter().filter(|(start, end)| end > start).collect();
    spans.sort_unstable();
    spans.windows(2).any(|pair| pair[1].0 < pair[0].1)
}

#[cfg(test)]
mod test {
    use indoc::indoc;

    use super::*;

    fn link_state() -> ContentState {
        let mut state = ContentState::new();
        let key = state.add_entity(
            Entity::new("LINK", Mutability::Mutable)
                .with_data("url", "https://example.com"),
        );
        state.blocks.push(
            Block::new(block_type::UNSTYLED, 0)
                .with_text("a link")
                .with_entity(2, 4, key),
        );
        state
    }

    #[test]
    fn entity_keys_are_allocated_in_order() {
        let mut state = ContentState::new();
        let first = state.add_entity(Entity::new("LINK", Mutability::Mutable));
        let second =
            state.add_entity(Entity::new("IMAGE", Mutability::Immutable));
        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn json_uses_wire_field_names_and_four_space_indent() {
        let mut state = ContentState::new();
        state
            .blocks
            .push(Block::new(block_type::UNSTYLED, 0).with_text("hi"));
        assert_eq!(
            state.to_json_pretty().unwrap(),
            indoc! {r#"
                {
                    "blocks": [
                        {
                            "key": "",
                            "type": "unstyled",
                            "depth": 0,
                            "text": "hi",
                            "inlineStyleRanges": [],
                            "entityRanges": [],
                            "data": {}
                        }
                    ],
                    "entityMap": {}
                }"#}
        );
    }

    #[test]
    fn json_roundtrips_entity_map_with_string_keys() {
        let state = link_state();
        let json = state.to_json_pretty().unwrap();
        assert!(json.contains(r#""0": {"#), "expected string key in {json}");
        assert!(json.contains(r#""mutability": "MUTABLE""#));
        assert_eq!(ContentState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let state = ContentState::from_json(
            r#"{"blocks": [{"type": "unstyled", "text": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(state.blocks[0].depth, 0);
        assert!(state.blocks[0].key.is_empty());
        assert!(state.entity_map.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = ContentState::from_json("{\"blocks\": [").unwrap_err();
        assert!(matches!(err, ConverterError::InvalidJson(_)));
    }

    #[test]
    fn missing_entity_is_reported() {
        let mut state = link_state();
        state.entity_map.clear();
        let err = state.check_entity_references().unwrap_err();
        assert!(matches!(
            err,
            ConverterError::MissingEntity { key: 0, .. }
        ));
    }

    #[test]
    fn overlapping_entities_are_reported() {
        let mut state = link_state();
        state.blocks[0] = state.blocks[0].clone().with_entity(3, 2, 0);
        assert!(matches!(
            state.check_entity_references().unwrap_err(),
            ConverterError::OverlappingEntityRanges { .. }
        ));
    }

    #[test]
    fn adjacent_entities_do_not_overlap() {
        let mut state = link_state();
        state.blocks[0] = state.blocks[0].clone().with_entity(0, 2, 0);
        assert!(state.check_entity_references().is_ok());
    }

    #[test]
    fn ranges_past_the_text_are_reported() {
        let mut state = link_state();
        state.blocks[0] = state.blocks[0].clone().with_style(4, 3, "BOLD");
        assert!(matches!(
            state.validate().unwrap_err(),
            ConverterError::RangeOutOfBounds {
                offset: 4,
                length: 3,
                ..
            }
        ));
    }

    #[test]
    fn overflowing_ranges_are_reported() {
        let mut state = link_state();
        state.blocks[0].entity_ranges[0].offset = usize::MAX;
        assert!(matches!(
            state.check_range_bounds().unwrap_err(),
            ConverterError::RangeOutOfBounds { offset: usize::MAX, .. }
        ));

        let mut state = link_state();
        state.blocks[0] = state.blocks[0].clone().with_style(usize::MAX, 1, "BOLD");
        assert!(matches!(
            state.validate().unwrap_err(),
            ConverterError::RangeOutOfBounds { length: 1, .. }
        ));
    }

    #[test]
    fn range_end_saturates() {
        let range = InlineStyleRange {
            offset: usize::MAX,
            length: 1,
            style: "BOLD".into(),
        };
        assert_eq!(range.end(), usize::MAX);
    }

    #[test]
    fn overlapping_same_style_is_invalid_but_different_styles_are_fine() {
        let mut state = ContentState::new();
        state.blocks.push(
            Block::new(block_type::UNSTYLED, 0)
                .with_text("abcdef")
                .with_style(0, 4, "BOLD")
                .with_style(2, 4, "ITALIC"),
        );
        assert!(state.validate().is_ok());

        state.blocks[0] = state.blocks[0].clone().with_style(3, 2, "BOLD");
        assert!(matches!(
            state.validate().unwrap_err(),
            ConverterError::OverlappingStyleRanges { .. }
        ));
    }

    #[test]
    fn normalize_merges_same_style_and_drops_empty_ranges() {
        let state = ContentState {
            blocks: vec![Block::new(block_type::UNSTYLED, 0)
                .with_text("abcdef")
                .with_style(4, 2, "ITALIC")
                .with_style(2, 2, "BOLD")
                .with_style(0, 3, "BOLD")
                .with_style(5, 0, "CODE")],
            entity_map: BTreeMap::new(),
        }
        .normalized();
        assert_eq!(
            state.blocks[0].inline_style_ranges,
            vec![
                InlineStyleRange {
                    offset: 0,
                    length: 4,
                    style: "BOLD".into()
                },
                InlineStyleRange {
                    offset: 4,
                    length: 2,
                    style: "ITALIC".into()
                },
            ]
        );
    }

    #[test]
    fn text_len_counts_utf16_units() {
        let block = Block::new(block_type::UNSTYLED, 0).with_text("a😀b");
        assert_eq!(block.text_len(), 4);
    }

    #[test]
    fn block_keys_are_five_base36_chars() {
        assert_eq!(block_key(0), "00000");
        assert_eq!(block_key(35), "0000z");
        assert_eq!(block_key(36), "00010");
    }

    #[test]
    fn mutability_string_forms() {
        assert_eq!(Mutability::Immutable.to_string(), "IMMUTABLE");
        assert_eq!(
            "SEGMENTED".parse::<Mutability>().unwrap(),
            Mutability::Segmented
        );
    }
}
