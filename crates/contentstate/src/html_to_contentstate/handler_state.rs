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

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ElementHandler, HtmlRuleset};
use crate::dom::parser::MarkupHandler;
use crate::model::{
    block_key, block_type, Block, ContentState, Entity, EntityKey,
    EntityRange, InlineStyleRange,
};

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\n\x0C\r]+").unwrap());

/// What to do with whitespace at the start of the next text node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LeadingWhitespace {
    /// Drop it: we are at the start of a block or just after a break.
    Strip,
    /// Keep whatever the text starts with.
    Keep,
    /// A space is pending from earlier text and is emitted only if more
    /// content follows in the same block.
    Force,
}

#[derive(Clone, Debug)]
struct BlockFrame {
    block_type: String,
    depth: usize,
    preformatted: bool,
}

#[derive(Clone, Copy, Debug)]
struct CurrentBlock {
    index: usize,
    preformatted: bool,
}

/// A style or entity range waiting for its closing tag. It always closes
/// against the block it was opened in.
#[derive(Debug)]
struct OpenRange<T> {
    block: usize,
    offset: usize,
    value: T,
}

#[derive(Debug)]
enum OpenElement {
    Transparent,
    Block,
    List,
    Style(OpenRange<String>),
    Entity(OpenRange<EntityKey>),
}

/// Per-call parser state. Created fresh for each parse and consumed by
/// [`HandlerState::finish`].
pub(super) struct HandlerState<'a> {
    rules: &'a HtmlRuleset<ElementHandler>,
    contentstate: ContentState,
    current_block: Option<CurrentBlock>,
    block_stack: Vec<BlockFrame>,
    list_item_types: Vec<String>,
    leading_whitespace: LeadingWhitespace,
    open_elements: Vec<OpenElement>,
}

impl<'a> HandlerState<'a> {
    pub(super) fn new(rules: &'a HtmlRuleset<ElementHandler>) -> Self {
        Self {
            rules,
            contentstate: ContentState::new(),
            current_block: None,
            block_stack: Vec::new(),
            list_item_types: Vec::new(),
            leading_whitespace: LeadingWhitespace::Strip,
            open_elements: Vec::new(),
        }
    }

    pub(super) fn finish(self) -> ContentState {
        let contentstate = self.contentstate.normalized();
        if cfg!(feature = "assert-invariants") {
            if let Err(err) = contentstate.validate() {
                panic!("Parsed contentstate breaks an invariant: {err}");
            }
        }
        contentstate
    }

    fn list_depth(&self) -> usize {
        self.list_item_types.len()
    }

    fn start_element(
        &mut self,
        handler: &ElementHandler,
        attrs: &[(String, String)],
    ) -> OpenElement {
        match handler {
            ElementHandler::Block(block_type) => {
                self.push_block(block_type, self.list_depth(), false)
            }
            ElementHandler::PreformattedBlock(block_type) => {
                self.push_block(block_type, self.list_depth(), true)
            }
            ElementHandler::List(item_type) => {
                self.list_item_types.push(item_type.clone());
                OpenElement::List
            }
            ElementHandler::ListItem => {
                let item_type = self
                    .list_item_types
                    .last()
                    .map_or(block_type::UNSTYLED, String::as_str)
                    .to_owned();
                let depth = self.list_depth().saturating_sub(1);
                self.push_block(&item_type, depth, false)
            }
            ElementHandler::InlineStyle(style) => {
                let (block, offset) = self.open_inline();
                OpenElement::Style(OpenRange {
                    block,
                    offset,
                    value: style.clone(),
                })
            }
            ElementHandler::InlineEntity(rule) => {
                let (block, offset) = self.open_inline();
                if self.inside_entity(block) {
                    log::debug!(
                        "Ignoring {} nested inside another entity",
                        rule.entity_type
                    );
                    return OpenElement::Transparent;
                }
                let key =
                    self.contentstate.add_entity(rule.create_entity(attrs));
                OpenElement::Entity(OpenRange {
                    block,
                    offset,
                    value: key,
                })
            }
            ElementHandler::AtomicBlockEntity(rule) => {
                self.add_atomic_block(rule.create_entity(attrs));
                OpenElement::Transparent
            }
            ElementHandler::HorizontalRule => {
                self.add_atomic_block(ElementHandler::horizontal_rule_entity());
                OpenElement::Transparent
            }
            ElementHandler::LineBreak => {
                // Breaks outside any block have nothing to break
                if let Some(current) = self.current_block {
                    self.contentstate.blocks[current.index].text.push('\n');
                    self.leading_whitespace = LeadingWhitespace::Strip;
                }
                OpenElement::Transparent
            }
        }
    }

    fn push_block(
        &mut self,
        block_type: &str,
        depth: usize,
        preformatted: bool,
    ) -> OpenElement {
        let frame = BlockFrame {
            block_type: block_type.to_owned(),
            depth,
            preformatted,
        };
        self.start_block(&frame);
        self.block_stack.push(frame);
        OpenElement::Block
    }

    fn start_block(&mut self, frame: &BlockFrame) -> CurrentBlock {
        let index = self.contentstate.blocks.len();
        let mut block = Block::new(&frame.block_type, frame.depth);
        block.key = block_key(index);
        self.contentstate.blocks.push(block);

        let current = CurrentBlock {
            index,
            preformatted: frame.preformatted,
        };
        self.current_block = Some(current);
        self.leading_whitespace = LeadingWhitespace::Strip;
        current
    }

    /// The block content goes into, creating one if content turns up
    /// between blocks. Such a block continues the innermost open block
    /// element, or is a plain paragraph at the current list depth.
    fn ensure_block(&mut self) -> CurrentBlock {
        if let Some(current) = self.current_block {
            return current;
        }
        let frame = self.block_stack.last().cloned().unwrap_or(BlockFrame {
            block_type: block_type::UNSTYLED.to_owned(),
            depth: self.list_depth(),
            preformatted: false,
        });
        self.start_block(&frame)
    }

    /// Prepare the current block for an inline style or entity and return
    /// where its range starts. A pending space goes before the range.
    fn open_inline(&mut self) -> (usize, usize) {
        let current = self.ensure_block();
        let block = &mut self.contentstate.blocks[current.index];
        if self.leading_whitespace == LeadingWhitespace::Force {
            block.text.push(' ');
            self.leading_whitespace = LeadingWhitespace::Strip;
        }
        (current.index, block.text_len())
    }

    fn inside_entity(&self, block: usize) -> bool {
        self.open_elements.iter().any(
            |element| matches!(element, OpenElement::Entity(range) if range.block == block),
        )
    }

    fn add_atomic_block(&mut self, entity: Entity) {
        let key = self.contentstate.add_entity(entity);
        let index = self.contentstate.blocks.len();
        let mut block = Block::new(block_type::ATOMIC, 0)
            .with_text(" ")
            .with_entity(0, 1, key);
        block.key = block_key(index);
        self.contentstate.blocks.push(block);

        self.current_block = None;
        self.leading_whitespace = LeadingWhitespace::Strip;
    }

    fn range_length<T>(&self, range: &OpenRange<T>) -> usize {
        self.contentstate.blocks[range.block]
            .text_len()
            .saturating_sub(range.offset)
    }
}

impl MarkupHandler for HandlerState<'_> {
    fn handle_starttag(&mut self, name: &str, attrs: &[(String, String)]) {
        let rules = self.rules;
        let element = match rules.match_element(name, attrs) {
            Some(handler) => self.start_element(handler, attrs),
            None => OpenElement::Transparent,
        };
        self.open_elements.push(element);
    }

    fn handle_data(&mut self, content: &str) {
        let collapsed = WHITESPACE_REGEX.replace_all(content, " ");
        let whitespace_only = collapsed.trim_matches(' ').is_empty();

        if self.current_block.is_none() && whitespace_only {
            return;
        }
        let current = self.ensure_block();
        let block = &mut self.contentstate.blocks[current.index];

        if current.preformatted {
            block.text.push_str(content);
            return;
        }

        if whitespace_only {
            // Only significant if more content follows in this block
            if self.leading_whitespace != LeadingWhitespace::Strip {
                self.leading_whitespace = LeadingWhitespace::Force;
            }
            return;
        }

        let mut text: &str = &collapsed;
        match self.leading_whitespace {
            LeadingWhitespace::Strip => text = text.trim_start_matches(' '),
            LeadingWhitespace::Force if !text.starts_with(' ') => {
                block.text.push(' ');
            }
            _ => {}
        }
        let trimmed = text.trim_end_matches(' ');
        block.text.push_str(trimmed);
        self.leading_whitespace = if trimmed.len() < text.len() {
            LeadingWhitespace::Force
        } else {
            LeadingWhitespace::Keep
        };
    }

    fn handle_endtag(&mut self, _name: &str) {
        match self.open_elements.pop() {
            Some(OpenElement::Block) => {
                self.block_stack.pop();
                self.current_block = None;
                self.leading_whitespace = LeadingWhitespace::Strip;
            }
            Some(OpenElement::List) => {
                self.list_item_types.pop();
            }
            Some(OpenElement::Style(range)) => {
                let length = self.range_length(&range);
                self.contentstate.blocks[range.block]
                    .inline_style_ranges
                    .push(InlineStyleRange {
                        offset: range.offset,
                        length,
                        style: range.value,
                    });
            }
            Some(OpenElement::Entity(range)) => {
                let length = self.range_length(&range);
                self.contentstate.blocks[range.block]
                    .entity_ranges
                    .push(EntityRange {
                        offset: range.offset,
                        length,
                        key: range.value,
                    });
            }
            Some(OpenElement::Transparent) | None => {}
        }
    }
}
