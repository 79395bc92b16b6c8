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

use std::collections::BTreeMap;

use widestring::{U16Str, U16String};

use super::config::ExporterConfig;
use super::rules::{BlockProps, BlockRule, EntityProps, StyleProps};
use super::wrapper_state::WrapperState;
use crate::dom::{HtmlElement, HtmlNode, ToHtml};
use crate::model::{Block, ContentState, Entity, EntityKey};
use crate::ConverterError;

/// Renders a [`ContentState`] to HTML with one merged set of rules.
#[derive(Clone, Copy, Debug)]
pub struct HtmlExporter<'c> {
    config: &'c ExporterConfig,
}

impl<'c> HtmlExporter<'c> {
    pub fn new(config: &'c ExporterConfig) -> Self {
        Self { config }
    }

    /// Render every block in order.
    ///
    /// Blocks and entities without a rule are handled by the fallback rules
    /// and never fail the render. A range outside its block's text, or a
    /// dangling or overlapping entity range, does.
    pub fn render(&self, state: &ContentState) -> Result<String, ConverterError> {
        state.check_range_bounds()?;
        state.check_entity_references()?;

        let mut wrappers = WrapperState::new();
        for block in &state.blocks {
            let Some(rule) = self.config.block_rule(&block.block_type) else {
                log::error!(
                    "Missing config for \"{}\". Deleting block.",
                    block.block_type
                );
                continue;
            };
            let children = self.render_inline(block, &state.entity_map);
            match rule {
                BlockRule::Element { tag, attrs } => wrappers.push_block(
                    HtmlElement::new(tag.as_str())
                        .attrs(attrs)
                        .child(children)
                        .into(),
                ),
                BlockRule::Wrapped {
                    tag,
                    wrapper,
                    wrapper_attrs,
                } => wrappers.push_wrapped(
                    block.depth,
                    wrapper,
                    wrapper_attrs,
                    HtmlElement::new(tag.as_str()).child(children).into(),
                ),
                BlockRule::Component(component) => {
                    let node = component(&BlockProps { block, children });
                    if !node.is_empty() {
                        wrappers.push_block(node);
                    }
                }
            }
        }
        Ok(wrappers.finish().to_html())
    }

    /// Split the block text at every range boundary and render the runs.
    /// Every run goes through the composite decorators. Runs inside one
    /// entity range are styled together and then handed to the entity's
    /// decorator.
    fn render_inline(
        &self,
        block: &Block,
        entity_map: &BTreeMap<EntityKey, Entity>,
    ) -> HtmlNode {
        let units = U16String::from_str(&block.text);
        let len = units.len();
        let clamp = |n: usize| n.min(len);

        let mut bounds = vec![0, len];
        for range in &block.inline_style_ranges {
            bounds.push(clamp(range.offset));
            bounds.push(clamp(range.end()));
        }
        for range in &block.entity_ranges {
            bounds.push(clamp(range.offset));
            bounds.push(clamp(range.end()));
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut output = Vec::new();
        let mut styles = StyleStack::new(self.config, block);
        let mut current_entity: Option<usize> = None;

        for pair in bounds.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let text =
                U16Str::from_slice(&units.as_slice()[start..end]).to_string_lossy();

            let entity = block.entity_ranges.iter().position(|r| {
                r.offset <= start && end <= r.end()
            });
            if entity != current_entity {
                let nodes = std::mem::replace(
                    &mut styles,
                    StyleStack::new(self.config, block),
                )
                .finish();
                output.push(self.wrap_entity(block, entity_map, current_entity, nodes));
                current_entity = entity;
            }

            let mut active: Vec<_> = block
                .inline_style_ranges
                .iter()
                .filter(|r| r.offset <= start && end <= r.end())
                .collect();
            active.sort_by(|a, b| {
                a.offset
                    .cmp(&b.offset)
                    .then_with(|| b.end().cmp(&a.end()))
                    .then_with(|| a.style.cmp(&b.style))
            });
            let mut names: Vec<&str> = Vec::with_capacity(active.len());
            for range in active {
                if !names.contains(&range.style.as_str()) {
                    names.push(&range.style);
                }
            }

            styles.push_run(&names, self.decorate(text, block));
        }

        let nodes = styles.finish();
        output.push(self.wrap_entity(block, entity_map, current_entity, nodes));
        HtmlNode::fragment(output)
    }

    fn wrap_entity(
        &self,
        block: &Block,
        entity_map: &BTreeMap<EntityKey, Entity>,
        range: Option<usize>,
        nodes: Vec<HtmlNode>,
    ) -> HtmlNode {
        let children = HtmlNode::fragment(nodes);
        let entity = range
            .and_then(|index| block.entity_ranges.get(index))
            .and_then(|range| entity_map.get(&range.key));
        let Some(entity) = entity else {
            return children;
        };
        match self.config.entity_decorator(&entity.entity_type) {
            Some(decorator) => decorator(&EntityProps {
                entity,
                block,
                children,
            }),
            None => children,
        }
    }

    fn decorate(&self, text: String, block: &Block) -> Vec<HtmlNode> {
        let mut nodes = vec![HtmlNode::Text(text)];
        for decorator in &self.config.rules().composite_decorators {
            nodes = nodes
                .into_iter()
                .flat_map(|node| match node {
                    HtmlNode::Text(text) => decorator.decorate(&text, block),
                    other => vec![other],
                })
                .collect();
        }
        nodes
    }
}

/// Open style elements for the runs of one entity group. Consecutive runs
/// sharing a prefix of styles share the open elements of that prefix.
struct StyleStack<'a> {
    config: &'a ExporterConfig,
    block: &'a Block,
    frames: Vec<(&'a str, Vec<HtmlNode>)>,
    root: Vec<HtmlNode>,
}

impl<'a> StyleStack<'a> {
    fn new(config: &'a ExporterConfig, block: &'a Block) -> Self {
        Self {
            config,
            block,
            frames: Vec::new(),
            root: Vec::new(),
        }
    }

    fn push_run(&mut self, styles: &[&'a str], leaves: Vec<HtmlNode>) {
        let common = self
            .frames
            .iter()
            .zip(styles)
            .take_while(|((open, _), style)| open == *style)
            .count();
        while self.frames.len() > common {
            self.close_top();
        }
        for style in &styles[common..] {
            self.frames.push((*style, Vec::new()));
        }
        self.children_mut().extend(leaves);
    }

    fn finish(mut self) -> Vec<HtmlNode> {
        while !self.frames.is_empty() {
            self.close_top();
        }
        self.root
    }

    fn children_mut(&mut self) -> &mut Vec<HtmlNode> {
        match self.frames.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn close_top(&mut self) {
        let Some((style, children)) = self.frames.pop() else {
            return;
        };
        let children = HtmlNode::fragment(children);
        let node = match self.config.style_rule(style) {
            Some(rule) => rule.render(&StyleProps {
                style,
                block: self.block,
                children,
            }),
            None => {
                log::warn!("Missing config for style \"{style}\". Rendering unstyled");
                children
            }
        };
        self.children_mut().push(node);
    }
}
