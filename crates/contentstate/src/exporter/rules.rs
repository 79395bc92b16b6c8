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

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::dom::{HtmlElement, HtmlNode};
use crate::model::{Block, Entity};

pub type BlockComponent =
    Arc<dyn Fn(&BlockProps<'_>) -> HtmlNode + Send + Sync>;
pub type StyleComponent =
    Arc<dyn Fn(&StyleProps<'_>) -> HtmlNode + Send + Sync>;
pub type EntityDecorator =
    Arc<dyn Fn(&EntityProps<'_>) -> HtmlNode + Send + Sync>;
pub type DecoratorComponent =
    Arc<dyn Fn(&DecoratorProps<'_>) -> HtmlNode + Send + Sync>;

pub struct BlockProps<'a> {
    pub block: &'a Block,
    /// The block's rendered inline content.
    pub children: HtmlNode,
}

pub struct StyleProps<'a> {
    pub style: &'a str,
    pub block: &'a Block,
    pub children: HtmlNode,
}

pub struct EntityProps<'a> {
    pub entity: &'a Entity,
    pub block: &'a Block,
    /// The styled text covered by the entity range.
    pub children: HtmlNode,
}

impl<'a> EntityProps<'a> {
    pub fn entity_type(&self) -> &'a str {
        &self.entity.entity_type
    }

    pub fn data(&self, key: &str) -> Option<&'a Value> {
        self.entity.data.get(key).filter(|value| !value.is_null())
    }

    /// A data field rendered as an attribute value. Strings are used as is,
    /// numbers and booleans in their JSON form.
    pub fn data_str(&self, key: &str) -> Option<String> {
        match self.data(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

pub struct DecoratorProps<'a> {
    /// The text matched by the decorator's pattern.
    pub matched: &'a str,
    pub block: &'a Block,
}

/// How a block type is rendered.
#[derive(Clone)]
pub enum BlockRule {
    /// The block's content inside a single element.
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    /// As `Element`, with consecutive blocks sharing one wrapper element
    /// (list items in a list).
    Wrapped {
        tag: String,
        wrapper: String,
        wrapper_attrs: Vec<(String, String)>,
    },
    Component(BlockComponent),
}

impl BlockRule {
    pub fn element(tag: &str) -> Self {
        Self::Element {
            tag: tag.to_owned(),
            attrs: Vec::new(),
        }
    }

    pub fn wrapped(tag: &str, wrapper: &str) -> Self {
        Self::Wrapped {
            tag: tag.to_owned(),
            wrapper: wrapper.to_owned(),
            wrapper_attrs: Vec::new(),
        }
    }

    pub fn component<F>(f: F) -> Self
    where
        F: Fn(&BlockProps<'_>) -> HtmlNode + Send + Sync + 'static,
    {
        Self::Component(Arc::new(f))
    }
}

impl fmt::Debug for BlockRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { tag, attrs } => f
                .debug_struct("Element")
                .field("tag", tag)
                .field("attrs", attrs)
                .finish(),
            Self::Wrapped {
                tag,
                wrapper,
                wrapper_attrs,
            } => f
                .debug_struct("Wrapped")
                .field("tag", tag)
                .field("wrapper", wrapper)
                .field("wrapper_attrs", wrapper_attrs)
                .finish(),
            Self::Component(_) => f.write_str("Component(..)"),
        }
    }
}

#[derive(Clone)]
pub enum StyleRule {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Component(StyleComponent),
}

impl StyleRule {
    pub fn element(tag: &str) -> Self {
        Self::Element {
            tag: tag.to_owned(),
            attrs: Vec::new(),
        }
    }

    pub fn component<F>(f: F) -> Self
    where
        F: Fn(&StyleProps<'_>) -> HtmlNode + Send + Sync + 'static,
    {
        Self::Component(Arc::new(f))
    }

    pub(crate) fn render(&self, props: &StyleProps<'_>) -> HtmlNode {
        match self {
            Self::Element { tag, attrs } => HtmlElement::new(tag.as_str())
                .attrs(attrs)
                .child(props.children.clone())
                .into(),
            Self::Component(component) => component(props),
        }
    }
}

impl fmt::Debug for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { tag, attrs } => f
                .debug_struct("Element")
                .field("tag", tag)
                .field("attrs", attrs)
                .finish(),
            Self::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// A pattern applied to the plain text of a block after it has been split
/// into style and entity runs. Every match is replaced by the component's
/// output.
#[derive(Clone)]
pub struct CompositeDecorator {
    pub pattern: Regex,
    pub component: DecoratorComponent,
}

impl CompositeDecorator {
    pub fn new<F>(pattern: Regex, component: F) -> Self
    where
        F: Fn(&DecoratorProps<'_>) -> HtmlNode + Send + Sync + 'static,
    {
        Self {
            pattern,
            component: Arc::new(component),
        }
    }

    /// Split `text` around matches of the pattern.
    pub(crate) fn decorate(&self, text: &str, block: &Block) -> Vec<HtmlNode> {
        let mut nodes = Vec::new();
        let mut last = 0;
        for found in self.pattern.find_iter(text) {
            if found.start() > last {
                nodes.push(HtmlNode::text(&text[last..found.start()]));
            }
            nodes.push((self.component)(&DecoratorProps {
                matched: found.as_str(),
                block,
            }));
            last = found.end();
        }
        if last < text.len() {
            nodes.push(HtmlNode::text(&text[last..]));
        }
        nodes
    }
}

impl fmt::Debug for CompositeDecorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDecorator")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// The partial rendering tables one feature contributes for one output
/// context.
#[derive(Clone, Default)]
pub struct RuleBundle {
    pub block_map: HashMap<String, BlockRule>,
    pub style_map: HashMap<String, StyleRule>,
    pub entity_decorators: HashMap<String, EntityDecorator>,
    pub composite_decorators: Vec<CompositeDecorator>,
}

impl RuleBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, block_type: &str, rule: BlockRule) -> Self {
        self.block_map.insert(block_type.to_owned(), rule);
        self
    }

    pub fn style(mut self, style: &str, rule: StyleRule) -> Self {
        self.style_map.insert(style.to_owned(), rule);
        self
    }

    pub fn entity<F>(mut self, entity_type: &str, decorator: F) -> Self
    where
        F: Fn(&EntityProps<'_>) -> HtmlNode + Send + Sync + 'static,
    {
        self.entity_decorators
            .insert(entity_type.to_owned(), Arc::new(decorator));
        self
    }

    pub fn composite_decorator(mut self, decorator: CompositeDecorator) -> Self {
        self.composite_decorators.push(decorator);
        self
    }
}

impl fmt::Debug for RuleBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks: Vec<&String> = self.block_map.keys().collect();
        let mut styles: Vec<&String> = self.style_map.keys().collect();
        let mut entities: Vec<&String> =
            self.entity_decorators.keys().collect();
        blocks.sort();
        styles.sort();
        entities.sort();
        f.debug_struct("RuleBundle")
            .field("block_map", &blocks)
            .field("style_map", &styles)
            .field("entity_decorators", &entities)
            .field("composite_decorators", &self.composite_decorators)
            .finish()
    }
}
