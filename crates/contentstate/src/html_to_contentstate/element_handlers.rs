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

use std::fmt;
use std::sync::Arc;

use crate::model::{Entity, EntityData, Mutability};

pub const HORIZONTAL_RULE: &str = "HORIZONTAL_RULE";

/// Read-only view of an element's attributes, handed to entity rules.
#[derive(Clone, Copy, Debug)]
pub struct ElementAttributes<'a>(pub(crate) &'a [(String, String)]);

impl<'a> ElementAttributes<'a> {
    pub fn new(attrs: &'a [(String, String)]) -> Self {
        Self(attrs)
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.0
            .iter()
            .find(|(n, _v)| n == name)
            .map(|(_n, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

pub type AttributeExtractor =
    Arc<dyn Fn(ElementAttributes<'_>) -> EntityData + Send + Sync>;

/// How to turn an element into an entity.
#[derive(Clone)]
pub struct EntityRule {
    pub entity_type: String,
    pub mutability: Mutability,
    pub data: AttributeExtractor,
}

impl EntityRule {
    pub fn new<F>(entity_type: &str, mutability: Mutability, data: F) -> Self
    where
        F: Fn(ElementAttributes<'_>) -> EntityData + Send + Sync + 'static,
    {
        Self {
            entity_type: entity_type.to_owned(),
            mutability,
            data: Arc::new(data),
        }
    }

    pub(crate) fn create_entity(&self, attrs: &[(String, String)]) -> Entity {
        Entity {
            entity_type: self.entity_type.clone(),
            mutability: self.mutability,
            data: (self.data)(ElementAttributes(attrs)),
        }
    }
}

impl fmt::Debug for EntityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRule")
            .field("entity_type", &self.entity_type)
            .field("mutability", &self.mutability)
            .finish_non_exhaustive()
    }
}

/// What an element means for the document model.
#[derive(Clone, Debug)]
pub enum ElementHandler {
    /// Starts a new block of the given type at the current list depth.
    Block(String),
    /// Like `Block`, but text inside is kept verbatim.
    PreformattedBlock(String),
    /// A list container; its items become blocks of the given type.
    List(String),
    /// A list item, typed and indented by the enclosing list.
    ListItem,
    InlineStyle(String),
    InlineEntity(EntityRule),
    /// An entity standing alone in its own `atomic` block (images, embeds).
    AtomicBlockEntity(EntityRule),
    HorizontalRule,
    LineBreak,
}

impl ElementHandler {
    pub fn block(block_type: &str) -> Self {
        Self::Block(block_type.to_owned())
    }

    pub fn preformatted_block(block_type: &str) -> Self {
        Self::PreformattedBlock(block_type.to_owned())
    }

    pub fn list(list_item_type: &str) -> Self {
        Self::List(list_item_type.to_owned())
    }

    pub fn inline_style(style: &str) -> Self {
        Self::InlineStyle(style.to_owned())
    }

    pub(crate) fn horizontal_rule_entity() -> Entity {
        Entity::new(HORIZONTAL_RULE, Mutability::Immutable)
    }
}
