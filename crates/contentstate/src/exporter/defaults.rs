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

//! The rules every exporter starts from, before any feature is merged in.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::{
    BlockProps, BlockRule, CompositeDecorator, DecoratorProps, EntityProps,
    RuleBundle,
};
use crate::dom::{HtmlElement, HtmlNode};
use crate::model::block_type;

/// Block map key of the rule used for block types nothing else handles.
pub const FALLBACK_BLOCK: &str = "fallback";
/// Entity decorator key of the rule used for unhandled entity types.
pub const FALLBACK_ENTITY: &str = "FALLBACK";
/// Optional style map key of the rule used for unhandled styles.
pub const FALLBACK_STYLE: &str = "FALLBACK";

static NEWLINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("\n").unwrap());

/// Render a block as its content alone, with no element of its own.
pub fn render_children(props: &BlockProps<'_>) -> HtmlNode {
    props.children.clone()
}

pub fn block_fallback(props: &BlockProps<'_>) -> HtmlNode {
    log::error!(
        "Missing config for \"{}\". Deleting block.",
        props.block.block_type
    );
    HtmlNode::empty()
}

pub fn entity_fallback(props: &EntityProps<'_>) -> HtmlNode {
    log::warn!(
        "Missing config for \"{}\". Deleting entity",
        props.entity.entity_type
    );
    props.children.clone()
}

/// Line breaks become `<br/>`, except in code blocks where they are kept
/// as text.
pub fn br(props: &DecoratorProps<'_>) -> HtmlNode {
    if props.block.block_type == block_type::CODE_BLOCK {
        HtmlNode::text(props.matched)
    } else {
        HtmlElement::new("br").into()
    }
}

pub fn br_decorator() -> CompositeDecorator {
    CompositeDecorator::new(NEWLINE_REGEX.clone(), br)
}

pub fn default_rules() -> RuleBundle {
    RuleBundle::new()
        .block(block_type::UNSTYLED, BlockRule::element("p"))
        .block(block_type::ATOMIC, BlockRule::component(render_children))
        .block(FALLBACK_BLOCK, BlockRule::component(block_fallback))
        .entity(FALLBACK_ENTITY, entity_fallback)
        .composite_decorator(br_decorator())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::ToHtml;
    use crate::model::Block;

    #[test]
    fn br_keeps_newlines_in_code_blocks() {
        let code = Block::new(block_type::CODE_BLOCK, 0);
        let para = Block::new(block_type::UNSTYLED, 0);
        let decorator = br_decorator();
        assert_eq!(decorator.decorate("a\nb", &code).to_html(), "a\nb");
        assert_eq!(decorator.decorate("a\nb", &para).to_html(), "a<br/>b");
    }

    #[test]
    fn block_fallback_renders_nothing() {
        let block = Block::new("mystery", 0).with_text("gone");
        let node = block_fallback(&BlockProps {
            block: &block,
            children: HtmlNode::text("gone"),
        });
        assert!(node.is_empty());
    }

    #[test]
    fn defaults_cover_the_sentinels() {
        let rules = default_rules();
        assert!(rules.block_map.contains_key(FALLBACK_BLOCK));
        assert!(rules.block_map.contains_key(block_type::UNSTYLED));
        assert!(rules.block_map.contains_key(block_type::ATOMIC));
        assert!(rules.entity_decorators.contains_key(FALLBACK_ENTITY));
        assert!(rules.style_map.is_empty());
        assert_eq!(rules.composite_decorators.len(), 1);
    }
}
