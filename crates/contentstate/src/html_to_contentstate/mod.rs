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

//! Builds a [`ContentState`] from database HTML.
//!
//! The HTML is turned into a stream of open/text/close events and every
//! element is looked up in a selector ruleset contributed by the enabled
//! features. Elements without a rule are transparent: their children are
//! processed as if the element was not there.

mod element_handlers;
mod handler_state;
mod html_ruleset;

pub use element_handlers::{
    AttributeExtractor, ElementAttributes, ElementHandler, EntityRule,
    HORIZONTAL_RULE,
};
pub use html_ruleset::HtmlRuleset;

use handler_state::HandlerState;

use crate::dom::parser::parse_events;
use crate::model::ContentState;

#[derive(Clone, Debug, Default)]
pub struct HtmlToContentStateHandler {
    element_rules: HtmlRuleset<ElementHandler>,
}

impl HtmlToContentStateHandler {
    pub fn new(element_rules: HtmlRuleset<ElementHandler>) -> Self {
        Self { element_rules }
    }

    pub fn element_rules(&self) -> &HtmlRuleset<ElementHandler> {
        &self.element_rules
    }

    /// Parse an HTML fragment. Parsing always succeeds: malformed markup is
    /// repaired by the HTML parser and unknown elements are skipped over.
    pub fn parse(&self, html: &str) -> ContentState {
        let mut state = HandlerState::new(&self.element_rules);
        parse_events(html, &mut state);
        state.finish()
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use speculoos::prelude::*;

    use super::*;
    use crate::model::{
        block_type, Block, Entity, EntityData, EntityRange, InlineStyleRange,
        Mutability,
    };

    fn link_rule() -> EntityRule {
        EntityRule::new("LINK", Mutability::Mutable, |attrs| {
            let mut data = EntityData::new();
            if let Some(href) = attrs.get("href") {
                data.insert("url".into(), json!(href));
            }
            if let Some(id) = attrs.get("id") {
                data.insert("id".into(), json!(id));
            }
            data
        })
    }

    fn image_rule() -> EntityRule {
        EntityRule::new("IMAGE", Mutability::Immutable, |attrs| {
            let mut data = EntityData::new();
            data.insert("id".into(), json!(attrs.get("id")));
            data
        })
    }

    fn handler() -> HtmlToContentStateHandler {
        let mut rules = HtmlRuleset::new();
        rules
            .add_rules([
                ("p", ElementHandler::block(block_type::UNSTYLED)),
                ("h2", ElementHandler::block("header-two")),
                ("pre", ElementHandler::preformatted_block(block_type::CODE_BLOCK)),
                ("ul", ElementHandler::list(block_type::UNORDERED_LIST_ITEM)),
                ("ol", ElementHandler::list(block_type::ORDERED_LIST_ITEM)),
                ("li", ElementHandler::ListItem),
                ("b", ElementHandler::inline_style("BOLD")),
                ("i", ElementHandler::inline_style("ITALIC")),
                ("a[href]", ElementHandler::InlineEntity(link_rule())),
                (
                    r#"a[linktype="page"]"#,
                    ElementHandler::InlineEntity(link_rule()),
                ),
                (
                    r#"embed[embedtype="image"]"#,
                    ElementHandler::AtomicBlockEntity(image_rule()),
                ),
                ("hr", ElementHandler::HorizontalRule),
                ("br", ElementHandler::LineBreak),
            ])
            .unwrap();
        HtmlToContentStateHandler::new(rules)
    }

    fn parse(html: &str) -> ContentState {
        handler().parse(html)
    }

    fn texts(state: &ContentState) -> Vec<(&str, usize, &str)> {
        state
            .blocks
            .iter()
            .map(|b| (b.block_type.as_str(), b.depth, b.text.as_str()))
            .collect()
    }

    fn style(offset: usize, length: usize, style: &str) -> InlineStyleRange {
        InlineStyleRange {
            offset,
            length,
            style: style.to_owned(),
        }
    }

    #[test]
    fn paragraphs_become_unstyled_blocks() {
        let state = parse("<p>Hello</p><h2>World</h2>");
        assert_that!(texts(&state)).is_equal_to(vec![
            ("unstyled", 0, "Hello"),
            ("header-two", 0, "World"),
        ]);
        assert_that!(state.blocks[0].key.as_str()).is_equal_to("00000");
        assert_that!(state.blocks[1].key.as_str()).is_equal_to("00001");
    }

    #[test]
    fn inline_styles_record_utf16_ranges() {
        let state = parse("<p>😀 <b>bold <i>both</i></b> plain</p>");
        let block = &state.blocks[0];
        assert_that!(block.text.as_str()).is_equal_to("😀 bold both plain");
        assert_that!(block.inline_style_ranges).is_equal_to(vec![
            style(3, 9, "BOLD"),
            style(8, 4, "ITALIC"),
        ]);
    }

    #[test]
    fn repeated_styles_are_merged() {
        let state = parse("<p><b>a<b>b</b></b><b>c</b></p>");
        assert_that!(state.blocks[0].inline_style_ranges)
            .is_equal_to(vec![style(0, 3, "BOLD")]);
    }

    #[test]
    fn long_documents_parse_every_block() {
        let html = "<p>x</p>".repeat(20_000);
        let state = parse(&html);
        assert_that!(state.blocks.len()).is_equal_to(20_000);
        assert_that!(state.blocks[19_999].key.as_str()).is_equal_to("00ffj");
    }

    #[test]
    fn whitespace_runs_collapse_and_block_edges_are_trimmed() {
        let state = parse("<p>\n   Hello \t\n  <b> big </b>\n world  </p>");
        let block = &state.blocks[0];
        assert_that!(block.text.as_str()).is_equal_to("Hello big world");
        assert_that!(block.inline_style_ranges)
            .is_equal_to(vec![style(6, 3, "BOLD")]);
    }

    #[test]
    fn whitespace_between_blocks_is_ignored() {
        let state = parse("<p>a</p>\n\n  <p>b</p>\n");
        assert_that!(texts(&state))
            .is_equal_to(vec![("unstyled", 0, "a"), ("unstyled", 0, "b")]);
    }

    #[test]
    fn space_between_inline_elements_is_kept() {
        let state = parse("<p><b>a</b> <i>b</i></p>");
        let block = &state.blocks[0];
        assert_that!(block.text.as_str()).is_equal_to("a b");
        assert_that!(block.inline_style_ranges).is_equal_to(vec![
            style(0, 1, "BOLD"),
            style(2, 1, "ITALIC"),
        ]);
    }

    #[test]
    fn preformatted_text_is_verbatim() {
        let state = parse("<pre>fn main() {\n    x  <b>y</b>\n}</pre>");
        let block = &state.blocks[0];
        assert_that!(block.block_type.as_str()).is_equal_to("code-block");
        assert_that!(block.text.as_str()).is_equal_to("fn main() {\n    x  y\n}");
        assert_that!(block.inline_style_ranges)
            .is_equal_to(vec![style(19, 1, "BOLD")]);
    }

    #[test]
    fn line_breaks_become_newlines() {
        let state = parse("<p>one<br/>\n two</p>");
        assert_that!(state.blocks[0].text.as_str()).is_equal_to("one\ntwo");
    }

    #[test]
    fn line_breaks_at_top_level_are_ignored() {
        let state = parse("<br/><p>a</p>");
        assert_that!(texts(&state)).is_equal_to(vec![("unstyled", 0, "a")]);
    }

    #[test]
    fn loose_text_gets_a_paragraph() {
        let state = parse("loose <b>text</b><p>para</p>tail");
        assert_that!(texts(&state)).is_equal_to(vec![
            ("unstyled", 0, "loose text"),
            ("unstyled", 0, "para"),
            ("unstyled", 0, "tail"),
        ]);
        assert_that!(state.blocks[0].inline_style_ranges)
            .is_equal_to(vec![style(6, 4, "BOLD")]);
    }

    #[test]
    fn nested_lists_set_type_and_depth() {
        let state = parse(
            "<ul><li>a<ol><li>a.1</li><li>a.2</li></ol>more a</li><li>b</li></ul>",
        );
        assert_that!(texts(&state)).is_equal_to(vec![
            ("unordered-list-item", 0, "a"),
            ("ordered-list-item", 1, "a.1"),
            ("ordered-list-item", 1, "a.2"),
            ("unordered-list-item", 0, "more a"),
            ("unordered-list-item", 0, "b"),
        ]);
    }

    #[test]
    fn list_item_outside_a_list_is_unstyled() {
        let state = parse("<li>stray</li>");
        assert_that!(texts(&state)).is_equal_to(vec![("unstyled", 0, "stray")]);
    }

    #[test]
    fn links_become_entities() {
        let state = parse(
            r#"<p>see <a href="https://example.com">this</a> and <a linktype="page" id="3">that</a></p>"#,
        );
        let block = &state.blocks[0];
        assert_that!(block.text.as_str()).is_equal_to("see this and that");
        assert_that!(block.entity_ranges).is_equal_to(vec![
            EntityRange {
                offset: 4,
                length: 4,
                key: 0,
            },
            EntityRange {
                offset: 13,
                length: 4,
                key: 1,
            },
        ]);
        assert_that!(state.entity_map[&0]).is_equal_to(
            Entity::new("LINK", Mutability::Mutable)
                .with_data("url", "https://example.com"),
        );
        assert_that!(state.entity_map[&1].data["id"]).is_equal_to(json!("3"));
    }

    #[test]
    fn styles_inside_links_stay_inside() {
        let state = parse(r#"<p><a href="x">a <b>b</b></a></p>"#);
        let block = &state.blocks[0];
        assert_that!(block.entity_ranges[0].length).is_equal_to(3);
        assert_that!(block.inline_style_ranges)
            .is_equal_to(vec![style(2, 1, "BOLD")]);
    }

    #[test]
    fn unmapped_anchor_is_transparent() {
        let state = parse(r#"<p><a name="anchor">text</a></p>"#);
        assert_that!(state.blocks[0].text.as_str()).is_equal_to("text");
        assert!(state.blocks[0].entity_ranges.is_empty());
        assert!(state.entity_map.is_empty());
    }

    #[test]
    fn unknown_tags_are_transparent() {
        let state = parse("<div><p>a <span class=\"x\">b</span></p></div>");
        assert_that!(texts(&state)).is_equal_to(vec![("unstyled", 0, "a b")]);
    }

    #[test]
    fn images_get_their_own_atomic_block() {
        let state = parse(
            r#"<p>before<embed embedtype="image" id="12"/>after</p>"#,
        );
        assert_that!(texts(&state)).is_equal_to(vec![
            ("unstyled", 0, "before"),
            ("atomic", 0, " "),
            ("unstyled", 0, "after"),
        ]);
        assert_that!(state.blocks[1].entity_ranges).is_equal_to(vec![
            EntityRange {
                offset: 0,
                length: 1,
                key: 0,
            },
        ]);
        assert_that!(state.entity_map[&0].entity_type.as_str())
            .is_equal_to("IMAGE");
    }

    #[test]
    fn horizontal_rules_are_atomic() {
        let state = parse("<p>a</p><hr/><p>b</p>");
        assert_that!(texts(&state)).is_equal_to(vec![
            ("unstyled", 0, "a"),
            ("atomic", 0, " "),
            ("unstyled", 0, "b"),
        ]);
        assert_that!(state.entity_map[&0]).is_equal_to(Entity::new(
            HORIZONTAL_RULE,
            Mutability::Immutable,
        ));
    }

    #[test]
    fn ranges_close_against_their_own_block() {
        let state = parse(r#"<p><b>x<embed embedtype="image" id="1"/>y</b></p>"#);
        assert_that!(texts(&state)).is_equal_to(vec![
            ("unstyled", 0, "x"),
            ("atomic", 0, " "),
            ("unstyled", 0, "y"),
        ]);
        assert_that!(state.blocks[0].inline_style_ranges)
            .is_equal_to(vec![style(0, 1, "BOLD")]);
        assert!(state.blocks[1].inline_style_ranges.is_empty());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn nested_links_keep_the_outer_entity() {
        let state = parse(r#"<p><a href="a">x<a href="b">y</a></a></p>"#);
        let block = &state.blocks[0];
        assert!(state.validate().is_ok());
        assert!(block.entity_ranges.len() <= 2);
        assert_that!(block.text.as_str()).is_equal_to("xy");
    }

    #[test]
    fn empty_input_gives_empty_state() {
        assert_that!(parse("")).is_equal_to(ContentState::new());
        assert_that!(parse("  \n ")).is_equal_to(ContentState::new());
    }

    #[test]
    fn empty_paragraph_is_kept() {
        let state = parse("<p></p>");
        assert_that!(state.blocks)
            .is_equal_to(vec![{
                let mut block = Block::new(block_type::UNSTYLED, 0);
                block.key = "00000".into();
                block
            }]);
    }
}
