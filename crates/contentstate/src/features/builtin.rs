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

//! The rich text features available out of the box.

use serde_json::Value;

use super::registry::{ContentstateRule, FeatureRegistry};
use crate::dom::{HtmlElement, HtmlNode};
use crate::exporter::{BlockRule, EntityProps, RuleBundle, StyleRule};
use crate::html_to_contentstate::{
    ElementAttributes, ElementHandler, EntityRule, HORIZONTAL_RULE,
};
use crate::model::{block_type, EntityData, Mutability};

/// Features enabled when a converter is created without a feature list.
pub const DEFAULT_FEATURES: &[&str] = &[
    "h2",
    "h3",
    "h4",
    "bold",
    "italic",
    "ol",
    "ul",
    "hr",
    "link",
    "document-link",
    "image",
    "embed",
];

const HEADINGS: &[(&str, &str)] = &[
    ("h1", "header-one"),
    ("h2", "header-two"),
    ("h3", "header-three"),
    ("h4", "header-four"),
    ("h5", "header-five"),
    ("h6", "header-six"),
];

/// `LINK` entities point at a page when they carry an `id`, and at a URL
/// otherwise.
pub fn link_entity(props: &EntityProps<'_>) -> HtmlNode {
    let mut a = HtmlElement::new("a");
    match props.data_str("id") {
        Some(id) => a = a.attr("linktype", "page").attr("id", id),
        None => a = a.attr("href", props.data_str("url").unwrap_or_default()),
    }
    a.child(props.children.clone()).into()
}

pub fn document_link_entity(props: &EntityProps<'_>) -> HtmlNode {
    HtmlElement::new("a")
        .attr("linktype", "document")
        .attr("id", props.data_str("id").unwrap_or_default())
        .child(props.children.clone())
        .into()
}

pub fn image_entity(props: &EntityProps<'_>) -> HtmlNode {
    let mut embed = HtmlElement::new("embed").attr("embedtype", "image");
    for name in ["id", "format", "alt"] {
        if let Some(value) = props.data_str(name) {
            embed = embed.attr(name, value);
        }
    }
    embed.into()
}

pub fn media_embed_entity(props: &EntityProps<'_>) -> HtmlNode {
    HtmlElement::new("embed")
        .attr("embedtype", "media")
        .attr("url", props.data_str("url").unwrap_or_default())
        .into()
}

pub fn horizontal_rule_entity(_props: &EntityProps<'_>) -> HtmlNode {
    HtmlElement::new("hr").into()
}

/// Object ids are stored as numbers when they look like one.
fn id_value(id: &str) -> Value {
    match id.parse::<u64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(id),
    }
}

fn external_link_data(attrs: ElementAttributes<'_>) -> EntityData {
    let mut data = EntityData::new();
    data.insert("url".into(), Value::from(attrs.get("href").unwrap_or_default()));
    data
}

fn object_id_data(attrs: ElementAttributes<'_>) -> EntityData {
    let mut data = EntityData::new();
    if let Some(id) = attrs.get("id") {
        data.insert("id".into(), id_value(id));
    }
    data
}

fn image_data(attrs: ElementAttributes<'_>) -> EntityData {
    let mut data = object_id_data(attrs);
    for name in ["format", "alt"] {
        if let Some(value) = attrs.get(name) {
            data.insert(name.into(), Value::from(value));
        }
    }
    data
}

fn media_embed_data(attrs: ElementAttributes<'_>) -> EntityData {
    let mut data = EntityData::new();
    data.insert("url".into(), Value::from(attrs.get("url").unwrap_or_default()));
    data
}

fn block_feature(tag: &str, block_type: &str) -> ContentstateRule {
    ContentstateRule::new()
        .parse(tag, ElementHandler::block(block_type))
        .to_database(
            RuleBundle::new().block(block_type, BlockRule::element(tag)),
        )
}

fn style_feature(style: &str, tags: &[&str]) -> ContentstateRule {
    let mut rule = ContentstateRule::new().to_database(
        RuleBundle::new().style(style, StyleRule::element(tags[0])),
    );
    for tag in tags {
        rule = rule.parse(tag, ElementHandler::inline_style(style));
    }
    rule
}

fn list_feature(tag: &str, item_type: &str) -> ContentstateRule {
    ContentstateRule::new()
        .parse(tag, ElementHandler::list(item_type))
        .parse("li", ElementHandler::ListItem)
        .to_database(
            RuleBundle::new().block(item_type, BlockRule::wrapped("li", tag)),
        )
}

fn link_feature() -> ContentstateRule {
    let external =
        EntityRule::new("LINK", Mutability::Mutable, external_link_data);
    let page = EntityRule::new("LINK", Mutability::Mutable, object_id_data);
    ContentstateRule::new()
        .parse("a[href]", ElementHandler::InlineEntity(external))
        .parse(r#"a[linktype="page"]"#, ElementHandler::InlineEntity(page))
        .to_database(RuleBundle::new().entity("LINK", link_entity))
}

fn document_link_feature() -> ContentstateRule {
    let document =
        EntityRule::new("DOCUMENT", Mutability::Mutable, object_id_data);
    ContentstateRule::new()
        .parse(
            r#"a[linktype="document"]"#,
            ElementHandler::InlineEntity(document),
        )
        .to_database(RuleBundle::new().entity("DOCUMENT", document_link_entity))
}

fn image_feature() -> ContentstateRule {
    let image = EntityRule::new("IMAGE", Mutability::Immutable, image_data);
    ContentstateRule::new()
        .parse(
            r#"embed[embedtype="image"]"#,
            ElementHandler::AtomicBlockEntity(image),
        )
        .to_database(RuleBundle::new().entity("IMAGE", image_entity))
}

fn embed_feature() -> ContentstateRule {
    let embed =
        EntityRule::new("EMBED", Mutability::Immutable, media_embed_data);
    ContentstateRule::new()
        .parse(
            r#"embed[embedtype="media"]"#,
            ElementHandler::AtomicBlockEntity(embed),
        )
        .to_database(RuleBundle::new().entity("EMBED", media_embed_entity))
}

fn hr_feature() -> ContentstateRule {
    ContentstateRule::new()
        .parse("hr", ElementHandler::HorizontalRule)
        .to_database(
            RuleBundle::new().entity(HORIZONTAL_RULE, horizontal_rule_entity),
        )
}

pub(crate) fn register_builtin_features(registry: &mut FeatureRegistry) {
    for (tag, block_type) in HEADINGS {
        registry.register_converter_rule(tag, block_feature(tag, block_type));
    }
    registry.register_converter_rule("bold", style_feature("BOLD", &["b", "strong"]));
    registry.register_converter_rule("italic", style_feature("ITALIC", &["i", "em"]));
    registry.register_converter_rule(
        "ol",
        list_feature("ol", block_type::ORDERED_LIST_ITEM),
    );
    registry.register_converter_rule(
        "ul",
        list_feature("ul", block_type::UNORDERED_LIST_ITEM),
    );
    registry.register_converter_rule("link", link_feature());
    registry.register_converter_rule("document-link", document_link_feature());
    registry.register_converter_rule("image", image_feature());
    registry.register_converter_rule("embed", embed_feature());
    registry.register_converter_rule("hr", hr_feature());
    registry.register_converter_rule("code", style_feature("CODE", &["code"]));
    registry.register_converter_rule(
        "superscript",
        style_feature("SUPERSCRIPT", &["sup"]),
    );
    registry.register_converter_rule(
        "subscript",
        style_feature("SUBSCRIPT", &["sub"]),
    );
    registry.register_converter_rule(
        "strikethrough",
        style_feature("STRIKETHROUGH", &["s"]),
    );
    registry.register_converter_rule(
        "blockquote",
        block_feature("blockquote", "blockquote"),
    );
    registry.register_converter_rule(
        "code-block",
        ContentstateRule::new()
            .parse("pre", ElementHandler::preformatted_block(block_type::CODE_BLOCK))
            .to_database(
                RuleBundle::new()
                    .block(block_type::CODE_BLOCK, BlockRule::element("pre")),
            ),
    );

    for feature in DEFAULT_FEATURES {
        registry.register_default_feature(feature);
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::dom::ToHtml;
    use crate::model::{Block, Entity};

    fn render(
        decorator: fn(&EntityProps<'_>) -> HtmlNode,
        entity: &Entity,
    ) -> String {
        let block = Block::new(block_type::UNSTYLED, 0);
        decorator(&EntityProps {
            entity,
            block: &block,
            children: HtmlNode::text("text"),
        })
        .to_html()
    }

    #[test]
    fn page_links_use_the_id() {
        let entity = Entity::new("LINK", Mutability::Mutable).with_data("id", "1");
        assert_eq!(
            render(link_entity, &entity),
            r#"<a linktype="page" id="1">text</a>"#
        );
    }

    #[test]
    fn external_links_use_the_url() {
        let entity = Entity::new("LINK", Mutability::Mutable)
            .with_data("url", "https://example.com");
        assert_eq!(
            render(link_entity, &entity),
            r#"<a href="https://example.com">text</a>"#
        );
    }

    #[test]
    fn null_id_counts_as_missing() {
        let entity = Entity::new("LINK", Mutability::Mutable)
            .with_data("id", json!(null))
            .with_data("url", "/x?a=1&b=2");
        assert_eq!(
            render(link_entity, &entity),
            r#"<a href="/x?a=1&amp;b=2">text</a>"#
        );
    }

    #[test]
    fn images_render_as_embeds() {
        let entity = Entity::new("IMAGE", Mutability::Immutable)
            .with_data("id", 5)
            .with_data("format", "left")
            .with_data("alt", "A \"cat\"");
        assert_eq!(
            render(image_entity, &entity),
            r#"<embed embedtype="image" id="5" format="left" alt="A &quot;cat&quot;"/>"#
        );
    }

    #[test]
    fn numeric_ids_are_numbers() {
        assert_eq!(id_value("42"), json!(42));
        assert_eq!(id_value("abc"), json!("abc"));
    }

    #[test]
    fn builtins_are_registered_in_order() {
        let registry = FeatureRegistry::with_defaults();
        let features = registry.list_features();
        assert_eq!(&features[..6], ["h1", "h2", "h3", "h4", "h5", "h6"]);
        assert_eq!(features.last().map(String::as_str), Some("code-block"));
        assert_eq!(registry.default_features(), DEFAULT_FEATURES);
    }
}
