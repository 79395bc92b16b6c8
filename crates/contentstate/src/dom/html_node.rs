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

//! A minimal output tree built by exporter rules and serialized to HTML.

/// Elements that never have content and are written as `<tag/>`.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "source", "track", "wbr",
];

pub trait ToHtml {
    fn fmt_html(&self, buf: &mut String);

    fn to_html(&self) -> String {
        let mut buf = String::new();
        self.fmt_html(&mut buf);
        buf
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtmlNode {
    Element(HtmlElement),
    Text(String),
    /// A sequence of nodes with no wrapper of its own.
    Fragment(Vec<HtmlNode>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtmlElement {
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl HtmlNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn fragment(children: Vec<HtmlNode>) -> Self {
        Self::Fragment(children)
    }

    pub fn empty() -> Self {
        Self::Fragment(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Element(_) => false,
            Self::Text(text) => text.is_empty(),
            Self::Fragment(children) => children.iter().all(Self::is_empty),
        }
    }
}

impl HtmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attrs(mut self, attrs: &[(String, String)]) -> Self {
        self.attrs.extend_from_slice(attrs);
        self
    }

    pub fn child(mut self, child: HtmlNode) -> Self {
        self.push_child(child);
        self
    }

    /// Append a child, flattening fragments.
    pub fn push_child(&mut self, child: HtmlNode) {
        match child {
            HtmlNode::Fragment(children) => {
                for c in children {
                    self.push_child(c);
                }
            }
            other => self.children.push(other),
        }
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

impl From<HtmlElement> for HtmlNode {
    fn from(element: HtmlElement) -> Self {
        Self::Element(element)
    }
}

impl ToHtml for HtmlNode {
    fn fmt_html(&self, buf: &mut String) {
        match self {
            Self::Element(element) => element.fmt_html(buf),
            Self::Text(text) => buf.push_str(&html_escape::encode_text(text)),
            Self::Fragment(children) => {
                for child in children {
                    child.fmt_html(buf);
                }
            }
        }
    }
}

impl ToHtml for HtmlElement {
    fn fmt_html(&self, buf: &mut String) {
        buf.push('<');
        buf.push_str(&self.tag);
        for (name, value) in &self.attrs {
            buf.push(' ');
            buf.push_str(name);
            buf.push_str("=\"");
            buf.push_str(&html_escape::encode_double_quoted_attribute(value));
            buf.push('"');
        }
        if self.is_void() {
            buf.push_str("/>");
            return;
        }
        buf.push('>');
        for child in &self.children {
            child.fmt_html(buf);
        }
        buf.push_str("</");
        buf.push_str(&self.tag);
        buf.push('>');
    }
}

impl ToHtml for [HtmlNode] {
    fn fmt_html(&self, buf: &mut String) {
        for node in self {
            node.fmt_html(buf);
        }
    }
}
