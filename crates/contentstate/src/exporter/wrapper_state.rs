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

use crate::dom::{HtmlElement, HtmlNode};

#[derive(Debug)]
struct OpenWrapper {
    depth: usize,
    element: HtmlElement,
}

impl OpenWrapper {
    fn is_same(&self, wrapper: &str, attrs: &[(String, String)]) -> bool {
        self.element.tag == wrapper && self.element.attrs == attrs
    }
}

/// Collects rendered blocks into the output, grouping consecutive wrapped
/// blocks into shared wrapper elements.
///
/// A wrapped block deeper than the open wrapper starts a nested wrapper
/// that ends up inside the last element of the shallower one, so list
/// items of depth 1 form a list inside the preceding depth 0 item.
#[derive(Debug, Default)]
pub(crate) struct WrapperState {
    output: Vec<HtmlNode>,
    stack: Vec<OpenWrapper>,
}

impl WrapperState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_block(&mut self, node: HtmlNode) {
        self.close_wrappers_above(None);
        self.output.push(node);
    }

    pub(crate) fn push_wrapped(
        &mut self,
        depth: usize,
        wrapper: &str,
        wrapper_attrs: &[(String, String)],
        node: HtmlNode,
    ) {
        self.close_wrappers_above(Some(depth));

        let reuse = self.stack.last().is_some_and(|top| {
            top.depth == depth && top.is_same(wrapper, wrapper_attrs)
        });
        if !reuse {
            if self.stack.last().is_some_and(|top| top.depth == depth) {
                self.close_top();
            }
            self.stack.push(OpenWrapper {
                depth,
                element: HtmlElement::new(wrapper).attrs(wrapper_attrs),
            });
        }
        if let Some(top) = self.stack.last_mut() {
            top.element.push_child(node);
        }
    }

    pub(crate) fn finish(mut self) -> Vec<HtmlNode> {
        self.close_wrappers_above(None);
        self.output
    }

    /// Close open wrappers deeper than `depth`, or all of them.
    fn close_wrappers_above(&mut self, depth: Option<usize>) {
        while self
            .stack
            .last()
            .is_some_and(|top| depth.map_or(true, |d| top.depth > d))
        {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        let Some(closed) = self.stack.pop() else {
            return;
        };
        let node = HtmlNode::Element(closed.element);
        match self.stack.last_mut() {
            Some(parent) => match parent.element.children.last_mut() {
                Some(HtmlNode::Element(last)) => last.push_child(node),
                _ => parent.element.push_child(node),
            },
            None => self.output.push(node),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::ToHtml;

    fn li(text: &str) -> HtmlNode {
        HtmlElement::new("li").child(HtmlNode::text(text)).into()
    }

    fn p(text: &str) -> HtmlNode {
        HtmlElement::new("p").child(HtmlNode::text(text)).into()
    }

    #[test]
    fn consecutive_items_share_a_wrapper() {
        let mut state = WrapperState::new();
        state.push_wrapped(0, "ul", &[], li("a"));
        state.push_wrapped(0, "ul", &[], li("b"));
        state.push_block(p("c"));
        assert_eq!(
            state.finish().to_html(),
            "<ul><li>a</li><li>b</li></ul><p>c</p>"
        );
    }

    #[test]
    fn deeper_items_nest_in_the_last_item() {
        let mut state = WrapperState::new();
        state.push_wrapped(0, "ul", &[], li("a"));
        state.push_wrapped(1, "ol", &[], li("a.1"));
        state.push_wrapped(2, "ol", &[], li("a.1.1"));
        state.push_wrapped(0, "ul", &[], li("b"));
        assert_eq!(
            state.finish().to_html(),
            "<ul><li>a<ol><li>a.1<ol><li>a.1.1</li></ol></li></ol></li><li>b</li></ul>"
        );
    }

    #[test]
    fn different_wrappers_at_one_depth_are_split() {
        let mut state = WrapperState::new();
        state.push_wrapped(0, "ul", &[], li("a"));
        state.push_wrapped(0, "ol", &[], li("b"));
        assert_eq!(
            state.finish().to_html(),
            "<ul><li>a</li></ul><ol><li>b</li></ol>"
        );
    }

    #[test]
    fn wrapper_attributes_are_kept() {
        let mut state = WrapperState::new();
        let attrs = vec![("class".to_owned(), "steps".to_owned())];
        state.push_wrapped(0, "ol", &attrs, li("a"));
        assert_eq!(
            state.finish().to_html(),
            r#"<ol class="steps"><li>a</li></ol>"#
        );
    }
}
