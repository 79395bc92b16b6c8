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

use super::{PaDom, PaDomCreator, PaDomHandle, PaDomNode};

/// Receiver of the markup event stream produced by [`parse_events`].
///
/// Start and end events are always balanced and properly nested, even when
/// the source HTML is not.
pub(crate) trait MarkupHandler {
    fn handle_starttag(&mut self, name: &str, attrs: &[(String, String)]);
    fn handle_data(&mut self, content: &str);
    fn handle_endtag(&mut self, name: &str);
}

/// Parse an HTML fragment and feed it to `handler` as open-tag, text and
/// close-tag events in document order.
pub(crate) fn parse_events<H: MarkupHandler>(html: &str, handler: &mut H) {
    let padom = PaDomCreator::parse(html);
    for err in padom.parse_errors() {
        log::debug!("Recovered from HTML parse error: {err}");
    }
    walk(&padom, handler);
}

enum Step<'a> {
    Enter(&'a PaDomHandle),
    Leave(&'a str),
}

fn walk<H: MarkupHandler>(padom: &PaDom, handler: &mut H) {
    let mut stack: Vec<Step<'_>> = Vec::new();
    push_children(padom, padom.document_handle(), &mut stack);

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(handle) => match padom.get_node(handle) {
                PaDomNode::Container(c) if c.is_root_html() => {
                    push_children(padom, handle, &mut stack);
                }
                PaDomNode::Container(c) => {
                    handler.handle_starttag(c.tag(), &c.attrs);
                    stack.push(Step::Leave(c.tag()));
                    push_children(padom, handle, &mut stack);
                }
                PaDomNode::Document(_) => {
                    push_children(padom, handle, &mut stack);
                }
                PaDomNode::Text(text) => handler.handle_data(&text.content),
                PaDomNode::Ignored => {}
            },
            Step::Leave(tag) => handler.handle_endtag(tag),
        }
    }
}

fn push_children<'a>(
    padom: &'a PaDom,
    handle: &PaDomHandle,
    stack: &mut Vec<Step<'a>>,
) {
    for child in padom.children(handle).iter().rev() {
        stack.push(Step::Enter(child));
    }
}
