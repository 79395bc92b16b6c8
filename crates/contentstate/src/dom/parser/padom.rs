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

use html5ever::tree_builder::{ElementFlags, NodeOrText};
use html5ever::{Attribute, QualName};

use super::{paqual_name, PaNodeContainer};

/// Index of a node inside a [`PaDom`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PaDomHandle(pub(crate) usize);

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PaNodeText {
    pub(crate) content: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PaDomNode {
    Container(PaNodeContainer),
    Document(PaNodeContainer),
    Text(PaNodeText),
    /// Comments, processing instructions: kept so handles stay valid, never
    /// walked.
    Ignored,
}

/// Parse-time DOM. All nodes live in one list and parents refer to their
/// children by handle. Nodes detached during tree building stay in the list
/// as garbage and are simply never reached from the document.
///
/// `parents[i]` is the parent of `nodes[i]` and is kept in step with every
/// children list.
#[derive(Clone, Debug)]
pub(crate) struct PaDom {
    nodes: Vec<PaDomNode>,
    parents: Vec<Option<PaDomHandle>>,
    document_handle: PaDomHandle,
    parse_errors: Vec<String>,
    anonymous_name: QualName,
}

impl Default for PaDom {
    fn default() -> Self {
        Self::new()
    }
}

impl PaDom {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![PaDomNode::Document(PaNodeContainer {
                name: paqual_name(""),
                attrs: Vec::new(),
                children: Vec::new(),
            })],
            parents: vec![None],
            document_handle: PaDomHandle(0),
            parse_errors: Vec::new(),
            anonymous_name: paqual_name(""),
        }
    }

    pub(crate) fn document_handle(&self) -> &PaDomHandle {
        &self.document_handle
    }

    pub(crate) fn get_node(&self, handle: &PaDomHandle) -> &PaDomNode {
        &self.nodes[handle.0]
    }

    pub(crate) fn get_mut_node(&mut self, handle: &PaDomHandle) -> &mut PaDomNode {
        &mut self.nodes[handle.0]
    }

    pub(crate) fn parse_errors(&self) -> &[String] {
        &self.parse_errors
    }

    pub(crate) fn add_parse_error(&mut self, msg: String) {
        self.parse_errors.push(msg);
    }

    pub(crate) fn add_node(&mut self, node: PaDomNode) -> PaDomHandle {
        self.nodes.push(node);
        self.parents.push(None);
        PaDomHandle(self.nodes.len() - 1)
    }

    pub(crate) fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> PaDomHandle {
        self.add_node(PaDomNode::Container(PaNodeContainer {
            name,
            attrs: attrs
                .iter()
                .map(|attr| {
                    (
                        attr.name.local.as_ref().to_owned(),
                        attr.value.as_ref().to_owned(),
                    )
                })
                .collect(),
            children: Vec::new(),
        }))
    }

    /// Element name of `handle`. Non-element nodes get an empty name.
    pub(crate) fn name(&self, handle: &PaDomHandle) -> &QualName {
        match self.get_node(handle) {
            PaDomNode::Container(c) | PaDomNode::Document(c) => &c.name,
            PaDomNode::Text(_) | PaDomNode::Ignored => &self.anonymous_name,
        }
    }

    pub(crate) fn children(&self, handle: &PaDomHandle) -> &[PaDomHandle] {
        match self.get_node(handle) {
            PaDomNode::Container(c) | PaDomNode::Document(c) => &c.children,
            PaDomNode::Text(_) | PaDomNode::Ignored => &[],
        }
    }

    fn children_mut(
        &mut self,
        handle: &PaDomHandle,
    ) -> Option<&mut Vec<PaDomHandle>> {
        match self.get_mut_node(handle) {
            PaDomNode::Container(c) | PaDomNode::Document(c) => {
                Some(&mut c.children)
            }
            PaDomNode::Text(_) | PaDomNode::Ignored => None,
        }
    }

    pub(crate) fn parent_of(&self, child: &PaDomHandle) -> Option<PaDomHandle> {
        self.parents.get(child.0).cloned().flatten()
    }

    /// Remove `child` from its parent, if it has one.
    pub(crate) fn detach(&mut self, child: &PaDomHandle) {
        let Some(parent) = self.parents[child.0].take() else {
            return;
        };
        if let Some(children) = self.children_mut(&parent) {
            children.retain(|c| c != child);
        }
    }

    fn push_child(&mut self, parent: &PaDomHandle, child: PaDomHandle) {
        if let Some(children) = self.children_mut(parent) {
            children.push(child.clone());
            self.parents[child.0] = Some(parent.clone());
        }
    }

    /// Append a node or text to `parent`. Text is merged into a trailing
    /// text child.
    pub(crate) fn append(
        &mut self,
        parent: &PaDomHandle,
        child: NodeOrText<PaDomHandle>,
    ) {
        match child {
            NodeOrText::AppendNode(node) => {
                self.detach(&node);
                self.push_child(parent, node);
            }
            NodeOrText::AppendText(tendril) => {
                if let PaDomNode::Text(text) = self.get_mut_node(parent) {
                    text.content += tendril.as_ref();
                    return;
                }
                let last_text = self
                    .children(parent)
                    .last()
                    .filter(|h| matches!(self.get_node(h), PaDomNode::Text(_)))
                    .cloned();
                match last_text {
                    Some(handle) => {
                        if let PaDomNode::Text(text) = self.get_mut_node(&handle)
                        {
                            text.content += tendril.as_ref();
                        }
                    }
                    None => {
                        let handle = self.add_node(PaDomNode::Text(PaNodeText {
                            content: tendril.as_ref().to_owned(),
                        }));
                        self.push_child(parent, handle);
                    }
                }
            }
        }
    }

    /// Insert a node or text immediately before `sibling`.
    pub(crate) fn insert_before(
        &mut self,
        sibling: &PaDomHandle,
        new_node: NodeOrText<PaDomHandle>,
    ) {
        let Some(parent) = self.parent_of(sibling) else {
            return;
        };
        let new_handle = match new_node {
            NodeOrText::AppendNode(node) => {
                self.detach(&node);
                node
            }
            NodeOrText::AppendText(tendril) => {
                let index = self.index_in_parent(&parent, sibling);
                let previous = index
                    .and_then(|i| i.checked_sub(1))
                    .map(|i| self.children(&parent)[i].clone());
                if let Some(previous) = previous {
                    if let PaDomNode::Text(text) = self.get_mut_node(&previous) {
                        text.content += tendril.as_ref();
                        return;
                    }
                }
                self.add_node(PaDomNode::Text(PaNodeText {
                    content: tendril.as_ref().to_owned(),
                }))
            }
        };
        if let Some(index) = self.index_in_parent(&parent, sibling) {
            if let Some(children) = self.children_mut(&parent) {
                children.insert(index, new_handle.clone());
                self.parents[new_handle.0] = Some(parent);
            }
        }
    }

    /// Move all children of `node` to the end of `new_parent`.
    pub(crate) fn reparent_children(
        &mut self,
        node: &PaDomHandle,
        new_parent: &PaDomHandle,
    ) {
        let moved = self
            .children_mut(node)
            .map(std::mem::take)
            .unwrap_or_default();
        for child in &moved {
            self.parents[child.0] = None;
        }
        for child in moved {
            self.push_child(new_parent, child);
        }
    }

    fn index_in_parent(
        &self,
        parent: &PaDomHandle,
        child: &PaDomHandle,
    ) -> Option<usize> {
        self.children(parent).iter().position(|c| c == child)
    }
}

#[cfg(test)]
mod test {
    use html5ever::tendril::StrTendril;

    use super::*;

    fn element(dom: &mut PaDom, name: &str) -> PaDomHandle {
        dom.create_element(paqual_name(name), Vec::new(), ElementFlags::default())
    }

    fn text(content: &str) -> NodeOrText<PaDomHandle> {
        NodeOrText::AppendText(StrTendril::from(content))
    }

    #[test]
    fn appended_nodes_know_their_parent() {
        let mut dom = PaDom::new();
        let root = dom.document_handle().clone();
        let p = element(&mut dom, "p");
        dom.append(&root, NodeOrText::AppendNode(p.clone()));
        dom.append(&p, text("hi"));

        assert_eq!(dom.parent_of(&p), Some(root.clone()));
        let hi = dom.children(&p)[0].clone();
        assert_eq!(dom.parent_of(&hi), Some(p));
        assert_eq!(dom.parent_of(&root), None);
    }

    #[test]
    fn appending_elsewhere_moves_the_node() {
        let mut dom = PaDom::new();
        let root = dom.document_handle().clone();
        let a = element(&mut dom, "div");
        let b = element(&mut dom, "div");
        let p = element(&mut dom, "p");
        dom.append(&root, NodeOrText::AppendNode(a.clone()));
        dom.append(&root, NodeOrText::AppendNode(b.clone()));
        dom.append(&a, NodeOrText::AppendNode(p.clone()));
        dom.append(&b, NodeOrText::AppendNode(p.clone()));

        assert!(dom.children(&a).is_empty());
        assert_eq!(dom.children(&b), [p.clone()]);
        assert_eq!(dom.parent_of(&p), Some(b));
    }

    #[test]
    fn insert_before_and_reparent_update_parents() {
        let mut dom = PaDom::new();
        let root = dom.document_handle().clone();
        let old = element(&mut dom, "div");
        let new = element(&mut dom, "div");
        let i = element(&mut dom, "i");
        let b = element(&mut dom, "b");
        dom.append(&root, NodeOrText::AppendNode(old.clone()));
        dom.append(&root, NodeOrText::AppendNode(new.clone()));
        dom.append(&old, NodeOrText::AppendNode(i.clone()));
        dom.insert_before(&i, NodeOrText::AppendNode(b.clone()));
        assert_eq!(dom.children(&old), [b.clone(), i.clone()]);
        assert_eq!(dom.parent_of(&b), Some(old.clone()));

        dom.reparent_children(&old, &new);
        assert!(dom.children(&old).is_empty());
        assert_eq!(dom.children(&new), [b.clone(), i.clone()]);
        assert_eq!(dom.parent_of(&b), Some(new.clone()));
        assert_eq!(dom.parent_of(&i), Some(new));
    }

    #[test]
    fn detached_nodes_have_no_parent() {
        let mut dom = PaDom::new();
        let root = dom.document_handle().clone();
        let p = element(&mut dom, "p");
        dom.append(&root, NodeOrText::AppendNode(p.clone()));
        dom.detach(&p);
        assert!(dom.children(&root).is_empty());
        assert_eq!(dom.parent_of(&p), None);
    }
}
