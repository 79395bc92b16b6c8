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

use std::borrow::Cow;
use std::cell::{Ref, RefCell};

use html5ever::interface::NextParserState;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{parse_fragment, Attribute, QualName};

use super::{paqual_name, PaDom, PaDomHandle, PaDomNode};

/// html5ever tree sink that builds a [`PaDom`].
///
/// html5ever recovers from every malformed input, so parsing never fails:
/// the errors it reports are collected on the resulting dom for logging.
pub(crate) struct PaDomCreator {
    dom: RefCell<PaDom>,
}

impl PaDomCreator {
    pub(crate) fn parse(html: &str) -> PaDom {
        parse_fragment(
            PaDomCreator::default(),
            Default::default(),
            paqual_name("body"),
            vec![],
        )
        .from_utf8()
        .one(html.as_bytes())
    }
}

impl Default for PaDomCreator {
    fn default() -> Self {
        Self {
            dom: RefCell::new(PaDom::new()),
        }
    }
}

impl TreeSink for PaDomCreator {
    type Handle = PaDomHandle;
    type Output = PaDom;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        self.dom.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.dom.borrow_mut().add_parse_error(String::from(msg));
    }

    fn get_document(&self) -> Self::Handle {
        self.dom.borrow().document_handle().clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.dom.borrow(), |dom| dom.name(target))
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        flags: ElementFlags,
    ) -> Self::Handle {
        self.dom.borrow_mut().create_element(name, attrs, flags)
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.dom.borrow_mut().add_node(PaDomNode::Ignored)
    }

    fn create_pi(
        &self,
        _target: StrTendril,
        _data: StrTendril,
    ) -> Self::Handle {
        self.dom.borrow_mut().add_node(PaDomNode::Ignored)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        self.dom.borrow_mut().append(parent, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let mut dom = self.dom.borrow_mut();
        if dom.parent_of(element).is_some() {
            dom.insert_before(element, child);
        } else {
            dom.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Fragments carry no doctype
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &self,
        sibling: &Self::Handle,
        new_node: NodeOrText<Self::Handle>,
    ) {
        self.dom.borrow_mut().insert_before(sibling, new_node);
    }

    fn add_attrs_if_missing(
        &self,
        target: &Self::Handle,
        attrs: Vec<Attribute>,
    ) {
        let mut dom = self.dom.borrow_mut();
        if let PaDomNode::Container(node) = dom.get_mut_node(target) {
            let to_add: Vec<(String, String)> = attrs
                .iter()
                .filter_map(|attr| {
                    let attr_name = attr.name.local.as_ref();
                    if node.attrs.iter().any(|(name, _)| name == attr_name) {
                        None
                    } else {
                        Some((
                            attr_name.to_owned(),
                            attr.value.as_ref().to_owned(),
                        ))
                    }
                })
                .collect();
            node.attrs.extend(to_add);
        }
    }

    fn associate_with_form(
        &self,
        _target: &Self::Handle,
        _form: &Self::Handle,
        _nodes: (&Self::Handle, Option<&Self::Handle>),
    ) {
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().detach(target);
    }

    fn reparent_children(
        &self,
        node: &Self::Handle,
        new_parent: &Self::Handle,
    ) {
        self.dom.borrow_mut().reparent_children(node, new_parent);
    }

    fn is_mathml_annotation_xml_integration_point(
        &self,
        _handle: &Self::Handle,
    ) -> bool {
        false
    }

    fn set_current_line(&self, _line_number: u64) {}

    fn complete_script(&self, _node: &Self::Handle) -> NextParserState {
        NextParserState::Continue
    }

    fn allow_declarative_shadow_roots(
        &self,
        _intended_parent: &Self::Handle,
    ) -> bool {
        false
    }

    fn attach_declarative_shadow(
        &self,
        _location: &Self::Handle,
        _template: &Self::Handle,
        _attrs: Vec<Attribute>,
    ) -> Result<(), String> {
        Err(String::from("Shadow roots are not supported"))
    }
}
