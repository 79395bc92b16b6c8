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

use html5ever::QualName;

use super::PaDomHandle;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PaNodeContainer {
    pub(crate) name: QualName,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<PaDomHandle>,
}

impl PaNodeContainer {
    pub(crate) fn tag(&self) -> &str {
        self.name.local.as_ref()
    }

    /// The `<html>` element the fragment parser wraps everything in.
    pub(crate) fn is_root_html(&self) -> bool {
        self.tag() == "html"
    }
}

#[test]
fn test_tag_and_root() {
    use super::paqual_name;

    let node = PaNodeContainer {
        name: paqual_name("a"),
        attrs: vec![
            ("linktype".into(), "page".into()),
            ("id".into(), "3".into()),
        ],
        children: Vec::new(),
    };
    assert_eq!(node.tag(), "a");
    assert!(!node.is_root_html());

    let root = PaNodeContainer {
        name: paqual_name("html"),
        attrs: Vec::new(),
        children: Vec::new(),
    };
    assert!(root.is_root_html());
}
