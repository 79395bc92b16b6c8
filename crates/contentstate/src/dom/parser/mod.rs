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

//! HTML fragment parsing.
//!
//! html5ever builds a [`PaDom`] (see [`PaDomCreator`]); [`parse_events`]
//! then walks it and replays it as a balanced stream of open-tag, text and
//! close-tag events for a [`MarkupHandler`].

mod padom;
mod padom_creator;
mod panode_container;
mod parse;

use html5ever::{LocalName, Namespace, QualName};

pub(crate) use padom::{PaDom, PaDomHandle, PaDomNode};
pub(crate) use padom_creator::PaDomCreator;
pub(crate) use panode_container::PaNodeContainer;
pub(crate) use parse::{parse_events, MarkupHandler};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub(crate) fn paqual_name(local_name: &str) -> QualName {
    QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(local_name),
    )
}
