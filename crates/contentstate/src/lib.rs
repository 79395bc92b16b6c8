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

//! Conversion between rich text HTML and the block based "contentstate"
//! document model used by Draft.js style editors.
//!
//! The set of supported markup is extensible: each named feature in a
//! [`FeatureRegistry`] contributes the rules for parsing its HTML and for
//! rendering its blocks, styles and entities back to HTML.

mod converter;
mod dom;
mod error;
pub mod exporter;
pub mod features;
pub mod html_to_contentstate;
mod model;

pub use crate::converter::ContentstateConverter;
pub use crate::dom::{HtmlElement, HtmlNode, ToHtml};
pub use crate::error::ConverterError;
pub use crate::exporter::OutputContext;
pub use crate::features::{ContentstateRule, FeatureRegistry, DEFAULT_FEATURES};
pub use crate::model::{
    block_type, Block, ContentState, Entity, EntityData, EntityKey,
    EntityRange, InlineStyleRange, Mutability,
};
