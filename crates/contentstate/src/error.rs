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

use thiserror::Error;

use crate::model::EntityKey;

/// Failures that abort a conversion call.
///
/// Missing rules for a block, style or entity type are not errors: they are
/// logged and the affected markup is dropped. Everything here is either a
/// broken document model or a broken converter configuration.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// A feature name was requested that the registry has never heard of.
    #[error("Unknown rich text feature `{0}`")]
    UnknownFeature(String),

    /// A feature registered an element selector that cannot be parsed.
    #[error("Invalid element selector `{0}`")]
    InvalidSelector(String),

    /// The document model could not be (de)serialized.
    #[error("Invalid contentstate JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// An entity range refers to a key that is absent from the entity map.
    #[error("Block `{block}` references entity {key} which is not in the entity map")]
    MissingEntity { block: String, key: EntityKey },

    /// Two entity ranges of the same block cover the same text.
    #[error("Block `{block}` has overlapping entity ranges")]
    OverlappingEntityRanges { block: String },

    /// A style or entity range ends past the end of its block's text.
    #[error("Block `{block}` has a range at offset {offset} with length {length} outside its text")]
    RangeOutOfBounds {
        block: String,
        offset: usize,
        length: usize,
    },

    /// Two ranges of the same inline style overlap within one block.
    #[error("Block `{block}` has overlapping `{style}` style ranges")]
    OverlappingStyleRanges { block: String, style: String },
}

impl ConverterError {
    /// Whether this error is a configuration problem raised while building a
    /// converter, as opposed to a problem with the data being converted.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::UnknownFeature(_) | Self::InvalidSelector(_))
    }
}
