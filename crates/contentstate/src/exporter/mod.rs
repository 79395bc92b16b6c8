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

//! Rule driven rendering of a [`crate::ContentState`] to HTML.
//!
//! Features contribute partial rule tables ([`RuleBundle`]) which are merged
//! over [`defaults::default_rules`] into one [`ExporterConfig`] per
//! [`OutputContext`].

mod config;
pub mod defaults;
mod html_exporter;
mod rules;
mod wrapper_state;

pub use config::{ExporterConfig, ExporterConfigs, OutputContext};
pub use html_exporter::HtmlExporter;
pub use rules::{
    BlockComponent, BlockProps, BlockRule, CompositeDecorator,
    DecoratorComponent, DecoratorProps, EntityDecorator, EntityProps,
    RuleBundle, StyleComponent, StyleProps, StyleRule,
};
