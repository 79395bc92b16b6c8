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

use once_cell::sync::Lazy;

use crate::exporter::{ExporterConfigs, HtmlExporter, OutputContext};
use crate::features::{FeatureRegistry, DEFAULT_FEATURES};
use crate::html_to_contentstate::{
    ElementHandler, HtmlRuleset, HtmlToContentStateHandler,
};
use crate::model::{block_type, ContentState};
use crate::ConverterError;

static DEFAULT_REGISTRY: Lazy<FeatureRegistry> =
    Lazy::new(FeatureRegistry::with_defaults);

/// Converts between database HTML and contentstate JSON for a fixed list of
/// features.
///
/// All rules are resolved once at construction. A converter holds no
/// per-call state, so one instance can be shared between threads.
#[derive(Clone, Debug)]
pub struct ContentstateConverter {
    features: Vec<String>,
    html_to_contentstate_handler: HtmlToContentStateHandler,
    exporter_configs: ExporterConfigs,
}

impl ContentstateConverter {
    /// A converter for `features`, looked up in the builtin registry.
    pub fn new<S: AsRef<str>>(features: &[S]) -> Result<Self, ConverterError> {
        Self::with_registry(features, &DEFAULT_REGISTRY)
    }

    /// A converter for the builtin default features.
    pub fn with_default_features() -> Result<Self, ConverterError> {
        Self::new(DEFAULT_FEATURES)
    }

    /// A converter for `features`, looked up in `registry`. Every name must
    /// be known to the registry, but need not have conversion rules.
    pub fn with_registry<S: AsRef<str>>(
        features: &[S],
        registry: &FeatureRegistry,
    ) -> Result<Self, ConverterError> {
        if let Some(unknown) = features
            .iter()
            .map(|feature| feature.as_ref())
            .find(|name| !registry.has_feature(name))
        {
            return Err(ConverterError::UnknownFeature(unknown.to_owned()));
        }

        let mut element_rules = HtmlRuleset::new();
        element_rules.add_rules([
            ("p", ElementHandler::block(block_type::UNSTYLED)),
            ("br", ElementHandler::LineBreak),
        ])?;
        for feature in features {
            if let Some(rule) = registry.get_converter_rule(feature.as_ref()) {
                element_rules.add_rules(rule.from_database_format.iter().cloned())?;
            }
        }

        let exporter_configs = ExporterConfigs::build(features, |context, name| {
            registry.get_rule(context, name)
        });

        Ok(Self {
            features: features.iter().map(|f| f.as_ref().to_owned()).collect(),
            html_to_contentstate_handler: HtmlToContentStateHandler::new(
                element_rules,
            ),
            exporter_configs,
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Parse database HTML into contentstate JSON, indented by four spaces.
    pub fn from_database_format(&self, html: &str) -> Result<String, ConverterError> {
        self.html_to_contentstate(html).to_json_pretty()
    }

    pub fn to_database_format(
        &self,
        contentstate_json: &str,
    ) -> Result<String, ConverterError> {
        let state = ContentState::from_json(contentstate_json)?;
        self.contentstate_to_html(&state, OutputContext::Database)
    }

    pub fn to_frontend_format(
        &self,
        contentstate_json: &str,
    ) -> Result<String, ConverterError> {
        let state = ContentState::from_json(contentstate_json)?;
        self.contentstate_to_html(&state, OutputContext::Frontend)
    }

    pub fn html_to_contentstate(&self, html: &str) -> ContentState {
        self.html_to_contentstate_handler.parse(html)
    }

    pub fn contentstate_to_html(
        &self,
        state: &ContentState,
        context: OutputContext,
    ) -> Result<String, ConverterError> {
        HtmlExporter::new(self.exporter_configs.get(context)).render(state)
    }
}
