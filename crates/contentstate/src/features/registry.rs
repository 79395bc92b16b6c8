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

use std::collections::HashMap;

use crate::exporter::{OutputContext, RuleBundle};
use crate::html_to_contentstate::ElementHandler;

/// Everything one feature contributes to contentstate conversion.
#[derive(Clone, Debug, Default)]
pub struct ContentstateRule {
    /// Element selectors and what they mean when parsing database HTML.
    pub from_database_format: Vec<(String, ElementHandler)>,
    pub to_database_format: RuleBundle,
    /// Rules for frontend HTML. When absent the database rules are used.
    pub to_frontend_format: Option<RuleBundle>,
}

impl ContentstateRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(mut self, selector: &str, handler: ElementHandler) -> Self {
        self.from_database_format
            .push((selector.to_owned(), handler));
        self
    }

    pub fn to_database(mut self, rules: RuleBundle) -> Self {
        self.to_database_format = rules;
        self
    }

    pub fn to_frontend(mut self, rules: RuleBundle) -> Self {
        self.to_frontend_format = Some(rules);
        self
    }

    pub fn rules_for(&self, context: OutputContext) -> Option<&RuleBundle> {
        match context {
            OutputContext::Database => Some(&self.to_database_format),
            OutputContext::Frontend => self.to_frontend_format.as_ref(),
        }
    }
}

/// The set of known rich text features and their conversion rules.
///
/// A feature can be known without having conversion rules, for example one
/// that only adds an editor control.
#[derive(Clone, Debug, Default)]
pub struct FeatureRegistry {
    features: Vec<String>,
    converter_rules: HashMap<String, ContentstateRule>,
    default_features: Vec<String>,
}

impl FeatureRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every builtin feature.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        super::builtin::register_builtin_features(&mut registry);
        registry
    }

    pub fn register_feature(&mut self, name: &str) {
        if !self.has_feature(name) {
            self.features.push(name.to_owned());
        }
    }

    /// Register `rule` as the conversion rule of feature `name`, replacing
    /// any earlier rule.
    pub fn register_converter_rule(&mut self, name: &str, rule: ContentstateRule) {
        self.register_feature(name);
        self.converter_rules.insert(name.to_owned(), rule);
    }

    pub fn register_default_feature(&mut self, name: &str) {
        self.register_feature(name);
        if !self.default_features.iter().any(|f| f == name) {
            self.default_features.push(name.to_owned());
        }
    }

    pub fn get_converter_rule(&self, name: &str) -> Option<&ContentstateRule> {
        self.converter_rules.get(name)
    }

    /// A feature's rendering rules for one context, without falling back
    /// from frontend to database rules.
    pub fn get_rule(
        &self,
        context: OutputContext,
        name: &str,
    ) -> Option<&RuleBundle> {
        self.get_converter_rule(name)?.rules_for(context)
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }

    /// Every known feature, in registration order.
    pub fn list_features(&self) -> &[String] {
        &self.features
    }

    pub fn default_features(&self) -> &[String] {
        &self.default_features
    }
}
