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

use strum_macros::{AsRefStr, Display, EnumString};

use super::defaults::{
    default_rules, FALLBACK_BLOCK, FALLBACK_ENTITY, FALLBACK_STYLE,
};
use super::rules::{BlockRule, EntityDecorator, RuleBundle, StyleRule};

/// Where exported HTML is going.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum OutputContext {
    /// The canonical stored form.
    Database,
    /// HTML shown to site visitors.
    Frontend,
}

/// The merged rule tables for one output context.
#[derive(Clone, Debug)]
pub struct ExporterConfig {
    rules: RuleBundle,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl ExporterConfig {
    /// Overlay a feature's rules. Entries for keys already present are
    /// replaced; composite decorators are appended.
    pub fn merge(&mut self, bundle: &RuleBundle) {
        self.rules.block_map.extend(
            bundle
                .block_map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.rules.style_map.extend(
            bundle
                .style_map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.rules.entity_decorators.extend(
            bundle
                .entity_decorators
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.rules
            .composite_decorators
            .extend(bundle.composite_decorators.iter().cloned());
    }

    pub fn rules(&self) -> &RuleBundle {
        &self.rules
    }

    pub fn has_block_rule(&self, block_type: &str) -> bool {
        self.rules.block_map.contains_key(block_type)
    }

    /// The rule for `block_type`, or the fallback rule.
    pub fn block_rule(&self, block_type: &str) -> Option<&BlockRule> {
        self.rules
            .block_map
            .get(block_type)
            .or_else(|| self.rules.block_map.get(FALLBACK_BLOCK))
    }

    pub fn style_rule(&self, style: &str) -> Option<&StyleRule> {
        self.rules
            .style_map
            .get(style)
            .or_else(|| self.rules.style_map.get(FALLBACK_STYLE))
    }

    /// The decorator for `entity_type`, or the fallback decorator.
    pub fn entity_decorator(&self, entity_type: &str) -> Option<&EntityDecorator> {
        self.rules
            .entity_decorators
            .get(entity_type)
            .or_else(|| self.rules.entity_decorators.get(FALLBACK_ENTITY))
    }
}

/// Merged rule tables for both output contexts.
#[derive(Clone, Debug, Default)]
pub struct ExporterConfigs {
    pub database: ExporterConfig,
    pub frontend: ExporterConfig,
}

impl ExporterConfigs {
    /// Merge every feature's rules over the defaults, in feature order.
    ///
    /// `get_rule` returns a feature's rules for one context. A feature with
    /// no frontend rules is exported to the frontend with its database
    /// rules, and a feature with no rules at all is skipped.
    pub fn build<'r, S, F>(features: &[S], get_rule: F) -> Self
    where
        S: AsRef<str>,
        F: Fn(OutputContext, &str) -> Option<&'r RuleBundle>,
    {
        let mut configs = Self::default();
        for feature in features {
            let feature = feature.as_ref();
            let Some(database) = get_rule(OutputContext::Database, feature)
            else {
                log::debug!("Feature {feature} has no conversion rules");
                continue;
            };
            let frontend =
                get_rule(OutputContext::Frontend, feature).unwrap_or(database);
            configs.database.merge(database);
            configs.frontend.merge(frontend);
        }
        configs
    }

    pub fn get(&self, context: OutputContext) -> &ExporterConfig {
        match context {
            OutputContext::Database => &self.database,
            OutputContext::Frontend => &self.frontend,
        }
    }
}
