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

//! Maps HTML elements to results via CSS-like selectors.
//!
//! Supported selector forms:
//! - `tag`
//! - `tag[attr]`
//! - `tag[attr="value"]` (or single quotes)

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ConverterError;

static SELECTOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^([a-zA-Z][a-zA-Z0-9-]*)(?:\[([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:=(?:"([^"]*)"|'([^']*)'))?\])?$"#,
    )
    .unwrap()
});

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrCheck {
    Any,
    Present(String),
    Equals(String, String),
}

impl AttrCheck {
    fn is_specific(&self) -> bool {
        !matches!(self, Self::Any)
    }

    fn matches(&self, attrs: &[(String, String)]) -> bool {
        match self {
            Self::Any => true,
            Self::Present(name) => attrs.iter().any(|(n, _)| n == name),
            Self::Equals(name, value) => {
                attrs.iter().any(|(n, v)| n == name && v == value)
            }
        }
    }
}

#[derive(Clone, Debug)]
struct ElementRule<T> {
    attr_check: AttrCheck,
    result: T,
}

#[derive(Clone, Debug)]
pub struct HtmlRuleset<T> {
    element_rules: HashMap<String, Vec<ElementRule<T>>>,
}

impl<T> Default for HtmlRuleset<T> {
    fn default() -> Self {
        Self {
            element_rules: HashMap::new(),
        }
    }
}

impl<T> HtmlRuleset<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(
        &mut self,
        selector: &str,
        result: T,
    ) -> Result<(), ConverterError> {
        let (name, attr_check) = parse_selector(selector)?;
        self.element_rules
            .entry(name)
            .or_default()
            .push(ElementRule { attr_check, result });
        Ok(())
    }

    pub fn add_rules<I, S>(&mut self, rules: I) -> Result<(), ConverterError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        for (selector, result) in rules {
            self.add_rule(selector.as_ref(), result)?;
        }
        Ok(())
    }

    /// Find the result for an element. Rules with an attribute test win over
    /// bare tag rules; among equally specific rules the latest added wins.
    pub fn match_element(
        &self,
        name: &str,
        attrs: &[(String, String)],
    ) -> Option<&T> {
        let rules = self.element_rules.get(&name.to_ascii_lowercase())?;
        let find = move |specific: bool| {
            rules.iter().rev().find(|rule| {
                rule.attr_check.is_specific() == specific
                    && rule.attr_check.matches(attrs)
            })
        };
        find(true).or_else(|| find(false)).map(|rule| &rule.result)
    }

    pub fn is_empty(&self) -> bool {
        self.element_rules.is_empty()
    }
}

fn parse_selector(selector: &str) -> Result<(String, AttrCheck), ConverterError> {
    let captures = SELECTOR_REGEX
        .captures(selector.trim())
        .ok_or_else(|| ConverterError::InvalidSelector(selector.to_owned()))?;
    let name = captures[1].to_ascii_lowercase();
    let attr_check = match captures.get(2) {
        None => AttrCheck::Any,
        Some(attr) => {
            let attr = attr.as_str().to_ascii_lowercase();
            match captures.get(3).or_else(|| captures.get(4)) {
                Some(value) => AttrCheck::Equals(attr, value.as_str().to_owned()),
                None => AttrCheck::Present(attr),
            }
        }
    };
    Ok((name, attr_check))
}
