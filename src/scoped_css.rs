//! Scoped-selector plugin.
//!
//! Adds the document's scope hash as an attribute selector to the last
//! compound of every selector of every style rule, so the rules only match
//! elements rendered by that document. Rules nested in grouping at-rules
//! (`@media`, `@supports`, `@layer`, ...) are scoped too; other at-rules
//! (`@keyframes`, `@font-face`, `@page`) are left alone.

use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::selector::{Combinator, Component, Selector};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::values::ident::Ident;

use crate::css::{parse_error, StylePlugin};
use crate::validate::TransformError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedSelectorPlugin {
    hash: String,
}

impl ScopedSelectorPlugin {
    pub fn new(hash: impl Into<String>) -> Self {
        ScopedSelectorPlugin { hash: hash.into() }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl StylePlugin for ScopedSelectorPlugin {
    fn name(&self) -> &str {
        "scoped-selector"
    }

    fn transform(&self, css: &str) -> Result<String, TransformError> {
        scope_selectors(css, &self.hash)
    }
}

/// Parse `css`, scope every style rule with `[hash]` and print it minified.
pub fn scope_selectors(css: &str, hash: &str) -> Result<String, TransformError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default()).map_err(parse_error)?;
    scope_rules(&mut sheet.rules, hash);

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|err| TransformError::style(err.to_string()))?;
    Ok(printed.code)
}

fn scope_rules(rules: &mut CssRuleList<'_>, hash: &str) {
    for rule in rules.0.iter_mut() {
        match rule {
            // Nested rules of a style rule are relative to it and already scoped.
            CssRule::Style(style) => {
                for selector in style.selectors.0.iter_mut() {
                    *selector = scope_selector(selector, hash);
                }
            }
            CssRule::Media(group) => scope_rules(&mut group.rules, hash),
            CssRule::Supports(group) => scope_rules(&mut group.rules, hash),
            CssRule::LayerBlock(group) => scope_rules(&mut group.rules, hash),
            CssRule::Container(group) => scope_rules(&mut group.rules, hash),
            CssRule::MozDocument(group) => scope_rules(&mut group.rules, hash),
            CssRule::Scope(group) => scope_rules(&mut group.rules, hash),
            CssRule::StartingStyle(group) => scope_rules(&mut group.rules, hash),
            _ => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Combinators that attach a pseudo-element, `::slotted()` or `::part()` to
/// the compound on their left rather than starting a new one.
fn is_pseudo_combinator(combinator: Combinator) -> bool {
    matches!(
        combinator,
        Combinator::PseudoElement | Combinator::SlotAssignment | Combinator::Part
    )
}

/// Simple selectors that name the element itself. The hash goes after the
/// last of these, ahead of pseudo-classes.
fn is_element_component(component: &Component<'_>) -> bool {
    matches!(
        component,
        Component::LocalName(_)
            | Component::ExplicitUniversalType
            | Component::ExplicitAnyNamespace
            | Component::ExplicitNoNamespace
            | Component::DefaultNamespace(_)
            | Component::Namespace(..)
            | Component::ID(_)
            | Component::Class(_)
            | Component::AttributeInNoNamespaceExists { .. }
            | Component::AttributeInNoNamespace { .. }
            | Component::AttributeOther(_)
    )
}

fn scope_attribute<'i>(hash: &str) -> Component<'i> {
    Component::AttributeInNoNamespaceExists {
        local_name: Ident::from(hash.to_string()),
        local_name_lower: Ident::from(hash.to_ascii_lowercase()),
    }
}

/// Rebuild `selector` with `[hash]` in its rightmost element compound.
fn scope_selector<'i>(selector: &Selector<'i>, hash: &str) -> Selector<'i> {
    // Match order stores compounds right to left, each in source order.
    let mut compounds: Vec<Vec<Component<'i>>> = vec![Vec::new()];
    let mut combinators: Vec<Combinator> = Vec::new();
    for component in selector.iter_raw_match_order() {
        match component {
            Component::Combinator(combinator) => {
                combinators.push(*combinator);
                compounds.push(Vec::new());
            }
            other => {
                if let Some(compound) = compounds.last_mut() {
                    compound.push(other.clone());
                }
            }
        }
    }

    let target = combinators
        .iter()
        .position(|combinator| !is_pseudo_combinator(*combinator))
        .unwrap_or(combinators.len());
    if let Some(compound) = compounds.get_mut(target) {
        let at = compound
            .iter()
            .rposition(is_element_component)
            .map_or(0, |last| last + 1);
        compound.insert(at, scope_attribute(hash));
    }

    let mut parse_order = Vec::new();
    for (index, compound) in compounds.into_iter().enumerate().rev() {
        parse_order.extend(compound);
        if index > 0 {
            parse_order.push(Component::Combinator(combinators[index - 1]));
        }
    }
    Selector::from(parse_order)
}
