//! Ordered fallback rules for pulling one field out of an HTML fragment.
//!
//! Catalog markup drifts between redesigns, so every field is described by
//! several locators in priority order. The first rule that yields a
//! non-empty value wins; a rule whose locator does not parse, matches
//! nothing or yields an empty value simply falls through to the next one.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// How a matched element is turned into a value.
#[derive(Clone)]
pub enum Retrieval {
    /// Trimmed text content, whitespace-separated text nodes joined by one space.
    Text,
    /// A single attribute.
    Attr(String),
    /// The first attribute (in order) whose value passes the filter.
    FirstAttr {
        names: Vec<String>,
        accept: fn(&str) -> bool,
    },
}

impl std::fmt::Debug for Retrieval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Retrieval::Text => f.write_str("Text"),
            Retrieval::Attr(name) => f.debug_tuple("Attr").field(name).finish(),
            Retrieval::FirstAttr { names, .. } => {
                f.debug_struct("FirstAttr").field("names", names).finish_non_exhaustive()
            }
        }
    }
}

/// A CSS locator paired with a retrieval strategy.
#[derive(Debug, Clone)]
pub struct Rule {
    css: String,
    selector: Option<Selector>,
    retrieval: Retrieval,
}

impl Rule {
    pub fn new(css: impl Into<String>, retrieval: Retrieval) -> Self {
        let css = css.into();
        let selector = match Selector::parse(&css) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!(selector = %css, error = ?e, "Unparsable selector, rule will never match");
                None
            }
        };
        Self {
            css,
            selector,
            retrieval,
        }
    }

    pub fn text(css: impl Into<String>) -> Self {
        Self::new(css, Retrieval::Text)
    }

    pub fn attr(css: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(css, Retrieval::Attr(name.into()))
    }

    pub fn first_attr(
        css: impl Into<String>,
        names: impl IntoIterator<Item = impl Into<String>>,
        accept: fn(&str) -> bool,
    ) -> Self {
        Self::new(
            css,
            Retrieval::FirstAttr {
                names: names.into_iter().map(Into::into).collect(),
                accept,
            },
        )
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    /// Apply to the first descendant of `scope` matching the locator.
    pub fn apply(&self, scope: ElementRef<'_>) -> Option<String> {
        let selector = self.selector.as_ref()?;
        let element = scope.select(selector).next()?;
        self.retrieve(element)
    }

    fn retrieve(&self, element: ElementRef<'_>) -> Option<String> {
        let value = match &self.retrieval {
            Retrieval::Text => element_text(element),
            Retrieval::Attr(name) => element.value().attr(name)?.trim().to_string(),
            Retrieval::FirstAttr { names, accept } => names
                .iter()
                .filter_map(|name| element.value().attr(name))
                .map(str::trim)
                .find(|value| accept(value))?
                .to_string(),
        };
        (!value.is_empty()).then_some(value)
    }
}

/// Ordered rule list for one named field.
#[derive(Debug, Clone)]
pub struct Cascade {
    field: &'static str,
    rules: Vec<Rule>,
}

impl Cascade {
    pub fn new(field: &'static str, rules: Vec<Rule>) -> Self {
        Self { field, rules }
    }

    /// Text cascade over a list of locators.
    pub fn text(field: &'static str, selectors: &[&str]) -> Self {
        Self::new(field, selectors.iter().map(|css| Rule::text(*css)).collect())
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First non-empty value, or `None` when every rule falls through.
    pub fn extract(&self, scope: ElementRef<'_>) -> Option<String> {
        self.rules.iter().find_map(|rule| rule.apply(scope))
    }

    /// First value that also survives `parse`.
    pub fn extract_with<T>(
        &self,
        scope: ElementRef<'_>,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        self.rules
            .iter()
            .filter_map(|rule| rule.apply(scope))
            .find_map(|value| parse(&value))
    }

    /// Texts of every element matched by the first rule that yields any.
    pub fn extract_all(&self, scope: ElementRef<'_>) -> Vec<String> {
        for rule in &self.rules {
            let Some(selector) = rule.selector.as_ref() else {
                continue;
            };
            let values: Vec<String> = scope
                .select(selector)
                .filter_map(|element| rule.retrieve(element))
                .collect();
            if !values.is_empty() {
                return values;
            }
        }
        Vec::new()
    }

    /// True when any rule's locator matches inside `scope`.
    pub fn matches(&self, scope: ElementRef<'_>) -> bool {
        self.rules
            .iter()
            .filter_map(|rule| rule.selector.as_ref())
            .any(|selector| scope.select(selector).next().is_some())
    }
}

/// Cascade over record-container locators on a listing page.
///
/// The first locator matching at least one element wins.
#[derive(Debug, Clone)]
pub struct ContainerCascade {
    locators: Vec<(String, Selector)>,
}

impl ContainerCascade {
    pub fn new(selectors: &[&str]) -> Self {
        let locators = selectors
            .iter()
            .filter_map(|css| match Selector::parse(css) {
                Ok(selector) => Some((css.to_string(), selector)),
                Err(e) => {
                    warn!(selector = %css, error = ?e, "Skipping unparsable container selector");
                    None
                }
            })
            .collect();
        Self { locators }
    }

    /// Containers found by the first matching locator, with the locator used.
    pub fn locate<'a>(&self, document: &'a Html) -> Option<(&str, Vec<ElementRef<'a>>)> {
        self.locators.iter().find_map(|(css, selector)| {
            let found: Vec<ElementRef<'a>> = document.select(selector).collect();
            (!found.is_empty()).then_some((css.as_str(), found))
        })
    }
}

/// Trimmed text nodes joined with single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
