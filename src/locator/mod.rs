//! Element location.
//!
//! A [`Locator`] names an element either by a raw selector (CSS, XPath or the
//! WebdriverIO dialect) or by a semantic, accessibility-first query in the
//! style of Testing Library. The [`ElementResolver`] turns a locator into a
//! live element handle plus a description and the equivalent test code.

pub mod queries;
pub mod resolver;
pub mod selector;

pub use queries::{QueryProvider, ScriptQueryProvider};
pub use resolver::{ElementResolver, ElementResult, NullableElementResult};
pub use selector::Selector;

use crate::error::{BrowserError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Semantic query kinds supported by the query provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum QueryType {
    Role,
    Text,
    LabelText,
    PlaceholderText,
    DisplayValue,
    AltText,
    Title,
    TestId,
}

impl QueryType {
    pub const ALL: [QueryType; 8] = [
        QueryType::Role,
        QueryType::Text,
        QueryType::LabelText,
        QueryType::PlaceholderText,
        QueryType::DisplayValue,
        QueryType::AltText,
        QueryType::Title,
        QueryType::TestId,
    ];

    /// Wire name, e.g. `labelText`
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Role => "role",
            QueryType::Text => "text",
            QueryType::LabelText => "labelText",
            QueryType::PlaceholderText => "placeholderText",
            QueryType::DisplayValue => "displayValue",
            QueryType::AltText => "altText",
            QueryType::Title => "title",
            QueryType::TestId => "testId",
        }
    }

    /// Suffix shared by the `queryBy*`/`findBy*` function family, e.g. `LabelText`
    pub fn method_suffix(&self) -> &'static str {
        match self {
            QueryType::Role => "Role",
            QueryType::Text => "Text",
            QueryType::LabelText => "LabelText",
            QueryType::PlaceholderText => "PlaceholderText",
            QueryType::DisplayValue => "DisplayValue",
            QueryType::AltText => "AltText",
            QueryType::Title => "Title",
            QueryType::TestId => "TestId",
        }
    }

    /// Human phrase used in descriptions, e.g. `label text`
    pub fn phrase(&self) -> &'static str {
        match self {
            QueryType::Role => "role",
            QueryType::Text => "text",
            QueryType::LabelText => "label text",
            QueryType::PlaceholderText => "placeholder text",
            QueryType::DisplayValue => "display value",
            QueryType::AltText => "alt text",
            QueryType::Title => "title",
            QueryType::TestId => "test ID",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self> {
        QueryType::ALL
            .into_iter()
            .find(|q| q.as_str() == s)
            .ok_or_else(|| BrowserError::UnsupportedQueryType(s.to_string()))
    }
}

/// Options for semantic queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Accessible name for role queries (e.g., getByRole('button', {name: 'Submit'}))
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether to match exact text (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,

    /// Include elements hidden from accessibility tree (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    /// Heading level for role='heading' (1-6)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

/// Validated element locator
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    /// Raw CSS selector, XPath or WebdriverIO locator
    Wdio { selector: String },
    /// Accessibility-first semantic query
    TestingLibrary {
        query_type: QueryType,
        query_value: String,
        query_options: Option<QueryOptions>,
    },
}

impl Locator {
    pub fn selector(selector: impl Into<String>) -> Self {
        Locator::Wdio { selector: selector.into() }
    }

    pub fn query(query_type: QueryType, value: impl Into<String>) -> Self {
        Locator::TestingLibrary {
            query_type,
            query_value: value.into(),
            query_options: None,
        }
    }

    /// Builder method: attach query options. No-op for selector locators.
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        if let Locator::TestingLibrary { query_options, .. } = &mut self {
            *query_options = Some(options);
        }
        self
    }

    pub fn strategy(&self) -> LocatorStrategy {
        match self {
            Locator::Wdio { .. } => LocatorStrategy::Wdio,
            Locator::TestingLibrary { .. } => LocatorStrategy::TestingLibrary,
        }
    }
}

/// Wire value of the `strategy` discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LocatorStrategy {
    #[serde(rename = "wdio", alias = "webdriverio")]
    Wdio,
    #[serde(rename = "testing-library")]
    TestingLibrary,
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorStrategy::Wdio => f.write_str("wdio"),
            LocatorStrategy::TestingLibrary => f.write_str("testing-library"),
        }
    }
}

/// Element location strategy as received from the agent.
///
/// - wdio strategy: CSS selectors, XPath expressions or wdio locators, e.g.
///   `{"strategy": "wdio", "selector": "button.submit-btn"}`,
///   `{"strategy": "wdio", "selector": "//button[text()='Submit']"}`,
///   `{"strategy": "wdio", "selector": "button*=Submit"}`
/// - testing-library strategy: semantic queries, e.g.
///   `{"strategy": "testing-library", "queryType": "role", "queryValue": "button", "queryOptions": {"name": "submit", "exact": false}}`,
///   `{"strategy": "testing-library", "queryType": "labelText", "queryValue": "Email"}`
///
/// Prefer testing-library queries when the user's tests use them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocatorArgs {
    /// Either "wdio" or "testing-library"
    pub strategy: LocatorStrategy,

    /// wdio only: CSS selector, XPath or WebdriverIO locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// testing-library only: one of role, text, labelText, placeholderText,
    /// displayValue, altText, title, testId (PREFERRED for robustness)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,

    /// testing-library only: value to search for with the queryType
    /// (e.g., 'button' for role, 'Submit' for text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_value: Option<String>,

    /// testing-library only: additional options for semantic queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_options: Option<QueryOptions>,
}

impl TryFrom<LocatorArgs> for Locator {
    type Error = BrowserError;

    fn try_from(args: LocatorArgs) -> Result<Self> {
        let has_query = args.query_type.is_some() || args.query_value.is_some() || args.query_options.is_some();

        match args.strategy {
            LocatorStrategy::Wdio => {
                if has_query {
                    return Err(BrowserError::InvalidLocator(
                        "provide EITHER a selector OR a semantic query (queryType + queryValue), not both".to_string(),
                    ));
                }
                let selector = args
                    .selector
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| BrowserError::InvalidLocator("\"wdio\" strategy requires a selector".to_string()))?;
                Ok(Locator::Wdio { selector })
            }
            LocatorStrategy::TestingLibrary => {
                if args.selector.is_some() {
                    return Err(BrowserError::InvalidLocator(
                        "provide EITHER a selector OR a semantic query (queryType + queryValue), not both".to_string(),
                    ));
                }
                let (Some(query_type), Some(query_value)) = (args.query_type, args.query_value) else {
                    return Err(BrowserError::InvalidLocator(
                        "\"testing-library\" strategy requires queryType and queryValue".to_string(),
                    ));
                };
                Ok(Locator::TestingLibrary {
                    query_type: query_type.parse()?,
                    query_value,
                    query_options: args.query_options,
                })
            }
        }
    }
}

impl From<Locator> for LocatorArgs {
    fn from(locator: Locator) -> Self {
        match locator {
            Locator::Wdio { selector } => LocatorArgs {
                strategy: LocatorStrategy::Wdio,
                selector: Some(selector),
                query_type: None,
                query_value: None,
                query_options: None,
            },
            Locator::TestingLibrary {
                query_type,
                query_value,
                query_options,
            } => LocatorArgs {
                strategy: LocatorStrategy::TestingLibrary,
                selector: None,
                query_type: Some(query_type.as_str().to_string()),
                query_value: Some(query_value),
                query_options,
            },
        }
    }
}
