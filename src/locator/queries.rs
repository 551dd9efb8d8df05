//! Semantic (accessibility-first) queries evaluated inside the page.

use crate::browser::driver::{BrowserDriver, ElementRef};
use crate::error::{BrowserError, Result};
use crate::locator::{QueryOptions, QueryType};
use async_trait::async_trait;
use serde_json::{Value, json};

const SEMANTIC_QUERIES_JS: &str = include_str!("semantic_queries.js");

/// Provider of the `queryAll*`/`queryBy*` query family
#[async_trait]
pub trait QueryProvider: Send + Sync {
    /// Every element matching the query, in document order
    async fn query_all(
        &self,
        driver: &dyn BrowserDriver,
        query_type: QueryType,
        value: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<ElementRef>>;

    /// The single matching element, `None` when nothing matches.
    ///
    /// More than one match is an error carrying a multi-line explanation.
    async fn query_by(
        &self,
        driver: &dyn BrowserDriver,
        query_type: QueryType,
        value: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Option<ElementRef>> {
        let mut matches = self.query_all(driver, query_type, value, options).await?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(BrowserError::MultipleElements(multiple_elements_message(
                query_type, value, options, count,
            ))),
        }
    }
}

/// Runs the bundled query script through `execute_script`
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptQueryProvider;

#[async_trait]
impl QueryProvider for ScriptQueryProvider {
    async fn query_all(
        &self,
        driver: &dyn BrowserDriver,
        query_type: QueryType,
        value: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<ElementRef>> {
        let options = match options {
            Some(options) => serde_json::to_value(options)?,
            None => json!({}),
        };

        let result = driver
            .execute_script(SEMANTIC_QUERIES_JS, vec![json!(query_type.as_str()), json!(value), options])
            .await?;

        parse_elements(&result)
    }
}

fn parse_elements(result: &Value) -> Result<Vec<ElementRef>> {
    let items = result
        .as_array()
        .ok_or_else(|| BrowserError::ScriptFailed(format!("query script returned {} instead of a list", result)))?;

    Ok(items.iter().filter_map(ElementRef::from_json).collect())
}

/// Describe an ambiguous match the way Testing Library does. The first line
/// is self-contained; the rest is a hint for the caller.
pub fn multiple_elements_message(
    query_type: QueryType,
    value: &str,
    options: Option<&QueryOptions>,
    count: usize,
) -> String {
    let headline = match query_type {
        QueryType::Role => match options.and_then(|o| o.name.as_deref()) {
            Some(name) => format!("Found multiple elements with the role \"{}\" and name \"{}\"", value, name),
            None => format!("Found multiple elements with the role \"{}\"", value),
        },
        QueryType::Text => format!("Found multiple elements with the text: {}", value),
        QueryType::LabelText => format!("Found multiple elements with the text of: {}", value),
        QueryType::PlaceholderText => format!("Found multiple elements with the placeholder text of: {}", value),
        QueryType::DisplayValue => format!("Found multiple elements with the display value: {}", value),
        QueryType::AltText => format!("Found multiple elements with the alt text: {}", value),
        QueryType::Title => format!("Found multiple elements with the title: {}", value),
        QueryType::TestId => format!("Found multiple elements by: [data-testid=\"{}\"]", value),
    };

    format!(
        "{}\n\n{} elements matched.\n(If this is intentional, then use the `*AllBy*` variant of the query (like `queryAllBy{}` or `findAllBy{}`)).",
        headline,
        count,
        query_type.method_suffix(),
        query_type.method_suffix()
    )
}
