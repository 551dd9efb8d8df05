use crate::browser::driver::{BrowserDriver, ElementRef};
use crate::error::{BrowserError, Result};
use crate::locator::{Locator, QueryOptions, QueryProvider, QueryType, ScriptQueryProvider, Selector};
use crate::tools::utils::js_string;
use std::sync::Arc;

/// A located element plus how it was found
#[derive(Debug, Clone, PartialEq)]
pub struct ElementResult {
    pub element: ElementRef,
    /// Human-readable description, e.g. `role "button" with name "Submit"`
    pub query_description: String,
    /// Equivalent WebdriverIO test code
    pub generated_code: String,
}

/// Like [`ElementResult`] but the element may be absent
#[derive(Debug, Clone, PartialEq)]
pub struct NullableElementResult {
    pub element: Option<ElementRef>,
    pub query_description: String,
    pub generated_code: String,
}

/// Translates locators into live elements using either the selector engine or
/// the semantic query provider
#[derive(Clone)]
pub struct ElementResolver {
    queries: Arc<dyn QueryProvider>,
}

impl Default for ElementResolver {
    fn default() -> Self {
        Self::new(Arc::new(ScriptQueryProvider))
    }
}

impl ElementResolver {
    pub fn new(queries: Arc<dyn QueryProvider>) -> Self {
        Self { queries }
    }

    /// Resolve a locator, failing with "Unable to find element" when nothing matches
    pub async fn find_element(&self, driver: &dyn BrowserDriver, locator: &Locator) -> Result<ElementResult> {
        let found = self.find_element_nullable(driver, locator).await?;
        match found.element {
            Some(element) => Ok(ElementResult {
                element,
                query_description: found.query_description,
                generated_code: found.generated_code,
            }),
            None => Err(BrowserError::ElementNotFound(format!(
                "Unable to find element with {}",
                found.query_description
            ))),
        }
    }

    /// Resolve a locator; a missing element is not an error
    pub async fn find_element_nullable(
        &self,
        driver: &dyn BrowserDriver,
        locator: &Locator,
    ) -> Result<NullableElementResult> {
        let query_description = describe(locator);
        let generated_code = generated_code(locator);

        let element = match locator {
            Locator::Wdio { selector } => {
                let selector = Selector::parse(selector);
                log::debug!("Looking up element by {}", selector);
                driver.find_element(&selector).await?
            }
            Locator::TestingLibrary {
                query_type,
                query_value,
                query_options,
            } => {
                log::debug!("Querying element by {}", query_description);
                self.queries
                    .query_by(driver, *query_type, query_value, query_options.as_ref())
                    .await
                    .map_err(first_line_only)?
            }
        };

        Ok(NullableElementResult {
            element,
            query_description,
            generated_code,
        })
    }
}

fn first_line_only(err: BrowserError) -> BrowserError {
    match err {
        BrowserError::MultipleElements(message) => {
            BrowserError::MultipleElements(message.lines().next().unwrap_or_default().to_string())
        }
        other => other,
    }
}

/// Description used in action and error messages
pub fn describe(locator: &Locator) -> String {
    match locator {
        Locator::Wdio { selector } => format!("CSS selector \"{}\"", selector),
        Locator::TestingLibrary {
            query_type,
            query_value,
            query_options,
        } => {
            let mut description = format!("{} \"{}\"", query_type.phrase(), query_value);
            if *query_type == QueryType::Role {
                if let Some(name) = query_options.as_ref().and_then(|o| o.name.as_deref()) {
                    description.push_str(&format!(" with name \"{}\"", name));
                }
            }
            description
        }
    }
}

/// WebdriverIO code equivalent to resolving `locator`
pub fn generated_code(locator: &Locator) -> String {
    match locator {
        Locator::Wdio { selector } => format!("browser.$({})", js_string(selector)),
        Locator::TestingLibrary {
            query_type,
            query_value,
            query_options,
        } => format!(
            "await browser.findBy{}({}{})",
            query_type.method_suffix(),
            js_string(query_value),
            options_argument(query_options.as_ref())
        ),
    }
}

fn options_argument(options: Option<&QueryOptions>) -> String {
    options
        .and_then(|o| serde_json::to_string(o).ok())
        .map(|json| format!(", {}", json))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::driver::ELEMENT_KEY;
    use crate::testing::{FakeDriver, FakeQueries};
    use serde_json::json;

    fn submit_form() -> Locator {
        Locator::query(QueryType::Role, "button").with_options(QueryOptions {
            name: Some("Submit Form".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&Locator::selector("#go")), "CSS selector \"#go\"");
        assert_eq!(describe(&submit_form()), "role \"button\" with name \"Submit Form\"");
        assert_eq!(describe(&Locator::query(QueryType::LabelText, "Email")), "label text \"Email\"");
        assert_eq!(describe(&Locator::query(QueryType::TestId, "row")), "test ID \"row\"");
    }

    #[test]
    fn test_generated_code_table() {
        let expected = [
            (QueryType::Role, "findByRole"),
            (QueryType::Text, "findByText"),
            (QueryType::LabelText, "findByLabelText"),
            (QueryType::PlaceholderText, "findByPlaceholderText"),
            (QueryType::DisplayValue, "findByDisplayValue"),
            (QueryType::AltText, "findByAltText"),
            (QueryType::Title, "findByTitle"),
            (QueryType::TestId, "findByTestId"),
        ];
        for (query_type, method) in expected {
            assert_eq!(
                generated_code(&Locator::query(query_type, "x")),
                format!("await browser.{}(\"x\")", method)
            );
        }
    }

    #[test]
    fn test_generated_code_with_options() {
        assert_eq!(
            generated_code(&submit_form()),
            r#"await browser.findByRole("button", {"name":"Submit Form"})"#
        );
        assert_eq!(generated_code(&Locator::selector("a[href=\"x\"]")), r#"browser.$("a[href=\"x\"]")"#);
    }

    #[tokio::test]
    async fn test_semantic_query_found() {
        let driver = FakeDriver::new();
        let queries = FakeQueries::returning(vec![ElementRef::new("btn-1")]);
        let resolver = ElementResolver::new(Arc::new(queries));

        let result = resolver.find_element(&driver, &submit_form()).await.unwrap();
        assert_eq!(result.element, ElementRef::new("btn-1"));
        assert_eq!(result.query_description, "role \"button\" with name \"Submit Form\"");
    }

    #[tokio::test]
    async fn test_semantic_query_not_found() {
        let driver = FakeDriver::new();
        let resolver = ElementResolver::new(Arc::new(FakeQueries::returning(vec![])));

        let err = resolver
            .find_element(&driver, &Locator::query(QueryType::Text, "Nope"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Unable to find element with text \"Nope\""));

        let nullable = resolver
            .find_element_nullable(&driver, &Locator::query(QueryType::Text, "Nope"))
            .await
            .unwrap();
        assert!(nullable.element.is_none());
    }

    #[tokio::test]
    async fn test_multiple_matches_keep_first_line() {
        let driver = FakeDriver::new();
        let queries = FakeQueries::returning(vec![ElementRef::new("a"), ElementRef::new("b")]);
        let resolver = ElementResolver::new(Arc::new(queries));

        let err = resolver.find_element(&driver, &submit_form()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Found multiple elements"));
        assert!(!message.contains('\n'));
    }

    #[tokio::test]
    async fn test_wdio_selector_uses_driver_lookup() {
        let driver = FakeDriver::new().with_element("#submit", "el-7");
        let queries = FakeQueries::returning(vec![]);
        let resolver = ElementResolver::new(Arc::new(queries.clone()));

        let result = resolver.find_element(&driver, &Locator::selector("#submit")).await.unwrap();
        assert_eq!(result.element.to_json(), json!({ ELEMENT_KEY: "el-7" }));
        assert_eq!(queries.calls(), 0);

        let err = resolver.find_element(&driver, &Locator::selector("#missing")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_repeated_resolution_is_deterministic() {
        let driver = FakeDriver::new();
        let resolver = ElementResolver::new(Arc::new(FakeQueries::returning(vec![ElementRef::new("btn")])));

        let first = resolver.find_element(&driver, &submit_form()).await.unwrap();
        let second = resolver.find_element(&driver, &submit_form()).await.unwrap();
        assert_eq!(first.query_description, second.query_description);
        assert_eq!(first.generated_code, second.generated_code);
    }
}
