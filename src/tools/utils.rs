use crate::error::{BrowserError, Result};

/// Validate that `url` is absolute and return it unchanged
pub fn validate_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    url::Url::parse(trimmed).map_err(|e| BrowserError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}

/// Quote a value as a JavaScript string literal
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Chain a method call onto element lookup code.
///
/// `browser.$("#a")` becomes `await browser.$("#a").click();`, while awaited
/// lookups are parenthesized: `await (await browser.findByText("a")).click();`
pub fn chain_call(element_code: &str, call: &str) -> String {
    if element_code.starts_with("await") {
        format!("await ({}).{};", element_code, call)
    } else {
        format!("await {}.{};", element_code, call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url("https://example.com").unwrap(), "https://example.com");
        assert_eq!(validate_url("  about:blank ").unwrap(), "about:blank");
        assert!(matches!(validate_url("example.com"), Err(BrowserError::InvalidUrl { .. })));
        assert!(validate_url("").is_err());
        assert!(validate_url("/relative/path").is_err());
    }

    #[test]
    fn test_js_string() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string("say \"hi\""), r#""say \"hi\"""#);
    }

    #[test]
    fn test_chain_call() {
        assert_eq!(chain_call("browser.$(\"#go\")", "click()"), "await browser.$(\"#go\").click();");
        assert_eq!(
            chain_call("await browser.findByText(\"Go\")", "moveTo()"),
            "await (await browser.findByText(\"Go\")).moveTo();"
        );
    }
}
