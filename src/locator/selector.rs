use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw selector translated into a W3C element location strategy.
///
/// Accepts the WebdriverIO selector dialect: CSS, XPath, `=Link text`,
/// `*=Partial link text`, `tag=Exact text` and `tag*=Partial text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    Css(String),
    XPath(String),
    LinkText(String),
    PartialLinkText(String),
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if trimmed.starts_with('/') || trimmed.starts_with("./") || trimmed.starts_with("../") || trimmed.starts_with('(')
        {
            return Selector::XPath(trimmed.to_string());
        }

        if let Some(text) = trimmed.strip_prefix("*=") {
            return Selector::PartialLinkText(text.to_string());
        }

        if let Some(text) = trimmed.strip_prefix('=') {
            return Selector::LinkText(text.to_string());
        }

        if let Some((tag, text, partial)) = split_tag_text(trimmed) {
            let literal = xpath_literal(text);
            return if partial {
                Selector::XPath(format!(".//{}[contains(normalize-space(.), {})]", tag, literal))
            } else {
                Selector::XPath(format!(".//{}[normalize-space(.) = {}]", tag, literal))
            };
        }

        Selector::Css(trimmed.to_string())
    }

    /// W3C `using` value
    pub fn using(&self) -> &'static str {
        match self {
            Selector::Css(_) => "css selector",
            Selector::XPath(_) => "xpath",
            Selector::LinkText(_) => "link text",
            Selector::PartialLinkText(_) => "partial link text",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Selector::Css(v) | Selector::XPath(v) | Selector::LinkText(v) | Selector::PartialLinkText(v) => v,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.using(), self.value())
    }
}

/// Split `tag=text` / `tag*=text` into the tag, the text and whether the
/// match is partial
fn split_tag_text(selector: &str) -> Option<(&str, &str, bool)> {
    let pos = selector.find(['=', '*'])?;
    let (tag, rest) = selector.split_at(pos);

    let is_tag = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !is_tag {
        return None;
    }

    if let Some(text) = rest.strip_prefix("*=") {
        Some((tag, text, true))
    } else {
        rest.strip_prefix('=').map(|text| (tag, text, false))
    }
}

/// Quote a string as an XPath literal
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('"') {
        format!("\"{}\"", text)
    } else if !text.contains('\'') {
        format!("'{}'", text)
    } else {
        let parts: Vec<String> = text.split('"').map(|part| format!("\"{}\"", part)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css() {
        assert_eq!(Selector::parse("button.submit-btn"), Selector::Css("button.submit-btn".into()));
        assert_eq!(Selector::parse("input[name=\"q\"]"), Selector::Css("input[name=\"q\"]".into()));
        assert_eq!(Selector::parse("a[href*=\"docs\"]"), Selector::Css("a[href*=\"docs\"]".into()));
        assert_eq!(Selector::parse("#main > p").using(), "css selector");
    }

    #[test]
    fn test_xpath() {
        assert_eq!(
            Selector::parse("//button[text()='Submit']"),
            Selector::XPath("//button[text()='Submit']".into())
        );
        assert_eq!(Selector::parse("(//a)[2]").using(), "xpath");
        assert_eq!(Selector::parse("./div").using(), "xpath");
    }

    #[test]
    fn test_link_text() {
        assert_eq!(Selector::parse("=Read more"), Selector::LinkText("Read more".into()));
        assert_eq!(Selector::parse("*=Read"), Selector::PartialLinkText("Read".into()));
    }

    #[test]
    fn test_element_with_text() {
        assert_eq!(
            Selector::parse("button=Submit"),
            Selector::XPath(".//button[normalize-space(.) = \"Submit\"]".into())
        );
        assert_eq!(
            Selector::parse("h1*=Welcome"),
            Selector::XPath(".//h1[contains(normalize-space(.), \"Welcome\")]".into())
        );
    }

    #[test]
    fn test_xpath_literal_quotes() {
        assert_eq!(xpath_literal("plain"), "\"plain\"");
        assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(xpath_literal("it's \"x\""), "concat(\"it's \", '\"', \"x\", '\"', \"\")");
    }
}
