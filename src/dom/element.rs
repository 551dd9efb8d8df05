use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents a DOM element node as serialized by the snapshot script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name, lowercase (e.g., "div", "button", "input")
    pub tag_name: String,

    /// Element attributes in document order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Text directly inside this element, whitespace-collapsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,

    /// Whether the element is rendered
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: IndexMap::new(),
            text_content: None,
            children: Vec::new(),
            is_visible: true,
        }
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: set visibility
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    /// Own text, trimmed; `None` when empty
    pub fn text(&self) -> Option<&str> {
        self.text_content.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Whether this element's content never belongs in a snapshot
    pub fn is_non_content(&self) -> bool {
        matches!(self.tag_name.as_str(), "script" | "style" | "noscript" | "svg" | "template")
    }

    /// Count this node and all descendants
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ElementNode::count).sum::<usize>()
    }
}
