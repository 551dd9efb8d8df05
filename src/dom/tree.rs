use crate::browser::driver::{BrowserDriver, ElementRef};
use crate::dom::element::ElementNode;
use crate::dom::{DEFAULT_ATTRS, DEFAULT_TAGS, SnapshotOptions};
use crate::error::{BrowserError, Result};
use std::collections::{BTreeSet, HashSet};

const DOM_SNAPSHOT_JS: &str = include_str!("dom_snapshot.js");

/// Deepest element level the snapshot script descends to. Each level nests
/// two JSON values, which keeps the response under serde_json's recursion limit.
pub const MAX_SNAPSHOT_DEPTH: usize = 50;

/// Represents the DOM tree of a page or of one element's subtree
#[derive(Debug, Clone)]
pub struct DomTree {
    /// Root element of the DOM tree
    pub root: ElementNode,
}

/// Outcome of rendering a [`DomTree`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedSnapshot {
    /// Indented outline of the kept elements
    pub outline: String,
    /// Tags that were present but filtered out
    pub omitted_tags: BTreeSet<String>,
    /// Attributes that were present but filtered out
    pub omitted_attrs: BTreeSet<String>,
    /// Number of text values that were shortened
    pub truncated: usize,
    pub max_text_length: usize,
}

impl RenderedSnapshot {
    /// Outline followed by notes on what was left out
    pub fn to_text(&self) -> String {
        let mut notes = Vec::new();
        if !self.omitted_tags.is_empty() {
            notes.push(format!(
                "Omitted tags: {}",
                self.omitted_tags.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        if !self.omitted_attrs.is_empty() {
            notes.push(format!(
                "Omitted attributes: {}",
                self.omitted_attrs.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        if self.truncated > 0 {
            notes.push(format!(
                "Truncated text in {} element(s) to {} characters",
                self.truncated, self.max_text_length
            ));
        }

        if notes.is_empty() {
            self.outline.clone()
        } else {
            format!("{}\n\n{}", self.outline, notes.join("\n"))
        }
    }
}

struct Filter {
    tags: HashSet<String>,
    attrs: HashSet<String>,
    excluded_attrs: HashSet<String>,
    truncate: bool,
    max_text_length: usize,
}

impl Filter {
    fn new(options: &SnapshotOptions) -> Self {
        let lower = |items: &Option<Vec<String>>| -> Vec<String> {
            items
                .iter()
                .flatten()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let mut tags: HashSet<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
        tags.extend(lower(&options.include_tags));
        for tag in lower(&options.exclude_tags) {
            tags.remove(&tag);
        }

        let mut attrs: HashSet<String> = DEFAULT_ATTRS.iter().map(|a| a.to_string()).collect();
        attrs.extend(lower(&options.include_attrs));
        let excluded_attrs: HashSet<String> = lower(&options.exclude_attrs).into_iter().collect();
        for attr in &excluded_attrs {
            attrs.remove(attr);
        }

        Self {
            tags,
            attrs,
            excluded_attrs,
            truncate: options.truncate_text.unwrap_or(true),
            max_text_length: options.max_text_length.unwrap_or(crate::dom::DEFAULT_MAX_TEXT_LENGTH),
        }
    }

    fn keeps_tag(&self, node: &ElementNode) -> bool {
        self.tags.contains(&node.tag_name)
            || node.attributes.contains_key("role")
            || node.attributes.contains_key("data-testid")
    }

    fn keeps_attr(&self, name: &str) -> bool {
        if self.excluded_attrs.contains(name) {
            return false;
        }
        self.attrs.contains(name) || name.starts_with("aria-")
    }
}

impl DomTree {
    /// Create a new DomTree
    pub fn new(root: ElementNode) -> Self {
        Self { root }
    }

    /// Capture the DOM of the current page, or of `element` and its descendants
    pub async fn capture(driver: &dyn BrowserDriver, element: Option<&ElementRef>) -> Result<Self> {
        let args = vec![
            element.map(ElementRef::to_json).unwrap_or(serde_json::Value::Null),
            serde_json::Value::from(MAX_SNAPSHOT_DEPTH),
        ];
        let value = driver
            .execute_script(DOM_SNAPSHOT_JS, args)
            .await
            .map_err(|e| BrowserError::SnapshotFailed(format!("Failed to execute DOM snapshot script: {}", e)))?;

        let root: ElementNode = serde_json::from_value(value)
            .map_err(|e| BrowserError::SnapshotFailed(format!("Failed to parse DOM snapshot: {}", e)))?;

        Ok(Self::new(root))
    }

    /// Count total elements in the tree
    pub fn count_elements(&self) -> usize {
        self.root.count()
    }

    /// Render the tree as an indented outline
    pub fn render(&self, options: &SnapshotOptions) -> RenderedSnapshot {
        let filter = Filter::new(options);
        let mut rendered = RenderedSnapshot {
            max_text_length: filter.max_text_length,
            ..Default::default()
        };
        let mut lines = Vec::new();
        render_node(&self.root, 0, true, &filter, &mut rendered, &mut lines);
        rendered.outline = lines.join("\n");
        rendered
    }
}

fn render_node(
    node: &ElementNode,
    depth: usize,
    parent_visible: bool,
    filter: &Filter,
    rendered: &mut RenderedSnapshot,
    lines: &mut Vec<String>,
) {
    if node.is_non_content() {
        return;
    }

    let indent = "  ".repeat(depth);
    let child_depth = if filter.keeps_tag(node) {
        let mut line = format!("{}- {}", indent, node.tag_name);

        let mut attrs = Vec::new();
        for (name, value) in &node.attributes {
            if filter.keeps_attr(name) {
                attrs.push(format!("{}=\"{}\"", name, truncate(value, filter, rendered)));
            } else {
                rendered.omitted_attrs.insert(name.clone());
            }
        }
        if !attrs.is_empty() {
            line.push_str(&format!(" [{}]", attrs.join(" ")));
        }
        if parent_visible && !node.is_visible {
            line.push_str(" [hidden]");
        }
        if let Some(text) = node.text() {
            line.push_str(&format!(": \"{}\"", truncate(text, filter, rendered)));
        }

        lines.push(line);
        depth + 1
    } else {
        rendered.omitted_tags.insert(node.tag_name.clone());
        if let Some(text) = node.text() {
            let hidden = if parent_visible && !node.is_visible { " [hidden]" } else { "" };
            lines.push(format!("{}- text{}: \"{}\"", indent, hidden, truncate(text, filter, rendered)));
        }
        depth
    };

    for child in &node.children {
        render_node(child, child_depth, node.is_visible, filter, rendered, lines);
    }
}

fn truncate(text: &str, filter: &Filter, rendered: &mut RenderedSnapshot) -> String {
    let escaped = text.replace('"', "\\\"");
    if !filter.truncate || escaped.chars().count() <= filter.max_text_length {
        return escaped;
    }
    rendered.truncated += 1;
    let cut: String = escaped.chars().take(filter.max_text_length).collect();
    format!("{}...", cut)
}
