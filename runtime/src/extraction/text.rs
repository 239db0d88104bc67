//! HTML to plain text flattening.
//!
//! Synchronous on purpose: `scraper`'s DOM types are `!Send`, so the parsed
//! document must never be held across an `.await`.

use scraper::node::Node;
use scraper::Html;

/// Elements whose text content is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Flatten an HTML document into its visible text.
///
/// Text nodes are visited in document order, each is trimmed, empty ones are
/// dropped, and the rest are joined with `\n`. Script, style and template
/// content and comments are skipped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut lines: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}
