use std::panic::{self, AssertUnwindSafe};

use scraper::{Html, Node};
use tracing::{debug, warn};

/// Elements whose text content is never shown to a reader.
const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// Converts markup into a single line of visible text.
///
/// Script and style payloads are dropped, sibling text nodes are separated by
/// one space and all whitespace runs collapse to a single space. The function
/// never fails: if the parser gives up, the raw input is returned unchanged.
pub fn normalize(markup: &str) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| visible_text(markup))) {
        Ok(text) => text,
        Err(_) => {
            warn!(
                length = markup.len(),
                "markup could not be parsed, falling back to raw text"
            );
            markup.to_string()
        }
    }
}

fn visible_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    if !fragment.errors.is_empty() {
        debug!(
            error_count = fragment.errors.len(),
            "markup parsed with recoverable errors"
        );
    }

    let mut pieces: Vec<&str> = Vec::new();
    for node in fragment.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    collapse_whitespace(&pieces.join(" "))
}

/// Collapses every whitespace run into one space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
