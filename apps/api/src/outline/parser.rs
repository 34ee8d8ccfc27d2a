//! Outline Parser — splits raw provider text into typed pages.
//!
//! Pages are separated by `<page>` (any case). Text that contains no such
//! marker is split on the legacy `---` delimiter instead. Parsing never fails:
//! unknown tags degrade to `content` and blank fragments are dropped.
//!
//! A page's `index` is its position in the split list *before* blank
//! fragments are dropped, so indices can have gaps.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const LEGACY_DELIMITER: &str = "---";

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<page>").expect("page marker regex is valid"));

/// `[tag]` at the very start of a fragment.
static TYPE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\S+)\]").expect("type tag regex is valid"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Cover,
    #[default]
    Content,
    Summary,
}

impl PageType {
    /// Maps a tag token to a page type. Unknown tokens are `Content`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "封面" => PageType::Cover,
            "内容" => PageType::Content,
            "总结" => PageType::Summary,
            _ => PageType::Content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub index: usize,
    #[serde(rename = "type")]
    pub page_type: PageType,
    /// Trimmed fragment text, leading tag included.
    pub content: String,
}

pub fn parse_outline(text: &str) -> Vec<Page> {
    let fragments: Vec<&str> = if PAGE_MARKER.is_match(text) {
        PAGE_MARKER.split(text).collect()
    } else {
        text.split(LEGACY_DELIMITER).collect()
    };

    fragments
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let fragment = raw.trim();
            if fragment.is_empty() {
                return None;
            }
            Some(Page {
                index,
                page_type: detect_page_type(fragment),
                content: fragment.to_string(),
            })
        })
        .collect()
}

fn detect_page_type(fragment: &str) -> PageType {
    TYPE_TAG
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|tag| PageType::from_tag(tag.as_str()))
        .unwrap_or_default()
}
