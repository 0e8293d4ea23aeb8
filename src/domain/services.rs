//! Carrier text cleanup and the follow-up actions derived from it.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<[^>]*>").expect("valid tag pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Turns carrier text such as `call&nbsp;us<br>at&nbsp;...` into plain text.
pub fn normalize_status_text(raw: &str) -> String {
    let decoded = raw
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    let without_tags = TAG.replace_all(&decoded, " ");
    WHITESPACE.replace_all(without_tags.trim(), " ").into_owned()
}

struct ActionRule {
    matches: fn(&str) -> bool,
    action: &'static str,
}

const ACTION_RULES: &[ActionRule] = &[
    ActionRule {
        matches: |status| status == "Receipt of data about consignment before posting.",
        action: "The parcel has not been handed over for transport",
    },
    ActionRule {
        matches: |status| status.starts_with("For more information please call information line CP"),
        action: "Please file a complaint with the Czech Post",
    },
];

/// Follow-up for a normalised status, if the status needs one.
pub fn action_for_status(status: &str) -> Option<&'static str> {
    ACTION_RULES
        .iter()
        .find(|rule| (rule.matches)(status))
        .map(|rule| rule.action)
}
