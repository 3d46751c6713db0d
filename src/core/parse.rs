//! Heuristic classifier for raw binding path strings.
//!
//! Binding paths arrive in several ambiguous shapes with no formal grammar:
//!
//! - `"Head : Skinned Mesh Renderer.Blend Shape.Smile"` (display form)
//! - `"Armature/Head.rotation"` (hierarchy + property)
//! - `"Head"` (bare object)
//!
//! [`parse`] splits such a string into object/separator/property segments by
//! ordered lexical rules, first match wins. Parsing is total: every non-empty
//! input resolves to some classification, with whole-string-as-object as the
//! fallback. Only empty input yields `is_valid = false`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::text::{TextMatcher, TextScript};

/// Decomposition of a raw binding path. Derived fresh on every preview pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPath {
    pub object_name: String,
    pub separator_text: String,
    pub property_name: String,
    pub has_object_separator: bool,
    pub is_valid: bool,
    pub script: TextScript,
}

impl ParsedPath {
    fn invalid() -> Self {
        Self {
            object_name: String::new(),
            separator_text: String::new(),
            property_name: String::new(),
            has_object_separator: false,
            is_valid: false,
            script: TextScript::Other,
        }
    }

    fn object_only(text: &str, script: TextScript) -> Self {
        Self {
            object_name: text.to_string(),
            separator_text: String::new(),
            property_name: String::new(),
            has_object_separator: false,
            is_valid: true,
            script,
        }
    }
}

/// Display-form separator between object and component segments.
const OBJECT_SEPARATOR: &str = " : ";

/// Parse a raw binding path into object/separator/property segments.
///
/// Ordered rules, first match wins:
/// 1. `" : "` present: object is the text before the first occurrence; the
///    property is the text after the last non-trailing `.` of the remainder.
/// 2. `/` present: split at the last slash; a dotted tail splits at its last
///    dot, otherwise the tail must look like a property to count as one.
/// 3. `.` present: split at the last dot when the tail looks like a property.
/// 4. No separator: short property-looking strings classify as properties,
///    everything else is an object name (so root objects like `"Head"` stay
///    objects).
pub fn parse(raw: &str, matcher: &TextMatcher) -> ParsedPath {
    if raw.is_empty() {
        return ParsedPath::invalid();
    }

    let normalized = matcher.normalize(raw);
    let text = normalized.as_ref();
    let script = TextScript::of(text);

    // Rule 1: display-form "Object : Component.Property"
    if let Some(sep_idx) = text.find(OBJECT_SEPARATOR) {
        let object = &text[..sep_idx];
        let remainder = &text[sep_idx + OBJECT_SEPARATOR.len()..];

        let (separator, property) = match last_non_trailing_dot(remainder) {
            Some(dot) => (
                format!("{}{}", OBJECT_SEPARATOR, &remainder[..=dot]),
                remainder[dot + 1..].to_string(),
            ),
            None => (OBJECT_SEPARATOR.to_string(), remainder.to_string()),
        };

        return ParsedPath {
            object_name: object.to_string(),
            separator_text: separator,
            property_name: property,
            has_object_separator: true,
            is_valid: true,
            script,
        };
    }

    // Rule 2: hierarchy path "Armature/Head.rotation"
    if let Some(slash) = text.rfind('/') {
        let tail = &text[slash + 1..];

        if let Some(dot) = last_non_trailing_dot(tail) {
            let dot_abs = slash + 1 + dot;
            return ParsedPath {
                object_name: text[..dot_abs].to_string(),
                separator_text: ".".to_string(),
                property_name: text[dot_abs + 1..].to_string(),
                has_object_separator: false,
                is_valid: true,
                script,
            };
        }

        if looks_like_property(tail) {
            return ParsedPath {
                object_name: text[..slash].to_string(),
                separator_text: "/".to_string(),
                property_name: tail.to_string(),
                has_object_separator: false,
                is_valid: true,
                script,
            };
        }

        return ParsedPath::object_only(text, script);
    }

    // Rule 3: dotted "Head.rotation"
    if let Some(dot) = last_non_trailing_dot(text) {
        let tail = &text[dot + 1..];
        if looks_like_property(tail) {
            return ParsedPath {
                object_name: text[..dot].to_string(),
                separator_text: ".".to_string(),
                property_name: tail.to_string(),
                has_object_separator: false,
                is_valid: true,
                script,
            };
        }
        return ParsedPath::object_only(text, script);
    }

    // Rule 4: no separator at all
    if text.chars().count() <= 4 && looks_like_property(text) {
        return ParsedPath {
            object_name: String::new(),
            separator_text: String::new(),
            property_name: text.to_string(),
            has_object_separator: false,
            is_valid: true,
            script,
        };
    }

    ParsedPath::object_only(text, script)
}

/// Byte index of the last `.` that has at least one character after it.
fn last_non_trailing_dot(text: &str) -> Option<usize> {
    match text.rfind('.') {
        Some(idx) if idx + 1 < text.len() => Some(idx),
        _ => None,
    }
}

// ============================================================================
// Property-name heuristic
// ============================================================================

/// Transform/animation tokens plus common facial blend-shape English words.
/// A candidate matches when it equals or is prefixed by one of these,
/// case-insensitively.
const LATIN_PROPERTY_TOKENS: &[&str] = &[
    "x", "y", "z", "w",
    "rotation", "position", "scale", "weight",
    "blend", "alpha", "color", "intensity",
    "enabled", "active", "visible",
    "smile", "blink", "wink", "frown", "angry", "sad", "joy", "fun",
    "surprised", "mouth", "eye", "brow", "cheek", "jaw", "tongue",
];

/// Japanese facial/blend-shape vocabulary (VRM-style channel names).
const EASTERN_PROPERTY_TOKENS: &[&str] = &[
    "笑い", "笑顔", "怒り", "悲しい", "楽しい", "驚き",
    "まばたき", "ウィンク", "にやり", "ほほえみ",
    "口", "目", "眉", "頬", "舌",
    "あ", "い", "う", "え", "お", "ん",
];

static IDENT_WITH_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    // Identifier ending in a digit sequence or an L/R side marker,
    // e.g. `Smile01`, `BlinkL`, `Eye_R`
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(?:[0-9]+|[LR])$").unwrap()
});

static CAMEL_CASE: LazyLock<Regex> = LazyLock::new(|| {
    // Plain camelCase: lowercase head, at least one interior hump
    Regex::new(r"^[a-z]+(?:[A-Z][a-z0-9]*)+$").unwrap()
});

static TRAILING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+$").unwrap());

/// One entry in the ordered heuristic table. `name` exists so a rejected or
/// accepted candidate can be traced to the rule that decided it.
pub struct PropertyRule {
    pub name: &'static str,
    applies: fn(&str, TextScript) -> bool,
}

/// Ordered rule table behind [`looks_like_property`]. Extending the heuristic
/// means adding a row here, not editing the parser.
pub static PROPERTY_RULES: &[PropertyRule] = &[
    PropertyRule {
        name: "latin-token",
        applies: |text, _| {
            let lower = text.to_lowercase();
            LATIN_PROPERTY_TOKENS
                .iter()
                .any(|t| lower == *t || lower.starts_with(t))
        },
    },
    PropertyRule {
        name: "ident-suffix",
        applies: |text, _| IDENT_WITH_SUFFIX.is_match(text),
    },
    PropertyRule {
        name: "short-latin",
        applies: |text, _| {
            text.chars().count() <= 4
                && text.chars().all(|c| c.is_ascii_alphanumeric())
                && text.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        },
    },
    PropertyRule {
        name: "camel-case",
        applies: |text, _| CAMEL_CASE.is_match(text),
    },
    PropertyRule {
        name: "eastern-token",
        applies: |text, script| {
            matches!(script, TextScript::Eastern | TextScript::Mixed)
                && EASTERN_PROPERTY_TOKENS.iter().any(|t| {
                    // Single-kana tokens (vowel mouth shapes) only match the
                    // whole string; substring matching would swallow most
                    // Japanese text.
                    if t.chars().count() == 1 {
                        text == *t
                    } else {
                        text.contains(t)
                    }
                })
        },
    },
    PropertyRule {
        name: "eastern-side-marker",
        applies: |text, script| {
            matches!(script, TextScript::Eastern | TextScript::Mixed)
                && ["L", "R", "left", "right", "左", "右"]
                    .iter()
                    .any(|m| text.ends_with(m))
        },
    },
    PropertyRule {
        name: "eastern-trailing-digits",
        applies: |text, script| {
            matches!(script, TextScript::Eastern | TextScript::Mixed)
                && TRAILING_DIGITS.is_match(text)
        },
    },
    PropertyRule {
        name: "short-eastern",
        applies: |text, script| {
            script == TextScript::Eastern && text.chars().count() <= 6
        },
    },
];

/// Heuristic verdict on whether `text` reads as a property name rather than
/// an object name. Intentionally lossy: an object named `Cube001` also
/// matches `ident-suffix`. That is a documented limitation of the classifier,
/// not a bug to eliminate — callers only consult this where a wrong guess is
/// recoverable (preview shows the result before anything mutates).
pub fn looks_like_property(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let script = TextScript::of(text);
    PROPERTY_RULES.iter().any(|rule| (rule.applies)(text, script))
}
