//! Unicode-aware text matching primitives.
//!
//! All binding-path comparisons go through [`TextMatcher`] so that search,
//! compare, and replace agree on one normalization policy. Normalization is
//! Unicode canonical composition (NFC); composed vs. decomposed input is a
//! real hazard for Japanese blend-shape names pasted from different editors.

use std::borrow::Cow;

use unicode_normalization::{is_nfc, UnicodeNormalization};

/// Dominant script of a piece of binding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextScript {
    Latin,
    Eastern,
    Mixed,
    Other,
}

/// Punctuation that carries no script information. Ignored when deciding
/// whether text falls into `Other`.
const NEUTRAL_CHARS: &[char] = &['.', '-', '_', ' '];

impl TextScript {
    /// Classify text by scanning code points. Hiragana, Katakana, and CJK
    /// ideographs count as Eastern; ASCII letters and digits count as Latin.
    pub fn of(text: &str) -> TextScript {
        let mut has_latin = false;
        let mut has_eastern = false;

        for c in text.chars() {
            if NEUTRAL_CHARS.contains(&c) {
                continue;
            }
            if c.is_ascii_alphanumeric() {
                has_latin = true;
            } else if is_eastern_char(c) {
                has_eastern = true;
            }
        }

        match (has_latin, has_eastern) {
            (true, true) => TextScript::Mixed,
            (false, true) => TextScript::Eastern,
            (true, false) => TextScript::Latin,
            (false, false) => TextScript::Other,
        }
    }
}

/// Hiragana, Katakana (incl. phonetic extensions and halfwidth forms), and
/// the common CJK ideograph blocks.
pub(crate) fn is_eastern_char(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{31F0}'..='\u{31FF}' // Katakana phonetic extensions
        | '\u{FF66}'..='\u{FF9D}' // Halfwidth Katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
    )
}

/// Normalization-aware equality/contains/replace over binding text.
#[derive(Debug, Clone, Copy)]
pub struct TextMatcher {
    /// Apply NFC before every comparison. Off means raw byte comparison,
    /// which is faster but mis-compares decomposed Japanese input.
    pub normalize_unicode: bool,
}

impl Default for TextMatcher {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
        }
    }
}

impl TextMatcher {
    pub fn new(normalize_unicode: bool) -> Self {
        Self { normalize_unicode }
    }

    /// NFC-normalize when enabled, identity otherwise. Total and idempotent:
    /// `normalize(normalize(s)) == normalize(s)` for all `s`.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !self.normalize_unicode || is_nfc(text) {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.nfc().collect())
        }
    }

    pub fn equals(&self, a: &str, b: &str, case_sensitive: bool) -> bool {
        let a = self.normalize(a);
        let b = self.normalize(b);
        if case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }

    pub fn contains(&self, haystack: &str, needle: &str, case_sensitive: bool) -> bool {
        let haystack = self.normalize(haystack);
        let needle = self.normalize(needle);
        if case_sensitive {
            haystack.contains(needle.as_ref())
        } else {
            find_ignore_case(&haystack, &needle).is_some()
        }
    }

    /// Replace `needle` with `replacement` in `haystack`.
    ///
    /// Asymmetry inherited from the original tool and kept on purpose:
    /// case-sensitive replace hits every occurrence, case-insensitive replace
    /// hits only the first. Callers relying on insensitive matching should
    /// expect a single substitution per pass.
    pub fn replace(
        &self,
        haystack: &str,
        needle: &str,
        replacement: &str,
        case_sensitive: bool,
    ) -> String {
        let haystack = self.normalize(haystack);
        let needle = self.normalize(needle);

        if case_sensitive {
            haystack.replace(needle.as_ref(), replacement)
        } else {
            match find_ignore_case(&haystack, &needle) {
                Some((start, end)) => {
                    let mut out = String::with_capacity(haystack.len());
                    out.push_str(&haystack[..start]);
                    out.push_str(replacement);
                    out.push_str(&haystack[end..]);
                    out
                }
                None => haystack.into_owned(),
            }
        }
    }
}

/// Locate the first case-insensitive occurrence of `needle` in `haystack`,
/// returning the matched byte range. Comparison lowercases char-by-char, so
/// multi-char lowercasings (e.g. 'İ') compare correctly without assuming the
/// lowercased string has the same byte layout.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return Some((0, 0));
    }
    let needle_lc: Vec<char> = needle.chars().flat_map(|c| c.to_lowercase()).collect();

    for (start, _) in haystack.char_indices() {
        let mut matched = 0usize;
        let mut end = None;

        'scan: for (off, c) in haystack[start..].char_indices() {
            for lc in c.to_lowercase() {
                if matched >= needle_lc.len() || needle_lc[matched] != lc {
                    break 'scan;
                }
                matched += 1;
            }
            if matched == needle_lc.len() {
                end = Some(start + off + c.len_utf8());
                break;
            }
        }

        if let Some(end) = end {
            return Some((start, end));
        }
    }
    None
}
