//! Syntactic and collision checks for proposed renames.
//!
//! Checks run in a fixed order. The first Error wins and stops the pass;
//! warnings are collected but never block, and an Error found after a
//! warning supersedes it.

use crate::core::binding::{CurveBinding, Validation};
use crate::core::text::{is_eastern_char, TextMatcher};

/// Characters that never belong in a property name.
const FORBIDDEN_PROPERTY_CHARS: &[char] = &[
    ':', '/', '\\', '<', '>', '|', '?', '*', '"', '\t', '\n', '\r',
];

/// Soft limit beyond which matching and display get noticeably slow.
const LENGTH_WARNING_LIMIT: usize = 100;

/// A proposed replacement identity for one binding.
pub struct RenameCandidate<'a> {
    pub original: &'a CurveBinding,
    pub new_path: &'a str,
    pub new_property: &'a str,
}

/// Validate a rename candidate against the owner's current binding list.
/// `owner_bindings` is the full list from one scan pass; the binding being
/// replaced is excluded from the duplicate check.
pub fn validate_rename(
    candidate: &RenameCandidate,
    owner_bindings: &[CurveBinding],
    matcher: &TextMatcher,
) -> Validation {
    let mut warning: Option<Validation> = None;

    // 1. Empty path
    if candidate.new_path.is_empty() {
        return Validation::error("New path is empty");
    }

    // 2. Empty property name
    if candidate.new_property.is_empty() {
        return Validation::error("New property name is empty");
    }

    // 3. Forbidden characters
    if let Some(c) = candidate
        .new_property
        .chars()
        .find(|c| FORBIDDEN_PROPERTY_CHARS.contains(c))
    {
        return Validation::error(format!(
            "Property name contains forbidden character {:?}",
            c
        ));
    }

    // 4. Eastern script without normalization: comparisons may silently miss
    if !matcher.normalize_unicode
        && (candidate.new_path.chars().any(is_eastern_char)
            || candidate.new_property.chars().any(is_eastern_char))
    {
        warning.get_or_insert(Validation::warning(
            "Eastern-script text with Unicode normalization disabled; matches may be missed",
        ));
    }

    // 5. Length performance hint
    if candidate.new_path.chars().count() > LENGTH_WARNING_LIMIT
        || candidate.new_property.chars().count() > LENGTH_WARNING_LIMIT
    {
        warning.get_or_insert(Validation::warning(format!(
            "Name longer than {} characters; matching will be slow",
            LENGTH_WARNING_LIMIT
        )));
    }

    // 6. Structural property-name errors. Plain spaces are legal (the
    //    display-form prefix "Blend Shape." contains one); control
    //    characters, ':' and '/' are not. ':' and '/' are already caught by
    //    the forbidden list, control chars are the new ground here.
    if candidate.new_property.starts_with('.')
        || candidate.new_property.ends_with('.')
        || candidate.new_property.chars().any(|c| c.is_control())
    {
        return Validation::error("Property name has a leading/trailing dot or control characters");
    }

    // 7. Duplicate binding on the same owner (excluding the one replaced).
    //    Non-blocking: both records may still be applied, the collision
    //    outcome at apply time is implementation-defined.
    let duplicate = owner_bindings.iter().any(|b| {
        b != candidate.original
            && b.path == candidate.new_path
            && b.property == candidate.new_property
            && b.target_type == candidate.original.target_type
    });
    if duplicate {
        warning.get_or_insert(Validation::warning(format!(
            "Binding already exists: {}.{}",
            candidate.new_path, candidate.new_property
        )));
    }

    warning.unwrap_or_else(Validation::valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::ValidationStatus;

    fn binding(path: &str, property: &str) -> CurveBinding {
        CurveBinding::new(path, property, "SkinnedMeshRenderer")
    }

    fn validate(new_path: &str, new_property: &str) -> Validation {
        let original = binding("Head", "blendShape.Smile");
        validate_rename(
            &RenameCandidate {
                original: &original,
                new_path,
                new_property,
            },
            &[],
            &TextMatcher::default(),
        )
    }

    #[test]
    fn empty_path_is_error() {
        assert_eq!(validate("", "blendShape.Smile").status, ValidationStatus::Error);
    }

    #[test]
    fn empty_property_is_error() {
        assert_eq!(validate("Head", "").status, ValidationStatus::Error);
    }

    #[test]
    fn forbidden_characters_are_errors() {
        for bad in ["a:b", "a/b", "a\\b", "a<b", "a|b", "weight?", "a*b", "a\"b", "a\tb"] {
            assert_eq!(
                validate("Head", bad).status,
                ValidationStatus::Error,
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn display_form_property_with_space_is_valid() {
        assert_eq!(
            validate("Head", "Blend Shape.Smile").status,
            ValidationStatus::Valid
        );
    }

    #[test]
    fn leading_or_trailing_dot_is_error() {
        assert_eq!(validate("Head", ".weight").status, ValidationStatus::Error);
        assert_eq!(validate("Head", "weight.").status, ValidationStatus::Error);
    }

    #[test]
    fn eastern_without_normalization_warns() {
        let original = binding("Head", "blendShape.笑い");
        let v = validate_rename(
            &RenameCandidate {
                original: &original,
                new_path: "Head",
                new_property: "blendShape.笑顔",
            },
            &[],
            &TextMatcher::new(false),
        );
        assert_eq!(v.status, ValidationStatus::Warning);
    }

    #[test]
    fn overlong_name_warns() {
        let long = "x".repeat(150);
        let v = validate("Head", &long);
        assert_eq!(v.status, ValidationStatus::Warning);
    }

    #[test]
    fn error_supersedes_earlier_warning() {
        // Overlong AND trailing dot: the structural error wins even though
        // the length warning fires first.
        let long = format!("{}.", "x".repeat(150));
        let v = validate("Head", &long);
        assert_eq!(v.status, ValidationStatus::Error);
    }

    #[test]
    fn duplicate_binding_warns_but_does_not_block() {
        let original = binding("Head", "blendShape.Smile");
        let existing = binding("Head", "blendShape.Grin");
        let v = validate_rename(
            &RenameCandidate {
                original: &original,
                new_path: "Head",
                new_property: "blendShape.Grin",
            },
            &[original.clone(), existing],
            &TextMatcher::default(),
        );
        assert_eq!(v.status, ValidationStatus::Warning);
        assert!(v.message.unwrap().contains("already exists"));
    }

    #[test]
    fn replaced_binding_is_excluded_from_duplicate_check() {
        let original = binding("Head", "blendShape.Smile");
        let v = validate_rename(
            &RenameCandidate {
                original: &original,
                new_path: "Head",
                new_property: "blendShape.Smile",
            },
            &[original.clone()],
            &TextMatcher::default(),
        );
        assert_eq!(v.status, ValidationStatus::Valid);
    }
}
