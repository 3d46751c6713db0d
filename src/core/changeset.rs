//! Preview construction: turn a from/to request into validated change records.

use serde::{Deserialize, Serialize};

use crate::core::binding::{BindingKind, ChangeRecord, Curve, CurveBinding};
use crate::core::clip::CurveHost;
use crate::core::error::{Error, Result};
use crate::core::text::TextMatcher;
use crate::core::validate::{validate_rename, RenameCandidate};

/// What part of the binding identity a rename targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameMode {
    /// Substring match/replace over the whole object path string.
    Object,
    /// Exact match on the channel behind a blend-shape prefix.
    Property,
}

impl RenameMode {
    pub fn from_str(value: &str) -> Result<Self> {
        match value {
            "object" => Ok(RenameMode::Object),
            "property" => Ok(RenameMode::Property),
            other => Err(Error::validation_invalid_argument(
                "mode",
                "Expected 'object' or 'property'",
                Some(other.to_string()),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenameMode::Object => "object",
            RenameMode::Property => "property",
        }
    }
}

/// A from/to rename request with its matching options.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub mode: RenameMode,
    pub from: String,
    pub to: String,
    pub case_sensitive: bool,
}

impl RenameRequest {
    /// Reject unusable input before any preview state is touched.
    pub fn validate(&self, matcher: &TextMatcher) -> Result<()> {
        if self.from.is_empty() {
            return Err(Error::validation_missing_argument(vec!["from".to_string()]));
        }
        if self.to.is_empty() {
            return Err(Error::validation_missing_argument(vec!["to".to_string()]));
        }
        if matcher.equals(&self.from, &self.to, self.case_sensitive) {
            return Err(Error::validation_invalid_argument(
                "to",
                "Search and replacement text are identical",
                Some(self.to.clone()),
            ));
        }
        Ok(())
    }
}

/// Build one change record for a binding, or `None` when the request does
/// not match it.
///
/// Object mode is a substring replace over the entire path string: a `from`
/// value that also appears incidentally elsewhere in the path is replaced
/// too. That mirrors the original tool and is documented behavior, not a
/// matching bug.
///
/// Property mode only ever fires on the two fixed blend-shape prefixes; the
/// channel behind the prefix must equal `from` exactly.
pub fn build_change(
    owner_id: &str,
    binding: &CurveBinding,
    curve: Curve,
    owner_bindings: &[CurveBinding],
    request: &RenameRequest,
    matcher: &TextMatcher,
) -> Option<ChangeRecord> {
    let (new_path, new_property) = match request.mode {
        RenameMode::Object => {
            if !matcher.contains(&binding.path, &request.from, request.case_sensitive) {
                return None;
            }
            let new_path = matcher.replace(
                &binding.path,
                &request.from,
                &request.to,
                request.case_sensitive,
            );
            (new_path, binding.property.clone())
        }
        RenameMode::Property => match BindingKind::of(binding) {
            BindingKind::BlendShape { prefix, channel } => {
                if !matcher.equals(&channel, &request.from, request.case_sensitive) {
                    return None;
                }
                (binding.path.clone(), format!("{}{}", prefix, request.to))
            }
            BindingKind::Plain => return None,
        },
    };

    let validation = validate_rename(
        &RenameCandidate {
            original: binding,
            new_path: &new_path,
            new_property: &new_property,
        },
        owner_bindings,
        matcher,
    );

    Some(ChangeRecord {
        owner_id: owner_id.to_string(),
        binding: binding.clone(),
        new_path,
        new_property,
        new_curve: curve,
        validation,
    })
}

/// Run a rename preview across a batch of owners. Pure with respect to the
/// owners: nothing is mutated, records carry the original keyframes for the
/// later apply.
pub fn preview<H: CurveHost>(
    owners: &[H],
    request: &RenameRequest,
    matcher: &TextMatcher,
) -> Result<Vec<ChangeRecord>> {
    request.validate(matcher)?;

    let mut records = Vec::new();
    for owner in owners {
        let bindings = owner.list_bindings();
        for binding in &bindings {
            let curve = owner.curve(binding).unwrap_or_default();
            if let Some(record) =
                build_change(owner.id(), binding, curve, &bindings, request, matcher)
            {
                records.push(record);
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::{Keyframe, ValidationStatus};
    use crate::core::clip::{BindingEntry, Clip};

    fn request(mode: RenameMode, from: &str, to: &str) -> RenameRequest {
        RenameRequest {
            mode,
            from: from.to_string(),
            to: to.to_string(),
            case_sensitive: true,
        }
    }

    fn clip_with(bindings: &[(&str, &str)]) -> Clip {
        Clip::in_memory(
            "test",
            bindings
                .iter()
                .map(|(path, property)| BindingEntry {
                    binding: CurveBinding::new(*path, *property, "SkinnedMeshRenderer"),
                    keys: vec![Keyframe { time: 0.0, value: 1.0 }],
                })
                .collect(),
        )
    }

    #[test]
    fn object_mode_replaces_every_occurrence_in_the_path() {
        let clips = [clip_with(&[(
            "Eye_Blink_L : Skinned Mesh Renderer.Blend Shape.Eye_Blink_L",
            "weight",
        )])];

        let records = preview(
            &clips,
            &request(RenameMode::Object, "Eye_Blink_L", "BlinkLeft"),
            &TextMatcher::default(),
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].new_path,
            "BlinkLeft : Skinned Mesh Renderer.Blend Shape.BlinkLeft"
        );
        assert!(records[0].will_change());
    }

    #[test]
    fn object_mode_skips_non_matching_paths() {
        let clips = [clip_with(&[("Armature/Head", "rotation.x")])];
        let records = preview(
            &clips,
            &request(RenameMode::Object, "Tail", "X"),
            &TextMatcher::default(),
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn property_mode_matches_exact_channel_behind_prefix() {
        let clips = [clip_with(&[
            ("Body", "blendShape.Smile"),
            ("Body", "Blend Shape.Smile"),
            ("Body", "blendShape.SmileWide"),
        ])];

        let records = preview(
            &clips,
            &request(RenameMode::Property, "Smile", "Grin"),
            &TextMatcher::default(),
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].new_property, "blendShape.Grin");
        assert_eq!(records[1].new_property, "Blend Shape.Grin");
        // Path is untouched in property mode
        assert_eq!(records[0].new_path, "Body");
    }

    #[test]
    fn property_mode_ignores_prefixless_properties() {
        let clips = [clip_with(&[("Body", "blendShapeWeight")])];
        let records = preview(
            &clips,
            &request(RenameMode::Property, "Weight", "Mass"),
            &TextMatcher::default(),
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn case_insensitive_property_match() {
        let clips = [clip_with(&[("Body", "blendShape.smile")])];
        let mut req = request(RenameMode::Property, "SMILE", "Grin");
        req.case_sensitive = false;
        let records = preview(&clips, &req, &TextMatcher::default()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_from_is_rejected_before_preview() {
        let clips = [clip_with(&[("Body", "blendShape.Smile")])];
        let err = preview(
            &clips,
            &request(RenameMode::Object, "", "X"),
            &TextMatcher::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.code,
            crate::core::error::ErrorCode::ValidationMissingArgument
        );
    }

    #[test]
    fn identical_from_to_is_rejected() {
        let clips = [clip_with(&[("Body", "blendShape.Smile")])];
        let err = preview(
            &clips,
            &request(RenameMode::Object, "Head", "Head"),
            &TextMatcher::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.code,
            crate::core::error::ErrorCode::ValidationInvalidArgument
        );
    }

    #[test]
    fn duplicate_target_surfaces_as_warning() {
        let clips = [clip_with(&[
            ("Body", "blendShape.Smile"),
            ("Body", "blendShape.Grin"),
        ])];

        let records = preview(
            &clips,
            &request(RenameMode::Property, "Smile", "Grin"),
            &TextMatcher::default(),
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].validation.status, ValidationStatus::Warning);
    }

    #[test]
    fn records_carry_original_keyframes() {
        let clips = [clip_with(&[("Head", "rotation.x")])];
        let records = preview(
            &clips,
            &request(RenameMode::Object, "Head", "Skull"),
            &TextMatcher::default(),
        )
        .unwrap();
        assert_eq!(records[0].new_curve.keys.len(), 1);
        assert_eq!(records[0].new_curve.keys[0].value, 1.0);
    }
}
