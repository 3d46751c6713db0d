//! Decision engine for removable curves.
//!
//! Flags curves as removable when they carry no information: no keyframes,
//! all values at zero, or all values sitting on the property's type-inferred
//! default. Preservation rules demote eligible removals to warnings; they do
//! not remove candidates from the preview list.

use serde::{Deserialize, Serialize};

use crate::core::binding::{
    CleanupReason, CleanupRecord, Curve, CurveBinding, Validation,
};
use crate::core::clip::CurveHost;

/// Which emptiness classes qualify for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupMode {
    EmptyOnly,
    ZeroValuesOnly,
    Both,
}

impl CleanupMode {
    pub fn from_str(value: &str) -> crate::core::error::Result<Self> {
        match value {
            "empty" => Ok(CleanupMode::EmptyOnly),
            "zero" => Ok(CleanupMode::ZeroValuesOnly),
            "both" => Ok(CleanupMode::Both),
            other => Err(crate::core::error::Error::validation_invalid_argument(
                "mode",
                "Expected 'empty', 'zero', or 'both'",
                Some(other.to_string()),
            )),
        }
    }

    fn includes_empty(&self) -> bool {
        matches!(self, CleanupMode::EmptyOnly | CleanupMode::Both)
    }

    fn includes_zero(&self) -> bool {
        matches!(self, CleanupMode::ZeroValuesOnly | CleanupMode::Both)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOptions {
    /// Magnitude at or below which a sample counts as zero/default.
    pub value_threshold: f32,
    /// Keep blend-shape channels even when eligible for removal.
    pub preserve_blend_shapes: bool,
    /// Keep transform curves (position/rotation/scale) even when eligible.
    pub preserve_transforms: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            value_threshold: 0.001,
            preserve_blend_shapes: true,
            preserve_transforms: true,
        }
    }
}

/// Property-name tokens that mark a transform curve, including the
/// serialized `m_Local…` forms.
const TRANSFORM_TOKENS: &[&str] = &[
    "position",
    "rotation",
    "scale",
    "m_localposition",
    "m_localrotation",
    "m_localscale",
    "m_localeulerangles",
];

/// Decide whether a curve is removable under `mode`, in priority order:
/// no keyframes, then all-zero values, then only-default values.
pub fn should_remove(
    binding: &CurveBinding,
    curve: &Curve,
    mode: CleanupMode,
    opts: &CleanupOptions,
) -> Option<CleanupReason> {
    if curve.is_empty() {
        return mode.includes_empty().then_some(CleanupReason::NoKeyframes);
    }

    if mode.includes_zero() {
        if curve.keys.iter().all(|k| k.value.abs() <= opts.value_threshold) {
            return Some(CleanupReason::AllZeroValues);
        }

        let default = default_value_for(&binding.property);
        if default != 0.0
            && curve
                .keys
                .iter()
                .all(|k| (k.value - default).abs() <= opts.value_threshold)
        {
            return Some(CleanupReason::OnlyDefaultValues);
        }
    }

    None
}

/// Type-inferred default derived from the lower-cased property name.
/// Scale and alpha-like channels rest at 1.0, blend-shape weights at 0.0.
fn default_value_for(property: &str) -> f32 {
    let lower = property.to_lowercase();

    if lower.contains("scale") || lower.contains("m_localscale") {
        return 1.0;
    }
    if lower.contains("alpha") || lower.contains("color.a") {
        return 1.0;
    }
    if lower.contains("blend") && lower.contains("weight") {
        return 0.0;
    }
    0.0
}

/// True when preservation settings protect this binding from removal.
pub fn should_preserve(binding: &CurveBinding, opts: &CleanupOptions) -> bool {
    if opts.preserve_blend_shapes && binding.kind().is_blend_shape() {
        return true;
    }
    if opts.preserve_transforms {
        let lower = binding.property.to_lowercase();
        if TRANSFORM_TOKENS.iter().any(|t| lower.contains(t)) {
            return true;
        }
    }
    false
}

/// Build one cleanup record for a binding, or `None` when the curve is not
/// removable under `mode`. Preserved bindings stay in the list as warnings;
/// acceptance filtering happens at apply time.
pub fn build_cleanup(
    owner_id: &str,
    binding: &CurveBinding,
    curve: &Curve,
    mode: CleanupMode,
    opts: &CleanupOptions,
) -> Option<CleanupRecord> {
    let reason = should_remove(binding, curve, mode, opts)?;

    let validation = if should_preserve(binding, opts) {
        Validation::warning("Preserved by cleanup settings; will not be removed")
    } else {
        Validation::valid()
    };

    Some(CleanupRecord {
        owner_id: owner_id.to_string(),
        binding: binding.clone(),
        reason,
        validation,
        key_count: curve.keys.len(),
        min_value: curve.min_value(),
        max_value: curve.max_value(),
    })
}

/// Scan every binding of every owner for removable curves.
pub fn preview_cleanup<H: CurveHost>(
    owners: &[H],
    mode: CleanupMode,
    opts: &CleanupOptions,
) -> Vec<CleanupRecord> {
    let mut records = Vec::new();

    for owner in owners {
        for binding in owner.list_bindings() {
            let curve = owner.curve(&binding).unwrap_or_default();
            if let Some(record) = build_cleanup(owner.id(), &binding, &curve, mode, opts) {
                records.push(record);
            }
        }
    }

    records
}
