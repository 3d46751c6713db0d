//! Core data model: curve bindings, keyframes, and rename/cleanup records.

use serde::{Deserialize, Serialize};

/// A single `(time, value)` sample on a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

/// An ordered keyframe sequence. Owned by the host clip; the engine only
/// reads it and hands it back unmodified when a binding is re-added.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curve {
    pub keys: Vec<Keyframe>,
}

impl Curve {
    pub fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn min_value(&self) -> Option<f32> {
        self.keys.iter().map(|k| k.value).reduce(f32::min)
    }

    pub fn max_value(&self) -> Option<f32> {
        self.keys.iter().map(|k| k.value).reduce(f32::max)
    }
}

/// Identity of a bound curve on an owner: hierarchy path, property name, and
/// the component type the property lives on. `(path, property, target_type)`
/// is the collision key within one owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveBinding {
    pub path: String,
    pub property: String,
    #[serde(default)]
    pub target_type: String,
}

impl CurveBinding {
    pub fn new(
        path: impl Into<String>,
        property: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            property: property.into(),
            target_type: target_type.into(),
        }
    }

    /// Display form used in messages and discovery output.
    pub fn display(&self) -> String {
        if self.path.is_empty() {
            self.property.clone()
        } else {
            format!("{}.{}", self.path, self.property)
        }
    }

    pub fn kind(&self) -> BindingKind {
        BindingKind::of(self)
    }
}

/// The two recognized blend-shape property prefixes. A closed set: the
/// serialized form and the inspector display form.
pub const BLEND_SHAPE_PREFIXES: [&str; 2] = ["blendShape.", "Blend Shape."];

/// Property classification resolved once per binding instead of repeated
/// prefix checks at every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// Property is `<prefix><channel>` for one of the two fixed prefixes.
    BlendShape {
        prefix: &'static str,
        channel: String,
    },
    Plain,
}

impl BindingKind {
    pub fn of(binding: &CurveBinding) -> Self {
        for prefix in BLEND_SHAPE_PREFIXES {
            // Case-sensitive on purpose: "blendshape.Smile" is not a
            // recognized blend-shape property.
            if let Some(channel) = binding.property.strip_prefix(prefix) {
                return BindingKind::BlendShape {
                    prefix,
                    channel: channel.to_string(),
                };
            }
        }
        BindingKind::Plain
    }

    pub fn is_blend_shape(&self) -> bool {
        matches!(self, BindingKind::BlendShape { .. })
    }
}

/// Outcome class of validating a proposed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Warning,
    Error,
}

/// Validation verdict plus the literal message shown for review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub status: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Validation {
    pub fn valid() -> Self {
        Self {
            status: ValidationStatus::Valid,
            message: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Warning,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ValidationStatus::Error
    }
}

/// One proposed rename, produced per preview pass and cleared on the next
/// pass, mode switch, clip-list change, or successful apply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub owner_id: String,
    pub binding: CurveBinding,
    pub new_path: String,
    pub new_property: String,
    #[serde(skip)]
    pub new_curve: Curve,
    #[serde(flatten)]
    pub validation: Validation,
}

impl ChangeRecord {
    /// A record only changes anything when it is not an error and the
    /// proposed identity actually differs. Never both `Error` and changing.
    pub fn will_change(&self) -> bool {
        !self.validation.is_error()
            && (self.new_path != self.binding.path || self.new_property != self.binding.property)
    }

    pub fn new_binding(&self) -> CurveBinding {
        CurveBinding::new(
            self.new_path.clone(),
            self.new_property.clone(),
            self.binding.target_type.clone(),
        )
    }
}

/// Why a curve was flagged as removable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CleanupReason {
    NoKeyframes,
    AllZeroValues,
    OnlyDefaultValues,
}

/// One removable-curve proposal. Same lifecycle as [`ChangeRecord`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRecord {
    pub owner_id: String,
    pub binding: CurveBinding,
    pub reason: CleanupReason,
    #[serde(flatten)]
    pub validation: Validation,
    pub key_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f32>,
}

impl CleanupRecord {
    pub fn accepted(&self) -> bool {
        self.validation.status == ValidationStatus::Valid
    }
}

/// Upper bound on literal error/warning strings carried by an
/// [`OperationResult`]; the counters stay exact past this point.
pub const MAX_RESULT_MESSAGES: usize = 50;

/// Immutable aggregate returned by an apply pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub total: usize,
    pub succeeded: usize,
    pub errors: usize,
    pub warnings: usize,
    pub elapsed_ms: u64,
    pub messages: Vec<String>,
}

impl OperationResult {
    pub fn push_message(&mut self, message: impl Into<String>) {
        if self.messages.len() < MAX_RESULT_MESSAGES {
            self.messages.push(message.into());
        }
    }
}
