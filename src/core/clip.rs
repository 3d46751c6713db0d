//! Clip files and the host surface the engine mutates through.
//!
//! A clip is a JSON document holding named curve bindings with their
//! keyframes. The engine never owns bindings; it reads them through
//! [`CurveHost`] and proposes replacements through `set_curve`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::binding::{Curve, CurveBinding, Keyframe};
use crate::core::error::{Error, Result};

/// What the engine requires from anything that owns curve bindings.
///
/// `list_bindings` must stay stable for one scan pass. `set_curve` with
/// `None` removes the binding; with `Some` it adds or replaces it.
pub trait CurveHost {
    /// Stable identity used for grouping records and naming backups.
    fn id(&self) -> &str;

    /// Backing file, when there is one. Backups copy this.
    fn source_path(&self) -> Option<&Path>;

    fn list_bindings(&self) -> Vec<CurveBinding>;

    fn curve(&self, binding: &CurveBinding) -> Option<Curve>;

    fn set_curve(&mut self, binding: &CurveBinding, curve: Option<Curve>) -> Result<()>;

    /// Called once per owner group before mutations, so the host can register
    /// an undo checkpoint.
    fn begin_undo_group(&mut self, label: &str);

    fn mark_modified(&mut self);

    fn is_modified(&self) -> bool;
}

/// One serialized binding: identity plus its keyframes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingEntry {
    #[serde(flatten)]
    pub binding: CurveBinding,
    #[serde(default)]
    pub keys: Vec<Keyframe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipData {
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
}

/// An animation clip, optionally backed by a file on disk.
#[derive(Debug, Clone)]
pub struct Clip {
    pub data: ClipData,
    source: Option<PathBuf>,
    modified: bool,
    undo_labels: Vec<String>,
}

impl Clip {
    pub fn in_memory(name: impl Into<String>, bindings: Vec<BindingEntry>) -> Self {
        Self {
            data: ClipData {
                name: name.into(),
                bindings,
            },
            source: None,
            modified: false,
            undo_labels: Vec::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::clip_not_found(path.display().to_string())
            } else {
                Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
            }
        })?;

        let data: ClipData = serde_json::from_str(&raw)
            .map_err(|e| Error::clip_invalid_json(path.display().to_string(), e))?;

        Ok(Self {
            data,
            source: Some(path.to_path_buf()),
            modified: false,
            undo_labels: Vec::new(),
        })
    }

    /// Write the clip back to its source file. Clears the modified flag.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .source
            .clone()
            .ok_or_else(|| Error::other("Clip has no source file to save to"))?;

        let payload = serde_json::to_string_pretty(&self.data)
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize clip".to_string())))?;

        std::fs::write(&path, payload).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("write {}", path.display())))
        })?;

        self.modified = false;
        Ok(())
    }

    /// Undo checkpoints registered so far; one per owner group touched.
    pub fn undo_labels(&self) -> &[String] {
        &self.undo_labels
    }

    fn position_of(&self, binding: &CurveBinding) -> Option<usize> {
        self.data.bindings.iter().position(|e| &e.binding == binding)
    }
}

impl CurveHost for Clip {
    fn id(&self) -> &str {
        &self.data.name
    }

    fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn list_bindings(&self) -> Vec<CurveBinding> {
        self.data.bindings.iter().map(|e| e.binding.clone()).collect()
    }

    fn curve(&self, binding: &CurveBinding) -> Option<Curve> {
        self.position_of(binding)
            .map(|idx| Curve::new(self.data.bindings[idx].keys.clone()))
    }

    fn set_curve(&mut self, binding: &CurveBinding, curve: Option<Curve>) -> Result<()> {
        match curve {
            None => {
                if let Some(idx) = self.position_of(binding) {
                    self.data.bindings.remove(idx);
                }
            }
            Some(curve) => match self.position_of(binding) {
                Some(idx) => self.data.bindings[idx].keys = curve.keys,
                None => self.data.bindings.push(BindingEntry {
                    binding: binding.clone(),
                    keys: curve.keys,
                }),
            },
        }
        Ok(())
    }

    fn begin_undo_group(&mut self, label: &str) {
        self.undo_labels.push(label.to_string());
    }

    fn mark_modified(&mut self) {
        self.modified = true;
    }

    fn is_modified(&self) -> bool {
        self.modified
    }
}

/// Load a batch of clip files in argument order.
pub fn load_all(paths: &[String]) -> Result<Vec<Clip>> {
    paths.iter().map(Clip::load).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, property: &str, values: &[f32]) -> BindingEntry {
        BindingEntry {
            binding: CurveBinding::new(path, property, "Transform"),
            keys: values
                .iter()
                .enumerate()
                .map(|(i, v)| Keyframe {
                    time: i as f32,
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn set_curve_none_removes_binding() {
        let mut clip = Clip::in_memory("walk", vec![entry("Head", "rotation.x", &[0.0])]);
        let binding = clip.list_bindings()[0].clone();

        clip.set_curve(&binding, None).unwrap();
        assert!(clip.list_bindings().is_empty());
    }

    #[test]
    fn set_curve_replaces_existing_keys() {
        let mut clip = Clip::in_memory("walk", vec![entry("Head", "rotation.x", &[0.0, 1.0])]);
        let binding = clip.list_bindings()[0].clone();

        clip.set_curve(&binding, Some(Curve::new(vec![Keyframe { time: 0.0, value: 9.0 }])))
            .unwrap();

        let curve = clip.curve(&binding).unwrap();
        assert_eq!(curve.keys.len(), 1);
        assert_eq!(curve.keys[0].value, 9.0);
    }

    #[test]
    fn set_curve_adds_new_binding() {
        let mut clip = Clip::in_memory("walk", vec![]);
        let binding = CurveBinding::new("Head", "rotation.x", "Transform");

        clip.set_curve(&binding, Some(Curve::new(vec![Keyframe { time: 0.0, value: 1.0 }])))
            .unwrap();
        assert_eq!(clip.list_bindings(), vec![binding]);
    }

    #[test]
    fn clip_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.json");

        let mut clip = Clip::in_memory("walk", vec![entry("Head", "rotation.x", &[0.5, 1.5])]);
        clip.source = Some(path.clone());
        clip.save().unwrap();

        let loaded = Clip::load(&path).unwrap();
        assert_eq!(loaded.data.name, "walk");
        assert_eq!(loaded.data.bindings.len(), 1);
        assert_eq!(loaded.data.bindings[0].keys[1].value, 1.5);
    }

    #[test]
    fn load_missing_file_is_clip_not_found() {
        let err = Clip::load("/nonexistent/clip.json").unwrap_err();
        assert_eq!(err.code, crate::core::error::ErrorCode::ClipNotFound);
    }

    #[test]
    fn load_invalid_json_is_clip_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Clip::load(&path).unwrap_err();
        assert_eq!(err.code, crate::core::error::ErrorCode::ClipInvalidJson);
    }
}
