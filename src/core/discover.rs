//! Name discovery across a batch of owners.
//!
//! Feeds pick-lists for the from/to fields: object names come out of the
//! binding paths via ordered fallback extraction rules, property names come
//! out of the blend-shape channels only.

use std::collections::BTreeSet;

use crate::core::binding::BindingKind;
use crate::core::changeset::RenameMode;
use crate::core::clip::CurveHost;

/// Collect candidate names for `mode` across all owners, de-duplicated and
/// sorted.
pub fn discover<H: CurveHost>(owners: &[H], mode: RenameMode) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    for owner in owners {
        for binding in owner.list_bindings() {
            match mode {
                RenameMode::Object => extract_object_names(&binding.path, &mut names),
                RenameMode::Property => {
                    if let BindingKind::BlendShape { channel, .. } = binding.kind() {
                        if !channel.is_empty() {
                            names.insert(channel);
                        }
                    }
                }
            }
        }
    }

    names
}

/// Ordered fallback extraction, first applicable rule wins:
/// 1. display form: the text before the first `" : "`;
/// 2. hierarchy path: every `/` segment, minus any `.`-suffix;
/// 3. no dot at all: the whole path;
/// 4. otherwise: the first `.`-segment.
fn extract_object_names(path: &str, names: &mut BTreeSet<String>) {
    if path.is_empty() {
        return;
    }

    if let Some(idx) = path.find(" : ") {
        let object = &path[..idx];
        if !object.is_empty() {
            names.insert(object.to_string());
        }
        return;
    }

    if path.contains('/') {
        for segment in path.split('/') {
            let name = segment.split('.').next().unwrap_or(segment);
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
        return;
    }

    if !path.contains('.') {
        names.insert(path.to_string());
        return;
    }

    if let Some(first) = path.split('.').next() {
        if !first.is_empty() {
            names.insert(first.to_string());
        }
    }
}
