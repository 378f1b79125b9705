//! Structured TOML substitution strategy

use crate::substitute::{Substitutor, Swap, SwapError};
use toml_edit::{DocumentMut, Item, Value};

/// Format-preserving substitution for TOML descriptors.
///
/// Rewrites every string value exactly equal to the old reference, wherever
/// it appears (`[[bin]] path`, `[lib] path`, nested tables). Comments and
/// layout of everything else survive untouched, so the swap round-trips
/// byte-identically.
pub struct TomlSubstitutor;

impl Substitutor for TomlSubstitutor {
    fn swap(&self, content: &str, from: &str, to: &str) -> Result<Swap, SwapError> {
        let mut doc: DocumentMut = content
            .parse()
            .map_err(|e: toml_edit::TomlError| SwapError::Invalid(e.to_string()))?;

        let mut applied = false;
        let mut target_present = false;
        rewrite_item(doc.as_item_mut(), from, to, &mut applied, &mut target_present);

        if applied {
            Ok(Swap::Applied(doc.to_string()))
        } else if target_present {
            Ok(Swap::AlreadyApplied)
        } else {
            Err(SwapError::TargetNotFound)
        }
    }
}

fn rewrite_item(item: &mut Item, from: &str, to: &str, applied: &mut bool, target_present: &mut bool) {
    match item {
        Item::Value(value) => rewrite_value(value, from, to, applied, target_present),
        Item::Table(table) => {
            for (_, child) in table.iter_mut() {
                rewrite_item(child, from, to, applied, target_present);
            }
        }
        Item::ArrayOfTables(tables) => {
            for table in tables.iter_mut() {
                for (_, child) in table.iter_mut() {
                    rewrite_item(child, from, to, applied, target_present);
                }
            }
        }
        Item::None => {}
    }
}

fn rewrite_value(value: &mut Value, from: &str, to: &str, applied: &mut bool, target_present: &mut bool) {
    match value {
        Value::String(s) => {
            if s.value() == from {
                let decor = s.decor().clone();
                let mut replacement = Value::from(to);
                *replacement.decor_mut() = decor;
                *value = replacement;
                *applied = true;
            } else if s.value() == to {
                *target_present = true;
            }
        }
        Value::Array(array) => {
            for element in array.iter_mut() {
                rewrite_value(element, from, to, applied, target_present);
            }
        }
        Value::InlineTable(table) => {
            for (_, child) in table.iter_mut() {
                rewrite_value(child, from, to, applied, target_present);
            }
        }
        _ => {}
    }
}
