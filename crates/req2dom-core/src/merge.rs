//! Fan-in of two analyzer runs over the same document.
//!
//! The merge is deliberately asymmetric. `refined` (typically the
//! completion pass) supplies the class list, the attribute order and the
//! relationships of every class it names; `heuristic` only contributes
//! attributes the refined class lacks and whole classes the refined
//! model never mentions. Swapping the arguments gives a different model.

use tracing::debug;

use crate::model::DomainModel;

/// Last-writer-wins with attribute union. An empty side yields the other
/// side unchanged.
#[must_use]
pub fn merge(heuristic: DomainModel, refined: DomainModel) -> DomainModel {
    if heuristic.is_empty() {
        return refined;
    }
    if refined.is_empty() {
        return heuristic;
    }

    let mut merged = refined;
    let mut appended = 0usize;

    for class in heuristic.classes {
        match merged.class_mut(&class.name) {
            Some(base) => {
                for attribute in class.attributes {
                    base.push_attribute(attribute);
                }
            }
            None => {
                merged.classes.push(class);
                appended += 1;
            }
        }
    }

    debug!(classes = merged.len(), appended, "Merged analyzer models");
    merged
}
