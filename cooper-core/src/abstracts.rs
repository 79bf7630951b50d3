use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::class::ClassNode;
use crate::error::AbstractInstantiationError;
use crate::method::MethodDescriptor;

/// Abstract names of a class being defined.
///
/// Candidates are the bases' abstract names plus this class's own abstract
/// declarations. A candidate stays abstract only if the declaration that wins
/// in the linearization is itself abstract, so a concrete override anywhere
/// ahead of the abstract declaration clears it.
pub(crate) fn collect_abstract_names(
    declared: &BTreeMap<String, Arc<MethodDescriptor>>,
    bases: &[Arc<ClassNode>],
    ancestors: &[Arc<ClassNode>],
) -> BTreeSet<String> {
    let candidates: BTreeSet<&str> = declared
        .values()
        .filter(|m| m.is_abstract())
        .map(|m| m.name())
        .chain(
            bases
                .iter()
                .flat_map(|b| b.abstract_names().iter().map(String::as_str)),
        )
        .collect();

    candidates
        .into_iter()
        .filter(|name| {
            declared
                .get(*name)
                .or_else(|| ancestors.iter().find_map(|c| c.declared(name)))
                .is_some_and(|winner| winner.is_abstract())
        })
        .map(str::to_string)
        .collect()
}

/// Refuse to instantiate a class with outstanding abstract names.
pub fn check_instantiable(class: &ClassNode) -> Result<(), AbstractInstantiationError> {
    if class.abstract_names().is_empty() {
        return Ok(());
    }
    Err(AbstractInstantiationError {
        class: class.name().to_string(),
        missing: class.abstract_names().iter().cloned().collect(),
    })
}
