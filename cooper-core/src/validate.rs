//! Root and conflict validation for a class being composed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::class::ClassNode;
use crate::config::CooperConfig;
use crate::error::{ConfigReason, ConfigurationError};
use crate::method::{Cooperation, Discipline, MethodDescriptor};
use crate::signature::{check_constructor_shape, check_finalizer_shape};

/// A class that has been linearized but not yet frozen.
pub(crate) struct Draft<'a> {
    pub name: &'a str,
    pub bases: &'a [Arc<ClassNode>],
    pub ancestors: &'a [Arc<ClassNode>],
    pub methods: &'a BTreeMap<String, Arc<MethodDescriptor>>,
}

impl Draft<'_> {
    fn fail(&self, reason: ConfigReason) -> ConfigurationError {
        ConfigurationError::new(self.name, reason)
    }

    /// The declaration this class would override: the first ancestor in the
    /// linearization that declares `name`.
    fn overridden(&self, name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.ancestors.iter().find_map(|c| c.declared(name))
    }
}

pub(crate) fn validate(draft: &Draft<'_>, config: &CooperConfig) -> Result<(), ConfigurationError> {
    check_bases(draft)?;
    check_single_roots(draft)?;
    for method in draft.methods.values() {
        if method.name() == config.constructor {
            check_constructor(draft, method)?;
        } else if method.name() == config.finalizer {
            check_finalizer(draft, method)?;
        } else {
            check_override(draft, method)?;
        }
        check_fixed(draft, method)?;
    }
    Ok(())
}

fn check_bases(draft: &Draft<'_>) -> Result<(), ConfigurationError> {
    if draft.bases.len() <= 1 {
        return Ok(());
    }
    let offending: Vec<String> = draft
        .bases
        .iter()
        .filter(|b| !b.is_cooperative())
        .map(|b| b.name().to_string())
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(draft.fail(ConfigReason::NonCooperativeMultipleInheritance { bases: offending }))
    }
}

/// Every name reachable from the new class has at most one root in its
/// linearization, whether or not the new class itself declares the name.
fn check_single_roots(draft: &Draft<'_>) -> Result<(), ConfigurationError> {
    let names: BTreeSet<&str> = draft
        .methods
        .keys()
        .map(String::as_str)
        .chain(
            draft
                .ancestors
                .iter()
                .flat_map(|c| c.methods().map(|m| m.name())),
        )
        .collect();

    for name in names {
        let roots: Vec<String> = draft
            .methods
            .get(name)
            .into_iter()
            .chain(draft.ancestors.iter().filter_map(|c| c.declared(name)))
            .filter(|m| m.is_root())
            .map(|m| m.owner().to_string())
            .collect();
        if roots.len() > 1 {
            return Err(draft.fail(ConfigReason::ConflictingRoot {
                method: name.to_string(),
                roots,
            }));
        }
    }
    Ok(())
}

fn check_constructor(draft: &Draft<'_>, method: &MethodDescriptor) -> Result<(), ConfigurationError> {
    match method.cooperation() {
        Cooperation::Undeclared => Err(draft.fail(ConfigReason::ConstructorMustCooperate)),
        Cooperation::Introduce => Err(draft.fail(ConfigReason::CooperativeOverrides {
            method: method.name().to_string(),
        })),
        Cooperation::Join(Discipline::Pre) => check_constructor_shape(method),
        Cooperation::Join(Discipline::Manual) => Ok(()),
        Cooperation::Join(discipline) => {
            Err(draft.fail(ConfigReason::ConstructorDiscipline { discipline }))
        }
    }
}

fn check_finalizer(draft: &Draft<'_>, method: &MethodDescriptor) -> Result<(), ConfigurationError> {
    match method.cooperation() {
        Cooperation::Undeclared => Err(draft.fail(ConfigReason::FinalizerMustCooperate)),
        Cooperation::Introduce => Err(draft.fail(ConfigReason::CooperativeOverrides {
            method: method.name().to_string(),
        })),
        Cooperation::Join(Discipline::Manual) => Ok(()),
        Cooperation::Join(_) => check_finalizer_shape(method),
    }
}

fn check_override(draft: &Draft<'_>, method: &MethodDescriptor) -> Result<(), ConfigurationError> {
    let Some(overridden) = draft.overridden(method.name()) else {
        return Ok(());
    };
    match method.cooperation() {
        Cooperation::Undeclared if overridden.is_cooperative() => {
            Err(draft.fail(ConfigReason::OverrideWithoutCooperation {
                method: method.name().to_string(),
            }))
        }
        Cooperation::Introduce => Err(draft.fail(ConfigReason::CooperativeOverrides {
            method: method.name().to_string(),
        })),
        _ => Ok(()),
    }
}

fn check_fixed(draft: &Draft<'_>, method: &MethodDescriptor) -> Result<(), ConfigurationError> {
    let fixed_allowed = matches!(
        method.cooperation(),
        Cooperation::Join(Discipline::Pre | Discipline::Post)
    );
    if method.fixed_keywords().is_empty() || fixed_allowed {
        Ok(())
    } else {
        Err(draft.fail(ConfigReason::FixedParamsUnsupported {
            method: method.name().to_string(),
        }))
    }
}
