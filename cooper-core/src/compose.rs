//! Class composition: the single explicit step that turns a class definition
//! into a frozen [`ClassNode`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::abstracts::collect_abstract_names;
use crate::chain::{ResolutionChain, Terminal};
use crate::class::{ClassId, ClassNode};
use crate::config::CooperConfig;
use crate::error::{ConfigReason, ConfigurationError, LinearizationError};
use crate::method::{Cooperation, Method, MethodDescriptor};
use crate::validate::{Draft, validate};

/// Supplied by the host object model: orders the ancestors of a new class.
///
/// The result excludes the new class itself and the universal base, and
/// lists every ancestor exactly once.
pub trait Linearizer {
    fn linearize(&self, bases: &[Arc<ClassNode>]) -> Result<Vec<Arc<ClassNode>>, LinearizationError>;
}

impl<L: Linearizer + ?Sized> Linearizer for &L {
    fn linearize(&self, bases: &[Arc<ClassNode>]) -> Result<Vec<Arc<ClassNode>>, LinearizationError> {
        (**self).linearize(bases)
    }
}

/// A class as written, before composition.
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    bases: Vec<Arc<ClassNode>>,
    methods: Vec<Method>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn base(mut self, base: &Arc<ClassNode>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[Arc<ClassNode>] {
        &self.bases
    }
}

pub struct Composer<L> {
    linearizer: L,
    config: CooperConfig,
}

impl<L: Linearizer> Composer<L> {
    pub fn new(linearizer: L) -> Self {
        Self::with_config(linearizer, CooperConfig::default())
    }

    pub fn with_config(linearizer: L, config: CooperConfig) -> Self {
        Self { linearizer, config }
    }

    pub fn config(&self) -> &CooperConfig {
        &self.config
    }

    /// Validate `def`, bind its cooperating methods into resolution chains and
    /// record its abstract names. Call exactly once per class.
    pub fn compose(&self, def: ClassDef) -> Result<Arc<ClassNode>, ConfigurationError> {
        self.assemble(def, true)
    }

    /// Define a class that takes no part in cooperation.
    ///
    /// Nothing is validated and every declaration is treated as undeclared;
    /// inherited chains are still precomputed so instances behave exactly like
    /// instances of the nearest cooperative ancestor.
    pub fn define_plain(&self, def: ClassDef) -> Result<Arc<ClassNode>, ConfigurationError> {
        self.assemble(def, false)
    }

    fn assemble(&self, def: ClassDef, cooperative: bool) -> Result<Arc<ClassNode>, ConfigurationError> {
        let ClassDef {
            name,
            bases,
            methods: declared,
        } = def;

        let ancestors = self.linearizer.linearize(&bases).map_err(|e| {
            ConfigurationError::new(
                &name,
                ConfigReason::InconsistentHierarchy { detail: e.message },
            )
        })?;

        let mut methods: BTreeMap<String, Arc<MethodDescriptor>> = BTreeMap::new();
        for method in declared {
            if methods.contains_key(method.name()) {
                return Err(ConfigurationError::new(
                    &name,
                    ConfigReason::DuplicateMethod {
                        method: method.name().to_string(),
                    },
                ));
            }
            let descriptor = if cooperative {
                let overrides = self.config.is_lifecycle(method.name())
                    || ancestors.iter().any(|c| c.declares(method.name()));
                let is_root = method.cooperation().is_cooperative() && !overrides;
                MethodDescriptor::bind(&name, method, is_root)
            } else {
                if method.cooperation() != Cooperation::Undeclared {
                    tracing::warn!(
                        class = %name,
                        method = method.name(),
                        cooperation = ?method.cooperation(),
                        "plain class ignores cooperation annotation"
                    );
                }
                MethodDescriptor::bind_plain(&name, method)
            };
            methods.insert(descriptor.name().to_string(), Arc::new(descriptor));
        }

        if cooperative {
            let draft = Draft {
                name: &name,
                bases: &bases,
                ancestors: &ancestors,
                methods: &methods,
            };
            validate(&draft, &self.config)?;
        }

        let abstract_names = collect_abstract_names(&methods, &bases, &ancestors);
        let chains = self.build_chains(&methods, &ancestors);

        let order: Vec<&str> = ancestors.iter().map(|c| c.name()).collect();
        tracing::debug!(
            class = %name,
            cooperative,
            ancestors = ?order,
            abstract_names = ?abstract_names,
            chains = chains.len(),
            "composed class"
        );

        Ok(Arc::new(ClassNode {
            id: ClassId::allocate(),
            name,
            bases,
            ancestors,
            methods,
            chains,
            abstract_names,
            cooperative,
            constructor: self.config.constructor.clone(),
            finalizer: self.config.finalizer.clone(),
        }))
    }

    /// One precomputed chain per name reachable from the class, plus the
    /// lifecycle chains which always exist.
    fn build_chains(
        &self,
        methods: &BTreeMap<String, Arc<MethodDescriptor>>,
        ancestors: &[Arc<ClassNode>],
    ) -> BTreeMap<String, ResolutionChain> {
        let names: BTreeSet<&str> = [self.config.constructor.as_str(), self.config.finalizer.as_str()]
            .into_iter()
            .chain(methods.keys().map(String::as_str))
            .chain(ancestors.iter().flat_map(|c| c.methods().map(|m| m.name())))
            .collect();

        names
            .into_iter()
            .map(|name| {
                let links: Vec<Arc<MethodDescriptor>> = methods
                    .get(name)
                    .into_iter()
                    .chain(ancestors.iter().filter_map(|c| c.declared(name)))
                    .cloned()
                    .collect();
                let terminal = if self.config.is_lifecycle(name) {
                    Terminal::Universal
                } else {
                    Terminal::Missing
                };
                let chain =
                    ResolutionChain::new(name, links, terminal, self.config.check_inner_calls);
                (name.to_string(), chain)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoopError;
    use crate::kwargs::Kwargs;
    use crate::value::Value;

    /// Depth-first, keeping the last occurrence of each ancestor. Agrees with
    /// C3 on the small hierarchies used here.
    struct DepthFirst;

    impl Linearizer for DepthFirst {
        fn linearize(
            &self,
            bases: &[Arc<ClassNode>],
        ) -> Result<Vec<Arc<ClassNode>>, LinearizationError> {
            let walk: Vec<Arc<ClassNode>> = bases
                .iter()
                .flat_map(|b| std::iter::once(Arc::clone(b)).chain(b.ancestors().iter().cloned()))
                .collect();
            let mut out: Vec<Arc<ClassNode>> = Vec::new();
            for (i, c) in walk.iter().enumerate() {
                if !walk[i + 1..].iter().any(|later| later.id() == c.id()) {
                    out.push(Arc::clone(c));
                }
            }
            Ok(out)
        }
    }

    fn noop(_: &mut crate::chain::Call<'_>) -> Result<Value, CoopError> {
        Ok(Value::Unit)
    }

    #[test]
    fn test_first_cooperating_declaration_is_root() {
        let composer = Composer::new(DepthFirst);
        let a = composer
            .compose(ClassDef::new("A").method(Method::cooperate("method", noop)))
            .unwrap();
        let b = composer
            .compose(ClassDef::new("B").base(&a).method(Method::cooperate("method", noop)))
            .unwrap();
        assert!(a.declared("method").unwrap().is_root());
        assert!(!b.declared("method").unwrap().is_root());
        assert_eq!(b.chain("method").unwrap().owners(), vec!["B", "A"]);
    }

    #[test]
    fn test_lifecycle_chains_always_exist() {
        let composer = Composer::new(DepthFirst);
        let a = composer.compose(ClassDef::new("A")).unwrap();
        assert!(a.chain("init").unwrap().is_empty());
        assert!(a.chain("finalize").unwrap().is_empty());
        let obj = a.instantiate(Kwargs::new()).unwrap();
        assert!(obj.fields().is_empty());
    }

    #[test]
    fn test_lifecycle_declaration_is_never_root() {
        let composer = Composer::new(DepthFirst);
        let a = composer
            .compose(ClassDef::new("A").method(Method::cooperate("init", noop)))
            .unwrap();
        assert!(!a.declared("init").unwrap().is_root());
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let composer = Composer::new(DepthFirst);
        let err = composer
            .compose(
                ClassDef::new("A")
                    .method(Method::cooperate("m", noop))
                    .method(Method::post_cooperate("m", noop)),
            )
            .unwrap_err();
        assert_eq!(err.reason_code(), "duplicate-method");
    }

    #[test]
    fn test_plain_definition_strips_annotations() {
        let composer = Composer::new(DepthFirst);
        let p = composer
            .define_plain(ClassDef::new("P").method(Method::cooperate("init", noop).fixed("x", 1)))
            .unwrap();
        let init = p.declared("init").unwrap();
        assert_eq!(init.cooperation(), Cooperation::Undeclared);
        assert!(init.fixed_keywords().is_empty());
        assert!(!p.is_cooperative());
    }

    #[test]
    fn test_custom_lifecycle_names_from_config() {
        let config = CooperConfig {
            constructor: "setup".to_string(),
            ..CooperConfig::default()
        };
        let composer = Composer::with_config(DepthFirst, config);
        let err = composer
            .compose(ClassDef::new("A").method(Method::plain("setup", noop)))
            .unwrap_err();
        assert_eq!(err.reason_code(), "constructor-must-cooperate");
        // `init` is an ordinary name under this configuration.
        assert!(composer
            .compose(ClassDef::new("B").method(Method::plain("init", noop)))
            .is_ok());
    }
}
