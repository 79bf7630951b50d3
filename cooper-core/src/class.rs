use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::abstracts::check_instantiable;
use crate::chain::ResolutionChain;
use crate::error::{AttributeError, CoopError};
use crate::kwargs::Kwargs;
use crate::method::MethodDescriptor;
use crate::value::Value;

/// Name reported for the implicit top-level base every linearization ends in.
pub const UNIVERSAL_BASE: &str = "object";

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    pub(crate) fn allocate() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A defined class. Immutable once its composition has finished.
pub struct ClassNode {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) bases: Vec<Arc<ClassNode>>,
    /// Linearization minus the class itself, host-supplied.
    pub(crate) ancestors: Vec<Arc<ClassNode>>,
    pub(crate) methods: BTreeMap<String, Arc<MethodDescriptor>>,
    pub(crate) chains: BTreeMap<String, ResolutionChain>,
    pub(crate) abstract_names: BTreeSet<String>,
    pub(crate) cooperative: bool,
    pub(crate) constructor: String,
    pub(crate) finalizer: String,
}

impl ClassNode {
    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[Arc<ClassNode>] {
        &self.bases
    }

    pub fn ancestors(&self) -> &[Arc<ClassNode>] {
        &self.ancestors
    }

    /// The full linearization, starting with this class.
    pub fn linearization(&self) -> impl Iterator<Item = &ClassNode> {
        std::iter::once(self).chain(self.ancestors.iter().map(Arc::as_ref))
    }

    pub fn linearization_names(&self) -> Vec<&str> {
        self.linearization().map(ClassNode::name).collect()
    }

    /// Whether this class went through cooperative composition.
    pub fn is_cooperative(&self) -> bool {
        self.cooperative
    }

    pub fn declares(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn declared(&self, name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodDescriptor>> {
        self.methods.values()
    }

    pub fn chain(&self, name: &str) -> Option<&ResolutionChain> {
        self.chains.get(name)
    }

    pub fn chains(&self) -> impl Iterator<Item = &ResolutionChain> {
        self.chains.values()
    }

    pub fn abstract_names(&self) -> &BTreeSet<String> {
        &self.abstract_names
    }

    pub fn is_abstract(&self) -> bool {
        !self.abstract_names.is_empty()
    }

    /// The first class after `after` in this linearization that declares `name`.
    pub fn next_declaring(&self, after: ClassId, name: &str) -> Option<&ClassNode> {
        self.linearization()
            .skip_while(|c| c.id != after)
            .skip(1)
            .find(|c| c.declares(name))
    }

    pub fn is_subclass_of(&self, other: &ClassNode) -> bool {
        self.linearization().any(|c| c.id == other.id)
    }

    /// Create an instance and run the constructor chain with `kwargs`.
    ///
    /// Abstractness is checked before any constructor body runs.
    pub fn instantiate(self: &Arc<Self>, kwargs: Kwargs) -> Result<Object, CoopError> {
        check_instantiable(self)?;
        let mut object = Object {
            class: Arc::clone(self),
            fields: BTreeMap::new(),
        };
        let chain = self.chains.get(&self.constructor).ok_or_else(|| AttributeError {
            class: self.name.clone(),
            method: self.constructor.clone(),
        })?;
        chain.invoke(&mut object, &[], kwargs)?;
        Ok(object)
    }
}

impl fmt::Debug for ClassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("linearization", &self.linearization_names())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("abstract_names", &self.abstract_names)
            .field("cooperative", &self.cooperative)
            .finish()
    }
}

/// An instance: a class reference plus its own fields.
#[derive(Debug)]
pub struct Object {
    class: Arc<ClassNode>,
    fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn class(&self) -> &Arc<ClassNode> {
        &self.class
    }

    pub fn is_instance(&self, class: &ClassNode) -> bool {
        self.class.is_subclass_of(class)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Invoke `name` along the chain of this object's own class.
    pub fn invoke(
        &mut self,
        name: &str,
        args: &[Value],
        kwargs: Kwargs,
    ) -> Result<Value, CoopError> {
        let class = Arc::clone(&self.class);
        let chain = class.chain(name).ok_or_else(|| AttributeError {
            class: class.name.clone(),
            method: name.to_string(),
        })?;
        chain.invoke(self, args, kwargs)
    }

    /// Run the finalizer chain and drop the object.
    pub fn finalize(mut self) -> Result<(), CoopError> {
        let class = Arc::clone(&self.class);
        if let Some(chain) = class.chain(&class.finalizer) {
            chain.invoke(&mut self, &[], Kwargs::new())?;
        }
        Ok(())
    }
}
