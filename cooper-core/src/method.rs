use std::fmt;
use std::sync::Arc;

use crate::chain::Call;
use crate::error::CoopError;
use crate::kwargs::Kwargs;
use crate::signature::Signature;
use crate::value::Value;

/// Shared, immutable method body.
pub type MethodBody = Arc<dyn Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync>;

/// How a cooperating level orders its own body against the next level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Discipline {
    /// Next level first, then this body. Returns this body's result.
    Pre,
    /// This body first, then the next level. Returns the next level's result.
    Post,
    /// The body receives a continuation it must invoke exactly once.
    Inner,
    /// The body is handed the whole bag and calls onward itself, or not at all.
    Manual,
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Discipline::Pre => "pre",
            Discipline::Post => "post",
            Discipline::Inner => "inner",
            Discipline::Manual => "manual",
        })
    }
}

/// The annotation a method carries into composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cooperation {
    Undeclared,
    /// Introduces a new cooperative name. Must not override anything.
    Introduce,
    Join(Discipline),
}

impl Cooperation {
    pub fn is_cooperative(self) -> bool {
        !matches!(self, Cooperation::Undeclared)
    }
}

/// A method declaration as written by a class author, before composition.
pub struct Method {
    pub(crate) name: String,
    pub(crate) signature: Signature,
    pub(crate) cooperation: Cooperation,
    pub(crate) fixed_keywords: Kwargs,
    pub(crate) is_abstract: bool,
    pub(crate) body: MethodBody,
}

impl Method {
    fn declare<F>(name: impl Into<String>, cooperation: Cooperation, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature: Signature::default(),
            cooperation,
            fixed_keywords: Kwargs::new(),
            is_abstract: false,
            body: Arc::new(body),
        }
    }

    /// An ordinary method that takes no part in cooperation.
    pub fn plain<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        Self::declare(name, Cooperation::Undeclared, body)
    }

    /// Introduce a new cooperative method name; subclasses cooperate on it.
    pub fn cooperative<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        Self::declare(name, Cooperation::Introduce, body)
    }

    /// Like [`Method::cooperative`], and the name stays abstract until a
    /// subclass overrides it concretely.
    pub fn abstract_method<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        let mut method = Self::declare(name, Cooperation::Introduce, body);
        method.is_abstract = true;
        method
    }

    pub fn cooperate<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        Self::declare(name, Cooperation::Join(Discipline::Pre), body)
    }

    pub fn post_cooperate<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        Self::declare(name, Cooperation::Join(Discipline::Post), body)
    }

    pub fn inner_cooperate<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        Self::declare(name, Cooperation::Join(Discipline::Inner), body)
    }

    pub fn manual_cooperate<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static,
    {
        Self::declare(name, Cooperation::Join(Discipline::Manual), body)
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.signature.push_required(name.into());
        self
    }

    pub fn keyword(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.signature.push_keyword(name.into(), default.into());
        self
    }

    pub fn variadic_positional(mut self) -> Self {
        self.signature.set_var_positional();
        self
    }

    pub fn variadic_keyword(mut self) -> Self {
        self.signature.set_var_keyword();
        self
    }

    /// Force `name = value` on every outgoing call to the next level.
    pub fn fixed(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fixed_keywords.insert(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cooperation(&self) -> Cooperation {
        self.cooperation
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("cooperation", &self.cooperation)
            .field("signature", &self.signature)
            .field("fixed_keywords", &self.fixed_keywords)
            .field("is_abstract", &self.is_abstract)
            .finish_non_exhaustive()
    }
}

/// A composed method: a declaration bound to the class that owns it.
///
/// Immutable once its class has been composed.
pub struct MethodDescriptor {
    name: String,
    owner: String,
    signature: Signature,
    cooperation: Cooperation,
    fixed_keywords: Kwargs,
    is_abstract: bool,
    is_root: bool,
    body: MethodBody,
}

impl MethodDescriptor {
    pub(crate) fn bind(owner: &str, method: Method, is_root: bool) -> Self {
        Self {
            name: method.name,
            owner: owner.to_string(),
            signature: method.signature,
            cooperation: method.cooperation,
            fixed_keywords: method.fixed_keywords,
            is_abstract: method.is_abstract,
            is_root,
            body: method.body,
        }
    }

    /// Strip any annotation; used for classes that skip composition.
    pub(crate) fn bind_plain(owner: &str, mut method: Method) -> Self {
        method.cooperation = Cooperation::Undeclared;
        method.fixed_keywords = Kwargs::new();
        Self::bind(owner, method, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn cooperation(&self) -> Cooperation {
        self.cooperation
    }

    /// Calling discipline used when this level is not the root.
    pub fn discipline(&self) -> Discipline {
        match self.cooperation {
            Cooperation::Join(d) => d,
            Cooperation::Introduce => Discipline::Pre,
            Cooperation::Undeclared => Discipline::Manual,
        }
    }

    pub fn fixed_keywords(&self) -> &Kwargs {
        &self.fixed_keywords
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_cooperative(&self) -> bool {
        self.cooperation.is_cooperative()
    }

    pub(crate) fn run(&self, mut call: Call<'_>) -> Result<Value, CoopError> {
        (self.body)(&mut call)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("cooperation", &self.cooperation)
            .field("is_abstract", &self.is_abstract)
            .field("is_root", &self.is_root)
            .finish_non_exhaustive()
    }
}
