//! Resolution chains and the calling disciplines that drive them.
//!
//! A chain is the ordered sub-sequence of a class's linearization whose nodes
//! declare one method name, precomputed when the class is composed. "Next"
//! is always the following slot of the chain belonging to the class the call
//! was made on, so a call on the most-derived class of a diamond visits every
//! ancestor exactly once.

use std::sync::Arc;

use crate::class::{Object, UNIVERSAL_BASE};
use crate::error::{
    ArityError, CoopError, ProtocolViolation, ProtocolViolationError, UnrecognizedParameterError,
};
use crate::kwargs::Kwargs;
use crate::method::{Discipline, MethodDescriptor};
use crate::partition::{claim_remaining, extract_own};
use crate::value::Value;

/// One-shot continuation state for a single INNER invocation.
#[derive(Debug, Default)]
pub struct InnerCallToken {
    calls: u32,
}

impl InnerCallToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use. Returns `false` if the token had already been consumed.
    pub fn consume(&mut self) -> bool {
        self.calls += 1;
        self.calls == 1
    }

    pub fn is_consumed(&self) -> bool {
        self.calls > 0
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

/// What lies past the last declaring level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Terminal {
    /// Lifecycle methods end at the universal base, which accepts nothing.
    Universal,
    Missing,
}

#[derive(Clone, Debug)]
pub struct ResolutionChain {
    name: String,
    links: Vec<Arc<MethodDescriptor>>,
    terminal: Terminal,
    check_inner_calls: bool,
}

impl ResolutionChain {
    pub(crate) fn new(
        name: impl Into<String>,
        links: Vec<Arc<MethodDescriptor>>,
        terminal: Terminal,
        check_inner_calls: bool,
    ) -> Self {
        Self {
            name: name.into(),
            links,
            terminal,
            check_inner_calls,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> &[Arc<MethodDescriptor>] {
        &self.links
    }

    /// Owning class names, outermost first.
    pub fn owners(&self) -> Vec<&str> {
        self.links.iter().map(|m| m.owner()).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Run the whole chain on `receiver`. `bag` becomes the one shared
    /// keyword bag for this invocation.
    pub fn invoke(
        &self,
        receiver: &mut Object,
        args: &[Value],
        mut bag: Kwargs,
    ) -> Result<Value, CoopError> {
        self.dispatch(0, receiver, args, &mut bag)
    }

    fn dispatch(
        &self,
        at: usize,
        receiver: &mut Object,
        args: &[Value],
        bag: &mut Kwargs,
    ) -> Result<Value, CoopError> {
        let Some(method) = self.links.get(at) else {
            return self.terminate(args, bag);
        };
        tracing::trace!(
            method = %self.name,
            owner = method.owner(),
            position = at,
            root = method.is_root(),
            discipline = %method.discipline(),
            "chain hop"
        );

        if method.is_root() {
            check_arity(method, args)?;
            let own = claim_remaining(method, bag)?;
            return method.run(Call::new(receiver, args, own, method, Link::Sealed));
        }

        match method.discipline() {
            Discipline::Pre => {
                check_arity(method, args)?;
                let own = extract_own(method, bag);
                bag.extend(method.fixed_keywords().clone());
                self.dispatch(at + 1, receiver, args, bag)?;
                method.run(Call::new(receiver, args, own, method, Link::Sealed))
            }
            Discipline::Post => {
                check_arity(method, args)?;
                let own = extract_own(method, bag);
                bag.extend(method.fixed_keywords().clone());
                method.run(Call::new(receiver, args, own, method, Link::Sealed))?;
                self.dispatch(at + 1, receiver, args, bag)
            }
            Discipline::Inner => {
                check_arity(method, args)?;
                let own = extract_own(method, bag);
                let mut token = InnerCallToken::new();
                let link = Link::Inner {
                    chain: self,
                    next: at + 1,
                    bag,
                    token: &mut token,
                };
                let result = method.run(Call::new(receiver, args, own, method, link))?;
                // The body may have swallowed the error from a repeated call.
                if self.check_inner_calls && token.calls() != 1 {
                    let calls = token.calls();
                    return Err(violation(method, ProtocolViolation::InnerCallCount { calls }));
                }
                Ok(result)
            }
            Discipline::Manual => {
                let own = bag.take();
                let link = Link::Manual {
                    chain: self,
                    next: at + 1,
                };
                method.run(Call::new(receiver, args, own, method, link))
            }
        }
    }

    fn terminate(&self, args: &[Value], bag: &mut Kwargs) -> Result<Value, CoopError> {
        match self.terminal {
            Terminal::Universal => {
                if !args.is_empty() {
                    return Err(ArityError {
                        owner: UNIVERSAL_BASE.to_string(),
                        method: self.name.clone(),
                        expected: "0".to_string(),
                        got: args.len(),
                    }
                    .into());
                }
                if !bag.is_empty() {
                    return Err(UnrecognizedParameterError {
                        owner: UNIVERSAL_BASE.to_string(),
                        method: self.name.clone(),
                        keys: bag.key_list(),
                    }
                    .into());
                }
                Ok(Value::Unit)
            }
            Terminal::Missing => Err(ProtocolViolationError {
                owner: self
                    .links
                    .last()
                    .map(|m| m.owner().to_string())
                    .unwrap_or_else(|| UNIVERSAL_BASE.to_string()),
                method: self.name.clone(),
                kind: ProtocolViolation::NoNextImplementation,
            }
            .into()),
        }
    }
}

fn check_arity(method: &MethodDescriptor, args: &[Value]) -> Result<(), ArityError> {
    let sig = method.signature();
    if sig.accepts_positional(args.len()) {
        return Ok(());
    }
    let expected = if sig.has_var_positional() {
        format!("at least {}", sig.required().len())
    } else {
        sig.required().len().to_string()
    };
    Err(ArityError {
        owner: method.owner().to_string(),
        method: method.name().to_string(),
        expected,
        got: args.len(),
    })
}

fn violation(method: &MethodDescriptor, kind: ProtocolViolation) -> CoopError {
    ProtocolViolationError {
        owner: method.owner().to_string(),
        method: method.name().to_string(),
        kind,
    }
    .into()
}

enum Link<'a> {
    Sealed,
    Inner {
        chain: &'a ResolutionChain,
        next: usize,
        bag: &'a mut Kwargs,
        token: &'a mut InnerCallToken,
    },
    Manual {
        chain: &'a ResolutionChain,
        next: usize,
    },
}

/// What a method body sees while it runs.
pub struct Call<'a> {
    receiver: &'a mut Object,
    args: &'a [Value],
    own: Kwargs,
    method: &'a MethodDescriptor,
    link: Link<'a>,
}

impl<'a> Call<'a> {
    fn new(
        receiver: &'a mut Object,
        args: &'a [Value],
        own: Kwargs,
        method: &'a MethodDescriptor,
        link: Link<'a>,
    ) -> Self {
        Self {
            receiver,
            args,
            own,
            method,
            link,
        }
    }

    pub fn receiver(&self) -> &Object {
        &*self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut Object {
        &mut *self.receiver
    }

    /// Read a field of the receiver.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.receiver.get(field)
    }

    /// Write a field of the receiver.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.receiver.set(field, value);
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// A keyword this level declared, falling back to its default.
    pub fn kw(&self, name: &str) -> Option<&Value> {
        self.own
            .get(name)
            .or_else(|| self.method.signature().default_for(name))
    }

    /// The keywords handed to this level, without defaults.
    pub fn kwargs(&self) -> &Kwargs {
        &self.own
    }

    pub fn method(&self) -> &MethodDescriptor {
        self.method
    }

    /// Continue to the next implementation.
    ///
    /// For an inner-cooperating body, `extra` is merged into the shared bag
    /// and the one-shot continuation is consumed. For a manual body, `extra`
    /// is the entire bag handed onward with the same positional arguments.
    pub fn next(&mut self, extra: Kwargs) -> Result<Value, CoopError> {
        match &mut self.link {
            Link::Inner {
                chain,
                next,
                bag,
                token,
            } => {
                let first = token.consume();
                if !first && chain.check_inner_calls {
                    return Err(violation(
                        self.method,
                        ProtocolViolation::InnerCallCount {
                            calls: token.calls(),
                        },
                    ));
                }
                bag.extend(extra);
                chain.dispatch(*next, &mut *self.receiver, self.args, &mut **bag)
            }
            Link::Manual { chain, next } => {
                let mut bag = extra;
                chain.dispatch(*next, &mut *self.receiver, self.args, &mut bag)
            }
            Link::Sealed => Err(violation(self.method, ProtocolViolation::NoNextImplementation)),
        }
    }

    /// Manual bodies only: call onward with different positional arguments.
    pub fn next_with(&mut self, args: &[Value], kwargs: Kwargs) -> Result<Value, CoopError> {
        match &self.link {
            Link::Manual { chain, next } => {
                let mut bag = kwargs;
                chain.dispatch(*next, &mut *self.receiver, args, &mut bag)
            }
            _ => Err(violation(self.method, ProtocolViolation::NoNextImplementation)),
        }
    }

    /// Pass everything this level received on to the next level unchanged.
    pub fn forward(&mut self) -> Result<Value, CoopError> {
        let bag = if matches!(self.link, Link::Manual { .. }) {
            self.own.clone()
        } else {
            Kwargs::new()
        };
        self.next(bag)
    }
}
