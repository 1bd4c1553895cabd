use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::Value;

use crate::functions::{Arity, Function, FunctionRegistry, FunctionResult};

/// Default limit on nested lambda invocations.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// The named scopes an expression can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `$state`
    State,
    /// `$event`
    Event,
    /// `$instance`
    Instance,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::State, Scope::Event, Scope::Instance];

    /// The scope named by a variable, without the `$`.
    pub fn from_name(name: &str) -> Option<Scope> {
        match name {
            "state" => Some(Scope::State),
            "event" => Some(Scope::Event),
            "instance" => Some(Scope::Instance),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scope::State => "state",
            Scope::Event => "event",
            Scope::Instance => "instance",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}

/// Decides what value a named scope has for one evaluation.
///
/// Returning `None` means the scope is unbound, which fails the evaluation.
pub trait ScopeResolver: Send + Sync {
    fn resolve(&self, scope: Scope, root: Option<&Value>) -> Option<Value>;
}

/// Scopes are the members of the root object: `$state` is `$$.state`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootMembers;

impl ScopeResolver for RootMembers {
    fn resolve(&self, scope: Scope, root: Option<&Value>) -> Option<Value> {
        root?.as_object()?.get(scope.name()).cloned()
    }
}

/// Scopes bound explicitly by the caller, independent of the root.
#[derive(Debug, Clone, Default)]
pub struct ScopeBindings {
    values: HashMap<Scope, Value>,
}

impl ScopeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, scope: Scope, value: Value) -> Self {
        self.values.insert(scope, value);
        self
    }
}

impl ScopeResolver for ScopeBindings {
    fn resolve(&self, scope: Scope, _root: Option<&Value>) -> Option<Value> {
        self.values.get(&scope).cloned()
    }
}

/// Options for one or many evaluations.
///
/// # Examples
///
/// ```
/// use mapexpr::{Expression, EvalOptions, Scope, ScopeBindings};
/// use serde_json::json;
///
/// let options = EvalOptions::default()
///     .with_scopes(ScopeBindings::new().bind(Scope::Event, json!({"count": 2})))
///     .bind_variable("factor", json!(10));
///
/// let expr = Expression::parse("$event.count * $factor").unwrap();
/// assert_eq!(expr.evaluate_with(None, &options).unwrap(), Some(json!(20)));
/// ```
#[derive(Clone)]
pub struct EvalOptions {
    pub resolver: Arc<dyn ScopeResolver>,
    pub variables: HashMap<String, Value>,
    pub functions: FunctionRegistry,
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            resolver: Arc::new(RootMembers),
            variables: HashMap::new(),
            functions: FunctionRegistry::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope_resolver(mut self, resolver: Arc<dyn ScopeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_scopes(self, bindings: ScopeBindings) -> Self {
        self.with_scope_resolver(Arc::new(bindings))
    }

    /// Binds `$name` for every evaluation using these options.
    pub fn bind_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Makes `$name(...)` available, shadowing a built-in of the same name.
    pub fn register_function(
        mut self,
        name: impl Into<String>,
        function: Arc<dyn Function>,
    ) -> Self {
        self.functions.register(name, function);
        self
    }

    pub fn register_fn<F>(mut self, name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&[Option<Value>]) -> FunctionResult + Send + Sync + 'static,
    {
        self.functions.register_fn(name, arity, func);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl fmt::Debug for EvalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalOptions")
            .field("variables", &self.variables)
            .field("functions", &self.functions)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
