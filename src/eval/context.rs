use std::collections::HashMap;

use crate::error::EvalError;

/// Trait implemented by the host application to supply parameter values
/// to the evaluator.
///
/// The evaluator calls [`resolve`](Resolver::resolve) once per
/// substitution, after that substitution's arguments have been evaluated.
/// `Ok(None)` means the parameter is unset, which the operators treat
/// differently from a parameter set to the empty string.
///
/// # Implementor's note
///
/// `${name=word}` and `${name:=word}` hand the computed default to
/// [`assign`](Resolver::assign). Implementations that want later
/// references to `name` in the same evaluation to see the default should
/// store it there. The default implementation discards it.
///
/// Any closure `FnMut(&str) -> Option<String>` is a resolver:
///
/// ```rust
/// use envsubst::Template;
///
/// let template = Template::parse("${greeting:-hi}, $name").unwrap();
/// let mut lookup = |name: &str| (name == "name").then(|| "Ada".to_string());
/// assert_eq!(template.evaluate(&mut lookup).unwrap(), "hi, Ada");
/// ```
pub trait Resolver {
    /// Look up the current value of a parameter.
    fn resolve(&mut self, name: &str) -> Result<Option<String>, EvalError>;

    /// Persist a default computed by `=` or `:=`.
    fn assign(&mut self, name: &str, value: &str) -> Result<(), EvalError> {
        let _ = (name, value);
        Ok(())
    }
}

impl<F> Resolver for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn resolve(&mut self, name: &str) -> Result<Option<String>, EvalError> {
        Ok(self(name))
    }
}

/// An in-memory [`Resolver`] for tests and self-contained use.
///
/// Defaults assigned by `=` and `:=` are stored, so later references
/// within the same evaluation (and later evaluations) see them.
///
/// ```rust
/// use envsubst::{MapResolver, render};
///
/// let mut vars = MapResolver::new();
/// vars.set("user", "ada");
///
/// let out = render("${user^} ${home:=/home/$user} $home", &mut vars).unwrap();
/// assert_eq!(out, "Ada /home/ada /home/ada");
/// assert_eq!(vars.get("home"), Some("/home/ada"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapResolver {
    variables: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn unset(&mut self, name: &str) -> Option<String> {
        self.variables.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.variables
    }
}

impl From<HashMap<String, String>> for MapResolver {
    fn from(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }
}

impl<K, V> FromIterator<(K, V)> for MapResolver
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Resolver for MapResolver {
    fn resolve(&mut self, name: &str) -> Result<Option<String>, EvalError> {
        Ok(self.variables.get(name).cloned())
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), EvalError> {
        self.set(name, value);
        Ok(())
    }
}

/// A [`Resolver`] reading the process environment.
///
/// Assigned defaults go to an in-memory overlay that shadows the
/// environment for the lifetime of the resolver; the process environment
/// itself is never modified. Variables whose value is not valid Unicode
/// are reported as host errors.
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    overlay: HashMap<String, String>,
}

impl EnvResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults assigned so far.
    pub fn assigned(&self) -> &HashMap<String, String> {
        &self.overlay
    }
}

impl Resolver for EnvResolver {
    fn resolve(&mut self, name: &str) -> Result<Option<String>, EvalError> {
        if let Some(value) = self.overlay.get(name) {
            return Ok(Some(value.clone()));
        }
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(EvalError::host_error(format!(
                "environment variable {name} is not valid unicode"
            ))
            .with_source(e)),
        }
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), EvalError> {
        self.overlay.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
