//! A path and the actions registered on it.

use std::collections::HashMap;

use http::Method;

use crate::handler::Action;

/// One normalized path with at most one [`Action`] per method, plus an
/// optional fallback for methods nothing was registered for.
#[derive(Clone, Debug)]
pub struct Route {
    path: String,
    actions: HashMap<Method, Action>,
    fallback: Option<Action>,
}

impl Route {
    /// `path` is stored as given; [`Router`](crate::Router) normalizes it first.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), actions: HashMap::new(), fallback: None }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sets the action for `method`. Last write wins; the replaced action,
    /// if any, is returned.
    pub fn add_action(&mut self, method: Method, action: Action) -> Option<Action> {
        self.actions.insert(method, action)
    }

    /// Sets (or replaces) the fallback action.
    pub fn set_fallback(&mut self, action: Action) -> Option<Action> {
        self.fallback.replace(action)
    }

    pub fn action(&self, method: &Method) -> Option<&Action> {
        self.actions.get(method)
    }

    pub fn fallback(&self) -> Option<&Action> {
        self.fallback.as_ref()
    }

    /// The action for `method`, or the fallback when the method is unmapped.
    pub fn resolve(&self, method: &Method) -> Option<&Action> {
        self.action(method).or(self.fallback.as_ref())
    }

    /// Registered methods, sorted by name.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.actions.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    pub(crate) fn into_parts(self) -> (String, HashMap<Method, Action>, Option<Action>) {
        (self.path, self.actions, self.fallback)
    }
}
