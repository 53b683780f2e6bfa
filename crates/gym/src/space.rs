//! Action, observation and reward space descriptors.

use crate::Observation;

/// Index into a discrete action space.
pub type Action = usize;

/// A discrete action space whose members carry human-readable names.
///
/// Compiler environments expose optimization passes as actions, so every
/// index maps to a pass flag such as `-mem2reg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpace {
    name: String,
    names: Vec<String>,
}

impl ActionSpace {
    /// A space named `name` whose action `i` is called `names[i]`.
    #[must_use]
    pub fn new(name: impl Into<String>, names: Vec<String>) -> Self {
        Self { name: name.into(), names }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of actions.
    #[must_use]
    pub fn n(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        action < self.names.len()
    }

    /// Name of `action`, if it is a member of the space.
    #[must_use]
    pub fn action_name(&self, action: Action) -> Option<&str> {
        self.names.get(action).map(String::as_str)
    }

    /// Index of the action called `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<Action> {
        self.names.iter().position(|n| n == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Draws a uniformly random member of the space, or `None` if the space
    /// has no members.
    #[must_use]
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Option<Action> {
        (!self.names.is_empty()).then(|| rng.usize(..self.names.len()))
    }
}

/// Declared observation space: a name, a fixed shape and an optional value
/// reported on the terminal step of a provider-ended episode.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSpaceSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub terminal_default: Option<Observation>,
}

impl ObservationSpaceSpec {
    /// A space without a terminal default.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Vec<usize>) -> Self {
        Self { name: name.into(), shape, terminal_default: None }
    }

    /// Declares an all-zero terminal observation.
    #[must_use]
    pub fn with_zero_terminal(mut self) -> Self {
        self.terminal_default = Some(Observation::zeros(&self.shape));
        self
    }

    #[must_use]
    pub fn contains(&self, observation: &Observation) -> bool {
        observation.shape() == self.shape.as_slice()
    }
}

/// Declared reward space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSpaceSpec {
    pub name: String,
}

impl RewardSpaceSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
