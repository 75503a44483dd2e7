use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::voting::errors::VotingParseError;
use crate::voting::parser::{parse_voting, ParsedVoting, VotingFunction};

/// Holds named votings for resolution by the parser and the engine.
#[derive(Debug, Default, Clone)]
pub struct VotingRegistry {
    parsed_votings: Arc<RwLock<HashMap<String, Arc<VotingFunction>>>>,
}

impl VotingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, name: String, voting: Arc<VotingFunction>) -> Arc<VotingFunction> {
        self.parsed_votings
            .write()
            .expect("the registry lock is never poisoned")
            .insert(name, voting.clone());
        voting
    }

    /// Parses a `declare <name> { ... }` source and registers it under the
    /// declared name.
    pub fn register(&self, source: &str) -> Result<Arc<VotingFunction>, VotingParseError> {
        match parse_voting(source, Some(self))? {
            ParsedVoting::ForRegistry(declared) => Ok(self.insert(declared.0, declared.1)),
            _ => Err(VotingParseError::Syntax(
                "register needs a declared voting (declare <name> { ... })".to_string(),
            )),
        }
    }

    /// Parses any voting function source and registers it under `name`,
    /// overriding a declared name if there is one.
    pub fn register_at(
        &self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<Arc<VotingFunction>, VotingParseError> {
        match parse_voting(source, Some(self))? {
            ParsedVoting::ForRegistry(declared) => Ok(self.insert(name.into(), declared.1)),
            ParsedVoting::Parsed(function) => Ok(self.insert(name.into(), Arc::new(function))),
            ParsedVoting::FromRegistry(function) => Ok(self.insert(name.into(), function)),
            _ => Err(VotingParseError::Syntax(
                "only parseable voting functions can be registered".to_string(),
            )),
        }
    }

    /// Returns the registered voting or `None`.
    pub fn get_registered(&self, name: &str) -> Option<Arc<VotingFunction>> {
        self.parsed_votings
            .read()
            .expect("the registry lock is never poisoned")
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.parsed_votings
            .read()
            .expect("the registry lock is never poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::VotingRegistry;

    #[test]
    fn register_lifts_the_declared_name() {
        let registry = VotingRegistry::new();
        registry
            .register("declare my_vote { global: SCORE_CANDIDATE }")
            .unwrap();
        assert!(registry.get_registered("my_vote").is_some());
        assert!(registry.get_registered("unknown").is_none());
    }

    #[test]
    fn register_at_overrides_the_name() {
        let registry = VotingRegistry::new();
        registry
            .register_at("renamed", "declare my_vote { global: SCORE_CANDIDATE }")
            .unwrap();
        assert!(registry.get_registered("renamed").is_some());
        assert!(registry.get_registered("my_vote").is_none());
    }

    #[test]
    fn register_rejects_plain_buildins() {
        let registry = VotingRegistry::new();
        assert!(registry.register("CombSum").is_err());
    }
}
