use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use evalexpr::{ContextWithMutableVariables, EvalexprError, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("the {target} id {id} is outside of 0..{count}")]
    OutOfRange {
        target: &'static str,
        id: usize,
        count: usize,
    },
    #[error(transparent)]
    Context(#[from] EvalexprError),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

type VariableMap = HashMap<String, Value>;

#[derive(Debug, Default)]
struct ProviderTables {
    global: VariableMap,
    per_topic: HashMap<usize, VariableMap>,
    per_word_a: HashMap<usize, VariableMap>,
    per_word_b: HashMap<usize, VariableMap>,
    per_topic_word_a: HashMap<(usize, usize), VariableMap>,
    per_topic_word_b: HashMap<(usize, usize), VariableMap>,
}

/// Pre-materialized variable overlays for the translation engine, keyed by
/// scope. The engine applies them beneath nothing and above its computed
/// defaults: per-topic-word wins over per-word wins over per-topic wins over
/// global.
#[derive(Debug, Clone, Default)]
#[repr(transparent)]
pub struct VariableProvider {
    inner: Arc<VariableProviderInner>,
}

#[derive(Debug, Default)]
struct VariableProviderInner {
    topic_count: usize,
    word_count_a: usize,
    word_count_b: usize,
    tables: RwLock<ProviderTables>,
}

impl VariableProvider {
    pub fn new(topic_count: usize, word_count_a: usize, word_count_b: usize) -> Self {
        Self {
            inner: Arc::new(VariableProviderInner {
                topic_count,
                word_count_a,
                word_count_b,
                tables: RwLock::default(),
            }),
        }
    }

    fn check(target: &'static str, id: usize, count: usize) -> ProviderResult<()> {
        if id < count {
            Ok(())
        } else {
            Err(ProviderError::OutOfRange { target, id, count })
        }
    }

    fn with_tables_mut(&self, block: impl FnOnce(&mut ProviderTables)) {
        block(&mut self.inner.tables.write().expect("provider lock is never poisoned"))
    }

    pub fn add_global(&self, key: impl AsRef<str>, value: impl Into<Value>) -> ProviderResult<()> {
        let (key, value) = (key.as_ref().to_string(), value.into());
        self.with_tables_mut(|tables| {
            tables.global.insert(key, value);
        });
        Ok(())
    }

    pub fn add_for_topic(
        &self,
        topic_id: usize,
        key: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> ProviderResult<()> {
        Self::check("topic", topic_id, self.inner.topic_count)?;
        let (key, value) = (key.as_ref().to_string(), value.into());
        self.with_tables_mut(|tables| {
            tables.per_topic.entry(topic_id).or_default().insert(key, value);
        });
        Ok(())
    }

    pub fn add_for_word_a(
        &self,
        word_id: usize,
        key: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> ProviderResult<()> {
        Self::check("word a", word_id, self.inner.word_count_a)?;
        let (key, value) = (key.as_ref().to_string(), value.into());
        self.with_tables_mut(|tables| {
            tables.per_word_a.entry(word_id).or_default().insert(key, value);
        });
        Ok(())
    }

    pub fn add_for_word_b(
        &self,
        word_id: usize,
        key: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> ProviderResult<()> {
        Self::check("word b", word_id, self.inner.word_count_b)?;
        let (key, value) = (key.as_ref().to_string(), value.into());
        self.with_tables_mut(|tables| {
            tables.per_word_b.entry(word_id).or_default().insert(key, value);
        });
        Ok(())
    }

    pub fn add_for_word_in_topic_a(
        &self,
        topic_id: usize,
        word_id: usize,
        key: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> ProviderResult<()> {
        Self::check("topic", topic_id, self.inner.topic_count)?;
        Self::check("word a", word_id, self.inner.word_count_a)?;
        let (key, value) = (key.as_ref().to_string(), value.into());
        self.with_tables_mut(|tables| {
            tables
                .per_topic_word_a
                .entry((topic_id, word_id))
                .or_default()
                .insert(key, value);
        });
        Ok(())
    }

    pub fn add_for_word_in_topic_b(
        &self,
        topic_id: usize,
        word_id: usize,
        key: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> ProviderResult<()> {
        Self::check("topic", topic_id, self.inner.topic_count)?;
        Self::check("word b", word_id, self.inner.word_count_b)?;
        let (key, value) = (key.as_ref().to_string(), value.into());
        self.with_tables_mut(|tables| {
            tables
                .per_topic_word_b
                .entry((topic_id, word_id))
                .or_default()
                .insert(key, value);
        });
        Ok(())
    }

    fn provide_map(
        map: Option<&VariableMap>,
        target: &mut impl ContextWithMutableVariables,
    ) -> ProviderResult<()> {
        if let Some(map) = map {
            for (key, value) in map.iter() {
                target.set_value(key.clone(), value.clone())?;
            }
        }
        Ok(())
    }

    pub fn provide_global(&self, target: &mut impl ContextWithMutableVariables) -> ProviderResult<()> {
        log::trace!(target: "provider", "provide_global");
        let tables = self.inner.tables.read().expect("provider lock is never poisoned");
        Self::provide_map(Some(&tables.global), target)
    }

    pub fn provide_for_topic(
        &self,
        topic_id: usize,
        target: &mut impl ContextWithMutableVariables,
    ) -> ProviderResult<()> {
        log::trace!(target: "provider", "provide_for_topic({topic_id})");
        let tables = self.inner.tables.read().expect("provider lock is never poisoned");
        Self::provide_map(tables.per_topic.get(&topic_id), target)
    }

    pub fn provide_for_word_a(
        &self,
        word_id: usize,
        target: &mut impl ContextWithMutableVariables,
    ) -> ProviderResult<()> {
        log::trace!(target: "provider", "provide_for_word_a({word_id})");
        let tables = self.inner.tables.read().expect("provider lock is never poisoned");
        Self::provide_map(tables.per_word_a.get(&word_id), target)
    }

    pub fn provide_for_word_b(
        &self,
        word_id: usize,
        target: &mut impl ContextWithMutableVariables,
    ) -> ProviderResult<()> {
        log::trace!(target: "provider", "provide_for_word_b({word_id})");
        let tables = self.inner.tables.read().expect("provider lock is never poisoned");
        Self::provide_map(tables.per_word_b.get(&word_id), target)
    }

    pub fn provide_for_word_in_topic_a(
        &self,
        topic_id: usize,
        word_id: usize,
        target: &mut impl ContextWithMutableVariables,
    ) -> ProviderResult<()> {
        log::trace!(target: "provider", "provide_for_word_in_topic_a({topic_id}, {word_id})");
        let tables = self.inner.tables.read().expect("provider lock is never poisoned");
        Self::provide_map(tables.per_topic_word_a.get(&(topic_id, word_id)), target)
    }

    pub fn provide_for_word_in_topic_b(
        &self,
        topic_id: usize,
        word_id: usize,
        target: &mut impl ContextWithMutableVariables,
    ) -> ProviderResult<()> {
        log::trace!(target: "provider", "provide_for_word_in_topic_b({topic_id}, {word_id})");
        let tables = self.inner.tables.read().expect("provider lock is never poisoned");
        Self::provide_map(tables.per_topic_word_b.get(&(topic_id, word_id)), target)
    }
}

#[cfg(test)]
mod test {
    use evalexpr::{Context, HashMapContext, Value};

    use super::VariableProvider;

    #[test]
    fn most_specific_layer_wins() {
        let provider = VariableProvider::new(2, 3, 3);
        provider.add_global("x", 1).unwrap();
        provider.add_for_topic(0, "x", 2).unwrap();
        provider.add_for_word_a(1, "x", 3).unwrap();
        provider.add_for_word_in_topic_a(0, 1, "x", 4).unwrap();

        let mut context = HashMapContext::new();
        provider.provide_global(&mut context).unwrap();
        provider.provide_for_topic(0, &mut context).unwrap();
        provider.provide_for_word_a(1, &mut context).unwrap();
        provider.provide_for_word_in_topic_a(0, 1, &mut context).unwrap();
        assert_eq!(Some(&Value::from(4)), context.get_value("x"));
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        let provider = VariableProvider::new(1, 1, 1);
        assert!(provider.add_for_topic(1, "x", 1).is_err());
        assert!(provider.add_for_word_a(2, "x", 1).is_err());
        assert!(provider.add_for_word_in_topic_b(0, 5, "x", 1).is_err());
    }
}
