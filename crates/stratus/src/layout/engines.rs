//! Layout engine factory module
//!
//! Engines are selected by [`EngineChoice`] and created on first use. The
//! builder keeps every engine it creates so repeated layout calls reuse the
//! same instance.

mod layered;
mod nested;

use std::collections::HashMap;

use log::debug;

use crate::layout::{EngineChoice, LayoutEngine};

/// Cache of layout engines keyed by [`EngineChoice`].
#[derive(Default)]
pub struct EngineBuilder {
    engines: HashMap<EngineChoice, Box<dyn LayoutEngine>>,
}

impl EngineBuilder {
    /// Create a new engine builder with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the engine for `choice`, creating it on first request
    pub fn engine(&mut self, choice: EngineChoice) -> &dyn LayoutEngine {
        let engine = self.engines.entry(choice).or_insert_with(|| {
            debug!(engine:? = choice; "Creating layout engine");
            let engine: Box<dyn LayoutEngine> = match choice {
                EngineChoice::Primary => Box::new(layered::Engine::new()),
                EngineChoice::Alternative => Box::new(nested::Engine::new()),
            };
            engine
        });
        // Dereference to avoid returning reference to temporary
        &**engine
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use stratus_core::model::{Connection, Group, Service};

    use super::*;
    use crate::layout::LayoutOptions;

    #[test]
    fn test_engines_are_cached() {
        let mut builder = EngineBuilder::new();
        let first = builder.engine(EngineChoice::Primary) as *const dyn LayoutEngine as *const ();
        let second = builder.engine(EngineChoice::Primary) as *const dyn LayoutEngine as *const ();

        assert_eq!(first, second);
        assert_eq!(builder.engines.len(), 1);
    }

    #[test]
    fn test_both_engines_keep_input_order() {
        let services = vec![
            Service::new("a", "A").with_group("g"),
            Service::new("b", "B"),
            Service::new("c", "C").with_group("g"),
        ];
        let connections = vec![Connection::new("a", "b"), Connection::new("b", "c")];
        let groups = vec![Group::new("g", "G")];
        let options = LayoutOptions::default();

        let mut builder = EngineBuilder::new();
        for choice in [EngineChoice::Primary, EngineChoice::Alternative] {
            let engine = builder.engine(choice);
            let result = block_on(engine.layout(&services, &connections, &groups, &options));

            let ids: Vec<&str> = result.services().iter().map(|s| s.id()).collect();
            assert_eq!(ids, vec!["a", "b", "c"]);
            assert_eq!(result.groups().len(), 1);
            assert!(result.is_finite());
        }
    }
}
