//! Builder para `SequentialRunner`.
//!
//! ```ignore
//! let mut runner = SequentialRunner::builder()
//!     .hook(TeeHook::new(config))
//!     .default_factory(MemoryFactory::with_copy_mode(Some(CopyMode::Assign)))
//!     .build();
//! ```

use crate::event::EventStore;
use crate::hooks::{HookManager, PipelineHook};
use crate::io::{DatasetFactory, MemoryFactory};

use super::SequentialRunner;

pub struct RunnerBuilder<E: EventStore> {
    event_store: E,
    hooks: HookManager,
    default_factory: Option<Box<dyn DatasetFactory>>,
}

impl<E: EventStore> RunnerBuilder<E> {
    pub(crate) fn new(event_store: E) -> Self {
        Self { event_store, hooks: HookManager::new(), default_factory: None }
    }

    /// Registra un hook; el orden de registro es el orden de invocación.
    pub fn hook<H: PipelineHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.register(Box::new(hook));
        self
    }

    pub fn hooks<I>(mut self, hooks: I) -> Self
        where I: IntoIterator<Item = Box<dyn PipelineHook>>
    {
        for h in hooks {
            self.hooks.register(h);
        }
        self
    }

    pub fn default_factory<F: DatasetFactory + 'static>(mut self, factory: F) -> Self {
        self.default_factory = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> SequentialRunner<E> {
        let factory = self.default_factory.unwrap_or_else(|| Box::new(MemoryFactory::new()));
        SequentialRunner::with_parts(self.event_store, self.hooks, factory)
    }
}
