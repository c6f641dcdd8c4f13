//! Lazily constructed, shared summarizer handle.
//!
//! A [`ModelHandle`] builds its [`Summarizer`] on first use and hands out
//! the same `Arc` to every later caller. Construction is attempted at most
//! once: if it failed, every later [`ModelHandle::get`] returns the same
//! [`SummarizeError::ModelUnavailable`] without trying again.

use condense_core::{SummarizeError, Summarizer};
use std::sync::{Arc, OnceLock};

use crate::config::ModelConfig;
use crate::provider::create_summarizer;

type Factory = Box<dyn Fn() -> anyhow::Result<Arc<dyn Summarizer>> + Send + Sync>;

pub struct ModelHandle {
    factory: Factory,
    cell: OnceLock<Result<Arc<dyn Summarizer>, String>>,
}

impl ModelHandle {
    /// Handle that builds the provider selected by `config` on first use.
    pub fn from_config(config: &ModelConfig) -> Self {
        let config = config.clone();
        Self::with_factory(move || create_summarizer(&config).map(Arc::from))
    }

    /// Handle with a custom construction function.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn Summarizer>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceLock::new(),
        }
    }

    /// Handle around an already constructed summarizer.
    pub fn ready(summarizer: Arc<dyn Summarizer>) -> Self {
        let handle = Self::with_factory(|| anyhow::bail!("model handle already initialized"));
        let _ = handle.cell.set(Ok(summarizer));
        handle
    }

    /// The shared summarizer, constructing it on first call.
    pub fn get(&self) -> Result<Arc<dyn Summarizer>, SummarizeError> {
        let slot = self.cell.get_or_init(|| match (self.factory)() {
            Ok(s) => {
                tracing::info!(model = s.model_name(), "summarization model ready");
                Ok(s)
            }
            Err(e) => {
                tracing::error!(error = %e, "model initialization failed");
                Err(e.to_string())
            }
        });

        match slot {
            Ok(s) => Ok(Arc::clone(s)),
            Err(reason) => Err(SummarizeError::ModelUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// `true` once construction has been attempted.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
