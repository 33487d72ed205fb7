//! Catalog entries whose detection is not implemented yet

use super::{NoConfig, Rule, RuleEnv, RuleMetadata, RuleOutcome};
use crate::error::Result;
use async_trait::async_trait;
use serde::de::IgnoredAny;

/// Rule that accepts any context and never triggers
pub struct Placeholder {
    metadata: RuleMetadata,
}

impl Placeholder {
    pub const fn new(metadata: RuleMetadata) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl Rule for Placeholder {
    type Context = IgnoredAny;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        self.metadata
    }

    async fn evaluate(
        &self,
        _context: &IgnoredAny,
        _config: &NoConfig,
        _env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        Ok(RuleOutcome::not_triggered())
    }
}
