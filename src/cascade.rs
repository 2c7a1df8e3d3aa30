//! Ordered fallback over extraction strategies
//!
//! Strategies run in the order they were added. The first one returning
//! records wins and the rest are never invoked.

use tracing::{debug, info, warn};

use crate::document::Document;
use crate::record::PriceRecord;

type StrategyFn<'a> = Box<dyn Fn(&Document<'_>) -> Vec<PriceRecord> + 'a>;

struct Strategy<'a> {
    name: &'static str,
    run: StrategyFn<'a>,
}

pub struct Cascade<'a> {
    provider: &'static str,
    strategies: Vec<Strategy<'a>>,
}

impl<'a> Cascade<'a> {
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy to try after the ones already added
    pub fn then(
        mut self,
        name: &'static str,
        run: impl Fn(&Document<'_>) -> Vec<PriceRecord> + 'a,
    ) -> Self {
        self.strategies.push(Strategy {
            name,
            run: Box::new(run),
        });
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    /// Run strategies until one yields records; empty when all come up empty
    pub fn run(&self, document: &Document<'_>) -> Vec<PriceRecord> {
        for strategy in &self.strategies {
            let records = (strategy.run)(document);
            if !records.is_empty() {
                info!(
                    provider = self.provider,
                    strategy = strategy.name,
                    count = records.len(),
                    "extracted pricing"
                );
                return records;
            }
            debug!(provider = self.provider, strategy = strategy.name, "strategy found nothing");
        }

        warn!(
            provider = self.provider,
            tried = ?self.strategy_names(),
            "every extraction strategy came up empty"
        );
        Vec::new()
    }
}
