use crate::cache::ResponseCache;
use crate::client::{ApiError, TourPlanClient};
use crate::config::Config;
use crate::ledger::BookingLedger;
use crate::search::{CacheTtls, Cached, SearchService};
use std::sync::Arc;

pub struct AppState {
    pub search: SearchService,
    pub ledger: BookingLedger,
    pub cache: Arc<ResponseCache<Cached>>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Arc<Self>, ApiError> {
        let client = TourPlanClient::new(config.client_config())?;
        let ttls = CacheTtls {
            search: config.search_ttl,
            product: config.product_ttl,
            destinations: config.destination_ttl,
        };
        let cache = Arc::new(ResponseCache::new(config.cache_config()));
        Ok(Self::from_parts(client, cache, ttls))
    }

    pub fn from_parts(
        client: TourPlanClient,
        cache: Arc<ResponseCache<Cached>>,
        ttls: CacheTtls,
    ) -> Arc<Self> {
        Arc::new(Self {
            search: SearchService::new(client, Arc::clone(&cache), ttls),
            ledger: BookingLedger::new(),
            cache,
        })
    }

    pub fn client(&self) -> &TourPlanClient {
        self.search.client()
    }
}
