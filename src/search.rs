// Search orchestration: cache, vendor query, catalog fallback and filtering
use crate::cache::{generate_key, CacheStatsReport, ResponseCache};
use crate::catalog;
use crate::client::{ApiError, TourPlanClient};
use crate::pricing::{self, PricingCalendar};
use crate::types::{ButtonDetails, Product, ProductType, RoomConfig, SearchCriteria};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub products: Vec<Product>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SearchOutcome {
    fn found(products: Vec<Product>) -> Self {
        Self {
            total: products.len(),
            products,
            message: None,
        }
    }

    fn empty(message: String) -> Self {
        Self {
            products: Vec::new(),
            total: 0,
            message: Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Destinations {
    pub req_type: String,
    pub country_name: String,
    pub localities: Vec<String>,
    pub classes: Vec<String>,
    pub locality_count: usize,
    pub classes_count: usize,
}

/// Everything the gateway keeps in its single response cache.
#[derive(Debug, Clone)]
pub enum Cached {
    Search(SearchOutcome),
    Product(Product),
    Buttons(ButtonDetails),
}

#[derive(Debug, Clone)]
pub struct CacheTtls {
    pub search: Duration,
    pub product: Duration,
    pub destinations: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            search: Duration::from_secs(300),
            product: Duration::from_secs(600),
            destinations: Duration::from_secs(1800),
        }
    }
}

pub struct SearchService {
    client: TourPlanClient,
    cache: Arc<ResponseCache<Cached>>,
    ttls: CacheTtls,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn is_test_product(product: &Product) -> bool {
    contains_ignore_case(&product.name, "test")
        || contains_ignore_case(&product.description, "test")
}

impl SearchService {
    pub fn new(client: TourPlanClient, cache: Arc<ResponseCache<Cached>>, ttls: CacheTtls) -> Self {
        Self { client, cache, ttls }
    }

    pub fn client(&self) -> &TourPlanClient {
        &self.client
    }

    pub fn cache_stats(&self) -> CacheStatsReport {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub async fn search_products(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<SearchOutcome, ApiError> {
        let key = generate_key("search", criteria);
        if let Some(Cached::Search(outcome)) = self.cache.get(&key) {
            debug!(%key, "search cache hit");
            return Ok(outcome);
        }

        let country = criteria.country.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let class_filter = criteria.effective_class();

        let (mut products, from_vendor) = match (criteria.product_type, country) {
            (ProductType::Rail, _) => {
                (self.fetch_products(catalog::rail_product_codes()).await, false)
            }
            (ProductType::Cruises, Some(country)) => {
                let codes: Vec<&str> = catalog::cruise_products_for_region(country)
                    .iter()
                    .map(|p| p.product_code)
                    .collect();
                (self.fetch_products(&codes).await, false)
            }
            _ => (self.vendor_search(criteria).await?, true),
        };

        let catalog_codes = match (country, class_filter) {
            (Some(country), Some(class)) => {
                catalog::country_class_products(country, class, Some(criteria.product_type))
            }
            _ => None,
        };

        if products.is_empty() {
            if let Some(codes) = catalog_codes {
                info!(
                    product_type = %criteria.product_type,
                    codes = codes.len(),
                    "falling back to catalog products"
                );
                products = self.fetch_products(codes).await;
            }
        } else if from_vendor {
            products = apply_filters(products, criteria, catalog_codes);
        }

        products.retain(|p| !is_test_product(p));

        if products.is_empty() {
            let message = match criteria.effective_destination().or(country) {
                Some(destination) => format!(
                    "No {} found for {}",
                    criteria.product_type.button_name().to_lowercase(),
                    destination
                ),
                None => format!(
                    "Please select a destination to search for {}",
                    criteria.product_type.button_name().to_lowercase()
                ),
            };
            return Ok(SearchOutcome::empty(message));
        }

        let outcome = SearchOutcome::found(products);
        self.cache
            .insert(key, Cached::Search(outcome.clone()), Some(self.ttls.search));
        Ok(outcome)
    }

    // Vendor errors count as an empty result so the catalog can take over
    async fn vendor_search(&self, criteria: &SearchCriteria) -> Result<Vec<Product>, ApiError> {
        match self.client.search_options(criteria).await {
            Ok(info) => Ok(info.options.into_iter().map(|o| o.product).collect()),
            Err(ApiError::Vendor(e)) => {
                warn!(code = e.code, detail = %e.detail, "vendor search failed");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Per-code cached summaries, fetching only the misses. Output follows `codes` order.
    pub async fn fetch_products(&self, codes: &[&str]) -> Vec<Product> {
        let mut found: HashMap<String, Product> = HashMap::new();
        let mut misses = Vec::new();
        for code in codes {
            match self.cache.get(&generate_key("product-detail", code)) {
                Some(Cached::Product(product)) => {
                    found.insert(code.to_string(), product);
                }
                _ => misses.push(*code),
            }
        }

        if !misses.is_empty() {
            for product in self.client.batch_products(&misses).await {
                self.cache.insert(
                    generate_key("product-detail", &product.code),
                    Cached::Product(product.clone()),
                    Some(self.ttls.product),
                );
                found.insert(product.code.clone(), product);
            }
        }

        codes.iter().filter_map(|code| found.remove(*code)).collect()
    }

    /// Localities and classes for a product type. Vendor failures give empty lists.
    pub async fn destinations(&self, country: &str, req_type: &str) -> Destinations {
        let key = generate_key("destinations", req_type);
        let details = match self.cache.get(&key) {
            Some(Cached::Buttons(details)) => details,
            _ => match self.client.service_button_details(req_type).await {
                Ok(details) => {
                    self.cache.insert(
                        key,
                        Cached::Buttons(details.clone()),
                        Some(self.ttls.destinations),
                    );
                    details
                }
                Err(e) => {
                    warn!(req_type, error = %e, "destination lookup failed");
                    ButtonDetails::default()
                }
            },
        };

        Destinations {
            req_type: req_type.to_string(),
            country_name: country.to_string(),
            locality_count: details.localities.len(),
            classes_count: details.classes.len(),
            localities: details.localities,
            classes: details.classes,
        }
    }

    pub async fn product_details(&self, code: &str) -> Result<Product, ApiError> {
        Ok(self.client.product_details(code).await?.product)
    }

    pub async fn pricing_calendar(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
        room_configs: &[RoomConfig],
    ) -> Result<PricingCalendar, ApiError> {
        let date_from = from.format("%Y-%m-%d").to_string();
        let date_to = to.format("%Y-%m-%d").to_string();
        let option = self
            .client
            .product_pricing(code, &date_from, &date_to, room_configs)
            .await?;
        Ok(pricing::build_calendar(&option, from, to))
    }
}

fn apply_filters(
    products: Vec<Product>,
    criteria: &SearchCriteria,
    catalog_codes: Option<&'static [&'static str]>,
) -> Vec<Product> {
    let products: Vec<Product> = match criteria.effective_destination() {
        // Accommodation and cruises are already scoped by the vendor request
        Some(destination)
            if !matches!(
                criteria.product_type,
                ProductType::Accommodation | ProductType::Cruises
            ) =>
        {
            products
                .into_iter()
                .filter(|p| p.locality.is_empty() || contains_ignore_case(&p.locality, destination))
                .collect()
        }
        _ => products,
    };

    let Some(class) = criteria.effective_class() else {
        return products;
    };
    let (matching, rest): (Vec<Product>, Vec<Product>) = products
        .into_iter()
        .partition(|p| contains_ignore_case(&p.class_description, class));
    if !matching.is_empty() {
        return matching;
    }
    match catalog_codes {
        Some(codes) => rest
            .into_iter()
            .filter(|p| codes.contains(&p.code.as_str()))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::client::mock_transport::{client_with, option_reply, MockTransport};

    fn service(transport: Arc<MockTransport>) -> SearchService {
        SearchService::new(
            client_with(transport),
            Arc::new(ResponseCache::new(CacheConfig::default())),
            CacheTtls::default(),
        )
    }

    fn options_reply(products: &[(&str, &str, &str, &str)]) -> String {
        let options: String = products
            .iter()
            .map(|(code, name, locality, class)| {
                format!(
                    "<Option><Opt>{}</Opt><OptGeneral><Description>{}</Description><LocalityDescription>{}</LocalityDescription><ClassDescription>{}</ClassDescription></OptGeneral></Option>",
                    code, name, locality, class
                )
            })
            .collect();
        format!("<Reply><OptionInfoReply>{}</OptionInfoReply></Reply>", options)
    }

    fn group_tours(destination: &str) -> SearchCriteria {
        SearchCriteria {
            destination: Some(destination.to_string()),
            ..SearchCriteria::new(ProductType::GroupTours)
        }
    }

    #[tokio::test]
    async fn test_search_filters_and_caches() {
        let reply = options_reply(&[
            ("A1", "Kenya Classic", "Nairobi", "Deluxe"),
            ("A2", "Test departure", "Nairobi", "Deluxe"),
            ("A3", "Cape Explorer", "Cape Town", "Deluxe"),
        ]);
        let transport = Arc::new(MockTransport::new(move |_, _| Ok(reply.clone())));
        let service = service(Arc::clone(&transport));

        let outcome = service.search_products(&group_tours("Nairobi")).await.unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.products[0].code, "A1");

        let again = service.search_products(&group_tours("Nairobi")).await.unwrap();
        assert_eq!(again, outcome);
        assert_eq!(transport.calls(), 1);
        assert_eq!(service.cache_stats().hit_count, 1);
    }

    #[tokio::test]
    async fn test_empty_vendor_result_falls_back_to_catalog() {
        let transport = Arc::new(MockTransport::new(|xml, _| {
            if xml.contains("<ButtonName>") {
                Ok("<Reply><OptionInfoReply></OptionInfoReply></Reply>".to_string())
            } else {
                let start = xml.find("<Opt>").map(|i| i + 5).unwrap_or(0);
                let end = xml.find("</Opt>").unwrap_or(start);
                Ok(option_reply(&xml[start..end], "Catalog tour"))
            }
        }));
        let service = service(Arc::clone(&transport));
        let criteria = SearchCriteria {
            country: Some("Kenya".to_string()),
            class_filter: Some("Deluxe".to_string()),
            ..SearchCriteria::new(ProductType::GroupTours)
        };
        let expected =
            catalog::country_class_products("Kenya", "Deluxe", Some(ProductType::GroupTours))
                .unwrap();

        let outcome = service.search_products(&criteria).await.unwrap();
        assert_eq!(outcome.total, expected.len());
        assert_eq!(outcome.products[0].code, expected[0]);
    }

    #[tokio::test]
    async fn test_empty_result_messages() {
        let transport = Arc::new(MockTransport::replying(
            "<Reply><ErrorReply><Error>1000 search failed</Error></ErrorReply></Reply>",
        ));
        let service = service(transport);

        let outcome = service.search_products(&group_tours("Atlantis")).await.unwrap();
        assert_eq!(outcome.message.as_deref(), Some("No group tours found for Atlantis"));

        let outcome = service
            .search_products(&SearchCriteria::new(ProductType::DayTours))
            .await
            .unwrap();
        assert_eq!(
            outcome.message.as_deref(),
            Some("Please select a destination to search for day tours")
        );
        assert_eq!(service.cache_stats().items_count, 0);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let transport = Arc::new(MockTransport::new(|_, _| {
            Err(ApiError::NetworkError("connection refused".to_string()))
        }));
        let service = service(transport);
        assert!(matches!(
            service.search_products(&group_tours("Nairobi")).await,
            Err(ApiError::RetriesExhausted { .. })
        ));
    }

    #[tokio::test]
    async fn test_rail_uses_catalog_codes_and_product_cache() {
        let transport = Arc::new(MockTransport::new(|xml, _| {
            let start = xml.find("<Opt>").map(|i| i + 5).unwrap_or(0);
            let end = xml.find("</Opt>").unwrap_or(start);
            Ok(option_reply(&xml[start..end], "Rovos Rail"))
        }));
        let service = service(Arc::clone(&transport));
        let criteria = SearchCriteria::new(ProductType::Rail);

        let outcome = service.search_products(&criteria).await.unwrap();
        assert_eq!(outcome.total, catalog::rail_product_codes().len());
        let calls = transport.calls();

        service.clear_cache();
        let codes = &catalog::rail_product_codes()[..2];
        service.fetch_products(codes).await;
        service.fetch_products(codes).await;
        assert_eq!(transport.calls(), calls + 2);
    }

    #[tokio::test]
    async fn test_class_filter_keeps_catalog_members() {
        let code = catalog::country_class_products("Kenya", "Deluxe", Some(ProductType::GroupTours))
            .unwrap()[0];
        let reply = options_reply(&[
            (code, "Kenya Classic", "", "Standard"),
            ("ZZ9", "Other", "", "Standard"),
        ]);
        let transport = Arc::new(MockTransport::new(move |_, _| Ok(reply.clone())));
        let service = service(transport);
        let criteria = SearchCriteria {
            country: Some("Kenya".to_string()),
            class_filter: Some("Deluxe".to_string()),
            ..SearchCriteria::new(ProductType::GroupTours)
        };
        let outcome = service.search_products(&criteria).await.unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.products[0].code, code);
    }

    #[tokio::test]
    async fn test_destinations_swallow_vendor_failures() {
        let transport = Arc::new(MockTransport::replying(
            "<Reply><ErrorReply><Error>1051 denied</Error></ErrorReply></Reply>",
        ));
        let service = service(transport);
        let result = service.destinations("Kenya", "Day Tours").await;
        assert_eq!(result.locality_count, 0);
        assert_eq!(result.country_name, "Kenya");
    }

    #[tokio::test]
    async fn test_destinations_cached() {
        let transport = Arc::new(MockTransport::replying(
            "<Reply><GetServiceButtonDetailsReply><LocalityDescriptions><LocalityDescription>Nairobi</LocalityDescription></LocalityDescriptions></GetServiceButtonDetailsReply></Reply>",
        ));
        let service = service(Arc::clone(&transport));
        service.destinations("Kenya", "Day Tours").await;
        let result = service.destinations("Kenya", "Day Tours").await;
        assert_eq!(result.localities, vec!["Nairobi"]);
        assert_eq!(transport.calls(), 1);
    }
}
