use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Agent credentials embedded into every hostConnect request
#[derive(Clone)]
pub struct Credentials {
    pub agent_id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("agent_id", &self.agent_id)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "SG")]
    Single,
    #[default]
    #[serde(rename = "DB")]
    Double,
    #[serde(rename = "TW")]
    Twin,
    #[serde(rename = "TR")]
    Triple,
    #[serde(rename = "QU")]
    Quad,
}

impl RoomType {
    pub fn code(&self) -> &'static str {
        match self {
            RoomType::Single => "SG",
            RoomType::Double => "DB",
            RoomType::Twin => "TW",
            RoomType::Triple => "TR",
            RoomType::Quad => "QU",
        }
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SG" => Ok(RoomType::Single),
            "DB" => Ok(RoomType::Double),
            "TW" => Ok(RoomType::Twin),
            "TR" => Ok(RoomType::Triple),
            "QU" => Ok(RoomType::Quad),
            other => Err(format!("unknown room type {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoomConfig {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(rename = "Type", default)]
    pub room_type: RoomType,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl RoomConfig {
    pub fn adults(adults: u32) -> Self {
        Self {
            adults,
            children: 0,
            infants: 0,
            room_type: RoomType::Double,
            quantity: 1,
        }
    }

    // Field ranges the booking funnel accepts
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=9).contains(&self.adults) {
            return Err(format!("Adults: must be between 1 and 9, got {}", self.adults));
        }
        if self.children > 9 {
            return Err(format!("Children: must be at most 9, got {}", self.children));
        }
        if self.infants > 9 {
            return Err(format!("Infants: must be at most 9, got {}", self.infants));
        }
        if !(1..=9).contains(&self.quantity) {
            return Err(format!(
                "Quantity: must be between 1 and 9, got {}",
                self.quantity
            ));
        }
        Ok(())
    }
}

/// Product categories as the vendor names its service buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "Day Tours")]
    DayTours,
    #[serde(rename = "Group Tours", alias = "Guided group tours")]
    GroupTours,
    #[serde(rename = "Accommodation")]
    Accommodation,
    #[serde(rename = "Cruises")]
    Cruises,
    #[serde(rename = "Rail", alias = "Rail journeys")]
    Rail,
    #[serde(rename = "Packages", alias = "Pre-designed packages")]
    Packages,
    #[serde(rename = "Special Offers")]
    SpecialOffers,
}

impl ProductType {
    pub fn button_name(&self) -> &'static str {
        match self {
            ProductType::DayTours => "Day Tours",
            ProductType::GroupTours => "Group Tours",
            ProductType::Accommodation => "Accommodation",
            ProductType::Cruises => "Cruises",
            ProductType::Rail => "Rail",
            ProductType::Packages => "Packages",
            ProductType::SpecialOffers => "Special Offers",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.button_name())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Day Tours" => Ok(ProductType::DayTours),
            "Group Tours" | "Guided group tours" => Ok(ProductType::GroupTours),
            "Accommodation" => Ok(ProductType::Accommodation),
            "Cruises" => Ok(ProductType::Cruises),
            "Rail" | "Rail journeys" => Ok(ProductType::Rail),
            "Packages" | "Pre-designed packages" => Ok(ProductType::Packages),
            "Special Offers" => Ok(ProductType::SpecialOffers),
            other => Err(format!("unknown product type {other}")),
        }
    }
}

// Search criteria, built per HTTP request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adults: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub room_configs: Vec<RoomConfig>,
}

impl SearchCriteria {
    pub fn new(product_type: ProductType) -> Self {
        Self {
            product_type,
            country: None,
            destination: None,
            class_filter: None,
            date_from: None,
            date_to: None,
            adults: None,
            children: None,
            room_configs: Vec::new(),
        }
    }

    /// Destination with blank values and the literal `all` treated as absent.
    pub fn effective_destination(&self) -> Option<&str> {
        self.destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("all"))
    }

    pub fn effective_class(&self) -> Option<&str> {
        self.class_filter
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub currency: String,
    pub rate_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    // Minor units, as the vendor sends them
    pub single_rate: i64,
    pub double_rate: i64,
    pub twin_rate: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
}

impl Rate {
    pub fn price_on_application() -> Self {
        Self {
            currency: "AUD".to_string(),
            rate_name: "Price on Application".to_string(),
            ..Self::default()
        }
    }

    pub fn is_price_on_application(&self) -> bool {
        self.single_rate == 0 && self.double_rate == 0 && self.twin_rate == 0
    }

    // Per-person display price in major units: twin/double is a room total for two
    pub fn display_price(&self) -> String {
        let shared = if self.twin_rate > 0 {
            self.twin_rate
        } else {
            self.double_rate
        };
        let major = if shared > 0 {
            (shared as f64 / 2.0 / 100.0).round() as i64
        } else if self.single_rate > 0 {
            (self.single_rate as f64 / 100.0).round() as i64
        } else {
            return "POA".to_string();
        };
        format!("{} ${}", self.currency, group_thousands(major))
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductNote {
    pub category: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: String,
    pub name: String,
    pub description: String,
    pub supplier: String,
    pub locality: String,
    #[serde(rename = "class")]
    pub class_description: String,
    pub duration: String,
    pub periods: u32,
    pub countries: Vec<String>,
    pub rates: Vec<Rate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ProductNote>,
    pub content: ProductContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_price: Option<String>,
}

impl Product {
    // Lowest non-zero per-person price across all rates
    pub fn cheapest_price(&self) -> Option<String> {
        self.rates
            .iter()
            .filter(|r| !r.is_price_on_application())
            .min_by_key(|r| {
                let shared = r.twin_rate.max(r.double_rate);
                if shared > 0 {
                    shared / 2
                } else {
                    r.single_rate
                }
            })
            .map(Rate::display_price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDate {
    pub date: String,
    pub availability: i64,
    pub day_of_week: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureWindow {
    pub date_from: String,
    pub date_to: String,
    pub departure_days: Vec<String>,
}

// A booking line sent to the vendor as AddServiceRequest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub product_code: String,
    #[serde(default)]
    pub rate_id: Option<String>,
    pub date_from: String,
    #[serde(default)]
    pub adults: Option<u32>,
    #[serde(default)]
    pub children: Option<u32>,
    #[serde(default)]
    pub room_configs: Vec<RoomConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
    Booking,
    Quote,
}

impl BookingKind {
    pub fn qb(&self) -> &'static str {
        match self {
            BookingKind::Booking => "B",
            BookingKind::Quote => "Q",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub customer_name: String,
    pub kind: BookingKind,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub reference: String,
    pub status: String,
    pub total_cost: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    pub service_line_id: String,
    pub product_code: String,
    pub product_name: String,
    pub date_from: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub booking_id: String,
    pub reference: String,
    pub status: String,
    pub customer_name: String,
    pub total_cost: i64,
    pub total_paid: i64,
    pub currency: String,
    pub services: Vec<ServiceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub name: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonDetails {
    pub localities: Vec<String>,
    pub classes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Rate { currency: "AUD".into(), twin_rate: 450_000, ..Rate::default() }, "AUD $2,250"; "twin is shared")]
    #[test_case(Rate { currency: "USD".into(), double_rate: 120_000, ..Rate::default() }, "USD $600"; "double when no twin")]
    #[test_case(Rate { currency: "AUD".into(), single_rate: 99_950, ..Rate::default() }, "AUD $1,000"; "single rounds")]
    #[test_case(Rate::price_on_application(), "POA"; "no price")]
    fn test_display_price(rate: Rate, expected: &str) {
        assert_eq!(rate.display_price(), expected);
    }

    #[test]
    fn test_product_type_aliases() {
        let parsed: ProductType = serde_json::from_str("\"Guided group tours\"").unwrap();
        assert_eq!(parsed, ProductType::GroupTours);
        assert_eq!("Rail journeys".parse::<ProductType>(), Ok(ProductType::Rail));
    }

    #[test]
    fn test_room_config_defaults_and_validation() {
        let config: RoomConfig = serde_json::from_str(r#"{"Adults": 2, "Type": "TW"}"#).unwrap();
        assert_eq!(config.room_type, RoomType::Twin);
        assert_eq!(config.quantity, 1);
        assert!(config.validate().is_ok());

        let too_many = RoomConfig {
            adults: 10,
            ..RoomConfig::adults(2)
        };
        assert!(too_many.validate().unwrap_err().starts_with("Adults"));
    }

    #[test]
    fn test_effective_destination_ignores_all() {
        let mut criteria = SearchCriteria::new(ProductType::GroupTours);
        criteria.destination = Some(" All ".to_string());
        assert_eq!(criteria.effective_destination(), None);
        criteria.destination = Some("Nairobi".to_string());
        assert_eq!(criteria.effective_destination(), Some("Nairobi"));
    }

    #[test]
    fn test_cheapest_price_skips_poa() {
        let product = Product {
            rates: vec![
                Rate {
                    currency: "AUD".into(),
                    twin_rate: 800_000,
                    ..Rate::default()
                },
                Rate {
                    currency: "AUD".into(),
                    twin_rate: 600_000,
                    ..Rate::default()
                },
                Rate::price_on_application(),
            ],
            ..Product::default()
        };
        assert_eq!(product.cheapest_price().as_deref(), Some("AUD $3,000"));
        assert_eq!(Product::default().cheapest_price(), None);
    }
}
