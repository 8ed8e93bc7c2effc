// hostConnect request documents
use crate::types::{
    Credentials, NewBooking, ProductType, RoomConfig, SearchCriteria, ServiceRequest,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

pub const DTD: &str = "hostConnect_5_05_000.dtd";

// Pre-designed packages are searched three years forward from DateFrom
const PACKAGE_SCU_QTY: u32 = 1095;
const DEFAULT_ADULTS: u32 = 2;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML serialization error: {0}")]
    Serialize(String),

    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),
}

/// Detail level requested for a single product via the `Info` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoLevel {
    Details,
    Pricing,
    Summary,
}

impl InfoLevel {
    pub fn code(&self) -> &'static str {
        match self {
            InfoLevel::Details => "GMFTD",
            InfoLevel::Pricing => "GDMA",
            InfoLevel::Summary => "GM",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsBody<'a> {
    #[serde(rename = "AgentID")]
    agent_id: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ButtonDetailsBody<'a> {
    #[serde(rename = "AgentID")]
    agent_id: &'a str,
    password: &'a str,
    button_name: &'a str,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "PascalCase")]
struct OptionInfoBody<'a> {
    #[serde(rename = "AgentID")]
    agent_id: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    opt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    button_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    button_destinations: Option<ButtonDestinations<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_to: Option<&'a str>,
    #[serde(rename = "SCUqty", skip_serializing_if = "Option::is_none")]
    scu_qty: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_configs: Option<SearchRoomConfigs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_convert: Option<&'static str>,
}

#[derive(Serialize)]
struct ButtonDestinations<'a> {
    #[serde(rename = "ButtonDestination")]
    entries: Vec<ButtonDestination<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ButtonDestination<'a> {
    button_name: &'a str,
    destination_name: &'a str,
}

#[derive(Serialize)]
struct SearchRoomConfigs {
    #[serde(rename = "RoomConfig")]
    configs: Vec<SearchRoomConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SearchRoomConfig {
    adults: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_type: Option<&'static str>,
}

impl SearchRoomConfig {
    fn tour(adults: u32, children: u32) -> Self {
        Self {
            adults,
            children: (children > 0).then_some(children),
            room_type: None,
        }
    }

    fn room(config: &RoomConfig) -> Self {
        Self {
            adults: config.adults,
            children: (config.children > 0).then_some(config.children),
            room_type: Some(config.room_type.code()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AddServiceBody<'a> {
    #[serde(rename = "AgentID")]
    agent_id: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_booking_info: Option<NewBookingInfo<'a>>,
    opt: &'a str,
    rate_id: &'a str,
    date_from: &'a str,
    #[serde(rename = "SCUqty", skip_serializing_if = "Option::is_none")]
    scu_qty: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adults: Option<u32>,
    children: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    infants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_configs: Option<BookingRoomConfigs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(rename = "puRemark", skip_serializing_if = "Option::is_none")]
    pu_remark: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    booking_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct NewBookingInfo<'a> {
    name: &'a str,
    #[serde(rename = "QB")]
    qb: &'static str,
}

#[derive(Serialize)]
struct BookingRoomConfigs {
    #[serde(rename = "RoomConfig")]
    configs: Vec<BookingRoomConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BookingRoomConfig {
    adults: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<u32>,
    #[serde(rename = "Type")]
    room_type: &'static str,
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BookingIdBody<'a> {
    #[serde(rename = "AgentID")]
    agent_id: &'a str,
    password: &'a str,
    booking_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_supplier_message: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CancelServicesBody<'a> {
    #[serde(rename = "AgentID")]
    agent_id: &'a str,
    password: &'a str,
    #[serde(rename = "Ref")]
    reference: &'a str,
}

/// Wrap a request body in the hostConnect envelope.
fn envelope<T: Serialize>(kind: &str, body: &T) -> Result<String, XmlError> {
    let inner = quick_xml::se::to_string_with_root(kind, body)
        .map_err(|e| XmlError::Serialize(e.to_string()))?;
    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE Request SYSTEM \"{}\">\n<Request>{}</Request>",
        DTD, inner
    ))
}

/// Builds every hostConnect request document with the agent credentials baked in.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    credentials: Credentials,
}

impl RequestBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn credentials_body(&self) -> CredentialsBody<'_> {
        CredentialsBody {
            agent_id: &self.credentials.agent_id,
            password: &self.credentials.password,
        }
    }

    pub fn ping(&self) -> Result<String, XmlError> {
        envelope("PingRequest", &self.credentials_body())
    }

    pub fn agent_info(&self) -> Result<String, XmlError> {
        envelope("AgentInfoRequest", &self.credentials_body())
    }

    pub fn service_button_details(&self, button_name: &str) -> Result<String, XmlError> {
        envelope(
            "GetServiceButtonDetailsRequest",
            &ButtonDetailsBody {
                agent_id: &self.credentials.agent_id,
                password: &self.credentials.password,
                button_name,
            },
        )
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Result<String, XmlError> {
        self.search_on(criteria, chrono::Local::now().date_naive())
    }

    /// Build the `OptionInfoRequest` for a product-type search.
    ///
    /// `today` anchors the package search when the criteria carry no start date.
    pub fn search_on(
        &self,
        criteria: &SearchCriteria,
        today: NaiveDate,
    ) -> Result<String, XmlError> {
        let adults = criteria
            .adults
            .or_else(|| criteria.room_configs.first().map(|c| c.adults))
            .unwrap_or(DEFAULT_ADULTS);
        let children = criteria
            .children
            .or_else(|| criteria.room_configs.first().map(|c| c.children))
            .unwrap_or(0);
        let destination = criteria.effective_destination();
        let date_from = criteria.date_from.as_deref().filter(|d| !d.trim().is_empty());
        let date_to = criteria.date_to.as_deref().filter(|d| !d.trim().is_empty());

        let mut body = OptionInfoBody {
            agent_id: &self.credentials.agent_id,
            password: &self.credentials.password,
            button_name: Some(criteria.product_type.button_name()),
            destination_name: destination,
            date_from: date_from.map(str::to_string),
            date_to,
            room_configs: Some(SearchRoomConfigs {
                configs: vec![SearchRoomConfig::tour(adults, children)],
            }),
            rate_convert: Some("Y"),
            ..OptionInfoBody::default()
        };

        match criteria.product_type {
            ProductType::DayTours => {
                // Day tours keep an explicit "all" destination
                body.destination_name = criteria
                    .destination
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty());
                body.info = Some("GS");
            }
            ProductType::GroupTours => body.info = Some("GMFTD"),
            ProductType::Packages => {
                body.info = Some("GDM");
                body.date_from = Some(
                    date_from
                        .map(str::to_string)
                        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
                );
                body.date_to = None;
                body.scu_qty = Some(PACKAGE_SCU_QTY);
            }
            ProductType::Rail | ProductType::Cruises | ProductType::SpecialOffers => {}
            ProductType::Accommodation => {
                let rooms: Vec<SearchRoomConfig> = if criteria.room_configs.is_empty() {
                    vec![SearchRoomConfig::room(&RoomConfig::adults(adults))]
                } else {
                    criteria.room_configs.iter().map(SearchRoomConfig::room).collect()
                };
                body.destination_name = None;
                body.button_destinations = destination.map(|name| ButtonDestinations {
                    entries: vec![ButtonDestination {
                        button_name: "",
                        destination_name: name,
                    }],
                });
                body.info = Some("S");
                body.room_configs = Some(SearchRoomConfigs { configs: rooms });
            }
        }

        envelope("OptionInfoRequest", &body)
    }

    /// `OptionInfoRequest` for a single product code.
    pub fn option_info(
        &self,
        code: &str,
        level: InfoLevel,
        date_from: Option<&str>,
        date_to: Option<&str>,
        room_configs: &[RoomConfig],
    ) -> Result<String, XmlError> {
        if code.trim().is_empty() {
            return Err(XmlError::InvalidInput("product code cannot be empty".to_string()));
        }
        let body = OptionInfoBody {
            agent_id: &self.credentials.agent_id,
            password: &self.credentials.password,
            opt: Some(code.trim()),
            info: Some(level.code()),
            date_from: date_from.map(str::to_string),
            date_to,
            room_configs: (!room_configs.is_empty()).then(|| SearchRoomConfigs {
                configs: room_configs.iter().map(SearchRoomConfig::room).collect(),
            }),
            ..OptionInfoBody::default()
        };
        envelope("OptionInfoRequest", &body)
    }

    /// `AddServiceRequest` that opens a new booking (or quote) or extends `booking_id`.
    pub fn add_service(
        &self,
        service: &ServiceRequest,
        new_booking: Option<&NewBooking>,
        booking_id: Option<&str>,
    ) -> Result<String, XmlError> {
        let new_booking_info = match new_booking {
            Some(booking) => {
                let name = booking.customer_name.trim();
                if name.is_empty() {
                    return Err(XmlError::InvalidInput(
                        "Customer name cannot be empty".to_string(),
                    ));
                }
                Some(NewBookingInfo {
                    name,
                    qb: booking.kind.qb(),
                })
            }
            None => None,
        };
        if new_booking_info.is_none() && booking_id.is_none() {
            return Err(XmlError::InvalidInput(
                "either new booking details or a booking id is required".to_string(),
            ));
        }

        let first_room = service.room_configs.first();
        let adults = first_room.map(|c| c.adults).or(service.adults);
        let children = first_room
            .map(|c| c.children)
            .or(service.children)
            .unwrap_or(0);

        let body = AddServiceBody {
            agent_id: &self.credentials.agent_id,
            password: &self.credentials.password,
            new_booking_info,
            opt: &service.product_code,
            rate_id: service
                .rate_id
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or("Default"),
            date_from: &service.date_from,
            scu_qty: first_room.map(|c| c.quantity.max(1)),
            adults,
            children,
            infants: first_room.map(|c| c.infants).filter(|n| *n > 0),
            room_type: first_room.map(|c| c.room_type.code()),
            room_configs: first_room.map(|c| BookingRoomConfigs {
                configs: vec![BookingRoomConfig {
                    adults: c.adults,
                    children: (c.children > 0).then_some(c.children),
                    room_type: c.room_type.code(),
                    quantity: c.quantity.max(1),
                }],
            }),
            email: new_booking.and_then(|b| b.email.as_deref()),
            pu_remark: new_booking.and_then(|b| b.mobile.as_deref()),
            booking_id,
        };
        envelope("AddServiceRequest", &body)
    }

    pub fn get_booking(&self, booking_id: &str) -> Result<String, XmlError> {
        envelope(
            "GetBookingRequest",
            &BookingIdBody {
                agent_id: &self.credentials.agent_id,
                password: &self.credentials.password,
                booking_id,
                send_supplier_message: None,
            },
        )
    }

    pub fn quote_to_book(
        &self,
        booking_id: &str,
        send_supplier_message: bool,
    ) -> Result<String, XmlError> {
        envelope(
            "QuoteToBookRequest",
            &BookingIdBody {
                agent_id: &self.credentials.agent_id,
                password: &self.credentials.password,
                booking_id,
                send_supplier_message: Some(if send_supplier_message { "Y" } else { "N" }),
            },
        )
    }

    pub fn cancel_services(&self, reference: &str) -> Result<String, XmlError> {
        envelope(
            "CancelServicesRequest",
            &CancelServicesBody {
                agent_id: &self.credentials.agent_id,
                password: &self.credentials.password,
                reference,
            },
        )
    }
}
