// hostConnect reply documents and their conversion into domain types
use crate::types::{
    AgentInfo, AvailableDate, BookingConfirmation, BookingDetails, ButtonDetails,
    DepartureWindow, Product, ProductContent, ProductNote, Rate, ServiceLine,
};
use crate::xml_request::XmlError;
use chrono::{Duration, NaiveDate};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CURRENCY: &str = "AUD";

/// Error returned by hostConnect inside an `ErrorReply`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("hostConnect error {code}: {message}")]
pub struct VendorError {
    pub code: u16,
    pub message: String,
    pub detail: String,
}

impl VendorError {
    pub const GENERAL: u16 = 1000;
    pub const MISSING_INPUT: u16 = 1001;
    pub const ILLEGAL_INPUT: u16 = 1002;
    pub const COMMUNICATIONS: u16 = 1003;
    pub const BOOKING_NOT_FOUND: u16 = 1050;
    pub const AUTH_FAILED: u16 = 1051;
    pub const PRODUCT_NOT_FOUND: u16 = 1052;

    pub fn from_detail(detail: &str) -> Self {
        let code = first_four_digit_number(detail).unwrap_or(Self::GENERAL);
        Self {
            code,
            message: friendly_message(code).to_string(),
            detail: detail.trim().to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.code, Self::BOOKING_NOT_FOUND | Self::PRODUCT_NOT_FOUND)
    }

    pub fn is_auth(&self) -> bool {
        self.code == Self::AUTH_FAILED
    }
}

fn friendly_message(code: u16) -> &'static str {
    match code {
        VendorError::MISSING_INPUT => "Required information is missing",
        VendorError::ILLEGAL_INPUT => "Invalid input provided",
        VendorError::COMMUNICATIONS => "Unable to connect to booking system",
        VendorError::BOOKING_NOT_FOUND => "Booking not found",
        VendorError::AUTH_FAILED => "Authentication failed",
        VendorError::PRODUCT_NOT_FOUND => "Product not found",
        _ => "An error occurred processing your request",
    }
}

fn first_four_digit_number(text: &str) -> Option<u16> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 4)
        .and_then(|run| run.parse().ok())
}

#[derive(Error, Debug)]
pub enum ReplyError {
    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error(transparent)]
    Xml(#[from] XmlError),
}

// Reply envelope
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Reply {
    pub error_reply: Option<XmlErrorReply>,
    pub error: Option<XmlErrorReply>,
    pub ping_reply: Option<Presence>,
    pub agent_info_reply: Option<XmlAgentInfoReply>,
    pub get_service_button_details_reply: Option<XmlButtonDetailsReply>,
    pub option_info_reply: Option<XmlOptionInfoReply>,
    pub add_service_reply: Option<XmlAddServiceReply>,
    pub get_booking_reply: Option<XmlGetBookingReply>,
    pub quote_to_book_reply: Option<XmlStatusReply>,
    pub cancel_services_reply: Option<XmlStatusReply>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Presence {}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlErrorReply {
    pub error: String,
    pub error_code: String,
    pub error_message: String,
    #[serde(rename = "$text")]
    pub text: String,
}

impl XmlErrorReply {
    fn into_vendor_error(self) -> VendorError {
        let detail = [self.error, self.error_message, self.text]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default();
        let mut error = VendorError::from_detail(&detail);
        if let Some(code) = first_four_digit_number(&self.error_code) {
            error.code = code;
            error.message = friendly_message(code).to_string();
        }
        error
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlAgentInfoReply {
    pub name: String,
    pub currency: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlButtonDetailsReply {
    pub locality_descriptions: XmlLocalityDescriptions,
    pub class_descriptions: XmlClassDescriptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct XmlLocalityDescriptions {
    #[serde(rename = "LocalityDescription")]
    pub items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct XmlClassDescriptions {
    #[serde(rename = "ClassDescription")]
    pub items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlOptionInfoReply {
    #[serde(rename = "Option")]
    pub options: Vec<XmlOption>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlOption {
    pub opt: String,
    pub opt_general: XmlOptGeneral,
    pub opt_date_ranges: XmlOptDateRanges,
    pub opt_stay_results: Option<XmlOptStayResults>,
    pub opt_avail: Option<String>,
    pub amenities: XmlAmenities,
    pub option_notes: XmlOptionNotes,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlOptGeneral {
    pub description: String,
    pub comment: String,
    pub supplier_name: String,
    pub locality: String,
    pub locality_description: String,
    pub class_description: String,
    pub periods: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlOptDateRanges {
    #[serde(rename = "OptDateRange")]
    pub ranges: Vec<XmlOptDateRange>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlOptDateRange {
    pub date_from: String,
    pub date_to: String,
    pub currency: String,
    pub applies_days_of_week: Option<XmlDaysOfWeek>,
    pub rate_sets: XmlRateSets,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlRateSets {
    #[serde(rename = "RateSet")]
    pub sets: Vec<XmlRateSet>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRateSet {
    pub rate_name: String,
    pub applies_days_of_week: Option<XmlDaysOfWeek>,
    pub opt_rate: Option<XmlOptRate>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlOptRate {
    pub room_rates: Option<XmlRoomRates>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRoomRates {
    #[serde(alias = "Single")]
    pub single_rate: Option<String>,
    #[serde(alias = "Double")]
    pub double_rate: Option<String>,
    #[serde(alias = "Twin")]
    pub twin_rate: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlDaysOfWeek {
    #[serde(rename = "@Mon")]
    pub mon: String,
    #[serde(rename = "@Tues")]
    pub tues: String,
    #[serde(rename = "@Weds")]
    pub weds: String,
    #[serde(rename = "@Thurs")]
    pub thurs: String,
    #[serde(rename = "@Fri")]
    pub fri: String,
    #[serde(rename = "@Sat")]
    pub sat: String,
    #[serde(rename = "@Sun")]
    pub sun: String,
}

impl XmlDaysOfWeek {
    pub fn day_names(&self) -> Vec<String> {
        [
            (&self.mon, "Monday"),
            (&self.tues, "Tuesday"),
            (&self.weds, "Wednesday"),
            (&self.thurs, "Thursday"),
            (&self.fri, "Friday"),
            (&self.sat, "Saturday"),
            (&self.sun, "Sunday"),
        ]
        .into_iter()
        .filter(|(flag, _)| flag.eq_ignore_ascii_case("Y"))
        .map(|(_, name)| name.to_string())
        .collect()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlOptStayResults {
    pub currency: String,
    pub agent_price: Option<String>,
    pub total_price: Option<String>,
    pub rate_name: String,
    pub period_value_adds: Option<XmlPeriodValueAdds>,
    pub rate_set: Option<XmlStayRateSet>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlPeriodValueAdds {
    #[serde(rename = "PeriodValueAdd")]
    pub items: Vec<XmlPeriodValueAdd>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlPeriodValueAdd {
    pub date_from: String,
    pub date_to: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlStayRateSet {
    pub rate_stays: XmlRateStays,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlRateStays {
    #[serde(rename = "RateStay")]
    pub stays: Vec<XmlRateStay>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRateStay {
    pub rate_name: String,
    pub stay_pays: XmlStayPays,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlStayPays {
    #[serde(rename = "StayPay")]
    pub pays: Vec<XmlStayPay>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlStayPay {
    pub date: String,
    pub pay: String,
    pub currency: String,
    pub available: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlAmenities {
    #[serde(rename = "Amenity")]
    pub items: Vec<XmlAmenity>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlAmenity {
    pub amenity_code: String,
    pub amenity_category: String,
    pub amenity_description: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct XmlOptionNotes {
    #[serde(rename = "OptionNote")]
    pub notes: Vec<XmlOptionNote>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlOptionNote {
    pub note_category: String,
    pub note_text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlAddServiceReply {
    pub booking_id: String,
    #[serde(alias = "BookingRef")]
    pub r#ref: String,
    pub status: String,
    pub total_cost: String,
    pub currency: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlGetBookingReply {
    pub booking_id: String,
    #[serde(alias = "BookingRef")]
    pub r#ref: String,
    pub status: String,
    pub name: String,
    #[serde(alias = "TotalPrice")]
    pub total_cost: String,
    pub total_paid: String,
    pub currency: String,
    #[serde(alias = "Services")]
    pub service_lines: XmlServiceLines,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct XmlServiceLines {
    #[serde(rename = "ServiceLine", alias = "Service")]
    pub lines: Vec<XmlServiceLine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlServiceLine {
    pub service_line_id: String,
    pub opt: String,
    pub opt_name: String,
    #[serde(alias = "Date")]
    pub date_from: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlStatusReply {
    pub status: String,
}

/// A parsed `Option` plus the raw availability the pricing calendar needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOption {
    pub product: Product,
    pub opt_avail: Vec<i64>,
    pub departure_windows: Vec<DepartureWindow>,
}

impl ParsedOption {
    /// Days with positive `OptAvail` counts, index 0 being `date_from`.
    pub fn available_dates(&self, date_from: NaiveDate) -> Vec<AvailableDate> {
        self.opt_avail
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(offset, count)| {
                let date = date_from + Duration::days(offset as i64);
                AvailableDate {
                    date: date.format("%Y-%m-%d").to_string(),
                    availability: *count,
                    day_of_week: date.format("%A").to_string(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionInfo {
    pub options: Vec<ParsedOption>,
    pub message: Option<String>,
}

// Name of the document element, skipping the declaration and DOCTYPE
fn root_element_name(xml: &str) -> Result<String, XmlError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(XmlError::MissingElement("Reply".to_string())),
            Err(e) => {
                return Err(XmlError::Parse(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => (),
        }
    }
}

/// Deserialize the reply envelope and surface any vendor error.
pub fn parse_reply(xml: &str) -> Result<Reply, ReplyError> {
    let root = root_element_name(xml)?;
    if root == "ErrorReply" || root == "Error" {
        let error: XmlErrorReply = from_str(xml).map_err(|e| XmlError::Parse(e.to_string()))?;
        return Err(error.into_vendor_error().into());
    }

    let mut reply: Reply = from_str(xml).map_err(|e| XmlError::Parse(e.to_string()))?;
    if let Some(error) = reply.error_reply.take().or_else(|| reply.error.take()) {
        return Err(error.into_vendor_error().into());
    }
    Ok(reply)
}

fn missing(element: &str) -> ReplyError {
    XmlError::MissingElement(element.to_string()).into()
}

pub fn parse_ping(xml: &str) -> Result<(), ReplyError> {
    parse_reply(xml)?
        .ping_reply
        .map(|_| ())
        .ok_or_else(|| missing("PingReply"))
}

pub fn parse_agent_info(xml: &str) -> Result<AgentInfo, ReplyError> {
    let reply = parse_reply(xml)?
        .agent_info_reply
        .ok_or_else(|| missing("AgentInfoReply"))?;
    Ok(AgentInfo {
        name: reply.name,
        currency: reply.currency,
    })
}

pub fn parse_button_details(xml: &str) -> Result<ButtonDetails, ReplyError> {
    let reply = parse_reply(xml)?
        .get_service_button_details_reply
        .ok_or_else(|| missing("GetServiceButtonDetailsReply"))?;
    Ok(ButtonDetails {
        localities: reply.locality_descriptions.items,
        classes: reply.class_descriptions.items,
    })
}

pub fn parse_option_info(xml: &str) -> Result<OptionInfo, ReplyError> {
    let reply = parse_reply(xml)?
        .option_info_reply
        .ok_or_else(|| missing("OptionInfoReply"))?;
    Ok(OptionInfo {
        options: reply.options.iter().map(XmlOption::to_parsed).collect(),
        message: reply.message.filter(|m| !m.trim().is_empty()),
    })
}

pub fn parse_add_service(xml: &str) -> Result<BookingConfirmation, ReplyError> {
    let reply = parse_reply(xml)?
        .add_service_reply
        .ok_or_else(|| missing("AddServiceReply"))?;
    let status = reply.status.trim().to_string();
    if status != "OK" && status != "??" {
        return Err(VendorError {
            code: VendorError::GENERAL,
            message: "Booking request was not accepted".to_string(),
            detail: format!("AddServiceReply status {}", status),
        }
        .into());
    }
    Ok(BookingConfirmation {
        booking_id: reply.booking_id,
        reference: reply.r#ref,
        status,
        total_cost: parse_minor(&reply.total_cost).unwrap_or(0),
        currency: non_empty_or(reply.currency, DEFAULT_CURRENCY),
    })
}

pub fn parse_get_booking(xml: &str) -> Result<BookingDetails, ReplyError> {
    let reply = parse_reply(xml)?
        .get_booking_reply
        .ok_or_else(|| missing("GetBookingReply"))?;
    Ok(BookingDetails {
        booking_id: reply.booking_id,
        reference: reply.r#ref,
        status: reply.status,
        customer_name: reply.name,
        total_cost: parse_minor(&reply.total_cost).unwrap_or(0),
        total_paid: parse_minor(&reply.total_paid).unwrap_or(0),
        currency: non_empty_or(reply.currency, DEFAULT_CURRENCY),
        services: reply
            .service_lines
            .lines
            .into_iter()
            .map(|line| ServiceLine {
                service_line_id: line.service_line_id,
                product_code: line.opt,
                product_name: line.opt_name,
                date_from: line.date_from,
                status: line.status,
            })
            .collect(),
    })
}

pub fn parse_quote_to_book(xml: &str) -> Result<String, ReplyError> {
    let reply = parse_reply(xml)?
        .quote_to_book_reply
        .ok_or_else(|| missing("QuoteToBookReply"))?;
    Ok(non_empty_or(reply.status, "OK"))
}

pub fn parse_cancel_services(xml: &str) -> Result<String, ReplyError> {
    let reply = parse_reply(xml)?
        .cancel_services_reply
        .ok_or_else(|| missing("CancelServicesReply"))?;
    Ok(non_empty_or(reply.status, "XX"))
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

// Vendor amounts are integer cents; tolerate a decimal point anyway
fn parse_minor(value: &str) -> Option<i64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl XmlOption {
    pub fn to_parsed(&self) -> ParsedOption {
        ParsedOption {
            product: self.to_product(),
            opt_avail: self.opt_avail_counts(),
            departure_windows: self.departure_windows(),
        }
    }

    pub fn to_product(&self) -> Product {
        let general = &self.opt_general;
        let name = non_empty(&general.description)
            .or_else(|| non_empty(&general.supplier_name))
            .unwrap_or_else(|| "Unnamed Product".to_string());
        let periods = general.periods.trim().parse::<u32>().unwrap_or(0);
        let (notes, content) = self.notes_and_content();

        let mut product = Product {
            code: self.opt.trim().to_string(),
            name,
            description: general.comment.trim().to_string(),
            supplier: general.supplier_name.trim().to_string(),
            locality: non_empty(&general.locality_description)
                .or_else(|| non_empty(&general.locality))
                .unwrap_or_default(),
            class_description: general.class_description.trim().to_string(),
            duration: if periods > 0 {
                format!("{} nights", periods)
            } else {
                String::new()
            },
            periods,
            countries: self.countries(),
            rates: self.rates(),
            notes,
            content,
            image: None,
            from_price: None,
        };
        product.from_price = product.cheapest_price();
        product
    }

    /// Rates in minor units, from date ranges, stay totals and per-night stay pays.
    pub fn rates(&self) -> Vec<Rate> {
        let mut rates = Vec::new();

        for range in &self.opt_date_ranges.ranges {
            let currency = non_empty_or(range.currency.clone(), DEFAULT_CURRENCY);
            for set in &range.rate_sets.sets {
                let Some(room_rates) = set.opt_rate.as_ref().and_then(|r| r.room_rates.as_ref())
                else {
                    continue;
                };
                let base = Rate {
                    currency: currency.clone(),
                    date_from: non_empty(&range.date_from),
                    date_to: non_empty(&range.date_to),
                    ..Rate::default()
                };
                if let Some(single) = room_rates.single_rate.as_deref().and_then(parse_minor) {
                    rates.push(Rate {
                        rate_name: non_empty_or(set.rate_name.clone(), "Single"),
                        single_rate: single,
                        ..base.clone()
                    });
                }
                if let Some(double) = room_rates.double_rate.as_deref().and_then(parse_minor) {
                    rates.push(Rate {
                        rate_name: non_empty_or(set.rate_name.clone(), "Double"),
                        double_rate: double,
                        ..base.clone()
                    });
                }
                if let Some(twin) = room_rates.twin_rate.as_deref().and_then(parse_minor) {
                    rates.push(Rate {
                        rate_name: non_empty_or(set.rate_name.clone(), "Twin"),
                        twin_rate: twin,
                        ..base
                    });
                }
            }
        }

        if let Some(stay) = &self.opt_stay_results {
            let price = stay
                .agent_price
                .as_deref()
                .and_then(parse_minor)
                .or_else(|| stay.total_price.as_deref().and_then(parse_minor));
            if let Some(price) = price {
                let period = stay.period_value_adds.as_ref().and_then(|p| p.items.first());
                rates.push(Rate {
                    currency: non_empty_or(stay.currency.clone(), DEFAULT_CURRENCY),
                    rate_name: non_empty_or(stay.rate_name.clone(), "Standard"),
                    date_from: period.and_then(|p| non_empty(&p.date_from)),
                    date_to: period.and_then(|p| non_empty(&p.date_to)),
                    single_rate: price / 2,
                    double_rate: price,
                    twin_rate: price,
                    available: None,
                });
            }

            if let Some(rate_set) = &stay.rate_set {
                for rate_stay in &rate_set.rate_stays.stays {
                    for pay in &rate_stay.stay_pays.pays {
                        rates.push(Rate {
                            currency: non_empty_or(pay.currency.clone(), DEFAULT_CURRENCY),
                            rate_name: non_empty_or(rate_stay.rate_name.clone(), "Standard"),
                            date_from: non_empty(&pay.date),
                            date_to: None,
                            single_rate: parse_minor(&pay.pay).unwrap_or(0),
                            double_rate: 0,
                            twin_rate: 0,
                            available: Some(pay.available.trim().parse().unwrap_or(0)),
                        });
                    }
                }
            }
        }

        if rates.is_empty() {
            rates.push(Rate::price_on_application());
        }
        rates
    }

    fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = Vec::new();
        for amenity in &self.amenities.items {
            if let Some(description) = non_empty(&amenity.amenity_description) {
                if !countries.contains(&description) {
                    countries.push(description);
                }
            }
        }
        countries
    }

    fn notes_and_content(&self) -> (Vec<ProductNote>, ProductContent) {
        let mut content = ProductContent::default();
        let mut notes = Vec::with_capacity(self.option_notes.notes.len());

        for note in &self.option_notes.notes {
            let category = note.note_category.trim().to_string();
            let text = note.note_text.trim().to_string();
            let slot = match category.as_str() {
                "PII" => Some(&mut content.introduction),
                "PDW" | "DTL" => Some(&mut content.details),
                "INC" | "INE" => Some(&mut content.inclusions),
                "EXC" => Some(&mut content.exclusions),
                "PHL" | "HLT" | "SHL" => Some(&mut content.highlights),
                "TRM" | "TCO" => Some(&mut content.terms),
                "MPI" => Some(&mut content.map_image),
                _ => None,
            };
            if let Some(slot) = slot {
                *slot = Some(text.clone());
            }
            notes.push(ProductNote { category, text });
        }
        (notes, content)
    }

    fn opt_avail_counts(&self) -> Vec<i64> {
        self.opt_avail
            .as_deref()
            .map(|raw| {
                raw.split_whitespace()
                    .map(|count| count.parse().unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn departure_windows(&self) -> Vec<DepartureWindow> {
        self.opt_date_ranges
            .ranges
            .iter()
            .map(|range| {
                let mut days: Vec<String> = range
                    .applies_days_of_week
                    .as_ref()
                    .map(XmlDaysOfWeek::day_names)
                    .unwrap_or_default();
                for set in &range.rate_sets.sets {
                    for day in set
                        .applies_days_of_week
                        .as_ref()
                        .map(XmlDaysOfWeek::day_names)
                        .unwrap_or_default()
                    {
                        if !days.contains(&day) {
                            days.push(day);
                        }
                    }
                }
                DepartureWindow {
                    date_from: range.date_from.trim().to_string(),
                    date_to: range.date_to.trim().to_string(),
                    departure_days: days,
                }
            })
            .collect()
    }
}
