// Local record of bookings made through the gateway
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBooking {
    pub id: String,
    pub vendor_booking_id: String,
    pub reference: String,
    pub product_code: String,
    pub customer: Customer,
    pub tour_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub total: i64,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub sequence: u64,
}

/// Everything a caller supplies when recording a booking.
#[derive(Debug, Clone)]
pub struct NewLedgerBooking {
    pub vendor_booking_id: String,
    pub reference: String,
    pub product_code: String,
    pub customer: Customer,
    pub tour_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub total: i64,
    pub currency: String,
    pub status: BookingStatus,
}

#[derive(Debug, Default)]
pub struct BookingLedger {
    bookings: DashMap<String, LedgerBooking>,
    sequence: AtomicU64,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, booking: NewLedgerBooking) -> LedgerBooking {
        let now = Utc::now();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = LedgerBooking {
            id: format!("BK-{}-{:04}", now.format("%Y%m%d"), seq),
            vendor_booking_id: booking.vendor_booking_id,
            reference: booking.reference,
            product_code: booking.product_code,
            customer: booking.customer,
            tour_date: booking.tour_date,
            adults: booking.adults,
            children: booking.children,
            total: booking.total,
            currency: booking.currency,
            payment_status: PaymentStatus::Pending,
            status: booking.status,
            created_at: now,
            updated_at: now,
            sequence: seq,
        };
        self.bookings.insert(record.id.clone(), record.clone());
        record
    }

    pub fn get(&self, id: &str) -> Option<LedgerBooking> {
        self.bookings.get(id).map(|entry| entry.value().clone())
    }

    // Newest first
    pub fn list(&self) -> Vec<LedgerBooking> {
        let mut all: Vec<LedgerBooking> = self
            .bookings
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        all
    }

    pub fn update_payment_status(&self, id: &str, status: PaymentStatus) -> Option<LedgerBooking> {
        self.bookings.get_mut(id).map(|mut entry| {
            entry.payment_status = status;
            entry.updated_at = Utc::now();
            entry.clone()
        })
    }

    /// Mark every booking with the vendor reference as cancelled.
    pub fn cancel_by_reference(&self, reference: &str) -> usize {
        let mut cancelled = 0;
        for mut entry in self.bookings.iter_mut() {
            if entry.reference == reference && entry.status != BookingStatus::Cancelled {
                entry.status = BookingStatus::Cancelled;
                entry.updated_at = Utc::now();
                cancelled += 1;
            }
        }
        cancelled
    }

    pub fn confirm_by_vendor_id(&self, vendor_booking_id: &str) -> usize {
        let mut confirmed = 0;
        for mut entry in self.bookings.iter_mut() {
            if entry.vendor_booking_id == vendor_booking_id
                && entry.status == BookingStatus::Pending
            {
                entry.status = BookingStatus::Confirmed;
                entry.updated_at = Utc::now();
                confirmed += 1;
            }
        }
        confirmed
    }

    /// Confirmed bookings still awaiting payment whose tour falls in `[from, to]`, soonest first.
    pub fn needing_payment_reminders(&self, from: NaiveDate, to: NaiveDate) -> Vec<LedgerBooking> {
        let mut due: Vec<LedgerBooking> = self
            .bookings
            .iter()
            .filter(|entry| {
                entry.status == BookingStatus::Confirmed
                    && entry.payment_status == PaymentStatus::Pending
                    && entry.tour_date >= from
                    && entry.tour_date <= to
            })
            .map(|entry| entry.value().clone())
            .collect();
        due.sort_by_key(|b| b.tour_date);
        due
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}
