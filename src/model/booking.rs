//! Table bookings: the grouping unit for orders placed during one sitting.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::StaffId;

/// Type-safe identifier for table bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(pub u32);

impl From<u32> for BookingId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "booking_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Reserved, nobody has ordered yet.
    Confirmed,
    /// At least one order has been placed.
    Active,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Orders may only be attached while the table is confirmed or seated.
    pub fn accepts_orders(self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBooking {
    pub id: BookingId,
    pub customer_id: StaffId,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub table_number: u32,
    pub number_of_guests: u32,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for reserving a table.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingCreate {
    pub customer_id: StaffId,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub table_number: u32,
    pub number_of_guests: u32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl TableBooking {
    pub fn new(id: BookingId, params: BookingCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            customer_id: params.customer_id,
            booking_date: params.booking_date,
            time_slot: params.time_slot,
            table_number: params.table_number,
            number_of_guests: params.number_of_guests,
            status: BookingStatus::Confirmed,
            special_requests: params.special_requests,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: BookingStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}
