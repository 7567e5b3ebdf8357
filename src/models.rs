// Domain entities and wire payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// An established user session. A non-empty token always comes with a
// non-empty user id; `Session::from_parts` is the only constructor and
// enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub phone: String,
    pub token: String,
}

impl Session {
    pub fn from_parts(user: &StoredUser, token: &str) -> Option<Session> {
        if user.id.is_empty() || token.is_empty() {
            return None;
        }
        let display_name = [user.first_name.as_deref(), user.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Some(Session {
            user_id: user.id.clone(),
            display_name,
            phone: user.phone_number.clone().unwrap_or_default(),
            token: token.to_string(),
        })
    }
}

// Minimal profile persisted next to the token in the secure store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hostel {
    pub id: String,
    pub name: String,
    pub total_capacity: u32,
    pub current_capacity: u32,
    pub men_capacity: u32,
    pub current_men_capacity: u32,
    pub women_capacity: u32,
    pub current_women_capacity: u32,
    pub is_active: bool,
    pub location: String,
    pub formatted_address: String,
    pub coordinates: Vec<f64>,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub day_name: String,
    pub is_available: bool,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f32,
}

// A bookable service offered by a hostel. `needs_approval` drives whether a
// new reservation starts out pending or confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    #[serde(rename = "hostel")]
    pub hostel_id: String,
    #[serde(rename = "service_name")]
    pub name: String,
    #[serde(rename = "service_description")]
    pub description: String,
    #[serde(rename = "service_price")]
    pub price: f64,
    #[serde(rename = "service_max_time")]
    pub max_duration_minutes: u32,
    #[serde(rename = "service_needs_approval")]
    pub needs_approval: bool,
    #[serde(rename = "schedule_data")]
    pub schedule: Option<Schedule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyType {
    Individual,
    Group,
}

impl PartyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PartyType::Individual => "individual",
            PartyType::Group => "group",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PartyType::Individual => "Individual",
            PartyType::Group => "Group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostelReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
    CheckedIn,
    CheckedOut,
}

impl HostelReservationStatus {
    // Only these two statuses may be cancelled by the user; everything else
    // is a server-driven fact the client displays but never mutates.
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            HostelReservationStatus::Pending | HostelReservationStatus::Confirmed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            HostelReservationStatus::Pending => "Pending",
            HostelReservationStatus::Confirmed => "Confirmed",
            HostelReservationStatus::Cancelled => "Cancelled",
            HostelReservationStatus::Rejected => "Rejected",
            HostelReservationStatus::CheckedIn => "Checked in",
            HostelReservationStatus::CheckedOut => "Checked out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
    InProgress,
    Completed,
}

impl ServiceReservationStatus {
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            ServiceReservationStatus::Pending | ServiceReservationStatus::Confirmed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceReservationStatus::Pending => "Pending",
            ServiceReservationStatus::Confirmed => "Confirmed",
            ServiceReservationStatus::Cancelled => "Cancelled",
            ServiceReservationStatus::Rejected => "Rejected",
            ServiceReservationStatus::InProgress => "In progress",
            ServiceReservationStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationKind {
    Hostel,
    Service,
}

impl std::fmt::Display for ReservationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationKind::Hostel => write!(f, "hostel"),
            ReservationKind::Service => write!(f, "service"),
        }
    }
}

// Unsubmitted, client-held reservation requests. Target and date stay
// optional until the user completes the selection; the validator decides
// submittability.
#[derive(Debug, Clone, PartialEq)]
pub struct HostelDraft {
    pub hostel_id: Option<String>,
    pub arrival_date: Option<NaiveDate>,
    pub party: PartyType,
    pub men_count: u32,
    pub women_count: u32,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub service_id: Option<String>,
    pub datetime_reserved: Option<DateTime<Utc>>,
    pub party: PartyType,
    pub men_count: u32,
    pub women_count: u32,
    pub user_id: String,
}

// Server-side reservations mirrored locally as list items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostelReservation {
    pub id: String,
    pub hostel_name: String,
    pub hostel_location: String,
    pub arrival_date: NaiveDate,
    #[serde(rename = "type")]
    pub party: PartyType,
    #[serde(rename = "type_display")]
    pub party_display: String,
    pub men_quantity: u32,
    pub women_quantity: u32,
    pub total_people: u32,
    pub status: HostelReservationStatus,
    pub status_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceReservation {
    pub id: String,
    pub service_name: String,
    pub hostel_name: String,
    pub datetime_reserved: DateTime<Utc>,
    pub duration_minutes: u32,
    pub service_price: f64,
    #[serde(rename = "type")]
    pub party: PartyType,
    #[serde(rename = "type_display")]
    pub party_display: String,
    pub men_quantity: u32,
    pub women_quantity: u32,
    pub total_people: u32,
    pub status: ServiceReservationStatus,
    pub status_display: String,
}

// Create payloads, field names matching the reservation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHostelReservation {
    pub arrival_date: NaiveDate,
    pub hostel: String,
    pub men_quantity: u32,
    #[serde(rename = "type")]
    pub party: PartyType,
    pub user: String,
    pub women_quantity: u32,
    pub status: HostelReservationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceReservation {
    pub datetime_reserved: DateTime<Utc>,
    pub men_quantity: u32,
    pub service: String,
    #[serde(rename = "type")]
    pub party: PartyType,
    pub user: String,
    pub women_quantity: u32,
    pub status: ServiceReservationStatus,
}

// Body of the status PATCH used for cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: String,
}
