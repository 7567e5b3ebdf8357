// Transport collaborator: the opaque asynchronous RPC surface the core
// calls. Implementations own HTTP, token-bearing headers and timeouts; the
// core only sees typed payloads or a `TransportError`.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::{
    Hostel, HostelReservation, NewHostelReservation, NewServiceReservation, ReservationKind,
    ServiceOffering, ServiceReservation, StatusPatch, StoredUser,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneVerificationRequest {
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpVerificationRequest {
    pub phone_number: String,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: StoredUser,
}

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    // Two-step phone verification.
    async fn send_phone_verification(
        &self,
        request: PhoneVerificationRequest,
    ) -> Result<(), TransportError>;
    async fn verify_otp(
        &self,
        request: OtpVerificationRequest,
    ) -> Result<TokenResponse, TransportError>;

    // List endpoints, one per resource cache.
    async fn list_hostels(&self) -> Result<Vec<Hostel>, TransportError>;
    async fn list_hostel_services(&self) -> Result<Vec<ServiceOffering>, TransportError>;
    async fn list_my_hostel_reservations(&self)
        -> Result<Vec<HostelReservation>, TransportError>;
    async fn list_my_service_reservations(
        &self,
    ) -> Result<Vec<ServiceReservation>, TransportError>;
    async fn list_upcoming_service_reservations(
        &self,
    ) -> Result<Vec<ServiceReservation>, TransportError>;

    // Reservation writes. Creates return the server-echoed reservation,
    // which is authoritative over any client-computed initial status.
    async fn create_hostel_reservation(
        &self,
        request: NewHostelReservation,
    ) -> Result<HostelReservation, TransportError>;
    async fn create_service_reservation(
        &self,
        request: NewServiceReservation,
    ) -> Result<ServiceReservation, TransportError>;
    async fn patch_reservation_status(
        &self,
        kind: ReservationKind,
        id: &str,
        patch: StatusPatch,
    ) -> Result<(), TransportError>;
}
