// Session & reservation orchestration core for the hostel app: the
// phone+OTP login state machine, the async list caches, the capacity and
// draft-validation rules, and the reservation create/cancel lifecycle.
// Presentation, HTTP transport and at-rest encryption live behind the
// collaborator traits in `transport` and `secure_store`.

pub mod app;
pub mod cache;
pub mod caches;
pub mod capacity;
pub mod error;
pub mod models;
pub mod reservations;
pub mod secure_store;
pub mod session;
pub mod transport;
pub mod validator;

// Re-export key types for convenience
pub use app::AppCore;
pub use cache::{ResourceCache, ResourceState};
pub use caches::ListCaches;
pub use capacity::{occupancy_level, occupancy_ratio, CapacitySnapshot, OccupancyLevel};
pub use error::{CoreError, TransportError, ValidationError};
pub use models::{
    Hostel, HostelDraft, HostelReservation, HostelReservationStatus, PartyType, ReservationKind,
    Schedule, ServiceDraft, ServiceOffering, ServiceReservation, ServiceReservationStatus,
    Session, StoredUser,
};
pub use reservations::ReservationLifecycleController;
pub use secure_store::{MemoryStore, SecureStore};
pub use session::{SessionController, SessionPhase};
pub use transport::Transport;
