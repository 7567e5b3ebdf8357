// Top-level wiring: one transport, one secure store, the cache family and
// both controllers. This is also where authorization failures on
// authenticated calls are mapped to a forced logout, so the whole app
// returns to NoSession instead of parking an opaque error in one cache.

use std::sync::Arc;

use tracing::warn;

use crate::cache::ResourceState;
use crate::caches::ListCaches;
use crate::error::CoreError;
use crate::models::{
    Hostel, HostelDraft, HostelReservation, ReservationKind, ServiceDraft, ServiceOffering,
    ServiceReservation,
};
use crate::reservations::ReservationLifecycleController;
use crate::secure_store::SecureStore;
use crate::session::SessionController;
use crate::transport::Transport;

pub struct AppCore {
    transport: Arc<dyn Transport>,
    pub caches: Arc<ListCaches>,
    pub session: Arc<SessionController>,
    pub reservations: Arc<ReservationLifecycleController>,
}

impl AppCore {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn SecureStore>) -> Self {
        let caches = Arc::new(ListCaches::new());
        let session = Arc::new(SessionController::new(
            Arc::clone(&transport),
            store,
            Arc::clone(&caches),
        ));
        let reservations = Arc::new(ReservationLifecycleController::new(
            Arc::clone(&transport),
            Arc::clone(&caches),
        ));
        Self {
            transport,
            caches,
            session,
            reservations,
        }
    }

    pub async fn refresh_hostels(&self, force: bool) -> ResourceState<Vec<Hostel>> {
        let t = Arc::clone(&self.transport);
        let state = self
            .caches
            .hostels
            .fetch_with(force, || async move { t.list_hostels().await })
            .await;
        self.enforce_authorized(&state);
        state
    }

    pub async fn refresh_services(&self, force: bool) -> ResourceState<Vec<ServiceOffering>> {
        let t = Arc::clone(&self.transport);
        let state = self
            .caches
            .services
            .fetch_with(force, || async move { t.list_hostel_services().await })
            .await;
        self.enforce_authorized(&state);
        state
    }

    pub async fn refresh_my_hostel_reservations(
        &self,
        force: bool,
    ) -> ResourceState<Vec<HostelReservation>> {
        let t = Arc::clone(&self.transport);
        let state = self
            .caches
            .my_hostel_reservations
            .fetch_with(force, || async move { t.list_my_hostel_reservations().await })
            .await;
        self.enforce_authorized(&state);
        state
    }

    pub async fn refresh_my_service_reservations(
        &self,
        force: bool,
    ) -> ResourceState<Vec<ServiceReservation>> {
        let t = Arc::clone(&self.transport);
        let state = self
            .caches
            .my_service_reservations
            .fetch_with(force, || async move { t.list_my_service_reservations().await })
            .await;
        self.enforce_authorized(&state);
        state
    }

    pub async fn refresh_upcoming_service_reservations(
        &self,
        force: bool,
    ) -> ResourceState<Vec<ServiceReservation>> {
        let t = Arc::clone(&self.transport);
        let state = self
            .caches
            .upcoming_service_reservations
            .fetch_with(force, || async move {
                t.list_upcoming_service_reservations().await
            })
            .await;
        self.enforce_authorized(&state);
        state
    }

    pub async fn submit_hostel(
        &self,
        draft: &HostelDraft,
    ) -> Result<HostelReservation, CoreError> {
        self.map_expired(self.reservations.submit_hostel(draft).await)
    }

    pub async fn submit_service(
        &self,
        draft: &ServiceDraft,
        offering: &ServiceOffering,
    ) -> Result<ServiceReservation, CoreError> {
        self.map_expired(self.reservations.submit_service(draft, offering).await)
    }

    pub async fn cancel(&self, id: &str, kind: ReservationKind) -> Result<(), CoreError> {
        self.map_expired(self.reservations.cancel(id, kind).await)
    }

    fn enforce_authorized<T>(&self, state: &ResourceState<T>) {
        if let Some(err) = state.error() {
            if err.is_unauthorized() {
                warn!("authenticated call rejected, forcing logout");
                self.session.logout();
            }
        }
    }

    fn map_expired<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        match result {
            Err(CoreError::Transport(err)) if err.is_unauthorized() => {
                warn!("authenticated call rejected, forcing logout");
                self.session.logout();
                Err(CoreError::SessionExpired)
            }
            other => other,
        }
    }
}
