// Create/cancel orchestration for hostel and service reservations. Drafts
// are gated by the validator before any network call; successful writes
// force-refresh the affected list caches instead of patching local state, so
// the authoritative status always comes from the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::caches::ListCaches;
use crate::error::CoreError;
use crate::models::{
    HostelDraft, HostelReservation, ReservationKind, ServiceDraft, ServiceOffering,
    ServiceReservation, StatusPatch,
};
use crate::transport::Transport;
use crate::validator;

pub struct ReservationLifecycleController {
    transport: Arc<dyn Transport>,
    caches: Arc<ListCaches>,
    // One cancellation may be in flight per reservation kind; many cards
    // share the controller and the presentation layer shows one spinner.
    cancel_hostel: watch::Sender<bool>,
    cancel_service: watch::Sender<bool>,
}

impl ReservationLifecycleController {
    pub fn new(transport: Arc<dyn Transport>, caches: Arc<ListCaches>) -> Self {
        let (cancel_hostel, _) = watch::channel(false);
        let (cancel_service, _) = watch::channel(false);
        Self {
            transport,
            caches,
            cancel_hostel,
            cancel_service,
        }
    }

    pub fn cancel_in_flight(&self, kind: ReservationKind) -> watch::Receiver<bool> {
        self.cancel_flag(kind).subscribe()
    }

    pub async fn submit_hostel(
        &self,
        draft: &HostelDraft,
    ) -> Result<HostelReservation, CoreError> {
        let request = validator::hostel_request(draft)?;
        let created = self.transport.create_hostel_reservation(request).await?;
        debug!("hostel reservation {} created ({})", created.id, created.status_display);
        self.refresh_hostel_lists().await;
        Ok(created)
    }

    pub async fn submit_service(
        &self,
        draft: &ServiceDraft,
        offering: &ServiceOffering,
    ) -> Result<ServiceReservation, CoreError> {
        let request = validator::service_request(draft, offering.needs_approval)?;
        let created = self.transport.create_service_reservation(request).await?;
        debug!("service reservation {} created ({})", created.id, created.status_display);
        self.refresh_service_lists().await;
        Ok(created)
    }

    // Cancel a reservation the user owns. The local precheck mirrors server
    // authority: only pending or confirmed reservations go out on the wire;
    // the server remains the final arbiter.
    pub async fn cancel(&self, id: &str, kind: ReservationKind) -> Result<(), CoreError> {
        self.precheck_cancellable(id, kind)?;

        let flag = self.cancel_flag(kind);
        let acquired = flag.send_if_modified(|in_flight| {
            if *in_flight {
                false
            } else {
                *in_flight = true;
                true
            }
        });
        if !acquired {
            return Err(CoreError::AlreadyInProgress("cancellation"));
        }

        let result = self
            .transport
            .patch_reservation_status(
                kind,
                id,
                StatusPatch {
                    status: "cancelled".to_string(),
                },
            )
            .await;
        flag.send_replace(false);

        match result {
            Ok(()) => {
                debug!("{kind} reservation {id} cancelled");
                match kind {
                    ReservationKind::Hostel => self.refresh_hostel_lists().await,
                    ReservationKind::Service => self.refresh_service_lists().await,
                }
                Ok(())
            }
            Err(err) => {
                warn!("cancellation of {kind} reservation {id} failed: {err}");
                Err(err.into())
            }
        }
    }

    fn cancel_flag(&self, kind: ReservationKind) -> &watch::Sender<bool> {
        match kind {
            ReservationKind::Hostel => &self.cancel_hostel,
            ReservationKind::Service => &self.cancel_service,
        }
    }

    fn precheck_cancellable(&self, id: &str, kind: ReservationKind) -> Result<(), CoreError> {
        match kind {
            ReservationKind::Hostel => {
                if let Some(list) = self.caches.my_hostel_reservations.current().success() {
                    if let Some(reservation) = list.iter().find(|r| r.id == id) {
                        if !reservation.status.is_cancellable() {
                            return Err(CoreError::NotCancellable(
                                reservation.status_display.clone(),
                            ));
                        }
                    }
                }
            }
            ReservationKind::Service => {
                if let Some(list) = self.caches.my_service_reservations.current().success() {
                    if let Some(reservation) = list.iter().find(|r| r.id == id) {
                        if !reservation.status.is_cancellable() {
                            return Err(CoreError::NotCancellable(
                                reservation.status_display.clone(),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // Capacity figures may have changed server-side after a write, so the
    // entity list is refreshed along with the reservation list.
    async fn refresh_hostel_lists(&self) {
        let t = Arc::clone(&self.transport);
        self.caches
            .my_hostel_reservations
            .fetch_with(true, || async move { t.list_my_hostel_reservations().await })
            .await;
        let t = Arc::clone(&self.transport);
        self.caches
            .hostels
            .fetch_with(true, || async move { t.list_hostels().await })
            .await;
    }

    async fn refresh_service_lists(&self) {
        let t = Arc::clone(&self.transport);
        self.caches
            .my_service_reservations
            .fetch_with(true, || async move { t.list_my_service_reservations().await })
            .await;
        let t = Arc::clone(&self.transport);
        self.caches
            .upcoming_service_reservations
            .fetch_with(true, || async move {
                t.list_upcoming_service_reservations().await
            })
            .await;
        let t = Arc::clone(&self.transport);
        self.caches
            .services
            .fetch_with(true, || async move { t.list_hostel_services().await })
            .await;
    }
}
