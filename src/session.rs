// Phone-verification login state machine. One instance per process owns the
// Session; the presentation layer observes phases through a watch channel
// and calls the operations below.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::caches::ListCaches;
use crate::error::{CoreError, TransportError};
use crate::models::Session;
use crate::secure_store::SecureStore;
use crate::transport::{OtpVerificationRequest, PhoneVerificationRequest, Transport};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    NoSession,
    AwaitingOtp { phone: String },
    Authenticating,
    // Failed keeps the phone when a code was already delivered, so
    // submit_otp can retry without a resend.
    Failed { phone: Option<String>, reason: String },
    Authenticated(Session),
}

// Serializes the controller's own transitions: one transport call at a time,
// and an epoch that orphans completions landing after a logout.
struct Gate {
    busy: bool,
    epoch: u64,
}

pub struct SessionController {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SecureStore>,
    caches: Arc<ListCaches>,
    gate: Mutex<Gate>,
    tx: watch::Sender<SessionPhase>,
}

impl SessionController {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn SecureStore>,
        caches: Arc<ListCaches>,
    ) -> Self {
        let (tx, _rx) = watch::channel(SessionPhase::NoSession);
        Self {
            transport,
            store,
            caches,
            gate: Mutex::new(Gate {
                busy: false,
                epoch: 0,
            }),
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.tx.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.tx.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        match &*self.tx.borrow() {
            SessionPhase::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    // Ask the server to deliver a one-time code. Valid initially and as a
    // resend while awaiting a code or after a failure.
    pub async fn request_otp(&self, phone: &str) -> Result<(), CoreError> {
        let epoch = {
            let mut gate = self.gate.lock();
            if gate.busy {
                return Err(CoreError::AlreadyInProgress("authentication"));
            }
            match &*self.tx.borrow() {
                SessionPhase::NoSession
                | SessionPhase::AwaitingOtp { .. }
                | SessionPhase::Failed { .. } => {}
                _ => return Err(CoreError::InvalidSessionPhase { op: "request_otp" }),
            }
            gate.busy = true;
            gate.epoch
        };

        let result = self
            .transport
            .send_phone_verification(PhoneVerificationRequest {
                phone_number: phone.to_string(),
            })
            .await;

        let mut gate = self.gate.lock();
        gate.busy = false;
        if gate.epoch != epoch {
            warn!("discarding phone verification that completed after logout");
            return Err(CoreError::SessionExpired);
        }

        match result {
            Ok(()) => {
                debug!("OTP requested for {phone}");
                self.tx.send_replace(SessionPhase::AwaitingOtp {
                    phone: phone.to_string(),
                });
                Ok(())
            }
            Err(err) => {
                warn!("phone verification failed: {err}");
                self.tx.send_replace(SessionPhase::Failed {
                    phone: None,
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    // Exchange the delivered code for a token. On success the token and
    // profile are persisted and the session becomes Authenticated; on
    // failure the phone is retained so the code can be retried.
    pub async fn submit_otp(&self, code: &str) -> Result<Session, CoreError> {
        let (phone, epoch) = {
            let mut gate = self.gate.lock();
            if gate.busy {
                return Err(CoreError::AlreadyInProgress("authentication"));
            }
            let phone = match &*self.tx.borrow() {
                SessionPhase::AwaitingOtp { phone } => phone.clone(),
                SessionPhase::Failed {
                    phone: Some(phone), ..
                } => phone.clone(),
                _ => return Err(CoreError::InvalidSessionPhase { op: "submit_otp" }),
            };
            gate.busy = true;
            self.tx.send_replace(SessionPhase::Authenticating);
            (phone, gate.epoch)
        };

        let result = self
            .transport
            .verify_otp(OtpVerificationRequest {
                phone_number: phone.clone(),
                otp: code.to_string(),
            })
            .await;

        let mut gate = self.gate.lock();
        gate.busy = false;
        if gate.epoch != epoch {
            warn!("discarding authentication that completed after logout");
            return Err(CoreError::SessionExpired);
        }

        match result {
            Ok(response) => {
                let session = Session::from_parts(&response.user, &response.token).ok_or_else(
                    || {
                        let err = TransportError::Deserialize(
                            "token response missing user id or token".to_string(),
                        );
                        self.tx.send_replace(SessionPhase::Failed {
                            phone: Some(phone.clone()),
                            reason: err.to_string(),
                        });
                        CoreError::Transport(err)
                    },
                )?;
                self.store.save_token(&response.token);
                self.store.save_user(&response.user);
                debug!("session established for user {}", session.user_id);
                self.tx
                    .send_replace(SessionPhase::Authenticated(session.clone()));
                Ok(session)
            }
            Err(err) => {
                warn!("OTP verification failed: {err}");
                self.tx.send_replace(SessionPhase::Failed {
                    phone: Some(phone),
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    // Silent restore at process start. No network: a persisted token is
    // trusted until the first authenticated request says otherwise.
    pub fn restore_session(&self) -> Option<Session> {
        if self.phase() != SessionPhase::NoSession {
            return self.session();
        }
        let token = self.store.get_token()?;
        let user = self.store.get_user()?;
        let session = Session::from_parts(&user, &token)?;
        debug!("restored session for user {}", session.user_id);
        self.tx
            .send_replace(SessionPhase::Authenticated(session.clone()));
        Some(session)
    }

    // Tear down: persisted credentials gone, every list cache back to Idle,
    // in-flight authentication results orphaned.
    pub fn logout(&self) {
        let mut gate = self.gate.lock();
        gate.epoch += 1;
        gate.busy = false;
        drop(gate);

        self.store.clear_token();
        self.store.clear_user();
        self.caches.reset_all();
        debug!("session cleared");
        self.tx.send_replace(SessionPhase::NoSession);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResourceState;
    use crate::secure_store::MemoryStore;
    use crate::transport::mock::MockTransport;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn controller() -> (Arc<MockTransport>, Arc<MemoryStore>, SessionController) {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryStore::new());
        let caches = Arc::new(ListCaches::new());
        let controller = SessionController::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&store) as Arc<dyn SecureStore>,
            caches,
        );
        (transport, store, controller)
    }

    #[tokio::test]
    async fn full_login_flow_reaches_authenticated() {
        let (_transport, store, controller) = controller();

        assert_ok!(controller.request_otp("+528110000000").await);
        assert_eq!(
            controller.phase(),
            SessionPhase::AwaitingOtp {
                phone: "+528110000000".to_string()
            }
        );

        let session = controller.submit_otp("000000").await.expect("login");
        assert!(!session.user_id.is_empty());
        assert_eq!(store.get_token(), Some(session.token.clone()));
        assert_eq!(controller.phase(), SessionPhase::Authenticated(session));
    }

    #[tokio::test]
    async fn failed_otp_retains_phone_for_retry() {
        let (transport, _store, controller) = controller();
        controller.request_otp("+5281").await.expect("otp request");

        transport.fail_next_requests(1);
        let err = controller.submit_otp("999999").await.unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
        assert!(matches!(
            controller.phase(),
            SessionPhase::Failed { phone: Some(_), .. }
        ));

        // Retry without re-requesting a code.
        assert_ok!(controller.submit_otp("000000").await);
        assert_eq!(transport.calls.send_phone_verification.load(Ordering::SeqCst), 1);
        assert_eq!(transport.calls.verify_otp.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn submit_while_authenticating_is_rejected() {
        let (transport, _store, controller) = controller();
        let controller = Arc::new(controller);
        controller.request_otp("+5281").await.expect("otp request");

        transport.set_delay(40);
        let background = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.submit_otp("000000").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = controller.submit_otp("000000").await.unwrap_err();
        assert_eq!(err, CoreError::AlreadyInProgress("authentication"));

        assert_ok!(background.await.expect("task panicked"));
        assert_eq!(transport.calls.verify_otp.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn request_otp_failure_moves_to_failed() {
        let (transport, _store, controller) = controller();
        transport.fail_next_requests(1);

        let err = controller.request_otp("+5281").await.unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
        assert!(matches!(
            controller.phase(),
            SessionPhase::Failed { phone: None, .. }
        ));

        // Resend is allowed from Failed.
        assert_ok!(controller.request_otp("+5281").await);
    }

    #[tokio::test]
    async fn restore_session_reads_the_store_without_network() {
        let (transport, store, controller) = controller();
        store.save_token("tok-persisted");
        store.save_user(&crate::models::StoredUser {
            id: "user-9".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: None,
            phone_number: Some("+5281".to_string()),
        });

        let session = controller.restore_session().expect("restored");
        assert_eq!(session.user_id, "user-9");
        assert_eq!(session.token, "tok-persisted");
        assert!(matches!(
            controller.phase(),
            SessionPhase::Authenticated(_)
        ));
        assert_eq!(transport.calls.verify_otp.load(Ordering::SeqCst), 0);
        assert_eq!(
            transport.calls.send_phone_verification.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn restore_with_empty_store_stays_logged_out() {
        let (_transport, _store, controller) = controller();
        assert!(controller.restore_session().is_none());
        assert_eq!(controller.phase(), SessionPhase::NoSession);
    }

    #[tokio::test]
    async fn logout_clears_store_and_resets_caches() {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryStore::new());
        let caches = Arc::new(ListCaches::new());
        let controller = SessionController::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&store) as Arc<dyn SecureStore>,
            Arc::clone(&caches),
        );

        controller.request_otp("+5281").await.expect("otp request");
        controller.submit_otp("000000").await.expect("login");

        // Populate a cache so the reset is observable.
        let t = Arc::clone(&transport);
        caches
            .hostels
            .fetch_with(false, || async move { t.list_hostels().await })
            .await;
        assert!(caches.hostels.has_loaded());

        controller.logout();
        assert_eq!(controller.phase(), SessionPhase::NoSession);
        assert!(store.get_token().is_none());
        assert!(store.get_user().is_none());
        assert_eq!(caches.hostels.current(), ResourceState::Idle);

        // Fetch-once flag was cleared: a plain fetch hits the network again.
        let t = Arc::clone(&transport);
        caches
            .hostels
            .fetch_with(false, || async move { t.list_hostels().await })
            .await;
        assert_eq!(transport.calls.list_hostels.load(Ordering::SeqCst), 2);
    }
}
