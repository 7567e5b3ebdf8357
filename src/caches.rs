// The family of list caches, one per distinct list endpoint.

use crate::cache::ResourceCache;
use crate::models::{Hostel, HostelReservation, ServiceOffering, ServiceReservation};

pub struct ListCaches {
    pub hostels: ResourceCache<Vec<Hostel>>,
    pub services: ResourceCache<Vec<ServiceOffering>>,
    pub my_hostel_reservations: ResourceCache<Vec<HostelReservation>>,
    pub my_service_reservations: ResourceCache<Vec<ServiceReservation>>,
    pub upcoming_service_reservations: ResourceCache<Vec<ServiceReservation>>,
}

impl ListCaches {
    pub fn new() -> Self {
        Self {
            hostels: ResourceCache::new("hostels"),
            services: ResourceCache::new("hostel-services"),
            my_hostel_reservations: ResourceCache::new("my-hostel-reservations"),
            my_service_reservations: ResourceCache::new("my-service-reservations"),
            upcoming_service_reservations: ResourceCache::new("upcoming-service-reservations"),
        }
    }

    // Used on logout: every list returns to Idle and forgets its
    // fetch-once flag.
    pub fn reset_all(&self) {
        self.hostels.reset();
        self.services.reset();
        self.my_hostel_reservations.reset();
        self.my_service_reservations.reset();
        self.upcoming_service_reservations.reset();
    }
}

impl Default for ListCaches {
    fn default() -> Self {
        Self::new()
    }
}
