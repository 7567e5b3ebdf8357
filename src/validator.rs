// Pure validation rules for reservation drafts: whether a draft is
// submittable, how the gender counters may move, and which status a new
// reservation starts in.

use crate::error::ValidationError;
use crate::models::{
    HostelDraft, HostelReservationStatus, NewHostelReservation, NewServiceReservation, PartyType,
    ServiceDraft, ServiceReservationStatus,
};

// Individual reservations hold exactly one person; group reservations at
// least one.
pub fn validate_party(party: PartyType, men: u32, women: u32) -> Result<(), ValidationError> {
    let total = men.saturating_add(women);
    if total == 0 {
        return Err(ValidationError::EmptyParty);
    }
    if party == PartyType::Individual && total != 1 {
        return Err(ValidationError::IndividualPartySize(total));
    }
    Ok(())
}

pub fn validate_hostel_draft(draft: &HostelDraft) -> Result<(), ValidationError> {
    if draft.hostel_id.as_deref().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingTarget);
    }
    if draft.arrival_date.is_none() {
        return Err(ValidationError::MissingDate);
    }
    validate_party(draft.party, draft.men_count, draft.women_count)
}

pub fn validate_service_draft(draft: &ServiceDraft) -> Result<(), ValidationError> {
    if draft.service_id.as_deref().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingTarget);
    }
    if draft.datetime_reserved.is_none() {
        return Err(ValidationError::MissingDate);
    }
    validate_party(draft.party, draft.men_count, draft.women_count)
}

// Gate for the +1 buttons on the men/women counters: a group may always
// grow, an individual reservation holds one occupant total, so selecting one
// gender blocks the other until decremented.
pub fn counter_increment_allowed(party: PartyType, men: u32, women: u32) -> bool {
    match party {
        PartyType::Group => true,
        PartyType::Individual => men.saturating_add(women) < 1,
    }
}

// Hostel reservations always start pending; no approval flag exists for
// lodging.
pub fn initial_hostel_status() -> HostelReservationStatus {
    HostelReservationStatus::Pending
}

// Approval routing: a service flagged needs_approval starts pending,
// otherwise it is confirmed immediately.
pub fn initial_service_status(needs_approval: bool) -> ServiceReservationStatus {
    if needs_approval {
        ServiceReservationStatus::Pending
    } else {
        ServiceReservationStatus::Confirmed
    }
}

// Validate and build the create payload in one step, so callers never touch
// a half-validated draft.
pub fn hostel_request(draft: &HostelDraft) -> Result<NewHostelReservation, ValidationError> {
    validate_hostel_draft(draft)?;
    match (&draft.hostel_id, draft.arrival_date) {
        (Some(hostel), Some(arrival_date)) => Ok(NewHostelReservation {
            arrival_date,
            hostel: hostel.clone(),
            men_quantity: draft.men_count,
            party: draft.party,
            user: draft.user_id.clone(),
            women_quantity: draft.women_count,
            status: initial_hostel_status(),
        }),
        _ => Err(ValidationError::MissingTarget),
    }
}

pub fn service_request(
    draft: &ServiceDraft,
    needs_approval: bool,
) -> Result<NewServiceReservation, ValidationError> {
    validate_service_draft(draft)?;
    match (&draft.service_id, draft.datetime_reserved) {
        (Some(service), Some(datetime_reserved)) => Ok(NewServiceReservation {
            datetime_reserved,
            men_quantity: draft.men_count,
            service: service.clone(),
            party: draft.party,
            user: draft.user_id.clone(),
            women_quantity: draft.women_count,
            status: initial_service_status(needs_approval),
        }),
        _ => Err(ValidationError::MissingTarget),
    }
}
