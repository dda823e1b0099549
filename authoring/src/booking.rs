//! Seat booking on a published event.

use crate::api::{EventApi, Registration, RegistrationRequest, ServerTimeSlot};
use crate::error::AuthoringError;
use crate::types::{EventId, SlotId};
use thiserror::Error;

/// Why a booking cannot be requested
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Slot closed or sold out
    #[error("This time slot is no longer available")]
    SlotUnavailable,
}

/// Seats requested on one slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    slot_id: SlotId,
    seats: u32,
}

impl BookingRequest {
    /// Request `requested` seats, clamped to `1..=available_seats`
    ///
    /// # Errors
    ///
    /// [`BookingError::SlotUnavailable`] when the slot is closed or has no seats left.
    pub fn new(slot: &ServerTimeSlot, requested: u32) -> Result<Self, BookingError> {
        if !slot.is_available || slot.available_seats == 0 {
            return Err(BookingError::SlotUnavailable);
        }
        Ok(Self {
            slot_id: slot.id.clone(),
            seats: requested.clamp(1, slot.available_seats),
        })
    }

    /// Seats that will be booked
    #[must_use]
    pub const fn seats(&self) -> u32 {
        self.seats
    }

    /// Slot being booked
    #[must_use]
    pub const fn slot_id(&self) -> &SlotId {
        &self.slot_id
    }

    /// Register with the backend
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::Collaborator`] if the backend refuses.
    pub async fn submit(
        &self,
        api: &dyn EventApi,
        event_id: &EventId,
    ) -> Result<Registration, AuthoringError> {
        let request = RegistrationRequest {
            time_slot_id: self.slot_id.clone(),
            slot_count: self.seats,
        };
        let registration = api.register_for_event(event_id, request).await?;
        tracing::info!(
            %event_id,
            registration_id = %registration.id,
            seats = registration.slot_count,
            "Seats booked"
        );
        Ok(registration)
    }
}
