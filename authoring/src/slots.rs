//! Time-slot editor.
//!
//! Slots are entered as wall-clock times on a picked calendar date and are
//! anchored to that date in the editor's UTC offset. The list keeps insertion
//! order; nothing sorts it.

use crate::types::SlotId;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the slot editor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// No slot at the given position
    #[error("Time slot index {index} is out of range (have {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of slots
        len: usize,
    },

    /// `add_slot` without a picked date
    #[error("Select a date before adding a time slot")]
    NoDateSelected,

    /// End is not strictly after start
    #[error("End time must be after start time")]
    EndNotAfterStart,

    /// Seat capacity below one
    #[error("A time slot needs at least one seat")]
    InvalidSeats,

    /// `confirm_delete` without a preceding `request_delete`
    #[error("No time slot deletion is awaiting confirmation")]
    NoPendingDelete,
}

/// One bookable interval being edited
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSlotDraft {
    /// Backend id; `None` for slots created in this session
    pub id: Option<SlotId>,
    /// Calendar date the slot is grouped under
    pub date: NaiveDate,
    /// Seat capacity
    pub seats: u32,
    /// Start, anchored to `date`
    pub start: DateTime<FixedOffset>,
    /// End, anchored to `date`
    pub end: DateTime<FixedOffset>,
}

impl TimeSlotDraft {
    /// Build a new (id-less) slot from wall-clock times on `date`
    #[must_use]
    pub fn new(
        date: NaiveDate,
        seats: u32,
        start: NaiveTime,
        end: NaiveTime,
        offset: FixedOffset,
    ) -> Self {
        Self {
            id: None,
            date,
            seats,
            start: anchor(date, start, offset),
            end: anchor(date, end, offset),
        }
    }

    /// Attach a backend id
    #[must_use]
    pub fn with_id(mut self, id: SlotId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether end is strictly after start
    #[must_use]
    pub fn is_well_ordered(&self) -> bool {
        self.end > self.start
    }

    /// Convert a slot loaded from the backend; the date is the start's local date
    #[must_use]
    pub fn from_server(
        id: SlotId,
        seats: u32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Self {
        let start = start.with_timezone(&offset);
        Self {
            id: Some(id),
            date: start.date_naive(),
            seats,
            start,
            end: end.with_timezone(&offset),
        }
    }

    /// Wire representation sent to the backend
    #[must_use]
    pub fn to_wire(&self) -> WireTimeSlot {
        let midnight = anchor(self.date, NaiveTime::MIN, *self.start.offset());
        WireTimeSlot {
            id: self.id.clone(),
            date: wire_timestamp(midnight),
            seats: self.seats,
            start_time: wire_timestamp(self.start),
            end_time: wire_timestamp(self.end),
        }
    }
}

/// Slot as it travels in create/update payloads
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTimeSlot {
    /// Present only for slots the backend already knows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SlotId>,
    /// Local midnight of the slot's date, as a UTC timestamp
    pub date: String,
    /// Seat capacity
    pub seats: u32,
    /// UTC start timestamp
    pub start_time: String,
    /// UTC end timestamp
    pub end_time: String,
}

/// Wall-clock `time` on `date` in `offset`
fn anchor(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = date.and_time(time);
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// `2025-06-02T09:00:00.000Z`
fn wire_timestamp(at: DateTime<FixedOffset>) -> String {
    at.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Editor over the ordered slot list
///
/// Picking a date opens the add-slot dialog; adding or clearing the date
/// closes it. Deletion is two-step: `request_delete` then `confirm_delete`.
#[derive(Clone, Debug)]
pub struct TimeSlotEditor {
    offset: FixedOffset,
    pending_date: Option<NaiveDate>,
    pending_delete: Option<usize>,
    slots: Vec<TimeSlotDraft>,
}

impl Default for TimeSlotEditor {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl TimeSlotEditor {
    /// Empty editor entering times in `offset`
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            pending_date: None,
            pending_delete: None,
            slots: Vec::new(),
        }
    }

    /// Editor pre-filled with loaded slots
    #[must_use]
    pub const fn with_slots(offset: FixedOffset, slots: Vec<TimeSlotDraft>) -> Self {
        Self {
            offset,
            pending_date: None,
            pending_delete: None,
            slots,
        }
    }

    /// UTC offset times are entered in
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Slots in insertion order
    #[must_use]
    pub fn slots(&self) -> &[TimeSlotDraft] {
        &self.slots
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Date picked for the next slot
    #[must_use]
    pub const fn pending_date(&self) -> Option<NaiveDate> {
        self.pending_date
    }

    /// Whether the add-slot dialog is open
    #[must_use]
    pub const fn is_dialog_open(&self) -> bool {
        self.pending_date.is_some()
    }

    /// Index awaiting delete confirmation
    #[must_use]
    pub const fn pending_delete(&self) -> Option<usize> {
        self.pending_delete
    }

    /// Pick (or clear) the date for the next slot
    pub fn select_date(&mut self, date: Option<NaiveDate>) {
        self.pending_date = date;
    }

    /// Append a new slot on the picked date and close the dialog
    ///
    /// Returns the index of the new slot.
    ///
    /// # Errors
    ///
    /// - [`SlotError::NoDateSelected`] when no date is picked
    /// - [`SlotError::InvalidSeats`] when `seats` is zero
    /// - [`SlotError::EndNotAfterStart`] when `end <= start`
    pub fn add_slot(
        &mut self,
        seats: u32,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<usize, SlotError> {
        let date = self.pending_date.ok_or(SlotError::NoDateSelected)?;
        check_entry(seats, start, end)?;

        self.slots.push(TimeSlotDraft::new(date, seats, start, end, self.offset));
        self.pending_date = None;
        tracing::debug!(%date, seats, "Time slot added");
        Ok(self.slots.len() - 1)
    }

    /// Replace seats and times of the slot at `index`, keeping its date and id
    ///
    /// # Errors
    ///
    /// - [`SlotError::IndexOutOfRange`] for an unknown index
    /// - [`SlotError::InvalidSeats`] / [`SlotError::EndNotAfterStart`] as for `add_slot`
    pub fn edit_slot(
        &mut self,
        index: usize,
        seats: u32,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), SlotError> {
        let len = self.slots.len();
        let offset = self.offset;
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SlotError::IndexOutOfRange { index, len })?;
        check_entry(seats, start, end)?;

        let id = slot.id.take();
        *slot = TimeSlotDraft {
            id,
            ..TimeSlotDraft::new(slot.date, seats, start, end, offset)
        };
        Ok(())
    }

    /// Ask for confirmation before deleting the slot at `index`
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::IndexOutOfRange`] for an unknown index.
    pub fn request_delete(&mut self, index: usize) -> Result<(), SlotError> {
        if index >= self.slots.len() {
            return Err(SlotError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        self.pending_delete = Some(index);
        Ok(())
    }

    /// Delete the slot awaiting confirmation
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::NoPendingDelete`] when nothing was requested.
    pub fn confirm_delete(&mut self) -> Result<TimeSlotDraft, SlotError> {
        let index = self.pending_delete.take().ok_or(SlotError::NoPendingDelete)?;
        if index >= self.slots.len() {
            return Err(SlotError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(self.slots.remove(index))
    }

    /// Drop a pending delete request
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Wire list, in editor order
    #[must_use]
    pub fn to_wire(&self) -> Vec<WireTimeSlot> {
        self.slots.iter().map(TimeSlotDraft::to_wire).collect()
    }
}

fn check_entry(seats: u32, start: NaiveTime, end: NaiveTime) -> Result<(), SlotError> {
    if seats == 0 {
        return Err(SlotError::InvalidSeats);
    }
    if end <= start {
        return Err(SlotError::EndNotAfterStart);
    }
    Ok(())
}
