//! Submission rules.
//!
//! [`validate`] checks every rule and reports all violations together, in
//! rule order. It runs for drafts and published submissions alike.

use crate::form::EventDraft;
use crate::slots::TimeSlotDraft;
use std::fmt;
use thiserror::Error;

/// Minimum title length, in characters
pub const MIN_TITLE_CHARS: usize = 20;

/// Minimum flattened description length, in characters
pub const MIN_DESCRIPTION_CHARS: usize = 100;

/// A rule the draft breaks
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationViolation {
    /// Title shorter than [`MIN_TITLE_CHARS`]
    #[error("Title must be at least 20 characters long")]
    TitleTooShort,

    /// Flattened description shorter than [`MIN_DESCRIPTION_CHARS`]
    #[error("Description must be at least 100 characters long")]
    DescriptionTooShort,

    /// No slot at all
    #[error("At least one time slot must be created")]
    NoTimeSlots,

    /// Slot at `index` (zero-based) does not end after it starts
    #[error("Time slot {}: End time must be after start time", .index + 1)]
    SlotEndsBeforeStart {
        /// Zero-based slot index
        index: usize,
    },

    /// No uploaded gallery image
    #[error("At least one gallery image must be uploaded")]
    NoGalleryImages,

    /// No uploaded cover image
    #[error("A cover image must be selected")]
    NoCoverImage,

    /// Empty or whitespace-only location
    #[error("Location must be provided")]
    MissingLocation,

    /// No category selected
    #[error("At least one category must be selected")]
    NoCategories,

    /// Price not a positive number
    #[error("Price per seat must be greater than 0")]
    NonPositivePrice,
}

/// Every violation found by one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Violations, in rule order
    pub violations: Vec<ValidationViolation>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Check `draft` and `slots` against every rule
#[must_use]
pub fn validate(draft: &EventDraft, slots: &[TimeSlotDraft]) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    // Lengths are Unicode scalar values, so an emoji counts once.
    if draft.title.chars().count() < MIN_TITLE_CHARS {
        violations.push(ValidationViolation::TitleTooShort);
    }

    if draft.description.plain_text_len() < MIN_DESCRIPTION_CHARS {
        violations.push(ValidationViolation::DescriptionTooShort);
    }

    if slots.is_empty() {
        violations.push(ValidationViolation::NoTimeSlots);
    }
    violations.extend(
        slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_well_ordered())
            .map(|(index, _)| ValidationViolation::SlotEndsBeforeStart { index }),
    );

    if draft.images.gallery_urls().is_empty() {
        violations.push(ValidationViolation::NoGalleryImages);
    }

    if draft.images.cover_url().is_none() {
        violations.push(ValidationViolation::NoCoverImage);
    }

    if draft.location.trim().is_empty() {
        violations.push(ValidationViolation::MissingLocation);
    }

    if draft.categories.is_empty() {
        violations.push(ValidationViolation::NoCategories);
    }

    // NaN and infinities fail too
    if !(draft.price_per_seat.is_finite() && draft.price_per_seat > 0.0) {
        violations.push(ValidationViolation::NonPositivePrice);
    }

    violations
}

/// [`validate`], as a `Result`
///
/// # Errors
///
/// Returns a [`ValidationFailure`] holding every violation found.
pub fn ensure_valid(draft: &EventDraft, slots: &[TimeSlotDraft]) -> Result<(), ValidationFailure> {
    let violations = validate(draft, slots);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { violations })
    }
}
