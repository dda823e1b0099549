//! Form field state.
//!
//! `set_field` is a pure merge: one named field is replaced and nothing is
//! validated here.

use crate::images::ImageAttachments;
use crate::rich_text::RichText;
use crate::slots::{TimeSlotEditor, WireTimeSlot};
use crate::types::{Category, EventStatus};

/// A single named field with its new value
#[derive(Clone, Debug, PartialEq)]
pub enum DraftField {
    /// Event title
    Title(String),
    /// Rich-text description
    Description(RichText),
    /// Free-text location
    Location(String),
    /// Selected categories, in selection order
    Categories(Vec<Category>),
    /// Price per seat
    PricePerSeat(f64),
}

impl DraftField {
    /// Field name, for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Description(_) => "description",
            Self::Location(_) => "location",
            Self::Categories(_) => "categories",
            Self::PricePerSeat(_) => "pricePerSeat",
        }
    }
}

/// The event being authored
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventDraft {
    /// Event title
    pub title: String,
    /// Rich-text description
    pub description: RichText,
    /// Free-text location
    pub location: String,
    /// Selected categories, in selection order
    pub categories: Vec<Category>,
    /// Price per seat
    pub price_per_seat: f64,
    /// Status of the last load or save
    pub status: EventStatus,
    /// Cover and gallery
    pub images: ImageAttachments,
    /// Wire form of the slot editor, re-derived after every slot change
    pub time_slots: Vec<WireTimeSlot>,
}

impl EventDraft {
    /// Replace one field, leaving the others untouched
    pub fn set_field(&mut self, field: DraftField) {
        match field {
            DraftField::Title(title) => self.title = title,
            DraftField::Description(description) => self.description = description,
            DraftField::Location(location) => self.location = location,
            DraftField::Categories(categories) => self.categories = categories,
            DraftField::PricePerSeat(price) => self.price_per_seat = price,
        }
    }

    /// Add `category` if absent, remove it if present
    pub fn toggle_category(&mut self, category: Category) {
        if let Some(position) = self.categories.iter().position(|c| *c == category) {
            self.categories.remove(position);
        } else {
            self.categories.push(category);
        }
    }

    /// Refresh `time_slots` from the editor
    pub fn sync_slots(&mut self, editor: &TimeSlotEditor) {
        self.time_slots = editor.to_wire();
    }
}

/// Known locations containing `query`, ignoring case; an empty query keeps all
#[must_use]
pub fn filter_locations<'a>(known: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.to_lowercase();
    known
        .iter()
        .filter(|location| location.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}
