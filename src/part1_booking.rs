// Part 1: Booking Calculator
// Stay length, price and form validation for the booking page. Everything here is pure and
// recomputed from the draft on every change.

use crate::catalog::{ParseRoomTypeError, RoomType};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const MIN_GUESTS: u8 = 1;
pub const MAX_GUESTS: u8 = 6;

// Date format used by the form's date inputs
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";
// en-GB display format used in the booking summary
pub const SUMMARY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(DraftField),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Guests must be between {min} and {max}, got {value}")]
    GuestsOutOfRange { value: u8, min: u8, max: u8 },

    #[error("Check-out date must be after the check-in date")]
    CheckOutNotAfterCheckIn,

    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: DraftField, value: String },

    #[error("Invalid number for {field}: {value}")]
    InvalidNumber { field: DraftField, value: String },

    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error(transparent)]
    RoomType(#[from] ParseRoomTypeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    FirstName,
    LastName,
    Email,
    Phone,
    CheckIn,
    CheckOut,
    Guests,
    RoomType,
    SpecialRequests,
}

impl DraftField {
    // Name of the matching input element in the booking form
    pub fn form_name(self) -> &'static str {
        match self {
            DraftField::FirstName => "firstName",
            DraftField::LastName => "lastName",
            DraftField::Email => "email",
            DraftField::Phone => "phone",
            DraftField::CheckIn => "checkIn",
            DraftField::CheckOut => "checkOut",
            DraftField::Guests => "guests",
            DraftField::RoomType => "roomType",
            DraftField::SpecialRequests => "specialRequests",
        }
    }

    pub fn from_form_name(name: &str) -> Option<DraftField> {
        let field = match name {
            "firstName" => DraftField::FirstName,
            "lastName" => DraftField::LastName,
            "email" => DraftField::Email,
            "phone" => DraftField::Phone,
            "checkIn" => DraftField::CheckIn,
            "checkOut" => DraftField::CheckOut,
            "guests" => DraftField::Guests,
            "roomType" => DraftField::RoomType,
            "specialRequests" => DraftField::SpecialRequests,
            _ => return None,
        };
        Some(field)
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DraftField::FirstName => "First name",
            DraftField::LastName => "Last name",
            DraftField::Email => "Email",
            DraftField::Phone => "Phone number",
            DraftField::CheckIn => "Check-in date",
            DraftField::CheckOut => "Check-out date",
            DraftField::Guests => "Guests",
            DraftField::RoomType => "Room type",
            DraftField::SpecialRequests => "Special requests",
        };
        f.write_str(label)
    }
}

// In-progress booking form state
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: u8,
    pub room_type: RoomType,
    pub special_requests: String,
    // Listing the user came from, if any
    pub room_id: Option<String>,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            check_in: None,
            check_out: None,
            guests: MIN_GUESTS,
            room_type: RoomType::Standard,
            special_requests: String::new(),
            room_id: None,
        }
    }
}

// One update action per draft field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftUpdate {
    FirstName(String),
    LastName(String),
    Email(String),
    Phone(String),
    CheckIn(Option<NaiveDate>),
    CheckOut(Option<NaiveDate>),
    Guests(u8),
    RoomType(RoomType),
    SpecialRequests(String),
}

impl DraftUpdate {
    // Build an update from a raw form input change event
    pub fn from_form(name: &str, value: &str) -> Result<DraftUpdate, ValidationError> {
        let field = DraftField::from_form_name(name)
            .ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;

        let update = match field {
            DraftField::FirstName => DraftUpdate::FirstName(value.to_string()),
            DraftField::LastName => DraftUpdate::LastName(value.to_string()),
            DraftField::Email => DraftUpdate::Email(value.to_string()),
            DraftField::Phone => DraftUpdate::Phone(value.to_string()),
            DraftField::CheckIn => DraftUpdate::CheckIn(parse_form_date(field, value)?),
            DraftField::CheckOut => DraftUpdate::CheckOut(parse_form_date(field, value)?),
            DraftField::Guests => {
                let guests = value
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| ValidationError::InvalidNumber {
                        field,
                        value: value.to_string(),
                    })?;
                DraftUpdate::Guests(guests)
            }
            DraftField::RoomType => DraftUpdate::RoomType(value.parse()?),
            DraftField::SpecialRequests => DraftUpdate::SpecialRequests(value.to_string()),
        };

        Ok(update)
    }
}

fn parse_form_date(field: DraftField, value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, FORM_DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

impl BookingDraft {
    pub fn apply(&mut self, update: DraftUpdate) {
        match update {
            DraftUpdate::FirstName(value) => self.first_name = value,
            DraftUpdate::LastName(value) => self.last_name = value,
            DraftUpdate::Email(value) => self.email = value,
            DraftUpdate::Phone(value) => self.phone = value,
            DraftUpdate::CheckIn(date) => self.check_in = date,
            DraftUpdate::CheckOut(date) => self.check_out = date,
            DraftUpdate::Guests(guests) => self.guests = guests,
            DraftUpdate::RoomType(room_type) => self.room_type = room_type,
            DraftUpdate::SpecialRequests(value) => self.special_requests = value,
        }
    }

    // Apply a raw form change; the draft is left untouched when the value does not parse
    pub fn apply_form_change(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        let update = DraftUpdate::from_form(name, value)?;
        self.apply(update);
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = BookingDraft::default();
    }

    pub fn nights(&self) -> u32 {
        compute_nights(self.check_in, self.check_out)
    }

    pub fn total_price(&self) -> u32 {
        compute_total(self)
    }
}

/// Number of nights between check-in and check-out.
///
/// Zero when either date is missing or check-out is not after check-in; an unfinished
/// draft is a normal state, not an error.
pub fn compute_nights(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> u32 {
    match (check_in, check_out) {
        (Some(check_in), Some(check_out)) => {
            let days = (check_out - check_in).num_days();
            u32::try_from(days).unwrap_or(0)
        }
        _ => 0,
    }
}

/// Nights times the nightly rate of the selected room type.
///
/// Saturates at `u32::MAX` for stays long enough to overflow the price.
pub fn compute_total(draft: &BookingDraft) -> u32 {
    let nights = compute_nights(draft.check_in, draft.check_out);
    if nights > 0 {
        nights.saturating_mul(draft.room_type.nightly_rate())
    } else {
        0
    }
}

// Earliest date the check-in picker accepts
pub fn min_selectable_date() -> NaiveDate {
    Local::now().date_naive()
}

// Lower bound for the check-out picker: the check-in date when set, otherwise today
pub fn check_out_min_date(check_in: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    check_in.unwrap_or(today)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<DraftField, ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: DraftField) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn errors(&self) -> &BTreeMap<DraftField, ValidationError> {
        &self.errors
    }

    // Per-field messages, ready to render next to the inputs
    pub fn messages(&self) -> BTreeMap<DraftField, String> {
        self.errors
            .iter()
            .map(|(field, error)| (*field, error.to_string()))
            .collect()
    }

    fn reject(&mut self, field: DraftField, error: ValidationError) {
        // first failure per field wins
        self.errors.entry(field).or_insert(error);
    }
}

pub fn validate_draft(draft: &BookingDraft) -> ValidationReport {
    let mut report = ValidationReport::default();

    let required_text = [
        (DraftField::FirstName, &draft.first_name),
        (DraftField::LastName, &draft.last_name),
        (DraftField::Email, &draft.email),
        (DraftField::Phone, &draft.phone),
    ];
    for (field, value) in required_text {
        if value.trim().is_empty() {
            report.reject(field, ValidationError::Required(field));
        }
    }

    if !draft.email.trim().is_empty() && !looks_like_email(draft.email.trim()) {
        report.reject(DraftField::Email, ValidationError::InvalidEmail);
    }

    if draft.check_in.is_none() {
        report.reject(DraftField::CheckIn, ValidationError::Required(DraftField::CheckIn));
    }
    if draft.check_out.is_none() {
        report.reject(DraftField::CheckOut, ValidationError::Required(DraftField::CheckOut));
    }
    if let (Some(check_in), Some(check_out)) = (draft.check_in, draft.check_out) {
        if check_out <= check_in {
            report.reject(DraftField::CheckOut, ValidationError::CheckOutNotAfterCheckIn);
        }
    }

    if !(MIN_GUESTS..=MAX_GUESTS).contains(&draft.guests) {
        report.reject(
            DraftField::Guests,
            ValidationError::GuestsOutOfRange {
                value: draft.guests,
                min: MIN_GUESTS,
                max: MAX_GUESTS,
            },
        );
    }

    report
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

// Side panel of the booking page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub room_label: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub nights: Option<u32>,
    pub guests: u8,
    pub total: u32,
}

impl BookingSummary {
    pub fn from_draft(draft: &BookingDraft) -> Self {
        // dates and nights are only shown once both ends of the stay are picked
        let stay = match (draft.check_in, draft.check_out) {
            (Some(check_in), Some(check_out)) => Some((
                check_in.format(SUMMARY_DATE_FORMAT).to_string(),
                check_out.format(SUMMARY_DATE_FORMAT).to_string(),
                compute_nights(Some(check_in), Some(check_out)),
            )),
            _ => None,
        };

        let (check_in, check_out, nights) = match stay {
            Some((check_in, check_out, nights)) => (Some(check_in), Some(check_out), Some(nights)),
            None => (None, None, None),
        };

        Self {
            room_label: draft.room_type.summary_label(),
            check_in,
            check_out,
            nights,
            guests: draft.guests,
            total: compute_total(draft),
        }
    }

    pub fn total_display(&self) -> String {
        format!("£{}", self.total)
    }
}
