// Main library file for the hotel booking core

// Export modules for each part of the booking flow
pub mod catalog;
pub mod models;
pub mod part1_booking;
pub mod part2_rooms;
pub mod part3_submission;
pub mod part3_submission_example; // Mock backend used until the booking service exists

// Re-export key types for convenience
pub use catalog::{nightly_rate_for, Amenity, ParseRoomTypeError, RoomType, STANDARD_RATE};
pub use models::{ApiResponse, Booking, BookingRequest, BookingStatus, Customer};
pub use part1_booking::{
    check_out_min_date, compute_nights, compute_total, min_selectable_date, validate_draft,
    BookingDraft, BookingSummary, DraftField, DraftUpdate, ValidationError, ValidationReport,
};
pub use part2_rooms::{
    distinct_types, filter_rooms, generate_rooms, Room, RoomFilterState, RoomListing, ALL_TYPES,
};
pub use part3_submission::{
    teardown_channel, ApiError, BookingApi, BookingForm, ClientConfig, ClientError, Delay,
    NoDelay, SleepDelay, SubmissionOutcome, SubmissionPhase, SubmitAttempt, Teardown,
    TeardownSignal,
};
pub use part3_submission_example::{MockBookingApi, MockStats};
