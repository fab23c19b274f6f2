// Mock implementation of BookingApi
// Stands in for the booking backend: waits for the configured delay, then confirms every
// booking unless told to fail the next requests.

use crate::models::{ApiResponse, Booking, BookingRequest, BookingStatus, Customer};
use crate::part3_submission::*;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MockStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
}

pub struct MockBookingApi {
    config: ClientConfig,
    delay: Arc<dyn Delay>,
    fail_next_requests: AtomicUsize,
    requests_sent: AtomicUsize,
    requests_succeeded: AtomicUsize,
    requests_failed: AtomicUsize,
    // suffix keeping ids unique when several bookings land in the same millisecond
    booking_seq: AtomicU64,
    // customers keyed by email, each carrying its booking history
    customers: Mutex<HashMap<String, Customer>>,
}

#[async_trait]
impl BookingApi for MockBookingApi {
    async fn create_booking(&self, request: BookingRequest) -> Result<ApiResponse<Booking>, ApiError> {
        self.requests_sent.fetch_add(1, Ordering::SeqCst);
        debug!(endpoint = %self.config.endpoint("/bookings"), "sending booking request");

        self.delay.wait().await;

        let should_fail = self
            .fail_next_requests
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            self.requests_failed.fetch_add(1, Ordering::SeqCst);
            return Err(ApiError::ApiResponseError {
                status_code: 500,
                message: "Internal Server Error".to_string(),
                is_retryable: true,
            });
        }

        let (check_in, check_out) = match (request.draft.check_in, request.draft.check_out) {
            (Some(check_in), Some(check_out)) => (check_in, check_out),
            _ => {
                self.requests_failed.fetch_add(1, Ordering::SeqCst);
                return Err(ApiError::Rejected("stay dates are required".to_string()));
            }
        };

        let mut customers = self.customers.lock().await;
        let customer = customers
            .entry(request.draft.email.to_lowercase())
            .or_insert_with(|| Customer {
                id: uuid::Uuid::new_v4().to_string(),
                first_name: request.draft.first_name.clone(),
                last_name: request.draft.last_name.clone(),
                email: request.draft.email.clone(),
                phone: request.draft.phone.clone(),
                booking_history: Vec::new(),
            });

        let booking = Booking {
            id: format!(
                "BWK{}-{}",
                Utc::now().timestamp_millis(),
                self.booking_seq.fetch_add(1, Ordering::SeqCst) + 1
            ),
            customer_id: customer.id.clone(),
            room_id: request.draft.room_id.clone(),
            room_type: request.draft.room_type,
            check_in,
            check_out,
            guests: request.draft.guests,
            total_price: request.total_price,
            status: BookingStatus::Confirmed,
            special_requests: request.special_requests(),
            created_at: request.booking_date,
        };
        customer.booking_history.push(booking.clone());

        info!(
            booking_id = %booking.id,
            customer = %customer.full_name(),
            total_price = booking.total_price,
            "mock booking created"
        );
        self.requests_succeeded.fetch_add(1, Ordering::SeqCst);

        Ok(ApiResponse::ok(booking, "Booking confirmed successfully!"))
    }
}

impl MockBookingApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let delay = Arc::new(SleepDelay(config.submit_delay()));
        Self::with_delay(config, delay)
    }

    pub fn with_delay(config: ClientConfig, delay: Arc<dyn Delay>) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self {
            config,
            delay,
            fail_next_requests: AtomicUsize::new(0),
            requests_sent: AtomicUsize::new(0),
            requests_succeeded: AtomicUsize::new(0),
            requests_failed: AtomicUsize::new(0),
            booking_seq: AtomicU64::new(0),
            customers: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn fail_next_requests(&self, count: usize) {
        self.fail_next_requests.store(count, Ordering::SeqCst);
    }

    pub fn stats(&self) -> MockStats {
        MockStats {
            requests_sent: self.requests_sent.load(Ordering::SeqCst),
            requests_succeeded: self.requests_succeeded.load(Ordering::SeqCst),
            requests_failed: self.requests_failed.load(Ordering::SeqCst),
        }
    }

    pub async fn customer_by_email(&self, email: &str) -> Option<Customer> {
        let customers = self.customers.lock().await;
        customers.get(&email.to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoomType;
    use crate::part1_booking::BookingDraft;
    use chrono::{Duration as ChronoDuration, Local};
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    fn valid_draft() -> BookingDraft {
        let check_in = Local::now().date_naive() + ChronoDuration::days(14);
        BookingDraft {
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            email: "John.Smith@example.com".to_string(),
            phone: "07700 900456".to_string(),
            check_in: Some(check_in),
            check_out: Some(check_in + ChronoDuration::days(3)),
            guests: 2,
            room_type: RoomType::Deluxe,
            special_requests: String::new(),
            room_id: Some("room-201".to_string()),
        }
    }

    fn instant_api() -> MockBookingApi {
        MockBookingApi::with_delay(ClientConfig::default(), Arc::new(NoDelay)).unwrap()
    }

    #[tokio::test]
    async fn test_example_submission() {
        let api = instant_api();
        let mut form = BookingForm::new(valid_draft());

        let attempt = form.submit(&api).await;

        let booking_id = match attempt {
            SubmitAttempt::Finished(SubmissionOutcome::Success { booking_id, .. }) => booking_id,
            other => panic!("Expected success, got {:?}", other),
        };
        assert!(booking_id.starts_with("BWK"));
        assert_eq!(form.draft(), &BookingDraft::default());

        let customer = api.customer_by_email("john.smith@example.com").await.unwrap();
        assert_eq!(customer.full_name(), "John Smith");
        assert_eq!(customer.booking_history.len(), 1);
        let booking = &customer.booking_history[0];
        assert_eq!(booking.id, booking_id);
        assert_eq!(booking.total_price, 360);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.room_id.as_deref(), Some("room-201"));
        assert_eq!(booking.special_requests, None);

        let stats = api.stats();
        assert_eq!(stats.requests_sent, 1);
        assert_eq!(stats.requests_succeeded, 1);
    }

    #[tokio::test]
    async fn test_example_failure_then_retry() {
        let api = instant_api();
        api.fail_next_requests(1);
        let draft = valid_draft();
        let mut form = BookingForm::new(draft.clone());

        let attempt = form.submit(&api).await;
        assert_eq!(
            attempt,
            SubmitAttempt::Finished(SubmissionOutcome::Error {
                message: SUBMISSION_FAILED_MESSAGE.to_string()
            })
        );
        assert_eq!(form.draft(), &draft);

        let attempt = form.submit(&api).await;
        assert!(matches!(
            attempt,
            SubmitAttempt::Finished(SubmissionOutcome::Success { .. })
        ));

        let stats = api.stats();
        assert_eq!(stats.requests_sent, 2);
        assert_eq!(stats.requests_failed, 1);
        assert_eq!(stats.requests_succeeded, 1);
    }

    #[tokio::test]
    async fn test_example_history_accumulates_per_customer() {
        let api = instant_api();
        let mut ids = HashSet::new();
        for _ in 0..5 {
            let request = BookingRequest::from_draft(&valid_draft(), Utc::now());
            let response = api.create_booking(request).await.unwrap();
            assert!(response.success);
            ids.insert(response.data.unwrap().id);
        }
        // back-to-back bookings without a delay still get distinct ids
        assert_eq!(ids.len(), 5);
        let customer = api.customer_by_email("JOHN.SMITH@example.com").await.unwrap();
        assert_eq!(customer.booking_history.len(), 5);
        let history_ids: HashSet<_> = customer.booking_history.iter().map(|b| b.id.clone()).collect();
        assert_eq!(history_ids, ids);
        assert!(api.customer_by_email("nobody@example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_example_rejects_missing_dates() {
        let api = instant_api();
        let draft = BookingDraft {
            check_out: None,
            ..valid_draft()
        };
        let result = api
            .create_booking(BookingRequest::from_draft(&draft, Utc::now()))
            .await;
        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_example_honours_configured_delay() {
        let config = ClientConfig {
            submit_delay_ms: 30,
            ..ClientConfig::default()
        };
        let api = MockBookingApi::new(config).unwrap();
        let started = Instant::now();
        let response = api
            .create_booking(BookingRequest::from_draft(&valid_draft(), Utc::now()))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(response.data.is_some());
    }

    #[tokio::test]
    async fn test_example_rejects_bad_config() {
        let config = ClientConfig {
            base_url: String::new(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            MockBookingApi::new(config),
            Err(ClientError::ConfigError(_))
        ));
    }
}
