use crate::{
    notification::{DeliveryResult, NotificationDispatcher, NotificationKind},
    shared::usecase::UseCase,
};
use chrono::{Duration, TimeZone, Utc};
use futures::TryStreamExt;
use practice_booking_api_structs::send_due_reminders::APIResponse;
use practice_booking_domain::{due_reminders, Booking};
use practice_booking_infra::{BookingQuery, PracticeContext};
use tracing::{error, info, warn};

/// Sends every reminder that is due and has not been sent before
#[derive(Debug)]
pub struct SendDueRemindersUseCase {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReminderReport {
    /// Active bookings looked at
    pub scanned: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl From<ReminderReport> for APIResponse {
    fn from(report: ReminderReport) -> Self {
        Self {
            scanned: report.scanned,
            sent: report.sent,
            skipped: report.skipped,
            failed: report.failed,
        }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for crate::error::PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueRemindersUseCase {
    type Response = ReminderReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let tz = ctx.config.practice_timezone;
        // Yesterday in the practice timezone still covers every upcoming appointment
        let date_from = Utc
            .timestamp_millis_opt(now)
            .single()
            .map(|now| now.with_timezone(&tz).date_naive() - Duration::days(1))
            .ok_or(UseCaseError::StorageError)?;

        let bookings: Vec<Booking> = ctx
            .repos
            .bookings
            .stream(BookingQuery::active_from(date_from))
            .try_collect()
            .await
            .map_err(|e| {
                error!("Unable to load active bookings: {:?}", e);
                UseCaseError::StorageError
            })?;

        let mut report = ReminderReport {
            scanned: bookings.len(),
            ..Default::default()
        };

        let dispatcher = NotificationDispatcher::new(ctx);
        for due in due_reminders(bookings, now, &tz) {
            let result = dispatcher
                .dispatch(NotificationKind::Reminder(due.window), &due.booking)
                .await;
            match result {
                DeliveryResult::Sent => {
                    report.sent += 1;
                    // A missing marker means the reminder goes out again next pass
                    match ctx
                        .repos
                        .bookings
                        .set_reminder_marker(&due.booking.id, due.window, now)
                        .await
                    {
                        Ok(true) => (),
                        Ok(false) => warn!(
                            "Reminder {} for booking {} was already marked as sent",
                            due.window, due.booking.id
                        ),
                        Err(e) => error!(
                            "Unable to mark reminder {} for booking {} as sent: {:?}",
                            due.window, due.booking.id, e
                        ),
                    }
                }
                DeliveryResult::Skipped(_) => report.skipped += 1,
                DeliveryResult::Failed(_) => report.failed += 1,
            }
        }

        info!("Reminder pass done: {:?}", report);
        Ok(report)
    }
}
