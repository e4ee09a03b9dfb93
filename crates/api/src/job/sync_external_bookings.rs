use crate::shared::usecase::UseCase;
use chrono::{DateTime, Duration, TimeZone, Utc};
use practice_booking_api_structs::sync_external_bookings::APIResponse;
use practice_booking_domain::{
    Booking, ExternalAppointment, MalformedAppointment, SyncedBookingFields,
};
use practice_booking_infra::{InsertBookingError, PracticeContext};
use tokio::time::{timeout, Instant};
use tracing::{error, info, warn};

/// Pulls the appointments booked through the external scheduling service
/// and reconciles them into the booking store. Running it again with the
/// same appointments never creates duplicates.
#[derive(Debug)]
pub struct SyncExternalBookingsUseCase {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncReport {
    pub synced: usize,
    pub updated: usize,
    pub failed: usize,
    pub timed_out: bool,
    /// The external service answered a page fetch with an error
    pub upstream_error: bool,
}

impl From<SyncReport> for APIResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            synced: report.synced,
            updated: report.updated,
            failed: report.failed,
            timed_out: report.timed_out,
            upstream_error: report.upstream_error,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidSystemTime,
}

impl From<UseCaseError> for crate::error::PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidSystemTime => Self::InternalError,
        }
    }
}

enum Reconciled {
    Inserted,
    Updated,
}

#[derive(Debug)]
enum ReconcileError {
    Malformed(MalformedAppointment),
    Storage(anyhow::Error),
    VanishedAfterConflict,
}

impl From<MalformedAppointment> for ReconcileError {
    fn from(e: MalformedAppointment) -> Self {
        Self::Malformed(e)
    }
}

impl SyncExternalBookingsUseCase {
    async fn refresh(
        &self,
        mut existing: Booking,
        fields: SyncedBookingFields,
        ctx: &PracticeContext,
        now: i64,
    ) -> Result<Reconciled, ReconcileError> {
        existing.apply_synced(fields, now);
        ctx.repos
            .bookings
            .save_synced_fields(&existing)
            .await
            .map(|_| Reconciled::Updated)
            .map_err(ReconcileError::Storage)
    }

    async fn reconcile(
        &self,
        record: Result<ExternalAppointment, MalformedAppointment>,
        ctx: &PracticeContext,
        now: DateTime<Utc>,
    ) -> Result<Reconciled, ReconcileError> {
        let fields = record?.to_booking_fields(
            now,
            &ctx.config.practice_timezone,
            &ctx.config.keyword_extractor,
        )?;
        let now = now.timestamp_millis();

        let external_id = fields.external_id.clone();
        if let Some(existing) = ctx.repos.bookings.find_by_external_id(&external_id).await {
            return self.refresh(existing, fields, ctx, now).await;
        }

        let booking = Booking::from_synced(fields.clone(), now);
        match ctx.repos.bookings.insert(&booking).await {
            Ok(()) => Ok(Reconciled::Inserted),
            Err(InsertBookingError::DuplicateExternalId(_)) => {
                // Inserted concurrently after the lookup above
                let existing = ctx
                    .repos
                    .bookings
                    .find_by_external_id(&external_id)
                    .await
                    .ok_or(ReconcileError::VanishedAfterConflict)?;
                self.refresh(existing, fields, ctx, now).await
            }
            Err(InsertBookingError::Storage(e)) => Err(ReconcileError::Storage(e)),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncExternalBookingsUseCase {
    type Response = SyncReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncExternalBookings";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        let now = Utc
            .timestamp_millis_opt(ctx.sys.get_timestamp_millis())
            .single()
            .ok_or(UseCaseError::InvalidSystemTime)?;
        let since = now - Duration::days(ctx.config.sync_lookback_days);
        let deadline = Instant::now() + ctx.config.sync_timeout;

        let mut report = SyncReport::default();
        let mut page = 1;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let res = timeout(
                remaining,
                ctx.services.scheduling.list_appointments(since, page),
            )
            .await;
            let appointments = match res {
                Ok(Ok(appointments)) => appointments,
                Ok(Err(e)) => {
                    error!(
                        "Unable to fetch appointments page {}, reporting partial results: {:?}",
                        page, e
                    );
                    report.upstream_error = true;
                    break;
                }
                Err(_) => {
                    warn!(
                        "Sync pass timed out fetching page {}, reporting partial results",
                        page
                    );
                    report.timed_out = true;
                    break;
                }
            };

            for record in appointments.records {
                match self.reconcile(record, ctx, now).await {
                    Ok(Reconciled::Inserted) => report.synced += 1,
                    Ok(Reconciled::Updated) => report.updated += 1,
                    Err(ReconcileError::Malformed(e)) => {
                        warn!("Skipping appointment: {}", e);
                        report.failed += 1;
                    }
                    Err(ReconcileError::Storage(e)) => {
                        error!("Unable to store synced appointment: {:?}", e);
                        report.failed += 1;
                    }
                    Err(ReconcileError::VanishedAfterConflict) => {
                        error!("Synced booking vanished after an external id conflict");
                        report.failed += 1;
                    }
                }
            }

            match appointments.next_page {
                Some(next_page) if next_page > page => page = next_page,
                _ => break,
            }
        }

        info!("Sync pass done: {:?}", report);
        Ok(report)
    }
}
