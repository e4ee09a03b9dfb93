use crate::{
    job::{SendDueRemindersUseCase, SyncExternalBookingsUseCase},
    shared::usecase::execute,
};
use actix_web::rt::time::{interval_at, Instant};
use practice_booking_infra::PracticeContext;
use std::time::Duration;
use tracing::error;

/// Seconds until the next multiple of `interval_secs` on the wall clock, so
/// that passes run at predictable times like every full hour
pub fn get_start_delay(now_ts: u64, interval_secs: u64) -> u64 {
    let now_secs = now_ts / 1000;
    interval_secs - now_secs % interval_secs
}

fn start_interval(ctx: &PracticeContext, minutes: u64) -> actix_web::rt::time::Interval {
    let interval_secs = minutes.max(1) * 60;
    let now = ctx.sys.get_timestamp_millis().max(0) as u64;
    let start = Instant::now() + Duration::from_secs(get_start_delay(now, interval_secs));
    interval_at(start, Duration::from_secs(interval_secs))
}

pub fn start_send_reminders_job(ctx: PracticeContext, minutes: u64) {
    actix_web::rt::spawn(async move {
        let mut interval = start_interval(&ctx, minutes);
        loop {
            interval.tick().await;
            if let Err(e) = execute(SendDueRemindersUseCase {}, &ctx).await {
                error!("Scheduled reminder pass failed: {:?}", e);
            }
        }
    });
}

pub fn start_sync_bookings_job(ctx: PracticeContext, minutes: u64) {
    actix_web::rt::spawn(async move {
        let mut interval = start_interval(&ctx, minutes);
        loop {
            interval.tick().await;
            if let Err(e) = execute(SyncExternalBookingsUseCase {}, &ctx).await {
                error!("Scheduled sync pass failed: {:?}", e);
            }
        }
    });
}
