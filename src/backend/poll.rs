//! Progress polling loop.
//!
//! Polls `/progress` until 100% is reported, then emits exactly one
//! [`ProgressUpdate::Complete`] and stops. Failures back off per [`PollPolicy`] and give up
//! after `max_failures` consecutive errors.

use crate::backend::SlideBackend;
use crate::config::PollPolicy;
use crate::render::protocol::{AppEvent, ProgressUpdate, RequestId};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub async fn poll_progress(
    backend: Arc<dyn SlideBackend>,
    policy: PollPolicy,
    request_id: RequestId,
    tx: UnboundedSender<AppEvent>,
) {
    let send = |update: ProgressUpdate| tx.send(AppEvent::Progress { request_id, update }).is_ok();
    let mut failures = 0u32;

    loop {
        match backend.progress().await {
            Ok(percent) => {
                failures = 0;
                if !send(ProgressUpdate::Report(percent)) {
                    return;
                }
                if percent >= 100 {
                    send(ProgressUpdate::Complete);
                    return;
                }
            }
            Err(err) => {
                failures += 1;
                log::warn!(
                    "progress poll failed ({}/{}): {}",
                    failures,
                    policy.max_failures,
                    err
                );
                if failures >= policy.max_failures {
                    send(ProgressUpdate::Failed {
                        message: err.to_string(),
                    });
                    return;
                }
            }
        }

        tokio::time::sleep(policy.delay_after(failures)).await;
    }
}
