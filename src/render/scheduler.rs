//! Single-flight page render scheduling.
//!
//! The drawing surface can only take one render at a time. Requests that arrive while a
//! render is active park in a single pending slot; a newer request overwrites it. When the
//! active render completes, the parked page (if any) starts immediately.

/// Scheduler state. `pending` is only meaningful while busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Busy { active: u32, pending: Option<u32> },
}

/// What the caller must do after [`RenderScheduler::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    /// Begin rendering this page now
    Start(u32),
    /// A render is active; the page was parked, replacing `superseded`
    Deferred { superseded: Option<u32> },
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    state: SchedulerState,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SchedulerState::Busy { .. })
    }

    pub fn active(&self) -> Option<u32> {
        match self.state {
            SchedulerState::Busy { active, .. } => Some(active),
            SchedulerState::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<u32> {
        match self.state {
            SchedulerState::Busy { pending, .. } => pending,
            SchedulerState::Idle => None,
        }
    }

    pub fn request(&mut self, page: u32) -> RenderDecision {
        if let SchedulerState::Busy { pending, .. } = &mut self.state {
            return RenderDecision::Deferred {
                superseded: pending.replace(page),
            };
        }
        self.state = SchedulerState::Busy {
            active: page,
            pending: None,
        };
        RenderDecision::Start(page)
    }

    /// Mark the active render finished, successfully or not.
    ///
    /// Returns the parked page when one was waiting; the scheduler is then busy with it and the
    /// caller must start that render. Returns None and goes idle otherwise.
    pub fn complete(&mut self) -> Option<u32> {
        match self.state {
            SchedulerState::Busy {
                pending: Some(next),
                ..
            } => {
                self.state = SchedulerState::Busy {
                    active: next,
                    pending: None,
                };
                Some(next)
            }
            SchedulerState::Busy { pending: None, .. } => {
                self.state = SchedulerState::Idle;
                None
            }
            SchedulerState::Idle => {
                log::warn!("render completion reported while scheduler idle");
                None
            }
        }
    }

    /// Drop the active render and any parked page. Returns the dropped pending page.
    pub fn reset(&mut self) -> Option<u32> {
        let dropped = self.pending();
        self.state = SchedulerState::Idle;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn idle_request_starts_immediately() {
        let mut scheduler = RenderScheduler::new();
        assert_eq!(scheduler.request(3), RenderDecision::Start(3));
        assert_eq!(
            scheduler.state(),
            SchedulerState::Busy {
                active: 3,
                pending: None
            }
        );
    }

    #[test]
    fn busy_requests_overwrite_the_pending_slot() {
        let mut scheduler = RenderScheduler::new();
        scheduler.request(1);

        assert_eq!(
            scheduler.request(2),
            RenderDecision::Deferred { superseded: None }
        );
        assert_eq!(
            scheduler.request(5),
            RenderDecision::Deferred {
                superseded: Some(2)
            }
        );
        assert_eq!(scheduler.active(), Some(1));
        assert_eq!(scheduler.pending(), Some(5));
    }

    #[test]
    fn completion_drains_pending_then_goes_idle() {
        let mut scheduler = RenderScheduler::new();
        scheduler.request(1);
        scheduler.request(4);

        assert_eq!(scheduler.complete(), Some(4));
        assert_eq!(scheduler.active(), Some(4));
        assert_eq!(scheduler.pending(), None);

        assert_eq!(scheduler.complete(), None);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn stray_completion_keeps_scheduler_idle() {
        let mut scheduler = RenderScheduler::new();
        assert_eq!(scheduler.complete(), None);
        assert!(!scheduler.is_busy());
        assert_eq!(scheduler.request(2), RenderDecision::Start(2));
    }

    #[test]
    fn reset_discards_pending_and_goes_idle() {
        let mut scheduler = RenderScheduler::new();
        scheduler.request(1);
        scheduler.request(7);
        assert_eq!(scheduler.reset(), Some(7));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.complete(), None);
        assert_eq!(scheduler.request(3), RenderDecision::Start(3));
    }

    proptest! {
        /// Any burst of requests during an active render yields exactly one follow-up
        /// render, for the last page requested.
        #[test]
        fn bursts_collapse_to_latest(first in 1u32..50, burst in prop::collection::vec(1u32..50, 1..20)) {
            let mut scheduler = RenderScheduler::new();
            prop_assert_eq!(scheduler.request(first), RenderDecision::Start(first));
            for &page in &burst {
                let is_deferred = matches!(scheduler.request(page), RenderDecision::Deferred { .. });
                prop_assert!(is_deferred);
            }

            let mut rendered = vec![first];
            while let Some(next) = scheduler.complete() {
                rendered.push(next);
            }

            prop_assert_eq!(rendered, vec![first, *burst.last().unwrap()]);
            prop_assert_eq!(scheduler.state(), SchedulerState::Idle);
        }

        /// Interleaved requests and completions never run two renders at once and never
        /// drop a request made while idle.
        #[test]
        fn never_more_than_one_active(ops in prop::collection::vec(prop::option::of(1u32..20), 1..60)) {
            let mut scheduler = RenderScheduler::new();
            let mut in_flight = 0u32;
            for op in ops {
                match op {
                    Some(page) => {
                        let was_idle = !scheduler.is_busy();
                        match scheduler.request(page) {
                            RenderDecision::Start(started) => {
                                prop_assert!(was_idle);
                                prop_assert_eq!(started, page);
                                in_flight += 1;
                            }
                            RenderDecision::Deferred { .. } => prop_assert!(!was_idle),
                        }
                    }
                    None if in_flight > 0 => {
                        in_flight -= 1;
                        if scheduler.complete().is_some() {
                            in_flight += 1;
                        }
                    }
                    None => {}
                }
                prop_assert!(in_flight <= 1);
                prop_assert_eq!(in_flight == 1, scheduler.is_busy());
            }
        }
    }
}
