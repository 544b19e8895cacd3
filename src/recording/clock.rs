use std::time::Duration;

/// Pure cut-timing policy for segment rotation.
///
/// Operates on caller-supplied millisecond timestamps (wall clock or frame
/// timestamps, as long as they are monotonic), so it is fully deterministic
/// under test. While paused, elapsed time does not accumulate; on resume the
/// reference start is shifted so only active recording time counts toward the
/// cut.
#[derive(Debug, Clone)]
pub struct SegmentClock {
    interval_ms: u64,
    segment_start_ms: u64,
    paused_at_ms: Option<u64>,
    paused_accum_ms: u64,
}

impl SegmentClock {
    pub fn new(interval: Duration, now_ms: u64) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            segment_start_ms: now_ms,
            paused_at_ms: None,
            paused_accum_ms: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_ms.is_some()
    }

    pub fn pause(&mut self, now_ms: u64) {
        if self.paused_at_ms.is_none() {
            self.paused_at_ms = Some(now_ms);
        }
    }

    pub fn resume(&mut self, now_ms: u64) {
        if let Some(paused_at) = self.paused_at_ms.take() {
            self.paused_accum_ms += now_ms.saturating_sub(paused_at);
        }
    }

    /// Milliseconds of active (unpaused) recording in the current segment.
    pub fn elapsed_active_ms(&self, now_ms: u64) -> u64 {
        let reference = self.paused_at_ms.unwrap_or(now_ms);
        reference
            .saturating_sub(self.segment_start_ms)
            .saturating_sub(self.paused_accum_ms)
    }

    /// True when the active segment has run for a full interval. Never true
    /// while paused, regardless of wall time elapsed.
    pub fn should_cut(&self, now_ms: u64) -> bool {
        !self.is_paused() && self.elapsed_active_ms(now_ms) >= self.interval_ms
    }

    /// Reset the reference for a freshly opened segment.
    pub fn begin_segment(&mut self, now_ms: u64) {
        self.segment_start_ms = now_ms;
        self.paused_accum_ms = 0;
        if self.paused_at_ms.is_some() {
            self.paused_at_ms = Some(now_ms);
        }
    }
}
