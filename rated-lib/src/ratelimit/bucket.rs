use std::time::{Duration, Instant};

/// State of one slot: fractional tokens left and the instant it was last used.
///
/// A bucket knows nothing about keys or its own limits. Burst and refill
/// interval are supplied on every call, so two keys colliding into the same
/// slot with different overrides simply take turns applying theirs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    tokens: f64,
    last_update: Option<Instant>,
}

impl Bucket {
    /// Tokens currently available, as of the last access.
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// Instant of the last decision, `None` if the bucket was never used.
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn is_unused(&self) -> bool {
        self.last_update.is_none()
    }

    /// Refill the bucket for the time elapsed since its last use, then try to
    /// take one token. Returns `true` if a token was taken.
    ///
    /// Refill is continuous: `elapsed / refill` tokens are added, capped at
    /// `burst`. If `now` is not after the last update nothing is added and
    /// nothing is taken away. A bucket that was never used starts full.
    ///
    /// `refill` must be non-zero.
    pub fn admit(&mut self, now: Instant, burst: f64, refill: Duration) -> bool {
        match self.last_update {
            Some(last) => {
                if let Some(elapsed) = now.checked_duration_since(last) {
                    let accrued = elapsed.as_secs_f64() / refill.as_secs_f64();
                    if accrued > 0.0 {
                        self.tokens = (self.tokens + accrued).min(burst);
                    }
                }
            }
            None if self.tokens == 0.0 => self.tokens = burst,
            None => {}
        }
        self.last_update = Some(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
