//! Wait strategies for busy-wait polling
//!
//! Every blocking operation in this crate is a poll loop on a status
//! register. The loop calls [`WaitStrategy::wait`] between unsuccessful
//! polls, which decides whether to keep spinning or give up.

use crate::error::{Error, Result};

/// Called between unsuccessful polls of a status register
pub trait WaitStrategy {
    /// Wait before the next poll, or return an error to abandon the loop
    fn wait(&mut self) -> Result<()>;
}

/// Spin forever (the hardware default: no timeout, reset cancels)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spin;

impl WaitStrategy for Spin {
    #[inline]
    fn wait(&mut self) -> Result<()> {
        core::hint::spin_loop();
        Ok(())
    }
}

/// Give up with [`Error::Timeout`] after a fixed number of waits
///
/// The budget is shared by every blocking call made through the owner, so
/// re-arm it with [`BoundedPolls::reset`] to start a fresh budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedPolls {
    limit: u32,
    remaining: u32,
}

impl BoundedPolls {
    /// Allow `limit` waits before timing out
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Get the number of waits left before a timeout
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Restore the full budget
    pub fn reset(&mut self) {
        self.remaining = self.limit;
    }
}

impl WaitStrategy for BoundedPolls {
    fn wait(&mut self) -> Result<()> {
        if self.remaining == 0 {
            return Err(Error::Timeout);
        }
        self.remaining -= 1;
        core::hint::spin_loop();
        Ok(())
    }
}

impl<W: WaitStrategy + ?Sized> WaitStrategy for &mut W {
    fn wait(&mut self) -> Result<()> {
        (**self).wait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_polls_exhaust() {
        let mut wait = BoundedPolls::new(2);
        assert_eq!(wait.wait(), Ok(()));
        assert_eq!(wait.wait(), Ok(()));
        assert_eq!(wait.wait(), Err(Error::Timeout));
        assert_eq!(wait.remaining(), 0);

        wait.reset();
        assert_eq!(wait.remaining(), 2);
    }

    #[test]
    fn test_spin_never_fails() {
        let mut wait = Spin;
        for _ in 0..1000 {
            assert_eq!(wait.wait(), Ok(()));
        }
    }
}
