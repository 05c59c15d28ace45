// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Randomized pre-operation delay.
//!
//! Duplicate webhook deliveries tend to arrive within milliseconds of each
//! other. Sleeping a random time before the lookup spreads them out so the
//! later call usually observes the earlier call's write.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    max: Duration,
}

impl Jitter {
    /// Delays are drawn uniformly from `[0, max)`.
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    /// No delay at all.
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn sample(&self) -> Duration {
        let max_ms = self.max.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }

    /// Sleep for a sampled delay and return it.
    pub async fn wait(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
