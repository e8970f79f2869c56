/*
 *  func_timer.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scoped timer for frame work, warns when a frame overruns
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
use log::{trace, warn};
use std::time::{Duration, Instant};

pub struct FunctionTimer {
    name: &'static str,
    start: Instant,
    budget: Option<Duration>,
}

impl FunctionTimer {
    pub fn new(name: &'static str) -> Self {
        FunctionTimer { name, start: Instant::now(), budget: None }
    }

    /// Warn instead of trace when the scope takes longer than `budget`.
    pub fn with_budget(name: &'static str, budget: Duration) -> Self {
        FunctionTimer { name, start: Instant::now(), budget: Some(budget) }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn over_budget(&self, elapsed: Duration) -> bool {
        self.budget.is_some_and(|b| elapsed > b)
    }
}

// Called automatically when the `FunctionTimer` goes out of scope.
impl Drop for FunctionTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        if self.over_budget(duration) {
            warn!("'{}' took {:?}, over the {:?} frame budget", self.name, duration, self.budget.unwrap_or_default());
        } else {
            trace!("'{}' took {:?}", self.name, duration);
        }
    }
}
