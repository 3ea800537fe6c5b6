//! Form score history with exponential moving average
//!
//! Features:
//! - Running mean over the session
//! - EMA for smoothing (alpha = 0.1)
//! - Recent trend and decline detection

use serde::Serialize;
use std::collections::VecDeque;

const EMA_ALPHA: f32 = 0.1;
/// Scores compared against the trend when checking for decline
const RECENT_SPAN: usize = 5;
const DECLINE_MARGIN: f32 = 0.05;

#[derive(Clone, Debug)]
pub struct FormHistory {
    count: u32,
    mean: f32,
    ema: f32,
    trend: VecDeque<f32>,
    trend_capacity: usize,
}

impl FormHistory {
    pub fn new(trend_capacity: usize) -> Self {
        FormHistory {
            count: 0,
            mean: 0.0,
            ema: 0.0,
            trend: VecDeque::with_capacity(trend_capacity),
            trend_capacity,
        }
    }

    pub fn record(&mut self, score: f32) {
        self.count += 1;
        self.mean += (score - self.mean) / self.count as f32;
        self.ema = if self.count == 1 {
            score
        } else {
            EMA_ALPHA * score + (1.0 - EMA_ALPHA) * self.ema
        };

        if self.trend_capacity > 0 {
            if self.trend.len() == self.trend_capacity {
                self.trend.pop_front();
            }
            self.trend.push_back(score);
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn ema(&self) -> f32 {
        self.ema
    }

    pub fn trend(&self) -> impl Iterator<Item = f32> + '_ {
        self.trend.iter().copied()
    }

    /// Recent scores noticeably below the trend average
    pub fn is_declining(&self) -> bool {
        if self.trend.len() < 2 * RECENT_SPAN {
            return false;
        }
        let overall = self.trend.iter().sum::<f32>() / self.trend.len() as f32;
        let recent = self.trend.iter().rev().take(RECENT_SPAN).sum::<f32>() / RECENT_SPAN as f32;
        recent < overall - DECLINE_MARGIN
    }

    pub fn stats(&self) -> FormStats {
        FormStats {
            frames_scored: self.count,
            mean_score: self.mean,
            ema_score: self.ema,
            declining: self.is_declining(),
        }
    }

    pub fn reset(&mut self) {
        *self = FormHistory::new(self.trend_capacity);
    }
}

impl Default for FormHistory {
    fn default() -> Self {
        Self::new(30)
    }
}

/// Snapshot for the session summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormStats {
    pub frames_scored: u32,
    pub mean_score: f32,
    pub ema_score: f32,
    pub declining: bool,
}
