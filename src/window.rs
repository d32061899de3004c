use std::collections::VecDeque;
use std::fmt;

use nalgebra as na;

/// Trailing time window of samples. The oldest kept sample is the newest one
/// at least `span` seconds older than the latest push, so once the window
/// covers `span` it keeps covering it.
pub struct TimeWindow<T> {
    deque: VecDeque<(f64, T)>,
    span: f64,
}

impl<T: Clone> Clone for TimeWindow<T> {
    fn clone(&self) -> Self {
        Self {
            deque: self.deque.clone(),
            span: self.span,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TimeWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.deque.fmt(f)
    }
}

impl<T> TimeWindow<T> {
    #[inline]
    pub fn new(span: f64) -> Self {
        Self {
            deque: VecDeque::new(),
            span,
        }
    }

    pub fn push(&mut self, ts: f64, item: T) {
        self.deque.push_back((ts, item));

        while self.deque.len() > 1 && ts - self.deque[1].0 >= self.span {
            self.deque.pop_front();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.deque.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deque.is_empty()
    }

    /// Seconds between the oldest and the newest sample
    #[inline]
    pub fn covered(&self) -> f64 {
        match (self.deque.front(), self.deque.back()) {
            (Some(first), Some(last)) => last.0 - first.0,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        !self.deque.is_empty() && self.covered() >= self.span
    }

    #[inline]
    pub fn clear(&mut self) {
        self.deque.clear()
    }

    #[inline]
    pub fn oldest(&self) -> Option<&T> {
        self.deque.front().map(|(_, x)| x)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'_ T> {
        self.deque.iter().map(|(_, x)| x)
    }
}

impl TimeWindow<na::Point2<f32>> {
    /// Largest distance of any sample from the oldest one
    pub fn max_displacement(&self) -> f32 {
        let origin = match self.oldest() {
            Some(p) => *p,
            None => return 0.0,
        };

        self.iter()
            .map(|p| na::distance(&origin, p))
            .fold(0.0, f32::max)
    }
}
