//! Temporal coalescing: keyed rate limiting for high-frequency event streams.
//!
//! Bursts of same-kind events (pointer-move samples, per-target scroll,
//! wheel) collapse into fewer composite events before they reach the state
//! machine. Each stream gets an independent channel keyed by target identity
//! (plus one global channel for pointer movement), so independent scroll
//! containers never interfere with each other's windows.
//!
//! There are no real timers here: windows are measured against event
//! timestamps. The matcher settles expired windows (`poll`) when the next
//! event arrives and force-flushes everything (`flush_all`) before any
//! boundary event reaches the machine, which is what guarantees a buffered
//! composite is never attributed to the wrong step.

use crate::config::MatcherConfig;
use crate::event::{MoveSample, RawEvent, TimestampMs};
use crate::target::{Target, TargetId};
use std::collections::HashMap;
use tracing::trace;

/// Identity of one coalescing channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum ChannelKey {
    /// The single global pointer-movement channel
    PointerMove,
    /// Scroll events for one container (or the document, when untargeted)
    Scroll(Option<TargetId>),
    /// Wheel events over one element
    Wheel(Option<TargetId>),
}

/// What `schedule` decided to do with a sample.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScheduleOutcome {
    /// Leading edge of an idle channel: forward to the machine now.
    Forward(RawEvent, Option<Target>),
    /// Joined the channel's pending batch; a later flush will deliver it.
    Buffered,
    /// Dropped by a trailing-disabled policy (sample throttle, wheel burst
    /// tail). Never re-emitted.
    Swallowed,
}

/// A batch waiting for its window to elapse.
#[derive(Debug)]
enum Pending {
    /// Accumulated pointer-move samples, offsets relative to `baseline`.
    Moves {
        baseline: TimestampMs,
        samples: Vec<MoveSample>,
        deadline: TimestampMs,
    },
    /// Latest-wins sample (scroll offsets supersede each other).
    Latest {
        event: RawEvent,
        target: Option<Target>,
        deadline: TimestampMs,
    },
}

impl Pending {
    const fn deadline(&self) -> TimestampMs {
        match self {
            Self::Moves { deadline, .. } | Self::Latest { deadline, .. } => *deadline,
        }
    }

    fn into_composite(self) -> (RawEvent, Option<Target>) {
        match self {
            Self::Moves {
                baseline, samples, ..
            } => (
                RawEvent::PointerMove {
                    timestamp: baseline,
                    positions: samples,
                },
                None,
            ),
            Self::Latest { event, target, .. } => (event, target),
        }
    }
}

/// Per-channel window state.
#[derive(Debug, Default)]
struct Channel {
    /// When this channel last emitted (leading pass-through or flush)
    last_emit: Option<TimestampMs>,
    /// When the pointer channel last accepted a raw sample
    last_sample: Option<TimestampMs>,
    pending: Option<Pending>,
}

/// The keyed rate limiter. One instance per matcher; no global state.
#[derive(Debug)]
pub(crate) struct Coalescer {
    config: MatcherConfig,
    channels: HashMap<ChannelKey, Channel>,
}

impl Coalescer {
    pub(crate) fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            channels: HashMap::new(),
        }
    }

    /// Route one high-frequency event into its channel.
    ///
    /// Leading-edge policies hand the event straight back (`Forward`); the
    /// caller decides whether that forwarded event also forces a global
    /// flush (it does for wheel, which acts as a step boundary).
    pub(crate) fn schedule(
        &mut self,
        event: RawEvent,
        target: Option<Target>,
    ) -> ScheduleOutcome {
        let now = event.timestamp();
        match &event {
            RawEvent::PointerMove { .. } => self.schedule_move(event, now),
            RawEvent::Scroll { .. } => self.schedule_scroll(event, target, now),
            RawEvent::Wheel { .. } => self.schedule_wheel(event, target, now),
            // not a coalesced kind; the matcher forwards it directly
            _ => ScheduleOutcome::Forward(event, target),
        }
    }

    /// Pointer movement: a trailing-disabled sample throttle feeding a
    /// leading+trailing batch window. The first sample of an idle stream
    /// passes through as a single-sample composite (this is what lets the
    /// machine's drag-jitter guard see the sample right after a pointer
    /// down); later samples accumulate until the window elapses.
    fn schedule_move(&mut self, event: RawEvent, now: TimestampMs) -> ScheduleOutcome {
        let sample_interval = self.config.pointer_sample_interval_ms;
        let window = self.config.pointer_move_window_ms;
        let channel = self.channels.entry(ChannelKey::PointerMove).or_default();

        if let Some(last) = channel.last_sample {
            if now.saturating_sub(last) < sample_interval {
                return ScheduleOutcome::Swallowed;
            }
        }
        channel.last_sample = Some(now);

        let RawEvent::PointerMove { positions, .. } = &event else {
            return ScheduleOutcome::Forward(event, None);
        };

        let idle = channel
            .last_emit
            .map_or(true, |last| now.saturating_sub(last) >= window);
        if idle && channel.pending.is_none() {
            channel.last_emit = Some(now);
            return ScheduleOutcome::Forward(event.clone(), None);
        }

        match channel.pending.as_mut() {
            Some(Pending::Moves {
                baseline, samples, ..
            }) => {
                let base = *baseline;
                samples.extend(positions.iter().map(|sample| MoveSample {
                    x: sample.x,
                    y: sample.y,
                    time_offset: now.saturating_sub(base) + sample.time_offset,
                }));
            }
            _ => {
                let deadline = channel.last_emit.map_or(now + window, |last| last + window);
                channel.pending = Some(Pending::Moves {
                    baseline: now,
                    samples: positions.clone(),
                    deadline,
                });
            }
        }
        ScheduleOutcome::Buffered
    }

    /// Per-target scroll: leading + trailing. The first scroll of an idle
    /// container passes through; later offsets within the window supersede
    /// each other and the latest flushes when the window elapses.
    fn schedule_scroll(
        &mut self,
        event: RawEvent,
        target: Option<Target>,
        now: TimestampMs,
    ) -> ScheduleOutcome {
        let window = self.config.scroll_window_ms;
        let key = ChannelKey::Scroll(target.as_ref().map(Target::id));
        let channel = self.channels.entry(key).or_default();

        let idle = channel
            .last_emit
            .map_or(true, |last| now.saturating_sub(last) >= window);
        if idle && channel.pending.is_none() {
            channel.last_emit = Some(now);
            return ScheduleOutcome::Forward(event, target);
        }

        let deadline = channel.last_emit.map_or(now + window, |last| last + window);
        channel.pending = Some(Pending::Latest {
            event,
            target,
            deadline,
        });
        ScheduleOutcome::Buffered
    }

    /// Per-target wheel: leading-edge debounce with trailing disabled. The
    /// head of a burst is forwarded (and acts as a step boundary); the tail
    /// is swallowed.
    fn schedule_wheel(
        &mut self,
        event: RawEvent,
        target: Option<Target>,
        now: TimestampMs,
    ) -> ScheduleOutcome {
        let window = self.config.wheel_debounce_ms;
        let key = ChannelKey::Wheel(target.as_ref().map(Target::id));
        let channel = self.channels.entry(key).or_default();

        let idle = channel
            .last_emit
            .map_or(true, |last| now.saturating_sub(last) >= window);
        if idle {
            channel.last_emit = Some(now);
            return ScheduleOutcome::Forward(event, target);
        }
        ScheduleOutcome::Swallowed
    }

    /// Flush every channel whose window elapsed at or before `now`, oldest
    /// deadline first. Called before routing each incoming event so idle
    /// batches settle at the first opportunity.
    pub(crate) fn poll(&mut self, now: TimestampMs) -> Vec<(RawEvent, Option<Target>)> {
        self.drain(|pending| pending.deadline() <= now, now)
    }

    /// Flush every pending batch regardless of its remaining window, oldest
    /// deadline first. Called before any boundary event reaches the machine.
    pub(crate) fn flush_all(&mut self, now: TimestampMs) -> Vec<(RawEvent, Option<Target>)> {
        self.drain(|_| true, now)
    }

    fn drain(
        &mut self,
        should_flush: impl Fn(&Pending) -> bool,
        now: TimestampMs,
    ) -> Vec<(RawEvent, Option<Target>)> {
        let mut due: Vec<(TimestampMs, ChannelKey)> = self
            .channels
            .iter()
            .filter_map(|(key, channel)| {
                channel
                    .pending
                    .as_ref()
                    .filter(|pending| should_flush(pending))
                    .map(|pending| (pending.deadline(), *key))
            })
            .collect();
        // deadline order, channel key as the deterministic tie-break
        due.sort();

        due.into_iter()
            .filter_map(|(deadline, key)| {
                let channel = self.channels.get_mut(&key)?;
                let pending = channel.pending.take()?;
                channel.last_emit = Some(deadline.min(now));
                trace!(?key, deadline, "flushing coalescing channel");
                Some(pending.into_composite())
            })
            .collect()
    }

    /// Discard all channel state without emitting (matcher stop).
    pub(crate) fn clear(&mut self) {
        self.channels.clear();
    }

    /// Whether any channel holds an unflushed batch.
    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        self.channels.values().any(|c| c.pending.is_some())
    }
}
