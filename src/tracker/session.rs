//! Driving a [`HandStateMachine`] from a live or recorded observation feed.
use std::io::BufRead;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::history::HandSink;

use super::clock::{Clock, SystemClock};
use super::hand::HandRecord;
use super::observation::Observation;
use super::state_machine::HandStateMachine;

/// Where observations come from: a screen reader, a replay file, a test.
pub trait ObservationSource {
    /// The next observation, or `None` once the source is exhausted.
    ///
    /// A poll that saw nothing useful should return an empty
    /// [`Observation`], not `None`.
    fn poll(&mut self) -> Option<Observation>;
}

impl<F> ObservationSource for F
where
    F: FnMut() -> Option<Observation>,
{
    fn poll(&mut self) -> Option<Observation> {
        self()
    }
}

/// Replays a fixed sequence of observations.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Observation>,
{
    pub fn new(observations: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            inner: observations.into_iter(),
        }
    }
}

impl<I> ObservationSource for IterSource<I>
where
    I: Iterator<Item = Observation>,
{
    fn poll(&mut self) -> Option<Observation> {
        self.inner.next()
    }
}

/// Reads one JSON observation per line, as written by capture tooling.
///
/// Fields that don't read cleanly are treated as missing for that line only
/// (see [`Observation`]). Blank lines and lines that aren't JSON objects at
/// all are skipped; feeding them as empty observations would look like the
/// hero's cards disappearing. A read error ends the stream.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> ObservationSource for JsonLinesSource<R> {
    fn poll(&mut self) -> Option<Observation> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(error) => {
                    warn!(?error, line = self.line_number, "Observation stream failed");
                    return None;
                }
            }
            self.line_number += 1;

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(line) {
                Ok(value @ Value::Object(_)) => {
                    match serde_json::from_value::<Observation>(value) {
                        Ok(observation) => return Some(observation),
                        Err(error) => {
                            warn!(%error, line = self.line_number, "Skipping unreadable observation");
                        }
                    }
                }
                Ok(_) => warn!(line = self.line_number, "Skipping non-object observation"),
                Err(error) => {
                    warn!(%error, line = self.line_number, "Skipping unparseable observation");
                }
            }
        }
    }
}

/// What a single [`TableSession::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// The source had nothing more to give.
    Exhausted,
    /// An observation was processed and no hand finished.
    Observed,
    /// An observation was processed and finished this hand.
    Emitted(HandRecord),
}

/// One table: a source of observations, the state machine reconstructing
/// hands from it, and the sinks that receive every completed hand.
///
/// ```
/// use poker_tracker::history::VecSink;
/// use poker_tracker::tracker::{
///     HandStateMachine, IterSource, Observation, TableSession, TrackerConfig,
/// };
///
/// let sink = VecSink::new();
/// let hands = sink.get_storage();
///
/// let source = IterSource::new(vec![
///     Observation::new().hero_cards(["Ah", "Kd"]),
///     Observation::new(),
/// ]);
/// let config = TrackerConfig {
///     poll_interval_ms: 1,
///     ..TrackerConfig::default()
/// };
/// let machine = HandStateMachine::new(config).unwrap();
/// let mut session = TableSession::new(source, machine).with_sink(sink);
///
/// assert_eq!(1, session.run());
/// assert_eq!(1, hands.borrow().len());
/// ```
pub struct TableSession<S, C: Clock = SystemClock> {
    source: S,
    machine: HandStateMachine<C>,
    sinks: Vec<Box<dyn HandSink>>,
    ticks: u64,
}

impl<S: ObservationSource, C: Clock> TableSession<S, C> {
    pub fn new(source: S, machine: HandStateMachine<C>) -> Self {
        Self {
            source,
            machine,
            sinks: Vec::new(),
            ticks: 0,
        }
    }

    pub fn with_sink(mut self, sink: impl HandSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn with_sinks(mut self, sinks: Vec<Box<dyn HandSink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    pub fn machine(&self) -> &HandStateMachine<C> {
        &self.machine
    }

    /// Observations processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Poll the source once and feed the result to the state machine.
    pub fn tick(&mut self) -> Tick {
        let Some(observation) = self.source.poll() else {
            return Tick::Exhausted;
        };
        self.ticks += 1;

        match self.machine.update(&observation) {
            Some(hand) => {
                self.dispatch(&hand);
                Tick::Emitted(hand)
            }
            None => Tick::Observed,
        }
    }

    /// Tick until the source is exhausted, sleeping the configured poll
    /// interval between observations, then [`finish`](Self::finish).
    ///
    /// Returns how many hands were emitted.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self) -> usize {
        let interval = self.machine.config().poll_interval();
        let mut emitted = 0;

        loop {
            match self.tick() {
                Tick::Exhausted => break,
                Tick::Emitted(_) => emitted += 1,
                Tick::Observed => {}
            }
            std::thread::sleep(interval);
        }

        if self.finish().is_some() {
            emitted += 1;
        }

        info!(ticks = self.ticks, emitted, "Session finished");
        emitted
    }

    /// Wrap up the session. When `complete_on_shutdown` is set the open hand
    /// is emitted to the sinks; otherwise it is dropped.
    pub fn finish(&mut self) -> Option<HandRecord> {
        if !self.machine.config().complete_on_shutdown {
            if let Some(hand) = self.machine.current_hand() {
                debug!(hand_id = %hand.id(), "Dropping open hand at shutdown");
            }
            return None;
        }

        let hand = self.machine.force_complete()?;
        self.dispatch(&hand);
        Some(hand)
    }

    fn dispatch(&mut self, hand: &HandRecord) {
        for sink in self.sinks.iter_mut() {
            if let Err(error) = sink.record(hand) {
                warn!(?error, hand_id = %hand.hand_id, "Sink failed to record hand");
            }
        }
    }
}
