//! Hand-tracking sources — LeapMotion hardware and keyboard simulation.
//!
//! A source delivers [`TrackerSample`]s over an `mpsc` channel: either a
//! full 21-landmark frame or "no hand".  Consumers never know whether the
//! frames came from real hardware or the simulator; both pass through the
//! same classifier.  Sources rate-limit themselves to one sample per
//! [`SAMPLE_INTERVAL`] so tracking cost stays bounded no matter how fast
//! the upstream device or window loop runs.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use hand_gesture::{poses, HandFrame};

/// Minimum spacing between emitted samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

// ════════════════════════════════════════════════════════════════════════════
// TrackerSample
// ════════════════════════════════════════════════════════════════════════════

/// One rate-limited tracking observation.
#[derive(Clone, Debug)]
pub enum TrackerSample {
    /// A hand was detected; the full landmark frame.
    Hand(HandFrame),
    /// The tracker ran but saw no hand.
    NoHand,
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TrackerSample`]s over a channel.
pub trait TrackerSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackerSample>);
}

/// Spawn a tracker source on its own thread and return the receiving end.
pub fn spawn_tracker_source<T: TrackerSource>(source: T) -> Receiver<TrackerSample> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimTrackerSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Pose currently held by the simulation keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    Fist,
    Open,
    Pinch,
}

/// Snapshot sent by the visualizer's input poll once per window frame.
#[derive(Clone, Copy, Debug)]
pub struct SimInput {
    pub pose:   Option<SimPose>,
    /// Mouse position mapped to camera space, 0–1, origin top-left.
    pub cursor: (f32, f32),
}

/// Tracker source driven by [`SimInput`] snapshots from the window loop.
///
/// The visualizer reports which pose key is held and where the mouse is;
/// this thread turns that into canonical landmark frames at the tracking
/// rate.  Snapshots arriving faster than [`SAMPLE_INTERVAL`] are dropped.
pub struct SimTrackerSource {
    pub rx: Receiver<SimInput>,
}

impl TrackerSource for SimTrackerSource {
    fn run(self: Box<Self>, tx: Sender<TrackerSample>) {
        let mut last_emit = Instant::now() - SAMPLE_INTERVAL;
        for input in self.rx {
            if last_emit.elapsed() < SAMPLE_INTERVAL {
                continue;
            }
            last_emit = Instant::now();

            let (cx, cy) = input.cursor;
            let sample = match input.pose {
                Some(SimPose::Fist) => TrackerSample::Hand(poses::fist_at(cx, cy)),
                Some(SimPose::Open) => TrackerSample::Hand(poses::open_at(cx, cy)),
                Some(SimPose::Pinch) => TrackerSample::Hand(poses::pinch_at(cx, cy)),
                None => TrackerSample::NoHand,
            };
            if tx.send(sample).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTrackerSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tracker source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library.  The
/// device reports five digits of four bones each in millimetres; those
/// joints are remapped onto the 21-point landmark frame and normalized
/// into the same 0–1 camera space the simulator uses, so the classifier
/// is oblivious to the backend.
///
/// Initialization failure is reported once and the source goes inert —
/// the scene keeps running without hand control.
#[cfg(feature = "leap")]
pub struct LeapTrackerSource;

#[cfg(feature = "leap")]
impl TrackerSource for LeapTrackerSource {
    fn run(self: Box<Self>, tx: Sender<TrackerSample>) {
        use hand_gesture::{landmark::*, Landmark};
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("[tracker] LeapC connection failed: {:?} — hand control disabled", e);
                return;
            }
        };
        if let Err(e) = connection.open() {
            eprintln!("[tracker] LeapMotion device open failed: {:?} — hand control disabled", e);
            return;
        }

        // Interaction-box extent in mm, mapped onto 0–1 camera space.
        fn norm(p: &leaprs::Vector) -> Landmark {
            Landmark::new(
                ((p.x + 250.0) / 500.0).clamp(0.0, 1.0),
                (1.0 - (p.y - 80.0) / 400.0).clamp(0.0, 1.0),
                p.z / 500.0,
            )
        }

        let mut last_emit = Instant::now() - SAMPLE_INTERVAL;
        loop {
            // Per-poll failures are dropped for that frame only; the last
            // delivered sample simply stays current downstream.
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(_) => continue,
            };
            if last_emit.elapsed() < SAMPLE_INTERVAL {
                continue;
            }

            if let Event::Tracking(frame) = msg.event() {
                let sample = match frame.hands().next() {
                    Some(hand) => {
                        let mut lm = [Landmark::default(); 21];
                        lm[WRIST] = norm(&hand.palm().position());

                        for (d, digit) in hand.digits().enumerate().take(5) {
                            // (metacarpal-base, proximal-base, intermediate-
                            // base, tip) onto the landmark quadruple.
                            let base = 1 + d * 4;
                            lm[base] = norm(&digit.metacarpal().prev_joint());
                            lm[base + 1] = norm(&digit.proximal().prev_joint());
                            lm[base + 2] = norm(&digit.intermediate().prev_joint());
                            lm[base + 3] = norm(&digit.distal().next_joint());
                        }
                        TrackerSample::Hand(lm)
                    }
                    None => TrackerSample::NoHand,
                };

                last_emit = Instant::now();
                if tx.send(sample).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::classify;

    #[test]
    fn sim_source_translates_poses() {
        let (in_tx, in_rx) = mpsc::channel();
        let rx = spawn_tracker_source(SimTrackerSource { rx: in_rx });

        in_tx
            .send(SimInput { pose: Some(SimPose::Fist), cursor: (0.5, 0.5) })
            .unwrap();
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            TrackerSample::Hand(frame) => assert!(classify(&frame).is_fist),
            TrackerSample::NoHand => panic!("expected a hand frame"),
        }
    }

    #[test]
    fn sim_source_rate_limits() {
        let (in_tx, in_rx) = mpsc::channel();
        let rx = spawn_tracker_source(SimTrackerSource { rx: in_rx });

        // A burst well inside one sample interval…
        for _ in 0..20 {
            in_tx
                .send(SimInput { pose: Some(SimPose::Open), cursor: (0.5, 0.5) })
                .unwrap();
        }
        drop(in_tx);

        // …collapses to a single emitted sample.
        let mut count = 0;
        while rx.recv_timeout(Duration::from_secs(2)).is_ok() {
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn sim_source_reports_no_hand() {
        let (in_tx, in_rx) = mpsc::channel();
        let rx = spawn_tracker_source(SimTrackerSource { rx: in_rx });

        in_tx.send(SimInput { pose: None, cursor: (0.2, 0.8) }).unwrap();
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            TrackerSample::NoHand
        ));
    }
}
