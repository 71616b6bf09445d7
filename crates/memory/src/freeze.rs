//! Background loop that keeps a set of slots pinned to fixed values.
//!
//! At most one loop runs per controller. `start` stops and joins any previous
//! loop before spawning the next one, and `stop` only returns after the loop
//! thread has exited, so no write from a stopped session can land afterwards.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::backend::RemoteMemory;
use crate::batch::WriteBatch;
use crate::IndexedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    Idle,
    Running,
}

struct Session {
    stop: Sender<()>,
    handle: JoinHandle<()>,
    targets: Vec<IndexedValue>,
}

#[derive(Default)]
struct LoopCounters {
    running: AtomicBool,
    live: AtomicUsize,
    peak: AtomicUsize,
}

/// Marks a loop as alive for as long as it exists.
struct LoopGuard {
    counters: Arc<LoopCounters>,
}

impl LoopGuard {
    fn enter(counters: Arc<LoopCounters>) -> Self {
        let live = counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak.fetch_max(live, Ordering::SeqCst);

        Self { counters }
    }
}

impl Drop for LoopGuard {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        self.counters.running.store(false, Ordering::SeqCst);
    }
}

pub struct FreezeController {
    interval: Duration,
    session: Option<Session>,
    counters: Arc<LoopCounters>,
}

impl FreezeController {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            session: None,
            counters: Arc::new(LoopCounters::default()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts rewriting `batch` every interval, replacing any running session.
    pub fn start<M: RemoteMemory + 'static>(
        &mut self,
        memory: Arc<M>,
        batch: WriteBatch,
        targets: Vec<IndexedValue>,
    ) {
        self.stop();

        let (stop_tx, stop_rx) = mpsc::channel();
        let interval = self.interval;
        let counters = self.counters.clone();
        counters.running.store(true, Ordering::SeqCst);

        let handle = thread::spawn(move || {
            let _guard = LoopGuard::enter(counters);
            info!("Started freezing {} values", batch.len());

            let mut next_tick = Instant::now() + interval;
            loop {
                let timeout = next_tick.saturating_duration_since(Instant::now());
                match stop_rx.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        info!("Stopped freezing values");
                        return;
                    }
                }

                if let Err(e) = batch.submit(memory.as_ref()) {
                    if e.is_process_gone() {
                        error!("Target process not found, stopping freeze: {}", e);
                        return;
                    }
                    error!("Failed to write frozen values to target memory: {}", e);
                }

                next_tick = following_tick(next_tick, interval, Instant::now());
            }
        });

        self.session = Some(Session { stop: stop_tx, handle, targets });
    }

    /// Stops the running session and waits for its thread to exit.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        // The loop may have ended on its own already, in which case nobody
        // is listening anymore.
        let _ = session.stop.send(());
        if session.handle.join().is_err() {
            error!("Freeze loop panicked");
        }
        self.counters.running.store(false, Ordering::SeqCst);
        debug!("Freeze session joined");
    }

    /// Idle once stopped, or once the loop gave up because the target exited.
    pub fn state(&self) -> FreezeState {
        if self.counters.running.load(Ordering::SeqCst) {
            FreezeState::Running
        } else {
            FreezeState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == FreezeState::Running
    }

    /// Values held by the current session, empty when idle.
    pub fn targets(&self) -> &[IndexedValue] {
        match &self.session {
            Some(session) if self.is_running() => session.targets.as_slice(),
            _ => &[],
        }
    }

    /// Highest number of loops ever alive at the same time.
    pub fn peak_loops(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }
}

/// Next tick on the fixed cadence after `previous`, skipping ticks that were
/// missed instead of bursting. A zero interval ticks immediately.
fn following_tick(previous: Instant, interval: Duration, now: Instant) -> Instant {
    if interval.is_zero() {
        return now;
    }

    let mut next_tick = previous + interval;
    while next_tick <= now {
        next_tick += interval;
    }
    next_tick
}

impl Drop for FreezeController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use nix::errno::Errno;
    use stockpile_address::Base;

    use crate::batch::{SlotLayout, WriteBatch};
    use crate::buffer::BufferMemory;
    use crate::freeze::{following_tick, FreezeController, FreezeState};
    use crate::IndexedValue;

    const BASE: usize = 0x1000;
    const TICK: Duration = Duration::from_millis(20);

    fn setup() -> (Arc<BufferMemory>, SlotLayout, FreezeController) {
        let memory = Arc::new(BufferMemory::new(BASE, 8 * 4));
        let layout = SlotLayout::new(Base::from(BASE), 8);

        (memory, layout, FreezeController::new(TICK))
    }

    fn start(controller: &mut FreezeController, memory: &Arc<BufferMemory>, layout: &SlotLayout, values: Vec<IndexedValue>) {
        let batch = WriteBatch::new(layout, values.iter().map(|v| (v.index, v.value)));
        controller.start(memory.clone(), batch, values);
    }

    #[test]
    fn frozen_values_are_rewritten_after_external_changes() {
        let (memory, layout, mut controller) = setup();
        start(&mut controller, &memory, &layout, vec![IndexedValue::new(2, 500)]);

        thread::sleep(TICK * 5);
        assert_eq!(memory.peek_i32(BASE + 8), 500);

        memory.poke_i32(BASE + 8, 0);
        thread::sleep(TICK * 5);
        assert_eq!(memory.peek_i32(BASE + 8), 500);

        controller.stop();
    }

    #[test]
    fn no_writes_happen_after_stop_returns() {
        let (memory, layout, mut controller) = setup();
        start(&mut controller, &memory, &layout, vec![IndexedValue::new(2, 500)]);
        controller.stop();

        let writes = memory.write_calls();
        memory.poke_i32(BASE + 8, 7);
        thread::sleep(TICK * 5);

        assert_eq!(memory.write_calls(), writes);
        assert_eq!(memory.peek_i32(BASE + 8), 7);
        assert_eq!(controller.state(), FreezeState::Idle);
    }

    #[test]
    fn stopping_an_idle_controller_does_nothing() {
        let (_, _, mut controller) = setup();
        controller.stop();
        controller.stop();

        assert_eq!(controller.state(), FreezeState::Idle);
        assert_eq!(controller.peak_loops(), 0);
    }

    #[test]
    fn the_loop_ends_itself_when_the_target_exits() {
        let (memory, layout, mut controller) = setup();
        start(&mut controller, &memory, &layout, vec![IndexedValue::new(1, 9)]);
        assert!(controller.is_running());

        memory.fail_with(Errno::ESRCH);
        thread::sleep(TICK * 5);

        assert_eq!(controller.state(), FreezeState::Idle);
        assert!(controller.targets().is_empty());

        let writes = memory.write_calls();
        thread::sleep(TICK * 5);
        assert_eq!(memory.write_calls(), writes);
    }

    #[test]
    fn transient_failures_keep_the_loop_alive() {
        let (memory, layout, mut controller) = setup();
        start(&mut controller, &memory, &layout, vec![IndexedValue::new(4, -3)]);

        memory.fail_with(Errno::EPERM);
        thread::sleep(TICK * 5);
        assert!(controller.is_running());

        memory.recover();
        memory.poke_i32(BASE + 16, 0);
        thread::sleep(TICK * 5);

        assert_eq!(memory.peek_i32(BASE + 16), -3);
        controller.stop();
    }

    #[test]
    fn restarting_never_runs_two_loops_at_once() {
        let (memory, layout, mut controller) = setup();
        for value in 0..20 {
            start(&mut controller, &memory, &layout, vec![IndexedValue::new(0, value)]);
        }
        start(&mut controller, &memory, &layout, vec![IndexedValue::new(0, 1234)]);

        thread::sleep(TICK * 5);
        memory.poke_i32(BASE, 0);
        thread::sleep(TICK * 5);

        assert_eq!(controller.peak_loops(), 1);
        assert_eq!(memory.peek_i32(BASE), 1234);
        assert_eq!(controller.targets(), &[IndexedValue::new(0, 1234)]);
        controller.stop();
    }

    #[test]
    fn dropping_the_controller_stops_the_loop() {
        let (memory, layout, mut controller) = setup();
        start(&mut controller, &memory, &layout, vec![IndexedValue::new(3, 3)]);
        drop(controller);

        let writes = memory.write_calls();
        thread::sleep(TICK * 5);
        assert_eq!(memory.write_calls(), writes);
    }

    #[test]
    fn missed_ticks_are_skipped() {
        let origin = Instant::now();

        assert_eq!(following_tick(origin, TICK, origin), origin + TICK);
        assert_eq!(following_tick(origin, TICK, origin + TICK * 3), origin + TICK * 4);
        assert_eq!(following_tick(origin, Duration::ZERO, origin + TICK), origin + TICK);
    }

    #[test]
    fn a_zero_interval_loop_still_stops() {
        let memory = Arc::new(BufferMemory::new(BASE, 8 * 4));
        let layout = SlotLayout::new(Base::from(BASE), 8);
        let mut controller = FreezeController::new(Duration::ZERO);
        start(&mut controller, &memory, &layout, vec![IndexedValue::new(1, 11)]);
        thread::sleep(TICK * 2);

        let (done_tx, done_rx) = mpsc::channel();
        let stopper = thread::spawn(move || {
            controller.stop();
            done_tx.send(controller.state()).unwrap();
        });

        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)), Ok(FreezeState::Idle));
        stopper.join().unwrap();
        assert!(memory.write_calls() > 0);
        assert_eq!(memory.peek_i32(BASE + 4), 11);
    }
}
