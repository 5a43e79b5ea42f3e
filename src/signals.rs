//! Signal handling for brightr.
//!
//! Brightness keys are wired to `SIGUSR1` (brighter) and `SIGUSR2` (dimmer),
//! matching the classic xbacklight-helper convention. A dedicated thread
//! turns raw signals into [`SignalMessage`] values on an mpsc channel; the
//! main loop drains the channel while it waits out the poll interval, so
//! handler work and periodic work never interleave and the model needs no
//! locking.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use crate::brightness::BumpDirection;
use crate::logger::Log;

/// Unified signal message type for all signal-based communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Manual brightness step (SIGUSR1 up, SIGUSR2 down)
    Bump(BumpDirection),
    /// Shutdown signal (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
    /// Channel receiver for unified signal messages
    pub signal_receiver: std::sync::mpsc::Receiver<SignalMessage>,
}

/// Set up signal handling for the application.
///
/// Returns a [`SignalState`] containing the running flag and signal receiver
/// channel. Spawns a background thread that monitors for signals and sends
/// appropriate messages via the channel.
pub fn setup_signal_handler() -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = std::sync::mpsc::channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGUSR1 | SIGUSR2 => {
                    let direction = if sig == SIGUSR1 {
                        BumpDirection::Up
                    } else {
                        BumpDirection::Down
                    };
                    if signal_sender.send(SignalMessage::Bump(direction)).is_err() {
                        // Main thread is gone; nothing left to do
                        break;
                    }
                }
                _ => {
                    let user_message = match sig {
                        SIGINT => "Received interrupt signal, initiating graceful shutdown...",
                        SIGTERM => "Received termination request, initiating graceful shutdown...",
                        SIGHUP => "Received hangup signal, initiating graceful shutdown...",
                        _ => "Received shutdown signal, initiating graceful shutdown...",
                    };
                    Log::log_pipe();
                    Log::log_decorated(user_message);

                    if signal_sender.send(SignalMessage::Shutdown).is_err() {
                        break;
                    }
                    running_clone.store(false, Ordering::SeqCst);

                    // Keep the thread alive to swallow repeated Ctrl+C until
                    // the main loop finishes cleanup
                }
            }
        }
    });

    Ok(SignalState {
        running,
        signal_receiver,
    })
}

/// How a [`wait_out_poll_interval`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full poll interval passed; time for the next solar re-base.
    IntervalElapsed,
    /// A shutdown was requested, or the signal thread is gone.
    ShutdownRequested,
}

/// Wait out one poll interval in small chunks, applying bumps as they arrive.
///
/// Bump messages preempt the wait and are handed to `on_bump` immediately.
/// The elapsed slice of an interrupted chunk still counts toward the
/// interval, so the wait resumes where it left off: a stream of signals can
/// only shorten the time to the next poll (by at most one chunk), never
/// extend it.
pub fn wait_out_poll_interval(
    receiver: &Receiver<SignalMessage>,
    running: &AtomicBool,
    poll_interval: Duration,
    check_interval: Duration,
    mut on_bump: impl FnMut(BumpDirection),
) -> WaitOutcome {
    let mut slept = Duration::ZERO;

    while slept < poll_interval {
        if !running.load(Ordering::SeqCst) {
            return WaitOutcome::ShutdownRequested;
        }
        let chunk = check_interval.min(poll_interval - slept);
        let started = Instant::now();
        match receiver.recv_timeout(chunk) {
            Ok(SignalMessage::Bump(direction)) => {
                on_bump(direction);
                slept += started.elapsed().min(chunk);
            }
            Ok(SignalMessage::Shutdown) => return WaitOutcome::ShutdownRequested,
            Err(RecvTimeoutError::Timeout) => slept += chunk,
            Err(RecvTimeoutError::Disconnected) => return WaitOutcome::ShutdownRequested,
        }
    }

    WaitOutcome::IntervalElapsed
}
