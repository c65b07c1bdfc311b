//! Background generation.
//!
//! The worker owns every intermediate structure until the maze is complete
//! and then hands it over as one `Arc<Maze>`. A cancelled worker publishes
//! nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::generator::{BuildError, GenerationRequest, Maze, build};

/// BSP partitioning recurses once per tree level.
const WORKER_STACK: usize = 64 * 1024 * 1024;

#[derive(Debug)]
pub enum BuildEvent {
    Progress(u8),
    Done(Arc<Maze>),
    Failed(BuildError),
}

/// Handle to one in-flight generation.
///
/// Dropping the handle cancels the build without waiting for the thread.
pub struct BuildHandle {
    cancel: Arc<AtomicBool>,
    events: Receiver<BuildEvent>,
    thread: Option<JoinHandle<()>>,
}

impl BuildHandle {
    pub fn spawn(req: GenerationRequest) -> std::io::Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, events) = mpsc::channel();

        let flag = Arc::clone(&cancel);
        let thread = thread::Builder::new()
            .name("maze-builder".into())
            .stack_size(WORKER_STACK)
            .spawn(move || {
                let mut last = None;
                let res = build(&req, |pct| {
                    if flag.load(Ordering::Relaxed) {
                        return false;
                    }
                    if last != Some(pct) {
                        last = Some(pct);
                        // receiver gone means nobody wants the maze any more
                        return tx.send(BuildEvent::Progress(pct)).is_ok();
                    }
                    true
                });
                let event = match res {
                    Ok(_) if flag.load(Ordering::Relaxed) => None,
                    Ok(maze) => Some(BuildEvent::Done(Arc::new(maze))),
                    Err(BuildError::Cancelled) => None,
                    Err(e) => {
                        error!("maze generation failed: {e}");
                        Some(BuildEvent::Failed(e))
                    }
                };
                match event {
                    Some(ev) => {
                        let _ = tx.send(ev);
                    }
                    None => debug!("maze generation abandoned"),
                }
            })?;

        Ok(Self {
            cancel,
            events,
            thread: Some(thread),
        })
    }

    /// Ask the worker to stop at its next poll.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Next event if one is ready.
    pub fn try_event(&self) -> Option<BuildEvent> {
        match self.events.try_recv() {
            Ok(ev) => Some(ev),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block for the next event; `None` once the worker has gone quiet for good.
    pub fn recv(&self) -> Option<BuildEvent> {
        self.events.recv().ok()
    }

    /// Block until the worker finishes, skipping progress events.
    pub fn wait(mut self) -> Result<Arc<Maze>, BuildError> {
        for ev in self.events.iter() {
            match ev {
                BuildEvent::Progress(_) => {}
                BuildEvent::Done(maze) => return Ok(maze),
                BuildEvent::Failed(e) => return Err(e),
            }
        }
        // channel closed without a result
        match self.thread.take().map(JoinHandle::join) {
            Some(Err(_)) => Err(BuildError::WorkerPanicked),
            _ => Err(BuildError::Cancelled),
        }
    }
}

impl Drop for BuildHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Algorithm;

    #[test]
    fn worker_publishes_a_maze() {
        let req = GenerationRequest {
            width: 10,
            height: 8,
            seed: Some(4),
            ..GenerationRequest::default()
        };
        let expected = build(&req, |_| true).unwrap();
        let maze = BuildHandle::spawn(req).unwrap().wait().unwrap();
        assert_eq!(maze.grid, expected.grid);
        assert_eq!(maze.start, expected.start);
    }

    #[test]
    fn cancelled_worker_publishes_nothing() {
        let req = GenerationRequest {
            width: 60,
            height: 60,
            rooms: 20,
            algorithm: Algorithm::Prim,
            seed: Some(8),
            ..GenerationRequest::default()
        };
        let handle = BuildHandle::spawn(req).unwrap();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(matches!(handle.wait(), Err(BuildError::Cancelled)));
    }
}
