/*!
 * Progress events pushed from a running job to its observer.
 */

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Event emitted by a translation job
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Fraction of the job completed, in `0.0..=1.0`
    Progress(f64),
    /// Human-readable status line (backup written, file saved, ...)
    Status(String),
}

/// Producer side of the progress queue.
///
/// Reported fractions never decrease. A reporter without a receiver
/// silently drops events.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: Option<UnboundedSender<JobEvent>>,
    last: f64,
}

impl ProgressReporter {
    /// Create a connected reporter and the receiving end of its queue
    pub fn channel() -> (Self, UnboundedReceiver<JobEvent>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                sender: Some(sender),
                last: 0.0,
            },
            receiver,
        )
    }

    /// A reporter that discards every event
    pub fn disabled() -> Self {
        Self {
            sender: None,
            last: 0.0,
        }
    }

    /// Report `done` out of `total` units of work
    pub fn report(&mut self, done: usize, total: usize) {
        let fraction = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).min(1.0)
        };
        self.report_fraction(fraction);
    }

    /// Report the job as complete
    pub fn finish(&mut self) {
        self.report_fraction(1.0);
    }

    pub fn status(&self, message: impl Into<String>) {
        self.send(JobEvent::Status(message.into()));
    }

    /// Last fraction reported
    pub fn last(&self) -> f64 {
        self.last
    }

    fn report_fraction(&mut self, fraction: f64) {
        let fraction = fraction.max(self.last);
        self.last = fraction;
        self.send(JobEvent::Progress(fraction));
    }

    fn send(&self, event: JobEvent) {
        if let Some(sender) = &self.sender {
            // A dropped receiver only means nobody is watching
            let _ = sender.send(event);
        }
    }
}
