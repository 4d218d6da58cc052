use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::{debug, info};

use crate::recording::common::Units;
use crate::recording::session::{self, Session};
use crate::recording::summary::Summarizer;

/// What one finalize pass wrote, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    /// Bare summary-file name, as shown to the user.
    pub filename: String,

    /// Data rows written in this pass.
    pub rows: usize,

    /// Net result of the sitting in bet units.
    pub net: Units,
}

/// [Finalizer] is the single exit point of a sitting. The normal quit path
/// and the interrupt listener both call [Finalizer::run]; whichever gets
/// there first writes the summary and the other becomes a no-op, so the
/// records are flushed exactly once however the process ends.
pub struct Finalizer {
    session: Arc<Mutex<Session>>,
    summarizer: Summarizer,
    done: AtomicBool,
}

impl Finalizer {
    pub fn new(session: Arc<Mutex<Session>>, summarizer: Summarizer) -> Self {
        Self {
            session,
            summarizer,
            done: AtomicBool::new(false),
        }
    }

    /// Writes the buffered records at most once. Losers of the race get
    /// [None]; the session lock is held across the write, so by the time
    /// [None] is returned the winning write has already finished.
    pub fn run(&self) -> Result<Option<FlushReport>> {
        let session = session::lock(&self.session);
        if self.done.swap(true, Ordering::SeqCst) {
            debug!("summary already written, skipping");
            return Ok(None);
        }
        let rows = self.summarizer.write(&session)?;
        info!(path = %self.summarizer.path().display(), rows, "summary written");
        Ok(Some(FlushReport {
            filename: self.summarizer.filename().to_string(),
            rows,
            net: session.net_units(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::common::Observation;
    use crate::recording::hand::Hand;
    use crate::recording::summary::WritePolicy;

    const ROUNDS: u32 = 5;

    fn finalizer(dir: &std::path::Path) -> Finalizer {
        let mut session = Session::new(ROUNDS, 1, Observation(1));
        session.record_hand(Hand::Straight, ROUNDS).unwrap();
        session.record_hand(Hand::TwoPairs, 0).unwrap();
        let summarizer = Summarizer::new(dir, ROUNDS, WritePolicy::Append);
        Finalizer::new(Arc::new(Mutex::new(session)), summarizer)
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let temp = tempfile::tempdir().unwrap();
        let finalizer = finalizer(temp.path());

        let report = finalizer.run().unwrap().unwrap();
        assert_eq!(report.filename, "frequencies_5.csv");
        assert_eq!(report.rows, 2);
        assert_eq!(report.net, Units::new(15 - 1));

        assert_eq!(finalizer.run().unwrap(), None);

        let summarizer = Summarizer::new(temp.path(), ROUNDS, WritePolicy::Append);
        assert_eq!(summarizer.existing_observations().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_callers_write_once() {
        let temp = tempfile::tempdir().unwrap();
        let finalizer = Arc::new(finalizer(temp.path()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let finalizer = Arc::clone(&finalizer);
                std::thread::spawn(move || finalizer.run().unwrap().is_some())
            })
            .collect();
        let writes = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|wrote| *wrote)
            .count();
        assert_eq!(writes, 1);

        let summarizer = Summarizer::new(temp.path(), ROUNDS, WritePolicy::Append);
        assert_eq!(summarizer.existing_observations().unwrap(), 2);
    }
}
