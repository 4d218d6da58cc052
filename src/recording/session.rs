use std::sync::{Mutex, MutexGuard};

use thiserror::Error as ThisError;

use super::{
    common::{Observation, Units},
    hand::{Hand, Outcome},
};

/// [RecordError] states the reason a round entry was rejected. The session
/// buffer is unchanged when one is returned.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum RecordError {
    /// The last won round lies outside the range fixed at session start.
    #[error("last won round out of range (got={got}, max={max})")]
    RoundOutOfRange { got: u32, max: u32 },
}

pub type RecordResult = Result<Record, RecordError>;

/// [Record] is one settled double-or-nothing entry, exactly as it will be
/// written to the summary file (minus the [Observation] number, which is
/// assigned at write time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub outcome: Outcome,

    /// Last round that was still won, in `0..=rounds`.
    pub last_round: u32,

    /// True iff every round was won, i.e. `last_round == rounds`.
    pub success: bool,

    /// Settled win or loss in initial-bet units.
    pub result: Units,
}

/// [Session] buffers the entries of one sitting in insertion order.
/// Nothing is written to disk until the session is summarized; records are
/// never removed or reordered.
#[derive(Debug)]
pub struct Session {
    /// Number of double-or-nothing rounds under evaluation. Fixed for the
    /// lifetime of the session, at least 1.
    rounds: u32,

    /// Initial bet scalar applied to every result, at least 1.
    bet: u32,

    /// Where numbering starts when the records are written. Derived from
    /// the data rows already present in the summary file.
    first_observation: Observation,

    records: Vec<Record>,
}

impl Session {
    pub fn new(rounds: u32, bet: u32, first_observation: Observation) -> Self {
        Self {
            rounds,
            bet,
            first_observation,
            records: Vec::new(),
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn first_observation(&self) -> Observation {
        self.first_observation
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Settles a [Hand] against the last won round and appends the entry.
    ///
    /// A run that survived every round pays `last_round * multiplier` bet
    /// units; any earlier exit forfeits exactly one stake regardless of the
    /// hand or how far the run got. Either way the result is scaled by the
    /// initial bet.
    pub fn record_hand(&mut self, hand: Hand, last_round: u32) -> RecordResult {
        if last_round > self.rounds {
            return Err(RecordError::RoundOutOfRange {
                got: last_round,
                max: self.rounds,
            });
        }
        let success = last_round == self.rounds;
        let result = if success {
            Units::new(
                i64::from(last_round) * i64::from(hand.multiplier()) * i64::from(self.bet),
            )
        } else {
            Units::new(i64::from(self.bet)).reversed()
        };
        let record = Record {
            outcome: Outcome::Hand(hand),
            last_round,
            success,
            result,
        };
        self.records.push(record);
        Ok(record)
    }

    /// Appends the reserved first-hand-lost entry. No multiplier applies;
    /// the stake is forfeit outright.
    pub fn record_first_hand_lost(&mut self) -> Record {
        let record = Record {
            outcome: Outcome::FirstHandLost,
            last_round: 0,
            success: false,
            result: Units::new(i64::from(self.bet)).reversed(),
        };
        self.records.push(record);
        record
    }

    /// Net win or loss across the buffered records, in bet units.
    pub fn net_units(&self) -> Units {
        let mut net = Units::default();
        for record in &self.records {
            net += record.result;
        }
        net
    }
}

/// Locks the shared session, recovering the guard when a previous holder
/// panicked. Buffered records must still reach the final write in that
/// case.
pub fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    match session.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use proptest::prelude::*;

    const ROUNDS: u32 = 5;

    fn session() -> Session {
        Session::new(ROUNDS, 1, Observation(1))
    }

    #[test]
    fn test_successful_run_pays_rounds_times_multiplier() {
        let mut session = session();
        let record = session.record_hand(Hand::Straight, ROUNDS).unwrap();
        assert_eq!(record.outcome, Outcome::Hand(Hand::Straight));
        assert_eq!(record.last_round, ROUNDS);
        assert!(record.success);
        assert_eq!(record.result, Units::new(15));
    }

    #[test]
    fn test_lost_run_forfeits_one_stake() {
        let mut session = session();
        let record = session.record_hand(Hand::RoyalFlush, 2).unwrap();
        assert_eq!(record.outcome, Outcome::Hand(Hand::RoyalFlush));
        assert!(!record.success);
        assert_eq!(record.result, Units::new(-1));
    }

    #[test]
    fn test_loss_is_independent_of_hand_and_distance() {
        let mut session = session();
        for hand in Hand::ALL {
            for last_round in 0..ROUNDS {
                let record = session.record_hand(hand, last_round).unwrap();
                assert!(!record.success);
                assert_eq!(record.result, Units::new(-1));
            }
        }
    }

    #[test]
    fn test_first_hand_lost_entry() {
        let mut session = session();
        let record = session.record_first_hand_lost();
        assert_eq!(record.outcome, Outcome::FirstHandLost);
        assert_eq!(record.last_round, 0);
        assert!(!record.success);
        assert_eq!(record.result, Units::new(-1));
    }

    #[test]
    fn test_out_of_range_round_is_rejected_and_buffers_nothing() {
        let mut session = session();
        let res = session.record_hand(Hand::Flush, ROUNDS + 1);
        assert_eq!(
            res,
            Err(RecordError::RoundOutOfRange {
                got: ROUNDS + 1,
                max: ROUNDS
            })
        );
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_bet_scales_every_result() {
        let mut session = Session::new(ROUNDS, 3, Observation(1));
        let won = session.record_hand(Hand::Flush, ROUNDS).unwrap();
        assert_eq!(won.result, (5 * 4 * 3).into());
        let lost = session.record_hand(Hand::RoyalJelly, 0).unwrap();
        assert_eq!(lost.result, (-3).into());
        let folded = session.record_first_hand_lost();
        assert_eq!(folded.result, (-3).into());
    }

    #[test]
    fn test_records_keep_insertion_order() {
        let mut session = session();
        session.record_hand(Hand::TwoPairs, 1).unwrap();
        session.record_first_hand_lost();
        session.record_hand(Hand::RoyalJelly, ROUNDS).unwrap();

        let outcomes: Vec<_> = session.records().iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Hand(Hand::TwoPairs),
                Outcome::FirstHandLost,
                Outcome::Hand(Hand::RoyalJelly),
            ]
        );
        assert_eq!(session.net_units(), Units::new(-1 - 1 + 5 * 500));
    }

    prop_compose! {
        fn any_hand() (
            idx in 0..Hand::ALL.len(),
      ) -> Hand {
          Hand::ALL[idx]
      }
    }

    #[test]
    fn test_settlement_formula_over_generated_entries() {
        let bet = 2u32;
        let session = RefCell::new(Session::new(ROUNDS, bet, Observation(1)));
        let running_net = RefCell::new(Units::default());

        proptest!(|(hand in any_hand(), last_round in 0u32..=ROUNDS)| {
            let mut session = session.borrow_mut();
            let record = session.record_hand(hand, last_round).unwrap();

            let success = last_round == ROUNDS;
            assert_eq!(record.success, success);
            let expected = if success {
                Units::new(i64::from(last_round) * i64::from(hand.multiplier()) * i64::from(bet))
            } else {
                Units::new(i64::from(bet)).reversed()
            };
            assert_eq!(record.result, expected);

            let mut running_net = running_net.borrow_mut();
            *running_net += expected;
            assert_eq!(session.net_units(), *running_net);
        });
    }

    #[test]
    fn test_out_of_range_rounds_never_settle() {
        let session = RefCell::new(session());

        proptest!(|(hand in any_hand(), last_round in (ROUNDS + 1)..1000u32)| {
            let mut session = session.borrow_mut();
            let res = session.record_hand(hand, last_round);
            assert_eq!(
                res,
                Err(RecordError::RoundOutOfRange { got: last_round, max: ROUNDS })
            );
            assert!(session.records().is_empty());
        });
    }
}
