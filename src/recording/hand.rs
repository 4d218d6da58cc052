/// [Hand] is one of the ten paying double-or-nothing trigger categories.
/// Each carries the input token typed at the prompt, the label written to
/// the summary file and the payout multiplier applied to the last won
/// round.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Hand {
    TwoPairs,
    Triple,
    Straight,
    Flush,
    FullHouse,
    FourPairs,
    StraightFlush,
    FivePairs,
    RoyalFlush,
    RoyalJelly,
}

impl Hand {
    pub const ALL: [Hand; 10] = [
        Hand::TwoPairs,
        Hand::Triple,
        Hand::Straight,
        Hand::Flush,
        Hand::FullHouse,
        Hand::FourPairs,
        Hand::StraightFlush,
        Hand::FivePairs,
        Hand::RoyalFlush,
        Hand::RoyalJelly,
    ];

    /// Looks a [Hand] up by its prompt token. Tokens are matched
    /// case-insensitively; `"0"` (first hand lost) is not a hand and maps
    /// to [None] like any unknown token.
    pub fn from_token(token: &str) -> Option<Self> {
        let hand = match token.to_ascii_lowercase().as_str() {
            "2" => Hand::TwoPairs,
            "3" => Hand::Triple,
            "s" => Hand::Straight,
            "f" => Hand::Flush,
            "fh" => Hand::FullHouse,
            "4" => Hand::FourPairs,
            "sf" => Hand::StraightFlush,
            "5" => Hand::FivePairs,
            "r" => Hand::RoyalFlush,
            "rj" => Hand::RoyalJelly,
            _ => return None,
        };
        Some(hand)
    }

    pub fn token(&self) -> &'static str {
        match self {
            Hand::TwoPairs => "2",
            Hand::Triple => "3",
            Hand::Straight => "s",
            Hand::Flush => "f",
            Hand::FullHouse => "fh",
            Hand::FourPairs => "4",
            Hand::StraightFlush => "sf",
            Hand::FivePairs => "5",
            Hand::RoyalFlush => "r",
            Hand::RoyalJelly => "rj",
        }
    }

    /// The label recorded in the `Hand` column of the summary file.
    pub fn label(&self) -> &'static str {
        match self {
            Hand::TwoPairs => "Two pairs",
            Hand::Triple => "Triple",
            Hand::Straight => "Straight",
            Hand::Flush => "Flush (Color)",
            Hand::FullHouse => "Full House",
            Hand::FourPairs => "Four pairs",
            Hand::StraightFlush => "Straight Flush",
            Hand::FivePairs => "5 pairs",
            Hand::RoyalFlush => "Royal Flush",
            Hand::RoyalJelly => "Royal Jelly",
        }
    }

    pub fn multiplier(&self) -> u32 {
        match self {
            Hand::TwoPairs => 1,
            Hand::Triple => 1,
            Hand::Straight => 3,
            Hand::Flush => 4,
            Hand::FullHouse => 5,
            Hand::FourPairs => 10,
            Hand::StraightFlush => 20,
            Hand::FivePairs => 50,
            Hand::RoyalFlush => 100,
            Hand::RoyalJelly => 500,
        }
    }
}

/// [Outcome] is what a single round produced: a paying [Hand], or the
/// reserved first-hand-lost case which forfeits the stake outright.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    Hand(Hand),
    FirstHandLost,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Hand(hand) => hand.label(),
            Outcome::FirstHandLost => "First hand lost",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipliers() {
        assert_eq!(Hand::TwoPairs.multiplier(), 1);
        assert_eq!(Hand::Triple.multiplier(), 1);
        assert_eq!(Hand::Straight.multiplier(), 3);
        assert_eq!(Hand::Flush.multiplier(), 4);
        assert_eq!(Hand::FullHouse.multiplier(), 5);
        assert_eq!(Hand::FourPairs.multiplier(), 10);
        assert_eq!(Hand::StraightFlush.multiplier(), 20);
        assert_eq!(Hand::FivePairs.multiplier(), 50);
        assert_eq!(Hand::RoyalFlush.multiplier(), 100);
        assert_eq!(Hand::RoyalJelly.multiplier(), 500);
    }

    #[test]
    fn test_token_round_trip() {
        for hand in Hand::ALL {
            assert_eq!(Hand::from_token(hand.token()), Some(hand));
        }
    }

    #[test]
    fn test_from_token_is_case_insensitive() {
        assert_eq!(Hand::from_token("FH"), Some(Hand::FullHouse));
        assert_eq!(Hand::from_token("Rj"), Some(Hand::RoyalJelly));
        assert_eq!(Hand::from_token("S"), Some(Hand::Straight));
    }

    #[test]
    fn test_unknown_tokens_are_rejected() {
        assert_eq!(Hand::from_token("x"), None);
        assert_eq!(Hand::from_token("0"), None);
        assert_eq!(Hand::from_token(""), None);
        assert_eq!(Hand::from_token("royal"), None);
    }

    #[test]
    fn test_labels_match_summary_columns() {
        assert_eq!(Hand::Flush.label(), "Flush (Color)");
        assert_eq!(Hand::FivePairs.label(), "5 pairs");
        assert_eq!(Outcome::Hand(Hand::RoyalJelly).label(), "Royal Jelly");
        assert_eq!(Outcome::FirstHandLost.label(), "First hand lost");
    }
}
