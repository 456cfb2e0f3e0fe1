//! Cards, suits and trick ranking.
//!
//! Cards are written as a rank character followed by a suit character:
//! `a k q j 0 9` (the ten is `0`) and `d h s c`, e.g. `"jd"` or `"0s"`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid card: {0:?}")]
pub struct ParseCardError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Diamonds,
    Hearts,
    Spades,
    Clubs,
}

impl Suit {
    /// All suits in deal order
    pub const ALL: [Suit; 4] = [Suit::Diamonds, Suit::Hearts, Suit::Spades, Suit::Clubs];

    /// The other suit of the same colour; its jack is the left bower.
    pub fn same_colour(self) -> Suit {
        match self {
            Suit::Diamonds => Suit::Hearts,
            Suit::Hearts => Suit::Diamonds,
            Suit::Spades => Suit::Clubs,
            Suit::Clubs => Suit::Spades,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
            Suit::Clubs => 'c',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Suit> {
        Suit::ALL.into_iter().find(|suit| suit.symbol() == symbol)
    }

    #[inline]
    pub(crate) fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Ace,
    King,
    Queen,
    Jack,
    Ten,
    Nine,
}

impl Rank {
    /// All ranks in deal order
    pub const ALL: [Rank; 6] = [
        Rank::Ace,
        Rank::King,
        Rank::Queen,
        Rank::Jack,
        Rank::Ten,
        Rank::Nine,
    ];

    /// Face value used to rank cards within a suit.
    pub fn value(self) -> u8 {
        match self {
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Rank::Ace => 'a',
            Rank::King => 'k',
            Rank::Queen => 'q',
            Rank::Jack => 'j',
            Rank::Ten => '0',
            Rank::Nine => '9',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Rank> {
        Rank::ALL.into_iter().find(|rank| rank.symbol() == symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Jack of trump, the highest card.
    pub fn is_right_bower(self, trump: Suit) -> bool {
        self.rank == Rank::Jack && self.suit == trump
    }

    /// Jack of the trump suit's colour, the second highest card.
    pub fn is_left_bower(self, trump: Suit) -> bool {
        self.rank == Rank::Jack && self.suit == trump.same_colour()
    }

    /// Suit the card belongs to for following and trumping. The left bower
    /// counts as trump.
    pub fn effective_suit(self, trump: Suit) -> Suit {
        if self.is_left_bower(trump) {
            trump
        } else {
            self.suit
        }
    }

    /// Ordering key within a trick; higher wins.
    fn strength(self, trump: Suit, lead: Suit) -> (bool, bool, bool, bool, u8) {
        let suit = self.effective_suit(trump);
        (
            self.is_right_bower(trump),
            self.is_left_bower(trump),
            suit == trump,
            suit == lead,
            self.rank.value(),
        )
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(rank), Some(suit), None) => {
                match (Rank::from_symbol(rank), Suit::from_symbol(suit)) {
                    (Some(rank), Some(suit)) => Ok(Card::new(rank, suit)),
                    _ => Err(ParseCardError(s.to_string())),
                }
            }
            _ => Err(ParseCardError(s.to_string())),
        }
    }
}

/// Parse whitespace separated cards, e.g. `"jd jh ad kd qd"`.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, ParseCardError> {
    s.split_whitespace().map(str::parse).collect()
}

/// The 24-card deck in deal order (suit by suit, ace down to nine).
pub fn deck() -> Vec<Card> {
    Suit::ALL
        .into_iter()
        .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
        .collect()
}

/// Index of the card that takes the trick.
pub fn winning_card(trump: Suit, lead: Suit, cards: &[Card]) -> Option<usize> {
    cards
        .iter()
        .enumerate()
        .max_by_key(|(_, card)| card.strength(trump, lead))
        .map(|(index, _)| index)
}

/// Cards in `hand` that may be played: those of the led suit if any, else all.
pub fn playable_cards(trump: Suit, lead: Option<Suit>, hand: &[Card]) -> Vec<Card> {
    if let Some(lead) = lead {
        let following: Vec<Card> = hand
            .iter()
            .copied()
            .filter(|card| card.effective_suit(trump) == lead)
            .collect();
        if !following.is_empty() {
            return following;
        }
    }
    hand.to_vec()
}
