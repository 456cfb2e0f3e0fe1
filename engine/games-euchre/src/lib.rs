//! Euchre trick-taking reference game for the ISMCTS engine
//!
//! A hidden-information collaborator: each seat only sees its own hand, so
//! the search resamples the other hands before every playout.
//!
//! # Rules
//!
//! - 24 cards (nine to ace in four suits), four seats, five cards each.
//!   Seats 0 and 2 form team 0, seats 1 and 3 team 1.
//! - A face-up card names trump. The jack of trump (right bower) is the
//!   highest card, followed by the other jack of the same colour (left
//!   bower), which counts as trump.
//! - Players must follow the led suit when they can. A player who does not
//!   follow is known to be void in that suit for the rest of the hand.
//! - The highest trump takes the trick, else the highest card of the led
//!   suit. The trick winner leads next.
//! - After five tricks the team that took more wins.
//!
//! Statistics are kept per team, so `Player` is the team index.

use std::collections::HashMap;

use engine_core::{Capabilities, Game, GameError, Moves, Outcome};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

pub mod cards;

pub use cards::{
    deck, parse_cards, playable_cards, winning_card, Card, ParseCardError, Rank, Suit,
};

/// Cards dealt to each seat
pub const HAND_SIZE: usize = 5;
pub const SEATS: usize = 4;

/// Team a seat plays for.
#[inline]
pub fn team(seat: u8) -> u8 {
    seat % 2
}

/// Position of one hand of euchre.
///
/// Hands that are not known are empty; `Game::determine` fills them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EuchreState {
    hands: [Vec<Card>; SEATS],
    /// Cards played to the current trick, by seat
    trick: [Option<Card>; SEATS],
    /// Seat that led the current trick
    leader: u8,
    /// Seat to play
    current: u8,
    trump: Suit,
    trump_card: Card,
    /// Face-up trump card followed by every card played so far
    seen: Vec<Card>,
    tricks_won: [u8; 2],
    /// Suits each seat has shown out of, as bit sets
    voids: [u8; SEATS],
}

impl EuchreState {
    /// Shuffle and deal a complete, fully known hand. Seat 0 leads.
    pub fn deal(rng: &mut ChaCha20Rng) -> Self {
        let mut cards = deck();
        cards.shuffle(rng);
        let trump_card = cards[SEATS * HAND_SIZE];
        let mut hands: [Vec<Card>; SEATS] = Default::default();
        for (seat, hand) in hands.iter_mut().enumerate() {
            *hand = cards[seat * HAND_SIZE..(seat + 1) * HAND_SIZE].to_vec();
        }
        Self::with_hands(hands, trump_card)
    }

    /// Start a hand where only seat 0's cards are known.
    pub fn from_visible_hand(hand: &[Card], trump_card: Card) -> Result<Self, GameError> {
        if hand.len() != HAND_SIZE {
            return Err(GameError::InvalidSetup(format!(
                "visible hand should have {HAND_SIZE} cards, got {}",
                hand.len()
            )));
        }
        for (i, card) in hand.iter().enumerate() {
            if *card == trump_card || hand[..i].contains(card) {
                return Err(GameError::InvalidSetup(format!("card {card} dealt twice")));
            }
        }
        let mut hands: [Vec<Card>; SEATS] = Default::default();
        hands[0] = hand.to_vec();
        Ok(Self::with_hands(hands, trump_card))
    }

    fn with_hands(hands: [Vec<Card>; SEATS], trump_card: Card) -> Self {
        Self {
            hands,
            trick: [None; SEATS],
            leader: 0,
            current: 0,
            trump: trump_card.suit,
            trump_card,
            seen: vec![trump_card],
            tricks_won: [0, 0],
            voids: [0; SEATS],
        }
    }

    pub fn hand(&self, seat: u8) -> &[Card] {
        &self.hands[seat as usize]
    }

    pub fn trump(&self) -> Suit {
        self.trump
    }

    pub fn trump_card(&self) -> Card {
        self.trump_card
    }

    /// Seat to play.
    pub fn current_seat(&self) -> u8 {
        self.current
    }

    /// Cards no longer in anyone's hand: the trump card and all played cards.
    pub fn seen(&self) -> &[Card] {
        &self.seen
    }

    pub fn tricks_won(&self, team: u8) -> u8 {
        self.tricks_won[team as usize]
    }

    pub fn completed_tricks(&self) -> u8 {
        self.tricks_won[0] + self.tricks_won[1]
    }

    pub fn is_over(&self) -> bool {
        self.completed_tricks() as usize == HAND_SIZE
    }

    /// Suit led to the current trick, if anyone has played to it.
    pub fn lead_suit(&self) -> Option<Suit> {
        self.trick[self.leader as usize].map(|card| card.effective_suit(self.trump))
    }

    /// Whether `seat` has shown out of `suit`.
    pub fn is_void(&self, seat: u8, suit: Suit) -> bool {
        self.voids[seat as usize] & suit.bit() != 0
    }

    /// Cards `seat` must be holding at this point of the hand.
    pub fn required_hand_size(&self, seat: u8) -> usize {
        let played_this_trick = usize::from(self.trick[seat as usize].is_some());
        HAND_SIZE - self.completed_tricks() as usize - played_this_trick
    }

    /// Cards not seen and not in a known hand.
    fn unseen_cards(&self) -> Vec<Card> {
        deck()
            .into_iter()
            .filter(|card| !self.seen.contains(card))
            .filter(|card| !self.hands.iter().any(|hand| hand.contains(card)))
            .collect()
    }

    fn play(&self, card: Card) -> Result<Self, GameError> {
        let seat = self.current as usize;
        let hand = &self.hands[seat];
        if self.is_over() || !hand.contains(&card) {
            return Err(GameError::IllegalMove(format!("seat {seat} does not hold {card}")));
        }
        let lead = self.lead_suit();
        if !playable_cards(self.trump, lead, hand).contains(&card) {
            return Err(GameError::IllegalMove(format!(
                "seat {seat} must follow {} and cannot play {card}",
                lead.map(|suit| suit.to_string()).unwrap_or_default()
            )));
        }

        let mut next = self.clone();
        next.hands[seat].retain(|held| *held != card);
        next.trick[seat] = Some(card);
        next.seen.push(card);
        if let Some(lead) = lead {
            if card.effective_suit(self.trump) != lead {
                next.voids[seat] |= lead.bit();
            }
        }

        if next.trick.iter().all(Option::is_some) {
            next.finish_trick();
        } else {
            next.current = (self.current + 1) % SEATS as u8;
        }
        Ok(next)
    }

    fn finish_trick(&mut self) {
        // Play order starting with the leader
        let order: Vec<u8> = (0..SEATS as u8)
            .map(|offset| (self.leader + offset) % SEATS as u8)
            .collect();
        let cards: Vec<Card> = order
            .iter()
            .filter_map(|&seat| self.trick[seat as usize])
            .collect();

        let winner = self
            .lead_suit()
            .and_then(|lead| winning_card(self.trump, lead, &cards))
            .map(|index| order[index]);
        if let Some(winner) = winner {
            self.tricks_won[team(winner) as usize] += 1;
            self.leader = winner;
            self.current = winner;
        }
        self.trick = [None; SEATS];
    }
}

/// Per-team trick statistics gathered over playouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrickStats {
    pub playouts: u32,
    pub total_tricks: u32,
    pub best: u8,
}

impl TrickStats {
    pub fn record(&mut self, tricks: u8) {
        self.playouts += 1;
        self.total_tricks += tricks as u32;
        self.best = self.best.max(tricks);
    }

    /// Mean tricks per playout (0.0 before any playout).
    pub fn mean(&self) -> f64 {
        if self.playouts == 0 {
            0.0
        } else {
            self.total_tricks as f64 / self.playouts as f64
        }
    }
}

/// Euchre game implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct Euchre;

impl Game for Euchre {
    type State = EuchreState;
    type Move = Card;
    type Player = u8;
    type Misc = TrickStats;

    fn name(&self) -> &'static str {
        "euchre"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::perfect_information()
            .with_determinization()
            .with_misc_tracking()
    }

    fn initial_state(&self, rng: &mut ChaCha20Rng) -> EuchreState {
        EuchreState::deal(rng)
    }

    fn moves(&self, state: &EuchreState) -> Result<Moves<Card>, GameError> {
        if state.is_over() {
            return Ok(Moves::none());
        }
        let hand = state.hand(state.current);
        if hand.is_empty() {
            return Err(GameError::InvalidSetup(format!(
                "hand of seat {} is unknown",
                state.current
            )));
        }
        Ok(Moves::decision(playable_cards(
            state.trump,
            state.lead_suit(),
            hand,
        )))
    }

    fn apply_move(&self, state: &EuchreState, mv: &Card) -> Result<EuchreState, GameError> {
        state.play(*mv)
    }

    fn outcome(&self, state: &EuchreState) -> Outcome<u8> {
        if !state.is_over() {
            Outcome::Ongoing
        } else if state.tricks_won[0] > state.tricks_won[1] {
            Outcome::Win(0)
        } else {
            Outcome::Win(1)
        }
    }

    fn current_player(&self, state: &EuchreState) -> u8 {
        team(state.current)
    }

    /// Deal the unseen cards to every hand short of its size. Seats that have
    /// shown out of suits are dealt first, and never receive those suits.
    fn determine(
        &self,
        state: &EuchreState,
        rng: &mut ChaCha20Rng,
    ) -> Result<EuchreState, GameError> {
        let mut pool = state.unseen_cards();
        pool.shuffle(rng);

        let mut seats: Vec<u8> = (0..SEATS as u8).collect();
        seats.sort_by_key(|&seat| std::cmp::Reverse(state.voids[seat as usize].count_ones()));

        let mut next = state.clone();
        for seat in seats {
            let required = state.required_hand_size(seat);
            let held = state.hands[seat as usize].len();
            if held > required {
                return Err(GameError::InvalidSetup(format!(
                    "seat {seat} holds {held} cards but should hold {required}"
                )));
            }
            for _ in held..required {
                let index = pool
                    .iter()
                    .position(|card| !state.is_void(seat, card.effective_suit(state.trump)))
                    .ok_or_else(|| {
                        GameError::ImpossibleDeterminization(format!(
                            "no unseen card left that seat {seat} can hold"
                        ))
                    })?;
                next.hands[seat as usize].push(pool.swap_remove(index));
            }
        }
        Ok(next)
    }

    fn update_misc(&self, state: &EuchreState, misc_by_player: &mut HashMap<u8, TrickStats>) {
        for team in 0..2u8 {
            misc_by_player
                .entry(team)
                .or_default()
                .record(state.tricks_won(team));
        }
    }

    /// Only the seat to play sees its own cards.
    fn redact(&self, state: &EuchreState) -> EuchreState {
        let mut view = state.clone();
        for (seat, hand) in view.hands.iter_mut().enumerate() {
            if seat != state.current as usize {
                hand.clear();
            }
        }
        view
    }
}
