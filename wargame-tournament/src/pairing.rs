//! Pairing engine - random opponents every round
//!
//! Level 3 - Step-level implementation
//!
//! Pairings refer to agent seats (positions in the expanded agent list),
//! never to factions, so two agents of the same faction may meet.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::PairingScheme;

/// One encounter in a round, by seat
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub player: usize,
    pub opponent: usize,
}

impl Pairing {
    pub fn new(player: usize, opponent: usize) -> Self {
        Self { player, opponent }
    }

    /// Self-pairing: the seat sits the round out with zero payoff
    pub fn is_bye(&self) -> bool {
        self.player == self.opponent
    }
}

/// Draw this round's pairings for `agent_count` seats
///
/// Every call draws a fresh permutation; no state carries between rounds.
pub fn pair_agents<R: Rng + ?Sized>(
    agent_count: usize,
    scheme: PairingScheme,
    rng: &mut R,
) -> Vec<Pairing> {
    match scheme {
        PairingScheme::Matching => random_matching(agent_count, rng),
        PairingScheme::Permutation => derangement_pairs(agent_count, rng),
    }
}

/// Shuffle seats and pair neighbours; an odd seat out gets a bye
fn random_matching<R: Rng + ?Sized>(agent_count: usize, rng: &mut R) -> Vec<Pairing> {
    let mut seats: Vec<usize> = (0..agent_count).collect();
    seats.shuffle(rng);

    seats
        .chunks(2)
        .map(|chunk| match *chunk {
            [player, opponent] => Pairing::new(player, opponent),
            [alone] => Pairing::new(alone, alone),
            _ => unreachable!("chunks(2) yields one or two seats"),
        })
        .collect()
}

/// Zip seats against a uniform derangement of themselves
fn derangement_pairs<R: Rng + ?Sized>(agent_count: usize, rng: &mut R) -> Vec<Pairing> {
    match agent_count {
        0 => Vec::new(),
        // No derangement of one element exists
        1 => vec![Pairing::new(0, 0)],
        n => random_derangement(n, rng)
            .into_iter()
            .enumerate()
            .map(|(player, opponent)| Pairing::new(player, opponent))
            .collect(),
    }
}

/// Uniform derangement by rejection; about e draws on average
fn random_derangement<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    loop {
        perm.shuffle(rng);
        if perm.iter().enumerate().all(|(i, &p)| i != p) {
            return perm;
        }
    }
}
