//! Synchronization token pool.
//!
//! Each token is either free or owned by the dependency sets of one
//! out-of-order producer. Allocation prefers the lowest free token; when the
//! pool is exhausted the analyzer reclaims the token held longest, which
//! it must first wait on.

use std::collections::VecDeque;

use crate::common::{DepId, TokenId};

/// State of one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TokenState {
    /// Not held by any producer.
    #[default]
    Free,
    /// Held by an out-of-order producer's read and write sets.
    Assigned {
        /// Source footprint, cleared by a `.src` wait.
        input: Option<DepId>,
        /// Destination footprint.
        output: Option<DepId>,
    },
}

/// Fixed-size token pool.
#[derive(Clone, Debug)]
pub struct TokenPool {
    slots: Vec<TokenState>,
    /// Assigned tokens, oldest first.
    age: VecDeque<TokenId>,
}

impl TokenPool {
    /// Creates a pool of `count` free tokens.
    pub fn new(count: u32) -> Self {
        Self {
            slots: vec![TokenState::Free; count as usize],
            age: VecDeque::with_capacity(count as usize),
        }
    }

    /// Number of tokens in the pool.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// State of one token.
    pub fn state(&self, token: TokenId) -> TokenState {
        self.slots.get(token.index()).copied().unwrap_or_default()
    }

    /// Lowest-numbered free token.
    pub fn find_free(&self) -> Option<TokenId> {
        self.slots
            .iter()
            .position(|s| *s == TokenState::Free)
            .map(|i| TokenId(i as u8))
    }

    /// The token assigned longest ago.
    pub fn oldest_assigned(&self) -> Option<TokenId> {
        self.age.front().copied()
    }

    /// Hands `token` to a producer. Any previous owner must have been released.
    pub fn assign(&mut self, token: TokenId, input: Option<DepId>, output: Option<DepId>) {
        self.slots[token.index()] = TokenState::Assigned { input, output };
        self.age.push_back(token);
    }

    /// Frees `token`, returning the sets it carried, or `None` if it was free.
    pub fn release(&mut self, token: TokenId) -> Option<(Option<DepId>, Option<DepId>)> {
        let slot = self.slots.get_mut(token.index())?;
        match std::mem::take(slot) {
            TokenState::Free => None,
            TokenState::Assigned { input, output } => {
                self.age.retain(|&t| t != token);
                Some((input, output))
            }
        }
    }

    /// Detaches the source set of `token` after a `.src` wait; the token stays assigned.
    pub fn clear_input(&mut self, token: TokenId) -> Option<DepId> {
        match self.slots.get_mut(token.index()) {
            Some(TokenState::Assigned { input, .. }) => input.take(),
            _ => None,
        }
    }

    /// Number of tokens currently held.
    pub fn assigned_count(&self) -> usize {
        self.age.len()
    }

    /// Frees every token.
    pub fn reset(&mut self) {
        self.slots.fill(TokenState::Free);
        self.age.clear();
    }
}
