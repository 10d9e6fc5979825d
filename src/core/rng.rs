//! RNG module - seeded randomness and the session ball sequence
//!
//! `SimpleRng` is a small LCG used wherever the game needs randomness.
//! `BallSequence` builds the full multiset of colors for one playthrough
//! (three of each) and shuffles it once with Fisher-Yates. Unlike a bag
//! randomizer there is no refill: exhausting the sequence ends the game.

use crate::types::{BallColor, REPEATS_PER_COLOR};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Generate random value in range [lo, hi)
    pub fn next_in_range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.next_range(hi - lo)
    }

    /// Shuffle a slice in place using Fisher-Yates: each index swaps with a
    /// uniformly chosen partner at or after it, so every permutation of the
    /// slice is equally likely.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in 0..len {
            let j = self.next_in_range(i as u32, len as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Get the current RNG state (for restarting a game with the same sequence)
    pub fn seed(&self) -> u32 {
        self.state
    }
}

/// The finite, pre-shuffled color queue for one playthrough.
/// Consumed front to back; never restarted or refilled.
#[derive(Debug, Clone)]
pub struct BallSequence {
    colors: Vec<BallColor>,
    index: usize,
}

impl BallSequence {
    /// Build `color_count * repeats_per_color` balls from the first
    /// `color_count` colors and shuffle them in place.
    pub fn generate(rng: &mut SimpleRng, color_count: usize, repeats_per_color: usize) -> Self {
        let palette = &BallColor::ALL[..color_count];
        let mut colors = Vec::with_capacity(color_count * repeats_per_color);
        for _ in 0..repeats_per_color {
            colors.extend_from_slice(palette);
        }
        rng.shuffle(&mut colors);
        Self { colors, index: 0 }
    }

    /// Standard session sequence: three balls of each of the three colors.
    pub fn standard(rng: &mut SimpleRng) -> Self {
        Self::generate(rng, BallColor::ALL.len(), REPEATS_PER_COLOR)
    }

    /// Fixed, unshuffled sequence; used by scripted sessions.
    pub fn from_colors(colors: Vec<BallColor>) -> Self {
        Self { colors, index: 0 }
    }

    /// Consume and return the next color, or `None` once exhausted.
    pub fn draw(&mut self) -> Option<BallColor> {
        let color = self.colors.get(self.index).copied();
        if color.is_some() {
            self.index += 1;
        }
        color
    }

    /// Peek at the next color without consuming it
    pub fn peek(&self) -> Option<BallColor> {
        self.colors.get(self.index).copied()
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.colors.len()
    }

    /// Total sequence length
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colors not yet drawn
    pub fn remaining(&self) -> usize {
        self.colors.len() - self.index
    }
}
