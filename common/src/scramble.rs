use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::address::{Address, ADDRESS_LENGTH, TRYTE_ALPHABET};

/// Per-character noise magnitudes for the address reveal.
///
/// A magnitude of 0 shows the real character; anything above shows a
/// substitute glyph picked from the magnitude.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrambleBuffer {
    magnitudes: Vec<u8>,
}

impl ScrambleBuffer {
    /// A fully revealed buffer.
    pub fn zeroed() -> Self {
        Self {
            magnitudes: vec![0; ADDRESS_LENGTH],
        }
    }

    /// Fresh noise for a new reveal cycle, each entry uniform in `0..=255`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            magnitudes: (0..ADDRESS_LENGTH).map(|_| rng.gen::<u8>()).collect(),
        }
    }

    pub fn from_magnitudes(magnitudes: [u8; ADDRESS_LENGTH]) -> Self {
        Self {
            magnitudes: magnitudes.to_vec(),
        }
    }

    pub fn magnitudes(&self) -> &[u8] {
        &self.magnitudes
    }

    pub fn sum(&self) -> u32 {
        self.magnitudes.iter().map(|m| u32::from(*m)).sum()
    }

    pub fn is_settled(&self) -> bool {
        self.sum() == 0
    }

    /// Lower every magnitude by `step`, flooring at zero. Returns the new sum.
    pub fn decay(&mut self, step: u8) -> u32 {
        let mut sum = 0;
        for m in self.magnitudes.iter_mut() {
            *m = m.saturating_sub(step);
            sum += u32::from(*m);
        }
        sum
    }

    /// Overlay the noise onto `address`.
    pub fn render(&self, address: &Address) -> String {
        address
            .as_bytes()
            .iter()
            .zip(&self.magnitudes)
            .map(|(c, m)| if *m > 0 { glyph(*m) } else { *c as char })
            .collect()
    }
}

impl Default for ScrambleBuffer {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Substitute character shown for a non-zero magnitude.
pub fn glyph(magnitude: u8) -> char {
    TRYTE_ALPHABET[magnitude as usize % TRYTE_ALPHABET.len()] as char
}
