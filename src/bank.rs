//! Register bank abstraction
//!
//! Panel logic talks to registers through [`RegisterBank`], so the same code
//! drives the real `/dev/mem` window ([`crate::devmem::DevMem`]) or an
//! in-memory [`MemBank`] when running off-target.

use parking_lot::Mutex;

/// 32-bit register window addressed by byte offset
///
/// Offsets must be word-aligned and the whole word must lie inside the bank;
/// anything else is refused without touching memory.
pub trait RegisterBank {
    /// Read a 32-bit word at byte offset, `None` if misaligned or outside the bank
    fn read32(&self, offset: usize) -> Option<u32>;

    /// Write a 32-bit word at byte offset, `false` if misaligned or outside the bank
    fn write32(&self, offset: usize, value: u32) -> bool;

    /// Size of the bank in bytes
    fn size(&self) -> usize;
}

/// True if a word at `offset` is aligned and fits in `size` bytes
pub(crate) fn word_in_bounds(offset: usize, size: usize) -> bool {
    offset % 4 == 0 && offset.checked_add(4).map_or(false, |end| end <= size)
}

struct MemState {
    words: Vec<u32>,
    writes: Vec<(usize, u32)>,
    reads: usize,
}

/// Zero-initialised register bank backed by ordinary memory
///
/// Records every write in order and counts reads, which makes it useful for
/// checking exactly what the panel logic did to the hardware.
pub struct MemBank {
    size: usize,
    state: Mutex<MemState>,
}

impl MemBank {
    /// Create a bank of `size` bytes (rounded down to whole words)
    pub fn new(size: usize) -> Self {
        let size = size & !3;
        Self {
            size,
            state: Mutex::new(MemState {
                words: vec![0; size / 4],
                writes: Vec::new(),
                reads: 0,
            }),
        }
    }

    /// Set a register as the hardware would, without logging a write
    pub fn poke(&self, offset: usize, value: u32) -> bool {
        let Some(index) = self.index(offset) else {
            return false;
        };
        self.state.lock().words[index] = value;
        true
    }

    /// Current register value, without counting as a read
    pub fn peek(&self, offset: usize) -> Option<u32> {
        let index = self.index(offset)?;
        Some(self.state.lock().words[index])
    }

    /// Writes performed through [`RegisterBank::write32`], oldest first
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.lock().writes.clone()
    }

    /// Number of reads performed through [`RegisterBank::read32`]
    pub fn reads(&self) -> usize {
        self.state.lock().reads
    }

    fn index(&self, offset: usize) -> Option<usize> {
        if !word_in_bounds(offset, self.size) {
            return None;
        }
        Some(offset / 4)
    }
}

impl RegisterBank for MemBank {
    fn read32(&self, offset: usize) -> Option<u32> {
        let index = self.index(offset)?;
        let mut state = self.state.lock();
        state.reads += 1;
        Some(state.words[index])
    }

    fn write32(&self, offset: usize, value: u32) -> bool {
        let Some(index) = self.index(offset) else {
            return false;
        };
        let mut state = self.state.lock();
        state.words[index] = value;
        state.writes.push((offset, value));
        true
    }

    fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_access_has_no_effect() {
        let bank = MemBank::new(0x10);
        assert_eq!(bank.read32(0x10), None);
        assert!(!bank.write32(0x0E, 1));
        assert!(!bank.write32(0x02, 1));
        assert!(bank.writes().is_empty());
        assert_eq!(bank.reads(), 0);
    }

    #[test]
    fn offsets_near_usize_max_do_not_wrap() {
        let bank = MemBank::new(0x10);
        assert_eq!(bank.read32(usize::MAX - 3), None);
        assert!(!bank.write32(usize::MAX - 3, 1));
        assert!(!bank.poke(usize::MAX, 1));
        assert_eq!(bank.peek(usize::MAX - 3), None);
    }

    #[test]
    fn word_bounds() {
        assert!(word_in_bounds(0, 4));
        assert!(word_in_bounds(0xC, 0x10));
        assert!(!word_in_bounds(0x10, 0x10));
        assert!(!word_in_bounds(1, 0x10));
        assert!(!word_in_bounds(usize::MAX - 3, 0x10));
    }

    #[test]
    fn poke_is_not_logged() {
        let bank = MemBank::new(0x10);
        assert!(bank.poke(0x04, 0xFE));
        assert!(bank.writes().is_empty());
        assert_eq!(bank.read32(0x04), Some(0xFE));
        assert_eq!(bank.reads(), 1);
    }

    #[test]
    fn writes_are_logged_in_order() {
        let bank = MemBank::new(0x10);
        bank.write32(0x08, 1);
        bank.write32(0x00, 2);
        assert_eq!(bank.writes(), vec![(0x08, 1), (0x00, 2)]);
        assert_eq!(bank.peek(0x08), Some(1));
    }
}
