//! A stack of booleans packed into machine words.

const BITS_IN_WORD: usize = u32::BITS as usize;

/// A stack of booleans, 32 to a word.
///
/// Text iterators keep one bit per tree level ("is everything below here
/// clipped away?"), so pushes and pops follow the traversal depth. The word
/// storage only ever grows.
#[derive(Debug, Clone, Default)]
pub struct BitStack {
    size: usize,
    words: Vec<u32>,
}

impl BitStack {
    /// Create an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        BitStack {
            size: 0,
            words: Vec::new(),
        }
    }

    /// Push `bit` on top of the stack.
    pub fn push(&mut self, bit: bool) {
        let index = self.size / BITS_IN_WORD;
        let mask = 1u32 << (self.size % BITS_IN_WORD);
        if index == self.words.len() {
            self.words.push(0);
        }
        if bit {
            self.words[index] |= mask;
        } else {
            self.words[index] &= !mask;
        }
        self.size += 1;
    }

    /// Remove the top bit. Popping an empty stack does nothing.
    pub fn pop(&mut self) {
        self.size = self.size.saturating_sub(1);
    }

    /// The top bit, or `false` when the stack is empty.
    #[must_use]
    pub fn top(&self) -> bool {
        let Some(last) = self.size.checked_sub(1) else {
            return false;
        };
        let mask = 1u32 << (last % BITS_IN_WORD);
        self.words[last / BITS_IN_WORD] & mask != 0
    }

    /// Number of bits on the stack.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn test_empty_stack() {
        let mut stack = BitStack::new();
        assert!(!stack.top());
        stack.pop();
        assert_eq!(stack.size(), 0);
        assert!(!stack.top());
    }

    #[test]
    fn test_push_pop_across_word_boundary() {
        let mut stack = BitStack::new();
        for i in 0..40 {
            stack.push(i % 3 == 0);
        }
        assert_eq!(stack.size(), 40);
        for i in (0..40).rev() {
            assert_eq!(stack.top(), i % 3 == 0, "bit {i}");
            stack.pop();
        }
        assert!(!stack.top());
    }

    #[test]
    fn test_reused_word_is_overwritten() {
        let mut stack = BitStack::new();
        stack.push(true);
        stack.pop();
        stack.push(false);
        assert!(!stack.top());
    }

    #[quickcheck]
    fn prop_behaves_like_vec(ops: Vec<Option<bool>>) -> bool {
        let mut stack = BitStack::new();
        let mut model: Vec<bool> = Vec::new();
        for op in ops {
            match op {
                Some(bit) => {
                    stack.push(bit);
                    model.push(bit);
                }
                None => {
                    stack.pop();
                    let _ = model.pop();
                }
            }
            if stack.top() != model.last().copied().unwrap_or(false) || stack.size() != model.len() {
                return false;
            }
        }
        true
    }
}
