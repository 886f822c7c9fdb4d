//! Truth tables of Boolean functions.
//!
//! A function of `n` variables is stored as its `2^n` output bits, packed in `u64` words.
//! Bit `i` is the value of the function on the assignment encoded by `i`, variable 0
//! being the least significant bit of `i`. Functions of at most 6 variables fit in a
//! single word, where the unused high bits are always kept at zero.
//!
//! ```rust
//! use aigsynth::TruthTable;
//! let a = TruthTable::nth_var(2, 0);
//! let b = TruthTable::nth_var(2, 1);
//! assert_eq!((&a & &b).to_binary(), "1000");
//! assert_eq!((&a | &b).to_binary(), "1110");
//! assert_eq!((&a ^ &b).to_hex(), "6");
//! ```

pub mod esop;
pub mod isop;

use std::{
    cmp::Ordering,
    fmt,
    ops::{BitAnd, BitOr, BitXor, Not},
};

use rand::RngCore;
use thiserror::Error;

pub use esop::esop;
pub use isop::{Cube, isop};

/// Largest number of variables accepted by parsers and constructors.
pub const MAX_VARS: usize = 24;

/// Fails if the parameter `name` would make truth tables wider than [`MAX_VARS`].
pub(crate) fn check_width(name: &'static str, value: usize) -> crate::Result<()> {
    if value > MAX_VARS {
        return Err(crate::AigError::ParameterOutOfRange {
            name,
            value,
            max: MAX_VARS,
        });
    }
    Ok(())
}

/// Projection functions of the six variables that live inside a word.
const PROJECTIONS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// Error returned when building a truth table failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TruthTableError {
    /// The character is not a digit of the expected base.
    #[error("invalid digit '{0}'")]
    InvalidDigit(char),

    /// The string or word slice does not match the number of variables.
    #[error("expected a length of {expected}, found {found}")]
    InvalidLength { expected: usize, found: usize },

    /// The variable index is not below the number of variables.
    #[error("variable {var} is out of range for a function of {num_vars} variables")]
    VariableOutOfRange { var: usize, num_vars: usize },

    /// More variables than [`MAX_VARS`].
    #[error("{0} variables is more than the supported {MAX_VARS}")]
    TooManyVariables(usize),

    /// Both truth tables should have the same number of variables.
    #[error("expected {expected} variables, found {found}")]
    MismatchedVariables { expected: usize, found: usize },
}

type Result<T> = std::result::Result<T, TruthTableError>;

/// A truth table over `num_vars` variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    num_vars: usize,
    words: Vec<u64>,
}

const fn num_words(num_vars: usize) -> usize {
    if num_vars <= 6 { 1 } else { 1 << (num_vars - 6) }
}

const fn word_mask(num_vars: usize) -> u64 {
    if num_vars >= 6 {
        u64::MAX
    } else {
        (1u64 << (1 << num_vars)) - 1
    }
}

impl TruthTable {
    /// The constant false function of `num_vars` variables.
    ///
    /// Panics if `num_vars` is larger than [`MAX_VARS`].
    pub fn new(num_vars: usize) -> Self {
        assert!(num_vars <= MAX_VARS, "too many variables: {num_vars}");
        TruthTable {
            num_vars,
            words: vec![0; num_words(num_vars)],
        }
    }

    pub fn const0(num_vars: usize) -> Self {
        TruthTable::new(num_vars)
    }

    pub fn const1(num_vars: usize) -> Self {
        !TruthTable::new(num_vars)
    }

    /// Projection function of variable `var`.
    ///
    /// Panics if `var >= num_vars`.
    pub fn nth_var(num_vars: usize, var: usize) -> Self {
        assert!(var < num_vars, "variable {var} out of range for {num_vars} variables");
        let mut tt = TruthTable::new(num_vars);
        if var < 6 {
            tt.words.fill(PROJECTIONS[var]);
        } else {
            let period = 1 << (var - 6);
            for (i, word) in tt.words.iter_mut().enumerate() {
                if i & period != 0 {
                    *word = u64::MAX;
                }
            }
        }
        tt.normalize();
        tt
    }

    /// Builds the table by evaluating `f` on every assignment index.
    pub fn from_fn(num_vars: usize, f: impl Fn(usize) -> bool) -> Self {
        let mut tt = TruthTable::new(num_vars);
        for i in 0..tt.num_bits() {
            if f(i) {
                tt.set_bit(i);
            }
        }
        tt
    }

    /// Builds the table from raw words (kitty layout).
    pub fn from_words(num_vars: usize, words: Vec<u64>) -> Result<Self> {
        if num_vars > MAX_VARS {
            return Err(TruthTableError::TooManyVariables(num_vars));
        }
        if words.len() != num_words(num_vars) {
            return Err(TruthTableError::InvalidLength {
                expected: num_words(num_vars),
                found: words.len(),
            });
        }
        let mut tt = TruthTable { num_vars, words };
        tt.normalize();
        Ok(tt)
    }

    /// Single-word table of at most 6 variables.
    pub fn from_u64(num_vars: usize, word: u64) -> Self {
        assert!(num_vars <= 6, "a single word holds at most 6 variables");
        let mut tt = TruthTable {
            num_vars,
            words: vec![word],
        };
        tt.normalize();
        tt
    }

    /// Uniformly random function.
    pub fn random(num_vars: usize, rng: &mut impl RngCore) -> Self {
        let mut tt = TruthTable::new(num_vars);
        for word in tt.words.iter_mut() {
            *word = rng.next_u64();
        }
        tt.normalize();
        tt
    }

    /// Majority function: true iff more than half of the variables are true.
    ///
    /// For an even number of variables, ties are false.
    pub fn majority(num_vars: usize) -> Self {
        TruthTable::from_fn(num_vars, |i| i.count_ones() as usize * 2 > num_vars)
    }

    fn normalize(&mut self) {
        if self.num_vars < 6 {
            self.words[0] &= word_mask(self.num_vars);
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_bits(&self) -> usize {
        1 << self.num_vars
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// The first word, the whole table for at most 6 variables.
    pub fn as_u64(&self) -> u64 {
        self.words[0]
    }

    pub fn get_bit(&self, index: usize) -> bool {
        (self.words[index >> 6] >> (index & 63)) & 1 == 1
    }

    pub fn set_bit(&mut self, index: usize) {
        self.words[index >> 6] |= 1 << (index & 63);
    }

    pub fn clear_bit(&mut self, index: usize) {
        self.words[index >> 6] &= !(1 << (index & 63));
    }

    pub fn flip_bit(&mut self, index: usize) {
        self.words[index >> 6] ^= 1 << (index & 63);
    }

    pub fn assign_bit(&mut self, index: usize, value: bool) {
        if value {
            self.set_bit(index)
        } else {
            self.clear_bit(index)
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_const0(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_const1(&self) -> bool {
        let mask = word_mask(self.num_vars);
        self.words.iter().all(|&w| w == mask)
    }

    /// True iff `self` implies `other` (every minterm of `self` is one of `other`).
    pub fn implies(&self, other: &TruthTable) -> bool {
        assert_eq!(self.num_vars, other.num_vars, "variable count mismatch");
        self.words
            .iter()
            .zip(&other.words)
            .all(|(a, b)| a & !b == 0)
    }

    /// True iff `self` and `other` have no common minterm.
    pub fn is_disjoint(&self, other: &TruthTable) -> bool {
        assert_eq!(self.num_vars, other.num_vars, "variable count mismatch");
        self.words.iter().zip(&other.words).all(|(a, b)| a & b == 0)
    }

    /// Parses a binary string, most significant bit first. The length must be a power
    /// of two, which gives the number of variables.
    pub fn from_binary_str(s: &str) -> Result<Self> {
        let len = s.chars().count();
        if !len.is_power_of_two() {
            return Err(TruthTableError::InvalidLength {
                expected: len.next_power_of_two(),
                found: len,
            });
        }
        let num_vars = len.trailing_zeros() as usize;
        if num_vars > MAX_VARS {
            return Err(TruthTableError::TooManyVariables(num_vars));
        }
        let mut tt = TruthTable::new(num_vars);
        for (position, c) in s.chars().enumerate() {
            match c {
                '0' => (),
                '1' => tt.set_bit(len - 1 - position),
                _ => return Err(TruthTableError::InvalidDigit(c)),
            }
        }
        Ok(tt)
    }

    /// Binary string, most significant bit first.
    pub fn to_binary(&self) -> String {
        (0..self.num_bits())
            .rev()
            .map(|i| if self.get_bit(i) { '1' } else { '0' })
            .collect()
    }

    /// Number of hexadecimal digits used for `num_vars` variables.
    pub fn hex_len(num_vars: usize) -> usize {
        if num_vars < 2 { 1 } else { 1 << (num_vars - 2) }
    }

    /// Parses a hexadecimal string, most significant digit first.
    pub fn from_hex_str(num_vars: usize, s: &str) -> Result<Self> {
        if num_vars > MAX_VARS {
            return Err(TruthTableError::TooManyVariables(num_vars));
        }
        let expected = TruthTable::hex_len(num_vars);
        let len = s.chars().count();
        if len != expected {
            return Err(TruthTableError::InvalidLength { expected, found: len });
        }
        let mut tt = TruthTable::new(num_vars);
        for (position, c) in s.chars().enumerate() {
            let digit = c.to_digit(16).ok_or(TruthTableError::InvalidDigit(c))? as u64;
            let nibble = len - 1 - position;
            tt.words[nibble / 16] |= digit << ((nibble % 16) * 4);
        }
        let before = tt.words[0];
        tt.normalize();
        if before != tt.words[0] {
            // a digit used bits beyond the table
            return Err(TruthTableError::InvalidDigit(s.chars().next().unwrap_or('?')));
        }
        Ok(tt)
    }

    /// Lowercase hexadecimal string, most significant digit first.
    pub fn to_hex(&self) -> String {
        let len = TruthTable::hex_len(self.num_vars);
        (0..len)
            .rev()
            .map(|nibble| {
                let digit = (self.words[nibble / 16] >> ((nibble % 16) * 4)) & 0xF;
                char::from_digit(digit as u32, 16).unwrap_or('0')
            })
            .collect()
    }

    fn check_var(&self, var: usize) {
        assert!(
            var < self.num_vars,
            "variable {var} out of range for {} variables",
            self.num_vars
        );
    }

    /// Negative cofactor with respect to `var`, over the same variables.
    pub fn cofactor0(&self, var: usize) -> Self {
        self.check_var(var);
        let mut tt = self.clone();
        if var < 6 {
            let shift = 1 << var;
            for word in tt.words.iter_mut() {
                let low = *word & !PROJECTIONS[var];
                *word = low | (low << shift);
            }
        } else {
            let step = 1 << (var - 6);
            for block in tt.words.chunks_mut(2 * step) {
                let (low, high) = block.split_at_mut(step);
                high.copy_from_slice(low);
            }
        }
        tt.normalize();
        tt
    }

    /// Positive cofactor with respect to `var`, over the same variables.
    pub fn cofactor1(&self, var: usize) -> Self {
        self.check_var(var);
        let mut tt = self.clone();
        if var < 6 {
            let shift = 1 << var;
            for word in tt.words.iter_mut() {
                let high = *word & PROJECTIONS[var];
                *word = high | (high >> shift);
            }
        } else {
            let step = 1 << (var - 6);
            for block in tt.words.chunks_mut(2 * step) {
                let (low, high) = block.split_at_mut(step);
                low.copy_from_slice(high);
            }
        }
        tt.normalize();
        tt
    }

    /// True iff the function depends on `var`.
    pub fn has_var(&self, var: usize) -> bool {
        if var >= self.num_vars {
            return false;
        }
        if var < 6 {
            let shift = 1 << var;
            self.words
                .iter()
                .any(|&w| ((w >> shift) ^ w) & !PROJECTIONS[var] & word_mask(self.num_vars) != 0)
        } else {
            let step = 1 << (var - 6);
            self.words
                .chunks(2 * step)
                .any(|block| block[..step] != block[step..])
        }
    }

    /// Variables the function depends on, in increasing order.
    pub fn support(&self) -> Vec<usize> {
        (0..self.num_vars).filter(|&v| self.has_var(v)).collect()
    }

    /// Complements the variable `var`.
    pub fn flip_var(&self, var: usize) -> Self {
        self.check_var(var);
        let mut tt = self.clone();
        if var < 6 {
            let shift = 1 << var;
            for word in tt.words.iter_mut() {
                *word = ((*word & PROJECTIONS[var]) >> shift) | ((*word & !PROJECTIONS[var]) << shift);
            }
        } else {
            let step = 1 << (var - 6);
            for block in tt.words.chunks_mut(2 * step) {
                let (low, high) = block.split_at_mut(step);
                low.swap_with_slice(high);
            }
        }
        tt.normalize();
        tt
    }

    /// Exchanges variables `a` and `b`.
    pub fn swap_vars(&self, a: usize, b: usize) -> Self {
        self.check_var(a);
        self.check_var(b);
        if a == b {
            return self.clone();
        }
        TruthTable::from_fn(self.num_vars, |i| {
            let bit_a = (i >> a) & 1;
            let bit_b = (i >> b) & 1;
            let j = (i & !(1 << a) & !(1 << b)) | (bit_a << b) | (bit_b << a);
            self.get_bit(j)
        })
    }

    /// Same function over more variables (the new ones are ignored).
    pub fn extend_to(&self, num_vars: usize) -> Result<Self> {
        if num_vars > MAX_VARS {
            return Err(TruthTableError::TooManyVariables(num_vars));
        }
        if num_vars < self.num_vars {
            return Err(TruthTableError::MismatchedVariables {
                expected: self.num_vars,
                found: num_vars,
            });
        }
        let mut tt = TruthTable::new(num_vars);
        if self.num_vars >= 6 {
            for chunk in tt.words.chunks_mut(self.words.len()) {
                chunk.copy_from_slice(&self.words);
            }
        } else {
            // replicate the small table inside a word
            let mut word = self.words[0];
            let mut width = 1 << self.num_vars;
            while width < 64 {
                word |= word << width;
                width *= 2;
            }
            tt.words.fill(word);
            tt.normalize();
        }
        Ok(tt)
    }

    /// Same function over fewer variables, which fails if it depends on a dropped one.
    pub fn shrink_to(&self, num_vars: usize) -> Result<Self> {
        if num_vars > self.num_vars {
            return Err(TruthTableError::MismatchedVariables {
                expected: self.num_vars,
                found: num_vars,
            });
        }
        if let Some(var) = (num_vars..self.num_vars).find(|&v| self.has_var(v)) {
            return Err(TruthTableError::VariableOutOfRange { var, num_vars });
        }
        let mut tt = TruthTable::new(num_vars);
        let len = tt.words.len();
        tt.words.copy_from_slice(&self.words[..len]);
        tt.normalize();
        Ok(tt)
    }

    /// Shrinks the function to its support: variable `j` of the result is variable
    /// `support[j]` of `self`. Returns the result and the support.
    pub fn min_base(&self) -> (Self, Vec<usize>) {
        let support = self.support();
        if support.len() == self.num_vars {
            return (self.clone(), support);
        }
        let tt = TruthTable::from_fn(support.len(), |i| {
            let index = support
                .iter()
                .enumerate()
                .fold(0, |acc, (j, &var)| acc | (((i >> j) & 1) << var));
            self.get_bit(index)
        });
        (tt, support)
    }

    /// Re-expresses the function over new variables: variable `i` of `self` becomes
    /// variable `map[i]` of the result, which has `num_vars` variables.
    pub fn remap(&self, num_vars: usize, map: &[usize]) -> Self {
        debug_assert_eq!(map.len(), self.num_vars);
        TruthTable::from_fn(num_vars, |i| {
            let index = map
                .iter()
                .enumerate()
                .fold(0, |acc, (j, &var)| acc | (((i >> var) & 1) << j));
            self.get_bit(index)
        })
    }
}

impl PartialOrd for TruthTable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic order, starting from the most significant word.
impl Ord for TruthTable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.num_vars
            .cmp(&other.num_vars)
            .then_with(|| self.words.iter().rev().cmp(other.words.iter().rev()))
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Not for &TruthTable {
    type Output = TruthTable;

    fn not(self) -> TruthTable {
        let mut tt = self.clone();
        for word in tt.words.iter_mut() {
            *word = !*word;
        }
        tt.normalize();
        tt
    }
}

impl Not for TruthTable {
    type Output = TruthTable;

    fn not(self) -> TruthTable {
        !&self
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&TruthTable> for &TruthTable {
            type Output = TruthTable;

            fn $method(self, rhs: &TruthTable) -> TruthTable {
                assert_eq!(self.num_vars, rhs.num_vars, "variable count mismatch");
                TruthTable {
                    num_vars: self.num_vars,
                    words: self.words.iter().zip(&rhs.words).map(|(a, b)| a $op b).collect(),
                }
            }
        }

        impl $trait<TruthTable> for TruthTable {
            type Output = TruthTable;

            fn $method(self, rhs: TruthTable) -> TruthTable {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&TruthTable> for TruthTable {
            type Output = TruthTable;

            fn $method(self, rhs: &TruthTable) -> TruthTable {
                (&self).$method(rhs)
            }
        }
    };
}

impl_binary_op!(BitAnd, bitand, &);
impl_binary_op!(BitOr, bitor, |);
impl_binary_op!(BitXor, bitxor, ^);

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;
    use test_case::test_case;

    #[test]
    fn projections_test() {
        assert_eq!(TruthTable::nth_var(1, 0).to_binary(), "10");
        assert_eq!(TruthTable::nth_var(1, 0).to_hex(), "2");
        assert_eq!(TruthTable::nth_var(2, 1).to_binary(), "1100");
        assert_eq!(TruthTable::nth_var(3, 2).to_hex(), "f0");
        let x6 = TruthTable::nth_var(8, 6);
        assert_eq!(x6.words(), &[0, u64::MAX, 0, u64::MAX]);
        assert_eq!(TruthTable::nth_var(7, 0).words(), &[PROJECTIONS[0]; 2]);
    }

    #[test]
    fn gates_test() {
        let a = TruthTable::nth_var(2, 0);
        let b = TruthTable::nth_var(2, 1);
        assert_eq!((&a & &b).to_binary(), "1000");
        assert_eq!((&a | &b).to_binary(), "1110");
        assert_eq!((!&a).to_binary(), "0101");
        assert_eq!(TruthTable::majority(3).to_hex(), "e8");
        assert!(TruthTable::const1(2).is_const1());
        assert_eq!(TruthTable::const1(0).to_binary(), "1");
    }

    #[test_case(0, "0" ; "no variable")]
    #[test_case(2, "8" ; "two variables")]
    #[test_case(4, "e880" ; "four variables even")]
    #[test_case(5, "fee8e880" ; "five variables")]
    fn majority_test(num_vars: usize, hex: &str) {
        assert_eq!(TruthTable::majority(num_vars).to_hex(), hex);
    }

    #[test]
    fn bit_round_trip_test() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        for num_vars in [0, 3, 6, 8] {
            let tt = TruthTable::random(num_vars, &mut rng);
            let mut copy = TruthTable::new(num_vars);
            for i in 0..tt.num_bits() {
                copy.assign_bit(i, tt.get_bit(i));
            }
            assert_eq!(copy, tt);
            assert_eq!(TruthTable::from_binary_str(&tt.to_binary()).unwrap(), tt);
            assert_eq!(TruthTable::from_hex_str(num_vars, &tt.to_hex()).unwrap(), tt);
        }
    }

    #[test]
    fn parse_errors_test() {
        assert_eq!(
            TruthTable::from_binary_str("012"),
            Err(TruthTableError::InvalidLength { expected: 4, found: 3 })
        );
        assert_eq!(TruthTable::from_binary_str("0121"), Err(TruthTableError::InvalidDigit('2')));
        assert_eq!(TruthTable::from_hex_str(3, "g0"), Err(TruthTableError::InvalidDigit('g')));
        assert_eq!(
            TruthTable::from_hex_str(3, "f00"),
            Err(TruthTableError::InvalidLength { expected: 2, found: 3 })
        );
        assert!(TruthTable::from_hex_str(1, "7").is_err());
        assert_eq!(
            TruthTable::from_hex_str(30, "0"),
            Err(TruthTableError::TooManyVariables(30))
        );
    }

    #[test]
    fn bit_operations_test() {
        let mut tt = TruthTable::new(7);
        tt.set_bit(100);
        assert!(tt.get_bit(100));
        assert_eq!(tt.count_ones(), 1);
        tt.flip_bit(3);
        assert_eq!(tt.count_ones(), 2);
        tt.clear_bit(100);
        assert!(!tt.get_bit(100));
        assert!(!tt.is_const0());
    }

    #[test]
    fn ordering_test() {
        let a = TruthTable::from_hex_str(3, "0f").unwrap();
        let b = TruthTable::from_hex_str(3, "10").unwrap();
        assert!(a < b);
        let c = TruthTable::from_hex_str(7, "00000000000000010000000000000000").unwrap();
        let d = TruthTable::from_hex_str(7, "0000000000000000ffffffffffffffff").unwrap();
        assert!(c > d);
    }

    #[test]
    fn cofactors_test() {
        // f = x0 & x1 | x2
        let x: Vec<TruthTable> = (0..3).map(|i| TruthTable::nth_var(3, i)).collect();
        let f = (&x[0] & &x[1]) | &x[2];
        assert_eq!(f.cofactor0(2), &x[0] & &x[1]);
        assert!(f.cofactor1(2).is_const1());
        assert_eq!(f.cofactor1(0), &x[1] | &x[2]);
        assert_eq!(f.cofactor0(0), x[2]);

        let g = &TruthTable::nth_var(8, 7) ^ &TruthTable::nth_var(8, 0);
        assert_eq!(g.cofactor0(7), TruthTable::nth_var(8, 0));
        assert_eq!(g.cofactor1(7), !TruthTable::nth_var(8, 0));
    }

    #[test]
    fn support_test() {
        let f = &TruthTable::nth_var(8, 1) & &TruthTable::nth_var(8, 6);
        assert_eq!(f.support(), vec![1, 6]);
        assert!(!f.has_var(0));
        let (small, support) = f.min_base();
        assert_eq!(support, vec![1, 6]);
        assert_eq!(small.to_binary(), "1000");
    }

    #[test]
    fn swap_and_flip_test() {
        let f = &TruthTable::nth_var(3, 0) & &!TruthTable::nth_var(3, 2);
        let g = f.swap_vars(0, 2);
        assert_eq!(g, &TruthTable::nth_var(3, 2) & &!TruthTable::nth_var(3, 0));
        let h = f.flip_var(2);
        assert_eq!(h, &TruthTable::nth_var(3, 0) & &TruthTable::nth_var(3, 2));

        let f = TruthTable::nth_var(7, 6);
        assert_eq!(f.flip_var(6), !TruthTable::nth_var(7, 6));
    }

    #[test]
    fn extend_and_shrink_test() {
        let f = &TruthTable::nth_var(2, 0) ^ &TruthTable::nth_var(2, 1);
        let g = f.extend_to(7).unwrap();
        assert_eq!(g, &TruthTable::nth_var(7, 0) ^ &TruthTable::nth_var(7, 1));
        assert_eq!(g.shrink_to(2).unwrap(), f);
        assert_eq!(
            TruthTable::nth_var(3, 2).shrink_to(2),
            Err(TruthTableError::VariableOutOfRange { var: 2, num_vars: 2 })
        );
        assert!(g.extend_to(1).is_err());
    }

    #[test]
    fn remap_test() {
        let f = &TruthTable::nth_var(2, 0) & &!TruthTable::nth_var(2, 1);
        let g = f.remap(4, &[3, 1]);
        assert_eq!(g, &TruthTable::nth_var(4, 3) & &!TruthTable::nth_var(4, 1));
    }
}
