//! NPN canonization of functions of at most 4 inputs.
//!
//! Two functions are NPN-equivalent when one is obtained from the other by negating
//! inputs, permuting inputs and negating the output. The canonical representative of a
//! class is the smallest 16-bit table reachable through the 768 transforms.

use std::collections::HashMap;

/// A 4-input table: bit `m` is the value on minterm `m`, variable `i` is bit `i` of `m`.
pub type Tt16 = u16;

/// Projections of the 4 variables.
pub const VARS: [Tt16; 4] = [0xaaaa, 0xcccc, 0xf0f0, 0xff00];

/// An NPN transform.
///
/// Applied to `f`, the transform gives `g(y) = f(x) ^ output_neg` where
/// `x[perm[i]] = y[i] ^ input_negated(i)`. Implementing `f` from an implementation of
/// `g` therefore means feeding input `i` of `g` with leaf `perm[i]` complemented by
/// `input_negated(i)`, and complementing the output by `output_neg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NpnTransform {
    pub perm: [u8; 4],
    pub input_neg_mask: u8,
    pub output_neg: bool,
}

impl NpnTransform {
    pub const IDENTITY: NpnTransform = NpnTransform {
        perm: [0, 1, 2, 3],
        input_neg_mask: 0,
        output_neg: false,
    };

    pub fn input_negated(&self, i: usize) -> bool {
        (self.input_neg_mask >> i) & 1 == 1
    }
}

/// Applies `transform` to `tt`.
pub fn apply_transform(tt: Tt16, transform: &NpnTransform) -> Tt16 {
    let mut out = 0;
    for y in 0..16usize {
        let mut x = 0usize;
        for i in 0..4 {
            let bit = ((y >> i) & 1 == 1) ^ transform.input_negated(i);
            if bit {
                x |= 1 << transform.perm[i];
            }
        }
        if ((tt >> x) & 1 == 1) ^ transform.output_neg {
            out |= 1 << y;
        }
    }
    out
}

fn all_perms() -> Vec<[u8; 4]> {
    let mut perms = Vec::with_capacity(24);
    for a in 0..4u8 {
        for b in (0..4u8).filter(|&b| b != a) {
            for c in (0..4u8).filter(|&c| c != a && c != b) {
                perms.push([a, b, c, 6 - a - b - c]);
            }
        }
    }
    perms
}

/// Canonical representative of the class of `tt` and the transform that reaches it.
///
/// ```rust
/// use aigsynth::cut::npn::{apply_transform, canonize};
/// let (and2, _) = canonize(0x8888);
/// let (nor2, t) = canonize(0x1111);
/// assert_eq!(and2, nor2);
/// assert_eq!(apply_transform(0x1111, &t), nor2);
/// ```
pub fn canonize(tt: Tt16) -> (Tt16, NpnTransform) {
    let mut best = (tt, NpnTransform::IDENTITY);
    for perm in all_perms() {
        for input_neg_mask in 0..16u8 {
            for output_neg in [false, true] {
                let transform = NpnTransform {
                    perm,
                    input_neg_mask,
                    output_neg,
                };
                let candidate = apply_transform(tt, &transform);
                if candidate < best.0 {
                    best = (candidate, transform);
                }
            }
        }
    }
    best
}

/// Memoized [`canonize`].
#[derive(Debug, Clone, Default)]
pub struct NpnCache {
    classes: HashMap<Tt16, (Tt16, NpnTransform)>,
}

impl NpnCache {
    pub fn new() -> Self {
        NpnCache::default()
    }

    pub fn canonize(&mut self, tt: Tt16) -> (Tt16, NpnTransform) {
        *self.classes.entry(tt).or_insert_with(|| canonize(tt))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Widens a table over `num_vars <= 4` variables to 16 bits.
pub fn expand_to_tt16(word: u64, num_vars: usize) -> Tt16 {
    let bits = 1usize << num_vars;
    let mut tt = word & ((1u64 << bits) - 1);
    let mut width = bits;
    while width < 16 {
        tt |= tt << width;
        width *= 2;
    }
    tt as Tt16
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn all_perms_test() {
        let perms = all_perms();
        assert_eq!(perms.len(), 24);
        let unique: std::collections::HashSet<_> = perms.iter().collect();
        assert_eq!(unique.len(), 24);
    }

    #[test]
    fn identity_transform_test() {
        for tt in [0x0000, 0x8888, 0x6996, 0x1234, 0xfffe] {
            assert_eq!(apply_transform(tt, &NpnTransform::IDENTITY), tt);
        }
    }

    #[test]
    fn apply_transform_test() {
        // x0 becomes !y0
        let t = NpnTransform {
            perm: [0, 1, 2, 3],
            input_neg_mask: 1,
            output_neg: false,
        };
        assert_eq!(apply_transform(VARS[0], &t), !VARS[0]);
        // y0 = x1
        let t = NpnTransform {
            perm: [1, 0, 2, 3],
            input_neg_mask: 0,
            output_neg: false,
        };
        assert_eq!(apply_transform(VARS[0], &t), VARS[1]);
        assert_eq!(apply_transform(VARS[0] & VARS[2], &t), VARS[1] & VARS[2]);
    }

    #[test]
    fn canonize_classes_test() {
        let (and2, _) = canonize(VARS[0] & VARS[1]);
        for f in [
            VARS[0] & !VARS[1],
            !VARS[0] & VARS[3],
            VARS[2] | VARS[1],
            !(VARS[0] & VARS[1]),
        ] {
            assert_eq!(canonize(f).0, and2);
        }
        let (xor2, _) = canonize(VARS[0] ^ VARS[1]);
        assert_eq!(canonize(!(VARS[2] ^ VARS[3])).0, xor2);
        assert_ne!(xor2, and2);
        assert_eq!(canonize(0xffff).0, 0);
    }

    #[test]
    fn canonize_transform_reaches_representative_test() {
        for tt in [0x1ee1u16, 0x0f35, 0x7ffe, 0xe8e8, 0x0001] {
            let (canon, t) = canonize(tt);
            assert_eq!(apply_transform(tt, &t), canon);
            assert!(canon <= tt);
        }
    }

    #[test]
    fn cache_test() {
        let mut cache = NpnCache::new();
        assert!(cache.is_empty());
        let first = cache.canonize(0xe8e8);
        assert_eq!(cache.canonize(0xe8e8), first);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expand_to_tt16_test() {
        assert_eq!(expand_to_tt16(0b1000, 2), 0x8888);
        assert_eq!(expand_to_tt16(0b10, 1), 0xaaaa);
        assert_eq!(expand_to_tt16(1, 0), 0xffff);
        assert_eq!(expand_to_tt16(0xe8, 3), 0xe8e8);
        assert_eq!(expand_to_tt16(0x1234, 4), 0x1234);
    }
}
