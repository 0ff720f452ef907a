use itertools::Itertools;

use crate::buckets::{buckets, buckets_eq};
use crate::factor::Factor;

/// Brute-force search over every permutation of `0..n`. Accepts the first
/// `π` (in `itertools`' fixed enumeration order) for which applying it to
/// `f1` reproduces `f2`'s table exactly. On success, `f1` is mutated in
/// place so that its argument order and table agree with `f2`; `f1` is left
/// untouched on failure.
///
/// `O(n! · 2^n)`; only scales to `n` around 8-10. This is the ground truth
/// the filter and DEFT algorithms are checked against.
pub fn permute_args(f1: &mut Factor, f2: &Factor) -> bool {
    debug_assert_eq!(f1.arity(), f2.arity());
    let n = f1.arity();
    let assignments = f2.assignments_in_order();

    for perm in (0..n).permutations(n) {
        if accepts(f1, f2, &assignments, &perm) {
            // `accepts` verifies f2(c) == f1(permuted_of(c, perm)) for all
            // c, i.e. f1 composed with `perm` equals f2. `permute_in_place`
            // instead rewrites its receiver by the *inverse* of the array
            // it's given (new_key[i] = old_key[p[i]] means the new table,
            // read as a function of its own keys, is old table composed
            // with p's inverse). So reproducing f2 in f1 requires applying
            // `perm`'s inverse, not `perm` itself.
            f1.permute_in_place(&invert(&perm));
            return true;
        }
    }
    false
}

fn accepts(f1: &Factor, f2: &Factor, assignments: &[Vec<bool>], perm: &[usize]) -> bool {
    assignments.iter().all(|c| {
        let permuted: Vec<bool> = perm.iter().map(|&p| c[p]).collect();
        let lhs = f2.potential(c);
        let rhs = f1.potential(&permuted);
        lhs.to_bits() == rhs.to_bits()
    })
}

fn invert(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0usize; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inverse[p] = i;
    }
    inverse
}

/// Arity mismatch rejects immediately; otherwise deep-copies both factors
/// and hands them to the brute-force oracle.
pub fn is_exchangeable_naive(f1: &Factor, f2: &Factor) -> bool {
    if f1.arity() != f2.arity() {
        return false;
    }
    let mut c1 = f1.deep_copy();
    let c2 = f2.deep_copy();
    permute_args(&mut c1, &c2)
}

/// Arity mismatch or bucket-multiset mismatch rejects immediately;
/// otherwise falls through to the same brute-force oracle as
/// [`is_exchangeable_naive`]. The bucket check is a necessary but not
/// sufficient condition for exchangeability, so it can only prune, never
/// wrongly accept.
pub fn is_exchangeable_filter(f1: &Factor, f2: &Factor) -> bool {
    if f1.arity() != f2.arity() {
        return false;
    }
    if !buckets_eq(&buckets(f1), &buckets(f2)) {
        return false;
    }
    let mut c1 = f1.deep_copy();
    let c2 = f2.deep_copy();
    permute_args(&mut c1, &c2)
}
