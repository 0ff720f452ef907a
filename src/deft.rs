use std::collections::HashMap;

use log::{debug, trace};

use crate::buckets::{buckets_ordered, multiset_eq, Signature};
use crate::config::DEFAULT_CUTOFF;
use crate::factor::{Assignment, Factor};

/// An ordered, deduplicated set of candidate positions. Represented as a
/// `Vec` (not a `HashSet`) because the backtracking search iterates
/// candidates in insertion order, and that order is part of DEFT's
/// determinism contract (§5): two runs over identical inputs must explore
/// the same search tree.
type PositionSet = Vec<usize>;

fn full_position_set(n: usize) -> PositionSet {
    (0..n).collect()
}

/// Intersects `a` with `b` key-wise, driven entirely by `a`'s keys (every
/// key set in this module arises from positions `0..n`, so `a` and `b`
/// always share the same keys in practice). Preserves the relative order of
/// survivors within each `a[key]`. Returns `false` as soon as any entry
/// becomes empty.
fn intersect(a: &mut HashMap<usize, PositionSet>, b: &HashMap<usize, PositionSet>) -> bool {
    for (key, positions) in a.iter_mut() {
        let allowed = match b.get(key) {
            Some(allowed) => allowed,
            None => {
                debug_assert!(false, "intersect: key {} missing from right operand", key);
                positions.clear();
                continue;
            }
        };
        positions.retain(|p| allowed.contains(p));
        if positions.is_empty() {
            return false;
        }
    }
    true
}

/// Groups the indices of `row` by the value found at each index, preserving
/// ascending index order within each group.
fn value_positions(row: &[bool]) -> HashMap<bool, Vec<usize>> {
    let mut out: HashMap<bool, Vec<usize>> = HashMap::new();
    for (i, v) in row.iter().enumerate() {
        out.entry(*v).or_default().push(i);
    }
    out
}

/// Builds the per-bucket position-swap constraint for one signature's
/// entries in `F2`, intersected against the matching values found in `F1`'s
/// bucket for the same signature.
fn bucket_set_for_signature(
    n: usize,
    potentials1: &[f64],
    potentials2: &[f64],
    rows2: &[Assignment],
) -> HashMap<usize, PositionSet> {
    let homogeneous = potentials2
        .first()
        .map(|first| potentials2.iter().all(|v| v.to_bits() == first.to_bits()))
        .unwrap_or(true);

    if homogeneous {
        return (0..n).map(|i| (i, full_position_set(n))).collect();
    }

    let mut bucket_set: Option<HashMap<usize, PositionSet>> = None;

    for (index, value) in potentials2.iter().enumerate() {
        let row = &rows2[index];

        let candidate_indices: Vec<usize> = potentials1
            .iter()
            .enumerate()
            .filter(|(_, v)| v.to_bits() == value.to_bits())
            .map(|(k, _)| k)
            .collect();

        let mut item_set: HashMap<usize, PositionSet> = (0..n).map(|i| (i, Vec::new())).collect();
        for &k in &candidate_indices {
            // `rows2` is the canonical per-signature configuration slate
            // shared by both factors (the underlying assignment pattern at
            // a given bucket slot is identical for F1 and F2 — only the
            // recorded potential differs), so indexing it with `k`, an
            // index obtained from F1's bucket, is well-defined.
            let other_row = &rows2[k];
            let positions_by_value = value_positions(other_row);
            for (p, v) in row.iter().enumerate() {
                if let Some(positions) = positions_by_value.get(v) {
                    let entry = item_set.get_mut(&p).unwrap();
                    for &pos in positions {
                        if !entry.contains(&pos) {
                            entry.push(pos);
                        }
                    }
                }
            }
        }

        bucket_set = Some(match bucket_set {
            None => item_set,
            Some(mut existing) => {
                if !intersect(&mut existing, &item_set) {
                    return existing;
                }
                existing
            }
        });
    }

    bucket_set.unwrap_or_else(|| (0..n).map(|i| (i, full_position_set(n))).collect())
}

/// Builds the full permutation array from a leaf's swap rule: for each key
/// `p` mapped to `r[p]` in `curr`, sets `perm[r[p]] = p`. This exact
/// convention (not its inverse) is load-bearing — applying the inverse
/// produces false negatives even on genuinely valid permutations.
fn permutation_from_swap_rule(curr: &HashMap<usize, usize>, n: usize) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    for (&p, &rp) in curr.iter() {
        perm[rp] = p;
    }
    perm
}

fn is_swap_successful(f1: &Factor, f2_permuted: &Factor) -> bool {
    f1.assignments_in_order()
        .iter()
        .all(|c| f1.potential(c).to_bits() == f2_permuted.potential(c).to_bits())
}

/// Depth-first search over `factor_set`, choosing unassigned positions in
/// ascending order and rejecting candidates already used as a value in the
/// current partial assignment. At a leaf, the candidate permutation is
/// applied to a fresh copy of `f2` and re-verified against `f1`'s full
/// table — this final check is what makes the cutoff-pruned constraint
/// construction above sound regardless of how aggressively it prunes.
fn backtrack(
    factor_set: &HashMap<usize, PositionSet>,
    keys: &[usize],
    depth: usize,
    curr: &mut HashMap<usize, usize>,
    used: &mut Vec<bool>,
    f1: &Factor,
    f2: &Factor,
    n: usize,
) -> bool {
    if depth == keys.len() {
        let perm = permutation_from_swap_rule(curr, n);
        let mut candidate = f2.deep_copy();
        candidate.permute_in_place(&perm);
        return is_swap_successful(f1, &candidate);
    }

    let key = keys[depth];
    for &candidate in &factor_set[&key] {
        if used[candidate] {
            continue;
        }
        used[candidate] = true;
        curr.insert(key, candidate);

        if backtrack(factor_set, keys, depth + 1, curr, used, f1, f2, n) {
            return true;
        }

        curr.remove(&key);
        used[candidate] = false;
    }
    false
}

/// Detection of Exchangeable Factors: reduces the factorial-size
/// permutation search to a backtracking search constrained by bucket
/// equivalence and pairwise swap-position sets intersected across buckets.
///
/// `cutoff` bounds how many ascending-degree-of-freedom signatures are used
/// to build the constraint (default [`DEFAULT_CUTOFF`]); soundness does not
/// depend on it because the backtracking leaf always re-verifies full-table
/// equality, but it is the main performance lever.
pub fn is_exchangeable_deft(f1: &Factor, f2: &Factor, cutoff: usize) -> bool {
    if f1.arity() != f2.arity() {
        return false;
    }
    let f1 = f1.deep_copy();
    let f2 = f2.deep_copy();
    let n = f1.arity();

    let (b1, _cfgs1) = buckets_ordered(&f1, false);
    let (b2, cfgs2) = buckets_ordered(&f2, true);
    let b1_map: HashMap<Signature, Vec<f64>> = b1.into_iter().collect();

    let mut factor_set: HashMap<usize, PositionSet> =
        (0..n).map(|i| (i, full_position_set(n))).collect();

    for (count, (sig, potentials2)) in b2.iter().enumerate() {
        if count >= cutoff {
            trace!("deft: cutoff reached after {} signatures", count);
            break;
        }

        let potentials1 = match b1_map.get(sig) {
            Some(v) => v,
            None => return false,
        };
        if !multiset_eq(potentials1, potentials2) {
            return false;
        }

        let rows2 = &cfgs2[sig];
        let bucket_set = bucket_set_for_signature(n, potentials1, potentials2, rows2);

        if !intersect(&mut factor_set, &bucket_set) {
            debug!("deft: factor_set emptied at signature {:?}", sig);
            return false;
        }
    }

    let keys: Vec<usize> = (0..n).collect();
    let mut curr = HashMap::new();
    let mut used = vec![false; n];
    backtrack(&factor_set, &keys, 0, &mut curr, &mut used, &f1, &f2, n)
}

/// Convenience wrapper using [`DEFAULT_CUTOFF`].
pub fn is_exchangeable_deft_default(f1: &Factor, f2: &Factor) -> bool {
    is_exchangeable_deft(f1, f2, DEFAULT_CUTOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::{all_assignments, Drv};

    fn rv(name: &str) -> Drv {
        Drv::new(name)
    }

    fn factor(args: Vec<&str>, potentials: Vec<f64>) -> Factor {
        let args: Vec<Drv> = args.into_iter().map(rv).collect();
        let n = args.len();
        let entries = all_assignments(n).into_iter().zip(potentials).collect();
        Factor::new("f", args, entries)
    }

    #[test]
    fn s1_identical_factors() {
        let f1 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = f1.clone();
        assert!(is_exchangeable_deft_default(&f1, &f2));
    }

    #[test]
    fn s2_swapped_arguments() {
        let f1 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = factor(vec!["R2", "R1"], vec![1.0, 3.0, 2.0, 4.0]);
        assert!(is_exchangeable_deft_default(&f1, &f2));
    }

    #[test]
    fn s3_non_exchangeable() {
        let f1 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 5.0]);
        assert!(!is_exchangeable_deft_default(&f1, &f2));
    }

    #[test]
    fn s4_arity_mismatch() {
        let f1 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = factor(vec!["R1", "R2", "R3"], (1..=8).map(|v| v as f64).collect());
        assert!(!is_exchangeable_deft_default(&f1, &f2));
    }

    #[test]
    fn s5_three_arg_witness() {
        let f1 = factor(
            vec!["R1", "R2", "R3"],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 6.0, 7.0],
        );
        let f2 = factor(
            vec!["R4", "R5", "R6"],
            vec![1.0, 3.0, 5.0, 6.0, 2.0, 4.0, 6.0, 7.0],
        );
        assert!(is_exchangeable_deft_default(&f1, &f2));
    }

    #[test]
    fn s6_all_same_potential_gives_full_cross_product_bucket_set() {
        let n = 4;
        let potentials = vec![1.0; 1 << n];
        let args: Vec<&str> = vec!["R1", "R2", "R3", "R4"];
        let f1 = factor(args.clone(), potentials.clone());
        let f2 = factor(args, potentials);
        assert!(is_exchangeable_deft_default(&f1, &f2));

        let (b2, cfgs2) = buckets_ordered(&f2, true);
        for (sig, potentials2) in &b2 {
            let rows2 = &cfgs2[sig];
            let bucket_set = bucket_set_for_signature(n, potentials2, potentials2, rows2);
            for positions in bucket_set.values() {
                assert_eq!(positions.len(), n);
            }
        }
    }

    #[test]
    fn bucket_mismatch_rejects() {
        let f1 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = factor(vec!["R1", "R2"], vec![1.0, 9.0, 9.0, 4.0]);
        assert!(!is_exchangeable_deft_default(&f1, &f2));
    }

    #[test]
    fn deft_does_not_mutate_inputs() {
        let f1 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = factor(vec!["R2", "R1"], vec![1.0, 3.0, 2.0, 4.0]);
        let f1_before = f1.clone();
        let f2_before = f2.clone();
        assert!(is_exchangeable_deft_default(&f1, &f2));
        assert_eq!(f1, f1_before);
        assert_eq!(f2, f2_before);
    }

    #[test]
    fn cutoff_of_zero_still_sound_via_leaf_verification() {
        // With cutoff=0 no bucket constraints are applied; factor_set stays
        // the full cross-product, so backtracking must still find the
        // witness permutation via the final full-table check.
        let f1 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = factor(vec!["R2", "R1"], vec![1.0, 3.0, 2.0, 4.0]);
        assert!(is_exchangeable_deft(&f1, &f2, 0));

        let f3 = factor(vec!["R1", "R2"], vec![1.0, 2.0, 3.0, 5.0]);
        assert!(!is_exchangeable_deft(&f1, &f3, 0));
    }
}
