use std::collections::HashMap;

use crate::factor::{Assignment, Factor};

/// `(#true, #false)` for an assignment. Redundant with `#true` alone for
/// Boolean factors, but stored as a pair to match the source convention and
/// leave room for an eventual non-Boolean extension (out of scope here).
pub type Signature = (usize, usize);

pub fn signature_of(c: &[bool]) -> Signature {
    let true_count = c.iter().filter(|&&b| b).count();
    (true_count, c.len() - true_count)
}

/// Groups a factor's potentials by signature. This is the unordered view
/// used for the filter algorithm's bucket-mismatch check: two factors are
/// compared by multiset equality per signature.
pub fn buckets(f: &Factor) -> HashMap<Signature, Vec<f64>> {
    let mut out: HashMap<Signature, Vec<f64>> = HashMap::new();
    for c in f.assignments_in_order() {
        let sig = signature_of(&c);
        out.entry(sig).or_default().push(f.potential(&c));
    }
    out
}

/// Two signature-keyed potential maps are equal iff they share the same
/// signatures and, for each signature, the same multiset of potentials.
pub fn buckets_eq(a: &HashMap<Signature, Vec<f64>>, b: &HashMap<Signature, Vec<f64>>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(sig, va)| match b.get(sig) {
        Some(vb) => multiset_eq(va, vb),
        None => false,
    })
}

/// Compares two sequences of potentials as multisets (order-independent),
/// using exact bit equality so NaN sentinels compare consistently.
pub fn multiset_eq(a: &[f64], b: &[f64]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut sa: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
    let mut sb: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
    sa.sort_unstable();
    sb.sort_unstable();
    sa == sb
}

/// The degree of freedom of a bucket's potential sequence:
/// `∏_{v ∈ unique(values)} count(values == v)`. Lower means more
/// constraining (less ambiguous); used to order buckets so the most
/// informative ones are processed first.
pub fn degree_of_freedom(values: &[f64]) -> usize {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.to_bits()).or_insert(0) += 1;
    }
    counts.values().product()
}

/// The ordered view of a factor's buckets: a list of `(signature,
/// potentials)` pairs, and a parallel map of `signature -> configurations`
/// aligned index-for-index with the potentials.
///
/// When `dosort` is true, the pair list is ordered ascending by degree of
/// freedom, stable on first-insertion (signature encounter) order for ties.
/// When `dosort` is false, the list is in first-insertion order.
pub fn buckets_ordered(
    f: &Factor,
    dosort: bool,
) -> (Vec<(Signature, Vec<f64>)>, HashMap<Signature, Vec<Assignment>>) {
    let mut order: Vec<Signature> = Vec::new();
    let mut potentials: HashMap<Signature, Vec<f64>> = HashMap::new();
    let mut configs: HashMap<Signature, Vec<Assignment>> = HashMap::new();

    for c in f.assignments_in_order() {
        let sig = signature_of(&c);
        if !potentials.contains_key(&sig) {
            order.push(sig);
        }
        potentials.entry(sig).or_default().push(f.potential(&c));
        configs.entry(sig).or_default().push(c);
    }

    let mut pairs: Vec<(Signature, Vec<f64>)> = order
        .into_iter()
        .map(|sig| {
            let values = potentials.remove(&sig).unwrap_or_default();
            (sig, values)
        })
        .collect();

    if dosort {
        pairs.sort_by_key(|(_, values)| degree_of_freedom(values));
    }

    (pairs, configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::{all_assignments, Drv};

    fn rv(name: &str) -> Drv {
        Drv::new(name)
    }

    fn factor_with(n: usize, potentials: Vec<f64>) -> Factor {
        let args = (0..n).map(|i| rv(&format!("R{}", i + 1))).collect();
        let entries = all_assignments(n).into_iter().zip(potentials).collect();
        Factor::new("f", args, entries)
    }

    #[test]
    fn signature_counts_true_and_false() {
        assert_eq!(signature_of(&[true, true, false]), (2, 1));
        assert_eq!(signature_of(&[false, false]), (0, 2));
    }

    #[test]
    fn bucket_sizes_match_binomial_coefficients() {
        // n=3: signatures are (0,3),(1,2),(2,1),(3,0) with sizes 1,3,3,1.
        let f = factor_with(3, (1..=8).map(|v| v as f64).collect());
        let b = buckets(&f);
        assert_eq!(b.get(&(3, 0)).unwrap().len(), 1);
        assert_eq!(b.get(&(2, 1)).unwrap().len(), 3);
        assert_eq!(b.get(&(1, 2)).unwrap().len(), 3);
        assert_eq!(b.get(&(0, 3)).unwrap().len(), 1);
    }

    #[test]
    fn degree_of_freedom_all_distinct_is_one() {
        assert_eq!(degree_of_freedom(&[1.0, 2.0, 3.0]), 1);
    }

    #[test]
    fn degree_of_freedom_all_equal_is_bucket_size() {
        assert_eq!(degree_of_freedom(&[5.0, 5.0, 5.0]), 3);
    }

    #[test]
    fn buckets_ordered_sorts_ascending_by_dof_when_requested() {
        // n=2, potentials in assignment order [TT, TF, FT, FF].
        // signatures: TT->(2,0), TF/FT->(1,1) each, FF->(0,2).
        // Use potentials so the (1,1) bucket (size 2) has DoF 1 (distinct
        // values) while the singleton buckets trivially have DoF 1 too;
        // make singleton buckets' values repeat elsewhere to differentiate.
        let f = factor_with(2, vec![9.0, 1.0, 2.0, 9.0]);
        let (ordered, configs) = buckets_ordered(&f, true);
        // every returned signature must have an aligned configuration list
        // of the same length as its potential list.
        for (sig, values) in &ordered {
            assert_eq!(configs[sig].len(), values.len());
        }
        let dofs: Vec<usize> = ordered
            .iter()
            .map(|(_, values)| degree_of_freedom(values))
            .collect();
        assert!(dofs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn buckets_ordered_without_sort_is_first_insertion_order() {
        let f = factor_with(2, vec![1.0, 2.0, 3.0, 4.0]);
        let (ordered, _) = buckets_ordered(&f, false);
        let sigs: Vec<Signature> = ordered.iter().map(|(s, _)| *s).collect();
        // assignments_in_order for n=2 is TT,TF,FT,FF -> signatures
        // (2,0),(1,1),(1,1),(0,2); first insertion order is (2,0),(1,1),(0,2).
        assert_eq!(sigs, vec![(2, 0), (1, 1), (0, 2)]);
    }

    #[test]
    fn buckets_eq_is_multiset_equality_per_signature() {
        let f1 = factor_with(2, vec![1.0, 2.0, 3.0, 4.0]);
        let f2 = factor_with(2, vec![1.0, 3.0, 2.0, 4.0]);
        assert!(buckets_eq(&buckets(&f1), &buckets(&f2)));

        let f3 = factor_with(2, vec![1.0, 2.0, 3.0, 5.0]);
        assert!(!buckets_eq(&buckets(&f1), &buckets(&f3)));
    }
}
