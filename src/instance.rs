use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::InstanceError;
use crate::factor::{all_assignments, Assignment, Drv, Factor};

/// Which of the three corpus shapes an instance was generated with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InstanceKind {
    Asc,
    Same,
    Mixed { p: f64 },
}

impl InstanceKind {
    fn tag(&self) -> &'static str {
        match self {
            InstanceKind::Asc => "asc",
            InstanceKind::Same => "same",
            InstanceKind::Mixed { .. } => "mixed",
        }
    }
}

/// A serializable pair of factors plus the parameters that produced it, so
/// a corpus file is self-describing for the results CSV's
/// `instance,n,iseq,type` columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub n: usize,
    pub iseq: bool,
    pub kind: InstanceKind,
    pub f1: Factor,
    pub f2: Factor,
}

/// `asc-n=NN-ISEQ`, `same-n=NN-ISEQ`, `mixed-n=NN-p=PPP-ISEQ`.
pub fn instance_name(n: usize, iseq: bool, kind: InstanceKind) -> String {
    let iseq_tag = if iseq { "true" } else { "false" };
    match kind {
        InstanceKind::Mixed { p } => format!("mixed-n={:02}-p={}-{}", n, p, iseq_tag),
        other => format!("{}-n={:02}-{}", other.tag(), n, iseq_tag),
    }
}

fn args_for(n: usize) -> Vec<Drv> {
    (1..=n).map(|i| Drv::new(format!("R{}", i))).collect()
}

/// Potentials `1, 2, …, 2^n` in canonical assignment order.
pub fn gen_asc(n: usize) -> Factor {
    let entries: Vec<(Assignment, f64)> = all_assignments(n)
        .into_iter()
        .enumerate()
        .map(|(i, c)| (c, (i + 1) as f64))
        .collect();
    Factor::new("f", args_for(n), entries)
}

/// Every potential equals `value`.
pub fn gen_same(n: usize, value: f64) -> Factor {
    let entries: Vec<(Assignment, f64)> = all_assignments(n).into_iter().map(|c| (c, value)).collect();
    Factor::new("f", args_for(n), entries)
}

/// Each assignment's potential is `1` with probability `p`, else a running
/// counter. `rng` is an explicitly seeded, caller-owned generator — this
/// crate never reseeds a process-wide PRNG, so repeated calls in the same
/// process don't contaminate each other.
pub fn gen_mixed(n: usize, p: f64, rng: &mut StdRng) -> Factor {
    let mut counter = 0.0f64;
    let entries: Vec<(Assignment, f64)> = all_assignments(n)
        .into_iter()
        .map(|c| {
            if rng.gen::<f64>() < p {
                (c, 1.0)
            } else {
                counter += 1.0;
                (c, counter)
            }
        })
        .collect();
    Factor::new("f", args_for(n), entries)
}

/// Replaces one uniformly random assignment's potential with
/// `original + 2^n`, producing a non-exchangeable perturbation.
pub fn perturb(f: &mut Factor, rng: &mut StdRng) {
    let n = f.arity();
    let assignments = f.assignments_in_order();
    let idx = rng.gen_range(0..assignments.len());
    let chosen = &assignments[idx];
    let original = f.potential(chosen);

    let mut entries: Vec<(Assignment, f64)> = assignments
        .iter()
        .map(|c| (c.clone(), f.potential(c)))
        .collect();
    entries[idx] = (chosen.clone(), original + (1u64 << n) as f64);

    *f = Factor::new(f.name.clone(), f.args.clone(), entries);
}

/// Applies a uniformly random permutation to `f`'s argument order,
/// preserving potentials.
pub fn shuffle_args(f: &mut Factor, rng: &mut StdRng) {
    let n = f.arity();
    let mut perm: Vec<usize> = (0..n).collect();
    // Fisher-Yates.
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        perm.swap(i, j);
    }
    f.permute_in_place(&perm);
}

/// Orchestrates corpus generation per the §6 recipe: build `f1` and `f2`
/// from the requested shape, perturb `f2` when `iseq` is false, then
/// shuffle both factors' argument order.
pub fn build_pair(n: usize, iseq: bool, kind: InstanceKind, seed: u64) -> Instance {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut f1 = match kind {
        InstanceKind::Asc => gen_asc(n),
        InstanceKind::Same => gen_same(n, 1.0),
        InstanceKind::Mixed { p } => gen_mixed(n, p, &mut rng),
    };
    let mut f2 = f1.clone();
    f2.name = "f2".to_string();
    f1.name = "f1".to_string();

    if !iseq {
        perturb(&mut f2, &mut rng);
    }

    shuffle_args(&mut f1, &mut rng);
    shuffle_args(&mut f2, &mut rng);

    Instance {
        name: instance_name(n, iseq, kind),
        n,
        iseq,
        kind,
        f1,
        f2,
    }
}

pub fn save(instance: &Instance, path: impl AsRef<Path>) -> Result<(), InstanceError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, instance)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<Instance, InstanceError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let instance = bincode::deserialize_from(reader)?;
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_naming_matches_corpus_convention() {
        assert_eq!(instance_name(4, true, InstanceKind::Asc), "asc-n=04-true");
        assert_eq!(instance_name(16, false, InstanceKind::Same), "same-n=16-false");
        assert_eq!(
            instance_name(8, false, InstanceKind::Mixed { p: 0.2 }),
            "mixed-n=08-p=0.2-false"
        );
    }

    #[test]
    fn gen_asc_enumerates_powers_of_two_potentials() {
        let f = gen_asc(3);
        let values: Vec<f64> = f
            .assignments_in_order()
            .iter()
            .map(|c| f.potential(c))
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn gen_same_is_constant() {
        let f = gen_same(3, 1.0);
        assert!(f.assignments_in_order().iter().all(|c| f.potential(c) == 1.0));
    }

    #[test]
    fn s8_gen_mixed_with_p_one_is_same_shaped() {
        let mut rng = StdRng::seed_from_u64(42);
        let f = gen_mixed(4, 1.0, &mut rng);
        assert!(f.assignments_in_order().iter().all(|c| f.potential(c) == 1.0));
    }

    #[test]
    fn perturb_changes_exactly_one_entry_by_two_to_the_n() {
        let mut f = gen_same(3, 1.0);
        let before = f.clone();
        let mut rng = StdRng::seed_from_u64(7);
        perturb(&mut f, &mut rng);

        let mut diffs = 0;
        for c in f.assignments_in_order() {
            let b = before.potential(&c);
            let a = f.potential(&c);
            if a != b {
                diffs += 1;
                assert_eq!(a, b + 8.0);
            }
        }
        assert_eq!(diffs, 1);
    }

    #[test]
    fn shuffle_args_preserves_potentials_under_the_new_order() {
        let original = gen_asc(3);
        let mut shuffled = original.clone();
        let mut rng = StdRng::seed_from_u64(9);
        shuffle_args(&mut shuffled, &mut rng);

        assert_eq!(shuffled.arity(), original.arity());
        // Every potential in the original table must still be present
        // somewhere in the shuffled table (multiset preserved).
        let mut before: Vec<u64> = original
            .assignments_in_order()
            .iter()
            .map(|c| original.potential(c).to_bits())
            .collect();
        let mut after: Vec<u64> = shuffled
            .assignments_in_order()
            .iter()
            .map(|c| shuffled.potential(c).to_bits())
            .collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn build_pair_produces_non_exchangeable_when_iseq_false() {
        use crate::algorithm::{is_exchangeable, Algorithm};
        let instance = build_pair(3, false, InstanceKind::Asc, 123);
        assert!(!is_exchangeable(Algorithm::Naive, &instance.f1, &instance.f2));
    }

    #[test]
    fn build_pair_produces_exchangeable_when_iseq_true() {
        use crate::algorithm::{is_exchangeable, Algorithm};
        let instance = build_pair(3, true, InstanceKind::Asc, 123);
        assert!(is_exchangeable(Algorithm::Naive, &instance.f1, &instance.f2));
    }

    #[test]
    fn s7_instance_round_trips_through_the_binary_format() {
        let instance = build_pair(3, true, InstanceKind::Asc, 123);
        let path = std::env::temp_dir().join(format!("deft-instance-test-{}.bin", std::process::id()));
        save(&instance, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, instance);
    }
}
