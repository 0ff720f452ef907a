use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named Boolean random variable. Every variable in this crate ranges
/// over `{true, false}`, in that order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Drv {
    pub name: String,
}

impl Drv {
    pub fn new(name: impl Into<String>) -> Drv {
        Drv { name: name.into() }
    }
}

/// A complete assignment of Booleans, matched positionally to a factor's `args`.
pub type Assignment = Vec<bool>;

/// A discrete Boolean factor: an ordered argument list plus a potential table
/// keyed by complete assignments. A factor is valid iff every one of the
/// `2^n` assignments is present in the table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub args: Vec<Drv>,
    table: HashMap<Assignment, f64>,
}

impl Factor {
    /// Build a factor from a list of `(assignment, potential)` pairs.
    /// Duplicate assignments are not expected; last write wins.
    pub fn new(name: impl Into<String>, args: Vec<Drv>, entries: Vec<(Assignment, f64)>) -> Factor {
        let mut table = HashMap::with_capacity(entries.len());
        for (assignment, potential) in entries {
            table.insert(assignment, potential);
        }
        Factor {
            name: name.into(),
            args,
            table,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn rvs(&self) -> &[Drv] {
        &self.args
    }

    /// Looks up the potential of a complete assignment. Returns `f64::NAN`
    /// if the assignment is not present; callers must treat NaN as "no match".
    pub fn potential(&self, c: &[bool]) -> f64 {
        match self.table.get(c) {
            Some(value) => *value,
            None => f64::NAN,
        }
    }

    /// True iff all `2^n` assignments are mapped to a potential.
    pub fn is_valid(&self) -> bool {
        let n = self.arity();
        if self.table.len() != 1usize << n {
            return false;
        }
        self.assignments_in_order()
            .iter()
            .all(|c| self.table.contains_key(c))
    }

    pub fn deep_copy(&self) -> Factor {
        self.clone()
    }

    /// The canonical, reproducible enumeration of `{true,false}^n`, built
    /// from argument count alone (independent of which assignments are
    /// actually present in the table). Every other component in this crate
    /// — bucket construction, configuration recording, swap-set
    /// enumeration — iterates assignments in exactly this order.
    ///
    /// The order is the reverse-sorted Cartesian product over the argument
    /// range `{true, false}`: `true` before `false` in each position, with
    /// the last argument varying fastest.
    pub fn assignments_in_order(&self) -> Vec<Assignment> {
        all_assignments(self.arity())
    }

    /// Reorders the argument sequence and rewrites every assignment key so
    /// that `new_args[i] = old_args[perm[i]]` and, correspondingly,
    /// `new_key[i] = old_key[perm[i]]`. Potentials are preserved verbatim —
    /// only positions move.
    pub fn permute_in_place(&mut self, perm: &[usize]) {
        assert_eq!(perm.len(), self.arity(), "permutation length must match arity");

        let new_args: Vec<Drv> = perm.iter().map(|&p| self.args[p].clone()).collect();

        let mut new_table = HashMap::with_capacity(self.table.len());
        for (old_key, value) in self.table.drain() {
            let new_key: Assignment = perm.iter().map(|&p| old_key[p]).collect();
            new_table.insert(new_key, value);
        }

        self.args = new_args;
        self.table = new_table;
    }

    /// Iterator over `(assignment, potential)` in canonical order. Used by
    /// callers that need both the key and value without a second lookup.
    pub fn entries_in_order(&self) -> Vec<(Assignment, f64)> {
        self.assignments_in_order()
            .into_iter()
            .map(|c| {
                let p = self.potential(&c);
                (c, p)
            })
            .collect()
    }
}

impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name || self.args != other.args {
            return false;
        }
        if self.table.len() != other.table.len() {
            return false;
        }
        self.table.iter().all(|(k, v)| match other.table.get(k) {
            Some(ov) => v.to_bits() == ov.to_bits(),
            None => false,
        })
    }
}

/// The reverse-sorted Cartesian product of `n` copies of `{true, false}`,
/// matching the source's fixed enumeration order (`true` before `false`,
/// rightmost position fastest).
pub fn all_assignments(n: usize) -> Vec<Assignment> {
    let total = 1usize << n;
    let mut out = Vec::with_capacity(total);
    for mask in 0..total {
        let mut row = Vec::with_capacity(n);
        for i in 0..n {
            let bit = (mask >> (n - 1 - i)) & 1;
            row.push(bit == 0);
        }
        out.push(row);
    }
    out
}
