//! Partial assignments over a fixed scope.

use std::fmt;

use crate::scope::Scope;
use crate::types::Var;
use crate::utils::{hash_all, hash_combine};

/// Sentinel for a variable without a value.
pub const UNASSIGNED: usize = usize::MAX;

/// Partial map from the variables of a [`Scope`] to value indices.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Assignment {
    scope: Scope,
    values: Vec<usize>,
}

impl Assignment {
    /// Create an assignment with every variable unassigned.
    pub fn new(scope: Scope) -> Self {
        let values = vec![UNASSIGNED; scope.num_vars()];
        Self { scope, values }
    }

    /// Create the first complete assignment (every variable set to 0).
    pub fn first(scope: Scope) -> Self {
        let mut a = Self::new(scope);
        a.set_all(0);
        a
    }

    /// Create a complete assignment from values listed in scope order.
    pub fn from_values(scope: Scope, values: &[usize]) -> Self {
        assert_eq!(scope.num_vars(), values.len(), "Wrong number of values for scope {}", scope);
        let mut a = Self::new(scope);
        let vars: Vec<Var> = a.scope.vars().collect();
        for (var, &val) in vars.into_iter().zip(values) {
            a.set(var, val);
        }
        a
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Assign `value` to `var`.
    pub fn set(&mut self, var: Var, value: usize) {
        let i = match self.scope.position(var) {
            Some(i) => i,
            None => panic!("{} is not in scope {}", var, self.scope),
        };
        let card = self.scope.entries()[i].1;
        assert!(value < card, "Value {} out of range for {} (card = {})", value, var, card);
        self.values[i] = value;
    }

    pub fn unset(&mut self, var: Var) {
        if let Some(i) = self.scope.position(var) {
            self.values[i] = UNASSIGNED;
        }
    }

    /// Set every variable to `value`.
    pub fn set_all(&mut self, value: usize) {
        for (i, &(var, card)) in self.scope.entries().iter().enumerate() {
            assert!(value < card, "Value {} out of range for {} (card = {})", value, var, card);
            self.values[i] = value;
        }
    }

    /// Value of `var`, or `None` if it is unassigned or not in scope.
    pub fn get(&self, var: Var) -> Option<usize> {
        self.scope
            .position(var)
            .map(|i| self.values[i])
            .filter(|&v| v != UNASSIGNED)
    }

    /// Value of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` has no recorded value.
    pub fn value(&self, var: Var) -> usize {
        match self.get(var) {
            Some(v) => v,
            None => panic!("No value recorded for {}", var),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|&v| v != UNASSIGNED)
    }

    /// Advance to the next complete assignment in lexicographic order (the
    /// last scope variable changes fastest).
    ///
    /// Unassigned variables are treated as 0. Returns `false` after the last
    /// assignment, in which case the assignment is reset to the first one.
    pub fn iterate(&mut self) -> bool {
        for i in (0..self.values.len()).rev() {
            let card = self.scope.entries()[i].1;
            let v = if self.values[i] == UNASSIGNED { 0 } else { self.values[i] };
            if v + 1 < card {
                self.values[i] = v + 1;
                return true;
            }
            self.values[i] = 0;
        }
        false
    }

    /// All completions of this assignment: assigned variables stay fixed,
    /// unassigned ones range over their domains.
    pub fn completions(&self) -> Completions {
        Completions::new(self.clone())
    }

    /// Row-major index of a complete assignment into a dense table laid out
    /// in scope order.
    pub fn index(&self) -> usize {
        let mut index = 0;
        for (i, &(var, card)) in self.scope.entries().iter().enumerate() {
            let v = self.values[i];
            assert_ne!(v, UNASSIGNED, "No value recorded for {}", var);
            index = index * card + v;
        }
        index
    }

    /// Hash over the assigned `(variable, value)` pairs.
    pub fn fingerprint(&self) -> u64 {
        hash_all(
            self.scope
                .vars()
                .zip(&self.values)
                .filter(|&(_, &v)| v != UNASSIGNED)
                .map(|(var, &v)| hash_combine(var.id() as u64, v as u64)),
        )
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (var, &v)) in self.scope.vars().zip(&self.values).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if v == UNASSIGNED {
                write!(f, "{}=?", var)?;
            } else {
                write!(f, "{}={}", var, v)?;
            }
        }
        write!(f, ")")
    }
}

/// Iterator over the completions of a partial assignment.
pub struct Completions {
    current: Option<Assignment>,
    free: Vec<usize>,
}

impl Completions {
    fn new(mut base: Assignment) -> Self {
        let free: Vec<usize> = (0..base.values.len())
            .filter(|&i| base.values[i] == UNASSIGNED)
            .collect();
        for &i in &free {
            base.values[i] = 0;
        }
        Self {
            current: Some(base),
            free,
        }
    }
}

impl Iterator for Completions {
    type Item = Assignment;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut next = current.clone();
        let mut advanced = false;
        for &i in self.free.iter().rev() {
            let card = next.scope.entries()[i].1;
            if next.values[i] + 1 < card {
                next.values[i] += 1;
                advanced = true;
                break;
            }
            next.values[i] = 0;
        }
        if advanced {
            self.current = Some(next);
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Scope {
        Scope::from_iter([(Var::new(0), 2), (Var::new(1), 3)])
    }

    #[test]
    fn test_iterate_lexicographic() {
        let mut a = Assignment::first(ab());
        let mut seen = vec![(a.value(Var::new(0)), a.value(Var::new(1)))];
        while a.iterate() {
            seen.push((a.value(Var::new(0)), a.value(Var::new(1))));
        }
        assert_eq!(seen, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        // Wrapped around to the first assignment.
        assert_eq!(a, Assignment::first(ab()));
    }

    #[test]
    fn test_index_matches_iteration_order() {
        let mut a = Assignment::first(ab());
        let mut i = 0;
        loop {
            assert_eq!(a.index(), i);
            i += 1;
            if !a.iterate() {
                break;
            }
        }
        assert_eq!(i, 6);
    }

    #[test]
    fn test_completions_keep_assigned_fixed() {
        let mut a = Assignment::new(ab());
        a.set(Var::new(0), 1);
        let all: Vec<_> = a.completions().collect();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|c| c.value(Var::new(0)) == 1));
        assert_eq!(all[2].value(Var::new(1)), 2);
    }

    #[test]
    fn test_completions_of_complete_assignment() {
        let a = Assignment::from_values(ab(), &[1, 1]);
        assert_eq!(a.completions().count(), 1);
    }

    #[test]
    fn test_get_unassigned() {
        let mut a = Assignment::new(ab());
        assert_eq!(a.get(Var::new(0)), None);
        a.set(Var::new(0), 1);
        assert_eq!(a.get(Var::new(0)), Some(1));
        a.unset(Var::new(0));
        assert_eq!(a.get(Var::new(0)), None);
        assert_eq!(a.get(Var::new(9)), None);
    }

    #[test]
    #[should_panic(expected = "No value recorded for x1")]
    fn test_value_unassigned_panics() {
        let a = Assignment::new(ab());
        a.value(Var::new(1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range() {
        let mut a = Assignment::new(ab());
        a.set(Var::new(1), 3);
    }

    #[test]
    fn test_fingerprint() {
        let mut a = Assignment::new(ab());
        let empty = a.fingerprint();
        a.set(Var::new(0), 0);
        let x0 = a.fingerprint();
        a.set(Var::new(0), 1);
        let x1 = a.fingerprint();
        assert_ne!(empty, x0);
        assert_ne!(x0, x1);
        a.unset(Var::new(0));
        assert_eq!(a.fingerprint(), empty);
    }

    #[test]
    fn test_display() {
        let mut a = Assignment::new(ab());
        a.set(Var::new(1), 2);
        assert_eq!(a.to_string(), "(x0=?, x1=2)");
    }
}
