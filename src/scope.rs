//! Ordered sets of variables with their cardinalities.
//!
//! A [`Scope`] fixes the order in which dense factor tables are laid out:
//! the first variable is the slowest-changing one, the last variable the
//! fastest-changing one (row-major order).

use std::fmt;

use num_bigint::BigUint;

use crate::types::Var;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Scope {
    entries: Vec<(Var, usize)>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope over a single variable.
    pub fn single(var: Var, card: usize) -> Self {
        let mut scope = Self::new();
        scope.add_var(var, card);
        scope
    }

    /// Add a variable at the end of the scope.
    ///
    /// Adding a variable that is already present is a no-op, as long as the
    /// cardinality agrees.
    pub fn add_var(&mut self, var: Var, card: usize) {
        assert!(card >= 1, "Cardinality of {} must be at least 1", var);
        if let Some(existing) = self.card_of(var) {
            assert_eq!(existing, card, "Conflicting cardinality for {}", var);
            return;
        }
        self.entries.push((var, card));
    }

    pub fn num_vars(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Variables with their cardinalities, in scope order.
    pub fn entries(&self) -> &[(Var, usize)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, usize)> + '_ {
        self.entries.iter().copied()
    }

    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.entries.iter().map(|&(v, _)| v)
    }

    /// Leading variable of the scope.
    pub fn first(&self) -> Option<(Var, usize)> {
        self.entries.first().copied()
    }

    pub fn position(&self, var: Var) -> Option<usize> {
        self.entries.iter().position(|&(v, _)| v == var)
    }

    pub fn contains(&self, var: Var) -> bool {
        self.position(var).is_some()
    }

    pub fn card_of(&self, var: Var) -> Option<usize> {
        self.entries.iter().find(|&&(v, _)| v == var).map(|&(_, c)| c)
    }

    /// Number of joint assignments (product of cardinalities).
    ///
    /// # Panics
    ///
    /// Panics if the product does not fit into `usize`; use
    /// [`num_assignments`][Scope::num_assignments] for large scopes.
    pub fn cardinality(&self) -> usize {
        self.entries.iter().fold(1usize, |acc, &(var, card)| {
            match acc.checked_mul(card) {
                Some(n) => n,
                None => panic!("Cardinality overflow at {}", var),
            }
        })
    }

    /// Exact number of joint assignments.
    pub fn num_assignments(&self) -> BigUint {
        self.entries
            .iter()
            .fold(BigUint::from(1u32), |acc, &(_, card)| acc * BigUint::from(card))
    }

    /// Variables of `self` that are not in `other`, in `self` order.
    pub fn difference(&self, other: &Scope) -> Scope {
        Scope {
            entries: self
                .entries
                .iter()
                .copied()
                .filter(|&(v, _)| !other.contains(v))
                .collect(),
        }
    }

    /// Variables of `self` followed by the new variables of `other`.
    pub fn union(&self, other: &Scope) -> Scope {
        let mut res = self.clone();
        for &(v, c) in other.entries() {
            res.add_var(v, c);
        }
        res
    }
}

impl FromIterator<(Var, usize)> for Scope {
    fn from_iter<I: IntoIterator<Item = (Var, usize)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (v, c) in iter {
            scope.add_var(v, c);
        }
        scope
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (v, c)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", v, c)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Scope {
        Scope::from_iter([(Var::new(0), 2), (Var::new(1), 3), (Var::new(2), 2)])
    }

    #[test]
    fn test_cardinality() {
        assert_eq!(Scope::new().cardinality(), 1);
        assert_eq!(abc().cardinality(), 12);
        assert_eq!(abc().num_assignments(), BigUint::from(12u32));
    }

    #[test]
    fn test_num_assignments_large() {
        let scope: Scope = (0..100).map(|i| (Var::new(i), 2)).collect();
        assert_eq!(scope.num_assignments(), BigUint::from(1u32) << 100);
    }

    #[test]
    #[should_panic(expected = "Cardinality overflow")]
    fn test_cardinality_overflow() {
        let scope: Scope = (0..100).map(|i| (Var::new(i), 2)).collect();
        scope.cardinality();
    }

    #[test]
    fn test_add_duplicate() {
        let mut scope = abc();
        scope.add_var(Var::new(1), 3);
        assert_eq!(scope.num_vars(), 3);
    }

    #[test]
    #[should_panic(expected = "Conflicting cardinality")]
    fn test_add_conflicting() {
        let mut scope = abc();
        scope.add_var(Var::new(1), 4);
    }

    #[test]
    fn test_difference_and_union() {
        let s = abc();
        let t = Scope::from_iter([(Var::new(1), 3), (Var::new(5), 4)]);
        let d = s.difference(&t);
        assert_eq!(d.vars().collect::<Vec<_>>(), vec![Var::new(0), Var::new(2)]);
        let u = s.union(&t);
        assert_eq!(
            u.vars().collect::<Vec<_>>(),
            vec![Var::new(0), Var::new(1), Var::new(2), Var::new(5)]
        );
        assert_eq!(u.card_of(Var::new(5)), Some(4));
    }

    #[test]
    fn test_display() {
        assert_eq!(abc().to_string(), "{x0:2, x1:3, x2:2}");
    }
}
