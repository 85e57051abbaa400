//! Type-safe wrapper for model variables.
use std::fmt;

/// A variable identifier.
///
/// Variables are the decision points of a diagram. Their position in the
/// elimination order is not encoded here: the pseudo-tree decides which
/// variables govern which.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    pub const fn new(id: u32) -> Self {
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<u32> for Var {
    fn from(id: u32) -> Self {
        Var(id)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v0 = Var::new(0);
        let v1 = Var::from(1);
        assert_eq!(v0.id(), 0);
        assert_eq!(u32::from(v1), 1);
        assert!(v0 < v1);
    }

    #[test]
    fn test_var_display() {
        assert_eq!(Var::new(7).to_string(), "x7");
    }
}
