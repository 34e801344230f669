//! Binary boolean operators as 4-bit truth tables.
//!
//! An [`Op`] lists the operator's result for the operand pairs
//! `(0,0)`, `(0,1)`, `(1,0)`, `(1,1)`, read from the most significant bit
//! of the low nibble down. For example, conjunction is `0b0001` and
//! implication is `0b1101`.

use std::fmt::{Display, Formatter};

/// A binary boolean operator given by its truth table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Op(u8);

impl Op {
    /// Conjunction.
    pub const AND: Op = Op(0b0001);
    /// Disjunction.
    pub const OR: Op = Op(0b0111);
    /// Exclusive or.
    pub const XOR: Op = Op(0b0110);
    /// Equivalence.
    pub const EQ: Op = Op(0b1001);
    /// Implication.
    pub const IMPLY: Op = Op(0b1101);

    /// Build an operator from its truth table.
    ///
    /// # Panics
    ///
    /// Panics if `table` does not fit into 4 bits.
    pub const fn new(table: u8) -> Self {
        assert!(table <= 0b1111, "Truth table must fit into 4 bits");
        Op(table)
    }

    /// Return the truth table.
    pub const fn table(self) -> u8 {
        self.0
    }

    /// Evaluate the operator on two leaf values.
    pub const fn eval(self, a: bool, b: bool) -> bool {
        let i = 2 * (a as u8) + (b as u8);
        (self.0 >> (3 - i)) & 1 == 1
    }

    /// Return the operator with swapped operands.
    pub const fn flip(self) -> Self {
        // Exchange the (0,1) and (1,0) rows.
        let t = self.0;
        Op((t & 0b1001) | ((t & 0b0100) >> 1) | ((t & 0b0010) << 1))
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Op::AND => write!(f, "and"),
            Op::OR => write!(f, "or"),
            Op::XOR => write!(f, "xor"),
            Op::EQ => write!(f, "eq"),
            Op::IMPLY => write!(f, "imply"),
            Op(t) => write!(f, "op{:04b}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(op: Op) -> [bool; 4] {
        [
            op.eval(false, false),
            op.eval(false, true),
            op.eval(true, false),
            op.eval(true, true),
        ]
    }

    #[test]
    fn test_named_tables() {
        assert_eq!(rows(Op::AND), [false, false, false, true]);
        assert_eq!(rows(Op::OR), [false, true, true, true]);
        assert_eq!(rows(Op::XOR), [false, true, true, false]);
        assert_eq!(rows(Op::EQ), [true, false, false, true]);
        assert_eq!(rows(Op::IMPLY), [true, true, false, true]);
    }

    #[test]
    fn test_flip() {
        assert_eq!(Op::AND.flip(), Op::AND);
        assert_eq!(Op::XOR.flip(), Op::XOR);
        // a -> b flipped is b -> a, i.e. a <- b
        assert_eq!(rows(Op::IMPLY.flip()), [true, false, true, true]);
        assert_eq!(Op::IMPLY.flip().flip(), Op::IMPLY);
    }

    #[test]
    fn test_display() {
        assert_eq!(Op::AND.to_string(), "and");
        assert_eq!(Op::new(0b0010).to_string(), "op0010");
    }

    #[test]
    #[should_panic(expected = "4 bits")]
    fn test_too_wide() {
        Op::new(0b10000);
    }
}
