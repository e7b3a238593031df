//! Temporal boolean algebra.

use crate::compute::lift::{lift_binary, lift_unary, lift_with_value, LiftOptions, LiftValueOptions};
use crate::error::Result;
use crate::model::Temporal;

pub fn tand(lhs: &Temporal<bool>, rhs: &Temporal<bool>) -> Result<Option<Temporal<bool>>> {
    lift_binary(lhs, rhs, &|a: &bool, b: &bool| Ok(*a && *b), &LiftOptions::default())
}

pub fn tor(lhs: &Temporal<bool>, rhs: &Temporal<bool>) -> Result<Option<Temporal<bool>>> {
    lift_binary(lhs, rhs, &|a: &bool, b: &bool| Ok(*a || *b), &LiftOptions::default())
}

pub fn tnot(temp: &Temporal<bool>) -> Result<Temporal<bool>> {
    lift_unary(temp, &|v: &bool| Ok(!v))
}

pub fn tand_value(temp: &Temporal<bool>, value: bool) -> Result<Temporal<bool>> {
    lift_with_value(temp, &value, &|a: &bool, b: &bool| Ok(*a && *b), &LiftValueOptions::default())
}

pub fn tor_value(temp: &Temporal<bool>, value: bool) -> Result<Temporal<bool>> {
    lift_with_value(temp, &value, &|a: &bool, b: &bool| Ok(*a || *b), &LiftValueOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::restrict::when_true;
    use crate::model::{Instant, Interp, Sequence};
    use crate::time::Timestamp;

    fn bools(points: &[(bool, i64)]) -> Temporal<bool> {
        let instants: Vec<_> = points
            .iter()
            .map(|&(v, s)| Instant::new(v, Timestamp::from_secs(s)))
            .collect();
        Temporal::Sequence(Sequence::new(instants, Interp::Step, true, true).unwrap())
    }

    #[test]
    fn test_and_or_not() {
        let a = bools(&[(true, 0), (false, 10), (false, 20)]);
        let b = bools(&[(true, 0), (true, 10), (true, 20)]);
        let and = tand(&a, &b).unwrap().unwrap();
        assert_eq!(and.value_at(Timestamp::from_secs(5)).unwrap(), true);
        assert_eq!(and.value_at(Timestamp::from_secs(15)).unwrap(), false);

        let or = tor(&a, &b).unwrap().unwrap();
        assert_eq!(or.value_at(Timestamp::from_secs(15)).unwrap(), true);

        let not = tnot(&a).unwrap();
        assert_eq!(not.value_at(Timestamp::from_secs(15)).unwrap(), true);
    }

    #[test]
    fn test_double_negation() {
        let a = bools(&[(true, 0), (false, 10), (true, 20)]);
        assert_eq!(tnot(&tnot(&a).unwrap()).unwrap(), a);
    }

    #[test]
    fn test_when_true_windows() {
        let a = bools(&[(false, 0), (true, 10), (false, 20), (false, 30)]);
        let windows = when_true(&a).unwrap();
        assert_eq!(windows.num_sequences(), 1);
        let period = windows.sequences()[0].period();
        assert_eq!(period.lower(), Timestamp::from_secs(10));
        assert_eq!(period.upper(), Timestamp::from_secs(20));
        assert!(!period.upper_inc());
    }
}
