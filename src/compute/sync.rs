//! Synchronization of two temporal operands onto a shared timestamp grid.

use crate::model::{Instant, Interp, Sequence};
use crate::time::Timestamp;
use crate::value::BaseValue;

/// Align two sequences over the intersection of their periods.
///
/// The grid is the union of both operands' instant timestamps inside the
/// intersection plus the intersection endpoints; each operand contributes
/// its value at every grid point. Returns `None` when the periods do not
/// intersect, or intersect only at a mutually excluded endpoint — an
/// absent result, not an error. Any discrete operand restricts the grid
/// to timestamps where both operands are defined, and both outputs
/// become discrete (pointwise-only evaluation downstream).
pub fn synchronize<A: BaseValue, B: BaseValue>(
    seq1: &Sequence<A>,
    seq2: &Sequence<B>,
) -> Option<(Sequence<A>, Sequence<B>)> {
    let inter = seq1.period().intersection(seq2.period())?;

    if seq1.interp() == Interp::Discrete || seq2.interp() == Interp::Discrete {
        let grid = pointwise_grid(seq1, seq2);
        return sample_discrete(seq1, seq2, &grid);
    }

    if inter.is_instant() {
        let v1 = value_on_grid(seq1, inter.lower())?;
        let v2 = value_on_grid(seq2, inter.lower())?;
        return Some((
            Sequence::from_instant(Instant::new(v1, inter.lower()), seq1.interp()),
            Sequence::from_instant(Instant::new(v2, inter.lower()), seq2.interp()),
        ));
    }

    let mut grid: Vec<Timestamp> = Vec::with_capacity(seq1.num_instants() + seq2.num_instants());
    grid.push(inter.lower());
    let ts1 = seq1.instants().iter().map(Instant::timestamp);
    let ts2 = seq2.instants().iter().map(Instant::timestamp);
    for t in ts1.chain(ts2) {
        if t > inter.lower() && t < inter.upper() {
            grid.push(t);
        }
    }
    grid.push(inter.upper());
    grid.sort_unstable();
    grid.dedup();

    let mut out1 = Vec::with_capacity(grid.len());
    let mut out2 = Vec::with_capacity(grid.len());
    for &t in &grid {
        out1.push(Instant::new(value_on_grid(seq1, t)?, t));
        out2.push(Instant::new(value_on_grid(seq2, t)?, t));
    }
    let s1 = Sequence::new_raw(out1, seq1.interp(), inter.lower_inc(), inter.upper_inc()).ok()?;
    let s2 = Sequence::new_raw(out2, seq2.interp(), inter.lower_inc(), inter.upper_inc()).ok()?;
    Some((s1, s2))
}

/// Timestamps where both operands are defined, for grids involving a
/// discrete operand.
fn pointwise_grid<A: BaseValue, B: BaseValue>(
    seq1: &Sequence<A>,
    seq2: &Sequence<B>,
) -> Vec<Timestamp> {
    let candidates: Box<dyn Iterator<Item = Timestamp>> =
        match (seq1.interp(), seq2.interp()) {
            (Interp::Discrete, Interp::Discrete) => {
                // Merge-walk the two ordered instant arrays.
                let mut common = Vec::new();
                let (mut i, mut j) = (0, 0);
                let (a, b) = (seq1.instants(), seq2.instants());
                while i < a.len() && j < b.len() {
                    match a[i].timestamp().cmp(&b[j].timestamp()) {
                        std::cmp::Ordering::Equal => {
                            common.push(a[i].timestamp());
                            i += 1;
                            j += 1;
                        }
                        std::cmp::Ordering::Less => i += 1,
                        std::cmp::Ordering::Greater => j += 1,
                    }
                }
                Box::new(common.into_iter())
            }
            (Interp::Discrete, _) => Box::new(
                seq1.instants()
                    .iter()
                    .map(Instant::timestamp)
                    .filter(|&t| seq2.period().contains(t))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            _ => Box::new(
                seq2.instants()
                    .iter()
                    .map(Instant::timestamp)
                    .filter(|&t| seq1.period().contains(t))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
        };
    candidates.collect()
}

fn sample_discrete<A: BaseValue, B: BaseValue>(
    seq1: &Sequence<A>,
    seq2: &Sequence<B>,
    grid: &[Timestamp],
) -> Option<(Sequence<A>, Sequence<B>)> {
    if grid.is_empty() {
        return None;
    }
    let mut out1 = Vec::with_capacity(grid.len());
    let mut out2 = Vec::with_capacity(grid.len());
    for &t in grid {
        out1.push(Instant::new(value_on_grid(seq1, t)?, t));
        out2.push(Instant::new(value_on_grid(seq2, t)?, t));
    }
    let s1 = Sequence::new_raw(out1, Interp::Discrete, true, true).ok()?;
    let s2 = Sequence::new_raw(out2, Interp::Discrete, true, true).ok()?;
    Some((s1, s2))
}

/// Value at a grid timestamp, ignoring bound exclusivity: a grid point at
/// an exclusive period bound still carries the limit value held by the
/// instant sitting on that bound.
fn value_on_grid<V: BaseValue>(seq: &Sequence<V>, t: Timestamp) -> Option<V> {
    if t < seq.period().lower() || t > seq.period().upper() {
        return None;
    }
    let idx = seq.find_timestamp(t)?;
    let inst = &seq.instants()[idx];
    if inst.timestamp() == t {
        return Some(inst.value().clone());
    }
    match seq.interp() {
        Interp::Discrete => None,
        Interp::Step => Some(inst.value().clone()),
        Interp::Linear => {
            let next = &seq.instants()[idx + 1];
            Some(inst.segment_value_at(next, true, t))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Period;

    fn inst(v: f64, secs: i64) -> Instant<f64> {
        Instant::new(v, Timestamp::from_secs(secs))
    }

    fn linear(points: &[(f64, i64)]) -> Sequence<f64> {
        let instants: Vec<_> = points.iter().map(|&(v, s)| inst(v, s)).collect();
        Sequence::new(instants, Interp::Linear, true, true).unwrap()
    }

    #[test]
    fn test_union_grid() {
        let a = linear(&[(0.0, 0), (10.0, 10)]);
        let b = linear(&[(5.0, 5), (7.0, 20)]);
        let (s1, s2) = synchronize(&a, &b).unwrap();

        // Intersection is [5, 10]; grid is {5, 10}.
        assert_eq!(s1.num_instants(), 2);
        assert_eq!(s1.period(), &Period::new(
            Timestamp::from_secs(5),
            Timestamp::from_secs(10),
            true,
            true
        )
        .unwrap());
        assert_eq!(s1.instants()[0].value(), &5.0);
        assert_eq!(s1.instants()[1].value(), &10.0);
        // b interpolated onto the grid.
        let expected = 5.0 + 2.0 * (5.0 / 15.0);
        assert!((s2.instants()[1].value() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_interior_instants_join_grid() {
        let a = linear(&[(0.0, 0), (10.0, 10)]);
        let b = linear(&[(0.0, 0), (5.0, 4), (10.0, 10)]);
        let (s1, s2) = synchronize(&a, &b).unwrap();
        assert_eq!(s1.num_instants(), 3);
        assert_eq!(s2.num_instants(), 3);
        // a sampled at the interior grid point.
        assert_eq!(s1.instants()[1].value(), &4.0);
        assert_eq!(s2.instants()[1].value(), &5.0);
    }

    #[test]
    fn test_no_overlap() {
        let a = linear(&[(0.0, 0), (1.0, 10)]);
        let b = linear(&[(0.0, 20), (1.0, 30)]);
        assert!(synchronize(&a, &b).is_none());

        // Touching at a mutually excluded endpoint.
        let open_a =
            Sequence::new(vec![inst(0.0, 0), inst(1.0, 10)], Interp::Linear, true, false)
                .unwrap();
        let c = linear(&[(0.0, 10), (1.0, 20)]);
        assert!(synchronize(&open_a, &c).is_none());
    }

    #[test]
    fn test_instant_overlap() {
        let a = linear(&[(0.0, 0), (10.0, 10)]);
        let b = linear(&[(7.0, 10), (9.0, 20)]);
        let (s1, s2) = synchronize(&a, &b).unwrap();
        assert_eq!(s1.num_instants(), 1);
        assert_eq!(s1.instants()[0].value(), &10.0);
        assert_eq!(s2.instants()[0].value(), &7.0);
    }

    #[test]
    fn test_discrete_forces_pointwise() {
        let a = Sequence::new(
            vec![inst(1.0, 0), inst(2.0, 5), inst(3.0, 10)],
            Interp::Discrete,
            true,
            true,
        )
        .unwrap();
        let b = linear(&[(0.0, 0), (10.0, 10)]);
        let (s1, s2) = synchronize(&a, &b).unwrap();
        assert_eq!(s1.interp(), Interp::Discrete);
        assert_eq!(s2.interp(), Interp::Discrete);
        assert_eq!(s1.num_instants(), 3);
        assert_eq!(s2.instants()[1].value(), &5.0);
    }

    #[test]
    fn test_mixed_value_types_share_grid() {
        // Operands of different base types still align on the union grid.
        let a = linear(&[(0.0, 0), (10.0, 10)]);
        let b = Sequence::new(
            vec![
                Instant::new(false, Timestamp::from_secs(0)),
                Instant::new(true, Timestamp::from_secs(5)),
                Instant::new(true, Timestamp::from_secs(10)),
            ],
            Interp::Step,
            true,
            true,
        )
        .unwrap();
        let (s1, s2) = synchronize(&a, &b).unwrap();
        assert_eq!(s1.num_instants(), 3);
        assert_eq!(s1.instants()[1].value(), &5.0);
        assert_eq!(s2.instants()[1].value(), &true);
    }

    #[test]
    fn test_dominance() {
        assert_eq!(Interp::Linear.dominant(Interp::Linear), Interp::Linear);
        assert_eq!(Interp::Linear.dominant(Interp::Step), Interp::Step);
        assert_eq!(Interp::Step.dominant(Interp::Step), Interp::Step);
        assert_eq!(Interp::Linear.dominant(Interp::Discrete), Interp::Discrete);
    }
}
