//! The lifting engine: applying a function over base values to whole
//! temporal values.
//!
//! Lifting synchronizes the operands onto a shared grid, evaluates the
//! function at every grid instant, and inserts the extra instants a
//! turning-point resolver reports so that the interpolated result stays
//! exact between grid points. The resolver yields a timestamp only; the
//! engine samples both operands there and applies the same lifted
//! function, so resolvers cannot disagree with the operation they split.
//!
//! Results take the weakest interpolation of the operands, further
//! capped at step when the output type has no linear rule or the caller
//! forces stepwise output (comparisons and predicates). Discontinuous
//! operations over linear operands (the forced-step comparisons) produce
//! a set of step pieces split at each crossing, with an instantaneous
//! piece carrying the boundary value when it differs from both sides.

use std::mem;

use smallvec::SmallVec;

use crate::compute::sync::synchronize;
use crate::compute::turning::{SegmentResolver, ValueResolver};
use crate::error::{Result, TemporalError};
use crate::model::{sequence_set, Instant, Interp, Sequence, Temporal};
use crate::time::Timestamp;
use crate::value::BaseValue;

/// How a binary lift treats segment interiors.
pub struct LiftOptions<A, B> {
    /// Reports the interior instant, if any, at which each synchronized
    /// segment must be split.
    pub resolver: Option<SegmentResolver<A, B>>,
    /// Cap the result at step interpolation even for continuous output
    /// types. Set by comparisons and predicates.
    pub forced_step: bool,
    /// The lifted function jumps at operand crossings; produce step
    /// pieces split there instead of sampling grid instants only.
    pub discontinuous: bool,
}

impl<A, B> Default for LiftOptions<A, B> {
    fn default() -> Self {
        Self {
            resolver: None,
            forced_step: false,
            discontinuous: false,
        }
    }
}

/// [`LiftOptions`] for a lift against a constant operand.
pub struct LiftValueOptions<A, B> {
    pub resolver: Option<ValueResolver<A, B>>,
    pub forced_step: bool,
    pub discontinuous: bool,
}

impl<A, B> Default for LiftValueOptions<A, B> {
    fn default() -> Self {
        Self {
            resolver: None,
            forced_step: false,
            discontinuous: false,
        }
    }
}

/// Apply `f` to every defined value of `temp`, preserving its shape.
pub fn lift_unary<A, R, F>(temp: &Temporal<A>, f: &F) -> Result<Temporal<R>>
where
    A: BaseValue,
    R: BaseValue,
    F: Fn(&A) -> Result<R>,
{
    match temp {
        Temporal::Instant(inst) => Ok(Temporal::Instant(inst.with_value(f(inst.value())?))),
        Temporal::Sequence(seq) => Ok(Temporal::Sequence(lift_unary_seq(seq, f)?)),
        Temporal::SequenceSet(set) => {
            let mut out = Vec::with_capacity(set.num_sequences());
            for seq in set.sequences() {
                out.push(lift_unary_seq(seq, f)?);
            }
            assemble(out)
        }
    }
}

fn lift_unary_seq<A, R, F>(seq: &Sequence<A>, f: &F) -> Result<Sequence<R>>
where
    A: BaseValue,
    R: BaseValue,
    F: Fn(&A) -> Result<R>,
{
    let mut out = Vec::with_capacity(seq.num_instants());
    for inst in seq.instants() {
        out.push(inst.with_value(f(inst.value())?));
    }
    let interp = if R::CONTINUOUS {
        seq.interp()
    } else {
        seq.interp().dominant(Interp::Step)
    };
    Sequence::new(out, interp, seq.period().lower_inc(), seq.period().upper_inc())
}

/// Apply `f` between every defined value of `temp` and a constant. The
/// result covers the operand's whole domain.
pub fn lift_with_value<A, B, R, F>(
    temp: &Temporal<A>,
    value: &B,
    f: &F,
    opts: &LiftValueOptions<A, B>,
) -> Result<Temporal<R>>
where
    A: BaseValue,
    B: BaseValue,
    R: BaseValue,
    F: Fn(&A, &B) -> Result<R>,
{
    match temp {
        Temporal::Instant(inst) => {
            Ok(Temporal::Instant(inst.with_value(f(inst.value(), value)?)))
        }
        Temporal::Sequence(seq) if seq.interp() == Interp::Discrete => {
            let mut out = Vec::with_capacity(seq.num_instants());
            for inst in seq.instants() {
                out.push(inst.with_value(f(inst.value(), value)?));
            }
            Ok(Temporal::Sequence(Sequence::new_raw(
                out,
                Interp::Discrete,
                true,
                true,
            )?))
        }
        _ => {
            let mut pieces = Vec::new();
            for seq in temp.as_sequences() {
                pieces.extend(lift_value_seq(&seq, value, f, opts)?);
            }
            assemble(pieces)
        }
    }
}

fn lift_value_seq<A, B, R, F>(
    seq: &Sequence<A>,
    value: &B,
    f: &F,
    opts: &LiftValueOptions<A, B>,
) -> Result<Vec<Sequence<R>>>
where
    A: BaseValue,
    B: BaseValue,
    R: BaseValue,
    F: Fn(&A, &B) -> Result<R>,
{
    let instants = seq.instants();
    let linear = seq.interp() == Interp::Linear;
    let grid: Vec<Timestamp> = instants.iter().map(Instant::timestamp).collect();
    let mut eval = |i: usize, t: Timestamp| -> Result<R> {
        // The final grid index names no segment; its instant carries the
        // exact value there.
        let a = if i + 1 < instants.len() {
            instants[i].segment_value_at(&instants[i + 1], linear, t)
        } else {
            instants[i].value().clone()
        };
        f(&a, value)
    };
    let mut crossing = |i: usize| -> Option<Timestamp> {
        let res = opts.resolver?;
        let a1 = instants[i].value();
        let a2 = if linear {
            instants[i + 1].value()
        } else {
            instants[i].value()
        };
        res(a1, a2, value, grid[i], grid[i + 1])
    };
    lift_segments(
        &grid,
        seq.period().lower_inc(),
        seq.period().upper_inc(),
        seq.interp(),
        linear,
        opts.forced_step,
        opts.discontinuous,
        &mut eval,
        &mut crossing,
    )
}

/// Apply `f` between two temporal operands over the intersection of
/// their domains. `None` when the domains are disjoint.
pub fn lift_binary<A, B, R, F>(
    lhs: &Temporal<A>,
    rhs: &Temporal<B>,
    f: &F,
    opts: &LiftOptions<A, B>,
) -> Result<Option<Temporal<R>>>
where
    A: BaseValue,
    B: BaseValue,
    R: BaseValue,
    F: Fn(&A, &B) -> Result<R>,
{
    let seqs1 = lhs.as_sequences();
    let seqs2 = rhs.as_sequences();

    if lhs.interp() == Interp::Discrete || rhs.interp() == Interp::Discrete {
        // Pointwise evaluation over the common defined timestamps.
        let mut out: Vec<Instant<R>> = Vec::new();
        for s1 in &seqs1 {
            for s2 in &seqs2 {
                let Some((a, b)) = synchronize(s1, s2) else {
                    continue;
                };
                for (ia, ib) in a.instants().iter().zip(b.instants()) {
                    out.push(ia.with_value(f(ia.value(), ib.value())?));
                }
            }
        }
        if out.is_empty() {
            return Ok(None);
        }
        out.sort_by_key(Instant::timestamp);
        if out.len() == 1 {
            let inst = out.remove(0);
            return Ok(Some(Temporal::Instant(inst)));
        }
        let seq = Sequence::new_raw(out, Interp::Discrete, true, true)?;
        return Ok(Some(Temporal::Sequence(seq)));
    }

    let mut pieces: Vec<Sequence<R>> = Vec::new();
    for s1 in &seqs1 {
        for s2 in &seqs2 {
            let Some((a, b)) = synchronize(s1, s2) else {
                continue;
            };
            pieces.extend(lift_pair(&a, &b, f, opts)?);
        }
    }
    if pieces.is_empty() {
        return Ok(None);
    }
    pieces.sort_by_key(|seq| seq.period().lower());
    assemble(pieces).map(Some)
}

fn lift_pair<A, B, R, F>(
    s1: &Sequence<A>,
    s2: &Sequence<B>,
    f: &F,
    opts: &LiftOptions<A, B>,
) -> Result<Vec<Sequence<R>>>
where
    A: BaseValue,
    B: BaseValue,
    R: BaseValue,
    F: Fn(&A, &B) -> Result<R>,
{
    let i1 = s1.instants();
    let i2 = s2.instants();
    let lin1 = s1.interp() == Interp::Linear;
    let lin2 = s2.interp() == Interp::Linear;
    let grid: Vec<Timestamp> = i1.iter().map(Instant::timestamp).collect();
    let mut eval = |i: usize, t: Timestamp| -> Result<R> {
        // The final grid index names no segment; both instants carry the
        // exact values there.
        let (a, b) = if i + 1 < i1.len() {
            (
                i1[i].segment_value_at(&i1[i + 1], lin1, t),
                i2[i].segment_value_at(&i2[i + 1], lin2, t),
            )
        } else {
            (i1[i].value().clone(), i2[i].value().clone())
        };
        f(&a, &b)
    };
    let mut crossing = |i: usize| -> Option<Timestamp> {
        let res = opts.resolver?;
        let a2 = if lin1 { i1[i + 1].value() } else { i1[i].value() };
        let b2 = if lin2 { i2[i + 1].value() } else { i2[i].value() };
        res(i1[i].value(), a2, i2[i].value(), b2, grid[i], grid[i + 1])
    };
    lift_segments(
        &grid,
        s1.period().lower_inc(),
        s1.period().upper_inc(),
        s1.interp().dominant(s2.interp()),
        lin1 || lin2,
        opts.forced_step,
        opts.discontinuous,
        &mut eval,
        &mut crossing,
    )
}

/// The shared segment walk behind both lift flavors. `eval` samples the
/// lifted function anywhere inside segment `i` (bounds included);
/// `crossing` reports the split instant of segment `i`, strictly interior
/// by the resolver contract.
#[allow(clippy::too_many_arguments)]
fn lift_segments<R, E, C>(
    grid: &[Timestamp],
    lower_inc: bool,
    upper_inc: bool,
    dominant: Interp,
    any_linear: bool,
    forced_step: bool,
    discontinuous: bool,
    eval: &mut E,
    crossing: &mut C,
) -> Result<Vec<Sequence<R>>>
where
    R: BaseValue,
    E: FnMut(usize, Timestamp) -> Result<R>,
    C: FnMut(usize) -> Option<Timestamp>,
{
    let step_result = forced_step || !R::CONTINUOUS;
    let result_interp = if step_result { Interp::Step } else { dominant };

    if grid.len() == 1 {
        let value = eval(0, grid[0])?;
        return Ok(vec![Sequence::from_instant(
            Instant::new(value, grid[0]),
            result_interp,
        )]);
    }

    if discontinuous && step_result && any_linear {
        return discontinuous_pieces(grid, lower_inc, upper_inc, eval, crossing);
    }

    let mut out: Vec<Instant<R>> = Vec::with_capacity(grid.len());
    for i in 0..grid.len() {
        out.push(Instant::new(eval(i, grid[i])?, grid[i]));
        if i + 1 < grid.len() && any_linear {
            if let Some(tc) = crossing(i) {
                out.push(Instant::new(eval(i, tc)?, tc));
            }
        }
    }
    Ok(vec![Sequence::new(out, result_interp, lower_inc, upper_inc)?])
}

/// Step pieces for a discontinuous lift over linear operands.
///
/// Each segment carries one value on its open interior (sampled at the
/// midpoint) and exact values at its bounds; a reported crossing splits
/// the segment in two. Pieces close with an exclusive bound where the
/// interior value ends, and a boundary value differing from both sides
/// becomes an instantaneous piece of its own. Adjacent pieces that agree
/// are merged at assembly.
fn discontinuous_pieces<R, E, C>(
    grid: &[Timestamp],
    lower_inc: bool,
    upper_inc: bool,
    eval: &mut E,
    crossing: &mut C,
) -> Result<Vec<Sequence<R>>>
where
    R: BaseValue,
    E: FnMut(usize, Timestamp) -> Result<R>,
    C: FnMut(usize) -> Option<Timestamp>,
{
    // Sub-segments after crossing insertion: (start, end, grid segment).
    // Most lifts split only a handful of segments.
    let mut intervals: SmallVec<[(Timestamp, Timestamp, usize); 8]> = SmallVec::new();
    for i in 0..grid.len() - 1 {
        match crossing(i) {
            Some(tc) => {
                intervals.push((grid[i], tc, i));
                intervals.push((tc, grid[i + 1], i));
            }
            None => intervals.push((grid[i], grid[i + 1], i)),
        }
    }

    let mut pieces: Vec<Sequence<R>> = Vec::new();
    let mut current: Vec<Instant<R>> = Vec::new();
    let mut cur_lower = lower_inc;
    let mut open_val: Option<R> = None;

    for &(u, v, seg) in &intervals {
        let exact = eval(seg, u)?;
        let open = eval(seg, Timestamp::at_fraction(u, v, 0.5))?;
        match open_val.take() {
            None => {
                // Domain start.
                if exact == open {
                    current.push(Instant::new(exact, u));
                } else {
                    if lower_inc {
                        pieces.push(Sequence::from_instant(
                            Instant::new(exact, u),
                            Interp::Step,
                        ));
                    }
                    current.push(Instant::new(open.clone(), u));
                    cur_lower = false;
                }
            }
            Some(prev_open) => {
                if prev_open == exact && exact == open {
                    // Value unchanged through the boundary.
                } else if prev_open == exact {
                    // Boundary belongs to the closing piece.
                    current.push(Instant::new(exact, u));
                    pieces.push(Sequence::new(
                        mem::take(&mut current),
                        Interp::Step,
                        cur_lower,
                        true,
                    )?);
                    current.push(Instant::new(open.clone(), u));
                    cur_lower = false;
                } else if exact == open {
                    // Boundary belongs to the opening piece.
                    current.push(Instant::new(prev_open, u));
                    pieces.push(Sequence::new(
                        mem::take(&mut current),
                        Interp::Step,
                        cur_lower,
                        false,
                    )?);
                    current.push(Instant::new(exact, u));
                    cur_lower = true;
                } else {
                    // The boundary value stands alone.
                    current.push(Instant::new(prev_open, u));
                    pieces.push(Sequence::new(
                        mem::take(&mut current),
                        Interp::Step,
                        cur_lower,
                        false,
                    )?);
                    pieces.push(Sequence::from_instant(Instant::new(exact, u), Interp::Step));
                    current.push(Instant::new(open.clone(), u));
                    cur_lower = false;
                }
            }
        }
        open_val = Some(open);
    }

    // Domain end.
    let last = grid[grid.len() - 1];
    let exact = eval(grid.len() - 2, last)?;
    match open_val {
        Some(prev_open) if prev_open == exact => {
            current.push(Instant::new(exact, last));
            pieces.push(Sequence::new(current, Interp::Step, cur_lower, upper_inc)?);
        }
        Some(prev_open) => {
            current.push(Instant::new(prev_open, last));
            pieces.push(Sequence::new(current, Interp::Step, cur_lower, false)?);
            if upper_inc {
                pieces.push(Sequence::from_instant(Instant::new(exact, last), Interp::Step));
            }
        }
        None => {
            // Unreachable: grid.len() >= 2 yields at least one interval.
            pieces.push(Sequence::from_instant(Instant::new(exact, last), Interp::Step));
        }
    }
    Ok(pieces)
}

/// Merge touching pieces and collapse to the simplest temporal shape.
fn assemble<R: BaseValue>(pieces: Vec<Sequence<R>>) -> Result<Temporal<R>> {
    let merged = sequence_set::merge_adjacent(pieces);
    Temporal::from_sequences(merged).ok_or_else(|| {
        TemporalError::InvalidArgument("lifting produced no result pieces".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::turning;

    fn inst(v: f64, secs: i64) -> Instant<f64> {
        Instant::new(v, Timestamp::from_secs(secs))
    }

    fn linear(points: &[(f64, i64)]) -> Temporal<f64> {
        let instants: Vec<_> = points.iter().map(|&(v, s)| inst(v, s)).collect();
        Temporal::Sequence(Sequence::new(instants, Interp::Linear, true, true).unwrap())
    }

    #[test]
    fn test_unary_preserves_shape() {
        let temp = linear(&[(1.0, 0), (3.0, 10)]);
        let negated = lift_unary(&temp, &|v: &f64| Ok(-v)).unwrap();
        assert_eq!(negated.value_at(Timestamp::from_secs(5)).unwrap(), -2.0);
        assert_eq!(negated.interp(), Interp::Linear);
    }

    #[test]
    fn test_identity_lift() {
        let temp = linear(&[(1.0, 0), (3.0, 10), (2.0, 20)]);
        let same = lift_unary(&temp, &|v: &f64| Ok(*v)).unwrap();
        assert_eq!(same, temp);
    }

    #[test]
    fn test_binary_addition_needs_no_turning() {
        let a = linear(&[(2.0, 0), (4.0, 10)]);
        let b = linear(&[(3.0, 0), (1.0, 10)]);
        let sum = lift_binary(&a, &b, &|x: &f64, y: &f64| Ok(x + y), &LiftOptions::default())
            .unwrap()
            .unwrap();
        // 2+3 = 4+1 = 5: the sum is constant and normalizes.
        assert_eq!(sum.value_at(Timestamp::from_secs(5)).unwrap(), 5.0);
        assert_eq!(sum.num_instants(), 2);
    }

    #[test]
    fn test_endpoints_sampled_exactly() {
        // The last grid index sits past the final segment; both lift
        // flavors must still sample it, and a step operand's closing
        // instant carries its own value there, not the segment's left one.
        let a = linear(&[(2.0, 0), (4.0, 10)]);
        let b = linear(&[(1.0, 0), (3.0, 10)]);
        let sum = lift_binary(&a, &b, &|x: &f64, y: &f64| Ok(x + y), &LiftOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(sum.value_at(Timestamp::from_secs(0)).unwrap(), 3.0);
        assert_eq!(sum.value_at(Timestamp::from_secs(10)).unwrap(), 7.0);

        let step = Temporal::Sequence(
            Sequence::new(
                vec![inst(1.0, 0), inst(5.0, 10)],
                Interp::Step,
                true,
                true,
            )
            .unwrap(),
        );
        let shifted =
            lift_with_value(&step, &10.0, &|x: &f64, k: &f64| Ok(x + k), &LiftValueOptions::default())
                .unwrap();
        assert_eq!(shifted.value_at(Timestamp::from_secs(10)).unwrap(), 15.0);
    }

    #[test]
    fn test_binary_product_turning_point() {
        let a = linear(&[(2.0, 0), (4.0, 10)]);
        let b = linear(&[(3.0, 0), (1.0, 10)]);
        let opts = LiftOptions {
            resolver: Some(turning::number_arith_extremum),
            ..Default::default()
        };
        let product = lift_binary(&a, &b, &|x: &f64, y: &f64| Ok(x * y), &opts)
            .unwrap()
            .unwrap();
        // Vertex of (2 + 0.2t)(3 - 0.2t) at t = 2.5s; grid sampling alone
        // would interpolate 6 -> 4 linearly and miss it.
        assert_eq!(product.num_instants(), 3);
        let at_vertex = product.value_at(Timestamp::from_millis(2_500)).unwrap();
        let exact = (2.0 + 0.2 * 2.5) * (3.0 - 0.2 * 2.5);
        assert!((at_vertex - exact).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_operands_empty() {
        let a = linear(&[(1.0, 0), (2.0, 10)]);
        let b = linear(&[(1.0, 20), (2.0, 30)]);
        let out = lift_binary(&a, &b, &|x: &f64, y: &f64| Ok(x + y), &LiftOptions::default())
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_discontinuous_comparison_splits() {
        // a rises 2 -> 4, b falls 3 -> 1: a < b holds before 2.5s only.
        let a = linear(&[(2.0, 0), (4.0, 10)]);
        let b = linear(&[(3.0, 0), (1.0, 10)]);
        let opts = LiftOptions {
            resolver: Some(turning::number_crossing),
            forced_step: true,
            discontinuous: true,
        };
        let lt = lift_binary(&a, &b, &|x: &f64, y: &f64| Ok(x < y), &opts)
            .unwrap()
            .unwrap();
        assert_eq!(
            lt.value_at(Timestamp::from_secs(1)).unwrap(),
            true
        );
        assert_eq!(
            lt.value_at(Timestamp::from_secs(5)).unwrap(),
            false
        );
        // The crossing itself: equality, so strictly-less is false.
        assert_eq!(
            lt.value_at(Timestamp::from_millis(2_500)).unwrap(),
            false
        );
        assert_eq!(lt.interp(), Interp::Step);
    }

    #[test]
    fn test_discrete_operand_pointwise() {
        let disc = Temporal::Sequence(
            Sequence::new(
                vec![inst(1.0, 0), inst(2.0, 5), inst(3.0, 20)],
                Interp::Discrete,
                true,
                true,
            )
            .unwrap(),
        );
        let cont = linear(&[(10.0, 0), (20.0, 10)]);
        let sum = lift_binary(&disc, &cont, &|x: &f64, y: &f64| Ok(x + y), &LiftOptions::default())
            .unwrap()
            .unwrap();
        // Only the discrete instants inside the continuous domain survive.
        assert_eq!(sum.num_instants(), 2);
        assert_eq!(sum.interp(), Interp::Discrete);
        assert_eq!(sum.value_at(Timestamp::from_secs(5)).unwrap(), 17.0);
    }

    #[test]
    fn test_lift_with_value() {
        let a = linear(&[(2.0, 0), (4.0, 10)]);
        let scaled = lift_with_value(
            &a,
            &10.0,
            &|x: &f64, k: &f64| Ok(x * k),
            &LiftValueOptions::default(),
        )
        .unwrap();
        assert_eq!(scaled.value_at(Timestamp::from_secs(5)).unwrap(), 30.0);
    }

    #[test]
    fn test_lift_with_value_discontinuous() {
        // 0 -> 10 compared against 5: flips at 5s.
        let a = linear(&[(0.0, 0), (10.0, 10)]);
        let opts = LiftValueOptions {
            resolver: Some(turning::number_value_crossing),
            forced_step: true,
            discontinuous: true,
        };
        let ne = lift_with_value(&a, &5.0, &|x: &f64, k: &f64| Ok(x != k), &opts).unwrap();
        assert_eq!(ne.value_at(Timestamp::from_secs(2)).unwrap(), true);
        assert_eq!(ne.value_at(Timestamp::from_secs(5)).unwrap(), false);
        assert_eq!(ne.value_at(Timestamp::from_secs(8)).unwrap(), true);
        // Three pieces: true before, the instantaneous equality, true after.
        match ne {
            Temporal::SequenceSet(set) => assert_eq!(set.num_sequences(), 3),
            other => panic!("expected a sequence set, got {other:?}"),
        }
    }

    #[test]
    fn test_error_propagates() {
        let a = linear(&[(1.0, 0), (2.0, 10)]);
        let out = lift_unary::<f64, f64, _>(&a, &|_| {
            Err(TemporalError::NumericOverflow("boom".to_string()))
        });
        assert!(matches!(out, Err(TemporalError::NumericOverflow(_))));
    }
}
