use std::cell::Cell;

use redund_traits::DecisionFunction;

use crate::error::SimError;

/// What a faulty replica does to its call when the fault fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    /// Every numeric output element reads `value`.
    StuckAt(f64),
    /// Every numeric output element is shifted by `delta`.
    Offset(f64),
    /// Uniform noise in `[-amplitude, amplitude]`, reproducible from `seed`.
    Noise { amplitude: f64, seed: u32 },
    /// The call fails.
    Crash,
    /// The call fails as if it never returned.
    Timeout,
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::StuckAt(v) => write!(f, "stuck-at({v})"),
            Fault::Offset(d) => write!(f, "offset({d:+})"),
            Fault::Noise { amplitude, .. } => write!(f, "noise(±{amplitude})"),
            Fault::Crash => f.write_str("crash"),
            Fault::Timeout => f.write_str("timeout"),
        }
    }
}

/// Which calls (1-based) the fault fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    #[default]
    Always,
    /// Transient: only the first `n` calls.
    FirstN(u32),
    /// Intermittent: calls `n`, `2n`, ...
    EveryNth(u32),
}

impl Schedule {
    pub fn fires(self, call: u32) -> bool {
        match self {
            Schedule::Always => true,
            Schedule::FirstN(n) => call <= n,
            Schedule::EveryNth(0) => false,
            Schedule::EveryNth(n) => call % n == 0,
        }
    }
}

/// Outputs whose numeric content a fault can corrupt.
pub trait Perturb: Sized {
    fn map_values<F: FnMut(f64) -> f64>(self, f: &mut F) -> Self;
}

impl Perturb for f64 {
    fn map_values<F: FnMut(f64) -> f64>(self, f: &mut F) -> Self {
        f(self)
    }
}

impl Perturb for usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn map_values<F: FnMut(f64) -> f64>(self, f: &mut F) -> Self {
        let v = f(self as f64).round();
        if v.is_finite() && v > 0.0 { v as usize } else { 0 }
    }
}

impl<T: Perturb> Perturb for Vec<T> {
    fn map_values<F: FnMut(f64) -> f64>(self, f: &mut F) -> Self {
        self.into_iter().map(|x| x.map_values(f)).collect()
    }
}

/// Wraps a decision function and injects `fault` on the calls picked by `schedule`.
pub struct FaultyReplica<D> {
    name: String,
    inner: D,
    fault: Fault,
    schedule: Schedule,
    calls: Cell<u32>,
    rng: Cell<u32>,
}

impl<D> FaultyReplica<D> {
    pub fn new(name: impl Into<String>, inner: D, fault: Fault) -> Self {
        let seed = match fault {
            Fault::Noise { seed, .. } => seed.max(1),
            _ => 1,
        };
        Self {
            name: name.into(),
            inner,
            fault,
            schedule: Schedule::Always,
            calls: Cell::new(0),
            rng: Cell::new(seed),
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn fault(&self) -> Fault {
        self.fault
    }

    /// Calls made so far, faulty or not.
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    // xorshift32
    fn next_unit(&self) -> f64 {
        let mut x = self.rng.get();
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng.set(x);
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    }
}

impl<I, D> DecisionFunction<I> for FaultyReplica<D>
where
    I: ?Sized,
    D: DecisionFunction<I>,
    D::Output: Perturb,
{
    type Output = D::Output;

    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, input: &I) -> Result<D::Output, Box<dyn std::error::Error + Send + Sync>> {
        let call = self.calls.get().saturating_add(1);
        self.calls.set(call);
        if !self.schedule.fires(call) {
            return self.inner.decide(input);
        }
        tracing::debug!(replica = %self.name, call, fault = %self.fault, "fault injected");
        let name = self.name.clone();
        match self.fault {
            Fault::Crash => Err(Box::new(SimError::Crash { name, call })),
            Fault::Timeout => Err(Box::new(SimError::Timeout { name, call })),
            Fault::StuckAt(v) => Ok(self.inner.decide(input)?.map_values(&mut |_| v)),
            Fault::Offset(d) => Ok(self.inner.decide(input)?.map_values(&mut |x| x + d)),
            Fault::Noise { amplitude, .. } => {
                let out = self.inner.decide(input)?;
                Ok(out.map_values(&mut |x| x + (self.next_unit() * 2.0 - 1.0) * amplitude))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redund_traits::FnDecision;
    use rstest::rstest;

    type BoxError = Box<dyn std::error::Error + Send + Sync>;

    fn identity() -> impl DecisionFunction<Vec<f64>, Output = Vec<f64>> {
        FnDecision::new("id", |v: &Vec<f64>| -> Result<Vec<f64>, BoxError> { Ok(v.clone()) })
    }

    #[rstest]
    #[case(Schedule::Always, &[true, true, true, true])]
    #[case(Schedule::FirstN(1), &[true, false, false, false])]
    #[case(Schedule::EveryNth(2), &[false, true, false, true])]
    #[case(Schedule::EveryNth(0), &[false, false, false, false])]
    fn schedules(#[case] s: Schedule, #[case] expected: &[bool]) {
        let got: Vec<bool> = (1..=4).map(|c| s.fires(c)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn stuck_at_replaces_every_value() {
        let r = FaultyReplica::new("stuck", identity(), Fault::StuckAt(100.0));
        assert_eq!(r.decide(&vec![1.0, 2.0]).unwrap(), vec![100.0, 100.0]);
    }

    #[test]
    fn transient_offset_clears_after_first_call() {
        let r = FaultyReplica::new("flaky", identity(), Fault::Offset(5.0))
            .with_schedule(Schedule::FirstN(1));
        assert_eq!(r.decide(&vec![1.0]).unwrap(), vec![6.0]);
        assert_eq!(r.decide(&vec![1.0]).unwrap(), vec![1.0]);
        assert_eq!(r.calls(), 2);
    }

    #[test]
    fn crash_is_a_typed_error() {
        let r = FaultyReplica::new("boom", identity(), Fault::Crash);
        let err = r.decide(&vec![1.0]).unwrap_err();
        let sim = err.downcast_ref::<SimError>().expect("SimError");
        assert_eq!(
            sim,
            &SimError::Crash {
                name: "boom".into(),
                call: 1
            }
        );
    }

    #[test]
    fn noise_is_bounded_and_reproducible() {
        let fault = Fault::Noise {
            amplitude: 0.5,
            seed: 7,
        };
        let a = FaultyReplica::new("n", identity(), fault);
        let b = FaultyReplica::new("n", identity(), fault);
        let input = vec![10.0; 16];
        let out_a = a.decide(&input).unwrap();
        assert_eq!(out_a, b.decide(&input).unwrap());
        assert!(out_a.iter().all(|x| (9.5..=10.5).contains(x)));
    }

    #[test]
    fn index_lists_are_perturbed_too() {
        let r = FaultyReplica::new(
            "shift",
            FnDecision::new("list", |_: &()| -> Result<Vec<usize>, BoxError> { Ok(vec![0, 2]) }),
            Fault::Offset(1.0),
        );
        assert_eq!(r.decide(&()).unwrap(), vec![1, 3]);
    }
}
