use std::marker::PhantomData;

use crate::DecisionFunction;

/// Named closure adapter so ad-hoc variants can join a replica set.
///
/// - name(): the label given at construction
/// - decide(): calls the wrapped closure
pub struct FnDecision<F, I: ?Sized, O> {
    name: String,
    f: F,
    _sig: PhantomData<fn(&I) -> O>,
}

impl<F, I: ?Sized, O> FnDecision<F, I, O>
where
    F: Fn(&I) -> Result<O, Box<dyn std::error::Error + Send + Sync>>,
{
    #[inline]
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _sig: PhantomData,
        }
    }
}

impl<F, I: ?Sized, O> DecisionFunction<I> for FnDecision<F, I, O>
where
    F: Fn(&I) -> Result<O, Box<dyn std::error::Error + Send + Sync>>,
{
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, input: &I) -> Result<O, Box<dyn std::error::Error + Send + Sync>> {
        (self.f)(input)
    }
}
