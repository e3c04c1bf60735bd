pub mod adapter;

pub use adapter::FnDecision;

/// One independently supplied implementation of a decision.
///
/// Replicas of the same decision share this signature so they can be swapped,
/// repeated, or replaced by deliberately faulty variants.
pub trait DecisionFunction<I: ?Sized> {
    type Output;

    /// Short label used in diagnostics.
    fn name(&self) -> &str;

    fn decide(
        &self,
        input: &I,
    ) -> Result<Self::Output, Box<dyn std::error::Error + Send + Sync>>;
}

impl<I: ?Sized, D: DecisionFunction<I> + ?Sized> DecisionFunction<I> for &D {
    type Output = D::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide(
        &self,
        input: &I,
    ) -> Result<Self::Output, Box<dyn std::error::Error + Send + Sync>> {
        (**self).decide(input)
    }
}

impl<I: ?Sized, D: DecisionFunction<I> + ?Sized> DecisionFunction<I> for Box<D> {
    type Output = D::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide(
        &self,
        input: &I,
    ) -> Result<Self::Output, Box<dyn std::error::Error + Send + Sync>> {
        (**self).decide(input)
    }
}

impl<I: ?Sized, D: DecisionFunction<I> + ?Sized> DecisionFunction<I> for std::sync::Arc<D> {
    type Output = D::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide(
        &self,
        input: &I,
    ) -> Result<Self::Output, Box<dyn std::error::Error + Send + Sync>> {
        (**self).decide(input)
    }
}
