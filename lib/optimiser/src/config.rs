/// The configuration of an [OptimiserPipeline](crate::OptimiserPipeline).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptimiserConfig {
    algebra_optimisation: bool,
    unsafe_optimisation: bool,
}

impl OptimiserConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            algebra_optimisation: true,
            unsafe_optimisation: false,
        }
    }

    /// Enables or disables running the algebra optimisers at all.
    #[must_use]
    pub fn with_algebra_optimisation(mut self, enabled: bool) -> Self {
        self.algebra_optimisation = enabled;
        self
    }

    /// Enables optimisations that may change the results of queries that compare literals.
    ///
    /// Currently, this allows the implicit join optimisation to substitute variables that are
    /// compared with `=` in the object position of triple patterns. `=` compares literals by
    /// value while the substitution requires the same term.
    #[must_use]
    pub fn with_unsafe_optimisation(mut self, enabled: bool) -> Self {
        self.unsafe_optimisation = enabled;
        self
    }

    pub fn algebra_optimisation(&self) -> bool {
        self.algebra_optimisation
    }

    pub fn unsafe_optimisation(&self) -> bool {
        self.unsafe_optimisation
    }
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self::new()
    }
}
