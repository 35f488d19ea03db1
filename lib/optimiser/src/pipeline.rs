use crate::passes::{
    AskBgpOptimiser, FilteredProductOptimiser, IdentityFilterOptimiser, ImplicitJoinOptimiser,
    LazyBgpOptimiser, OrderByDistinctOptimiser, PropertyFunctionOptimiser, StrictAlgebraOptimiser,
};
use crate::reorder::QueryOptimiser;
use crate::{AlgebraOptimiser, OptimisationTarget, OptimiserConfig};
use rdf_rewrite_algebra::{Algebra, Query, UpdateCommandSet};
use rdf_rewrite_common::error::OptimiserError;
use std::sync::Arc;
use tracing::{debug, trace};

/// Returns the default optimisers in the order in which they are applied.
pub fn default_optimisers(config: &OptimiserConfig) -> Vec<Arc<dyn AlgebraOptimiser>> {
    vec![
        Arc::new(PropertyFunctionOptimiser::default()),
        Arc::new(AskBgpOptimiser::new()),
        Arc::new(LazyBgpOptimiser::new()),
        Arc::new(StrictAlgebraOptimiser::new()),
        Arc::new(OrderByDistinctOptimiser::new()),
        Arc::new(IdentityFilterOptimiser::new()),
        Arc::new(ImplicitJoinOptimiser::new(config.unsafe_optimisation())),
        Arc::new(FilteredProductOptimiser::new()),
    ]
}

/// An ordered list of [AlgebraOptimiser]s together with the [QueryOptimiser] that orders the
/// patterns of basic graph patterns.
///
/// The pipeline is configured before it is shared. Optimising an algebra only requires a shared
/// reference, so the same pipeline can be used by multiple threads.
#[derive(Clone, Debug)]
pub struct OptimiserPipeline {
    config: OptimiserConfig,
    optimisers: Vec<Arc<dyn AlgebraOptimiser>>,
    query_optimiser: QueryOptimiser,
}

impl OptimiserPipeline {
    /// Creates a pipeline with the default optimisers.
    pub fn new(config: OptimiserConfig) -> Self {
        Self {
            config,
            optimisers: default_optimisers(&config),
            query_optimiser: QueryOptimiser::default(),
        }
    }

    /// Creates a pipeline without any optimisers.
    pub fn empty(config: OptimiserConfig) -> Self {
        Self {
            config,
            optimisers: Vec::new(),
            query_optimiser: QueryOptimiser::default(),
        }
    }

    pub fn config(&self) -> &OptimiserConfig {
        &self.config
    }

    pub fn optimisers(&self) -> &[Arc<dyn AlgebraOptimiser>] {
        &self.optimisers
    }

    /// Appends `optimiser` to the pipeline.
    ///
    /// Returns an error if an optimiser with the same name is already registered.
    pub fn add_optimiser(
        &mut self,
        optimiser: Arc<dyn AlgebraOptimiser>,
    ) -> Result<(), OptimiserError> {
        if self
            .optimisers
            .iter()
            .any(|existing| existing.name() == optimiser.name())
        {
            return Err(OptimiserError::DuplicateOptimiser(
                optimiser.name().to_owned(),
            ));
        }
        self.optimisers.push(optimiser);
        Ok(())
    }

    /// Removes the optimiser called `name`. Returns false if no such optimiser is registered.
    pub fn remove_optimiser(&mut self, name: &str) -> bool {
        let count = self.optimisers.len();
        self.optimisers.retain(|optimiser| optimiser.name() != name);
        count != self.optimisers.len()
    }

    /// Restores the minimal set of optimisers: the `ASK` and `LIMIT` optimisations.
    pub fn reset_optimisers(&mut self) {
        self.optimisers = vec![
            Arc::new(AskBgpOptimiser::new()),
            Arc::new(LazyBgpOptimiser::new()),
        ];
    }

    pub fn query_optimiser(&self) -> &QueryOptimiser {
        &self.query_optimiser
    }

    pub fn set_query_optimiser(&mut self, query_optimiser: QueryOptimiser) {
        self.query_optimiser = query_optimiser;
    }

    /// Applies every applicable optimiser to `algebra` in order.
    pub fn optimise(&self, algebra: Algebra, target: OptimisationTarget<'_>) -> Algebra {
        if !self.config.algebra_optimisation() {
            trace!("Algebra optimisation is disabled");
            return algebra;
        }

        self.optimisers
            .iter()
            .fold(algebra, |algebra, optimiser| {
                let applicable = match target {
                    OptimisationTarget::Query(query) => optimiser.is_applicable(query),
                    OptimisationTarget::Update(update) => {
                        optimiser.is_applicable_to_update(update)
                    }
                    OptimisationTarget::Algebra => true,
                };
                if applicable {
                    trace!(optimiser = optimiser.name(), "Applying optimiser");
                    optimiser.optimise(algebra, target)
                } else {
                    trace!(optimiser = optimiser.name(), "Optimiser is not applicable");
                    algebra
                }
            })
    }

    /// Optimises the algebra of `query`.
    pub fn optimise_query(&self, query: &Query) -> Algebra {
        debug!(query_type = ?query.query_type(), "Optimising query");
        self.optimise(query.to_algebra(), OptimisationTarget::Query(query))
    }

    /// Optimises the patterns of every command in `update`.
    pub fn optimise_update(&self, update: &UpdateCommandSet) -> UpdateCommandSet {
        debug!(commands = update.commands().len(), "Optimising update");
        update.map_patterns(|pattern| {
            self.optimise(pattern.clone(), OptimisationTarget::Update(update))
        })
    }
}

impl Default for OptimiserPipeline {
    fn default() -> Self {
        Self::new(OptimiserConfig::default())
    }
}
