use rdf_rewrite_algebra::expr::{Expression, ExpressionTransformer};
use rdf_rewrite_algebra::patterns::{MatchPattern, PatternItem, TriplePattern};
use rdf_rewrite_algebra::Algebra;
use rdf_rewrite_common::error::{RewriteError, RewriteResult};
use rdf_rewrite_model::{NamedNodePattern, Term, Variable};
use std::sync::Arc;

/// What a [VariableSubstitutionTransformer] puts in place of the replaced variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Substitute {
    Variable(Variable),
    Term(Term),
}

impl Substitute {
    fn as_pattern_item(&self) -> PatternItem {
        match self {
            Substitute::Variable(variable) => PatternItem::Variable(variable.clone()),
            Substitute::Term(term) => PatternItem::Term(term.clone()),
        }
    }

    fn as_expression(&self) -> Expression {
        match self {
            Substitute::Variable(variable) => Expression::Variable(variable.clone()),
            Substitute::Term(term) => Expression::Constant(term.clone()),
        }
    }
}

/// Replaces every occurrence of a variable within an algebra tree.
///
/// The transformer refuses (by returning a [RewriteError]) to rewrite constructs in which the
/// substitution is not guaranteed to preserve the results:
/// - sub-queries, `SERVICE` clauses, property paths, property functions, and `VALUES` clauses,
/// - groupings and projections that expose the variable to an outer scope,
/// - slices, and the right-hand side of a `MINUS` that shares the variable,
/// - assignments to the variable,
/// - object positions of triple patterns, unless [Self::can_replace_objects] is set or the
///   variable also occurs in a subject or predicate position of the same basic graph pattern.
///
/// Callers treat such an error as "this rewrite is not applicable" and keep their input.
#[derive(Clone, Debug)]
pub struct VariableSubstitutionTransformer {
    find: Variable,
    replacement: Substitute,
    can_replace_objects: bool,
}

impl VariableSubstitutionTransformer {
    /// Creates a transformer that replaces `find` with `replacement`.
    ///
    /// Object positions are not replaced by default, as the variables may be bound to equal but
    /// distinct literals.
    pub fn with_variable(find: Variable, replacement: Variable) -> Self {
        Self {
            find,
            replacement: Substitute::Variable(replacement),
            can_replace_objects: false,
        }
    }

    /// Creates a transformer that replaces `find` with the constant `replacement`.
    pub fn with_term(find: Variable, replacement: Term) -> Self {
        Self {
            find,
            replacement: Substitute::Term(replacement),
            can_replace_objects: true,
        }
    }

    #[must_use]
    pub fn with_can_replace_objects(mut self, can_replace_objects: bool) -> Self {
        self.can_replace_objects = can_replace_objects;
        self
    }

    pub fn find(&self) -> &Variable {
        &self.find
    }

    pub fn replacement(&self) -> &Substitute {
        &self.replacement
    }

    pub fn can_replace_objects(&self) -> bool {
        self.can_replace_objects
    }

    /// Substitutes the variable in `algebra`.
    pub fn transform_algebra(&self, algebra: Algebra) -> RewriteResult<Algebra> {
        Ok(match algebra {
            Algebra::Bgp { patterns } => Algebra::Bgp {
                patterns: self.transform_patterns(patterns)?,
            },
            Algebra::LazyBgp {
                patterns,
                required_results,
            } => Algebra::LazyBgp {
                patterns: self.transform_patterns(patterns)?,
                required_results,
            },
            Algebra::AskBgp { patterns } => Algebra::AskBgp {
                patterns: self.transform_patterns(patterns)?,
            },
            Algebra::Null { variables } => Algebra::Null {
                variables: self.transform_variable_list(variables),
            },
            Algebra::Values { variables, .. } if variables.contains(&self.find) => {
                return Err(RewriteError::Values)
            }
            values @ Algebra::Values { .. } => values,
            Algebra::SubQuery { .. } => return Err(RewriteError::SubQuery),
            Algebra::Service { .. } => return Err(RewriteError::Service),
            Algebra::PropertyPath(_) => return Err(RewriteError::PropertyPath),
            Algebra::PropertyFunction { .. } => return Err(RewriteError::PropertyFunction),
            Algebra::Filter { inner, expression } => Algebra::Filter {
                inner: self.transform_child(inner)?,
                expression: self.transform(expression)?,
            },
            Algebra::IdentityFilter {
                inner,
                variable,
                term,
            } => self.transform_identity_filter(inner, variable, term, false)?,
            Algebra::SameTermFilter {
                inner,
                variable,
                term,
            } => self.transform_identity_filter(inner, variable, term, true)?,
            Algebra::Extend { variable, .. } if variable == self.find => {
                return Err(RewriteError::AssignmentTarget(variable))
            }
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => Algebra::Extend {
                inner: self.transform_child(inner)?,
                variable,
                expression: self.transform(expression)?,
            },
            Algebra::Select {
                inner,
                variables,
                select_all: true,
            } => Algebra::Select {
                inner: self.transform_child(inner)?,
                variables: self.transform_variable_list(variables),
                select_all: true,
            },
            Algebra::Select { variables, .. } if variables.contains(&self.find) => {
                return Err(RewriteError::Projection(self.find.clone()))
            }
            // The variable is not visible within a projection that does not contain it.
            select @ Algebra::Select { .. } => select,
            Algebra::Distinct { inner } => Algebra::Distinct {
                inner: self.transform_child(inner)?,
            },
            Algebra::Reduced { inner } => Algebra::Reduced {
                inner: self.transform_child(inner)?,
            },
            Algebra::OrderBy { inner, ordering } => Algebra::OrderBy {
                inner: self.transform_child(inner)?,
                ordering: ordering
                    .into_iter()
                    .map(|ordering| self.transform_order(ordering))
                    .collect::<RewriteResult<_>>()?,
            },
            // A filter above a slice applies to the selected solutions only.
            Algebra::Slice { .. } => return Err(RewriteError::Slice),
            Algebra::Graph { inner, name } => Algebra::Graph {
                name: self.transform_graph_name(name)?,
                inner: self.transform_child(inner)?,
            },
            Algebra::Group {
                inner,
                variables,
                aggregates,
            } => {
                if variables.contains(&self.find) || inner.variables().contains(&self.find) {
                    return Err(RewriteError::Group(self.find.clone()));
                }
                Algebra::Group {
                    inner,
                    variables,
                    aggregates,
                }
            }
            Algebra::Having { inner, expression } => Algebra::Having {
                inner: self.transform_child(inner)?,
                expression: self.transform(expression)?,
            },
            Algebra::Join { lhs, rhs } => Algebra::Join {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
            },
            Algebra::LeftJoin { lhs, rhs, filter } => Algebra::LeftJoin {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
                filter: filter
                    .map(|filter| self.transform(filter))
                    .transpose()?,
            },
            Algebra::Union { lhs, rhs } => Algebra::Union {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
            },
            // Substituting into the right-hand side would remove the shared variable that decides
            // which solutions are removed.
            Algebra::Minus { rhs, .. } if rhs.variables().contains(&self.find) => {
                return Err(RewriteError::Minus(self.find.clone()))
            }
            Algebra::Minus { lhs, rhs } => Algebra::Minus {
                lhs: self.transform_child(lhs)?,
                rhs,
            },
            Algebra::ParallelJoin { lhs, rhs } => Algebra::ParallelJoin {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
            },
            Algebra::ParallelUnion { lhs, rhs } => Algebra::ParallelUnion {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
            },
            Algebra::LazyUnion {
                lhs,
                rhs,
                required_results,
            } => Algebra::LazyUnion {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
                required_results,
            },
            Algebra::AskUnion { lhs, rhs } => Algebra::AskUnion {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
            },
            Algebra::FilteredProduct {
                lhs,
                rhs,
                expression,
            } => Algebra::FilteredProduct {
                lhs: self.transform_child(lhs)?,
                rhs: self.transform_child(rhs)?,
                expression: self.transform(expression)?,
            },
        })
    }

    fn transform_child(&self, child: Arc<Algebra>) -> RewriteResult<Arc<Algebra>> {
        self.transform_algebra(Arc::unwrap_or_clone(child))
            .map(Arc::new)
    }

    fn transform_patterns(&self, patterns: Vec<TriplePattern>) -> RewriteResult<Vec<TriplePattern>> {
        // An occurrence in a subject or predicate position restricts the variable to IRIs and
        // blank nodes within this pattern. Equality of such terms is term identity.
        let restricted_to_resources = patterns.iter().any(|pattern| {
            pattern.as_match().is_some_and(|pattern| {
                pattern.subject.is_variable(&self.find) || pattern.predicate.is_variable(&self.find)
            })
        });
        let can_replace_objects = self.can_replace_objects || restricted_to_resources;

        patterns
            .into_iter()
            .map(|pattern| self.transform_pattern(pattern, can_replace_objects))
            .collect()
    }

    fn transform_pattern(
        &self,
        pattern: TriplePattern,
        can_replace_objects: bool,
    ) -> RewriteResult<TriplePattern> {
        Ok(match pattern {
            TriplePattern::Match(pattern) => {
                if pattern.object.is_variable(&self.find) && !can_replace_objects {
                    return Err(RewriteError::ObjectPosition(self.find.clone()));
                }
                TriplePattern::Match(MatchPattern {
                    subject: self.transform_item(pattern.subject),
                    predicate: self.transform_item(pattern.predicate),
                    object: self.transform_item(pattern.object),
                })
            }
            TriplePattern::Filter(expression) => TriplePattern::Filter(self.transform(expression)?),
            TriplePattern::BindAssignment { variable, .. }
            | TriplePattern::LetAssignment { variable, .. }
                if variable == self.find =>
            {
                return Err(RewriteError::AssignmentTarget(variable))
            }
            TriplePattern::BindAssignment {
                variable,
                expression,
            } => TriplePattern::BindAssignment {
                variable,
                expression: self.transform(expression)?,
            },
            TriplePattern::LetAssignment {
                variable,
                expression,
            } => TriplePattern::LetAssignment {
                variable,
                expression: self.transform(expression)?,
            },
            TriplePattern::SubQuery(_) => return Err(RewriteError::SubQuery),
            TriplePattern::Path(_) => return Err(RewriteError::PropertyPath),
            TriplePattern::PropertyFunction(_) => return Err(RewriteError::PropertyFunction),
        })
    }

    fn transform_item(&self, item: PatternItem) -> PatternItem {
        if item.is_variable(&self.find) {
            self.replacement.as_pattern_item()
        } else {
            item
        }
    }

    fn transform_variable_list(&self, variables: Vec<Variable>) -> Vec<Variable> {
        variables
            .into_iter()
            .filter_map(|variable| {
                if variable != self.find {
                    return Some(variable);
                }
                match &self.replacement {
                    Substitute::Variable(replacement) => Some(replacement.clone()),
                    Substitute::Term(_) => None,
                }
            })
            .collect()
    }

    fn transform_graph_name(&self, name: NamedNodePattern) -> RewriteResult<NamedNodePattern> {
        match name {
            NamedNodePattern::Variable(variable) if variable == self.find => {
                match &self.replacement {
                    Substitute::Term(Term::NamedNode(node)) => {
                        Ok(NamedNodePattern::NamedNode(node.clone()))
                    }
                    Substitute::Term(term) => Err(RewriteError::InvalidGraphName(term.clone())),
                    Substitute::Variable(_) => Err(RewriteError::GraphVariable(variable)),
                }
            }
            name => Ok(name),
        }
    }

    fn transform_identity_filter(
        &self,
        inner: Arc<Algebra>,
        variable: Variable,
        term: Expression,
        same_term: bool,
    ) -> RewriteResult<Algebra> {
        let inner = self.transform_child(inner)?;
        let term = self.transform(term)?;

        if variable != self.find {
            return Ok(if same_term {
                Algebra::SameTermFilter {
                    inner,
                    variable,
                    term,
                }
            } else {
                Algebra::IdentityFilter {
                    inner,
                    variable,
                    term,
                }
            });
        }

        Ok(match (&self.replacement, same_term) {
            (Substitute::Variable(replacement), false) => Algebra::IdentityFilter {
                inner,
                variable: replacement.clone(),
                term,
            },
            (Substitute::Variable(replacement), true) => Algebra::SameTermFilter {
                inner,
                variable: replacement.clone(),
                term,
            },
            (Substitute::Term(_), false) => Algebra::Filter {
                inner,
                expression: Expression::equal(self.replacement.as_expression(), term),
            },
            (Substitute::Term(_), true) => Algebra::Filter {
                inner,
                expression: Expression::same_term(self.replacement.as_expression(), term),
            },
        })
    }
}

impl ExpressionTransformer for VariableSubstitutionTransformer {
    type Error = RewriteError;

    fn transform_primary(&self, expression: Expression) -> RewriteResult<Expression> {
        Ok(match expression {
            Expression::Variable(variable) if variable == self.find => {
                self.replacement.as_expression()
            }
            Expression::Bound(variable) if variable == self.find => match &self.replacement {
                Substitute::Variable(replacement) => Expression::Bound(replacement.clone()),
                Substitute::Term(_) => Expression::from(true),
            },
            Expression::Exists(pattern) => Expression::Exists(Arc::new(
                self.transform_algebra(Arc::unwrap_or_clone(pattern))?,
            )),
            expression => expression,
        })
    }
}
