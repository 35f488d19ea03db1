//! The patterns that make up a basic graph pattern.

mod item;
mod property_function;
mod triple_pattern;

pub use item::PatternItem;
pub use property_function::PropertyFunctionPattern;
pub use triple_pattern::{MatchPattern, PathPattern, TriplePattern, TriplePatternType};

/// Returns true if none of the `patterns` refers to a blank node variable.
///
/// Blank node variables are scoped to their basic graph pattern. Rewrites that split, reorder
/// across boundaries, or virtualize a basic graph pattern must check this predicate first.
pub fn has_only_plain_variables<'a>(patterns: impl IntoIterator<Item = &'a TriplePattern>) -> bool {
    patterns
        .into_iter()
        .all(TriplePattern::has_no_blank_variables)
}
