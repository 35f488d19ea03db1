use crate::algebra::Algebra;
use crate::patterns::TriplePattern;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Displays the tree with one node per line and children indented below their parent.
///
/// The alternate form (`{:#}`) displays the tree on a single line.
impl Display for Algebra {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            self.fmt_compact(f)
        } else {
            self.fmt_indent(f, 0)
        }
    }
}

impl Algebra {
    fn fmt_indent(&self, f: &mut Formatter<'_>, indent: usize) -> std::fmt::Result {
        write!(f, "{:width$}", "", width = indent * 2)?;
        self.fmt_header(f)?;
        if let Algebra::SubQuery { query } = self {
            writeln!(f)?;
            query.to_algebra().fmt_indent(f, indent + 1)?;
        }
        for child in self.children() {
            writeln!(f)?;
            child.fmt_indent(f, indent + 1)?;
        }
        Ok(())
    }

    fn fmt_compact(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_header(f)?;
        let children = self.children();
        if !children.is_empty() {
            write!(f, " [")?;
            for (index, child) in children.into_iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                child.fmt_compact(f)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }

    fn fmt_header(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Algebra::Bgp { patterns } => fmt_patterns(f, "Bgp", patterns),
            Algebra::LazyBgp {
                patterns,
                required_results,
            } => match required_results {
                Some(required) => fmt_patterns(f, &format!("LazyBgp({required})"), patterns),
                None => fmt_patterns(f, "LazyBgp", patterns),
            },
            Algebra::AskBgp { patterns } => fmt_patterns(f, "AskBgp", patterns),
            Algebra::Null { variables } => {
                write!(f, "Null")?;
                if !variables.is_empty() {
                    write!(f, ": {}", variables.iter().join(" "))?;
                }
                Ok(())
            }
            Algebra::Values {
                variables,
                bindings,
            } => write!(
                f,
                "Values: {} ({} rows)",
                variables.iter().join(" "),
                bindings.len()
            ),
            Algebra::SubQuery { query } => {
                write!(f, "SubQuery: {}", query.projected_variables().iter().join(" "))
            }
            Algebra::Service { name, silent, .. } => {
                if *silent {
                    write!(f, "Service SILENT: {name}")
                } else {
                    write!(f, "Service: {name}")
                }
            }
            Algebra::PropertyPath(pattern) => write!(f, "PropertyPath: {pattern}"),
            Algebra::Filter { expression, .. } => write!(f, "Filter: {expression}"),
            Algebra::IdentityFilter { variable, term, .. } => {
                write!(f, "IdentityFilter: {variable} = {term}")
            }
            Algebra::SameTermFilter { variable, term, .. } => {
                write!(f, "SameTermFilter: {variable} = {term}")
            }
            Algebra::Extend {
                variable,
                expression,
                ..
            } => write!(f, "Extend: {variable} := {expression}"),
            Algebra::Select {
                variables,
                select_all,
                ..
            } => {
                if *select_all {
                    write!(f, "Select: *")
                } else {
                    write!(f, "Select: {}", variables.iter().join(" "))
                }
            }
            Algebra::Distinct { .. } => write!(f, "Distinct"),
            Algebra::Reduced { .. } => write!(f, "Reduced"),
            Algebra::OrderBy { ordering, .. } => {
                write!(f, "OrderBy: {}", ordering.iter().join(", "))
            }
            Algebra::Slice { limit, offset, .. } => match limit {
                Some(limit) => write!(f, "Slice: offset={offset}, limit={limit}"),
                None => write!(f, "Slice: offset={offset}"),
            },
            Algebra::Graph { name, .. } => write!(f, "Graph: {name}"),
            Algebra::PropertyFunction { function, .. } => {
                write!(f, "PropertyFunction: {function}")
            }
            Algebra::Group {
                variables,
                aggregates,
                ..
            } => {
                write!(f, "Group: [{}]", variables.iter().join(" "))?;
                for (variable, aggregate) in aggregates {
                    write!(f, ", {variable} := {aggregate}")?;
                }
                Ok(())
            }
            Algebra::Having { expression, .. } => write!(f, "Having: {expression}"),
            Algebra::Join { .. } => write!(f, "Join"),
            Algebra::LeftJoin { filter, .. } => match filter {
                Some(filter) => write!(f, "LeftJoin: {filter}"),
                None => write!(f, "LeftJoin"),
            },
            Algebra::Union { .. } => write!(f, "Union"),
            Algebra::Minus { .. } => write!(f, "Minus"),
            Algebra::ParallelJoin { .. } => write!(f, "ParallelJoin"),
            Algebra::ParallelUnion { .. } => write!(f, "ParallelUnion"),
            Algebra::LazyUnion {
                required_results, ..
            } => match required_results {
                Some(required) => write!(f, "LazyUnion({required})"),
                None => write!(f, "LazyUnion"),
            },
            Algebra::AskUnion { .. } => write!(f, "AskUnion"),
            Algebra::FilteredProduct { expression, .. } => {
                write!(f, "FilteredProduct: {expression}")
            }
        }
    }
}

fn fmt_patterns(f: &mut Formatter<'_>, name: &str, patterns: &[TriplePattern]) -> std::fmt::Result {
    write!(f, "{name}")?;
    if !patterns.is_empty() {
        write!(f, ": {}", patterns.iter().join(" . "))?;
    }
    Ok(())
}
