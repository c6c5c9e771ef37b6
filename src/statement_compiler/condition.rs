use super::errors::SemanticError;
use super::value_typing::literal_value;
use crate::cypher_generator::Filter;
use crate::dsl_parser::ast::{Condition, PropertyPath};

/// Folds a condition into a filter strictly left to right: `a OR b AND c`
/// becomes `(a OR b) AND c`. `variable_for` maps each property path to the
/// pattern variable it tests. Literals are compared as written.
pub(crate) fn compile_condition<F>(
    condition: &Condition<'_>,
    mut variable_for: F,
) -> Result<Filter, SemanticError>
where
    F: FnMut(&PropertyPath<'_>) -> Result<String, SemanticError>,
{
    let mut filter = Filter::equals(
        variable_for(&condition.first.path)?,
        condition.first.path.property,
        literal_value(&condition.first.value),
    );
    for (operator, predicate) in &condition.rest {
        let next = Filter::equals(
            variable_for(&predicate.path)?,
            predicate.path.property,
            literal_value(&predicate.value),
        );
        filter = filter.combine(*operator, next);
    }
    Ok(filter)
}
