//! Applies requested orderings to a [`QuerySource`].
//!
//! Unknown fields degrade to "unsorted" instead of failing the request.

use crate::domain::sort::SortSpec;
use crate::repository::QuerySource;
use crate::repository::fields::FieldAccessor;

/// Orders `source` by `spec`, guarding intermediate records of nested paths.
///
/// With `null_guards`, every record whose intermediate node along the path is
/// absent is filtered out before ordering. Without it such records remain and
/// the backend decides how they sort, or fails on evaluation.
pub fn order_by<S: QuerySource>(source: S, spec: &SortSpec, null_guards: bool) -> S {
    let Some(accessor) = FieldAccessor::resolve(source.schema(), &spec.field_path) else {
        log::debug!(
            "Sort field {:?} not found on {}; leaving source unsorted",
            spec.field_path,
            source.schema().name
        );
        return source;
    };

    let source = if null_guards {
        (1..accessor.depth()).fold(source, |source, len| {
            source.where_not_null(&accessor.prefix(len))
        })
    } else {
        source
    };

    source.order_by(&accessor, spec.direction)
}

/// Adds `spec` as a tie-breaker on an already ordered source.
///
/// Nested paths are ignored since they are never null-guarded.
pub fn then_by<S: QuerySource>(source: S, spec: &SortSpec) -> S {
    if spec.is_nested() {
        log::debug!("Ignoring nested secondary sort {:?}", spec.field_path);
        return source;
    }
    match FieldAccessor::resolve(source.schema(), &spec.field_path) {
        Some(accessor) => source.then_by(&accessor, spec.direction),
        None => {
            log::debug!(
                "Secondary sort field {:?} not found on {}",
                spec.field_path,
                source.schema().name
            );
            source
        }
    }
}

/// Applies the primary and optional secondary ordering.
///
/// The secondary sort only takes effect when the primary one resolved.
pub fn apply_sorting<S: QuerySource>(
    source: S,
    primary: Option<&SortSpec>,
    secondary: Option<&SortSpec>,
    null_guards: bool,
) -> S {
    let Some(primary) = primary else {
        return source;
    };
    if FieldAccessor::resolve(source.schema(), &primary.field_path).is_none() {
        log::debug!("Sort field {:?} not found; skipping ordering", primary.field_path);
        return source;
    }

    let source = order_by(source, primary, null_guards);
    match secondary {
        Some(secondary) => then_by(source, secondary),
        None => source,
    }
}
