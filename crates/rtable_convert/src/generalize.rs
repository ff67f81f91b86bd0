//! Type generalization.
//!
//! Values read from R arrive with locally inferred types: one list element
//! may be `number`, the next `Maybe<number>`, a third `[number]`. Before they
//! can share a column they need one common type, and every value already
//! read needs a function that moves it into that type. A *lift* is such a
//! function.
//!
//! The lattice is small and explicit:
//!
//! ```text
//! T            ≤ Maybe<T>
//! T            ≤ [T]
//! Maybe<T>     ≤ [Maybe<T>]      (T lifts to [present(T)])
//! [S] ⊔ [T]    = [S ⊔ T]
//! {a: S} ⊔ {b: T} = {a: Maybe<S>, b: Maybe<T>}, shared fields joined
//! ```
//!
//! Anything else does not generalize.
//!
//! `Maybe` types and values are built by the injected [`TypeManager`], both
//! when types are generalized and when lifts are applied.

use std::collections::HashMap;
use std::sync::Arc;

use rtable_foundation::{DataType, Error, ErrorKind, RecordType, Result, TypeManager, Value};
use tracing::trace;

/// Moves a value of one type into a more general type.
pub type Lift = Arc<dyn Fn(&dyn TypeManager, Value) -> Result<Value> + Send + Sync>;

/// The lift that returns its input.
#[must_use]
pub fn identity() -> Lift {
    Arc::new(|_: &dyn TypeManager, v: Value| Ok(v))
}

fn present() -> Lift {
    Arc::new(|manager: &dyn TypeManager, v: Value| Ok(manager.maybe_present(v)))
}

fn compose(first: Lift, then: Lift) -> Lift {
    Arc::new(move |manager: &dyn TypeManager, v: Value| then(manager, first(manager, v)?))
}

/// Applies a lift to every element of an array value.
fn map_array(element: Lift) -> Lift {
    Arc::new(move |manager: &dyn TypeManager, v: Value| match v {
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .map(|item| element(manager, item))
                .collect::<Result<_>>()?,
        )),
        other => Err(Error::internal(format!(
            "array lift applied to {}",
            other.kind_name()
        ))),
    })
}

/// The common type of two types, with a lift for each side.
#[derive(Clone)]
pub struct GeneralisedTypePair {
    /// The generalized type.
    pub result_type: DataType,
    /// Lift for values of the first (smaller) type.
    pub small_to_result: Lift,
    /// Lift for values of the second (larger) type.
    pub large_to_result: Lift,
}

impl GeneralisedTypePair {
    fn new(result_type: DataType, small_to_result: Lift, large_to_result: Lift) -> Self {
        Self {
            result_type,
            small_to_result,
            large_to_result,
        }
    }

    fn swapped(self) -> Self {
        Self::new(self.result_type, self.large_to_result, self.small_to_result)
    }
}

impl std::fmt::Debug for GeneralisedTypePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralisedTypePair")
            .field("result_type", &self.result_type)
            .finish_non_exhaustive()
    }
}

/// The common type of a list of types, with a lift for each input type.
#[derive(Clone)]
pub struct Generalized {
    /// The generalized type.
    pub result_type: DataType,
    /// One lift per distinct input type.
    pub lifts: HashMap<DataType, Lift>,
}

impl Generalized {
    /// Lifts a value of type `from` into the result type, building `Maybe`
    /// values through `manager`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if `from` was not among the generalized
    /// types, or whatever the lift itself reports.
    pub fn lift(&self, manager: &dyn TypeManager, from: &DataType, value: Value) -> Result<Value> {
        let lift = self
            .lifts
            .get(from)
            .ok_or_else(|| Error::internal(format!("no lift from {from} to {}", self.result_type)))?;
        lift(manager, value)
    }
}

impl std::fmt::Debug for Generalized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generalized")
            .field("result_type", &self.result_type)
            .field("from", &self.lifts.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Finds the common type of all `types`.
///
/// Folds left: each new type is generalized with the running result (in
/// either order) and every lift found so far is composed with the lift from
/// the old result to the new one.
///
/// # Errors
///
/// Returns [`ErrorKind::EmptyGeneralization`] for no types, or
/// [`ErrorKind::CannotGeneralize`] naming the running result and the first
/// type that does not fit.
pub fn generalize(types: &[DataType], manager: &dyn TypeManager) -> Result<Generalized> {
    let (first, rest) = types
        .split_first()
        .ok_or_else(|| Error::new(ErrorKind::EmptyGeneralization))?;
    let start = Generalized {
        result_type: first.clone(),
        lifts: HashMap::from([(first.clone(), identity())]),
    };
    rest.iter().try_fold(start, |acc, next| {
        if acc.lifts.contains_key(next) {
            return Ok(acc);
        }
        let pair = generalize_either(&acc.result_type, next, manager)
            .ok_or_else(|| Error::cannot_generalize(acc.result_type.clone(), next.clone()))?;
        trace!(
            from = %acc.result_type,
            with = %next,
            to = %pair.result_type,
            "generalized"
        );
        let unchanged = pair.result_type == acc.result_type;
        let mut lifts: HashMap<DataType, Lift> = acc
            .lifts
            .into_iter()
            .map(|(t, lift)| {
                if unchanged {
                    (t, lift)
                } else {
                    (t, compose(lift, pair.small_to_result.clone()))
                }
            })
            .collect();
        lifts.insert(next.clone(), pair.large_to_result);
        Ok(Generalized {
            result_type: pair.result_type,
            lifts,
        })
    })
}

/// Generalizes two types in whichever order works.
///
/// `small_to_result` always lifts values of `first`.
#[must_use]
pub fn generalize_either(
    first: &DataType,
    second: &DataType,
    manager: &dyn TypeManager,
) -> Option<GeneralisedTypePair> {
    generalize_pair(first, second, manager)
        .or_else(|| generalize_pair(second, first, manager).map(GeneralisedTypePair::swapped))
}

/// Generalizes `smaller` into `larger`, if the lattice allows it in that
/// direction.
#[must_use]
pub fn generalize_pair(
    smaller: &DataType,
    larger: &DataType,
    manager: &dyn TypeManager,
) -> Option<GeneralisedTypePair> {
    if smaller == larger {
        return Some(GeneralisedTypePair::new(larger.clone(), identity(), identity()));
    }
    if *larger == manager.make_maybe_type(smaller.clone()) {
        return Some(GeneralisedTypePair::new(larger.clone(), present(), identity()));
    }
    match (smaller, larger) {
        (_, DataType::Array(element)) => generalize_into_array(smaller, larger, element, manager),
        (DataType::Record(small), DataType::Record(large)) => {
            generalize_records(small, large, manager)
        }
        _ => None,
    }
}

fn generalize_into_array(
    smaller: &DataType,
    larger: &DataType,
    element: &DataType,
    manager: &dyn TypeManager,
) -> Option<GeneralisedTypePair> {
    if element == smaller {
        let wrap: Lift = Arc::new(|_: &dyn TypeManager, v: Value| Ok(Value::array([v])));
        return Some(GeneralisedTypePair::new(larger.clone(), wrap, identity()));
    }
    if *element == manager.make_maybe_type(smaller.clone()) {
        let wrap: Lift = Arc::new(|manager: &dyn TypeManager, v: Value| {
            Ok(Value::array([manager.maybe_present(v)]))
        });
        return Some(GeneralisedTypePair::new(larger.clone(), wrap, identity()));
    }
    if let DataType::Array(small_element) = smaller {
        let inner = generalize_either(small_element, element, manager)?;
        return Some(GeneralisedTypePair::new(
            DataType::array(inner.result_type),
            map_array(inner.small_to_result),
            map_array(inner.large_to_result),
        ));
    }
    None
}

/// How one side of a record join produces a result field.
#[derive(Clone)]
enum FieldSource {
    Lift(Lift),
    Missing,
}

fn generalize_records(
    small: &RecordType,
    large: &RecordType,
    manager: &dyn TypeManager,
) -> Option<GeneralisedTypePair> {
    let mut names: Vec<&Arc<str>> = small.names().chain(large.names()).collect();
    names.sort();
    names.dedup();

    let mut result = Vec::with_capacity(names.len());
    let mut small_fields = Vec::with_capacity(names.len());
    let mut large_fields = Vec::with_capacity(names.len());
    for name in names {
        let (t, from_small, from_large) = match (small.field(name), large.field(name)) {
            (Some(s), Some(l)) => {
                let pair = generalize_either(s, l, manager)?;
                (
                    pair.result_type,
                    FieldSource::Lift(pair.small_to_result),
                    FieldSource::Lift(pair.large_to_result),
                )
            }
            (Some(s), None) => {
                let (t, lift) = optional_field(s, manager);
                (t, FieldSource::Lift(lift), FieldSource::Missing)
            }
            (None, Some(l)) => {
                let (t, lift) = optional_field(l, manager);
                (t, FieldSource::Missing, FieldSource::Lift(lift))
            }
            (None, None) => continue,
        };
        result.push((name.clone(), t));
        small_fields.push((name.clone(), from_small));
        large_fields.push((name.clone(), from_large));
    }

    Some(GeneralisedTypePair::new(
        DataType::record(result),
        record_lift(small_fields),
        record_lift(large_fields),
    ))
}

/// A one-sided field becomes optional unless it already is.
fn optional_field(t: &DataType, manager: &dyn TypeManager) -> (DataType, Lift) {
    if is_optional(t, manager) {
        (t.clone(), identity())
    } else {
        (manager.make_maybe_type(t.clone()), present())
    }
}

fn is_optional(t: &DataType, manager: &dyn TypeManager) -> bool {
    match t {
        DataType::Tagged(r) => {
            matches!(r.args.as_slice(), [inner] if manager.make_maybe_type(inner.clone()) == *t)
        }
        _ => false,
    }
}

fn record_lift(fields: Vec<(Arc<str>, FieldSource)>) -> Lift {
    Arc::new(move |manager: &dyn TypeManager, v: Value| {
        let input = match v {
            Value::Record(input) => input,
            other => {
                return Err(Error::internal(format!(
                    "record lift applied to {}",
                    other.kind_name()
                )));
            }
        };
        let mut output = Vec::with_capacity(fields.len());
        for (name, source) in &fields {
            let value = match source {
                FieldSource::Missing => manager.maybe_missing(),
                FieldSource::Lift(lift) => {
                    let field = input.get(name).cloned().ok_or_else(|| {
                        Error::internal(format!("record value has no field \"{name}\""))
                    })?;
                    lift(manager, field)?
                }
            };
            output.push((name.clone(), value));
        }
        Ok(Value::record(output))
    })
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;
    use rtable_foundation::TypeRegistry;

    use super::*;

    fn generalize(types: &[DataType]) -> Result<Generalized> {
        super::generalize(types, &TypeRegistry::new())
    }

    fn scalar_type() -> impl Strategy<Value = DataType> {
        prop_oneof![Just(DataType::Number), Just(DataType::Text), Just(DataType::Boolean)]
    }

    fn sample(t: &DataType) -> Value {
        match t {
            DataType::Text => Value::from("s"),
            DataType::Boolean => Value::from(true),
            _ => Value::from(1),
        }
    }

    proptest! {
        #[test]
        fn generalization_is_order_independent(
            base in scalar_type(),
            shapes in proptest::collection::vec(0..3_u8, 1..6),
        ) {
            // These shapes form a chain, so any order reaches the same top.
            let types: Vec<DataType> = shapes
                .iter()
                .map(|s| match s {
                    0 => base.clone(),
                    1 => DataType::maybe(base.clone()),
                    _ => DataType::array(DataType::maybe(base.clone())),
                })
                .collect();
            let mut reversed = types.clone();
            reversed.reverse();
            let forward = generalize(&types);
            let backward = generalize(&reversed);
            prop_assert_eq!(forward.is_ok(), backward.is_ok());
            if let (Ok(f), Ok(b)) = (forward, backward) {
                prop_assert_eq!(&f.result_type, &b.result_type);
                let v = sample(&base);
                prop_assert_eq!(
                    f.lift(&TypeRegistry::new(), &base, v.clone()).ok(),
                    b.lift(&TypeRegistry::new(), &base, v).ok()
                );
            }
        }

        #[test]
        fn lifted_values_conform_to_the_result(
            base in scalar_type(),
            with_maybe in any::<bool>(),
            with_array in any::<bool>(),
        ) {
            let mut types = vec![base.clone()];
            if with_maybe {
                types.push(DataType::maybe(base.clone()));
            }
            if with_array {
                types.push(DataType::array(DataType::maybe(base.clone())));
            }
            let g = generalize(&types).unwrap();
            let lifted = g.lift(&TypeRegistry::new(), &base, sample(&base)).unwrap();
            prop_assert!(g.result_type.admits(&lifted));
        }
    }
}
