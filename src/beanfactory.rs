/*
    beanio
    https://github.com/beanio-rs/beanio

    src/beanfactory.rs

    Constructor selection. Rust has no reflected constructor list, so a bean
    type registers its candidate
    constructors explicitly through [`BeanFactoryRegistry::register_constructor`]
    — each carries the parameter-kind list the scoring rule needs and a
    build callback that turns the resolved positional arguments into a
    [`Value`].

    Selection itself happens once, at compile time (`crate::compiler`'s
    `build_bean_binding`): on popping a bean-bound Complex property, the
    compiler counts that property's declared constructor-argument children
    and calls [`BeanFactoryRegistry::select`], which scores every candidate
    as if each of those `0..arity` positions were populated — the
    preprocessor already enforces that they're contiguous, so that shape is
    all any matching record can ever present. The winning candidate's index
    (or "use the default constructor") is stored on the compiled
    [`crate::property::BeanBinding`] as a [`ConstructorChoice`] and handed
    back to [`BeanFactoryRegistry::construct_selected`] once per record by
    `crate::reader` — no re-scoring, and no way for a bean with no matching
    constructor to compile successfully only to fail on every incoming
    record.
*/

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::ConfigError;
use crate::value::Value;

/// Category a constructor parameter falls into for scoring purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A bare value type with no "empty" representation (an unmatched
    /// bare `i32`, `bool`, ...): −100 if unmatched, effectively
    /// disqualifying.
    Value,
    /// `Option<T>` of a value type: −2 if unmatched.
    OptionValue,
    /// A heap/owned reference-like type (`String`, `Vec<T>`, another bean):
    /// −1 if unmatched.
    Reference,
}

impl ParamKind {
    fn unmatched_penalty(self) -> i32 {
        match self {
            ParamKind::Value => -100,
            ParamKind::OptionValue => -2,
            ParamKind::Reference => -1,
        }
    }
}

type BuildFn = dyn Fn(Vec<Option<Value>>) -> Value + Send + Sync;
type DefaultBuildFn = dyn Fn() -> Value + Send + Sync;

/// The constructor a compiled bean binding was resolved to at compile time,
/// per the scoring in [`BeanFactoryRegistry::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorChoice {
    /// Index into the class's registered candidate constructors.
    Constructor(usize),
    /// No candidate scored above zero; the registered zero-arg default
    /// constructor applies instead.
    Default,
}

#[derive(Clone)]
struct ConstructorSpec {
    params: Vec<ParamKind>,
    build: Arc<BuildFn>,
}

fn score(params: &[ParamKind], args: &[Option<Value>]) -> i32 {
    params
        .iter()
        .enumerate()
        .map(|(i, kind)| match args.get(i) {
            Some(Some(_)) => 1,
            _ => kind.unmatched_penalty(),
        })
        .sum()
}

/// Registry of candidate constructors and default (zero-arg) builders, keyed
/// by `BeanSpec::class_name`.
#[derive(Clone)]
pub struct BeanFactoryRegistry {
    constructors: Arc<DashMap<String, Vec<ConstructorSpec>>>,
    defaults: Arc<DashMap<String, Arc<DefaultBuildFn>>>,
}

impl BeanFactoryRegistry {
    pub fn new() -> Self {
        BeanFactoryRegistry {
            constructors: Arc::new(DashMap::new()),
            defaults: Arc::new(DashMap::new()),
        }
    }

    /// Registers a candidate constructor for `class_name`. Constructors are
    /// tried in registration order on a scoring tie.
    pub fn register_constructor(
        &self,
        class_name: impl Into<String>,
        params: Vec<ParamKind>,
        build: impl Fn(Vec<Option<Value>>) -> Value + Send + Sync + 'static,
    ) {
        self.constructors
            .entry(class_name.into())
            .or_default()
            .push(ConstructorSpec {
                params,
                build: Arc::new(build),
            });
    }

    /// Registers the zero-arg fallback used when no candidate constructor
    /// scores above zero.
    pub fn register_default_constructor(
        &self,
        class_name: impl Into<String>,
        build: impl Fn() -> Value + Send + Sync + 'static,
    ) {
        self.defaults.insert(class_name.into(), Arc::new(build));
    }

    /// Selects the best-scoring constructor for `class_name` given
    /// positional `args` (`None` for an index with no gathered child) and
    /// invokes it. Falls back to the default constructor, then fails with
    /// [`ConfigError::NoMatchingConstructor`].
    pub fn construct(&self, class_name: &str, args: Vec<Option<Value>>) -> Result<Value, ConfigError> {
        if let Some(candidates) = self.constructors.get(class_name) {
            let mut best: Option<(i32, usize)> = None;
            for (index, candidate) in candidates.iter().enumerate() {
                let candidate_score = score(&candidate.params, &args);
                if candidate_score > 0 {
                    match best {
                        Some((best_score, _)) if candidate_score <= best_score => {}
                        _ => best = Some((candidate_score, index)),
                    }
                }
            }
            if let Some((_, index)) = best {
                return Ok((candidates[index].build)(args));
            }
        }

        if let Some(default) = self.defaults.get(class_name) {
            return Ok(default());
        }

        Err(ConfigError::NoMatchingConstructor {
            bean: class_name.to_string(),
            arity: args.iter().filter(|a| a.is_some()).count(),
        })
    }

    /// Selects, once at compile time, which constructor a bean with `arity`
    /// declared constructor-argument children will use for every record
    /// instance. Scores each candidate as though positions `0..arity` are
    /// always populated, since the preprocessor guarantees that shape for
    /// any record this bean binding applies to.
    pub fn select(&self, class_name: &str, arity: usize) -> Result<ConstructorChoice, ConfigError> {
        let placeholder: Vec<Option<Value>> = vec![Some(Value::Null); arity];
        if let Some(candidates) = self.constructors.get(class_name) {
            let mut best: Option<(i32, usize)> = None;
            for (index, candidate) in candidates.iter().enumerate() {
                let candidate_score = score(&candidate.params, &placeholder);
                if candidate_score > 0 {
                    match best {
                        Some((best_score, _)) if candidate_score <= best_score => {}
                        _ => best = Some((candidate_score, index)),
                    }
                }
            }
            if let Some((_, index)) = best {
                return Ok(ConstructorChoice::Constructor(index));
            }
        }

        if self.defaults.contains_key(class_name) {
            return Ok(ConstructorChoice::Default);
        }

        Err(ConfigError::NoMatchingConstructor {
            bean: class_name.to_string(),
            arity,
        })
    }

    /// Invokes the constructor a prior [`BeanFactoryRegistry::select`] call
    /// chose for `class_name`, against this record's actual positional
    /// `args`.
    pub fn construct_selected(&self, class_name: &str, choice: ConstructorChoice, args: Vec<Option<Value>>) -> Value {
        match choice {
            ConstructorChoice::Constructor(index) => {
                let candidates = self
                    .constructors
                    .get(class_name)
                    .expect("constructor selected at compile time is still registered");
                (candidates[index].build)(args)
            }
            ConstructorChoice::Default => {
                let default = self
                    .defaults
                    .get(class_name)
                    .expect("default constructor selected at compile time is still registered");
                default()
            }
        }
    }
}

impl Default for BeanFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_scoring_constructor_wins() {
        let registry = BeanFactoryRegistry::new();
        registry.register_constructor("Point", vec![ParamKind::Value, ParamKind::Value], |args| {
            Value::String(format!("2-arg:{args:?}"))
        });
        registry.register_constructor(
            "Point",
            vec![ParamKind::Value, ParamKind::Value, ParamKind::Reference],
            |args| Value::String(format!("3-arg:{args:?}")),
        );

        let args = vec![Some(Value::Int(1)), Some(Value::Int(2))];
        let built = registry.construct("Point", args).unwrap();
        // The 2-arg constructor scores +2; the 3-arg one scores +2 − 1 = +1.
        assert_eq!(built, Value::String("2-arg:[Some(Int(1)), Some(Int(2))]".to_string()));
    }

    #[test]
    fn bare_value_type_unmatched_disqualifies() {
        let registry = BeanFactoryRegistry::new();
        registry.register_constructor("Point", vec![ParamKind::Value, ParamKind::Value], |_| {
            Value::String("built".to_string())
        });
        registry.register_default_constructor("Point", || Value::String("default".to_string()));

        let args = vec![Some(Value::Int(1)), None];
        let built = registry.construct("Point", args).unwrap();
        assert_eq!(built, Value::String("default".to_string()));
    }

    #[test]
    fn no_candidate_and_no_default_fails() {
        let registry = BeanFactoryRegistry::new();
        registry.register_constructor("Point", vec![ParamKind::Value], |_| Value::Null);
        let err = registry.construct("Point", vec![None]).unwrap_err();
        assert!(matches!(err, ConfigError::NoMatchingConstructor { .. }));
    }

    #[test]
    fn ties_break_by_declaration_order() {
        let registry = BeanFactoryRegistry::new();
        registry.register_constructor("Pair", vec![ParamKind::Reference], |_| {
            Value::String("first".to_string())
        });
        registry.register_constructor("Pair", vec![ParamKind::Reference], |_| {
            Value::String("second".to_string())
        });
        let built = registry.construct("Pair", vec![Some(Value::String("x".into()))]).unwrap();
        assert_eq!(built, Value::String("first".to_string()));
    }

    #[test]
    fn select_chooses_the_same_constructor_construct_would() {
        let registry = BeanFactoryRegistry::new();
        registry.register_constructor("Point", vec![ParamKind::Value, ParamKind::Value], |args| {
            Value::String(format!("2-arg:{args:?}"))
        });
        registry.register_constructor(
            "Point",
            vec![ParamKind::Value, ParamKind::Value, ParamKind::Reference],
            |args| Value::String(format!("3-arg:{args:?}")),
        );

        let choice = registry.select("Point", 2).unwrap();
        assert_eq!(choice, ConstructorChoice::Constructor(0));
        let built = registry.construct_selected("Point", choice, vec![Some(Value::Int(1)), Some(Value::Int(2))]);
        assert_eq!(built, Value::String("2-arg:[Some(Int(1)), Some(Int(2))]".to_string()));
    }

    #[test]
    fn select_falls_back_to_default_when_no_candidate_scores() {
        let registry = BeanFactoryRegistry::new();
        registry.register_constructor("Point", vec![ParamKind::Value, ParamKind::Value], |_| {
            Value::String("built".to_string())
        });
        registry.register_default_constructor("Point", || Value::String("default".to_string()));

        // Arity 0: the 2-arg constructor can't score above zero.
        let choice = registry.select("Point", 0).unwrap();
        assert_eq!(choice, ConstructorChoice::Default);
        assert_eq!(
            registry.construct_selected("Point", choice, vec![]),
            Value::String("default".to_string())
        );
    }

    #[test]
    fn select_fails_with_no_candidate_and_no_default() {
        let registry = BeanFactoryRegistry::new();
        registry.register_constructor("Point", vec![ParamKind::Value], |_| Value::Null);
        let err = registry.select("Point", 0).unwrap_err();
        assert!(matches!(err, ConfigError::NoMatchingConstructor { .. }));
    }
}
