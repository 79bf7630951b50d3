//! Keyword partitioning between one level and the rest of its chain.

use crate::error::UnrecognizedParameterError;
use crate::kwargs::Kwargs;
use crate::method::MethodDescriptor;

/// Remove the keywords `method` declares from `bag` and return them.
///
/// Entries the method does not declare stay in `bag` for the levels below.
/// Declared keywords the caller did not supply are absent from the result;
/// their defaults are filled in on lookup.
pub fn extract_own(method: &MethodDescriptor, bag: &mut Kwargs) -> Kwargs {
    let mut own = Kwargs::new();
    for name in method.signature().keyword_names() {
        if let Some(value) = bag.remove(name) {
            own.insert(name, value);
        }
    }
    own
}

/// Extraction for the innermost level: whatever is left must be claimed here.
///
/// A root that captures variadic keywords absorbs the leftovers. Otherwise any
/// leftover is an error naming the offending keys, and `bag` is left untouched
/// apart from the declared entries.
pub fn claim_remaining(
    method: &MethodDescriptor,
    bag: &mut Kwargs,
) -> Result<Kwargs, UnrecognizedParameterError> {
    let mut own = extract_own(method, bag);
    if bag.is_empty() {
        return Ok(own);
    }
    if method.signature().has_var_keyword() {
        own.extend(bag.take());
        return Ok(own);
    }
    Err(UnrecognizedParameterError {
        owner: method.owner().to_string(),
        method: method.name().to_string(),
        keys: bag.key_list(),
    })
}

#[cfg(test)]
mod tests {
    use proptest::collection::{btree_map, btree_set};
    use proptest::prelude::*;
    use proptest::test_runner::{Config, TestRunner};

    use super::*;
    use crate::method::Method;
    use crate::value::Value;

    fn method_with(keywords: &[&str]) -> MethodDescriptor {
        let mut m = Method::cooperate("init", |_| Ok(Value::Unit));
        for k in keywords {
            m = m.keyword(*k, "default");
        }
        MethodDescriptor::bind("B", m, false)
    }

    #[test]
    fn test_extract_removes_only_declared() {
        let b = method_with(&["b_param"]);
        let mut bag = crate::kwargs! { "b_param" => "x", "d_param" => "y" };
        let own = extract_own(&b, &mut bag);
        assert_eq!(own, crate::kwargs! { "b_param" => "x" });
        assert_eq!(bag, crate::kwargs! { "d_param" => "y" });
    }

    #[test]
    fn test_extract_omits_unsupplied_defaults() {
        let b = method_with(&["b_param"]);
        let mut bag = Kwargs::new();
        assert!(extract_own(&b, &mut bag).is_empty());
    }

    #[test]
    fn test_claim_remaining_names_leftover_keys() {
        let root = method_with(&["a"]);
        let mut bag = crate::kwargs! { "a" => 1, "zzz" => 2, "yyy" => 3 };
        let err = claim_remaining(&root, &mut bag).unwrap_err();
        assert_eq!(err.keys, vec!["yyy".to_string(), "zzz".to_string()]);
        assert_eq!(err.owner, "B");
    }

    #[test]
    fn test_claim_remaining_absorbs_into_variadic_keywords() {
        let root = MethodDescriptor::bind(
            "A",
            Method::cooperative("method", |_| Ok(Value::Unit)).variadic_keyword(),
            true,
        );
        let mut bag = crate::kwargs! { "anything" => 1 };
        let own = claim_remaining(&root, &mut bag).unwrap();
        assert!(bag.is_empty());
        assert_eq!(own.get("anything"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_extraction_conserves_the_bag() {
        let names = "[a-f]{1,2}";
        let strategy = (
            btree_set(names, 0..6),
            btree_map(names, any::<i64>(), 0..8),
        );
        let mut runner = TestRunner::new(Config {
            cases: 128,
            ..Config::default()
        });
        runner
            .run(&strategy, |(declared, supplied)| {
                let declared: Vec<&str> = declared.iter().map(String::as_str).collect();
                let method = method_with(&declared);
                let original: Kwargs = supplied.clone().into_iter().collect();
                let mut bag = original.clone();
                let own = extract_own(&method, &mut bag);

                prop_assert_eq!(own.len() + bag.len(), original.len());
                for (k, v) in own.iter() {
                    prop_assert!(declared.contains(&k));
                    prop_assert!(!bag.contains(k));
                    prop_assert_eq!(original.get(k), Some(v));
                }
                for (k, v) in bag.iter() {
                    prop_assert!(!declared.contains(&k));
                    prop_assert_eq!(original.get(k), Some(v));
                }
                Ok(())
            })
            .unwrap();
    }
}
