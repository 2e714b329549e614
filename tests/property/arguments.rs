use proptest::prelude::*;
use teddy_mocks::{Arguments, Value};

use crate::utils::{small_args, to_arguments};

proptest! {
    #[test]
    fn test_unvalidated_match_is_arity_only(a in small_args(), b in small_args()) {
        let (a, b) = (to_arguments(&a), to_arguments(&b));
        prop_assert_eq!(a.matches(&b, false), a.len() == b.len());
    }

    #[test]
    fn test_validated_match_is_elementwise_equality(a in small_args(), b in small_args()) {
        prop_assert_eq!(to_arguments(&a).matches(&to_arguments(&b), true), a == b);
    }

    #[test]
    fn test_parse_json_keeps_integer_arguments(values in prop::collection::vec(any::<i32>(), 0..8)) {
        let json = serde_json::to_string(&values).unwrap();
        let parsed = Arguments::parse_json(&json).unwrap();
        let expected: Vec<Value> = values.iter().map(|v| Value::from(*v)).collect();
        prop_assert_eq!(parsed.into_vec(), expected);
    }
}
