use proptest::prelude::*;
use teddy_mocks::{args, Stub, Value};

use crate::fixtures::calculator;

proptest! {
    #[test]
    fn test_passthrough_matches_original(x in -1_000_000i64..1_000_000, y in -1_000_000i64..1_000_000) {
        let stub = Stub::new(&calculator()).unwrap();
        prop_assert_eq!(stub.object().call("add", args![x, y]).unwrap(), Value::Int(x + y));
    }

    #[test]
    fn test_match_count_equals_number_of_equal_calls(
        calls in prop::collection::vec(0i64..4, 1..20),
        query in 0i64..4,
    ) {
        let stub = Stub::new(&calculator()).unwrap();
        for amount in &calls {
            stub.object().call("accumulate", args![*amount]).unwrap();
        }

        let expected = calls.iter().filter(|amount| **amount == query).count();
        let handle = stub.asserts_that(|s| s.call("accumulate", args![query])).unwrap();
        prop_assert_eq!(handle.match_count(), Some(expected));
        prop_assert_eq!(handle.was_called(), expected == 1);
        prop_assert_eq!(handle.was_called_any_number_of_times(), expected > 0);
        prop_assert_eq!(stub.call_log().len(), calls.len());
    }

    #[test]
    fn test_using_callback_is_any_over_recorded_calls(
        calls in prop::collection::vec(0i64..10, 0..20),
        threshold in 0i64..10,
    ) {
        let stub = Stub::new(&calculator()).unwrap();
        for amount in &calls {
            stub.object().call("accumulate", args![*amount]).unwrap();
        }

        let handle = stub.asserts_that(|s| s.call("accumulate", args![0])).unwrap();
        let expected = calls.iter().any(|amount| *amount > threshold);
        prop_assert_eq!(
            handle.using_callback(|args| args.arg(0).as_int().is_some_and(|v| v > threshold)),
            expected
        );
    }

    #[test]
    fn test_only_first_matching_call_after_stubbing_is_answered(
        before in prop::collection::vec(0i64..4, 0..10),
        after in prop::collection::vec(0i64..4, 0..20),
        stubbed in 0i64..4,
    ) {
        let stub = Stub::new(&calculator()).unwrap();
        let mut total = 0;
        for amount in &before {
            stub.object().call("accumulate", args![*amount]).unwrap();
            total += amount;
        }

        stub.stubs(|s| s.call("accumulate", args![stubbed])).unwrap().and_returns(-1);

        let mut answered = false;
        for amount in &after {
            let answer = stub.object().call("accumulate", args![*amount]).unwrap();
            if *amount == stubbed && !answered {
                answered = true;
                prop_assert_eq!(answer, Value::Int(-1));
            } else {
                total += amount;
                prop_assert_eq!(answer, Value::Int(total));
            }
        }
        prop_assert_eq!(stub.object().call("total", args![]).unwrap(), Value::Int(total));
    }
}
