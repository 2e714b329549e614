use proptest::prelude::*;
use teddy_mocks::{Arguments, Value};

/// Short argument lists over a small domain, so equal lists are common
pub fn small_args() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..4, 0..4)
}

pub fn to_arguments(values: &[i64]) -> Arguments {
    values.iter().copied().map(Value::from).collect()
}
