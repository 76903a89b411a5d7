//! Price aggregation over pricing API responses of unknown shape

use serde_json::Value;

use crate::domain::product::PriceSet;

const PRICE_KEYS: [&str; 2] = ["amount", "price"];

fn is_price_key(key: &str) -> bool {
    PRICE_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k))
}

/// Collect every distinct number stored under an `amount`/`price` key
/// (case-insensitive), anywhere in `node`.
///
/// A numeric value under a price key is terminal. Any other value is walked,
/// whatever its type. Booleans are not numbers.
pub fn aggregate_prices(node: &Value) -> PriceSet {
    let mut prices = PriceSet::new();
    collect_prices(node, &mut prices);
    prices
}

/// Depth-first walk that adds into an existing set
pub fn collect_prices(node: &Value, prices: &mut PriceSet) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Number(number) if is_price_key(key) => {
                        prices.insert(number.clone());
                    }
                    _ => collect_prices(value, prices),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_prices(item, prices);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sorted(prices: &PriceSet) -> Vec<f64> {
        let mut values = prices.as_f64_values();
        values.sort_by(f64::total_cmp);
        values
    }

    #[test]
    fn test_mixed_case_keys_in_nested_document() {
        let doc = json!({"a": {"price": 10}, "b": [{"amount": 10}, {"Price": 20.5}]});
        assert_eq!(sorted(&aggregate_prices(&doc)), vec![10.0, 20.5]);
    }

    #[test]
    fn test_no_qualifying_keys_yields_empty_set() {
        let doc = json!({"name": "Widget", "offers": [{"cost": 3}, {"total": {"value": 4}}]});
        assert!(aggregate_prices(&doc).is_empty());
    }

    #[test]
    fn test_empty_containers_and_scalars() {
        assert!(aggregate_prices(&json!({})).is_empty());
        assert!(aggregate_prices(&json!([])).is_empty());
        assert!(aggregate_prices(&json!(42)).is_empty());
        assert!(aggregate_prices(&json!("price")).is_empty());
    }

    #[test]
    fn test_non_numeric_price_values_are_walked() {
        let doc = json!({
            "price": {"amount": 7.99, "currency": "USD"},
            "Amount": "12.00",
            "PRICE": [ {"amount": 5} ],
            "flag": {"price": true}
        });
        assert_eq!(sorted(&aggregate_prices(&doc)), vec![5.0, 7.99]);
    }

    #[test]
    fn test_duplicate_prices_collapse() {
        let doc = json!([{"price": 19.99}, {"price": 19.99}, {"nested": {"amount": 19.99}}]);
        assert_eq!(aggregate_prices(&doc).len(), 1);
    }

    #[test]
    fn test_integer_and_float_forms_are_one_price() {
        let doc = json!([{"price": 10}, {"amount": 10.0}]);
        assert_eq!(aggregate_prices(&doc).len(), 1);
    }

    #[test]
    fn test_deeply_nested_document_terminates() {
        let mut doc = json!({"price": 1});
        for _ in 0..100 {
            doc = json!({"level": [doc]});
        }
        assert_eq!(sorted(&aggregate_prices(&doc)), vec![1.0]);
    }

    proptest! {
        #[test]
        fn prop_duplicated_input_is_idempotent(values in prop::collection::vec(0u32..10_000, 0..20)) {
            let once: Vec<_> = values.iter().map(|v| json!({"price": v})).collect();
            let twice: Vec<_> = once.iter().chain(once.iter()).cloned().collect();

            let single = aggregate_prices(&Value::Array(once));
            let doubled = aggregate_prices(&Value::Array(twice));

            prop_assert_eq!(sorted(&single), sorted(&doubled));
            let mut distinct = values.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(single.len(), distinct.len());
        }
    }
}
