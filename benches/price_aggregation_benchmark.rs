//! Price aggregation and attribute resolution over large documents

use catalog_harvester_lib::domain::DescriptiveAttribute;
use catalog_harvester_lib::infrastructure::parsing::{AttributeResolver, aggregate_prices};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

/// Pricing-shaped document: `offers` blocks each nesting tiers of price/amount leaves
fn pricing_document(offers: usize) -> Value {
    let offers: Vec<Value> = (0..offers)
        .map(|i| {
            json!({
                "offerId": i,
                "displayPrice": { "amount": (i % 50) as f64 + 0.99, "currency": "USD" },
                "tiers": [
                    { "Price": i % 7, "minQty": 1 },
                    { "price": { "AMOUNT": i % 11 }, "minQty": 10 },
                    { "label": "clearance", "flags": [true, false, null] }
                ]
            })
        })
        .collect();
    json!({ "priceData": { "offers": offers, "meta": { "count": offers.len() } } })
}

fn attribute_bag(size: usize) -> Vec<DescriptiveAttribute> {
    let mut bag: Vec<DescriptiveAttribute> = (0..size)
        .map(|i| DescriptiveAttribute::new(&format!("Feature {i}"), &["yes"]))
        .collect();
    bag.push(DescriptiveAttribute::new("Product Dimensions", &["10 x 5 x 2 in"]));
    bag.push(DescriptiveAttribute::new("Item Weight", &["2 lb"]));
    bag
}

fn price_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_prices");
    for offers in [10, 100, 1_000] {
        let document = pricing_document(offers);
        group.bench_with_input(BenchmarkId::from_parameter(offers), &document, |b, doc| {
            b.iter(|| black_box(aggregate_prices(black_box(doc))));
        });
    }
    group.finish();
}

fn attribute_resolution(c: &mut Criterion) {
    let resolver = AttributeResolver::new().unwrap();
    let mut group = c.benchmark_group("resolve_all");
    for size in [10, 200] {
        let bag = attribute_bag(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &bag, |b, bag| {
            b.iter(|| black_box(resolver.resolve_all(black_box(bag))));
        });
    }
    group.finish();
}

criterion_group!(benches, price_aggregation, attribute_resolution);
criterion_main!(benches);
