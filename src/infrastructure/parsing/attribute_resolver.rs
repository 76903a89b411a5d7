//! Descriptive attribute resolution
//!
//! Locates semantically-named attributes in the pdp-data attribute bag. Each
//! output field is described by an [`AttributeRule`]: a match predicate
//! (exact key or case-insensitive pattern search) plus an optional fallback
//! field whose already-resolved value is reused when nothing matches.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::debug;

use super::{ParsingError, ParsingResult};
use crate::domain::product::DescriptiveAttribute;

/// Output fields filled from descriptive attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeField {
    Upc,
    ModelNumber,
    ItemWeight,
    ProductDimensions,
    Size,
    Color,
    PackageDimensions,
    ShippingWeight,
}

impl AttributeField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Upc => "UPC",
            Self::ModelNumber => "Model Number",
            Self::ItemWeight => "Item Weight",
            Self::ProductDimensions => "Product Dimensions",
            Self::Size => "Size",
            Self::Color => "Color",
            Self::PackageDimensions => "Package Dimensions",
            Self::ShippingWeight => "Shipping Weight",
        }
    }
}

/// How an attribute name is matched
#[derive(Debug, Clone)]
pub enum AttributeMatcher {
    /// Strict equality, for machine-readable keys such as `upc`
    ExactKey(String),
    /// Case-insensitive regex search anywhere in the name
    Pattern(Regex),
}

impl AttributeMatcher {
    pub fn exact(key: &str) -> Self {
        Self::ExactKey(key.to_string())
    }

    pub fn pattern(pattern: &str) -> ParsingResult<Self> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
            .map_err(|e| ParsingError::invalid_selector(pattern, e))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::ExactKey(key) => name == key,
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

/// One row of the resolution table
#[derive(Debug, Clone)]
pub struct AttributeRule {
    pub field: AttributeField,
    pub matcher: AttributeMatcher,
    pub fallback: Option<AttributeField>,
}

/// Returns the first value of the first attribute, in document order, whose
/// name satisfies `matcher`.
///
/// Attributes without a name never match. A matching attribute without value
/// records yields `None`; the scan does not continue past it.
pub fn resolve_attribute(
    attributes: &[DescriptiveAttribute],
    matcher: &AttributeMatcher,
) -> Option<String> {
    attributes
        .iter()
        .find(|attr| attr.name.as_deref().is_some_and(|name| matcher.matches(name)))
        .and_then(DescriptiveAttribute::first_value)
}

/// Values resolved for one product
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAttributes(HashMap<AttributeField, String>);

impl ResolvedAttributes {
    pub fn get(&self, field: AttributeField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn take(&mut self, field: AttributeField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Data-driven resolver over an ordered rule table
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    rules: Vec<AttributeRule>,
}

impl AttributeResolver {
    /// Resolver with the product page's standard fields.
    ///
    /// Rule order matters: fallbacks refer to fields resolved earlier.
    pub fn new() -> ParsingResult<Self> {
        let rules = vec![
            AttributeRule {
                field: AttributeField::Upc,
                matcher: AttributeMatcher::exact("upc"),
                fallback: None,
            },
            AttributeRule {
                field: AttributeField::ModelNumber,
                matcher: AttributeMatcher::pattern("model")?,
                fallback: None,
            },
            AttributeRule {
                field: AttributeField::ItemWeight,
                matcher: AttributeMatcher::pattern("weight")?,
                fallback: None,
            },
            AttributeRule {
                field: AttributeField::ProductDimensions,
                matcher: AttributeMatcher::pattern("dimensions")?,
                fallback: None,
            },
            AttributeRule {
                field: AttributeField::Size,
                matcher: AttributeMatcher::pattern("size")?,
                fallback: None,
            },
            AttributeRule {
                field: AttributeField::Color,
                matcher: AttributeMatcher::pattern("colou?r")?,
                fallback: None,
            },
            AttributeRule {
                field: AttributeField::PackageDimensions,
                matcher: AttributeMatcher::pattern("package dimensions")?,
                fallback: Some(AttributeField::ProductDimensions),
            },
            AttributeRule {
                field: AttributeField::ShippingWeight,
                matcher: AttributeMatcher::pattern("shipping weight")?,
                fallback: Some(AttributeField::ItemWeight),
            },
        ];

        Self::with_rules(rules)
    }

    /// Build from a custom table. A fallback must point at an earlier rule.
    pub fn with_rules(rules: Vec<AttributeRule>) -> ParsingResult<Self> {
        for (index, rule) in rules.iter().enumerate() {
            if let Some(fallback) = rule.fallback {
                let defined_before = rules[..index].iter().any(|r| r.field == fallback);
                if !defined_before {
                    return Err(ParsingError::invalid_selector(
                        rule.field.label(),
                        format!("fallback '{}' is not resolved before it", fallback.label()),
                    ));
                }
            }
        }
        Ok(Self { rules })
    }

    /// Apply every rule in order
    pub fn resolve_all(&self, attributes: &[DescriptiveAttribute]) -> ResolvedAttributes {
        let mut resolved = ResolvedAttributes::default();

        for rule in &self.rules {
            let value = resolve_attribute(attributes, &rule.matcher).or_else(|| {
                rule.fallback
                    .and_then(|fallback| resolved.get(fallback).map(ToString::to_string))
            });

            match value {
                Some(value) => {
                    resolved.0.insert(rule.field, value);
                }
                None => debug!("Attribute '{}' absent", rule.field.label()),
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ValueRecord;
    use proptest::prelude::*;
    use rstest::rstest;

    fn attr(name: &str, value: &str) -> DescriptiveAttribute {
        DescriptiveAttribute::new(name, &[value])
    }

    #[rstest]
    #[case("model", "Model Number", true)]
    #[case("model", "MODEL", true)]
    #[case("weight", "Shipping Weight", true)]
    #[case("colou?r", "Colour", true)]
    #[case("colou?r", "Exterior Color", true)]
    #[case("package dimensions", "Dimensions", false)]
    #[case("size", "Capacity", false)]
    fn test_pattern_matching(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        let matcher = AttributeMatcher::pattern(pattern).unwrap();
        assert_eq!(matcher.matches(name), expected);
    }

    #[rstest]
    #[case("upc", true)]
    #[case("UPC", false)]
    #[case("upc code", false)]
    fn test_exact_key_matching(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(AttributeMatcher::exact("upc").matches(name), expected);
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        let attributes = vec![
            attr("Zeta Weight", "5 lb"),
            attr("Alpha Weight", "1 lb"),
        ];
        let matcher = AttributeMatcher::pattern("weight").unwrap();
        assert_eq!(resolve_attribute(&attributes, &matcher).as_deref(), Some("5 lb"));
    }

    #[test]
    fn test_first_value_record_is_used() {
        let attributes = vec![DescriptiveAttribute::new("Color", &["Red", "Blue"])];
        let matcher = AttributeMatcher::pattern("colou?r").unwrap();
        assert_eq!(resolve_attribute(&attributes, &matcher).as_deref(), Some("Red"));
    }

    #[test]
    fn test_match_without_values_is_absent() {
        let attributes = vec![
            DescriptiveAttribute {
                name: Some("Model".into()),
                values: None,
            },
            attr("Model Number", "X100"),
        ];
        let matcher = AttributeMatcher::pattern("model").unwrap();
        assert_eq!(resolve_attribute(&attributes, &matcher), None);

        let empty = vec![DescriptiveAttribute {
            name: Some("Model".into()),
            values: Some(vec![]),
        }];
        assert_eq!(resolve_attribute(&empty, &matcher), None);
    }

    #[test]
    fn test_nameless_attribute_never_matches() {
        let attributes = vec![
            DescriptiveAttribute {
                name: None,
                values: Some(vec![ValueRecord::new("ghost")]),
            },
            attr("Size", "Large"),
        ];
        let matcher = AttributeMatcher::pattern("size").unwrap();
        assert_eq!(resolve_attribute(&attributes, &matcher).as_deref(), Some("Large"));
    }

    #[test]
    fn test_package_and_shipping_fall_back_to_general_values() {
        let attributes = vec![
            attr("Model Number", "X100"),
            attr("Item Weight", "2 lb"),
            attr("Product Dimensions", "10 x 4 x 2 in"),
        ];
        let mut resolved = AttributeResolver::new().unwrap().resolve_all(&attributes);

        assert_eq!(resolved.get(AttributeField::PackageDimensions), Some("10 x 4 x 2 in"));
        assert_eq!(resolved.get(AttributeField::ShippingWeight), Some("2 lb"));
        assert_eq!(resolved.take(AttributeField::Upc), None);
    }

    #[test]
    fn test_specific_labels_beat_fallbacks() {
        let attributes = vec![
            attr("Item Weight", "2 lb"),
            attr("Dimensions", "10 x 4 x 2 in"),
            attr("Package Dimensions", "12 x 6 x 4 in"),
            attr("Shipping Weight", "3 lb"),
        ];
        let resolved = AttributeResolver::new().unwrap().resolve_all(&attributes);

        assert_eq!(resolved.get(AttributeField::PackageDimensions), Some("12 x 6 x 4 in"));
        assert_eq!(resolved.get(AttributeField::ShippingWeight), Some("3 lb"));
    }

    #[test]
    fn test_fallback_must_be_resolved_earlier() {
        let rules = vec![AttributeRule {
            field: AttributeField::ShippingWeight,
            matcher: AttributeMatcher::pattern("shipping weight").unwrap(),
            fallback: Some(AttributeField::ItemWeight),
        }];
        assert!(AttributeResolver::with_rules(rules).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        assert!(matches!(
            AttributeMatcher::pattern("col(our"),
            Err(ParsingError::InvalidSelector { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_unmatched_bag_is_absent(names in prop::collection::vec("[a-z ]{0,12}", 0..8)) {
            let attributes: Vec<_> = names.iter().map(|n| attr(n, "v")).collect();
            let matcher = AttributeMatcher::pattern("[0-9]").unwrap();
            prop_assert_eq!(resolve_attribute(&attributes, &matcher), None);
        }

        #[test]
        fn prop_single_match_returns_its_first_value(
            before in prop::collection::vec("[a-z]{1,10}", 0..5),
            after in prop::collection::vec("[a-z]{1,10}", 0..5),
            value in "[A-Za-z0-9 ]{1,16}",
        ) {
            let mut attributes: Vec<_> = before.iter().map(|n| attr(n, "before")).collect();
            attributes.push(DescriptiveAttribute::new("Item #Target", &[value.as_str(), "second"]));
            attributes.extend(after.iter().map(|n| attr(n, "after")));

            let matcher = AttributeMatcher::pattern("#target").unwrap();
            prop_assert_eq!(resolve_attribute(&attributes, &matcher), Some(value));
        }

        #[test]
        fn prop_multiple_matches_pick_document_order(values in prop::collection::vec("[a-z]{1,8}", 1..6)) {
            let attributes: Vec<_> = values
                .iter()
                .enumerate()
                .map(|(i, v)| attr(&format!("Weight {}", values.len() - i), v))
                .collect();
            let matcher = AttributeMatcher::pattern("weight").unwrap();
            prop_assert_eq!(resolve_attribute(&attributes, &matcher), Some(values[0].clone()));
        }
    }
}
