use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const MAX_PRICE_DECIMAL_PLACES: u32 = 2;
/// numeric(12, 2) leaves ten integer digits
const MAX_PRICE_INTEGER_DIGITS: u32 = 10;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("This field may not be blank.".into()));
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("min_value")
            .with_message("Ensure this value is greater than or equal to 0.".into()));
    }

    if price.normalize().scale() > MAX_PRICE_DECIMAL_PLACES {
        return Err(ValidationError::new("max_decimal_places")
            .with_message("Ensure that there are no more than 2 decimal places.".into()));
    }

    if price.trunc() >= Decimal::from(10_i64.pow(MAX_PRICE_INTEGER_DIGITS)) {
        return Err(ValidationError::new("max_whole_digits").with_message(
            "Ensure that there are no more than 10 digits before the decimal point.".into(),
        ));
    }

    Ok(())
}

// ============================================================================
// Response models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Beverages")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "organic")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Green tea")]
    pub title: String,
    pub description: String,
    /// Serialized as a string with two decimal places
    #[schema(value_type = String, example = "4.50")]
    pub price: Decimal,
    #[schema(example = 1)]
    pub category_id: i32,
    /// Tag ids in ascending order
    #[schema(example = json!([1, 3]))]
    pub tags: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Fresh and fragrant")]
    pub text: String,
    #[schema(example = 5)]
    pub stars: i32,
    #[schema(example = 1)]
    pub product_id: i32,
}

/// Number of products that belong to some category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductCount {
    pub count_products: u64,
}

/// Mean rating over every review, `null` when there are none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AverageStars {
    pub avg: Option<f64>,
}

/// `[[category, ...], {"count_products": N}]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryListing(pub Vec<Category>, pub ProductCount);

/// `[[review, ...], {"avg": X}]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewReport(pub Vec<Review>, pub AverageStars);

// ============================================================================
// Request schemas
//
// Every field is optional at the serde level and `required` at the validator
// level, so a missing field is reported per field instead of as a body
// rejection. `into_fields` is meant for payloads that already passed
// `validate()`.
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(required, length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    #[schema(value_type = String, example = "Beverages")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct TagPayload {
    #[validate(required, length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    #[schema(value_type = String, example = "organic")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    #[validate(required, length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    #[schema(value_type = String, example = "Green tea")]
    pub title: Option<String>,

    /// May be empty, but must be present
    #[validate(required)]
    #[schema(value_type = String, example = "Loose leaf, 100 g")]
    pub description: Option<String>,

    #[validate(required, custom(function = "validate_price"))]
    #[schema(value_type = String, example = "4.50")]
    pub price: Option<Decimal>,

    #[validate(required)]
    #[schema(value_type = i32, example = 1)]
    pub category_id: Option<i32>,

    /// Tag ids; duplicates collapse
    #[validate(required)]
    #[schema(value_type = Vec<i32>, example = json!([1, 3]))]
    pub tags: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReviewPayload {
    #[validate(required, length(min = 1), custom(function = "validate_not_blank"))]
    #[schema(value_type = String, example = "Fresh and fragrant")]
    pub text: Option<String>,

    #[validate(required, range(min = 1, max = 5))]
    #[schema(value_type = i32, minimum = 1, maximum = 5, example = 5)]
    pub stars: Option<i32>,

    #[validate(required)]
    #[schema(value_type = i32, example = 1)]
    pub product_id: Option<i32>,
}

// ============================================================================
// Cleaned fields handed to the service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFields {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: i32,
    /// Sorted, without duplicates
    pub tags: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFields {
    pub text: String,
    pub stars: i32,
    pub product_id: i32,
}

impl CategoryPayload {
    pub fn into_fields(self) -> CategoryFields {
        CategoryFields {
            name: self.name.unwrap_or_default().trim().to_string(),
        }
    }
}

impl TagPayload {
    pub fn into_fields(self) -> TagFields {
        TagFields {
            name: self.name.unwrap_or_default().trim().to_string(),
        }
    }
}

impl ProductPayload {
    pub fn into_fields(self) -> ProductFields {
        let mut price = self.price.unwrap_or_default();
        price.rescale(MAX_PRICE_DECIMAL_PLACES);

        let mut tags = self.tags.unwrap_or_default();
        tags.sort_unstable();
        tags.dedup();

        ProductFields {
            title: self.title.unwrap_or_default().trim().to_string(),
            description: self.description.unwrap_or_default(),
            price,
            category_id: self.category_id.unwrap_or_default(),
            tags,
        }
    }
}

impl ReviewPayload {
    pub fn into_fields(self) -> ReviewFields {
        ReviewFields {
            text: self.text.unwrap_or_default().trim().to_string(),
            stars: self.stars.unwrap_or_default(),
            product_id: self.product_id.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn product_payload(value: serde_json::Value) -> ProductPayload {
        serde_json::from_value(value).unwrap()
    }

    fn error_codes(errors: &validator::ValidationErrors, field: &str) -> Vec<String> {
        errors.field_errors()[field]
            .iter()
            .map(|e| e.code.to_string())
            .collect()
    }

    #[test]
    fn test_missing_fields_are_reported_per_field() {
        let errors = product_payload(json!({})).validate().unwrap_err();
        let fields = errors.field_errors();

        for field in ["title", "description", "price", "category_id", "tags"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
        assert_eq!(error_codes(&errors, "title"), vec!["required"]);
    }

    #[test]
    fn test_empty_description_is_allowed() {
        let payload = product_payload(json!({
            "title": "Green tea",
            "description": "",
            "price": "4.50",
            "category_id": 1,
            "tags": []
        }));

        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_price_rules() {
        let base = json!({
            "title": "Green tea",
            "description": "",
            "category_id": 1,
            "tags": []
        });

        for (price, code) in [
            ("-1.00", "min_value"),
            ("1.999", "max_decimal_places"),
            ("10000000000", "max_whole_digits"),
        ] {
            let mut value = base.clone();
            value["price"] = json!(price);
            let errors = product_payload(value).validate().unwrap_err();
            assert_eq!(error_codes(&errors, "price"), vec![code], "price {price}");
        }

        let mut value = base.clone();
        value["price"] = json!("12.500");
        assert!(product_payload(value).validate().is_ok());
    }

    #[test]
    fn test_stars_range() {
        for stars in [0, 6] {
            let payload = ReviewPayload {
                text: Some("ok".into()),
                stars: Some(stars),
                product_id: Some(1),
            };
            let errors = payload.validate().unwrap_err();
            assert_eq!(error_codes(&errors, "stars"), vec!["range"]);
        }
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let payload = TagPayload {
            name: Some("   ".into()),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(error_codes(&errors, "name"), vec!["blank"]);
    }

    #[test]
    fn test_name_too_long() {
        let payload = CategoryPayload {
            name: Some("x".repeat(256)),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(error_codes(&errors, "name"), vec!["length"]);
    }

    #[test]
    fn test_product_fields_are_cleaned() {
        let fields = product_payload(json!({
            "title": "  Green tea ",
            "description": "Loose leaf",
            "price": "4.5",
            "category_id": 2,
            "tags": [3, 1, 3]
        }))
        .into_fields();

        assert_eq!(fields.title, "Green tea");
        assert_eq!(fields.price, dec!(4.50));
        assert_eq!(fields.price.to_string(), "4.50");
        assert_eq!(fields.tags, vec![1, 3]);
    }

    #[test]
    fn test_listing_serializes_as_pair() {
        let listing = CategoryListing(
            vec![Category {
                id: 1,
                name: "Beverages".into(),
            }],
            ProductCount { count_products: 4 },
        );

        assert_eq!(
            serde_json::to_value(&listing).unwrap(),
            json!([[{"id": 1, "name": "Beverages"}], {"count_products": 4}])
        );

        let report = ReviewReport(vec![], AverageStars { avg: None });
        assert_eq!(serde_json::to_value(&report).unwrap(), json!([[], {"avg": null}]));
    }

    #[test]
    fn test_product_price_serializes_as_string() {
        let product = Product {
            id: 1,
            title: "Green tea".into(),
            description: String::new(),
            price: dec!(4.50),
            category_id: 1,
            tags: vec![1],
        };

        assert_eq!(serde_json::to_value(&product).unwrap()["price"], "4.50");
    }
}
