/// Print file used when a product has no image yet.
pub const PLACEHOLDER_PRINT_FILE: &str = "https://placehold.co/400";

/// (color, [(size, catalog variant id)]) for the base garment every product is printed on.
const CATALOG_VARIANTS: [(&str, [(&str, i64); 4]); 3] = [
    ("Black", [("S", 4016), ("M", 4017), ("L", 4018), ("XL", 4019)]),
    ("White", [("S", 4011), ("M", 4012), ("L", 4013), ("XL", 4014)]),
    ("Navy", [("S", 4111), ("M", 4112), ("L", 4113), ("XL", 4114)]),
];

const FALLBACK_CATALOG_VARIANT: i64 = 4017;

/// Resolves a generic color/size pair to the fulfillment catalog variant id.
///
/// Unknown combinations fall back to Black M.
pub fn catalog_variant_id(color: &str, size: &str) -> i64 {
    CATALOG_VARIANTS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(color.trim()))
        .and_then(|(_, sizes)| {
            sizes
                .iter()
                .find(|(s, _)| s.eq_ignore_ascii_case(size.trim()))
        })
        .map(|(_, id)| *id)
        .unwrap_or(FALLBACK_CATALOG_VARIANT)
}

#[derive(Debug, Clone)]
pub struct SyncVariantRequest {
    pub catalog_variant_id: i64,
    pub retail_price: String,
    pub file_url: String,
}

#[derive(Debug, Clone)]
pub struct SyncProductRequest {
    pub name: String,
    pub thumbnail: Option<String>,
    pub variants: Vec<SyncVariantRequest>,
}

/// Provider-side ids; `variant_ids` is in the same order as the request's variants.
#[derive(Debug, Clone)]
pub struct SyncProduct {
    pub id: i64,
    pub variant_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state_code: Option<String>,
    pub country_code: String,
    pub zip: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentItem {
    pub sync_variant_id: i64,
    pub quantity: i32,
    pub retail_price: String,
}

#[derive(Debug, Clone)]
pub struct FulfillmentOrderRequest {
    /// Local order id.
    pub external_id: String,
    pub recipient: Recipient,
    pub items: Vec<FulfillmentItem>,
}

#[derive(Debug, Clone)]
pub struct FulfillmentOrder {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_is_case_insensitive() {
        assert_eq!(catalog_variant_id("black", "m"), 4017);
        assert_eq!(catalog_variant_id("WHITE", "xl"), 4014);
        assert_eq!(catalog_variant_id("Navy", "S"), 4111);
    }

    #[test]
    fn unknown_combination_falls_back_to_black_m() {
        assert_eq!(catalog_variant_id("Chartreuse", "M"), 4017);
        assert_eq!(catalog_variant_id("Black", "XXXL"), 4017);
    }
}
