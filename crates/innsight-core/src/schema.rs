/// Arrow schema for the flattened, one-row-per-record view of a
/// [`CanonicalRecord`](crate::CanonicalRecord).
///
/// Every column is non-nullable: unknown values are written as the
/// `"unknown"` sentinel, lists are joined with `"; "`.
pub mod flat {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Text columns, in output order.
    pub const TEXT_COLUMNS: &[&str] = &[
        "source_url",
        "fetched_at",
        "contact_phone",
        "contact_email",
        "contact_address",
        "checkin_time",
        "checkout_time",
        "parking_available",
        "parking_cost",
        "parking_type",
        "wifi",
        "fitness_center",
        "pool",
        "pet_policy",
        "restaurants",
        "nearby_attractions",
    ];

    /// Numeric columns, after the text columns.
    pub const SCORE_COLUMNS: &[&str] = &["confidence_score", "sentiment_score"];

    /// Trailing list column.
    pub const AUDIENCE_COLUMN: &str = "target_audience";

    pub fn record_schema() -> Schema {
        let mut fields: Vec<Field> = TEXT_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect();
        fields.extend(
            SCORE_COLUMNS
                .iter()
                .map(|name| Field::new(*name, DataType::Float64, false)),
        );
        fields.push(Field::new(AUDIENCE_COLUMN, DataType::Utf8, false));
        Schema::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::flat;

    #[test]
    fn record_schema_has_expected_fields() {
        let schema = flat::record_schema();
        assert_eq!(schema.fields().len(), 19);
        assert!(schema.field_with_name("contact_address").is_ok());
        assert!(schema.field_with_name("parking_cost").is_ok());
        assert!(schema.field_with_name("confidence_score").is_ok());
        assert!(!schema.field_with_name("wifi").unwrap().is_nullable());
    }
}
