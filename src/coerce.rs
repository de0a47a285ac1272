use crate::field::FieldValue;

/// Convert one field value to `f64`.
///
/// Numbers convert directly, booleans map to `0.0`/`1.0`, text is trimmed and
/// parsed, and an enumeration member held by a scalar field yields its
/// discriminant. Anything unrepresentable (`Null`, unparseable text, arrays)
/// becomes `f64::NAN`; this function never fails.
pub fn coerce(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Null => f64::NAN,
        FieldValue::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        FieldValue::Int(number) => *number as f64,
        FieldValue::UInt(number) => *number as f64,
        FieldValue::Float(number) => *number,
        FieldValue::Text(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
        FieldValue::Variant(variant) => variant.discriminant as f64,
        FieldValue::Array(_) => f64::NAN,
    }
}

/// Like [`coerce`], for a value that could not be read at all.
pub fn coerce_opt(value: Option<&FieldValue>) -> f64 {
    value.map(coerce).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::VariantValue;

    #[test]
    fn numbers_and_booleans_convert() {
        assert_eq!(coerce(&FieldValue::Int(-4)), -4.0);
        assert_eq!(coerce(&FieldValue::UInt(7)), 7.0);
        assert_eq!(coerce(&FieldValue::Float(2.5)), 2.5);
        assert_eq!(coerce(&FieldValue::Bool(true)), 1.0);
        assert_eq!(coerce(&FieldValue::Bool(false)), 0.0);
    }

    #[test]
    fn numeric_text_parses_after_trimming() {
        assert_eq!(coerce(&FieldValue::from(" 3.25 ")), 3.25);
        assert_eq!(coerce(&FieldValue::from("-1e3")), -1000.0);
    }

    #[test]
    fn unrepresentable_values_become_nan() {
        assert!(coerce(&FieldValue::Null).is_nan());
        assert!(coerce(&FieldValue::from("twelve")).is_nan());
        assert!(coerce(&FieldValue::from("")).is_nan());
        assert!(coerce(&FieldValue::from(vec![1.0_f64])).is_nan());
        assert!(coerce_opt(None).is_nan());
    }

    #[test]
    fn variants_in_scalar_position_use_discriminant() {
        let variant = VariantValue {
            enum_type: "Level",
            member: "High",
            discriminant: 2,
        };
        assert_eq!(coerce(&FieldValue::Variant(variant)), 2.0);
    }
}
