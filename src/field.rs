//! Field-level vocabulary: role markers, declared shapes, and runtime values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

use crate::types::TypeLabel;

/// Semantic role a field plays during extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Model input.
    Feature,
    /// Model output.
    Label,
}

impl Role {
    /// Every concrete role, in canonical order.
    pub const ALL: [Role; 2] = [Role::Feature, Role::Label];

    const fn bit(self) -> u8 {
        match self {
            Role::Feature => 0b01,
            Role::Label => 0b10,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Feature => f.write_str("feature"),
            Role::Label => f.write_str("label"),
        }
    }
}

/// Set of role markers carried by one field.
///
/// A field may carry neither, either, or both roles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleSet {
    bits: u8,
}

impl RoleSet {
    /// No roles: the field is readable (and possibly cloneable) but never extracted.
    pub const EMPTY: RoleSet = RoleSet { bits: 0 };
    /// Both feature and label.
    pub const BOTH: RoleSet = RoleSet {
        bits: Role::Feature.bit() | Role::Label.bit(),
    };

    /// Return `true` when `role` is in the set.
    pub const fn contains(self, role: Role) -> bool {
        self.bits & role.bit() != 0
    }

    /// Return `true` when the set shares at least one role with `other`.
    pub const fn intersects(self, other: RoleSet) -> bool {
        self.bits & other.bits != 0
    }

    /// Return `true` when no role is present.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Add `role` to the set.
    pub fn insert(&mut self, role: Role) {
        self.bits |= role.bit();
    }

    /// Iterate the contained roles in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        RoleSet { bits: role.bit() }
    }
}

impl BitOr for Role {
    type Output = RoleSet;

    fn bitor(self, rhs: Role) -> RoleSet {
        RoleSet {
            bits: self.bit() | rhs.bit(),
        }
    }
}

impl BitOr<Role> for RoleSet {
    type Output = RoleSet;

    fn bitor(self, rhs: Role) -> RoleSet {
        RoleSet {
            bits: self.bits | rhs.bit(),
        }
    }
}

/// A closed, ordered enumeration whose values can be one-hot encoded.
///
/// `MEMBERS` lists every possibility in declaration order; the one-hot
/// position of a value is its index in that list.
///
/// ```
/// use featurekit::Categorical;
///
/// #[derive(Clone, Copy, PartialEq)]
/// enum Weather {
///     Sun,
///     Rain,
///     Snow,
/// }
///
/// impl Categorical for Weather {
///     const MEMBERS: &'static [Self] = &[Weather::Sun, Weather::Rain, Weather::Snow];
///
///     fn member_name(&self) -> &'static str {
///         match self {
///             Weather::Sun => "Sun",
///             Weather::Rain => "Rain",
///             Weather::Snow => "Snow",
///         }
///     }
/// }
///
/// assert_eq!(Weather::Rain.ordinal(), Some(1));
/// ```
pub trait Categorical: Copy + PartialEq + 'static {
    /// Every member of the enumeration, in declaration order.
    const MEMBERS: &'static [Self];

    /// Stable name of this member.
    fn member_name(&self) -> &'static str;

    /// Position of this member in `MEMBERS`.
    fn ordinal(&self) -> Option<usize> {
        Self::MEMBERS.iter().position(|member| member == self)
    }

    /// Numeric value used when a scalar field holds this member.
    ///
    /// Defaults to the declaration position.
    fn discriminant(&self) -> i64 {
        self.ordinal().map(|idx| idx as i64).unwrap_or(-1)
    }
}

/// Full domain of an enumeration-shaped field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumDomain {
    type_name: TypeLabel,
    members: Vec<&'static str>,
}

impl EnumDomain {
    /// Domain of a [`Categorical`] type.
    pub fn of<E: Categorical>() -> Self {
        Self {
            type_name: std::any::type_name::<E>(),
            members: E::MEMBERS.iter().map(|member| member.member_name()).collect(),
        }
    }

    /// Domain built from explicit member names (for fields read through raw accessors).
    pub fn named<I>(type_name: TypeLabel, members: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            type_name,
            members: members.into_iter().collect(),
        }
    }

    /// Enumeration type name.
    pub fn type_name(&self) -> TypeLabel {
        self.type_name
    }

    /// Member names in declaration order.
    pub fn members(&self) -> &[&'static str] {
        &self.members
    }

    /// Domain size.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the domain has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Declared position of `variant`, if it belongs to this domain.
    pub fn position_of(&self, variant: &VariantValue) -> Option<usize> {
        if variant.enum_type != self.type_name {
            return None;
        }
        self.members
            .iter()
            .position(|member| *member == variant.member)
    }
}

/// Declared shape of a field, resolved once at registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FieldShape {
    /// One numeric-convertible value.
    Scalar,
    /// Ordered sequence of exactly `len` numeric-convertible elements.
    FixedArray(usize),
    /// One member of a closed ordered set, one-hot encoded.
    Enum(EnumDomain),
}

impl FieldShape {
    /// Number of columns this field contributes when it flattens cleanly.
    pub fn width(&self) -> usize {
        match self {
            FieldShape::Scalar => 1,
            FieldShape::FixedArray(len) => *len,
            FieldShape::Enum(domain) => domain.len(),
        }
    }

    /// Short shape name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldShape::Scalar => "scalar",
            FieldShape::FixedArray(_) => "array",
            FieldShape::Enum(_) => "enum",
        }
    }
}

/// Identity of one enumeration member read from a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantValue {
    /// Enumeration type the member belongs to.
    pub enum_type: TypeLabel,
    /// Member name.
    pub member: &'static str,
    /// Numeric value used by scalar coercion.
    pub discriminant: i64,
}

impl VariantValue {
    /// Capture the identity of a [`Categorical`] value.
    pub fn of<E: Categorical>(value: E) -> Self {
        Self {
            enum_type: std::any::type_name::<E>(),
            member: value.member_name(),
            discriminant: value.discriminant(),
        }
    }
}

/// Runtime value read from a record field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Absent value.
    Null,
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    Float(f64),
    /// Text, parsed as a number on coercion.
    Text(String),
    /// Ordered sequence of element values.
    Array(Vec<FieldValue>),
    /// Enumeration member.
    Variant(VariantValue),
}

impl FieldValue {
    /// Wrap an enumeration member.
    pub fn variant<E: Categorical>(value: E) -> Self {
        FieldValue::Variant(VariantValue::of(value))
    }
}

macro_rules! field_value_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for FieldValue {
                fn from(value: $source) -> Self {
                    FieldValue::$variant(value as $target)
                }
            }
        )+
    };
}

field_value_from!(Int as i64: i8, i16, i32, i64, isize);
field_value_from!(UInt as u64: u8, u16, u32, u64, usize);
field_value_from!(Float as f64: f32, f64);

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<VariantValue> for FieldValue {
    fn from(value: VariantValue) -> Self {
        FieldValue::Variant(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue> + Clone> From<&[T]> for FieldValue {
    fn from(values: &[T]) -> Self {
        FieldValue::Array(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>, const N: usize> From<[T; N]> for FieldValue {
    fn from(values: [T; N]) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Shade {
        Light,
        Dark,
    }

    impl Categorical for Shade {
        const MEMBERS: &'static [Self] = &[Shade::Light, Shade::Dark];

        fn member_name(&self) -> &'static str {
            match self {
                Shade::Light => "Light",
                Shade::Dark => "Dark",
            }
        }
    }

    #[test]
    fn role_sets_compose_and_query() {
        let both = Role::Feature | Role::Label;
        assert_eq!(both, RoleSet::BOTH);
        assert!(both.contains(Role::Feature) && both.contains(Role::Label));

        let feature = RoleSet::from(Role::Feature);
        assert!(!feature.contains(Role::Label));
        assert!(feature.intersects(both));
        assert!(!RoleSet::EMPTY.intersects(both));
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![Role::Feature, Role::Label]);

        let mut grown = RoleSet::EMPTY;
        assert!(grown.is_empty());
        grown.insert(Role::Label);
        assert_eq!(grown, RoleSet::from(Role::Label));
        assert_eq!(RoleSet::EMPTY | Role::Feature, feature);
    }

    #[test]
    fn shape_width_matches_declaration() {
        assert_eq!(FieldShape::Scalar.width(), 1);
        assert_eq!(FieldShape::FixedArray(4).width(), 4);
        assert_eq!(FieldShape::Enum(EnumDomain::of::<Shade>()).width(), 2);
        assert_eq!(FieldShape::FixedArray(4).kind(), "array");
    }

    #[test]
    fn enum_domain_resolves_members_of_its_own_type_only() {
        let domain = EnumDomain::of::<Shade>();
        assert_eq!(domain.members(), &["Light", "Dark"]);
        assert_eq!(domain.position_of(&VariantValue::of(Shade::Dark)), Some(1));

        let impostor = VariantValue {
            enum_type: "other::Shade",
            member: "Dark",
            discriminant: 1,
        };
        assert_eq!(domain.position_of(&impostor), None);
        assert_eq!(Shade::Dark.discriminant(), 1);
    }

    #[test]
    fn conversions_build_expected_values() {
        assert_eq!(FieldValue::from(3_i32), FieldValue::Int(3));
        assert_eq!(FieldValue::from(3_u8), FieldValue::UInt(3));
        assert_eq!(FieldValue::from(1.5_f32), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from(None::<f64>), FieldValue::Null);
        assert_eq!(
            FieldValue::from([1_i64, 2]),
            FieldValue::Array(vec![FieldValue::Int(1), FieldValue::Int(2)])
        );
        assert_eq!(
            FieldValue::from(&[0.5_f64][..]),
            FieldValue::Array(vec![FieldValue::Float(0.5)])
        );
        assert!(matches!(
            FieldValue::variant(Shade::Light),
            FieldValue::Variant(VariantValue { member: "Light", .. })
        ));
    }
}
