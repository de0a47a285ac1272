//! Static field-descriptor schemas.
//!
//! A [`Schema`] lists the fields of one record type in declaration order,
//! each with its role markers, declared [`FieldShape`], and a type-erased
//! accessor. Schemas are built once through [`SchemaBuilder`] and then only
//! read, so they can be shared across threads.

use indexmap::IndexMap;
use indexmap::map::Entry;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use crate::errors::ExtractError;
use crate::field::{Categorical, EnumDomain, FieldShape, FieldValue, Role, RoleSet};
use crate::types::{ColumnLabel, FieldName, TypeLabel};

type ReadFn = Box<dyn Fn(&dyn Any) -> Option<FieldValue> + Send + Sync>;
type CopyFn = Box<dyn Fn(&dyn Any, &mut dyn Any) -> bool + Send + Sync>;

/// Any value that can be handed to the extraction engine.
///
/// Blanket-implemented for every `'static + Send + Sync` type, so collections
/// of `&dyn AnyRecord` may mix record types.
pub trait AnyRecord: Any + Send + Sync {
    /// Upcast to `&dyn Any` (the concrete type drives schema lookup).
    fn as_any(&self) -> &dyn Any;
    /// Upcast to `&dyn AnyRecord`.
    fn as_record(&self) -> &dyn AnyRecord;
    /// Readable name of the concrete type.
    fn type_label(&self) -> TypeLabel;
}

impl<T: Any + Send + Sync> AnyRecord for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_record(&self) -> &dyn AnyRecord {
        self
    }

    fn type_label(&self) -> TypeLabel {
        std::any::type_name::<T>()
    }
}

/// A record type that knows how to describe its own fields.
pub trait Record: Any + Send + Sync + Sized {
    /// Declare fields, in declaration order, on `schema`.
    fn describe(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self>;
}

/// One declared field of a record type.
pub struct FieldDescriptor {
    name: FieldName,
    roles: RoleSet,
    shape: FieldShape,
    read: ReadFn,
    copy: Option<CopyFn>,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("roles", &self.roles)
            .field("shape", &self.shape)
            .field("writable", &self.copy.is_some())
            .finish()
    }
}

impl FieldDescriptor {
    /// Declared field name.
    pub fn name(&self) -> FieldName {
        self.name
    }

    /// Role markers carried by this field.
    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    /// Declared shape.
    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    /// Return `true` when this field carries `role`.
    pub fn carries(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    /// Return `true` when this field can be copied between records.
    pub fn is_writable(&self) -> bool {
        self.copy.is_some()
    }

    /// Read the current value; `None` when `record` is not of the schema's type.
    pub fn read(&self, record: &dyn Any) -> Option<FieldValue> {
        (self.read)(record)
    }

    /// Copy this field from `source` to `destination`; `false` when not writable
    /// or either record is of another type.
    pub(crate) fn copy_between(&self, source: &dyn Any, destination: &mut dyn Any) -> bool {
        match &self.copy {
            Some(copy) => copy(source, destination),
            None => false,
        }
    }

    /// One readable label per column this field produces.
    pub fn column_labels(&self) -> Vec<ColumnLabel> {
        match &self.shape {
            FieldShape::Scalar => vec![self.name.to_string()],
            FieldShape::FixedArray(len) => (0..*len)
                .map(|idx| format!("{}[{idx}]", self.name))
                .collect(),
            FieldShape::Enum(domain) => domain
                .members()
                .iter()
                .map(|member| format!("{}={member}", self.name))
                .collect(),
        }
    }
}

/// Ordered field descriptors for one record type.
pub struct Schema {
    type_id: TypeId,
    type_name: TypeLabel,
    fields: IndexMap<FieldName, FieldDescriptor>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.values().collect::<Vec<_>>())
            .finish()
    }
}

impl Schema {
    /// Start declaring the fields of `R`.
    pub fn builder<R: Any + Send + Sync>() -> SchemaBuilder<R> {
        SchemaBuilder {
            type_name: std::any::type_name::<R>(),
            fields: Vec::new(),
            problems: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Build the schema a [`Record`] type declares for itself.
    pub fn of<R: Record>() -> Result<Self, ExtractError> {
        R::describe(Self::builder::<R>()).build()
    }

    /// Identity of the described record type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Readable name of the described record type.
    pub fn type_name(&self) -> TypeLabel {
        self.type_name
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the type declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Return `true` when `record` is an instance of the described type.
    pub fn accepts(&self, record: &dyn Any) -> bool {
        record.type_id() == self.type_id
    }

    /// Fields carrying `role`, in declaration order.
    pub fn classify(&self, role: Role) -> Vec<&FieldDescriptor> {
        self.fields_matching(role.into())
    }

    /// Fields carrying any role in `roles`, in declaration order.
    ///
    /// An empty set names no concrete role and matches nothing.
    pub fn fields_matching(&self, roles: RoleSet) -> Vec<&FieldDescriptor> {
        self.fields
            .values()
            .filter(|field| field.roles.intersects(roles))
            .collect()
    }

    /// Fields marked as model inputs.
    pub fn features(&self) -> Vec<&FieldDescriptor> {
        self.classify(Role::Feature)
    }

    /// Fields marked as model outputs.
    pub fn labels(&self) -> Vec<&FieldDescriptor> {
        self.classify(Role::Label)
    }

    /// Expected vector width for `role` when every field flattens cleanly.
    pub fn width(&self, role: Role) -> usize {
        self.classify(role)
            .iter()
            .map(|field| field.shape.width())
            .sum()
    }

    /// Readable labels for every column produced under `role`.
    pub fn column_labels(&self, role: Role) -> Vec<ColumnLabel> {
        self.classify(role)
            .into_iter()
            .flat_map(FieldDescriptor::column_labels)
            .collect()
    }
}

/// Fluent registration of a record type's fields.
///
/// ```
/// use featurekit::{Role, RoleSet, Schema};
///
/// struct Reading {
///     id: String,
///     temperature: f64,
///     window: [f64; 2],
///     target: bool,
/// }
///
/// let schema = Schema::builder::<Reading>()
///     .scalar("id", RoleSet::EMPTY, |r: &Reading| r.id.clone())
///     .scalar("temperature", Role::Feature, |r: &Reading| r.temperature)
///     .array("window", Role::Feature, 2, |r: &Reading| r.window)
///     .scalar("target", Role::Label, |r: &Reading| r.target)
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.width(Role::Feature), 3);
/// ```
pub struct SchemaBuilder<R> {
    type_name: TypeLabel,
    fields: Vec<FieldDescriptor>,
    problems: Vec<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Any + Send + Sync> SchemaBuilder<R> {
    /// Override the readable type name (defaults to the full Rust path).
    pub fn named(mut self, type_name: TypeLabel) -> Self {
        self.type_name = type_name;
        self
    }

    /// Declare a field with an explicit shape and a raw value accessor.
    ///
    /// The accessor may return values that do not match `shape`; such values
    /// degrade at flatten time instead of failing registration.
    pub fn field<F>(
        mut self,
        name: FieldName,
        roles: impl Into<RoleSet>,
        shape: FieldShape,
        read: F,
    ) -> Self
    where
        F: Fn(&R) -> FieldValue + Send + Sync + 'static,
    {
        match &shape {
            FieldShape::FixedArray(0) => {
                self.problems
                    .push(format!("array field '{name}' must have at least one element"));
            }
            FieldShape::Enum(domain) if domain.is_empty() => {
                self.problems
                    .push(format!("enum field '{name}' has an empty domain"));
            }
            _ => {}
        }
        self.fields.push(FieldDescriptor {
            name,
            roles: roles.into(),
            shape,
            read: Box::new(move |record: &dyn Any| record.downcast_ref::<R>().map(&read)),
            copy: None,
        });
        self
    }

    /// Declare a scalar (numeric-convertible) field.
    pub fn scalar<V, F>(self, name: FieldName, roles: impl Into<RoleSet>, read: F) -> Self
    where
        V: Into<FieldValue>,
        F: Fn(&R) -> V + Send + Sync + 'static,
    {
        self.field(name, roles, FieldShape::Scalar, move |record| {
            read(record).into()
        })
    }

    /// Declare a fixed-length array field of numeric-convertible elements.
    pub fn array<V, F>(
        self,
        name: FieldName,
        roles: impl Into<RoleSet>,
        len: usize,
        read: F,
    ) -> Self
    where
        V: Into<FieldValue>,
        F: Fn(&R) -> V + Send + Sync + 'static,
    {
        self.field(name, roles, FieldShape::FixedArray(len), move |record| {
            read(record).into()
        })
    }

    /// Declare an enumeration field, one-hot encoded over the full domain of `E`.
    pub fn enumeration<E, F>(self, name: FieldName, roles: impl Into<RoleSet>, read: F) -> Self
    where
        E: Categorical,
        F: Fn(&R) -> E + Send + Sync + 'static,
    {
        self.field(
            name,
            roles,
            FieldShape::Enum(EnumDomain::of::<E>()),
            move |record| FieldValue::variant(read(record)),
        )
    }

    /// Mark the most recently declared field as writable, copying it with
    /// `copy(source, destination)`.
    pub fn writable<C>(mut self, copy: C) -> Self
    where
        C: Fn(&R, &mut R) + Send + Sync + 'static,
    {
        match self.fields.last_mut() {
            Some(field) => {
                field.copy = Some(Box::new(
                    move |source: &dyn Any, destination: &mut dyn Any| {
                        match (source.downcast_ref::<R>(), destination.downcast_mut::<R>()) {
                            (Some(source), Some(destination)) => {
                                copy(source, destination);
                                true
                            }
                            _ => false,
                        }
                    },
                ));
            }
            None => self
                .problems
                .push("`writable` called before any field was declared".to_string()),
        }
        self
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> Result<Schema, ExtractError> {
        let type_name = self.type_name;
        let schema_err = |reason: String| ExtractError::Schema { type_name, reason };

        if let Some(problem) = self.problems.into_iter().next() {
            return Err(schema_err(problem));
        }

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for field in self.fields {
            match fields.entry(field.name) {
                Entry::Occupied(_) => {
                    return Err(schema_err(format!(
                        "field '{}' is declared more than once",
                        field.name
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(field);
                }
            }
        }

        Ok(Schema {
            type_id: TypeId::of::<R>(),
            type_name,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Mode {
        Idle,
        Busy,
        Off,
    }

    impl Categorical for Mode {
        const MEMBERS: &'static [Self] = &[Mode::Idle, Mode::Busy, Mode::Off];

        fn member_name(&self) -> &'static str {
            match self {
                Mode::Idle => "Idle",
                Mode::Busy => "Busy",
                Mode::Off => "Off",
            }
        }
    }

    struct Machine {
        serial: String,
        load: f64,
        history: Vec<f64>,
        mode: Mode,
        failed: bool,
    }

    fn machine_schema() -> Schema {
        Schema::builder::<Machine>()
            .named("Machine")
            .scalar("serial", RoleSet::EMPTY, |m: &Machine| m.serial.clone())
            .writable(|src: &Machine, dst: &mut Machine| dst.serial = src.serial.clone())
            .scalar("load", Role::Feature, |m: &Machine| m.load)
            .array("history", Role::Feature, 3, |m: &Machine| m.history.clone())
            .enumeration("mode", Role::Feature | Role::Label, |m: &Machine| m.mode)
            .scalar("failed", Role::Label, |m: &Machine| m.failed)
            .build()
            .unwrap()
    }

    #[test]
    fn classification_keeps_declaration_order() {
        let schema = machine_schema();
        let features: Vec<_> = schema.features().iter().map(|f| f.name()).collect();
        assert_eq!(features, vec!["load", "history", "mode"]);
        let labels: Vec<_> = schema.labels().iter().map(|f| f.name()).collect();
        assert_eq!(labels, vec!["mode", "failed"]);
    }

    #[test]
    fn empty_role_set_matches_nothing() {
        let schema = machine_schema();
        assert!(schema.fields_matching(RoleSet::EMPTY).is_empty());
        assert_eq!(schema.fields_matching(RoleSet::BOTH).len(), 4);
    }

    #[test]
    fn widths_and_column_labels_follow_shapes() {
        let schema = machine_schema();
        assert_eq!(schema.width(Role::Feature), 1 + 3 + 3);
        assert_eq!(schema.width(Role::Label), 3 + 1);
        assert_eq!(
            schema.column_labels(Role::Feature),
            vec![
                "load",
                "history[0]",
                "history[1]",
                "history[2]",
                "mode=Idle",
                "mode=Busy",
                "mode=Off"
            ]
        );
    }

    #[test]
    fn accessors_reject_foreign_records() {
        let schema = machine_schema();
        let machine = Machine {
            serial: "m-1".into(),
            load: 0.5,
            history: vec![],
            mode: Mode::Busy,
            failed: false,
        };
        let load = schema.field("load").unwrap();
        assert_eq!(load.read(&machine), Some(FieldValue::Float(0.5)));
        assert_eq!(load.read(&42_u32), None);
        assert!(schema.accepts(&machine));
        assert!(!schema.accepts(&42_u32));
        assert!(schema.field("serial").unwrap().is_writable());
        assert!(!load.is_writable());
    }

    #[test]
    fn build_rejects_invalid_declarations() {
        let duplicate = Schema::builder::<Machine>()
            .scalar("load", Role::Feature, |m: &Machine| m.load)
            .scalar("load", Role::Label, |m: &Machine| m.load)
            .build()
            .unwrap_err();
        assert!(matches!(
            duplicate,
            ExtractError::Schema { ref reason, .. } if reason.contains("more than once")
        ));

        let empty_array = Schema::builder::<Machine>()
            .array("history", Role::Feature, 0, |m: &Machine| m.history.clone())
            .build()
            .unwrap_err();
        assert!(matches!(
            empty_array,
            ExtractError::Schema { ref reason, .. } if reason.contains("at least one element")
        ));

        let empty_enum = Schema::builder::<Machine>()
            .field(
                "mode",
                Role::Feature,
                FieldShape::Enum(EnumDomain::named("Nothing", [])),
                |_: &Machine| FieldValue::Null,
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            empty_enum,
            ExtractError::Schema { ref reason, .. } if reason.contains("empty domain")
        ));

        let orphan_writable = Schema::builder::<Machine>()
            .writable(|src: &Machine, dst: &mut Machine| dst.load = src.load)
            .build()
            .unwrap_err();
        assert!(matches!(orphan_writable, ExtractError::Schema { .. }));
    }

    #[test]
    fn default_type_name_is_the_rust_path() {
        let schema = Schema::builder::<Machine>().build().unwrap();
        assert!(schema.type_name().ends_with("Machine"));
        assert!(schema.is_empty());
        assert!(schema.classify(Role::Feature).is_empty());
    }
}
