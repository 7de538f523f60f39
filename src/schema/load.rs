//! Schema loading entry points.
//!
//! These are free functions rather than methods on a decoder: a schema is
//! loaded once and then shared by any number of decoders.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{EnumType, FieldType, MessageType, Schema, normalise_type_name};
use crate::error::SchemaError;

const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;
const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

/// Serializable description of a whole schema.
///
/// Deserialize this from whatever format the caller stores schemas in and
/// pass it to [`load_descriptor`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(default)]
    pub messages: Vec<MessageType>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
}

/// Validate `messages` and `enums` and build a [`Schema`].
///
/// # Errors
///
/// Returns a [`SchemaError`] if a type name is declared twice, a field
/// number is out of range, reserved or duplicated within a message, or a
/// named field type refers to nothing in the set.
///
/// # Examples
///
/// ```
/// use pbstream::schema::{self, FieldDef, MessageType, ScalarType, SchemaProvider};
///
/// let schema = schema::load(
///     [MessageType::new("demo.Numbers")
///         .with_field(FieldDef::new("values", 1, ScalarType::Int32).repeated())],
///     [],
/// )
/// .expect("valid schema");
/// assert!(schema.message(".demo.Numbers").is_some());
/// ```
pub fn load(
    messages: impl IntoIterator<Item = MessageType>,
    enums: impl IntoIterator<Item = EnumType>,
) -> Result<Schema, SchemaError> {
    let mut enum_map = HashMap::new();
    for ty in enums {
        let name = normalise_type_name(&ty.name).to_owned();
        if enum_map.contains_key(&name) {
            return Err(SchemaError::DuplicateType { name });
        }
        enum_map.insert(name, ty);
    }

    let mut message_map = HashMap::new();
    for ty in messages {
        let name = normalise_type_name(&ty.name).to_owned();
        if message_map.contains_key(&name) || enum_map.contains_key(&name) {
            return Err(SchemaError::DuplicateType { name });
        }
        validate_field_numbers(&name, &ty)?;
        message_map.insert(name, ty);
    }

    for (name, ty) in &message_map {
        for field in &ty.fields {
            if let FieldType::Named(target) = &field.field_type {
                let target = normalise_type_name(target);
                if !message_map.contains_key(target) && !enum_map.contains_key(target) {
                    return Err(SchemaError::UnresolvedType {
                        message: name.clone(),
                        field: field.name.clone(),
                        target: target.to_owned(),
                    });
                }
            }
        }
    }

    tracing::debug!(
        messages = message_map.len(),
        enums = enum_map.len(),
        "schema loaded"
    );
    Ok(Schema {
        messages: message_map,
        enums: enum_map,
    })
}

/// Build a [`Schema`] from a deserialized [`SchemaDescriptor`].
///
/// # Errors
///
/// See [`load`].
pub fn load_descriptor(descriptor: SchemaDescriptor) -> Result<Schema, SchemaError> {
    load(descriptor.messages, descriptor.enums)
}

fn validate_field_numbers(message: &str, ty: &MessageType) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in &ty.fields {
        let number = field.number;
        if number == 0 || number > MAX_FIELD_NUMBER || RESERVED_FIELD_NUMBERS.contains(&number) {
            return Err(SchemaError::InvalidFieldNumber {
                message: message.to_owned(),
                field: field.name.clone(),
                number,
            });
        }
        if !seen.insert(number) {
            return Err(SchemaError::DuplicateFieldNumber {
                message: message.to_owned(),
                number,
            });
        }
    }
    Ok(())
}
