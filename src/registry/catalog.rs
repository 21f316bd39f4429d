use schemars::schema_for;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::model::{
    Bounds, BoundsInt, Color, ElementType, ParameterShape, Rect, RectInt, ShapeKind, ValueTypeTag,
    Vector2, Vector2Int, Vector3, Vector3Int, Vector4,
};

use super::{CommandDescriptor, CommandRegistry, CommandTarget};

/// One parameter as shown to host surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub type_name: String,
    pub kind: ShapeKind,
}

/// A catalog entry: metadata + JSON schema for the parameters.
#[derive(Debug, Clone, Serialize)]
pub struct CommandCatalogEntry {
    pub name: String,
    pub signature: String,
    pub allowed_outside_runtime: bool,
    pub parameters: Vec<ParameterInfo>,
    pub param_schema: JsonValue,
}

fn empty_object_schema() -> JsonValue {
    serde_json::json!({ "type": "object", "properties": {} })
}

fn schema_value<T: schemars::JsonSchema>() -> JsonValue {
    let root = schema_for!(T);
    let mut value = serde_json::to_value(root).unwrap_or(empty_object_schema());
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
    }
    value
}

/// JSON schema for a single element value.
pub fn element_schema(element: &ElementType) -> JsonValue {
    match element.tag() {
        ValueTypeTag::Int32 => schema_value::<i32>(),
        ValueTypeTag::Bool => schema_value::<bool>(),
        ValueTypeTag::Float32 => schema_value::<f32>(),
        ValueTypeTag::String => schema_value::<String>(),
        ValueTypeTag::Int64 => schema_value::<i64>(),
        ValueTypeTag::Enum => match element.enum_def() {
            Some(def) => serde_json::json!({
                "title": def.type_name(),
                "type": "string",
                "enum": def.variants(),
            }),
            None => serde_json::json!({ "type": "string" }),
        },
        ValueTypeTag::Vector2 => schema_value::<Vector2>(),
        ValueTypeTag::Vector2Int => schema_value::<Vector2Int>(),
        ValueTypeTag::Vector3 => schema_value::<Vector3>(),
        ValueTypeTag::Vector3Int => schema_value::<Vector3Int>(),
        ValueTypeTag::Vector4 => schema_value::<Vector4>(),
        ValueTypeTag::Rect => schema_value::<Rect>(),
        ValueTypeTag::RectInt => schema_value::<RectInt>(),
        ValueTypeTag::Color => schema_value::<Color>(),
        ValueTypeTag::Bounds => schema_value::<Bounds>(),
        ValueTypeTag::BoundsInt => schema_value::<BoundsInt>(),
        ValueTypeTag::ObjectReference(kind) => serde_json::json!({
            "title": kind.name(),
            "description": format!("{kind} reference id, or null"),
            "type": ["integer", "null"],
            "minimum": 0,
        }),
    }
}

/// JSON schema for a parameter: the element schema, wrapped in an array for collections.
pub fn parameter_schema(shape: &ParameterShape) -> JsonValue {
    let element = element_schema(shape.element());
    match shape.kind() {
        ShapeKind::Scalar => element,
        ShapeKind::Array | ShapeKind::List => serde_json::json!({
            "type": "array",
            "items": element,
        }),
    }
}

/// Object schema over all parameters of a command, keyed by parameter name.
pub fn command_schema(descriptor: &CommandDescriptor) -> JsonValue {
    let shapes = descriptor.parameter_shapes();
    if shapes.is_empty() {
        return empty_object_schema();
    }
    let properties: serde_json::Map<String, JsonValue> = shapes
        .iter()
        .map(|shape| (shape.name().to_string(), parameter_schema(shape)))
        .collect();
    let required: Vec<&str> = shapes.iter().map(ParameterShape::name).collect();
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn entry(descriptor: &CommandDescriptor) -> CommandCatalogEntry {
    CommandCatalogEntry {
        name: descriptor.name().to_string(),
        signature: descriptor.signature(),
        allowed_outside_runtime: descriptor.allowed_outside_runtime(),
        parameters: descriptor
            .parameter_shapes()
            .iter()
            .map(|shape| ParameterInfo {
                name: shape.name().to_string(),
                type_name: shape.type_name(),
                kind: shape.kind(),
            })
            .collect(),
        param_schema: command_schema(descriptor),
    }
}

/// The discovered commands of `registry`, in registration order.
pub fn command_catalog<T: CommandTarget>(registry: &CommandRegistry<T>) -> Vec<CommandCatalogEntry> {
    registry.list_commands().into_iter().map(entry).collect()
}

/// Generate JSON Schema formatted tool list.
pub fn to_json_schema<T: CommandTarget>(registry: &CommandRegistry<T>) -> JsonValue {
    JsonValue::Array(
        command_catalog(registry)
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "signature": e.signature,
                    "allowedOutsideRuntime": e.allowed_outside_runtime,
                    "inputSchema": e.param_schema,
                })
            })
            .collect(),
    )
}

/// Help text for host surfaces. No topic lists every command; a command name
/// shows each overload with its parameter schema.
pub fn help_text<T: CommandTarget>(
    registry: &CommandRegistry<T>,
    topic: Option<&str>,
    runtime_active: bool,
) -> String {
    let catalog = command_catalog(registry);
    match topic {
        None => {
            let mut lines = vec!["Available commands:".to_string()];
            for e in &catalog {
                let note = if super::is_visible(e.allowed_outside_runtime, runtime_active) {
                    ""
                } else {
                    "  (runtime only)"
                };
                lines.push(format!("  {}{note}", e.signature));
            }
            if catalog.is_empty() {
                lines.push("  (none)".to_string());
            }
            lines.push(String::new());
            lines.push("Use help <command> for parameter details.".to_string());
            lines.join("\n")
        }
        Some(topic) => {
            let matching: Vec<&CommandCatalogEntry> =
                catalog.iter().filter(|e| e.name == topic).collect();
            if matching.is_empty() {
                return format!("Unknown command: \"{topic}\". Use help to list commands.");
            }
            matching
                .iter()
                .map(|e| {
                    let schema_str = serde_json::to_string_pretty(&e.param_schema)
                        .unwrap_or_else(|_| "{}".to_string());
                    format!(
                        "{}\nEdit mode: {}\n\nParameters:\n{}",
                        e.signature,
                        if e.allowed_outside_runtime { "allowed" } else { "runtime only" },
                        schema_str,
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    }
}
