use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

use editor_debug::demo::{demo_types, DebugTest};
use editor_debug::model::{
    Bounds, BoundsInt, Color, EnumDef, ObjectRef, ParameterShape, Rect, RectInt, Value, Vector2,
    Vector2Int, Vector3, Vector3Int, Vector4,
};
use editor_debug::panel::DebugPanel;
use editor_debug::registry::{self, catalog, CommandId, CommandRegistry};
use editor_debug::settings::PanelSettings;
use editor_debug::types::FieldEditor;

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "editor-debug-cli",
    about = "Inspect and invoke debug commands of the demo target",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Treat the host runtime as active (shows runtime-only commands)
    #[arg(long, global = true)]
    runtime: bool,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Panel settings JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered commands
    List,
    /// Print the JSON schema tool listing
    Schema,
    /// Show all commands, or the parameters of one command
    Help { topic: Option<String> },
    /// Render one panel redraw cycle as text
    Draw,
    /// Invoke a command on a fresh demo target
    Invoke {
        name: String,
        /// Which command to call when several share the name (0-based)
        #[arg(long, default_value_t = 0)]
        overload: usize,
        /// Resize a collection parameter: IDX=N
        #[arg(long = "len", value_parser = parse_len)]
        lens: Vec<(usize, usize)>,
        /// Set a scalar parameter: IDX=VALUE
        #[arg(long = "set", value_parser = parse_set)]
        sets: Vec<(usize, String)>,
        /// Set a collection element: IDX.K=VALUE
        #[arg(long = "element", value_parser = parse_element)]
        elements: Vec<(usize, usize, String)>,
    },
}

fn parse_index(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a non-negative index"))
}

fn parse_len(raw: &str) -> Result<(usize, usize), String> {
    let (index, len) = raw.split_once('=').ok_or("expected IDX=N")?;
    Ok((parse_index(index)?, parse_index(len)?))
}

fn parse_set(raw: &str) -> Result<(usize, String), String> {
    let (index, value) = raw.split_once('=').ok_or("expected IDX=VALUE")?;
    Ok((parse_index(index)?, value.to_string()))
}

fn parse_element(raw: &str) -> Result<(usize, usize, String), String> {
    let (path, value) = raw.split_once('=').ok_or("expected IDX.K=VALUE")?;
    let (index, element) = path.split_once('.').ok_or("expected IDX.K=VALUE")?;
    Ok((parse_index(index)?, parse_index(element)?, value.to_string()))
}

// ── Settings ─────────────────────────────────────────────────────

fn load_settings(path: Option<&PathBuf>) -> Result<PanelSettings, String> {
    let Some(path) = path else {
        return Ok(PanelSettings::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config '{}': {e}", path.display()))?;
    Ok(PanelSettings::from_json(&json)?)
}

// ── Text renderer ────────────────────────────────────────────────

/// Prints every widget it is asked to draw and never changes a value.
struct ConsoleEditor;

impl ConsoleEditor {
    fn field(label: &str, value: &Value) {
        println!("    {label}: {value}");
    }
}

impl FieldEditor for ConsoleEditor {
    fn int_field(&mut self, label: &str, value: i32) -> i32 {
        Self::field(label, &Value::Int32(value));
        value
    }

    fn long_field(&mut self, label: &str, value: i64) -> i64 {
        Self::field(label, &Value::Int64(value));
        value
    }

    fn float_field(&mut self, label: &str, value: f32) -> f32 {
        Self::field(label, &Value::Float32(value));
        value
    }

    fn toggle(&mut self, label: &str, value: bool) -> bool {
        Self::field(label, &Value::Bool(value));
        value
    }

    fn text_field(&mut self, label: &str, value: String) -> String {
        println!("    {label}: {value:?}");
        value
    }

    fn enum_popup(&mut self, label: &str, def: EnumDef, selected: usize) -> usize {
        let name = def.variants().get(selected).copied().unwrap_or("?");
        println!("    {label}: {name} ({})", def.variants().join(" | "));
        selected
    }

    fn vector2_field(&mut self, label: &str, value: Vector2) -> Vector2 {
        Self::field(label, &Value::Vector2(value));
        value
    }

    fn vector2_int_field(&mut self, label: &str, value: Vector2Int) -> Vector2Int {
        Self::field(label, &Value::Vector2Int(value));
        value
    }

    fn vector3_field(&mut self, label: &str, value: Vector3) -> Vector3 {
        Self::field(label, &Value::Vector3(value));
        value
    }

    fn vector3_int_field(&mut self, label: &str, value: Vector3Int) -> Vector3Int {
        Self::field(label, &Value::Vector3Int(value));
        value
    }

    fn vector4_field(&mut self, label: &str, value: Vector4) -> Vector4 {
        Self::field(label, &Value::Vector4(value));
        value
    }

    fn rect_field(&mut self, label: &str, value: Rect) -> Rect {
        Self::field(label, &Value::Rect(value));
        value
    }

    fn rect_int_field(&mut self, label: &str, value: RectInt) -> RectInt {
        Self::field(label, &Value::RectInt(value));
        value
    }

    fn color_field(&mut self, label: &str, value: Color) -> Color {
        Self::field(label, &Value::Color(value));
        value
    }

    fn bounds_field(&mut self, label: &str, value: Bounds) -> Bounds {
        Self::field(label, &Value::Bounds(value));
        value
    }

    fn bounds_int_field(&mut self, label: &str, value: BoundsInt) -> BoundsInt {
        Self::field(label, &Value::BoundsInt(value));
        value
    }

    fn object_field(&mut self, label: &str, value: ObjectRef) -> ObjectRef {
        Self::field(label, &Value::ObjectReference(value));
        value
    }

    fn collection_length(&mut self, label: &str, len: usize) -> usize {
        println!("    {label} (size {len})");
        len
    }

    fn foldout(&mut self, title: &str, expanded: bool) -> bool {
        println!("{} {title}", if expanded { "v" } else { ">" });
        expanded
    }

    fn command_header(&mut self, name: &str, invoke_label: &str) -> bool {
        println!("  {name}  [{invoke_label}]");
        false
    }
}

// ── Subcommands ──────────────────────────────────────────────────

fn print_json(value: &impl serde::Serialize) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn run_list(registry: &CommandRegistry<DebugTest>, runtime: bool, raw: bool) {
    if raw {
        print_json(&catalog::command_catalog(registry));
        return;
    }
    for (_, descriptor) in registry.commands() {
        let mode = if descriptor.allowed_outside_runtime() { "edit mode" } else { "runtime" };
        let marker = if descriptor.is_visible(runtime) { ' ' } else { '-' };
        println!("{marker} {:<32} {mode}", descriptor.signature());
    }
}

fn run_draw(
    registry: CommandRegistry<DebugTest>,
    settings: PanelSettings,
    runtime: bool,
    raw: bool,
) -> Result<(), String> {
    if raw {
        let visible: Vec<JsonValue> = registry
            .commands()
            .filter(|(_, d)| d.is_visible(runtime))
            .map(|(id, d)| {
                serde_json::json!({
                    "signature": d.signature(),
                    "parameters": registry.parameter_model(id).ok(),
                })
            })
            .collect();
        print_json(&serde_json::json!({ "title": settings.title, "commands": visible }));
        return Ok(());
    }
    let mut panel = DebugPanel::new(registry, settings);
    panel
        .draw(&mut DebugTest::default(), &mut ConsoleEditor, runtime)
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn resolve(
    registry: &CommandRegistry<DebugTest>,
    name: &str,
    overload: usize,
) -> Result<CommandId, String> {
    let ids = registry.find_all(name);
    match ids.get(overload) {
        Some(id) => Ok(*id),
        None if ids.is_empty() => Err(editor_debug::error::RegistryError::UnknownCommand {
            name: name.to_string(),
        }
        .into()),
        None => Err(format!(
            "`{name}` has {} overload(s); --overload {overload} is out of range",
            ids.len()
        )),
    }
}

fn shape_of(
    registry: &CommandRegistry<DebugTest>,
    id: CommandId,
    index: usize,
) -> Result<ParameterShape, String> {
    let shapes = registry.descriptor(id)?.parameter_shapes();
    shapes
        .get(index)
        .cloned()
        .ok_or_else(|| format!("parameter index {index} out of range (len {})", shapes.len()))
}

#[allow(clippy::too_many_arguments)]
fn run_invoke(
    mut registry: CommandRegistry<DebugTest>,
    name: &str,
    overload: usize,
    lens: &[(usize, usize)],
    sets: &[(usize, String)],
    elements: &[(usize, usize, String)],
    runtime: bool,
    raw: bool,
) -> Result<(), String> {
    let id = resolve(&registry, name, overload)?;
    if !registry.is_visible(id, runtime)? {
        return Err(format!(
            "`{name}` is only available while the runtime is active (pass --runtime)"
        ));
    }

    for (index, len) in lens {
        registry.resize_collection_parameter(id, *index, *len)?;
    }
    for (index, raw_value) in sets {
        let shape = shape_of(&registry, id, *index)?;
        let value = Value::parse(shape.element(), raw_value)?;
        registry.set_parameter_value(id, *index, value)?;
    }
    for (index, element, raw_value) in elements {
        let shape = shape_of(&registry, id, *index)?;
        let value = Value::parse(shape.element(), raw_value)?;
        registry.set_collection_element(id, *index, *element, value)?;
    }

    let descriptor = registry.descriptor(id)?;
    let arguments =
        registry::execute::build_arguments(descriptor.parameter_shapes(), registry.parameter_model(id)?)?;
    let mut target = DebugTest::default();
    registry.invoke(id, &mut target).map_err(|e| e.to_string())?;

    if raw {
        print_json(&serde_json::json!({
            "command": descriptor.signature(),
            "arguments": arguments,
            "log": target.log,
        }));
    } else {
        for line in &target.log {
            println!("{line}");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    let settings = load_settings(cli.config.as_ref())?;
    let registry = CommandRegistry::<DebugTest>::new(demo_types());

    match cli.command {
        Commands::List => run_list(&registry, cli.runtime, cli.json),
        Commands::Schema => print_json(&catalog::to_json_schema(&registry)),
        Commands::Help { topic } => {
            println!("{}", catalog::help_text(&registry, topic.as_deref(), cli.runtime));
        }
        Commands::Draw => run_draw(registry, settings, cli.runtime, cli.json)?,
        Commands::Invoke {
            name,
            overload,
            lens,
            sets,
            elements,
        } => run_invoke(
            registry,
            &name,
            overload,
            &lens,
            &sets,
            &elements,
            cli.runtime,
            cli.json,
        )?,
    }
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
