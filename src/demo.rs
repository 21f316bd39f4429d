//! A demo command target used by the CLI and tests.

use thiserror::Error;

use crate::error::RegistryError;
use crate::impl_enum_param;
use crate::model::{DeclaredType, ObjectRef, Rect, ReferenceType, ValueTypeTag};
use crate::registry::{CommandSpec, CommandTable, CommandTarget};
use crate::types::TypeHandlerRegistry;

pub const TRANSFORM: ReferenceType = ReferenceType::new("Transform");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ETest {
    #[default]
    None,
    Pizza,
    Burger,
}

impl_enum_param!(ETest {
    None = "none",
    Pizza = "pizza",
    Burger = "burger",
});

#[derive(Debug, Error, PartialEq)]
pub enum DemoError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("command refused: {0}")]
    Refused(String),
}

/// Records every call it receives so hosts can show what ran.
#[derive(Debug, Default)]
pub struct DebugTest {
    pub speed: f32,
    pub meal: ETest,
    pub following: Option<ObjectRef>,
    pub log: Vec<String>,
}

impl DebugTest {
    fn record(&mut self, line: String) {
        tracing::info!(target: "editor_debug::demo", "{line}");
        self.log.push(line);
    }
}

/// Type handlers for the demo: the built-ins plus a `Transform` reference picker.
pub fn demo_types() -> TypeHandlerRegistry {
    let mut types = TypeHandlerRegistry::new();
    types.register_reference(TRANSFORM);
    types
}

impl CommandTarget for DebugTest {
    type Error = DemoError;

    fn command_table() -> CommandTable<Self> {
        CommandTable::new()
            .command(CommandSpec::new("Test_Base").param::<String>("text"), |t: &mut DebugTest, args| {
                t.record(format!("hello: {}", args.get::<String>(0)?));
                Ok(())
            })
            .command(
                CommandSpec::new("TestArray").param::<Box<[String]>>("strings"),
                |t: &mut DebugTest, args| {
                    let strings: Box<[String]> = args.get(0)?;
                    t.record(format!("TestArray[{}]", strings.join(", ")));
                    Ok(())
                },
            )
            .command(
                CommandSpec::new("TestArray").param::<Vec<i32>>("ints"),
                |t: &mut DebugTest, args| {
                    let ints: Vec<i32> = args.get(0)?;
                    t.record(format!("TestArray{ints:?}"));
                    Ok(())
                },
            )
            .command(
                CommandSpec::new("TestList").param::<Vec<String>>("names"),
                |t: &mut DebugTest, args| {
                    let names: Vec<String> = args.get(0)?;
                    t.record(format!("TestList{names:?}"));
                    Ok(())
                },
            )
            .command(CommandSpec::new("HelloWorld").param::<Rect>("rect"), |t: &mut DebugTest, args| {
                let rect: Rect = args.get(0)?;
                t.record(format!("HelloWorld({}, {}, {}, {})", rect.x, rect.y, rect.width, rect.height));
                Ok(())
            })
            .command(
                CommandSpec::new("AllowInEditMode").param::<Rect>("rect").allow_outside_runtime(),
                |t: &mut DebugTest, args| {
                    let rect: Rect = args.get(0)?;
                    t.record(format!("AllowInEditMode({}x{})", rect.width, rect.height));
                    Ok(())
                },
            )
            .command(CommandSpec::new("SetSpeed").param::<f32>("v"), |t: &mut DebugTest, args| {
                t.speed = args.get(0)?;
                t.record(format!("SetSpeed({})", t.speed));
                Ok(())
            })
            .command(
                CommandSpec::new("Order").param::<ETest>("meal").allow_outside_runtime(),
                |t: &mut DebugTest, args| {
                    t.meal = args.get(0)?;
                    t.record(format!("Order({:?})", t.meal));
                    Ok(())
                },
            )
            .command(
                CommandSpec::new("Follow").param_declared("target", DeclaredType::reference(TRANSFORM)),
                |t: &mut DebugTest, args| {
                    let target = args.reference(0)?;
                    t.following = Some(target);
                    match target.id {
                        Some(id) => t.record(format!("Follow({TRANSFORM} #{id})")),
                        None => t.record("Follow(null)".to_string()),
                    }
                    Ok(())
                },
            )
            .command(
                CommandSpec::new("Grid").param_declared(
                    "rows",
                    DeclaredType::list(DeclaredType::list(DeclaredType::scalar(ValueTypeTag::Int32))),
                ),
                |t: &mut DebugTest, _| {
                    t.record("Grid".to_string());
                    Ok(())
                },
            )
            .command(
                CommandSpec::new("Scale").param_declared("factor", DeclaredType::Unsupported("f64")),
                |t: &mut DebugTest, _| {
                    t.record("Scale".to_string());
                    Ok(())
                },
            )
            .command(
                CommandSpec::new("Fail").param::<String>("reason").allow_outside_runtime(),
                |_: &mut DebugTest, args| Err(DemoError::Refused(args.get::<String>(0)?)),
            )
    }
}
