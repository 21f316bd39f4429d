//! The redraw-cycle driver: a foldout of commands, each with an invoke button
//! and its parameter fields.

use crate::registry::{CommandId, CommandRegistry, CommandTarget};
use crate::settings::PanelSettings;
use crate::types::FieldEditor;

pub struct DebugPanel<T: CommandTarget> {
    registry: CommandRegistry<T>,
    settings: PanelSettings,
    expanded: bool,
}

impl<T: CommandTarget> DebugPanel<T> {
    pub fn new(registry: CommandRegistry<T>, settings: PanelSettings) -> Self {
        let expanded = settings.expanded;
        Self {
            registry,
            settings,
            expanded,
        }
    }

    pub fn registry(&self) -> &CommandRegistry<T> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry<T> {
        &mut self.registry
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Replace every command and its parameter state.
    pub fn rediscover(&mut self) -> usize {
        self.registry.discover()
    }

    /// Run one redraw cycle. For each command visible under `runtime_active`, a
    /// pressed invoke button calls the command with the current parameters before
    /// they are edited in this cycle. Returns the commands invoked.
    pub fn draw(
        &mut self,
        target: &mut T,
        editor: &mut dyn FieldEditor,
        runtime_active: bool,
    ) -> Result<Vec<CommandId>, T::Error> {
        self.expanded = editor.foldout(&self.settings.title, self.expanded);
        if !self.expanded {
            return Ok(Vec::new());
        }
        let mut invoked = Vec::new();
        for id in self.registry.visible_commands(runtime_active) {
            let name = self.registry.descriptor(id)?.name().to_string();
            if editor.command_header(&name, &self.settings.invoke_label) {
                self.registry.invoke(id, target)?;
                invoked.push(id);
            }
            self.registry.parameters_mut(id)?.edit_all(editor)?;
        }
        tracing::trace!(invoked = invoked.len(), runtime_active, "drew debug panel");
        Ok(invoked)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::demo::{demo_types, DebugTest};
    use crate::model::{EnumDef, Rect, Value};

    /// Presses every listed button and records the call sequence.
    #[derive(Default)]
    struct Recorder {
        press: Vec<&'static str>,
        float: Option<f32>,
        close: bool,
        calls: Vec<String>,
    }

    impl FieldEditor for Recorder {
        fn foldout(&mut self, title: &str, expanded: bool) -> bool {
            self.calls.push(format!("foldout {title}"));
            expanded && !self.close
        }

        fn command_header(&mut self, name: &str, invoke_label: &str) -> bool {
            self.calls.push(format!("{invoke_label} {name}"));
            self.press.iter().any(|pressed| *pressed == name)
        }

        fn float_field(&mut self, label: &str, value: f32) -> f32 {
            self.calls.push(format!("float {label}"));
            self.float.unwrap_or(value)
        }

        fn rect_field(&mut self, label: &str, value: Rect) -> Rect {
            self.calls.push(format!("rect {label}"));
            value
        }

        fn enum_popup(&mut self, label: &str, _def: EnumDef, selected: usize) -> usize {
            self.calls.push(format!("enum {label}"));
            selected
        }
    }

    fn panel() -> DebugPanel<DebugTest> {
        DebugPanel::new(CommandRegistry::new(demo_types()), PanelSettings::default())
    }

    #[test]
    fn test_outside_runtime_only_edit_mode_commands_are_drawn() {
        let mut panel = panel();
        let mut editor = Recorder::default();
        panel.draw(&mut DebugTest::default(), &mut editor, false).unwrap();
        assert_eq!(
            editor.calls,
            vec![
                "foldout Debug Commands",
                "Invoke AllowInEditMode",
                "rect rect",
                "Invoke Order",
                "enum meal",
                "Invoke Fail",
            ]
        );
    }

    #[test]
    fn test_invoke_runs_before_edit_in_same_cycle() {
        let mut panel = panel();
        let mut target = DebugTest::default();
        let mut editor = Recorder {
            press: vec!["SetSpeed"],
            float: Some(5.5),
            ..Recorder::default()
        };

        let invoked = panel.draw(&mut target, &mut editor, true).unwrap();
        assert_eq!(invoked.len(), 1);
        assert_eq!(target.speed, 0.0);

        panel.draw(&mut target, &mut editor, true).unwrap();
        assert_eq!(target.speed, 5.5);
    }

    #[test]
    fn test_collapsed_panel_draws_nothing() {
        let mut panel = panel();
        let mut editor = Recorder {
            close: true,
            press: vec!["Order"],
            ..Recorder::default()
        };
        let invoked = panel.draw(&mut DebugTest::default(), &mut editor, true).unwrap();
        assert!(invoked.is_empty());
        assert!(!panel.is_expanded());
        assert_eq!(editor.calls, vec!["foldout Debug Commands"]);
    }

    #[test]
    fn test_target_error_stops_the_cycle() {
        let mut panel = panel();
        let mut editor = Recorder {
            press: vec!["Fail"],
            ..Recorder::default()
        };
        assert!(panel.draw(&mut DebugTest::default(), &mut editor, false).is_err());
    }

    #[test]
    fn test_rediscover_resets_parameters() {
        let mut panel = panel();
        let mut target = DebugTest::default();
        let mut editor = Recorder {
            float: Some(2.0),
            ..Recorder::default()
        };
        panel.draw(&mut target, &mut editor, true).unwrap();

        let id = panel.registry().find("SetSpeed").unwrap();
        panel
            .registry_mut()
            .set_parameter_value(id, 0, Value::Float32(5.0))
            .unwrap();
        panel.registry().invoke(id, &mut target).unwrap();
        assert_eq!(target.speed, 5.0);

        panel.rediscover();
        let id = panel.registry().find("SetSpeed").unwrap();
        panel.registry().invoke(id, &mut target).unwrap();
        assert_eq!(target.speed, 0.0);
    }
}
