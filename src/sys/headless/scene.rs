//! RON scenes for the simulator: a starting desktop plus a script of user
//! actions and commands.

use std::path::Path;

use anyhow::{Context, anyhow, bail};
use serde::{Deserialize, Serialize};

use super::{HeadlessHost, Insets, WindowSpec};
use crate::actor::reactor::Command;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::host::DisplayMetrics;
use crate::sys::window::{ClientType, WindowFlags, WindowId, WindowType, WorkspaceId};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub display: DisplayMetrics,
    /// Number of workspaces present at startup.
    #[serde(default = "one")]
    pub workspaces: u32,
    #[serde(default)]
    pub windows: Vec<SceneWindow>,
    /// Title of the window focused before the reactor starts.
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn one() -> u32 {
    1
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SceneWindow {
    pub title: String,
    #[serde(default)]
    pub workspace: u32,
    pub frame: Rect,
    #[serde(default)]
    pub window_type: WindowType,
    #[serde(default)]
    pub client_type: ClientType,
    #[serde(default)]
    pub flags: WindowFlags,
    /// Title of the owner window.
    #[serde(default)]
    pub transient_for: Option<String>,
    #[serde(default)]
    pub decoration: Insets,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Step {
    /// Create a window; it materializes on a later `Show`.
    Open(SceneWindow),
    Show(String),
    Close(String),
    Focus(String),
    Resize(String, Size),
    Move(String, Point),
    Minimize(String),
    Overview(bool),
    AddWorkspace,
    RemoveWorkspace(u32),
    SwitchWorkspace(u32),
    Command(Command),
}

/// What a step asks of the driver besides host-side changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Command(Command),
}

impl Scene {
    pub fn load(path: &Path) -> anyhow::Result<Scene> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Scene> {
        Ok(ron::de::from_str(buf)?)
    }

    /// Builds the starting desktop.
    pub fn build(&self) -> anyhow::Result<HeadlessHost> {
        if self.workspaces == 0 {
            bail!("a scene needs at least one workspace");
        }
        let host = HeadlessHost::with_display(self.display);
        for _ in 1..self.workspaces {
            host.add_workspace();
        }
        host.take_events();
        for window in &self.windows {
            let spec = self.spec(&host, window)?;
            host.add_window(spec);
        }
        if let Some(title) = &self.focus {
            host.focus(lookup(&host, title)?);
        }
        host.take_events();
        Ok(host)
    }

    pub fn apply(&self, host: &HeadlessHost, step: &Step) -> anyhow::Result<Outcome> {
        match step {
            Step::Open(window) => {
                host.open_window(self.spec(host, window)?);
            }
            Step::Show(title) => host.show_window(lookup(host, title)?),
            Step::Close(title) => host.close_window(lookup(host, title)?),
            Step::Focus(title) => host.focus(lookup(host, title)?),
            Step::Resize(title, size) => host.resize(lookup(host, title)?, *size),
            Step::Move(title, to) => host.user_move(lookup(host, title)?, *to),
            Step::Minimize(title) => {
                host.set_flag(lookup(host, title)?, WindowFlags::MINIMIZED, true)
            }
            Step::Overview(visible) => host.set_overview(*visible),
            Step::AddWorkspace => {
                host.add_workspace();
            }
            Step::RemoveWorkspace(ws) => host.remove_workspace(WorkspaceId::new(*ws)),
            Step::SwitchWorkspace(ws) => host.activate_workspace(WorkspaceId::new(*ws)),
            Step::Command(command) => return Ok(Outcome::Command(*command)),
        }
        Ok(Outcome::Done)
    }

    fn spec(&self, host: &HeadlessHost, window: &SceneWindow) -> anyhow::Result<WindowSpec> {
        let mut spec = WindowSpec::new(window.title.clone(), window.frame)
            .on(WorkspaceId::new(window.workspace))
            .of_type(window.window_type)
            .client(window.client_type)
            .flags(window.flags)
            .decorated(window.decoration);
        if let Some(owner) = &window.transient_for {
            spec = spec.transient_for(lookup(host, owner)?);
        }
        Ok(spec)
    }
}

fn lookup(host: &HeadlessHost, title: &str) -> anyhow::Result<WindowId> {
    host.find(title).ok_or_else(|| anyhow!("no window titled {title:?}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::sys::host::Host;

    const SCENE: &str = r#"(
        display: (width: 1920, height: 1080, scale_factor: 1, panel_height: 32),
        workspaces: 2,
        windows: [
            (title: "editor", frame: (origin: (x: 0, y: 40), size: (width: 900, height: 800))),
            (title: "prefs", frame: (origin: (x: 100, y: 100), size: (width: 300, height: 200)),
             window_type: dialog, transient_for: Some("editor")),
            (title: "chat", workspace: 1, frame: (origin: (x: 0, y: 40), size: (width: 500, height: 800))),
        ],
        focus: Some("editor"),
        steps: [
            Open((title: "term", frame: (origin: (x: 0, y: 0), size: (width: 600, height: 400)))),
            Show("term"),
            Command(FocusNext),
        ],
    )"#;

    #[test]
    fn builds_desktop() {
        let scene = Scene::parse(SCENE).unwrap();
        let host = scene.build().unwrap();

        assert_eq!(host.workspaces().len(), 2);
        let editor = host.find("editor").unwrap();
        let prefs = host.find("prefs").unwrap();
        assert_eq!(host.window_info(prefs).unwrap().transient_for, Some(editor));
        assert_eq!(host.workspace_windows(WorkspaceId::new(1)).len(), 1);
        assert_eq!(host.focus_window(), Some(editor));
        assert!(!host.has_pending_events());
    }

    #[test]
    fn applies_steps() {
        let scene = Scene::parse(SCENE).unwrap();
        let host = scene.build().unwrap();

        assert_eq!(scene.apply(&host, &scene.steps[0]).unwrap(), Outcome::Done);
        let term = host.find("term").unwrap();
        assert!(!host.has_surface(term));
        scene.apply(&host, &scene.steps[1]).unwrap();
        assert!(host.has_surface(term));
        assert_eq!(
            scene.apply(&host, &scene.steps[2]).unwrap(),
            Outcome::Command(Command::FocusNext)
        );
    }

    #[test]
    fn unknown_titles_are_errors() {
        let scene = Scene::parse(SCENE).unwrap();
        let host = scene.build().unwrap();
        let err = scene.apply(&host, &Step::Focus("nope".into())).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
