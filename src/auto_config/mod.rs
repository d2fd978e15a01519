//! Typed view of the auxiliary `autoConfigs` payload.
//!
//! The bridge forwards the robot's autonomous routines and the paths they
//! drive. The registry caches the raw JSON; this module reads it into
//! structs and resolves a routine into its ordered steps. Unknown fields are
//! ignored and most fields default, so a partially populated payload still
//! reads.


use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ProtocolError;

const NAMED_COMMAND: &str = "named";
const PATH_COMMAND: &str = "path";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoConfig {
    pub autos: HashMap<String, Auto>,
    pub paths: HashMap<String, AutoPath>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    pub position: Position,
    pub rotation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Auto {
    pub starting_pose: Option<Pose>,
    pub command: CommandGroup,
}

/// A `{ type, data: { commands } }` block, used both for a routine's body
/// and for event markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandGroup {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub data: CommandList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandList {
    pub commands: Vec<AutoCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoCommand {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl AutoCommand {
    /// `data.name` of a `named` command
    pub fn named(&self) -> Option<&str> {
        if self.kind != NAMED_COMMAND {
            return None;
        }
        self.data.get("name").and_then(Value::as_str)
    }

    /// `data.pathName` of a `path` command
    pub fn path_name(&self) -> Option<&str> {
        if self.kind != PATH_COMMAND {
            return None;
        }
        self.data.get("pathName").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoPath {
    pub waypoints: Vec<Waypoint>,
    pub event_markers: Vec<EventMarker>,
    pub goal_end_state: Option<PathState>,
    pub preview_starting_state: Option<PathState>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Waypoint {
    pub anchor: Position,
    pub prev_control: Option<Position>,
    pub next_control: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventMarker {
    pub name: String,
    pub waypoint_relative_pos: f64,
    pub command: CommandGroup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathState {
    pub velocity: f64,
    pub rotation: f64,
}

/// One step of a resolved routine
#[derive(Debug, Clone, PartialEq)]
pub enum AutoStep<'a> {
    /// A named command, run by name on the robot
    Named(&'a str),
    /// A path to follow; `path` is `None` when the payload has no such path
    Path { name: &'a str, path: Option<&'a AutoPath> },
    /// Any other command type, kept in place so step indices line up
    Unsupported(&'a AutoCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAuto<'a> {
    pub name: &'a str,
    pub auto: &'a Auto,
    pub steps: Vec<AutoStep<'a>>,
}

impl AutoConfig {
    pub fn from_value(value: &Value) -> Result<Self, ProtocolError> {
        AutoConfig::deserialize(value).map_err(ProtocolError::MalformedAutoConfig)
    }

    /// Sorted routine names
    pub fn auto_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.autos.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up routine `name` and pairs each of its commands with what it
    /// refers to.
    pub fn resolve<'a>(
        &'a self,
        name: &str,
    ) -> Option<ResolvedAuto<'a>> {
        let (name, auto) = self.autos.get_key_value(name)?;
        let steps = auto
            .command
            .data
            .commands
            .iter()
            .map(|command| self.step(command))
            .collect();

        Some(ResolvedAuto {
            name: name.as_str(),
            auto,
            steps,
        })
    }

    fn step<'a>(
        &'a self,
        command: &'a AutoCommand,
    ) -> AutoStep<'a> {
        if let Some(name) = command.named() {
            return AutoStep::Named(name);
        }
        match command.path_name() {
            Some(name) => AutoStep::Path {
                name,
                path: self.paths.get(name),
            },
            None => AutoStep::Unsupported(command),
        }
    }
}
