//! Shared build vocabulary: platforms, target kinds, configurations and module kinds
//!
//! Names parse case-insensitively and always display with their canonical
//! spelling, which is also the spelling written to manifests and receipts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A name that does not match any variant of one of the build enums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNameError {
    pub what: &'static str,
    pub value: String,
    pub valid: Vec<&'static str>,
}

impl fmt::Display for ParseNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid {} name; valid {}s are: {}.",
            self.value,
            self.what,
            self.what,
            self.valid.join(", ")
        )
    }
}

impl std::error::Error for ParseNameError {}

fn parse_name<T: Copy>(
    value: &str,
    what: &'static str,
    all: &[T],
    name_of: fn(T) -> &'static str,
) -> Result<T, ParseNameError> {
    let trimmed = value.trim();
    all.iter()
        .copied()
        .find(|candidate| name_of(*candidate).eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| ParseNameError {
            what,
            value: value.to_string(),
            valid: all.iter().map(|candidate| name_of(*candidate)).collect(),
        })
}

// =============================================================================
// PLATFORM
// =============================================================================

/// Target platform a module can be compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    Win32,
    Win64,
    Mac,
    XboxOne,
    Ps4,
    Ios,
    Android,
    Html5,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 9] = [
        Platform::Win32,
        Platform::Win64,
        Platform::Mac,
        Platform::XboxOne,
        Platform::Ps4,
        Platform::Ios,
        Platform::Android,
        Platform::Html5,
        Platform::Linux,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Win32 => "Win32",
            Platform::Win64 => "Win64",
            Platform::Mac => "Mac",
            Platform::XboxOne => "XboxOne",
            Platform::Ps4 => "PS4",
            Platform::Ios => "IOS",
            Platform::Android => "Android",
            Platform::Html5 => "HTML5",
            Platform::Linux => "Linux",
        }
    }

    /// Parse a `+`-delimited platform list such as `Win64+Mac`.
    ///
    /// Empty segments are ignored, so `""` and `"+"` both yield an empty list.
    pub fn parse_list(value: &str) -> Result<Vec<Platform>, ParseNameError> {
        value
            .split('+')
            .filter(|segment| !segment.trim().is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s, "platform", &Platform::ALL, Platform::as_str)
    }
}

impl TryFrom<String> for Platform {
    type Error = ParseNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.as_str().to_string()
    }
}

// =============================================================================
// TARGET KIND / CONFIGURATION
// =============================================================================

/// Kind of executable a target produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Game,
    Editor,
    Client,
    Server,
    Program,
}

impl TargetKind {
    pub const ALL: [TargetKind; 5] = [
        TargetKind::Game,
        TargetKind::Editor,
        TargetKind::Client,
        TargetKind::Server,
        TargetKind::Program,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Game => "Game",
            TargetKind::Editor => "Editor",
            TargetKind::Client => "Client",
            TargetKind::Server => "Server",
            TargetKind::Program => "Program",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s, "target kind", &TargetKind::ALL, TargetKind::as_str)
    }
}

/// Build configuration of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Configuration {
    Debug,
    DebugGame,
    Development,
    Shipping,
    Test,
}

impl Configuration {
    pub const ALL: [Configuration; 5] = [
        Configuration::Debug,
        Configuration::DebugGame,
        Configuration::Development,
        Configuration::Shipping,
        Configuration::Test,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Configuration::Debug => "Debug",
            Configuration::DebugGame => "DebugGame",
            Configuration::Development => "Development",
            Configuration::Shipping => "Shipping",
            Configuration::Test => "Test",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s, "configuration", &Configuration::ALL, Configuration::as_str)
    }
}

// =============================================================================
// MODULE KIND
// =============================================================================

/// Where a module is hosted, which decides the target kinds it compiles into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    Runtime,
    RuntimeNoCommandlet,
    RuntimeAndProgram,
    Developer,
    Editor,
    EditorNoCommandlet,
    Program,
}

impl ModuleKind {
    /// Whether a module of this kind is part of a target of the given kind
    pub fn is_hosted_by(self, target: TargetKind) -> bool {
        match self {
            ModuleKind::Runtime | ModuleKind::RuntimeNoCommandlet => {
                target != TargetKind::Program
            }
            ModuleKind::RuntimeAndProgram => true,
            ModuleKind::Developer => matches!(target, TargetKind::Editor | TargetKind::Program),
            ModuleKind::Editor | ModuleKind::EditorNoCommandlet => target == TargetKind::Editor,
            ModuleKind::Program => target == TargetKind::Program,
        }
    }
}
