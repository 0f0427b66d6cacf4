//! Unit tutoring configuration: the teacher-authored contract for one
//! curricular unit.
//!
//! The wire format is camelCase JSON, matching what the web client sends.
//! Every field carries a serde default taken from the default document, so a
//! partial configuration deep-merges field-wise over the defaults and the
//! prompt compiler is never handed undefined behavior.

use serde::{Deserialize, Deserializer, Serialize};

/// Scaffolding level bounds.
pub const SCAFFOLDING_MIN: u8 = 1;
pub const SCAFFOLDING_MAX: u8 = 5;

/// Pedagogical style directive compiled into the system instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Approach {
    #[default]
    Socratic,
    StepByStep,
    Conceptual,
    ExampleDriven,
}

impl From<&str> for Approach {
    fn from(s: &str) -> Self {
        match s {
            "step-by-step" => Approach::StepByStep,
            "conceptual" => Approach::Conceptual,
            "example-driven" => Approach::ExampleDriven,
            // Unknown approaches fall back to the socratic directive.
            _ => Approach::Socratic,
        }
    }
}

impl<'de> Deserialize<'de> for Approach {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Approach::from(s.as_str()))
    }
}

/// Tutor tone directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Encouraging,
    Neutral,
    Challenging,
}

impl From<&str> for Tone {
    fn from(s: &str) -> Self {
        match s {
            "neutral" => Tone::Neutral,
            "challenging" => Tone::Challenging,
            _ => Tone::Encouraging,
        }
    }
}

impl<'de> Deserialize<'de> for Tone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Tone::from(s.as_str()))
    }
}

/// Response length directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLength {
    Concise,
    #[default]
    Medium,
    Detailed,
}

impl From<&str> for ResponseLength {
    fn from(s: &str) -> Self {
        match s {
            "concise" => ResponseLength::Concise,
            "detailed" => ResponseLength::Detailed,
            _ => ResponseLength::Medium,
        }
    }
}

impl<'de> Deserialize<'de> for ResponseLength {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ResponseLength::from(s.as_str()))
    }
}

/// A learning objective, rendered in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: u32,
    pub text: String,
    /// Depth label ("Explain", "Apply", ...), rendered as `- [depth] text`.
    pub depth: String,
}

/// A teacher-toggleable restriction injected into the compiled instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub label: String,
    pub enabled: bool,
    #[serde(default)]
    pub category: String,
}

/// A teacher-toggleable permission injected into the compiled instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub label: String,
    pub enabled: bool,
}

/// Source format of an uploaded reference material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Pdf,
    Txt,
    #[default]
    #[serde(other)]
    Paste,
}

/// A reference material attached to the unit, already extracted to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMaterial {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: MaterialKind,
    pub content: String,
    #[serde(default)]
    pub added_at: String,
    #[serde(default)]
    pub char_count: usize,
}

/// The teacher-authored tutoring contract for one curricular unit.
///
/// Read-only to the prompt compiler and to students; mutated only through
/// explicit teacher saves in the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConfig {
    #[serde(default)]
    pub approach: Approach,
    /// 1-5, how much step-by-step support the tutor provides.
    #[serde(default = "default_scaffolding")]
    pub scaffolding: u8,
    #[serde(default)]
    pub response_length: ResponseLength,
    #[serde(default)]
    pub tone: Tone,
    /// Failed attempts on a concept before a more guided explanation.
    #[serde(default = "default_max_hints")]
    pub max_hints: u32,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<Boundary>,
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub allowed_sources: Vec<String>,
    #[serde(default)]
    pub materials: Vec<CourseMaterial>,
}

fn default_scaffolding() -> u8 {
    3
}

fn default_max_hints() -> u32 {
    3
}

fn default_boundaries() -> Vec<Boundary> {
    let entries: [(&str, &str); 6] = [
        ("Never provide direct answers to assessment questions", "Safety"),
        ("Don't write essays or complete assignments for students", "Safety"),
        ("Restrict to unit-specific topics only", "Alignment"),
        ("Always ask a follow-up question after explaining", "Mastery"),
        ("Allow students to request practice problems", "Mastery"),
        ("Redirect off-topic questions back to unit material", "Alignment"),
    ];
    entries
        .into_iter()
        .map(|(label, category)| Boundary {
            label: label.to_string(),
            enabled: true,
            category: category.to_string(),
        })
        .collect()
}

fn default_capabilities() -> Vec<Capability> {
    [
        "Generate practice problems",
        "Create concept breakdowns",
        "Adaptive difficulty adjustment",
        "Multiple explanation styles",
    ]
    .into_iter()
    .map(|label| Capability {
        label: label.to_string(),
        enabled: true,
    })
    .collect()
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            approach: Approach::Socratic,
            scaffolding: default_scaffolding(),
            response_length: ResponseLength::Medium,
            tone: Tone::Encouraging,
            max_hints: default_max_hints(),
            objectives: Vec::new(),
            boundaries: default_boundaries(),
            capabilities: default_capabilities(),
            allowed_sources: Vec::new(),
            materials: Vec::new(),
        }
    }
}

impl UnitConfig {
    /// Clamp numeric fields into their documented ranges.
    ///
    /// `scaffolding` must stay in 1-5 and `max_hints` must stay >= 1 no
    /// matter what the client sent.
    pub fn normalized(mut self) -> Self {
        self.scaffolding = self.scaffolding.clamp(SCAFFOLDING_MIN, SCAFFOLDING_MAX);
        self.max_hints = self.max_hints.max(1);
        self
    }

    /// Boundaries with `enabled = true`, in insertion order.
    pub fn enabled_boundaries(&self) -> impl Iterator<Item = &Boundary> {
        self.boundaries.iter().filter(|b| b.enabled)
    }

    /// Capabilities with `enabled = true`, in insertion order.
    pub fn enabled_capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().filter(|c| c.enabled)
    }
}
