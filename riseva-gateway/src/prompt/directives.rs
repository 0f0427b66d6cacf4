//! Enum-to-prose mappings for the compiled system instruction.
//!
//! Exhaustive matches over the closed configuration enums: adding a variant
//! forces a prose decision here instead of silently compiling to nothing.

use riseva_core::{Approach, ResponseLength, Tone};

/// Teaching-approach directive.
pub fn approach_directive(approach: Approach) -> &'static str {
    match approach {
        Approach::Socratic => {
            "Use the Socratic method: ask guiding questions to help the student discover answers themselves. Never give answers directly — lead the student to understanding through inquiry."
        }
        Approach::StepByStep => {
            "Use a step-by-step approach: break concepts into small, sequential steps with checkpoints. Confirm understanding at each step before proceeding."
        }
        Approach::Conceptual => {
            "Use a conceptual-first approach: build the big picture first, then dive into details. Help students see how individual facts connect to broader themes."
        }
        Approach::ExampleDriven => {
            "Use an example-driven approach: teach through real-world examples, analogies, and concrete scenarios. Make abstract concepts tangible."
        }
    }
}

/// Tone directive.
pub fn tone_directive(tone: Tone) -> &'static str {
    match tone {
        Tone::Encouraging => {
            "Be warm, encouraging, and supportive. Celebrate correct reasoning and gently redirect mistakes."
        }
        Tone::Neutral => {
            "Be clear and straightforward. Focus on accuracy without excessive praise or criticism."
        }
        Tone::Challenging => {
            "Be intellectually challenging. Push the student to think deeper and justify their reasoning rigorously."
        }
    }
}

/// Response-length directive.
pub fn length_directive(length: ResponseLength) -> &'static str {
    match length {
        ResponseLength::Concise => {
            "Keep responses concise — typically 2-3 sentences per response."
        }
        ResponseLength::Medium => {
            "Use moderate response length — a short paragraph with key details."
        }
        ResponseLength::Detailed => {
            "Provide detailed responses with thorough explanations, but still focused."
        }
    }
}

/// Scaffolding directive, derived from the 1-5 level via three tiers.
pub fn scaffolding_directive(scaffolding: u8) -> &'static str {
    if scaffolding <= 2 {
        "Provide minimal scaffolding. Give brief hints and expect the student to work through problems with little guidance. This student can handle challenge."
    } else if scaffolding == 3 {
        "Provide moderate scaffolding. Use guiding questions and partial explanations while still requiring the student to do their own reasoning."
    } else {
        "Provide heavy scaffolding. Break concepts into very small pieces, give detailed step-by-step support, and check understanding frequently."
    }
}
