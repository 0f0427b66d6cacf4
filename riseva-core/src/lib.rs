pub mod config;
pub mod message;
pub mod stream;

// Config re-exports
pub use config::{
    Approach,
    Boundary,
    Capability,
    Config,
    ConfigError,
    CourseMaterial,
    GatewaySettings,
    MaterialKind,
    ModelSettings,
    Objective,
    ResponseLength,
    Secrets,
    Settings,
    SettingsError,
    Tone,
    UnitConfig,
};

// Message re-exports
pub use message::{ChatRole, ChatTurnRequest, ConversationMessage, MessageKind, WireMessage};

// Stream protocol re-exports
pub use stream::{DONE_SENTINEL, FrameDecoder, SseLineBuffer, StreamEvent};
