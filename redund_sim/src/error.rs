use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("injected crash in {name} (call {call})")]
    Crash { name: String, call: u32 },
    #[error("injected timeout in {name} (call {call})")]
    Timeout { name: String, call: u32 },
}

pub type Result<T> = std::result::Result<T, SimError>;
