use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Name attached to every log line emitted by the buffer and its worker.
    pub name: String,
    /// Pre-allocated queue slots. The queue still grows without bound.
    pub initial_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            name: "measurements".to_string(),
            initial_capacity: 1024,
        }
    }
}

impl BufferConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
