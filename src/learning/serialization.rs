//! Serialization support for trained agents.
//!
//! A saved agent is a versioned MessagePack snapshot of its value table,
//! configuration, and RNG seed. Save-then-load reproduces identical
//! future decisions given identical random draws. Malformed or
//! mismatched input is fatal at load time; the caller retrains or
//! discards.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::learning::agent::{AgentState, LearningAgent};

/// Versioned on-disk form of a trained agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    state: AgentState,
}

impl SavedAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &LearningAgent) -> Self {
        Self {
            version: Self::VERSION,
            state: agent.export_state(),
        }
    }

    /// Rebuild the agent. The result starts in deployment mode
    /// (learning off).
    pub fn to_agent(&self) -> Result<LearningAgent> {
        if self.version != Self::VERSION {
            return Err(anyhow!(
                "Unsupported agent save format version: {}. Expected {}",
                self.version,
                Self::VERSION
            ));
        }
        Ok(LearningAgent::from_state(self.state.clone()))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize agent")?;

        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize agent")
    }
}
