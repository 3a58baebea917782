use async_trait::async_trait;
use dashmap::DashMap;

use super::ConversationLog;
use crate::errors::Result;
use crate::models::ConversationTurn;

/// Process-local conversation log, lost on restart
#[derive(Default)]
pub struct MemoryConversationLog {
    turns: DashMap<String, Vec<ConversationTurn>>,
    max_turns: Option<usize>,
}

impl MemoryConversationLog {
    #[must_use]
    pub fn with_max_turns(max_turns: usize) -> Self {
        Self {
            turns: DashMap::new(),
            max_turns: (max_turns > 0).then_some(max_turns),
        }
    }

    /// Total turns across all customers
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.iter().map(|entry| entry.value().len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConversationLog for MemoryConversationLog {
    async fn append(&self, turn: &ConversationTurn) -> Result<()> {
        let mut entry = self.turns.entry(turn.customer_id.clone()).or_default();
        entry.push(turn.clone());
        if let Some(max) = self.max_turns {
            if entry.len() > max {
                let excess = entry.len() - max;
                entry.drain(0..excess);
            }
        }
        Ok(())
    }

    async fn recent(&self, customer_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        Ok(self
            .turns
            .get(customer_id)
            .map(|turns| {
                let start = turns.len().saturating_sub(limit);
                turns[start..].to_vec()
            })
            .unwrap_or_default())
    }
}
