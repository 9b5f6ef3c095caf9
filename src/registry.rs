use std::collections::HashMap;

use crate::model::{Panel, PanelId};

/// In-memory panel store keyed by id. Filled once after the dataset
/// arrives and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct PanelRegistry {
    panels: Vec<Panel>,
    index: HashMap<PanelId, usize>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a batch of panels. A duplicate id replaces the earlier record
    /// but keeps its position in iteration order. Returns the number of
    /// overwritten records.
    pub fn register<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = Panel>,
    {
        let mut overwritten = 0;
        for panel in records {
            // Mimic "INSERT OR REPLACE"
            if let Some(&slot) = self.index.get(&panel.id) {
                tracing::debug!("Duplicate panel id {}, keeping the last record", panel.id);
                self.panels[slot] = panel;
                overwritten += 1;
            } else {
                self.index.insert(panel.id.clone(), self.panels.len());
                self.panels.push(panel);
            }
        }
        overwritten
    }

    pub fn lookup(&self, id: &PanelId) -> Option<&Panel> {
        self.index.get(id).map(|&slot| &self.panels[slot])
    }

    /// Resolve an id typed as text, e.g. from a command line: an exact string
    /// id wins over an integer id with the same digits.
    pub fn resolve(&self, raw: &str) -> Option<&PanelId> {
        let text = PanelId::from(raw);
        if let Some((id, _)) = self.index.get_key_value(&text) {
            return Some(id);
        }
        let number = PanelId::Number(raw.trim().parse().ok()?);
        self.index.get_key_value(&number).map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
