use anyhow::{anyhow, bail, Context, Result};

use crate::app::AppEvent;
use crate::model::PanelId;
use crate::registry::PanelRegistry;

/// One line of driver input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Zoom(f64),
    Select(String),
    TouchStart(f64),
    TouchMove(f64),
    TouchEnd(f64),
    Close,
    IconFailed(String),
    State,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb {
            "zoom" => Command::Zoom(number(words.next(), "zoom level")?),
            "select" => Command::Select(rest(words, "panel id")?),
            "icon-failed" => Command::IconFailed(rest(words, "panel id")?),
            "touch" => {
                let phase = words.next().ok_or_else(|| anyhow!("touch needs start, move or end"))?;
                let y = number(words.next(), "touch position")?;
                match phase {
                    "start" => Command::TouchStart(y),
                    "move" => Command::TouchMove(y),
                    "end" => Command::TouchEnd(y),
                    other => bail!("Unknown touch phase '{}'", other),
                }
            }
            "close" => Command::Close,
            "state" => Command::State,
            "quit" | "exit" => Command::Quit,
            other => bail!("Unknown command '{}'", other),
        };
        Ok(Some(command))
    }

    /// Event for the session, `None` for driver-only commands.
    pub fn to_event(&self, registry: &PanelRegistry) -> Result<Option<AppEvent>> {
        Ok(Some(match self {
            Command::Zoom(z) => AppEvent::ZoomChanged(*z),
            Command::Select(raw) => AppEvent::PanelSelected(resolve(registry, raw)?),
            Command::IconFailed(raw) => AppEvent::IconFailed(resolve(registry, raw)?),
            Command::TouchStart(y) => AppEvent::TouchStart(*y),
            Command::TouchMove(y) => AppEvent::TouchMove(*y),
            Command::TouchEnd(y) => AppEvent::TouchEnd(*y),
            Command::Close => AppEvent::CloseClicked,
            Command::State | Command::Quit => return Ok(None),
        }))
    }
}

fn number(word: Option<&str>, what: &str) -> Result<f64> {
    let word = word.ok_or_else(|| anyhow!("Missing {}", what))?;
    let value: f64 = word
        .parse()
        .with_context(|| format!("Invalid {} '{}'", what, word))?;
    if !value.is_finite() {
        bail!("Invalid {} '{}'", what, word);
    }
    Ok(value)
}

// Ids may contain spaces
fn rest<'a>(words: impl Iterator<Item = &'a str>, what: &str) -> Result<String> {
    let joined = words.collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        bail!("Missing {}", what);
    }
    Ok(joined)
}

fn resolve(registry: &PanelRegistry, raw: &str) -> Result<PanelId> {
    registry
        .resolve(raw)
        .cloned()
        .ok_or_else(|| anyhow!("No panel with id '{}'", raw))
}
