//! Round action model: `{"round": [["token"], ...]}`.
//!
//! The intermediate form between editor actions and Siming graphs.

pub mod import;
pub mod mapper;
pub mod token;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Where an editor action came from when it was generated from a round token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTag {
    pub round: u32,
    /// Zero-based position within the round
    pub order: usize,
    pub token: String,
}

/// Rounds are keyed numerically, so round 10 sorts after round 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundActionModel {
    rounds: BTreeMap<u32, Vec<String>>,
}

impl RoundActionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, round: u32, token: impl Into<String>) {
        self.rounds.entry(round).or_default().push(token.into());
    }

    pub fn push_front(&mut self, round: u32, token: impl Into<String>) {
        self.rounds.entry(round).or_default().insert(0, token.into());
    }

    /// Adds an empty round. The graph builder links it straight to the next one.
    pub fn ensure_round(&mut self, round: u32) {
        self.rounds.entry(round).or_default();
    }

    pub fn round(&self, round: u32) -> Option<&[String]> {
        self.rounds.get(&round).map(|v| v.as_slice())
    }

    pub fn rounds(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.rounds.iter().map(|(r, tokens)| (*r, tokens.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn token_count(&self) -> usize {
        self.rounds.values().map(Vec::len).sum()
    }

    /// Trims tokens and drops empty tokens and empty rounds.
    pub fn normalized(self) -> Self {
        let rounds = self
            .rounds
            .into_iter()
            .filter_map(|(round, tokens)| {
                let tokens: Vec<String> = tokens
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                (!tokens.is_empty()).then_some((round, tokens))
            })
            .collect();
        Self { rounds }
    }

    /// Lenient read: non-numeric round keys are skipped, bare strings are accepted.
    pub fn from_value(value: &Value) -> Self {
        let mut model = Self::new();
        let Some(obj) = value.as_object() else {
            return model;
        };

        for (key, entries) in obj {
            let Ok(round) = key.trim().parse::<u32>() else {
                warn!(key = %key, "Skipping non-numeric round key");
                continue;
            };
            model.ensure_round(round);
            let Some(entries) = entries.as_array() else {
                continue;
            };
            for entry in entries {
                match entry {
                    Value::String(s) => model.push(round, s.clone()),
                    Value::Array(inner) => {
                        for item in inner.iter().filter_map(|v| v.as_str()) {
                            model.push(round, item);
                        }
                    }
                    _ => {}
                }
            }
        }

        model.normalized()
    }

    /// True for a non-empty object of arrays with at least one numeric key.
    pub fn looks_like(value: &Value) -> bool {
        match value.as_object() {
            Some(obj) if !obj.is_empty() => {
                obj.values().all(Value::is_array)
                    && obj.keys().any(|k| k.trim().parse::<u32>().is_ok())
            }
            _ => false,
        }
    }
}

impl Serialize for RoundActionModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rounds.len()))?;
        for (round, tokens) in &self.rounds {
            let singletons: Vec<[&str; 1]> = tokens.iter().map(|t| [t.as_str()]).collect();
            map.serialize_entry(&round.to_string(), &singletons)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RoundActionModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
