//! Siming graphs: recognition and action nodes keyed by name, linked by `next`.

pub mod builder;
pub mod reader;
pub mod templates;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Ordered keys keep compiled graphs byte-for-byte reproducible.
pub type SimingGraph = BTreeMap<String, SimingNode>;

pub const VICTORY_KEY: &str = "抄作业战斗胜利";
pub const RESTART_FULL_KEY: &str = "抄作业全灭重开";
pub const RESTART_MANUAL_KEY: &str = "抄作业点左上角重开";
pub const CONFIG_KEY: &str = "抄作业配置";

pub const DEFAULT_ATTACK_DELAY: u32 = 3000;
pub const DEFAULT_ULTIMATE_DELAY: u32 = 5000;
pub const DEFAULT_DEFENSE_DELAY: u32 = 3000;

pub fn detection_key(round: u32) -> String {
    format!("检测回合{}", round)
}

pub fn action_key(round: u32, order: usize) -> String {
    format!("回合{}行动{}", round, order)
}

/// Sink and config nodes that belong to no round.
pub fn is_fixed_key(key: &str) -> bool {
    matches!(key, VICTORY_KEY | RESTART_FULL_KEY | RESTART_MANUAL_KEY | CONFIG_KEY)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recognition {
    Ocr,
    TemplateMatch,
    ColorMatch,
    DirectHit,
    Other(String),
}

impl From<String> for Recognition {
    fn from(s: String) -> Self {
        match s.as_str() {
            "OCR" => Recognition::Ocr,
            "TemplateMatch" => Recognition::TemplateMatch,
            "ColorMatch" => Recognition::ColorMatch,
            "DirectHit" => Recognition::DirectHit,
            _ => Recognition::Other(s),
        }
    }
}

impl From<Recognition> for String {
    fn from(r: Recognition) -> Self {
        match r {
            Recognition::Ocr => "OCR".to_string(),
            Recognition::TemplateMatch => "TemplateMatch".to_string(),
            Recognition::ColorMatch => "ColorMatch".to_string(),
            Recognition::DirectHit => "DirectHit".to_string(),
            Recognition::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeAction {
    Click,
    Swipe,
    DoNothing,
    Other(String),
}

impl NodeAction {
    pub fn as_str(&self) -> &str {
        match self {
            NodeAction::Click => "Click",
            NodeAction::Swipe => "Swipe",
            NodeAction::DoNothing => "DoNothing",
            NodeAction::Other(s) => s,
        }
    }
}

impl From<String> for NodeAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Click" => NodeAction::Click,
            "Swipe" => NodeAction::Swipe,
            "DoNothing" => NodeAction::DoNothing,
            _ => NodeAction::Other(s),
        }
    }
}

impl From<NodeAction> for String {
    fn from(a: NodeAction) -> Self {
        a.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimingNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognition: Option<Recognition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<NodeAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<[i32; 4]>,
    /// Expected OCR text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<[i32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<[i32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<[i32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<[i32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_doc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SimingNode {
    pub fn push_next(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.next.contains(&key) {
            self.next.push(key);
        }
    }
}

/// Wait (ms) after a normal attack, an ultimate and a defense move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDelays {
    pub attack: u32,
    pub ultimate: u32,
    pub defense: u32,
}

impl Default for ActionDelays {
    fn default() -> Self {
        Self {
            attack: DEFAULT_ATTACK_DELAY,
            ultimate: DEFAULT_ULTIMATE_DELAY,
            defense: DEFAULT_DEFENSE_DELAY,
        }
    }
}

impl ActionDelays {
    /// Reads the config node. Missing keys fall back to the defaults.
    pub fn from_graph(graph: &SimingGraph) -> Option<Self> {
        let node = graph.get(CONFIG_KEY)?;
        let read = |key: &str| {
            node.extra
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
        };
        let defaults = Self::default();
        Some(Self {
            attack: read("attack_delay").unwrap_or(defaults.attack),
            ultimate: read("ultimate_delay").unwrap_or(defaults.ultimate),
            defense: read("defense_delay").unwrap_or(defaults.defense),
        })
    }

    pub fn config_node(&self) -> SimingNode {
        let mut extra = Map::new();
        extra.insert("attack_delay".to_string(), json!(self.attack));
        extra.insert("ultimate_delay".to_string(), json!(self.ultimate));
        extra.insert("defense_delay".to_string(), json!(self.defense));
        SimingNode {
            text_doc: Some("抄作业动作延迟配置".to_string()),
            extra,
            ..Default::default()
        }
    }
}

/// Every `(from, to)` edge whose target is not in the graph.
pub fn dangling_edges(graph: &SimingGraph) -> Vec<(String, String)> {
    graph
        .iter()
        .flat_map(|(key, node)| {
            node.next
                .iter()
                .filter(|target| !graph.contains_key(target.as_str()))
                .map(move |target| (key.clone(), target.clone()))
        })
        .collect()
}
