//! Wire format of a copilot operation: snake_case fields and a version.
//!
//! Unknown fields land in `extra` and are written back untouched.

pub mod builder;

use crate::siming::SimingGraph;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const CURRENT_VERSION: u32 = 3;

/// Filled in by lenient parsing when a document has none
pub const DEFAULT_MINIMUM_REQUIRED: &str = "v4.0.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_required: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub opers: Vec<Operator>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub actions: ActionsField,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Operation {
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Compact export without `minimum_required` and `groups`.
    pub fn to_compact_json(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("minimum_required");
            obj.remove("groups");
        }
        Ok(value)
    }

    /// Top-level operators followed by group members.
    pub fn all_operators(&self) -> impl Iterator<Item = &Operator> {
        self.opers
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.opers.iter()))
    }

    pub fn all_operators_mut(&mut self) -> impl Iterator<Item = &mut Operator> {
        self.opers
            .iter_mut()
            .chain(self.groups.iter_mut().flat_map(|g| g.opers.iter_mut()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `actions` holds a flat list, or a Siming graph in older documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionsField {
    Flat(Vec<Action>),
    Graph(SimingGraph),
}

impl Default for ActionsField {
    fn default() -> Self {
        ActionsField::Flat(Vec::new())
    }
}

impl ActionsField {
    pub fn as_flat(&self) -> Option<&[Action]> {
        match self {
            ActionsField::Flat(actions) => Some(actions),
            ActionsField::Graph(_) => None,
        }
    }

    pub fn is_graph(&self) -> bool {
        matches!(self, ActionsField::Graph(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub opers: Vec<Operator>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An operator entry.
///
/// Discs, star level, attack and hp are stored twice on the wire, as flat
/// fields and inside `extensions`. Read them through
/// [`Operator::extensions_view`] and write them through
/// [`Operator::set_extensions`] so both copies always agree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_usage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_times: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discs: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<OperatorExtensions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Operator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Nested values win, flat fields fill the gaps.
    pub fn extensions_view(&self) -> Option<OperatorExtensions> {
        let flat = if self.discs.is_none()
            && self.star_level.is_none()
            && self.attack.is_none()
            && self.hp.is_none()
        {
            None
        } else {
            Some(OperatorExtensions {
                discs: self
                    .discs
                    .iter()
                    .flatten()
                    .map(|&index| DiscSelection::new(index))
                    .collect(),
                star_level: self.star_level,
                attack: self.attack,
                hp: self.hp,
                extra: Map::new(),
            })
        };

        let merged = match (self.extensions.clone(), flat) {
            (Some(mut nested), Some(flat)) => {
                if nested.discs.is_empty() {
                    nested.discs = flat.discs;
                }
                nested.star_level = nested.star_level.or(flat.star_level);
                nested.attack = nested.attack.or(flat.attack);
                nested.hp = nested.hp.or(flat.hp);
                Some(nested)
            }
            (nested, flat) => nested.or(flat),
        };
        merged.filter(|ext| !ext.is_empty())
    }

    pub fn set_extensions(&mut self, extensions: Option<OperatorExtensions>) {
        match extensions.filter(|ext| !ext.is_empty()) {
            Some(ext) => {
                self.discs = (!ext.discs.is_empty())
                    .then(|| ext.discs.iter().map(|d| d.index).collect());
                self.star_level = ext.star_level;
                self.attack = ext.attack;
                self.hp = ext.hp;
                self.extensions = Some(ext);
            }
            None => {
                self.discs = None;
                self.star_level = None;
                self.attack = None;
                self.hp = None;
                self.extensions = None;
            }
        }
    }

    pub fn has_requirements(&self) -> bool {
        self.requirements.as_ref().is_some_and(|r| !r.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elite: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<u8>,
    /// A [`ModuleKind`] code, or the legacy module index in version 2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potentiality: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Requirements {
    pub fn is_empty(&self) -> bool {
        self.elite.is_none()
            && self.level.is_none()
            && self.skill_level.is_none()
            && self.module.is_none()
            && self.potentiality.is_none()
            && self.extra.is_empty()
    }

    pub fn module_kind(&self) -> Option<ModuleKind> {
        self.module.and_then(ModuleKind::from_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Original,
    X,
    Y,
    Delta,
    Alpha,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Original,
        ModuleKind::X,
        ModuleKind::Y,
        ModuleKind::Delta,
        ModuleKind::Alpha,
    ];

    pub fn code(self) -> i32 {
        match self {
            ModuleKind::Original => 0,
            ModuleKind::X => 1,
            ModuleKind::Y => 2,
            ModuleKind::Delta => 3,
            ModuleKind::Alpha => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Original => "原始",
            ModuleKind::X => "χ",
            ModuleKind::Y => "γ",
            ModuleKind::Delta => "Δ",
            ModuleKind::Alpha => "α",
        }
    }
}

/// Disc selection: -1 is any, 0 is unset, positive values index the disc table from 1.
pub const DISC_ANY: i32 = -1;
pub const DISC_UNSET: i32 = 0;
pub const MAX_DISCS: usize = 3;
pub const MAX_STAR_LEVEL: u8 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorExtensions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discs: Vec<DiscSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperatorExtensions {
    pub fn is_empty(&self) -> bool {
        self.discs.is_empty()
            && self.star_level.is_none()
            && self.attack.is_none()
            && self.hp.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscSelection {
    pub index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_stone: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist_star: Option<i32>,
}

impl DiscSelection {
    pub fn new(index: i32) -> Self {
        Self {
            index,
            star_stone: None,
            assist_star: None,
        }
    }
}

/// Chinese aliases and lower-case spellings are accepted, anything else is kept as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    #[default]
    Deploy,
    Skill,
    Retreat,
    SpeedUp,
    BulletTime,
    SkillUsage,
    Output,
    SkillDaemon,
    MoveCamera,
    DrawCard,
    CheckIfStartOver,
    Other(String),
}

impl ActionType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "deploy" | "部署" => ActionType::Deploy,
            "skill" | "技能" => ActionType::Skill,
            "retreat" | "撤退" => ActionType::Retreat,
            "speedup" | "二倍速" => ActionType::SpeedUp,
            "bullettime" | "子弹时间" => ActionType::BulletTime,
            "skillusage" | "技能用法" => ActionType::SkillUsage,
            "output" | "打印" => ActionType::Output,
            "skilldaemon" | "摆完挂机" => ActionType::SkillDaemon,
            "movecamera" | "移动镜头" => ActionType::MoveCamera,
            "drawcard" | "抽卡" => ActionType::DrawCard,
            "checkifstartover" | "检查重开" => ActionType::CheckIfStartOver,
            _ => ActionType::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Deploy => "Deploy",
            ActionType::Skill => "Skill",
            ActionType::Retreat => "Retreat",
            ActionType::SpeedUp => "SpeedUp",
            ActionType::BulletTime => "BulletTime",
            ActionType::SkillUsage => "SkillUsage",
            ActionType::Output => "Output",
            ActionType::SkillDaemon => "SkillDaemon",
            ActionType::MoveCamera => "MoveCamera",
            ActionType::DrawCard => "DrawCard",
            ActionType::CheckIfStartOver => "CheckIfStartOver",
            ActionType::Other(s) => s,
        }
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        ActionType::parse(&s)
    }
}

impl From<ActionType> for String {
    fn from(t: ActionType) -> Self {
        t.as_str().to_string()
    }
}

/// A wire action. `pre_delay` and `post_delay` (legacy `rear_delay`) are gaps
/// between neighbouring actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default)]
    pub kind: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[i32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kills: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_changes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_usage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_times: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Kept as written so integer distances stay integers.
    pub distance: Option<[Number; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rear_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    pub fn new(kind: ActionType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}
