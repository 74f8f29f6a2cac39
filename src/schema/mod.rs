//! Lenient parsing. Every import path (network, file, share code, paste)
//! goes through here first.
//!
//! Keys are converted to snake_case and a missing `minimum_required` is
//! filled in. Fixable types are repaired in place (`"3"` becomes `3`), the
//! rest is removed with an [`Issue`]. Unknown fields are kept. The result is
//! always accepted by the converters.

pub mod strict;

use crate::error::{CopilotError, Issue, Result};
use crate::maa::{DEFAULT_MINIMUM_REQUIRED, Operation};
use crate::reconcile::casing::{Case, convert_keys};
use crate::rounds::RoundActionModel;
use crate::rounds::mapper::{
    MapperOptions, round_actions_to_actions, slot_assignments_from_opers,
};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

pub use strict::{validate, validate_json};

/// Fields whose keys are data rather than field names
const DATA_KEYED: &[&str] = &["actions", "siming_actions", "simingActions"];

pub fn parse_loose(raw: &str) -> Result<Operation> {
    parse_loose_with_issues(raw).map(|(operation, _)| operation)
}

/// Like [`parse_loose`], also returning what was repaired.
pub fn parse_loose_with_issues(raw: &str) -> Result<(Operation, Vec<Issue>)> {
    let value: Value = serde_json::from_str(raw).map_err(|e| CopilotError::syntax(&e))?;
    parse_loose_value(value)
}

pub fn parse_loose_value(value: Value) -> Result<(Operation, Vec<Issue>)> {
    if !value.is_object() {
        return Err(CopilotError::Schema(vec![Issue::root("作业必须是 JSON 对象")]));
    }

    let (value, issues) = sanitize(value);
    for issue in &issues {
        debug!(issue = %issue, "Loose parse repaired a field");
    }

    let operation: Operation = serde_json::from_value(value)
        .map_err(|e| CopilotError::Schema(vec![Issue::root(e.to_string())]))?;
    if !issues.is_empty() {
        warn!(repaired = issues.len(), "Operation needed loose repairs");
    }
    Ok((operation, issues))
}

pub fn sanitize(value: Value) -> (Value, Vec<Issue>) {
    let mut sanitizer = Sanitizer::default();
    let value = convert_keys(value, Case::Snake, DATA_KEYED);
    let value = match value {
        Value::Object(obj) => Value::Object(sanitizer.operation(obj)),
        other => other,
    };
    (value, sanitizer.issues)
}

#[derive(Debug, Clone, Copy)]
enum Num {
    /// Non-negative with an upper bound
    Unsigned(u64),
    Signed,
    Float,
}

const U8: Num = Num::Unsigned(u8::MAX as u64);
const U32: Num = Num::Unsigned(u32::MAX as u64);

fn coerce_number(value: &Value, kind: Num) -> Option<Value> {
    let float = match value {
        // keep the number as written, `1` must not come back as `1.0`
        Value::Number(_) if matches!(kind, Num::Float) => return Some(value.clone()),
        Value::Number(n) => {
            if let (Num::Unsigned(max), Some(v)) = (kind, n.as_u64()) {
                return (v <= max).then(|| json!(v));
            }
            if let (Num::Signed, Some(v)) = (kind, n.as_i64()) {
                return i32::try_from(v).ok().map(|v| json!(v));
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !float.is_finite() {
        return None;
    }
    match kind {
        Num::Float => Some(json!(float)),
        Num::Signed => {
            let v = float.round();
            (v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX)).then(|| json!(v as i32))
        }
        Num::Unsigned(max) => {
            let v = float.round();
            (v >= 0.0 && v <= max as f64).then(|| json!(v as u64))
        }
    }
}

fn child(path: &[String], key: impl ToString) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(key.to_string());
    path
}

#[derive(Debug, Default)]
struct Sanitizer {
    issues: Vec<Issue>,
}

impl Sanitizer {
    fn note(&mut self, path: Vec<String>, message: &str) {
        self.issues.push(Issue {
            path,
            message: message.to_string(),
        });
    }

    fn number(&mut self, obj: &mut Map<String, Value>, path: &[String], key: &str, kind: Num) {
        let Some(value) = obj.get(key) else {
            return;
        };
        if value.is_null() {
            obj.remove(key);
            return;
        }
        match coerce_number(value, kind) {
            Some(fixed) => {
                if !value.is_number() {
                    self.note(child(path, key), "已将字符串转换为数值");
                }
                obj.insert(key.to_string(), fixed);
            }
            None => {
                obj.remove(key);
                self.note(child(path, key), "无法识别的数值，已忽略");
            }
        }
    }

    fn string(&mut self, obj: &mut Map<String, Value>, path: &[String], key: &str) {
        let fixed = match obj.get(key) {
            None | Some(Value::String(_)) => return,
            Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(_) => None,
        };
        match fixed {
            Some(s) => {
                obj.insert(key.to_string(), Value::String(s));
                self.note(child(path, key), "已转换为字符串");
            }
            None => {
                obj.remove(key);
                self.note(child(path, key), "应为字符串，已忽略");
            }
        }
    }

    /// Fixed-length number arrays such as locations and regions.
    fn tuple(
        &mut self,
        obj: &mut Map<String, Value>,
        path: &[String],
        key: &str,
        len: usize,
        kind: Num,
    ) {
        let Some(value) = obj.get(key) else {
            return;
        };
        let fixed = value.as_array().filter(|items| items.len() == len).and_then(|items| {
            items
                .iter()
                .map(|item| coerce_number(item, kind))
                .collect::<Option<Vec<Value>>>()
        });
        match fixed {
            Some(items) => {
                obj.insert(key.to_string(), Value::Array(items));
            }
            None => {
                if !value.is_null() {
                    self.note(child(path, key), "坐标格式错误，已忽略");
                }
                obj.remove(key);
            }
        }
    }

    /// Arrays of objects. Other items are dropped, except bare strings when
    /// `wrap` names the field to put them in.
    fn objects(
        &mut self,
        obj: &mut Map<String, Value>,
        path: &[String],
        key: &str,
        wrap: Option<&str>,
    ) -> Vec<Map<String, Value>> {
        let items = match obj.remove(key) {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.note(child(path, key), "应为数组，已忽略");
                return Vec::new();
            }
        };
        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match (item, wrap) {
                (Value::Object(map), _) => out.push(map),
                (Value::String(s), Some(field)) => {
                    let mut map = Map::new();
                    map.insert(field.to_string(), Value::String(s));
                    out.push(map);
                }
                _ => self.note(child(&child(path, key), idx), "不是对象，已丢弃"),
            }
        }
        out
    }

    fn operation(&mut self, mut obj: Map<String, Value>) -> Map<String, Value> {
        let root: Vec<String> = Vec::new();

        match obj.get("minimum_required") {
            Some(Value::String(_)) => {}
            _ => {
                obj.insert(
                    "minimum_required".to_string(),
                    Value::String(DEFAULT_MINIMUM_REQUIRED.to_string()),
                );
            }
        }
        self.number(&mut obj, &root, "version", U32);
        self.number(&mut obj, &root, "difficulty", U32);
        self.string(&mut obj, &root, "stage_name");

        let doc = match obj.remove("doc") {
            Some(Value::Object(doc)) => doc,
            Some(Value::String(title)) => {
                let mut doc = Map::new();
                doc.insert("title".to_string(), Value::String(title));
                doc
            }
            _ => Map::new(),
        };
        obj.insert("doc".to_string(), Value::Object(self.doc(doc)));

        let opers: Vec<Value> = self
            .objects(&mut obj, &root, "opers", Some("name"))
            .into_iter()
            .enumerate()
            .map(|(idx, oper)| {
                Value::Object(self.operator(oper, &child(&child(&root, "opers"), idx)))
            })
            .collect();

        let groups: Vec<Value> = self
            .objects(&mut obj, &root, "groups", Some("name"))
            .into_iter()
            .enumerate()
            .map(|(idx, group)| {
                Value::Object(self.group(group, &child(&child(&root, "groups"), idx)))
            })
            .collect();

        let names: Vec<String> = opers
            .iter()
            .filter_map(|o| o.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        obj.insert("opers".to_string(), Value::Array(opers));
        obj.insert("groups".to_string(), Value::Array(groups));

        let actions = self.actions(obj.remove("actions"), &names);
        obj.insert("actions".to_string(), actions);

        if let Some(graph) = obj.remove("siming_actions") {
            match graph {
                Value::Object(graph) => {
                    let graph = self.graph(graph, &child(&root, "siming_actions"));
                    obj.insert("siming_actions".to_string(), Value::Object(graph));
                }
                Value::Null => {}
                _ => self.note(child(&root, "siming_actions"), "应为对象，已忽略"),
            }
        }

        obj
    }

    fn doc(&mut self, mut doc: Map<String, Value>) -> Map<String, Value> {
        let path = vec!["doc".to_string()];
        for key in ["title", "details", "title_color", "details_color"] {
            self.string(&mut doc, &path, key);
        }
        doc
    }

    fn group(&mut self, mut group: Map<String, Value>, path: &[String]) -> Map<String, Value> {
        self.string(&mut group, path, "name");
        let opers: Vec<Value> = self
            .objects(&mut group, path, "opers", Some("name"))
            .into_iter()
            .enumerate()
            .map(|(idx, oper)| {
                Value::Object(self.operator(oper, &child(&child(path, "opers"), idx)))
            })
            .collect();
        group.insert("opers".to_string(), Value::Array(opers));
        group
    }

    fn operator(&mut self, mut oper: Map<String, Value>, path: &[String]) -> Map<String, Value> {
        self.string(&mut oper, path, "name");
        self.number(&mut oper, path, "skill", U8);
        self.number(&mut oper, path, "skill_usage", U32);
        self.number(&mut oper, path, "skill_times", U32);
        self.number(&mut oper, path, "star_level", U8);
        self.number(&mut oper, path, "attack", U32);
        self.number(&mut oper, path, "hp", U32);

        match oper.remove("requirements") {
            Some(Value::Object(mut req)) => {
                let req_path = child(path, "requirements");
                self.number(&mut req, &req_path, "elite", U8);
                self.number(&mut req, &req_path, "level", U32);
                self.number(&mut req, &req_path, "skill_level", U8);
                self.number(&mut req, &req_path, "module", Num::Signed);
                self.number(&mut req, &req_path, "potentiality", U8);
                oper.insert("requirements".to_string(), Value::Object(req));
            }
            None | Some(Value::Null) => {}
            Some(_) => self.note(child(path, "requirements"), "应为对象，已忽略"),
        }

        match oper.remove("discs") {
            Some(Value::Array(items)) => {
                let discs: Vec<Value> = items
                    .iter()
                    .filter_map(|item| coerce_number(item, Num::Signed))
                    .collect();
                if discs.len() != items.len() {
                    self.note(child(path, "discs"), "无法识别的插件序号，已丢弃");
                }
                oper.insert("discs".to_string(), Value::Array(discs));
            }
            None | Some(Value::Null) => {}
            Some(_) => self.note(child(path, "discs"), "应为数组，已忽略"),
        }

        match oper.remove("extensions") {
            Some(Value::Object(ext)) => {
                let ext = self.extensions(ext, &child(path, "extensions"));
                oper.insert("extensions".to_string(), Value::Object(ext));
            }
            None | Some(Value::Null) => {}
            Some(_) => self.note(child(path, "extensions"), "应为对象，已忽略"),
        }

        oper
    }

    fn extensions(&mut self, mut ext: Map<String, Value>, path: &[String]) -> Map<String, Value> {
        self.number(&mut ext, path, "star_level", U8);
        self.number(&mut ext, path, "attack", U32);
        self.number(&mut ext, path, "hp", U32);

        let discs_path = child(path, "discs");
        let items = match ext.remove("discs") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => return ext,
            Some(_) => {
                self.note(discs_path, "应为数组，已忽略");
                return ext;
            }
        };
        let mut discs = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            let disc_path = child(&discs_path, idx);
            match item {
                Value::Object(mut disc) => {
                    self.number(&mut disc, &disc_path, "index", Num::Signed);
                    self.number(&mut disc, &disc_path, "star_stone", Num::Signed);
                    self.number(&mut disc, &disc_path, "assist_star", Num::Signed);
                    if disc.contains_key("index") {
                        discs.push(Value::Object(disc));
                    } else {
                        self.note(disc_path, "插件缺少序号，已丢弃");
                    }
                }
                other => match coerce_number(&other, Num::Signed) {
                    Some(index) => discs.push(json!({ "index": index })),
                    None => self.note(disc_path, "无法识别的插件，已丢弃"),
                },
            }
        }
        ext.insert("discs".to_string(), Value::Array(discs));
        ext
    }

    fn actions(&mut self, actions: Option<Value>, opers: &[String]) -> Value {
        let path = vec!["actions".to_string()];
        match actions {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Object(action) => {
                            out.push(Value::Object(self.action(action, &child(&path, idx))))
                        }
                        _ => self.note(child(&path, idx), "不是对象，已丢弃"),
                    }
                }
                Value::Array(out)
            }
            Some(value @ Value::Object(_)) if RoundActionModel::looks_like(&value) => {
                let model = RoundActionModel::from_value(&value);
                let options = MapperOptions {
                    slot_assignments: slot_assignments_from_opers(
                        opers.iter().map(String::as_str),
                    ),
                    ..Default::default()
                };
                let actions: Vec<Value> = round_actions_to_actions(&model, &options)
                    .into_iter()
                    .filter_map(|(action, _)| serde_json::to_value(action).ok())
                    .collect();
                self.note(path, "回合动作已转换为动作列表");
                Value::Array(actions)
            }
            Some(Value::Object(graph)) => Value::Object(self.graph(graph, &path)),
            Some(_) => {
                self.note(path, "应为数组或对象，已忽略");
                Value::Array(Vec::new())
            }
        }
    }

    fn action(&mut self, mut action: Map<String, Value>, path: &[String]) -> Map<String, Value> {
        self.string(&mut action, path, "type");
        for key in ["name", "direction", "doc", "doc_color"] {
            self.string(&mut action, path, key);
        }
        for key in [
            "kills",
            "costs",
            "cost_changes",
            "skill_usage",
            "skill_times",
            "pre_delay",
            "post_delay",
            "rear_delay",
        ] {
            self.number(&mut action, path, key, U32);
        }
        self.number(&mut action, path, "cooling", Num::Signed);
        self.tuple(&mut action, path, "location", 2, Num::Signed);
        self.tuple(&mut action, path, "distance", 2, Num::Float);
        action
    }

    fn graph(&mut self, graph: Map<String, Value>, path: &[String]) -> Map<String, Value> {
        let mut out = Map::with_capacity(graph.len());
        for (key, node) in graph {
            let node_path = child(path, &key);
            match node {
                Value::Object(node) => {
                    out.insert(key, Value::Object(self.node(node, &node_path)));
                }
                _ => self.note(node_path, "节点不是对象，已丢弃"),
            }
        }
        out
    }

    fn node(&mut self, mut node: Map<String, Value>, path: &[String]) -> Map<String, Value> {
        for key in ["recognition", "action", "template", "text_doc"] {
            self.string(&mut node, path, key);
        }
        for key in ["roi", "target", "begin", "end"] {
            self.tuple(&mut node, path, key, 4, Num::Signed);
        }
        self.tuple(&mut node, path, "distance", 2, Num::Signed);
        self.number(&mut node, path, "threshold", Num::Float);
        for key in ["pre_delay", "post_delay", "duration", "timeout"] {
            self.number(&mut node, path, key, U32);
        }

        for key in ["next", "expected"] {
            let fixed = match node.remove(key) {
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) => vec![Value::String(s)],
                Some(Value::Array(items)) => {
                    let kept: Vec<Value> = items.into_iter().filter(Value::is_string).collect();
                    kept
                }
                Some(_) => {
                    self.note(child(path, key), "应为字符串数组，已忽略");
                    continue;
                }
            };
            node.insert(key.to_string(), Value::Array(fixed));
        }
        node
    }
}
