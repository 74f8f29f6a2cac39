//! Strict validation before submission. Collects every issue instead of
//! stopping at the first.

use crate::error::{Issue, Result};
use crate::maa::{
    Action, ActionType, ActionsField, CURRENT_VERSION, DISC_ANY, MAX_DISCS, MAX_STAR_LEVEL,
    Operation, Operator,
};
use crate::schema::parse_loose;
use crate::siming::{SimingGraph, dangling_edges};
use std::collections::HashSet;

const MAX_ELITE: u8 = 2;
const MAX_LEVEL: u32 = 90;
const MAX_SKILL_LEVEL: u8 = 10;
const MAX_SKILL: u8 = 3;

pub fn validate(operation: &Operation) -> Vec<Issue> {
    let mut issues = Vec::new();

    match operation.version {
        Some(v) if v == 0 || v > CURRENT_VERSION => {
            issues.push(Issue::new(["version"], format!("不支持的版本号 {}", v)));
        }
        _ => {}
    }
    if operation.stage_name.trim().is_empty() {
        issues.push(Issue::new(["stage_name"], "请选择关卡"));
    }
    if operation.doc.title.trim().is_empty() {
        issues.push(Issue::new(["doc", "title"], "标题不能为空"));
    }

    let mut names = HashSet::new();
    for (idx, oper) in operation.opers.iter().enumerate() {
        let path = vec!["opers".to_string(), idx.to_string()];
        check_operator(oper, &path, &mut names, &mut issues);
    }

    let mut group_names = HashSet::new();
    for (idx, group) in operation.groups.iter().enumerate() {
        let path = vec!["groups".to_string(), idx.to_string()];
        if group.name.trim().is_empty() {
            issues.push(Issue::new(with(&path, "name"), "干员组名不能为空"));
        } else if !group_names.insert(group.name.as_str()) {
            let message = format!("干员组 {} 重复", group.name);
            issues.push(Issue::new(with(&path, "name"), message));
        }
        let mut members = HashSet::new();
        for (member_idx, oper) in group.opers.iter().enumerate() {
            let member_path = with(&with(&path, "opers"), member_idx);
            check_operator(oper, &member_path, &mut members, &mut issues);
        }
    }

    match &operation.actions {
        ActionsField::Flat(actions) => {
            for (idx, action) in actions.iter().enumerate() {
                let path = vec!["actions".to_string(), idx.to_string()];
                check_action(action, &path, &mut issues);
            }
        }
        ActionsField::Graph(graph) => check_graph(graph, &mut issues),
    }

    issues
}

/// Lenient parse, then strict checks. Only syntax errors and unrepairable
/// shapes return `Err`.
pub fn validate_json(raw: &str) -> Result<Vec<Issue>> {
    let operation = parse_loose(raw)?;
    Ok(validate(&operation))
}

fn with(path: &[String], key: impl ToString) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(key.to_string());
    path
}

fn check_operator<'a>(
    oper: &'a Operator,
    path: &[String],
    names: &mut HashSet<&'a str>,
    issues: &mut Vec<Issue>,
) {
    if oper.name.trim().is_empty() {
        issues.push(Issue::new(with(path, "name"), "干员名不能为空"));
    } else if !names.insert(oper.name.as_str()) {
        issues.push(Issue::new(with(path, "name"), format!("干员 {} 重复", oper.name)));
    }

    if let Some(skill) = oper.skill {
        if !(1..=MAX_SKILL).contains(&skill) {
            issues.push(Issue::new(with(path, "skill"), "技能只能是 1-3"));
        }
    }

    if let Some(req) = &oper.requirements {
        let req_path = with(path, "requirements");
        if req.elite.is_some_and(|e| e > MAX_ELITE) {
            issues.push(Issue::new(with(&req_path, "elite"), "精英化阶段只能是 0-2"));
        }
        if req.level.is_some_and(|l| !(1..=MAX_LEVEL).contains(&l)) {
            issues.push(Issue::new(with(&req_path, "level"), "等级只能是 1-90"));
        }
        if req.skill_level.is_some_and(|l| !(1..=MAX_SKILL_LEVEL).contains(&l)) {
            issues.push(Issue::new(with(&req_path, "skill_level"), "技能等级只能是 1-10"));
        }
        if req.module.is_some() && req.module_kind().is_none() {
            issues.push(Issue::new(with(&req_path, "module"), "未知的模组"));
        }
    }

    if let Some(ext) = oper.extensions_view() {
        if ext.discs.len() > MAX_DISCS {
            issues.push(Issue::new(with(path, "discs"), "最多选择 3 个插件"));
        }
        for (idx, disc) in ext.discs.iter().enumerate() {
            if disc.index < DISC_ANY {
                issues.push(Issue::new(with(&with(path, "discs"), idx), "插件序号无效"));
            }
        }
        if ext.star_level.is_some_and(|s| s > MAX_STAR_LEVEL) {
            issues.push(Issue::new(with(path, "star_level"), "星级只能是 0-5"));
        }
    }
}

fn check_action(action: &Action, path: &[String], issues: &mut Vec<Issue>) {
    let has_name = action.name.as_deref().is_some_and(|n| !n.trim().is_empty());
    match &action.kind {
        ActionType::Deploy => {
            if !has_name {
                issues.push(Issue::new(with(path, "name"), "部署动作需要干员名"));
            }
            if action.location.is_none() {
                issues.push(Issue::new(with(path, "location"), "部署动作需要坐标"));
            }
        }
        ActionType::Skill | ActionType::Retreat => {
            if !has_name && action.location.is_none() {
                issues.push(Issue::new(with(path, "name"), "需要干员名或坐标"));
            }
        }
        ActionType::SkillUsage => {
            if action.skill_usage.is_none() {
                issues.push(Issue::new(with(path, "skill_usage"), "需要技能用法"));
            }
        }
        ActionType::MoveCamera => {
            if action.distance.is_none() {
                issues.push(Issue::new(with(path, "distance"), "移动镜头需要距离"));
            }
        }
        ActionType::Other(kind) => {
            issues.push(Issue::new(with(path, "type"), format!("未知的动作类型 {}", kind)));
        }
        _ => {}
    }
}

fn check_graph(graph: &SimingGraph, issues: &mut Vec<Issue>) {
    for (from, to) in dangling_edges(graph) {
        issues.push(Issue::new(
            ["actions", from.as_str(), "next"],
            format!("指向不存在的节点 {}", to),
        ));
    }
}
