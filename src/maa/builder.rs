use crate::maa::{
    Action, ActionType, ActionsField, Doc, Group, Operation, Operator, OperatorExtensions,
    Requirements, DiscSelection,
};
use serde_json::{Map, Number, Value};

/// Fluent construction of an operation, mostly for tests and the CLI.
pub struct OperationBuilder {
    version: Option<u32>,
    minimum_required: Option<String>,
    stage_name: String,
    doc: Doc,
    pub opers: Vec<Operator>,
    groups: Vec<Group>,
    actions: Vec<Action>,
    extra: Map<String, Value>,
}

impl OperationBuilder {
    pub fn new(stage_name: &str) -> Self {
        Self {
            version: None,
            minimum_required: None,
            stage_name: stage_name.to_string(),
            doc: Doc::default(),
            opers: Vec::new(),
            groups: Vec::new(),
            actions: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn minimum_required(mut self, minimum_required: &str) -> Self {
        self.minimum_required = Some(minimum_required.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.doc.title = title.to_string();
        self
    }

    pub fn details(mut self, details: &str) -> Self {
        self.doc.details = details.to_string();
        self
    }

    pub fn extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn oper(self, name: &str) -> OperatorBuilder {
        OperatorBuilder {
            operation_builder: self,
            group: None,
            operator: Operator::new(name),
        }
    }

    /// Add members afterwards with `.oper_in(group, name)`.
    pub fn group(mut self, name: &str) -> Self {
        self.groups.push(Group {
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn oper_in(self, group: &str, name: &str) -> OperatorBuilder {
        OperatorBuilder {
            operation_builder: self,
            group: Some(group.to_string()),
            operator: Operator::new(name),
        }
    }

    pub fn action(self, kind: ActionType) -> ActionBuilder {
        ActionBuilder {
            operation_builder: self,
            action: Action::new(kind),
        }
    }

    pub fn deploy(self, name: &str, location: [i32; 2]) -> ActionBuilder {
        self.action(ActionType::Deploy).name(name).location(location)
    }

    pub fn skill(self, name: &str) -> ActionBuilder {
        self.action(ActionType::Skill).name(name)
    }

    pub fn build(self) -> Operation {
        Operation {
            version: self.version,
            minimum_required: self.minimum_required,
            stage_name: self.stage_name,
            difficulty: None,
            doc: self.doc,
            opers: self.opers,
            groups: self.groups,
            actions: ActionsField::Flat(self.actions),
            extra: self.extra,
        }
    }
}

pub struct OperatorBuilder {
    operation_builder: OperationBuilder,
    group: Option<String>,
    operator: Operator,
}

impl OperatorBuilder {
    pub fn skill(mut self, skill: u8) -> Self {
        self.operator.skill = Some(skill);
        self
    }

    pub fn skill_usage(mut self, usage: u32) -> Self {
        self.operator.skill_usage = Some(usage);
        self
    }

    pub fn elite(mut self, elite: u8) -> Self {
        self.requirements().elite = Some(elite);
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.requirements().level = Some(level);
        self
    }

    /// Current module code, or the legacy index for version 2 documents
    pub fn module(mut self, module: i32) -> Self {
        self.requirements().module = Some(module);
        self
    }

    pub fn disc(mut self, index: i32) -> Self {
        let mut ext = self.operator.extensions_view().unwrap_or_default();
        ext.discs.push(DiscSelection::new(index));
        self.operator.set_extensions(Some(ext));
        self
    }

    pub fn star_level(mut self, star_level: u8) -> Self {
        let ext = OperatorExtensions {
            star_level: Some(star_level),
            ..self.operator.extensions_view().unwrap_or_default()
        };
        self.operator.set_extensions(Some(ext));
        self
    }

    fn requirements(&mut self) -> &mut Requirements {
        self.operator.requirements.get_or_insert_with(Requirements::default)
    }

    pub fn build(mut self) -> OperationBuilder {
        match self.group {
            Some(group) => {
                let groups = &mut self.operation_builder.groups;
                let idx = match groups.iter().position(|g| g.name == group) {
                    Some(idx) => idx,
                    None => {
                        groups.push(Group {
                            name: group,
                            ..Default::default()
                        });
                        groups.len() - 1
                    }
                };
                groups[idx].opers.push(self.operator);
            }
            None => self.operation_builder.opers.push(self.operator),
        }
        self.operation_builder
    }
}

pub struct ActionBuilder {
    operation_builder: OperationBuilder,
    action: Action,
}

impl ActionBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.action.name = Some(name.to_string());
        self
    }

    pub fn location(mut self, location: [i32; 2]) -> Self {
        self.action.location = Some(location);
        self
    }

    pub fn direction(mut self, direction: &str) -> Self {
        self.action.direction = Some(direction.to_string());
        self
    }

    /// Non-finite components leave the distance unset.
    pub fn distance(mut self, distance: [f64; 2]) -> Self {
        self.action.distance = match distance.map(Number::from_f64) {
            [Some(x), Some(y)] => Some([x, y]),
            _ => None,
        };
        self
    }

    pub fn kills(mut self, kills: u32) -> Self {
        self.action.kills = Some(kills);
        self
    }

    pub fn pre_delay(mut self, ms: u32) -> Self {
        self.action.pre_delay = Some(ms);
        self
    }

    pub fn post_delay(mut self, ms: u32) -> Self {
        self.action.post_delay = Some(ms);
        self
    }

    pub fn rear_delay(mut self, ms: u32) -> Self {
        self.action.rear_delay = Some(ms);
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.action.doc = Some(doc.to_string());
        self
    }

    pub fn build(mut self) -> OperationBuilder {
        self.operation_builder.actions.push(self.action);
        self.operation_builder
    }
}
