use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{Assign, Build, Create, Destroy, FindMany, FindMatching, FindOne, Save, Update};
use crate::database::schema::RecordClass;
use crate::database::store::Store;

/// Names of the operations every factory can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationName {
    Assign,
    Build,
    Create,
    Destroy,
    FindMany,
    FindMatching,
    FindOne,
    Save,
    Update,
}

impl OperationName {
    pub const ALL: [OperationName; 9] = [
        OperationName::Assign,
        OperationName::Build,
        OperationName::Create,
        OperationName::Destroy,
        OperationName::FindMany,
        OperationName::FindMatching,
        OperationName::FindOne,
        OperationName::Save,
        OperationName::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationName::Assign => "assign",
            OperationName::Build => "build",
            OperationName::Create => "create",
            OperationName::Destroy => "destroy",
            OperationName::FindMany => "find_many",
            OperationName::FindMatching => "find_matching",
            OperationName::FindOne => "find_one",
            OperationName::Save => "save",
            OperationName::Update => "update",
        }
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for OperationName {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Any operation a factory can construct.
#[derive(Clone)]
pub enum AnyOperation {
    Assign(Assign),
    Build(Build),
    Create(Create),
    Destroy(Destroy),
    FindMany(FindMany),
    FindMatching(FindMatching),
    FindOne(FindOne),
    Save(Save),
    Update(Update),
}

impl AnyOperation {
    pub fn operation_name(&self) -> OperationName {
        match self {
            AnyOperation::Assign(_) => OperationName::Assign,
            AnyOperation::Build(_) => OperationName::Build,
            AnyOperation::Create(_) => OperationName::Create,
            AnyOperation::Destroy(_) => OperationName::Destroy,
            AnyOperation::FindMany(_) => OperationName::FindMany,
            AnyOperation::FindMatching(_) => OperationName::FindMatching,
            AnyOperation::FindOne(_) => OperationName::FindOne,
            AnyOperation::Save(_) => OperationName::Save,
            AnyOperation::Update(_) => OperationName::Update,
        }
    }

    pub fn record_class(&self) -> &'static RecordClass {
        match self {
            AnyOperation::Assign(op) => op.record_class(),
            AnyOperation::Build(op) => op.record_class(),
            AnyOperation::Create(op) => op.record_class(),
            AnyOperation::Destroy(op) => op.record_class(),
            AnyOperation::FindMany(op) => op.record_class(),
            AnyOperation::FindMatching(op) => op.record_class(),
            AnyOperation::FindOne(op) => op.record_class(),
            AnyOperation::Save(op) => op.record_class(),
            AnyOperation::Update(op) => op.record_class(),
        }
    }

    /// Diagnostic name, e.g. `CreateJob`.
    pub fn name(&self) -> String {
        match self {
            AnyOperation::Assign(op) => op.name(),
            AnyOperation::Build(op) => op.name(),
            AnyOperation::Create(op) => op.name(),
            AnyOperation::Destroy(op) => op.name(),
            AnyOperation::FindMany(op) => op.name(),
            AnyOperation::FindMatching(op) => op.name(),
            AnyOperation::FindOne(op) => op.name(),
            AnyOperation::Save(op) => op.name(),
            AnyOperation::Update(op) => op.name(),
        }
    }
}

impl fmt::Debug for AnyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyOperation").field(&self.name()).finish()
    }
}

/// Builds one operation from the factory's class and store.
pub type Constructor = fn(&Factory) -> AnyOperation;

/// Produces operations bound to one record class.
///
/// A record class may declare its own factory; [`Factory::for_class`]
/// consults that first. Overrides replace individual constructors with
/// [`Factory::register`].
#[derive(Clone)]
pub struct Factory {
    record_class: &'static RecordClass,
    store: Arc<dyn Store>,
    constructors: HashMap<OperationName, Constructor>,
}

impl Factory {
    /// The record class's own factory if it declares one, else a generic one.
    pub fn for_class(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        match record_class.factory {
            Some(factory) => {
                debug!("Using custom operation factory for {}", record_class.name);
                factory(record_class, store)
            }
            None => Self::new(record_class, store),
        }
    }

    /// Generic factory with the default constructor for every operation.
    pub fn new(record_class: &'static RecordClass, store: Arc<dyn Store>) -> Self {
        let mut constructors: HashMap<OperationName, Constructor> = HashMap::new();
        constructors.insert(OperationName::Assign, |f| AnyOperation::Assign(Assign::new(f.record_class)));
        constructors.insert(OperationName::Build, |f| AnyOperation::Build(Build::new(f.record_class)));
        constructors.insert(OperationName::Create, |f| {
            AnyOperation::Create(Create::new(f.record_class, f.store()))
        });
        constructors.insert(OperationName::Destroy, |f| {
            AnyOperation::Destroy(Destroy::new(f.record_class, f.store()))
        });
        constructors.insert(OperationName::FindMany, |f| {
            AnyOperation::FindMany(FindMany::new(f.record_class, f.store()))
        });
        constructors.insert(OperationName::FindMatching, |f| {
            AnyOperation::FindMatching(FindMatching::new(f.record_class, f.store()))
        });
        constructors.insert(OperationName::FindOne, |f| {
            AnyOperation::FindOne(FindOne::new(f.record_class, f.store()))
        });
        constructors.insert(OperationName::Save, |f| AnyOperation::Save(Save::new(f.record_class, f.store())));
        constructors.insert(OperationName::Update, |f| {
            AnyOperation::Update(Update::new(f.record_class, f.store()))
        });

        Self { record_class, store, constructors }
    }

    /// Replaces the constructor for `name`.
    ///
    /// # Panics
    ///
    /// If the constructor builds a different operation than `name`.
    pub fn register(mut self, name: OperationName, constructor: Constructor) -> Self {
        let built = constructor(&self).operation_name();
        assert_eq!(built, name, "constructor registered for {} builds {}", name, built);

        self.constructors.insert(name, constructor);
        self
    }

    pub fn record_class(&self) -> &'static RecordClass {
        self.record_class
    }

    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    pub fn operation(&self, name: OperationName) -> AnyOperation {
        match self.constructors.get(&name) {
            Some(constructor) => constructor(self),
            None => Self::new(self.record_class, self.store()).operation(name),
        }
    }

    /// Looks an operation up by its snake_case name.
    pub fn operation_named(&self, name: &str) -> Result<AnyOperation, UnknownOperation> {
        Ok(self.operation(name.parse()?))
    }

    pub fn assign(&self) -> Assign {
        match self.operation(OperationName::Assign) {
            AnyOperation::Assign(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn build(&self) -> Build {
        match self.operation(OperationName::Build) {
            AnyOperation::Build(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn create(&self) -> Create {
        match self.operation(OperationName::Create) {
            AnyOperation::Create(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn destroy(&self) -> Destroy {
        match self.operation(OperationName::Destroy) {
            AnyOperation::Destroy(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn find_many(&self) -> FindMany {
        match self.operation(OperationName::FindMany) {
            AnyOperation::FindMany(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn find_matching(&self) -> FindMatching {
        match self.operation(OperationName::FindMatching) {
            AnyOperation::FindMatching(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn find_one(&self) -> FindOne {
        match self.operation(OperationName::FindOne) {
            AnyOperation::FindOne(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn save(&self) -> Save {
        match self.operation(OperationName::Save) {
            AnyOperation::Save(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }

    pub fn update(&self) -> Update {
        match self.operation(OperationName::Update) {
            AnyOperation::Update(op) => op,
            _ => unreachable!("registered constructors are checked"),
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("record_class", &self.record_class.name).finish()
    }
}
