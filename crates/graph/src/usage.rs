use crate::syntax::{CompilationUnit, Reference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Names a file refers to, as written in its source. No resolution happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// `import a.b.C;` → `a.b.C`
    pub fq_imports: BTreeSet<String>,

    /// `import a.b.*;` → `a.b`
    pub wildcard_packages: BTreeSet<String>,

    /// Bare type names referenced anywhere in the file
    pub simple_names: BTreeSet<String>,
}

impl UsageRecord {
    pub fn extract(unit: &CompilationUnit) -> Self {
        let mut usage = Self::default();
        unit.walk(|reference| usage.record(reference));
        usage
    }

    /// Fold one reference into the matching set
    pub fn record(&mut self, reference: Reference) {
        match reference {
            Reference::Import(import) if import.asterisk => {
                self.wildcard_packages.insert(import.name);
            }
            Reference::Import(import) => {
                self.fq_imports.insert(import.name);
            }
            Reference::Extends(name)
            | Reference::Implements(name)
            | Reference::Annotation(name)
            | Reference::VariableType(name)
            | Reference::ObjectCreation(name)
            | Reference::InstanceOf(name)
            | Reference::Cast(name)
            | Reference::ClassLiteral(name)
            | Reference::MethodReferenceScope(name)
            | Reference::QualifiedCallScope(name)
            | Reference::TypeReference(name) => {
                self.simple_names.insert(name);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fq_imports.is_empty()
            && self.wildcard_packages.is_empty()
            && self.simple_names.is_empty()
    }
}
