use crate::error::{GraphError, Result};
use tree_sitter::{Node, Parser, Tree};

/// Java front-end: turns source text into a queryable [`CompilationUnit`]
pub struct JavaSyntax {
    parser: Parser,
}

impl JavaSyntax {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| GraphError::LanguageError(format!("Failed to set language: {e}")))?;
        Ok(Self { parser })
    }

    /// Parse a compilation unit. Malformed input is rejected rather than
    /// recovered, so callers can tell a broken file from an empty one.
    pub fn parse(&mut self, source: &str) -> Result<CompilationUnit> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| GraphError::ParseError("parser produced no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => {
                    let pos = node.start_position();
                    format!("syntax error at line {}, column {}", pos.row + 1, pos.column + 1)
                }
                None => "syntax error".to_string(),
            };
            return Err(GraphError::ParseError(message));
        }

        Ok(CompilationUnit {
            tree,
            source: source.to_string(),
        })
    }
}

/// A single import declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Dotted name without the trailing `.*`
    pub name: String,
    pub asterisk: bool,
}

/// Every syntactic construct that can point at another type.
///
/// Type-carrying variants hold the bare simple name: type arguments, array
/// dimensions and package qualifiers are already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Import(ImportDecl),
    Extends(String),
    Implements(String),
    Annotation(String),
    VariableType(String),
    ObjectCreation(String),
    InstanceOf(String),
    Cast(String),
    ClassLiteral(String),
    MethodReferenceScope(String),
    QualifiedCallScope(String),
    TypeReference(String),
}

impl Reference {
    /// Referenced simple type name, `None` for imports
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            Self::Import(_) => None,
            Self::Extends(name)
            | Self::Implements(name)
            | Self::Annotation(name)
            | Self::VariableType(name)
            | Self::ObjectCreation(name)
            | Self::InstanceOf(name)
            | Self::Cast(name)
            | Self::ClassLiteral(name)
            | Self::MethodReferenceScope(name)
            | Self::QualifiedCallScope(name)
            | Self::TypeReference(name) => Some(name),
        }
    }
}

/// Parsed Java source file
pub struct CompilationUnit {
    tree: Tree,
    source: String,
}

impl CompilationUnit {
    /// Declared package, `None` for the default package
    pub fn package(&self) -> Option<String> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let decl = root
            .named_children(&mut cursor)
            .find(|child| child.kind() == "package_declaration")?;

        let mut decl_cursor = decl.walk();
        let name = decl
            .named_children(&mut decl_cursor)
            .find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))?;
        Some(self.dotted_name(name))
    }

    /// Names of the top-level types declared in this file
    pub fn declared_types(&self) -> Vec<String> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|child| {
                matches!(
                    child.kind(),
                    "class_declaration"
                        | "interface_declaration"
                        | "enum_declaration"
                        | "record_declaration"
                        | "annotation_type_declaration"
                )
            })
            .filter_map(|decl| decl.child_by_field_name("name"))
            .map(|name| self.text(name).to_string())
            .collect()
    }

    pub fn imports(&self) -> Vec<ImportDecl> {
        let mut imports = Vec::new();
        self.walk(|reference| {
            if let Reference::Import(import) = reference {
                imports.push(import);
            }
        });
        imports
    }

    /// Visit every reference in the file in document order
    pub fn walk(&self, mut visit: impl FnMut(Reference)) {
        let mut stack = vec![self.tree.root_node()];
        while let Some(node) = stack.pop() {
            self.visit_node(node, &mut visit);

            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    /// Collect all references into a vector
    pub fn references(&self) -> Vec<Reference> {
        let mut references = Vec::new();
        self.walk(|reference| references.push(reference));
        references
    }

    fn visit_node(&self, node: Node, visit: &mut impl FnMut(Reference)) {
        match node.kind() {
            "import_declaration" => {
                if let Some(import) = self.import_decl(node) {
                    visit(Reference::Import(import));
                }
            }
            "class_declaration" | "enum_declaration" | "record_declaration" => {
                if let Some(superclass) = node.child_by_field_name("superclass") {
                    for name in self.types_in(superclass) {
                        visit(Reference::Extends(name));
                    }
                }
                if let Some(interfaces) = node.child_by_field_name("interfaces") {
                    for name in self.types_in(interfaces) {
                        visit(Reference::Implements(name));
                    }
                }
            }
            "interface_declaration" => {
                let mut cursor = node.walk();
                let extends: Vec<Node> = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() == "extends_interfaces")
                    .collect();
                for clause in extends {
                    for name in self.types_in(clause) {
                        visit(Reference::Extends(name));
                    }
                }
            }
            "annotation_type_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    visit(Reference::Annotation(self.text(name).to_string()));
                }
            }
            "annotation" | "marker_annotation" => {
                if let Some(name) = node
                    .child_by_field_name("name")
                    .and_then(|name| self.simple_type_name(name))
                {
                    visit(Reference::Annotation(name));
                }
            }
            "local_variable_declaration" | "field_declaration" | "constant_declaration" => {
                if let Some(name) = node
                    .child_by_field_name("type")
                    .and_then(|ty| self.simple_type_name(ty))
                {
                    visit(Reference::VariableType(name));
                }
            }
            "object_creation_expression" => {
                if let Some(name) = node
                    .child_by_field_name("type")
                    .and_then(|ty| self.simple_type_name(ty))
                {
                    visit(Reference::ObjectCreation(name));
                }
            }
            "instanceof_expression" => {
                let target = node
                    .child_by_field_name("right")
                    .or_else(|| node.child_by_field_name("pattern"));
                if let Some(name) = target.and_then(|ty| self.simple_type_name(ty)) {
                    visit(Reference::InstanceOf(name));
                }
            }
            "cast_expression" => {
                let mut cursor = node.walk();
                let types: Vec<Node> = node.children_by_field_name("type", &mut cursor).collect();
                for name in types.into_iter().filter_map(|ty| self.simple_type_name(ty)) {
                    visit(Reference::Cast(name));
                }
            }
            "class_literal" => {
                if let Some(name) = node.named_child(0).and_then(|ty| self.simple_type_name(ty)) {
                    visit(Reference::ClassLiteral(name));
                }
            }
            "method_reference" => {
                if let Some(name) = node.named_child(0).and_then(|scope| self.type_scope(scope)) {
                    visit(Reference::MethodReferenceScope(name));
                }
            }
            "method_invocation" => {
                if let Some(object) = node.child_by_field_name("object") {
                    if object.kind() == "identifier" {
                        visit(Reference::QualifiedCallScope(self.text(object).to_string()));
                    }
                }
            }
            "type_identifier" => {
                if !is_type_qualifier(node) {
                    let name = self.text(node);
                    if !name.is_empty() && name != "var" {
                        visit(Reference::TypeReference(name.to_string()));
                    }
                }
            }
            _ => {}
        }
    }

    fn import_decl(&self, node: Node) -> Option<ImportDecl> {
        let mut cursor = node.walk();
        let mut name = None;
        let mut asterisk = false;

        for child in node.children(&mut cursor) {
            match child.kind() {
                "identifier" | "scoped_identifier" => name = Some(self.dotted_name(child)),
                "asterisk" => asterisk = true,
                _ => {}
            }
        }

        name.map(|name| ImportDecl { name, asterisk })
    }

    /// Simple names of every type listed directly under a clause node
    /// (`superclass`, `super_interfaces`, `extends_interfaces`)
    fn types_in(&self, clause: Node) -> Vec<String> {
        let mut cursor = clause.walk();
        let children: Vec<Node> = clause.named_children(&mut cursor).collect();

        let mut names = Vec::new();
        for child in children {
            if child.kind() == "type_list" {
                names.extend(self.types_in(child));
            } else if let Some(name) = self.simple_type_name(child) {
                names.push(name);
            }
        }
        names
    }

    /// Receiver of a method reference, if it reads as a type
    fn type_scope(&self, scope: Node) -> Option<String> {
        match scope.kind() {
            "type_identifier" | "generic_type" | "scoped_type_identifier" | "array_type" => {
                self.simple_type_name(scope)
            }
            "identifier" | "field_access" => self
                .simple_type_name(scope)
                .filter(|name| name.starts_with(|c: char| c.is_ascii_uppercase())),
            _ => None,
        }
    }

    /// Reduce a type node to its bare simple name
    fn simple_type_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "type_identifier" | "identifier" => {
                let name = self.text(node);
                (!name.is_empty() && name != "var").then(|| name.to_string())
            }
            "generic_type" | "record_pattern" | "type_pattern" => node
                .named_child(0)
                .and_then(|inner| self.simple_type_name(inner)),
            "scoped_type_identifier" | "scoped_identifier" => node
                .child_by_field_name("name")
                .or_else(|| last_named_child(node))
                .and_then(|inner| self.simple_type_name(inner)),
            "array_type" => node
                .child_by_field_name("element")
                .and_then(|inner| self.simple_type_name(inner)),
            "annotated_type" => {
                last_named_child(node).and_then(|inner| self.simple_type_name(inner))
            }
            "field_access" => node
                .child_by_field_name("field")
                .and_then(|inner| self.simple_type_name(inner)),
            _ => None,
        }
    }

    fn dotted_name(&self, node: Node) -> String {
        self.text(node).split_whitespace().collect()
    }

    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }
}

fn last_named_child(node: Node) -> Option<Node> {
    node.named_child_count()
        .checked_sub(1)
        .and_then(|idx| node.named_child(idx))
}

/// `a` and `b` in `a.b.C` are qualifiers, not type usages
fn is_type_qualifier(node: Node) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.kind() != "scoped_type_identifier" {
            return false;
        }
        if current.next_named_sibling().is_some() {
            return true;
        }
        current = parent;
    }
    false
}

fn first_error(root: Node) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> CompilationUnit {
        JavaSyntax::new().unwrap().parse(source).unwrap()
    }

    fn names_of(unit: &CompilationUnit, pick: fn(&Reference) -> bool) -> Vec<String> {
        unit.references()
            .into_iter()
            .filter(pick)
            .filter_map(|r| r.simple_name().map(str::to_string))
            .collect()
    }

    #[test]
    fn reads_package_and_declared_types() {
        let unit = parse(
            "package com.example.app;\n\
             public class Service {}\n\
             interface Port {}\n\
             enum Mode { A, B }",
        );
        assert_eq!(unit.package().as_deref(), Some("com.example.app"));
        assert_eq!(unit.declared_types(), vec!["Service", "Port", "Mode"]);
    }

    #[test]
    fn default_package_has_no_name() {
        let unit = parse("class Lonely {}");
        assert_eq!(unit.package(), None);
        assert_eq!(unit.declared_types(), vec!["Lonely"]);
    }

    #[test]
    fn splits_wildcard_and_explicit_imports() {
        let unit = parse(
            "import java.util.List;\n\
             import p.sub.*;\n\
             import static p.Util.helper;\n\
             class A {}",
        );
        assert_eq!(
            unit.imports(),
            vec![
                ImportDecl {
                    name: "java.util.List".into(),
                    asterisk: false,
                },
                ImportDecl {
                    name: "p.sub".into(),
                    asterisk: true,
                },
                ImportDecl {
                    name: "p.Util.helper".into(),
                    asterisk: false,
                },
            ]
        );
    }

    #[test]
    fn reports_inheritance_clauses() {
        let unit = parse(
            "class A extends p.Base<String> implements Runnable, Comparable<A> {}\n\
             interface I extends J, K {}",
        );
        assert_eq!(
            names_of(&unit, |r| matches!(r, Reference::Extends(_))),
            vec!["Base", "J", "K"]
        );
        assert_eq!(
            names_of(&unit, |r| matches!(r, Reference::Implements(_))),
            vec!["Runnable", "Comparable"]
        );
    }

    #[test]
    fn reports_expression_level_type_uses() {
        let unit = parse(
            "class A {\n\
               @Inject Repo repo;\n\
               void run(Object o) {\n\
                 Widget w = new Widget();\n\
                 if (o instanceof Gadget) {}\n\
                 Thing t = (Thing) o;\n\
                 Class<?> c = Marker.class;\n\
                 java.util.function.Function<String, Parser> f = Parser::parse;\n\
                 Helpers.assist();\n\
               }\n\
             }",
        );

        assert_eq!(names_of(&unit, |r| matches!(r, Reference::Annotation(_))), vec!["Inject"]);
        assert_eq!(
            names_of(&unit, |r| matches!(r, Reference::VariableType(_))),
            vec!["Repo", "Widget", "Thing", "Class", "Function"]
        );
        assert_eq!(names_of(&unit, |r| matches!(r, Reference::ObjectCreation(_))), vec!["Widget"]);
        assert_eq!(names_of(&unit, |r| matches!(r, Reference::InstanceOf(_))), vec!["Gadget"]);
        assert_eq!(names_of(&unit, |r| matches!(r, Reference::Cast(_))), vec!["Thing"]);
        assert_eq!(names_of(&unit, |r| matches!(r, Reference::ClassLiteral(_))), vec!["Marker"]);
        assert_eq!(
            names_of(&unit, |r| matches!(r, Reference::MethodReferenceScope(_))),
            vec!["Parser"]
        );
        assert_eq!(
            names_of(&unit, |r| matches!(r, Reference::QualifiedCallScope(_))),
            vec!["Helpers"]
        );
    }

    #[test]
    fn type_references_skip_qualifiers_and_primitives() {
        let unit = parse("class A { java.util.Map<Key, java.util.List<Value>> m; int n; }");
        let names = names_of(&unit, |r| matches!(r, Reference::TypeReference(_)));
        assert!(names.contains(&"Map".to_string()));
        assert!(names.contains(&"Key".to_string()));
        assert!(names.contains(&"List".to_string()));
        assert!(names.contains(&"Value".to_string()));
        assert!(!names.contains(&"java".to_string()));
        assert!(!names.contains(&"util".to_string()));
        assert!(!names.contains(&"int".to_string()));
    }

    #[test]
    fn malformed_source_is_a_parse_error() {
        let mut syntax = JavaSyntax::new().unwrap();
        let err = syntax.parse("class Broken { void f( { }").err().unwrap();
        assert!(matches!(err, GraphError::ParseError(_)));
    }
}
