//! `evolution-type-member-assign`: user-defined assignment operators that
//! leave data members unassigned.
//!
//! For each public, user-provided `operator=` definition taking one argument
//! of its own record type, every field of the record (flattened through
//! anonymous structs and unions) becomes an obligation. Obligations are
//! cleared by:
//!
//! 1. a bulk copy into `this` (`memcpy(this, ...)`), which clears all of them;
//! 2. `field = ...`, an overloaded assignment-family operator on the field, or
//!    a call to an establishing method (`field.resize(...)`) in the body;
//! 3. the same shapes inside the bodies of functions the operator calls
//!    directly. Callees of callees are not followed.
//!
//! Whatever remains is reported in declaration order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ast::{LangOptions, NodeId, NodeKind, QualType, SymbolId, Unit};
use crate::detect::{Diagnostic, DiagnosticBuilder};
use crate::matchers::dsl::*;
use crate::matchers::{find_all, Match, MatchContext, MatchError, Matcher};

use super::{bound, CheckError};

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "*=", "/=", "%=", "+=", "-=", "<<=", ">>=", "&=", "^=", "|=",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeMemberAssignOptions {
    /// Skip array-typed fields.
    pub ignore_arrays: bool,
    /// Methods that establish the field they are called on.
    pub init_methods: Vec<String>,
    /// Functions that copy a whole object when `this` is the destination.
    pub copy_functions: Vec<String>,
}

impl Default for TypeMemberAssignOptions {
    fn default() -> Self {
        Self {
            ignore_arrays: true,
            init_methods: vec!["resize".into(), "assign".into(), "Init".into()],
            copy_functions: vec!["memcpy".into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Unestablished,
    EstablishedDirectly,
    EstablishedViaCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldObligation {
    pub field: SymbolId,
    /// Record that declares the field; a union here links sibling obligations.
    pub container: SymbolId,
    pub status: FieldStatus,
}

/// Obligations for one assignment operator, in field declaration order.
#[derive(Debug, Clone, Default)]
pub struct Obligations {
    items: Vec<FieldObligation>,
}

impl Obligations {
    pub fn iter(&self) -> impl Iterator<Item = &FieldObligation> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_unestablished(&self) -> bool {
        self.items
            .iter()
            .any(|o| o.status == FieldStatus::Unestablished)
    }

    /// Fields still unestablished, in declaration order.
    pub fn remaining(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.items
            .iter()
            .filter(|o| o.status == FieldStatus::Unestablished)
            .map(|o| o.field)
    }

    pub fn status_of(&self, field: SymbolId) -> Option<FieldStatus> {
        self.items
            .iter()
            .find(|o| o.field == field)
            .map(|o| o.status)
    }

    /// Mark `field` established. In a union every sibling is established too.
    fn establish(&mut self, unit: &Unit, field: SymbolId, status: FieldStatus) {
        let Some(container) = self
            .items
            .iter()
            .find(|o| o.field == field)
            .map(|o| o.container)
        else {
            return;
        };
        let is_union = unit
            .get_symbol(container)
            .is_some_and(|s| s.is_union());
        for o in &mut self.items {
            let hit = o.field == field || (is_union && o.container == container);
            if hit && o.status == FieldStatus::Unestablished {
                o.status = status;
            }
        }
    }

    fn establish_all(&mut self) {
        for o in &mut self.items {
            if o.status == FieldStatus::Unestablished {
                o.status = FieldStatus::EstablishedDirectly;
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeMemberAssign {
    options: TypeMemberAssignOptions,
}

impl TypeMemberAssign {
    pub const NAME: &'static str = "evolution-type-member-assign";

    pub fn new(options: TypeMemberAssignOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TypeMemberAssignOptions {
        &self.options
    }

    pub fn matchers(&self, lang: &LangOptions) -> Vec<Matcher> {
        if !lang.cplusplus {
            return Vec::new();
        }
        vec![method_decl()
            .with(overloaded_operator("="))
            .with(is_definition())
            .with(is_public())
            .with(is_user_provided())
            .with(parameter_count_is(1))
            .with(symbol_matches(|_, s| {
                let param = s
                    .callable
                    .as_ref()
                    .and_then(|c| c.params.first())
                    .and_then(|p| p.non_reference().as_record());
                param.is_some() && param == s.parent
            }))
            .bind("assign_op")]
    }

    pub fn check(&self, cx: &MatchContext<'_>, m: &Match) -> Result<Option<Diagnostic>, CheckError> {
        let unit = cx.unit();
        let op_node = bound(m, "assign_op")?;
        let Some(op) = unit.node(op_node).symbol else {
            return Ok(None);
        };
        let obligations = self.analyze(cx, op)?;
        if !obligations.has_unestablished() {
            return Ok(None);
        }

        let names: Vec<&str> = obligations
            .remaining()
            .map(|f| unit.symbol(f).name.as_str())
            .collect();
        let diagnostic = DiagnosticBuilder::new(
            unit,
            Self::NAME,
            unit.node(op_node).span,
            "assign operator does not initialize these fields: %0",
        )
        .arg(names.join(", "))
        .finish()?;
        Ok(Some(diagnostic))
    }

    /// Run the obligation analysis for the assignment operator `op`.
    pub fn analyze(&self, cx: &MatchContext<'_>, op: SymbolId) -> Result<Obligations, MatchError> {
        let unit = cx.unit();
        let (Some(record), Some(body)) = (unit.symbol(op).parent, unit.body_of(op)) else {
            return Ok(Obligations::default());
        };

        let mut obligations = Obligations::default();
        self.collect_fields(unit, record, &mut HashSet::new(), &mut obligations);
        if obligations.is_empty() {
            return Ok(obligations);
        }

        if self.is_bulk_copied(cx, record, body)? {
            obligations.establish_all();
            return Ok(obligations);
        }

        let establishing = self.establishing_shapes();
        clear_established(cx, body, &establishing, &mut obligations, FieldStatus::EstablishedDirectly)?;
        if !obligations.has_unestablished() {
            return Ok(obligations);
        }

        let calls = any_of([call_expr(), member_call(), operator_call()]);
        let mut visited = HashSet::new();
        for call in find_all(cx, body, &calls) {
            let call = call?;
            let Some(callee) = unit.node(call.node).symbol else {
                continue;
            };
            if callee == op || !visited.insert(callee) {
                continue;
            }
            let Some(callee_body) = unit.body_of(callee) else {
                continue;
            };
            tracing::trace!(callee = unit.symbol(callee).display_name(), "following call");
            clear_established(
                cx,
                callee_body,
                &establishing,
                &mut obligations,
                FieldStatus::EstablishedViaCall,
            )?;
        }

        Ok(obligations)
    }

    /// Flatten `record`'s fields into `out`. `path` holds the records being
    /// flattened, so an anonymous record that nests itself is visited once.
    fn collect_fields(
        &self,
        unit: &Unit,
        record: SymbolId,
        path: &mut HashSet<SymbolId>,
        out: &mut Obligations,
    ) {
        if !path.insert(record) {
            tracing::debug!(record = unit.symbol(record).display_name(), "cyclic anonymous record");
            return;
        }
        for field in unit.fields_of(record) {
            let Some(ty) = field.ty.as_ref() else {
                continue;
            };
            if let Some(nested) = anonymous_record(unit, ty) {
                self.collect_fields(unit, nested, path, out);
                continue;
            }
            if ty.is_incomplete_or_zero_length_array()
                || (self.options.ignore_arrays && ty.is_array())
                || (!ty.is_pointer() && ty.is_constant())
            {
                continue;
            }
            out.items.push(FieldObligation {
                field: field.id,
                container: record,
                status: FieldStatus::Unestablished,
            });
        }
        path.remove(&record);
    }

    fn is_bulk_copied(
        &self,
        cx: &MatchContext<'_>,
        record: SymbolId,
        body: NodeId,
    ) -> Result<bool, MatchError> {
        let explicit_this = this_expr()
            .with(unless(is_implicit()))
            .with(has_type(move |_, ty| {
                ty.pointee().and_then(QualType::as_record) == Some(record)
            }));
        let copy = call_expr()
            .with(has_any_name(self.options.copy_functions.iter().cloned()))
            .with(has_argument(0, ignoring_implicit(explicit_this)));
        Ok(find_all(cx, body, &copy).next().transpose()?.is_some())
    }

    /// The three shapes that establish a field of `this`, each binding it as
    /// `field`.
    fn establishing_shapes(&self) -> Matcher {
        let field = || ignoring_implicit(receiver_field().bind("field"));
        let assignment = binary_operator()
            .with(operator_is("="))
            .with(has_lhs(field()));
        let overloaded = operator_call()
            .with(any_of(ASSIGNMENT_OPERATORS.iter().map(|op| operator_is(op))))
            .with(has_argument(0, field()));
        let init_call = member_call()
            .with(has_any_name(self.options.init_methods.iter().cloned()))
            .with(on(receiver_field().bind("field")));
        any_of([assignment, overloaded, init_call])
    }
}

fn clear_established(
    cx: &MatchContext<'_>,
    root: NodeId,
    shapes: &Matcher,
    obligations: &mut Obligations,
    status: FieldStatus,
) -> Result<(), MatchError> {
    let unit = cx.unit();
    for m in find_all(cx, root, shapes) {
        let field_node = m?.get("field");
        if let Some(field) = field_node.and_then(|n| unit.node(n).symbol) {
            obligations.establish(unit, field, status);
        }
    }
    Ok(())
}

/// Record named by a field type when that record is an anonymous aggregate.
fn anonymous_record(unit: &Unit, ty: &QualType) -> Option<SymbolId> {
    let record = ty.as_record()?;
    unit.get_symbol(record)
        .filter(|s| s.is_anonymous_record())
        .map(|s| s.id)
}

/// A member access naming a field of `this`, possibly through anonymous
/// struct/union members.
fn receiver_field() -> Matcher {
    member_expr()
        .with(refers_to_field())
        .with(node_matches(|unit, node| {
            let mut base = match unit.children(node).first() {
                Some(&b) => unit.ignore_implicit(b),
                None => return false,
            };
            loop {
                match unit.kind(base) {
                    NodeKind::This => return true,
                    NodeKind::MemberExpr => {
                        let through_anonymous = unit
                            .symbol_of(base)
                            .and_then(|s| s.ty.as_ref())
                            .and_then(|ty| anonymous_record(unit, ty))
                            .is_some();
                        if !through_anonymous {
                            return false;
                        }
                        base = match unit.children(base).first() {
                            Some(&b) => unit.ignore_implicit(b),
                            None => return false,
                        };
                    }
                    _ => return false,
                }
            }
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Access, CallableInfo, Literal, Node, RecordTag, UnitBuilder};

    /// Builds a record `R` with an `operator=` definition whose body is
    /// assembled from statements added by the test.
    struct Fixture {
        b: UnitBuilder,
        rec: SymbolId,
        op: SymbolId,
        members: Vec<NodeId>,
        top_level: Vec<NodeId>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut b = UnitBuilder::new("r.cpp");
            let rec = b.declare_record("R", RecordTag::Class);
            let op = b.declare_method(
                rec,
                "operator=",
                CallableInfo {
                    params: vec![QualType::reference_to(QualType::record(rec).constant())],
                    return_type: QualType::reference_to(QualType::record(rec)),
                    ..CallableInfo::default()
                },
            );
            Self {
                b,
                rec,
                op,
                members: Vec::new(),
                top_level: Vec::new(),
            }
        }

        fn field(&mut self, name: &str, ty: QualType) -> SymbolId {
            self.field_in(self.rec, name, ty)
        }

        fn field_in(&mut self, record: SymbolId, name: &str, ty: QualType) -> SymbolId {
            let f = self.b.declare_field(record, name, ty);
            if record == self.rec {
                let decl = self.b.add(Node::new(NodeKind::FieldDecl).with_symbol(f));
                self.members.push(decl);
            }
            f
        }

        fn this(&mut self, implicit: bool) -> NodeId {
            let node = Node::new(NodeKind::This)
                .typed(QualType::pointer_to(QualType::record(self.rec)));
            self.b.add(if implicit { node.implicit() } else { node })
        }

        /// `this->a.b...` where every step but the last is an anonymous member.
        fn member_path(&mut self, path: &[SymbolId]) -> NodeId {
            let mut base = self.this(true);
            for &f in path {
                base = self.b.add(
                    Node::new(NodeKind::MemberExpr)
                        .with_symbol(f)
                        .with_children([base]),
                );
            }
            base
        }

        fn assign(&mut self, path: &[SymbolId]) -> NodeId {
            let lhs = self.member_path(path);
            let rhs = self.b.add(Node::new(NodeKind::IntegerLiteral).with_literal(Literal::Int(0)));
            self.b.add(
                Node::new(NodeKind::BinaryOperator)
                    .with_operator("=")
                    .with_children([lhs, rhs]),
            )
        }

        fn member_call_on_field(&mut self, field: SymbolId, method: &str) -> NodeId {
            let object = self.member_path(&[field]);
            let callee = self.b.add(Node::new(NodeKind::MemberExpr).named(method).with_children([object]));
            self.b.add(Node::new(NodeKind::MemberCall).named(method).with_children([callee]))
        }

        /// Declare a helper method with the given body and return a call to it.
        fn helper(&mut self, name: &str, stmts: Vec<NodeId>) -> NodeId {
            let helper = self.b.declare_method(self.rec, name, CallableInfo::default());
            let body = self.b.add(Node::new(NodeKind::CompoundStmt).with_children(stmts));
            let def = self.b.add(
                Node::new(NodeKind::MethodDecl)
                    .with_symbol(helper)
                    .with_children([body]),
            );
            self.top_level.push(def);
            let object = self.this(true);
            let callee = self.b.add(Node::new(NodeKind::MemberExpr).with_symbol(helper).with_children([object]));
            self.b.add(
                Node::new(NodeKind::MemberCall)
                    .with_symbol(helper)
                    .with_children([callee]),
            )
        }

        fn build(mut self, stmts: Vec<NodeId>) -> (Unit, NodeId) {
            let body = self.b.add(Node::new(NodeKind::CompoundStmt).with_children(stmts));
            let param = self.b.add(Node::new(NodeKind::ParamDecl).named("other"));
            let def = self.b.add(
                Node::new(NodeKind::MethodDecl)
                    .with_symbol(self.op)
                    .spanning(40, 60)
                    .with_children([param, body]),
            );
            let record = self.b.add(
                Node::new(NodeKind::RecordDecl)
                    .with_symbol(self.rec)
                    .with_children(self.members.clone()),
            );
            let mut top = vec![record];
            top.extend(self.top_level.iter().copied());
            top.push(def);
            let root = self.b.add(Node::new(NodeKind::TranslationUnit).with_children(top));
            (self.b.build(root).unwrap(), def)
        }
    }

    fn run(unit: &Unit, options: TypeMemberAssignOptions) -> Vec<Diagnostic> {
        let check = TypeMemberAssign::new(options);
        let cx = MatchContext::new(unit);
        let mut out = Vec::new();
        for matcher in check.matchers(unit.lang()) {
            for m in find_all(&cx, unit.root(), &matcher) {
                if let Some(d) = check.check(&cx, &m.unwrap()).unwrap() {
                    out.push(d);
                }
            }
        }
        out
    }

    fn messages(unit: &Unit) -> Vec<String> {
        run(unit, TypeMemberAssignOptions::default())
            .iter()
            .map(Diagnostic::message)
            .collect()
    }

    #[test]
    fn test_all_fields_assigned_is_clean() {
        let mut f = Fixture::new();
        let x = f.field("x", QualType::builtin("int"));
        let y = f.field("y", QualType::builtin("int"));
        let z = f.field("z", QualType::builtin("int"));
        let stmts = vec![f.assign(&[x]), f.assign(&[y]), f.assign(&[z])];
        let (unit, _) = f.build(stmts);
        assert!(messages(&unit).is_empty());
    }

    #[test]
    fn test_missing_assignment_reports_only_that_field() {
        let mut f = Fixture::new();
        let x = f.field("x", QualType::builtin("int"));
        f.field("y", QualType::builtin("int"));
        let z = f.field("z", QualType::builtin("int"));
        let stmts = vec![f.assign(&[x]), f.assign(&[z])];
        let (unit, def) = f.build(stmts);

        let diagnostics = run(&unit, TypeMemberAssignOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["y"]);
        assert_eq!(diagnostics[0].span, unit.node(def).span);
        assert_eq!(
            diagnostics[0].message(),
            "assign operator does not initialize these fields: y"
        );
    }

    #[test]
    fn test_x_assigned_y_reported() {
        let mut f = Fixture::new();
        let x = f.field("x", QualType::builtin("int"));
        f.field("y", QualType::builtin("int"));
        let stmts = vec![f.assign(&[x])];
        let (unit, _) = f.build(stmts);
        assert_eq!(
            messages(&unit),
            vec!["assign operator does not initialize these fields: y"]
        );
    }

    #[test]
    fn test_arrays_ignored_by_default() {
        let mut f = Fixture::new();
        f.field("x", QualType::array_of(QualType::builtin("int"), Some(4)));
        f.field("y", QualType::builtin("int"));
        let (unit, _) = f.build(Vec::new());
        assert_eq!(
            messages(&unit),
            vec!["assign operator does not initialize these fields: y"]
        );

        let options = TypeMemberAssignOptions {
            ignore_arrays: false,
            ..TypeMemberAssignOptions::default()
        };
        let diagnostics = run(&unit, options);
        assert_eq!(diagnostics[0].args, vec!["x, y"]);
    }

    #[test]
    fn test_unassignable_fields_never_obligated() {
        let mut f = Fixture::new();
        f.field("c", QualType::builtin("int").constant());
        f.field("ca", QualType::array_of(QualType::builtin("int").constant(), Some(2)));
        f.field("flex", QualType::array_of(QualType::builtin("char"), None));
        f.field("zero", QualType::array_of(QualType::builtin("char"), Some(0)));
        f.field("p", QualType::pointer_to(QualType::builtin("int")).constant());
        let (unit, _) = f.build(Vec::new());

        let options = TypeMemberAssignOptions {
            ignore_arrays: false,
            ..TypeMemberAssignOptions::default()
        };
        let diagnostics = run(&unit, options);
        // a const pointer is still a pointer field that needs assigning
        assert_eq!(diagnostics[0].args, vec!["p"]);
    }

    #[test]
    fn test_no_qualifying_fields_is_clean() {
        let mut f = Fixture::new();
        f.field("c", QualType::builtin("int").constant());
        let (unit, _) = f.build(Vec::new());
        assert!(messages(&unit).is_empty());
    }

    #[test]
    fn test_union_member_clears_siblings() {
        let mut f = Fixture::new();
        let rec = f.rec;
        let u = f.b.declare_anonymous_record(rec, RecordTag::Union);
        let a = f.field_in(u, "a", QualType::builtin("int"));
        f.field_in(u, "b", QualType::builtin("float"));
        let c = f.field("c", QualType::builtin("int"));
        let holder = f.b.symbol_mut(rec).record.as_ref().unwrap().fields[0];
        assert_eq!(f.b.symbol_mut(holder).ty, Some(QualType::record(u)));

        let stmts = vec![f.assign(&[holder, a]), f.assign(&[c])];
        let (unit, _) = f.build(stmts);
        assert!(messages(&unit).is_empty());

        let check = TypeMemberAssign::default();
        let op = unit
            .symbols()
            .iter()
            .find(|s| s.name == "operator=")
            .unwrap()
            .id;
        let obligations = check.analyze(&MatchContext::new(&unit), op).unwrap();
        assert_eq!(obligations.iter().count(), 3);
        assert_eq!(obligations.status_of(a), Some(FieldStatus::EstablishedDirectly));
    }

    #[test]
    fn test_anonymous_struct_fields_are_flattened() {
        let mut f = Fixture::new();
        let rec = f.rec;
        let s = f.b.declare_anonymous_record(rec, RecordTag::Struct);
        let a = f.field_in(s, "a", QualType::builtin("int"));
        f.field_in(s, "b", QualType::builtin("int"));
        let holder = f.b.symbol_mut(rec).record.as_ref().unwrap().fields[0];
        let stmts = vec![f.assign(&[holder, a])];
        let (unit, _) = f.build(stmts);
        assert_eq!(
            messages(&unit),
            vec!["assign operator does not initialize these fields: b"]
        );
    }

    #[test]
    fn test_bulk_copy_into_this_clears_everything() {
        let mut f = Fixture::new();
        f.field("x", QualType::builtin("int"));
        f.field("y", QualType::builtin("int"));
        let memcpy = f.b.declare_function("memcpy", CallableInfo::default());
        let this = f.this(false);
        let cast = f.b.add(Node::new(NodeKind::ImplicitCast).with_children([this]));
        let src = f.b.add(Node::new(NodeKind::DeclRef).named("other"));
        let callee = f.b.add(Node::new(NodeKind::DeclRef).with_symbol(memcpy));
        let call = f.b.add(
            Node::new(NodeKind::Call)
                .with_symbol(memcpy)
                .with_children([callee, cast, src]),
        );
        let (unit, _) = f.build(vec![call]);
        assert!(messages(&unit).is_empty());
    }

    #[test]
    fn test_bulk_copy_needs_explicit_this_destination() {
        let mut f = Fixture::new();
        f.field("x", QualType::builtin("int"));
        let memcpy = f.b.declare_function("memcpy", CallableInfo::default());
        let this = f.this(true);
        let callee = f.b.add(Node::new(NodeKind::DeclRef).with_symbol(memcpy));
        let call = f.b.add(
            Node::new(NodeKind::Call)
                .with_symbol(memcpy)
                .with_children([callee, this]),
        );
        let (unit, _) = f.build(vec![call]);
        assert_eq!(messages(&unit).len(), 1);
    }

    #[test]
    fn test_establishing_methods() {
        let mut f = Fixture::new();
        let v = f.field("v", QualType::named("std::vector<int>"));
        let w = f.field("w", QualType::named("std::vector<int>"));
        let stmts = vec![
            f.member_call_on_field(v, "resize"),
            f.member_call_on_field(w, "push_back"),
        ];
        let (unit, _) = f.build(stmts);
        assert_eq!(
            messages(&unit),
            vec!["assign operator does not initialize these fields: w"]
        );
    }

    #[test]
    fn test_overloaded_assignment_operator_establishes() {
        let mut f = Fixture::new();
        let s = f.field("s", QualType::named("String"));
        let t = f.field("t", QualType::named("String"));
        let op_call = |f: &mut Fixture, field: SymbolId, op: &str| {
            let lhs = f.member_path(&[field]);
            let rhs = f.b.add(Node::new(NodeKind::DeclRef).named("other"));
            f.b.add(
                Node::new(NodeKind::OperatorCall)
                    .with_operator(op)
                    .with_children([lhs, rhs]),
            )
        };
        let stmts = vec![op_call(&mut f, s, "="), op_call(&mut f, t, "+=")];
        let (unit, _) = f.build(stmts);
        assert!(messages(&unit).is_empty());
    }

    #[test]
    fn test_one_hop_clears_two_hops_do_not() {
        let mut f = Fixture::new();
        let x = f.field("x", QualType::builtin("int"));
        let y = f.field("y", QualType::builtin("int"));
        let z = f.field("z", QualType::builtin("int"));

        let set_z = f.assign(&[z]);
        let deep = f.helper("setZ", vec![set_z]);
        let set_y = f.assign(&[y]);
        let shallow = f.helper("setY", vec![set_y, deep]);
        let set_x = f.assign(&[x]);
        let (unit, _) = f.build(vec![set_x, shallow]);

        assert_eq!(
            messages(&unit),
            vec!["assign operator does not initialize these fields: z"]
        );

        let op = unit.symbols().iter().find(|s| s.name == "operator=").unwrap().id;
        let obligations = TypeMemberAssign::default()
            .analyze(&MatchContext::new(&unit), op)
            .unwrap();
        assert_eq!(obligations.status_of(x), Some(FieldStatus::EstablishedDirectly));
        assert_eq!(obligations.status_of(y), Some(FieldStatus::EstablishedViaCall));
        assert_eq!(obligations.status_of(z), Some(FieldStatus::Unestablished));
    }

    #[test]
    fn test_callee_without_body_clears_nothing() {
        let mut f = Fixture::new();
        let x = f.field("x", QualType::builtin("int"));
        let y = f.field("y", QualType::builtin("int"));
        let reset = f.b.declare_method(f.rec, "reset", CallableInfo::default());
        let object = f.this(true);
        let callee = f.b.add(Node::new(NodeKind::MemberExpr).with_symbol(reset).with_children([object]));
        let call = f.b.add(
            Node::new(NodeKind::MemberCall)
                .with_symbol(reset)
                .with_children([callee]),
        );
        let set_x = f.assign(&[x]);
        let (unit, _) = f.build(vec![set_x, call]);
        assert!(unit.body_of(reset).is_none());

        let op = unit.symbols().iter().find(|s| s.name == "operator=").unwrap().id;
        let obligations = TypeMemberAssign::default()
            .analyze(&MatchContext::new(&unit), op)
            .unwrap();
        assert_eq!(obligations.status_of(y), Some(FieldStatus::Unestablished));

        let registry = crate::checks::CheckRegistry::new(vec![crate::checks::Check::TypeMemberAssign(
            TypeMemberAssign::default(),
        )]);
        let result = crate::detect::Runner::new(registry).lint_unit(&unit);
        assert!(result.failures.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].message(),
            "assign operator does not initialize these fields: y"
        );
    }

    #[test]
    fn test_self_nesting_anonymous_record_terminates() {
        let mut f = Fixture::new();
        let rec = f.rec;
        let s = f.b.declare_anonymous_record(rec, RecordTag::Struct);
        f.field_in(s, "again", QualType::record(s));
        let a = f.field_in(s, "a", QualType::builtin("int"));
        let y = f.field("y", QualType::builtin("int"));
        let (unit, _) = f.build(Vec::new());

        let op = unit.symbols().iter().find(|s| s.name == "operator=").unwrap().id;
        let obligations = TypeMemberAssign::default()
            .analyze(&MatchContext::new(&unit), op)
            .unwrap();
        let fields: Vec<SymbolId> = obligations.iter().map(|o| o.field).collect();
        assert_eq!(fields, vec![a, y]);
        assert_eq!(
            messages(&unit),
            vec!["assign operator does not initialize these fields: a, y"]
        );
    }

    #[test]
    fn test_other_objects_fields_do_not_count() {
        let mut f = Fixture::new();
        let x = f.field("x", QualType::builtin("int"));
        let other = f.b.add(Node::new(NodeKind::DeclRef).named("other"));
        let lhs = f.b.add(Node::new(NodeKind::MemberExpr).with_symbol(x).with_children([other]));
        let rhs = f.b.add(Node::new(NodeKind::IntegerLiteral));
        let assign = f.b.add(
            Node::new(NodeKind::BinaryOperator)
                .with_operator("=")
                .with_children([lhs, rhs]),
        );
        let (unit, _) = f.build(vec![assign]);
        assert_eq!(messages(&unit).len(), 1);
    }

    #[test]
    fn test_only_public_user_provided_operators_match() {
        let mut f = Fixture::new();
        f.field("x", QualType::builtin("int"));
        let op = f.op;
        f.b.symbol_mut(op).access = Access::Private;
        let (unit, _) = f.build(Vec::new());
        assert!(messages(&unit).is_empty());

        let mut f = Fixture::new();
        f.field("x", QualType::builtin("int"));
        let op = f.op;
        if let Some(c) = f.b.symbol_mut(op).callable.as_mut() {
            c.is_defaulted = true;
        }
        let (unit, _) = f.build(Vec::new());
        assert!(messages(&unit).is_empty());
    }

    #[test]
    fn test_not_registered_outside_cplusplus() {
        let c = LangOptions {
            cplusplus: false,
            cplusplus11: false,
            c99: true,
        };
        assert!(TypeMemberAssign::default().matchers(&c).is_empty());
    }
}
