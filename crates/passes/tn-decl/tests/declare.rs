//! Integration tests for var, const and short variable declarations

use expect_test::expect;
use tn_decl::{
    DeclClass, DeclId, DeclKind, Definition, Expr, ExprKind, FuncId, FuncTypeExpr, Ident,
    Operand, Resolver, Stmt, SymbolId, TypeExpr,
};
use tn_span::{FileId, Pos};

fn setup() -> (Resolver, FileId) {
    let mut resolver = Resolver::default();
    let file = resolver.add_file("a.go");
    (resolver, file)
}

fn idents(resolver: &mut Resolver, names: &[&str], line: Pos) -> Vec<Ident> {
    names
        .iter()
        .map(|name| Ident::new(resolver.lookup(name), line))
        .collect()
}

fn enter_function(resolver: &mut Resolver, name: &str, line: Pos) -> FuncId {
    let sym = resolver.lookup(name);
    let func = resolver.new_func(Some(Ident::new(sym, line)), FuncTypeExpr::default(), line);
    resolver.func_header(func).unwrap();
    func
}

fn const_value(resolver: &Resolver, decl: DeclId) -> String {
    match &resolver.decl(decl).definition {
        Some(Definition::Const(value)) => value.render(resolver.symbols()),
        other => panic!("expected a constant, got {other:?}"),
    }
}

fn declared(stmts: &[Stmt]) -> Vec<DeclId> {
    stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::DeclConst(decl) => Some(*decl),
            _ => None,
        })
        .collect()
}

fn call(resolver: &mut Resolver, name: &str, line: Pos) -> Expr {
    let callee: SymbolId = resolver.lookup(name);
    Expr::call(Expr::name(callee, line), Vec::new())
}

#[test]
fn test_package_var_with_one_value_for_many_names() {
    let (mut resolver, file) = setup();
    let line = Pos::new(file, 1);
    let names = idents(&mut resolver, &["a", "_", "b"], line);
    let value = call(&mut resolver, "f", line);

    let stmts = resolver.var_iter(&names, None, vec![value.clone()]).unwrap();

    let [Stmt::AssignList { lhs, rhs, define, init }] = stmts.as_slice() else {
        panic!("expected one multi-value assignment, got {stmts:?}");
    };
    assert!(!define);
    assert!(init.is_empty());
    assert_eq!(rhs, &vec![value]);
    assert!(matches!(lhs.as_slice(), [Operand::Decl(_), Operand::Blank, Operand::Decl(_)]));
    if let Operand::Decl(a) = lhs[0] {
        assert_eq!(resolver.decl(a).class, Some(DeclClass::External));
        assert_eq!(resolver.decl(a).definition, Some(Definition::MultiAssign));
    }
    assert_eq!(resolver.extern_decls().len(), 2);
}

#[test]
fn test_local_var_gets_storage_statements() {
    let (mut resolver, file) = setup();
    let func = enter_function(&mut resolver, "main", Pos::new(file, 1));
    let line = Pos::new(file, 2);
    let names = idents(&mut resolver, &["x", "y"], line);
    let int = resolver.lookup("int");

    let stmts = resolver
        .var_iter(&names, Some(TypeExpr::name(int, line)), Vec::new())
        .unwrap();

    let locals = resolver.func(func).locals.clone();
    assert_eq!(locals.len(), 2);
    let expected = vec![
        Stmt::Decl(locals[0]),
        Stmt::Assign {
            lhs: Operand::Decl(locals[0]),
            rhs: None,
            define: false,
            init: Vec::new(),
        },
        Stmt::Decl(locals[1]),
        Stmt::Assign {
            lhs: Operand::Decl(locals[1]),
            rhs: None,
            define: false,
            init: Vec::new(),
        },
    ];
    assert_eq!(stmts, expected);
    assert_eq!(resolver.decl(locals[0]).class, Some(DeclClass::Auto));
    assert_eq!(resolver.decl(locals[0]).depth, 1);
    assert_eq!(
        resolver.decl(locals[1]).type_expr,
        Some(TypeExpr::name(int, line))
    );
    resolver.func_body_end(func).unwrap();
}

#[test]
fn test_var_value_count_mismatch() {
    let (mut resolver, file) = setup();
    let names = idents(&mut resolver, &["a", "b", "c"], Pos::new(file, 3));
    let values = vec![Expr::int(1, Pos::new(file, 3)), Expr::int(2, Pos::new(file, 3))];
    resolver.var_iter(&names, None, values).unwrap();

    let names = idents(&mut resolver, &["d"], Pos::new(file, 4));
    let values = vec![Expr::int(1, Pos::new(file, 4)), Expr::int(2, Pos::new(file, 4))];
    resolver.var_iter(&names, None, values).unwrap();

    expect![[r#"
        a.go:3: missing expr in var dcl
        a.go:4: extra expr in var dcl
    "#]]
    .assert_eq(&resolver.render_diagnostics());
}

#[test]
fn test_const_group_repeats_values_with_iota() {
    let (mut resolver, file) = setup();
    let line = Pos::new(file, 1);
    let one = Expr::int(1, line);
    let shift = Expr::new(
        ExprKind::Binary {
            op: tn_decl::BinaryOp::Shl,
            lhs: Box::new(one),
            rhs: Box::new(Expr::new(ExprKind::Iota, line)),
        },
        line,
    );

    let int = TypeExpr::name(resolver.lookup("int"), line);

    resolver.begin_const_group();
    let mut decls = Vec::new();
    for (idx, name) in ["a", "b", "c"].into_iter().enumerate() {
        let names = idents(&mut resolver, &[name], line.with_line(idx as u32 + 1));
        let (ty, values) = if idx == 0 {
            (Some(int.clone()), Some(vec![shift.clone()]))
        } else {
            (None, None)
        };
        decls.extend(declared(&resolver.const_iter(&names, ty, values).unwrap()));
    }

    let values: Vec<String> = decls
        .iter()
        .map(|&decl| const_value(&resolver, decl))
        .collect();
    assert_eq!(values, ["1 << 0", "1 << 1", "1 << 2"]);
    let iotas: Vec<i64> = decls.iter().map(|&decl| resolver.decl(decl).iota).collect();
    assert_eq!(iotas, [0, 1, 2]);
    assert!(
        decls
            .iter()
            .all(|&decl| resolver.decl(decl).type_expr.as_ref() == Some(&int))
    );
    assert_eq!(resolver.iota(), 3);
    assert!(resolver.diagnostics().is_empty());
}

#[test]
fn test_const_group_restarts_iota() {
    let (mut resolver, file) = setup();
    let line = Pos::new(file, 1);
    let iota = Expr::new(ExprKind::Iota, line);

    resolver.begin_const_group();
    let names = idents(&mut resolver, &["a"], line);
    resolver.const_iter(&names, None, Some(vec![iota.clone()])).unwrap();
    resolver.begin_const_group();
    let names = idents(&mut resolver, &["b"], line.with_line(2));
    let stmts = resolver.const_iter(&names, None, Some(vec![iota])).unwrap();

    let b = declared(&stmts)[0];
    assert_eq!(const_value(&resolver, b), "0");
}

#[test]
fn test_const_type_without_value() {
    let (mut resolver, file) = setup();
    let line = Pos::new(file, 5);
    let int = resolver.lookup("int");
    resolver.begin_const_group();
    let names = idents(&mut resolver, &["a", "b"], line);
    resolver
        .const_iter(&names, None, Some(vec![Expr::int(7, line)]))
        .unwrap();
    resolver.set_line(line.with_line(6));
    let names = idents(&mut resolver, &["c"], line.with_line(6));
    resolver
        .const_iter(&names, Some(TypeExpr::name(int, line)), None)
        .unwrap();

    expect![[r#"
        a.go:5: missing expr in const dcl
        a.go:6: constdcl cannot have type without expr
    "#]]
    .assert_eq(&resolver.render_diagnostics());
}

#[test]
fn test_short_declaration_of_two_names() {
    let (mut resolver, file) = setup();
    let func = enter_function(&mut resolver, "main", Pos::new(file, 1));
    let line = Pos::new(file, 2);
    let x = resolver.lookup("x");
    let y = resolver.lookup("y");
    let value = call(&mut resolver, "pair", line);

    let stmt = resolver
        .colas(vec![Expr::name(x, line), Expr::name(y, line)], vec![value])
        .unwrap();

    let Stmt::AssignList { lhs, rhs, define, init } = stmt else {
        panic!("expected a multi-value assignment, got {stmt:?}");
    };
    let x_decl = resolver.binding(x).unwrap();
    let y_decl = resolver.binding(y).unwrap();
    assert!(define);
    assert_eq!(rhs.len(), 1);
    assert_eq!(lhs, [Operand::Decl(x_decl), Operand::Decl(y_decl)]);
    assert_eq!(init, [Stmt::Decl(x_decl), Stmt::Decl(y_decl)]);
    assert_eq!(resolver.decl(x_decl).definition, Some(Definition::Define));
    assert_eq!(resolver.decl(x_decl).kind, DeclKind::Var);
    resolver.func_body_end(func).unwrap();
}

#[test]
fn test_short_declaration_reuses_names_of_the_block() {
    let (mut resolver, file) = setup();
    let func = enter_function(&mut resolver, "main", Pos::new(file, 1));
    let line = Pos::new(file, 2);
    let [x, err] = ["x", "err"].map(|name| resolver.lookup(name));
    resolver
        .colas(vec![Expr::name(err, line)], vec![Expr::int(0, line)])
        .unwrap();
    let err_decl = resolver.binding(err).unwrap();

    let line = line.with_line(3);
    let stmt = resolver
        .colas(
            vec![Expr::name(x, line), Expr::name(err, line)],
            vec![Expr::int(1, line), Expr::int(2, line)],
        )
        .unwrap();

    let Stmt::AssignList { lhs, init, .. } = stmt else {
        panic!("expected a multi-value assignment, got {stmt:?}");
    };
    let x_decl = resolver.binding(x).unwrap();
    assert_eq!(lhs, [Operand::Decl(x_decl), Operand::Decl(err_decl)]);
    assert_eq!(init, [Stmt::Decl(x_decl)]);
    assert!(resolver.diagnostics().is_empty());
    resolver.func_body_end(func).unwrap();
}

#[test]
fn test_short_declaration_collapses_single_pair() {
    let (mut resolver, file) = setup();
    let func = enter_function(&mut resolver, "main", Pos::new(file, 1));
    let line = Pos::new(file, 2);
    let x = resolver.lookup("x");
    let stmt = resolver
        .colas(vec![Expr::name(x, line)], vec![Expr::int(1, line)])
        .unwrap();
    let x_decl = resolver.binding(x).unwrap();
    assert_eq!(
        stmt,
        Stmt::Assign {
            lhs: Operand::Decl(x_decl),
            rhs: Some(Expr::int(1, line)),
            define: true,
            init: vec![Stmt::Decl(x_decl)],
        }
    );
    resolver.func_body_end(func).unwrap();
}

#[test]
fn test_short_declaration_without_new_variables() {
    let (mut resolver, file) = setup();
    let func = enter_function(&mut resolver, "main", Pos::new(file, 1));
    let line = Pos::new(file, 2);
    let x = resolver.lookup("x");
    resolver
        .colas(vec![Expr::name(x, line)], vec![Expr::int(1, line)])
        .unwrap();

    let line = line.with_line(3);
    resolver.set_line(line);
    resolver
        .colas(vec![Expr::name(x, line)], vec![Expr::int(2, line)])
        .unwrap();

    let field = resolver.lookup("f");
    let selector = Expr::new(
        ExprKind::Selector {
            base: Box::new(Expr::name(x, line.with_line(4))),
            field,
        },
        line.with_line(4),
    );
    resolver
        .colas(vec![selector], vec![Expr::int(3, line)])
        .unwrap();
    resolver.func_body_end(func).unwrap();

    expect![[r#"
        a.go:3: no new variables on left side of :=
        a.go:4: non-name x.f on left side of :=
    "#]]
    .assert_eq(&resolver.render_diagnostics());
}

#[test]
fn test_short_declaration_shadows_outer_block() {
    let (mut resolver, file) = setup();
    let func = enter_function(&mut resolver, "main", Pos::new(file, 1));
    let line = Pos::new(file, 2);
    let x = resolver.lookup("x");
    resolver
        .colas(vec![Expr::name(x, line)], vec![Expr::int(1, line)])
        .unwrap();
    let outer = resolver.binding(x);

    resolver.mark_scope();
    resolver
        .colas(vec![Expr::name(x, line.with_line(3))], vec![Expr::int(2, line)])
        .unwrap();
    assert_ne!(resolver.binding(x), outer);
    resolver.pop_scope().unwrap();

    assert_eq!(resolver.binding(x), outer);
    assert!(resolver.diagnostics().is_empty());
    resolver.func_body_end(func).unwrap();
}

#[test]
fn test_add_var_with_known_type() {
    let (mut resolver, file) = setup();
    let line = Pos::new(file, 1);
    let string = resolver.basic(tn_ty::BasicKind::String).unwrap();
    let name = idents(&mut resolver, &["greeting"], line).remove(0);
    let decl = resolver
        .add_var(&name, string, DeclClass::External)
        .unwrap()
        .unwrap();
    assert_eq!(resolver.decl(decl).ty, Some(string));
    assert_eq!(resolver.extern_decls(), [decl]);
}
