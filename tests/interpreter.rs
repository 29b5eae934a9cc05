#[cfg(test)]
mod interpreter_tests {
    use rubel::ast::{Expr, Literal, Script, Stmt};
    use rubel::error::{ErrorKind, RubelError, RunStatus};
    use rubel::function::{FuncGroup, FuncObj};
    use rubel::interpreter::{Flow, Interpreter, RuntimeConfig};
    use rubel::parser::parse_source;
    use rubel::value::Value;

    fn script(source: &str) -> Script {
        parse_source("test", source).unwrap_or_else(|e| panic!("parse failed: {}", e))
    }

    /// Run `source` with the standard groups loaded and hand the finished
    /// context and outcome to `check`.
    fn run<F>(source: &str, check: F)
    where
        F: FnOnce(&Interpreter<'_>, rubel::error::Result<()>),
    {
        let script = script(source);
        let mut interp = Interpreter::new(&script);

        interp.load_standard_groups().expect("standard groups load");

        let outcome = interp.run();
        check(&interp, outcome);
    }

    fn int(interp: &Interpreter<'_>, name: &str) -> Option<i64> {
        interp.lookup(name).and_then(Value::as_int)
    }

    /// Statement index and kind of a runtime failure.
    fn failure(outcome: rubel::error::Result<()>) -> (usize, ErrorKind) {
        match outcome {
            Err(RubelError::Runtime { stmt, source }) => (stmt, source.kind),
            other => panic!("Expected runtime error, got {:?}", other),
        }
    }

    // ───────────────────────── core scenarios ─────────────────────

    #[test]
    fn test_let_then_read() {
        let script = script("let x = 5");
        let expr = Expr::Variable("x".into());
        let mut interp = Interpreter::new(&script);

        interp.run().expect("should run");

        let value = interp.evaluate(&expr).unwrap().expect("a value");
        assert_eq!(value.as_int(), Some(5));
        assert_eq!(interp.status(), RunStatus::Ended);
    }

    #[test]
    fn test_const_assignment_fails() {
        run("const c = 1\nc = 2", |interp, outcome| {
            assert_eq!(failure(outcome), (1, ErrorKind::General));
            assert_eq!(int(interp, "c"), Some(1), "const binding unchanged");
            assert!(interp.status().is_error());
        });
    }

    #[test]
    fn test_list_natives() {
        run(
            "use \"lists\"\nlet n = length([1, 2, 3])\nat([1, 2, 3], 5)\nlet m = at([1, 2, 3], 5)",
            |interp, outcome| {
                assert_eq!(int(interp, "n"), Some(3));
                assert_eq!(
                    failure(outcome),
                    (3, ErrorKind::NullValue),
                    "a discarded 'no result' is fine, binding one is not"
                );
                assert!(interp.lookup("m").is_none());
            },
        );
    }

    #[test]
    fn test_proc_call_and_arity() {
        run(
            "proc add(a, b)\nreturn a + b\nend\nlet s = add(2, 3)\nlet t = add(2)",
            |interp, outcome| {
                assert_eq!(int(interp, "s"), Some(5));
                assert_eq!(failure(outcome), (2, ErrorKind::NoImpl));
                assert_eq!(interp.status(), RunStatus::NoImpl);
            },
        );
    }

    #[test]
    fn test_while_true_with_break_terminates() {
        let source = "let i = 0\n\
                      while $T\n\
                        i = i + 1\n\
                        if i == 4 break end\n\
                      end";

        run(source, |interp, outcome| {
            outcome.expect("loop must terminate");
            assert_eq!(int(interp, "i"), Some(4));
        });
    }

    #[test]
    fn test_unregistered_function_after_use() {
        run("use \"io\"\nmystery(1)", |_, outcome| {
            assert_eq!(failure(outcome), (1, ErrorKind::NoImpl));
        });
    }

    #[test]
    fn test_native_needs_use() {
        run("let n = length([1])", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::NoImpl));
        });

        run("use \"nope\"", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::NoImpl));
        });
    }

    // ───────────────────────── control flow ───────────────────────

    #[test]
    fn test_inner_break_leaves_outer_loop_running() {
        let source = "let outer = 0\n\
                      let total = 0\n\
                      while outer < 3\n\
                        outer = outer + 1\n\
                        let inner = 0\n\
                        while $T\n\
                          inner = inner + 1\n\
                          total = total + 1\n\
                          if inner == 2 break end\n\
                        end\n\
                      end";

        run(source, |interp, outcome| {
            outcome.expect("should run");
            assert_eq!(int(interp, "outer"), Some(3));
            assert_eq!(int(interp, "total"), Some(6));
        });
    }

    #[test]
    fn test_return_bubbles_through_nesting() {
        let source = "proc find(limit)\n\
                      let i = 0\n\
                      while $T\n\
                        while $T\n\
                          if i == limit\n\
                            if $T return i * 10 end\n\
                          end\n\
                          i = i + 1\n\
                        end\n\
                      end\n\
                      return 0 - 1\n\
                      end\n\
                      let r = find(7)";

        run(source, |interp, outcome| {
            outcome.expect("should run");
            assert_eq!(int(interp, "r"), Some(70));
        });
    }

    #[test]
    fn test_return_stops_following_statements() {
        let source = "let hits = 0\n\
                      proc f()\n\
                        hits = hits + 1\n\
                        return 1\n\
                        hits = hits + 100\n\
                      end\n\
                      let r = f()";

        run(source, |interp, outcome| {
            outcome.expect("should run");
            assert_eq!(int(interp, "hits"), Some(1));
        });
    }

    #[test]
    fn test_if_otherwise_branches() {
        let source = "let a = 0\n\
                      let b = 0\n\
                      if 1 > 2 a = 1 end otherwise a = 2 end\n\
                      if 2 > 1 b = 1 end otherwise b = 2 end";

        run(source, |interp, outcome| {
            outcome.expect("should run");
            assert_eq!(int(interp, "a"), Some(2));
            assert_eq!(int(interp, "b"), Some(1));
        });
    }

    #[test]
    fn test_non_boolean_conditions() {
        run("if 1 let a = 1 end", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::Type));
        });

        run("while \"yes\" let a = 1 end", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::Type));
        });
    }

    #[test]
    fn test_recursion() {
        let source = "proc fact(n)\n\
                      if n <= 1 return 1 end\n\
                      return n * fact(n - 1)\n\
                      end\n\
                      let f = fact(10)";

        run(source, |interp, outcome| {
            outcome.expect("should run");
            assert_eq!(int(interp, "f"), Some(3_628_800));
        });
    }

    #[test]
    fn test_runaway_recursion_fails_cleanly() {
        let script = script("proc down(n)\nreturn down(n + 1)\nend\nlet x = down(0)");
        let config = RuntimeConfig {
            scope_depth: 16,
            ..RuntimeConfig::default()
        };
        let mut interp = Interpreter::with_config(&script, config);

        let (stmt, kind) = failure(interp.run());

        assert_eq!((stmt, kind), (1, ErrorKind::General));
        assert_eq!(interp.scopes().depth(), 1, "every frame was unwound");
        assert_eq!(interp.status(), RunStatus::General);
    }

    // ───────────────────────── bindings ───────────────────────────

    #[test]
    fn test_redeclaration_rejected_in_same_scope() {
        run("let x = 1\nlet x = 2", |interp, outcome| {
            assert_eq!(failure(outcome), (1, ErrorKind::General));
            assert_eq!(int(interp, "x"), Some(1));
        });
    }

    #[test]
    fn test_shadowing_in_child_scope() {
        let source = "let x = 1\n\
                      let seen = 0\n\
                      if $T\n\
                        let x = 2\n\
                        seen = x\n\
                      end";

        run(source, |interp, outcome| {
            outcome.expect("child scope may shadow");
            assert_eq!(int(interp, "seen"), Some(2));
            assert_eq!(int(interp, "x"), Some(1), "shadow dropped with its scope");
        });
    }

    #[test]
    fn test_assignment_kind_mismatch() {
        run("let x = 1\nx = \"one\"", |interp, outcome| {
            assert_eq!(failure(outcome), (1, ErrorKind::Type));
            assert_eq!(int(interp, "x"), Some(1), "binding not mutated");
        });
    }

    #[test]
    fn test_assignment_replaces_payload() {
        run(
            "let s = \"a\"\ns = \"bcd\"\nlet xs = [1]\nxs = [4, 5]",
            |interp, outcome| {
                outcome.expect("should run");
                assert_eq!(interp.lookup("s").map(Value::to_string), Some("bcd".into()));
                assert_eq!(
                    interp.lookup("xs").map(Value::to_string),
                    Some("[4, 5]".into())
                );
            },
        );
    }

    #[test]
    fn test_literal_initialized_binding_is_mutable() {
        run("let v = 1\nv = 2", |interp, outcome| {
            outcome.expect("let bindings are mutable");
            assert_eq!(int(interp, "v"), Some(2));
            assert!(!interp.lookup("v").map(Value::is_const).unwrap_or(true));
        });
    }

    #[test]
    fn test_undefined_variable() {
        run("let y = nope + 1", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::NoImpl));
        });

        run("nope = 1", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::NoImpl));
        });
    }

    #[test]
    fn test_globals_visible_in_procs() {
        run(
            "let g = 2\nproc f()\nreturn g * 3\nend\nlet y = f()",
            |interp, outcome| {
                outcome.expect("should run");
                assert_eq!(int(interp, "y"), Some(6));
            },
        );
    }

    #[test]
    fn test_nested_proc_sees_enclosing_frame() {
        let source = "proc outer()\n\
                      let base = 10\n\
                      proc inner(x)\n\
                        return base + x\n\
                      end\n\
                      return inner(5)\n\
                      end\n\
                      let r = outer()";

        run(source, |interp, outcome| {
            outcome.expect("should run");
            assert_eq!(int(interp, "r"), Some(15));
            assert!(interp.lookup("base").is_none(), "locals die with the call");
        });
    }

    #[test]
    fn test_params_do_not_leak() {
        run(
            "proc id(p)\nreturn p\nend\nlet a = id(4)\nlet b = p",
            |interp, outcome| {
                assert_eq!(int(interp, "a"), Some(4));
                assert_eq!(failure(outcome), (2, ErrorKind::NoImpl));
            },
        );
    }

    // ───────────────────────── expressions ────────────────────────

    #[test]
    fn test_arithmetic_errors() {
        run("let z = 1 / 0", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::NullValue));
        });

        run("let z = 1 + 2.0", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::Type));
        });

        run("let z = -$T", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::Type));
        });
    }

    #[test]
    fn test_index_expressions() {
        run(
            "let xs = [10, 20, [30]]\nlet a = xs[1]\nlet b = xs[2][0]\nlet c = \"abc\"[2]\nlet d = xs[3]",
            |interp, outcome| {
                assert_eq!(int(interp, "a"), Some(20));
                assert_eq!(int(interp, "b"), Some(30));
                assert_eq!(interp.lookup("c").map(Value::to_string), Some("c".into()));
                assert_eq!(failure(outcome), (4, ErrorKind::NullValue));
            },
        );
    }

    #[test]
    fn test_string_natives() {
        run(
            "use \"strings\"\nlet s = concat(\"ab\", \"cd\")\nlet c = char_at(s, 3)",
            |interp, outcome| {
                outcome.expect("should run");
                assert_eq!(interp.lookup("s").map(Value::to_string), Some("abcd".into()));
                assert_eq!(interp.lookup("c").map(Value::to_string), Some("d".into()));
            },
        );
    }

    #[test]
    fn test_proc_without_return_yields_no_result() {
        run("proc noop()\nlet a = 1\nend\nnoop()\nlet v = noop()", |_, outcome| {
            assert_eq!(failure(outcome), (2, ErrorKind::NullValue));
        });
    }

    #[test]
    fn test_bare_expression_is_unused_value() {
        let script = script("1 + 2");
        let mut interp = Interpreter::new(&script);

        let flow = interp.execute(&script.statements[0]).expect("not an error");

        assert_eq!(flow, Flow::Normal);
        assert_eq!(interp.status(), RunStatus::UnusedValue);
        assert!(!interp.status().is_error());
    }

    #[test]
    fn test_bare_expression_is_not_evaluated() {
        run("1 / 0\nlet x = 1", |interp, outcome| {
            outcome.expect("a bare division never runs");
            assert_eq!(int(interp, "x"), Some(1));
        });

        run("nope + 1\nlet y = 2", |interp, outcome| {
            outcome.expect("a bare unknown name never runs");
            assert_eq!(int(interp, "y"), Some(2));
        });

        let script = script("1 / 0");
        let mut interp = Interpreter::new(&script);

        interp
            .execute(&script.statements[0])
            .expect("skipped, not failed");
        assert_eq!(interp.status(), RunStatus::UnusedValue);
    }

    #[test]
    fn test_bare_call_is_still_evaluated() {
        run("proc boom()\nreturn 1 / 0\nend\nboom()\nlet x = 1", |interp, outcome| {
            assert_eq!(failure(outcome), (1, ErrorKind::NullValue));
            assert!(interp.lookup("x").is_none());
        });
    }

    // ───────────────────────── statements ─────────────────────────

    #[test]
    fn test_module_declaration_not_implemented() {
        run("module core", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::NoImpl));
        });
    }

    #[test]
    fn test_duplicate_proc_rejected() {
        run("proc f()\nreturn 1\nend\nproc f()\nreturn 2\nend", |_, outcome| {
            assert_eq!(failure(outcome), (1, ErrorKind::General));
        });
    }

    #[test]
    fn test_break_escaping_to_top_level() {
        // Hand-built AST: the parser never produces this.
        let script = Script::new("raw", vec![Stmt::Break]);
        let mut interp = Interpreter::new(&script);

        assert_eq!(failure(interp.run()), (0, ErrorKind::General));
    }

    #[test]
    fn test_block_statement_scopes_bindings() {
        let script = Script::new(
            "raw",
            vec![
                Stmt::Block(vec![Stmt::VarDecl {
                    name: "inside".into(),
                    is_const: false,
                    initializer: Expr::Literal(Literal::Int(1)),
                }]),
                Stmt::Expression(Expr::Variable("inside".into())),
            ],
        );
        let mut interp = Interpreter::new(&script);

        assert_eq!(failure(interp.run()), (1, ErrorKind::NoImpl));
    }

    #[test]
    fn test_error_report_format() {
        run("let x = 1\nlet y = x / 0", |_, outcome| {
            let message = outcome.expect_err("division by zero").to_string();

            assert!(message.starts_with("NullErr at stmt 1"), "got: {}", message);
            assert!(message.contains("Division by zero"), "got: {}", message);
        });
    }

    // ───────────────────────── driver API ─────────────────────────

    fn seven(_args: &rubel::function::FuncArgs) -> Option<Value> {
        Some(Value::int(false, 7))
    }

    #[test]
    fn test_custom_native_group() {
        let script = script("use \"extra\"\nlet n = seven()");
        let mut interp = Interpreter::new(&script);

        let mut group =
            FuncGroup::with_functions("extra", 4, [FuncObj::native("seven", 0, seven)]).unwrap();
        group.set_used(true);

        interp.load_native_group(group).unwrap();
        assert!(
            !interp.functions().fetch("extra").unwrap().is_used(),
            "loading never makes a group visible"
        );

        interp.run().expect("should run");
        assert_eq!(int(&interp, "n"), Some(7));
    }

    #[test]
    fn test_script_named_like_a_native_group() {
        let script = parse_source("io", "use \"io\"\nprintln(1)\nlet done = 1")
            .expect("should parse");
        let mut interp = Interpreter::new(&script);

        interp
            .load_standard_groups()
            .expect("script name does not clash with group names");
        interp.run().expect("should run");
        assert_eq!(int(&interp, "done"), Some(1));
    }

    #[test]
    fn test_script_cannot_use_its_own_group() {
        run("use \"test\"", |_, outcome| {
            assert_eq!(failure(outcome), (0, ErrorKind::NoImpl));
        });
    }

    #[test]
    fn test_duplicate_group_load_fails() {
        let script = script("");
        let mut interp = Interpreter::new(&script);

        interp.load_standard_groups().unwrap();
        assert!(interp.load_standard_groups().is_err());
    }

    #[test]
    fn test_dispose_releases_scopes() {
        let script = script("let a = 1");
        let mut interp = Interpreter::new(&script);

        assert_eq!(interp.status(), RunStatus::Idle);
        interp.run().unwrap();

        interp.dispose();
        assert!(interp.scopes().is_empty());
        assert!(interp.lookup("a").is_none());
    }
}
