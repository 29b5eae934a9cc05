#[cfg(test)]
mod function_tests {
    use rubel::ast::{Expr, Literal, Stmt};
    use rubel::error::ErrorKind;
    use rubel::function::*;
    use rubel::natives;
    use rubel::value::{ListObj, StringObj, Value};

    fn answer(_args: &FuncArgs) -> Option<Value> {
        Some(Value::int(false, 42))
    }

    fn nothing(_args: &FuncArgs) -> Option<Value> {
        None
    }

    fn call_native(func: &FuncObj<'_>, args: Vec<Value>) -> Option<Value> {
        match func.body() {
            FuncBody::Native(f) => f(&FuncArgs::new(args)),
            FuncBody::Ast { .. } => panic!("expected a native function"),
        }
    }

    #[test]
    fn test_group_hidden_until_used() {
        let mut group = FuncGroup::new("math", FUNC_GROUP_SIZE);
        group.put(FuncObj::native("answer", 0, answer)).unwrap();

        assert!(!group.is_used());
        assert!(group.get("answer").is_none(), "unused groups are invisible");
        assert!(group.find("answer").is_some());

        group.set_used(true);
        assert_eq!(group.get("answer").map(FuncObj::arity), Some(0));
    }

    #[test]
    fn test_group_rejects_duplicate_names() {
        let mut group = FuncGroup::new("g", FUNC_GROUP_SIZE);

        group.put(FuncObj::native("f", 0, answer)).unwrap();
        let err = group
            .put(FuncObj::native("f", 1, nothing))
            .expect_err("duplicate name");

        assert_eq!(err.kind, ErrorKind::General);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_group_chains_colliding_names() {
        // One bucket: every name collides, none is rejected.
        let mut group = FuncGroup::new("tiny", 1);

        group.put(FuncObj::native("a", 0, answer)).unwrap();
        group.put(FuncObj::native("b", 0, nothing)).unwrap();
        group.put(FuncObj::native("c", 0, answer)).unwrap();
        group.set_used(true);

        assert_eq!(group.len(), 3);
        assert!(group.get("b").is_some());
        assert!(group.get("c").is_some());
    }

    #[test]
    fn test_ast_function_borrows_body() {
        let params = vec!["a".to_string(), "b".to_string()];
        let body = vec![Stmt::Return(Expr::Literal(Literal::Int(1)))];

        let func = FuncObj::ast("pair", &params, &body);

        assert_eq!(func.arity(), 2);
        assert!(!func.is_native());

        match func.body() {
            FuncBody::Ast { params: p, body: b } => {
                assert!(std::ptr::eq(p, params.as_slice()));
                assert!(std::ptr::eq(b, body.as_slice()));
            }
            FuncBody::Native(_) => panic!("expected an AST body"),
        }
    }

    #[test]
    fn test_env_script_group_always_used() {
        let env = FuncEnv::new(FuncGroup::new("main", FUNC_GROUP_SIZE));

        assert_eq!(env.len(), 1);
        assert!(env.script_group().is_used());
    }

    #[test]
    fn test_env_use_group() {
        let mut env = FuncEnv::new(FuncGroup::new("main", FUNC_GROUP_SIZE));
        env.append(natives::io_group(FUNC_GROUP_SIZE).unwrap())
            .unwrap();

        assert!(env.resolve("println").is_none());

        env.use_group("io").unwrap();
        assert!(env.fetch("io").map(FuncGroup::is_used).unwrap_or(false));
        assert_eq!(env.resolve("println").map(|f| f.arity()), Some(1));

        let err = env.use_group("graphics").expect_err("unknown module");
        assert_eq!(err.kind, ErrorKind::NoImpl);
    }

    #[test]
    fn test_env_rejects_duplicate_group() {
        let mut env = FuncEnv::new(FuncGroup::new("main", FUNC_GROUP_SIZE));

        env.append(FuncGroup::new("x", 4)).unwrap();
        assert!(env.append(FuncGroup::new("x", 4)).is_err());
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_script_group_is_not_found_by_name() {
        let mut env = FuncEnv::new(FuncGroup::new("io", FUNC_GROUP_SIZE));

        assert!(env.fetch("io").is_none());
        env.append(natives::io_group(FUNC_GROUP_SIZE).unwrap())
            .expect("a loaded group may share the script's name");
        assert_eq!(env.len(), 2);

        env.use_group("io").unwrap();
        assert!(env.script_group().is_used());
        assert!(env.fetch("io").map(FuncGroup::is_used).unwrap_or(false));
    }

    #[test]
    fn test_resolution_first_used_group_wins() {
        let mut env = FuncEnv::new(FuncGroup::new("main", FUNC_GROUP_SIZE));

        let first = FuncGroup::with_functions("first", 4, [FuncObj::native("f", 0, answer)])
            .unwrap();
        let second = FuncGroup::with_functions("second", 4, [FuncObj::native("f", 1, nothing)])
            .unwrap();

        env.append(first).unwrap();
        env.append(second).unwrap();

        env.use_group("second").unwrap();
        assert_eq!(env.resolve("f").map(|f| f.arity()), Some(1));

        env.use_group("first").unwrap();
        assert_eq!(
            env.resolve("f").map(|f| f.arity()),
            Some(0),
            "registration order decides, not use order"
        );

        env.script_group_mut()
            .put(FuncObj::native("f", 2, nothing))
            .unwrap();
        assert_eq!(env.resolve("f").map(|f| f.arity()), Some(2));
    }

    #[test]
    fn test_lists_natives() {
        let group = natives::lists_group(FUNC_GROUP_SIZE).unwrap();
        let length = *group.find("length").unwrap();
        let at = *group.find("at").unwrap();

        let xs = || {
            Value::list(
                true,
                [1, 2, 3]
                    .iter()
                    .map(|n| Value::int(true, *n))
                    .collect::<ListObj>(),
            )
        };

        assert_eq!(
            call_native(&length, vec![xs()]).and_then(|v| v.as_int()),
            Some(3)
        );
        assert!(call_native(&length, vec![Value::int(false, 3)]).is_none());

        let item = call_native(&at, vec![xs(), Value::int(false, 1)]).expect("in range");
        assert_eq!(item.as_int(), Some(2));
        assert!(!item.is_const());

        assert!(call_native(&at, vec![xs(), Value::int(false, 5)]).is_none());
        assert!(call_native(&at, vec![xs(), Value::int(false, -1)]).is_none());
    }

    #[test]
    fn test_strings_natives() {
        let group = natives::strings_group(FUNC_GROUP_SIZE).unwrap();
        let concat = *group.find("concat").unwrap();
        let char_at = *group.find("char_at").unwrap();

        let s = |text: &str| Value::str(false, StringObj::from(text));

        let joined = call_native(&concat, vec![s("foo"), s("bar")]).expect("strings");
        assert_eq!(joined.to_string(), "foobar");
        assert!(call_native(&concat, vec![s("foo"), Value::int(false, 1)]).is_none());

        let c = call_native(&char_at, vec![s("abc"), Value::int(false, 2)]).expect("in range");
        assert_eq!(c.to_string(), "c");
        assert!(call_native(&char_at, vec![s("abc"), Value::int(false, 3)]).is_none());
    }

    #[test]
    fn test_input_clipping() {
        assert_eq!(natives::clip_line("hello\r\n"), "hello");
        assert_eq!(natives::clip_line(&"x".repeat(40)).len(), natives::INPUT_LIMIT);

        // Multi-byte characters are never split.
        let input = "é".repeat(20);
        let clipped = natives::clip_line(&input);
        assert!(clipped.len() <= natives::INPUT_LIMIT);
        assert_eq!(clipped.chars().count(), 16);
    }

    #[test]
    fn test_standard_groups_start_unused() {
        let groups = natives::standard_groups(FUNC_GROUP_SIZE).unwrap();
        let names: Vec<&str> = groups.iter().map(FuncGroup::name).collect();

        assert_eq!(names, vec!["io", "lists", "strings"]);
        assert!(groups.iter().all(|g| !g.is_used()));
    }
}
