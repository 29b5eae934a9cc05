#[cfg(test)]
mod value_tests {
    use rubel::ast::{BinaryOp, UnaryOp};
    use rubel::error::{ErrorKind, RunStatus};
    use rubel::value::*;

    fn ints(items: &[i64]) -> Value {
        Value::list(
            false,
            items.iter().map(|n| Value::int(false, *n)).collect::<ListObj>(),
        )
    }

    #[test]
    fn test_constructors_and_accessors() {
        let v = Value::int(true, 7);

        assert_eq!(v.data_type(), DataType::Int);
        assert!(v.is_const());
        assert_eq!(v.as_int(), Some(7));
        assert_eq!(v.as_real(), None);

        let s = Value::str(false, StringObj::from("abc"));
        assert_eq!(s.data_type(), DataType::Str);
        assert_eq!(s.as_str().map(StringObj::as_str), Some("abc"));
        assert!(!s.is_const());
    }

    #[test]
    fn test_arithmetic_same_kind() {
        let a = Value::int(false, 7);
        let b = Value::int(false, 2);

        assert_eq!(a.binary(BinaryOp::Add, &b).unwrap().as_int(), Some(9));
        assert_eq!(a.binary(BinaryOp::Sub, &b).unwrap().as_int(), Some(5));
        assert_eq!(a.binary(BinaryOp::Mul, &b).unwrap().as_int(), Some(14));
        assert_eq!(a.binary(BinaryOp::Div, &b).unwrap().as_int(), Some(3));

        let x = Value::real(false, 1.5);
        let y = Value::real(false, 0.5);
        assert_eq!(x.binary(BinaryOp::Div, &y).unwrap().as_real(), Some(3.0));

        let result = a.binary(BinaryOp::Add, &b).unwrap();
        assert!(!result.is_const(), "computed results are never const");
    }

    #[test]
    fn test_comparisons() {
        let a = Value::int(false, 1);
        let b = Value::int(false, 2);

        assert_eq!(a.binary(BinaryOp::Lt, &b).unwrap().as_bool(), Some(true));
        assert_eq!(a.binary(BinaryOp::Gte, &b).unwrap().as_bool(), Some(false));
        assert_eq!(a.binary(BinaryOp::Neq, &b).unwrap().as_bool(), Some(true));

        let t = Value::bool(false, true);
        let f = Value::bool(false, false);
        assert_eq!(t.binary(BinaryOp::Eq, &f).unwrap().as_bool(), Some(false));
        assert_eq!(t.binary(BinaryOp::Gt, &f).unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_mismatched_kinds_are_type_errors() {
        let a = Value::int(false, 1);
        let b = Value::real(false, 1.0);

        let err = a.binary(BinaryOp::Add, &b).expect_err("int + real");
        assert_eq!(err.kind, ErrorKind::Type);
        assert_eq!(err.status(), RunStatus::TypeError);

        let s = Value::str(false, StringObj::from("a"));
        let err = s.binary(BinaryOp::Add, &s.clone()).expect_err("str + str");
        assert_eq!(err.kind, ErrorKind::Type);

        let err = s.binary(BinaryOp::Eq, &s.clone()).expect_err("str == str");
        assert_eq!(err.kind, ErrorKind::Type);

        let t = Value::bool(false, true);
        let err = t.binary(BinaryOp::Mul, &t.clone()).expect_err("bool * bool");
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_division_by_zero_is_null_value() {
        for (a, b) in [(5, 0), (0, 0), (-3, 0)] {
            let err = Value::int(false, a)
                .binary(BinaryOp::Div, &Value::int(false, b))
                .expect_err("division by zero");
            assert_eq!(err.kind, ErrorKind::NullValue);
        }

        for (a, b) in [(5, 1), (0, 3), (-3, -1)] {
            assert!(Value::int(false, a)
                .binary(BinaryOp::Div, &Value::int(false, b))
                .is_ok());
        }

        let err = Value::real(false, 1.0)
            .binary(BinaryOp::Div, &Value::real(false, 0.0))
            .expect_err("real division by zero");
        assert_eq!(err.kind, ErrorKind::NullValue);
    }

    #[test]
    fn test_overflow_is_null_value() {
        let err = Value::int(false, i64::MAX)
            .binary(BinaryOp::Add, &Value::int(false, 1))
            .expect_err("overflow");
        assert_eq!(err.kind, ErrorKind::NullValue);

        let err = Value::int(false, i64::MIN)
            .unary(UnaryOp::Neg)
            .expect_err("overflow");
        assert_eq!(err.kind, ErrorKind::NullValue);
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            Value::int(false, 4).unary(UnaryOp::Neg).unwrap().as_int(),
            Some(-4)
        );
        assert_eq!(
            Value::real(false, 2.5).unary(UnaryOp::Neg).unwrap().as_real(),
            Some(-2.5)
        );

        let err = Value::bool(false, true)
            .unary(UnaryOp::Neg)
            .expect_err("negating a bool");
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_list_append_and_index() {
        let mut list = ListObj::new();
        assert!(list.is_empty());

        list.append(Value::int(false, 10));
        list.append(Value::str(false, StringObj::from("x")));
        list.append(Value::bool(false, true));

        assert_eq!(list.count(), 3);
        assert_eq!(list.get(0).and_then(Value::as_int), Some(10));
        assert_eq!(list.get(2).and_then(Value::as_bool), Some(true));
        assert!(list.get(3).is_none());

        let order: Vec<DataType> = list.iter().map(Value::data_type).collect();
        assert_eq!(order, vec![DataType::Int, DataType::Str, DataType::Bool]);
    }

    #[test]
    fn test_value_index() {
        let xs = ints(&[1, 2, 3]);

        let second = xs.index(&Value::int(false, 1)).unwrap();
        assert_eq!(second.and_then(|v| v.as_int()), Some(2));

        assert!(xs.index(&Value::int(false, 5)).unwrap().is_none());
        assert!(xs.index(&Value::int(false, -1)).unwrap().is_none());

        let err = xs.index(&Value::real(false, 0.0)).expect_err("real index");
        assert_eq!(err.kind, ErrorKind::Type);

        let s = Value::str(false, StringObj::from("héllo"));
        let c = s.index(&Value::int(false, 1)).unwrap().expect("in range");
        assert_eq!(c.as_str().map(StringObj::as_str), Some("é"));

        let err = Value::int(false, 3)
            .index(&Value::int(false, 0))
            .expect_err("indexing an int");
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_string_append() {
        let mut s = StringObj::from("ab");
        let before = s.capacity();

        s.append(&StringObj::from(""));
        assert_eq!(s.as_str(), "ab");
        assert_eq!(s.capacity(), before, "empty append is a no-op");

        s.append(&StringObj::from("cdef"));
        assert_eq!(s.as_str(), "abcdef");
        assert_eq!(s.len(), 6);
        assert!(s.capacity() >= 6);

        assert_eq!(s.char_at(2).map(|c| c.to_string()), Some("c".to_string()));
        assert!(s.char_at(6).is_none());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = ints(&[1, 2]);
        let mut copy = original.clone();

        if let Some(list) = copy.as_list() {
            let mut grown: ListObj = list.iter().cloned().collect();
            grown.append(Value::int(false, 3));
            copy = Value::list(false, grown);
        }

        assert_eq!(original.as_list().map(ListObj::count), Some(2));
        assert_eq!(copy.as_list().map(ListObj::count), Some(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::bool(false, true).to_string(), "$T");
        assert_eq!(Value::bool(false, false).to_string(), "$F");
        assert_eq!(Value::int(false, -12).to_string(), "-12");
        assert_eq!(Value::real(false, 2.0).to_string(), "2.0");
        assert_eq!(Value::real(false, 2.5).to_string(), "2.5");
        assert_eq!(Value::str(false, StringObj::from("hi")).to_string(), "hi");

        let mixed = Value::list(
            false,
            vec![
                Value::int(false, 1),
                Value::str(false, StringObj::from("a")),
                ints(&[2]),
            ]
            .into_iter()
            .collect::<ListObj>(),
        );
        assert_eq!(mixed.to_string(), "[1, \"a\", [2]]");
    }
}
