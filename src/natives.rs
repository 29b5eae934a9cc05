//! Native function groups shipped with the interpreter.
//!
//! Every constructor returns an unused group; scripts make it visible with
//! `use "<name>"`.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::error::RunResult;
use crate::function::{FuncArgs, FuncGroup, FuncObj};
use crate::value::{ListObj, StringObj, Value};

/// Longest line `input()` returns, in bytes.
pub const INPUT_LIMIT: usize = 32;

/// `print`, `println` and `input`.
pub fn io_group(buckets: usize) -> RunResult<FuncGroup<'static>> {
    FuncGroup::with_functions(
        "io",
        buckets,
        [
            FuncObj::native("print", 1, io_print),
            FuncObj::native("println", 1, io_println),
            FuncObj::native("input", 0, io_input),
        ],
    )
}

/// `length` and `at`.
pub fn lists_group(buckets: usize) -> RunResult<FuncGroup<'static>> {
    FuncGroup::with_functions(
        "lists",
        buckets,
        [
            FuncObj::native("length", 1, list_length),
            FuncObj::native("at", 2, list_at),
        ],
    )
}

/// `concat` and `char_at`.
pub fn strings_group(buckets: usize) -> RunResult<FuncGroup<'static>> {
    FuncGroup::with_functions(
        "strings",
        buckets,
        [
            FuncObj::native("concat", 2, string_concat),
            FuncObj::native("char_at", 2, string_char_at),
        ],
    )
}

/// All shipped groups.
pub fn standard_groups(buckets: usize) -> RunResult<Vec<FuncGroup<'static>>> {
    Ok(vec![
        io_group(buckets)?,
        lists_group(buckets)?,
        strings_group(buckets)?,
    ])
}

// ───────────────────────────── io ─────────────────────────────

fn io_print(args: &FuncArgs) -> Option<Value> {
    let value = args.get(0)?;
    let mut out = io::stdout().lock();

    if let Err(e) = write!(out, "{}", value).and_then(|_| out.flush()) {
        debug!("print failed: {}", e);
    }

    None
}

fn io_println(args: &FuncArgs) -> Option<Value> {
    let value = args.get(0)?;

    if let Err(e) = writeln!(io::stdout().lock(), "{}", value) {
        debug!("println failed: {}", e);
    }

    None
}

fn io_input(_args: &FuncArgs) -> Option<Value> {
    let mut line = String::new();

    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(Value::str(false, StringObj::new(clip_line(&line)))),
        Err(e) => {
            debug!("input failed: {}", e);
            None
        }
    }
}

/// Strip the line terminator and cut to [`INPUT_LIMIT`] bytes on a char
/// boundary.
pub fn clip_line(line: &str) -> &str {
    let line = line.trim_end_matches(['\n', '\r']);

    if line.len() <= INPUT_LIMIT {
        return line;
    }

    let mut end = INPUT_LIMIT;

    while !line.is_char_boundary(end) {
        end -= 1;
    }

    &line[..end]
}

// ───────────────────────────── lists ──────────────────────────

fn list_length(args: &FuncArgs) -> Option<Value> {
    let list: &ListObj = args.get(0)?.as_list()?;
    let count = i64::try_from(list.count()).ok()?;

    Some(Value::int(false, count))
}

fn list_at(args: &FuncArgs) -> Option<Value> {
    let list = args.get(0)?.as_list()?;
    let index = usize::try_from(args.get(1)?.as_int()?).ok()?;

    let mut item = list.get(index)?.clone();
    item.set_const(false);

    Some(item)
}

// ───────────────────────────── strings ────────────────────────

fn string_concat(args: &FuncArgs) -> Option<Value> {
    let mut joined: StringObj = args.get(0)?.as_str()?.clone();

    joined.append(args.get(1)?.as_str()?);

    Some(Value::str(false, joined))
}

fn string_char_at(args: &FuncArgs) -> Option<Value> {
    let s = args.get(0)?.as_str()?;
    let index = usize::try_from(args.get(1)?.as_int()?).ok()?;

    s.char_at(index).map(|c| Value::str(false, c))
}
