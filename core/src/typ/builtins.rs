//! Signatures and member tables for Python builtins.
//!
//! Builtin parameters are left unannotated so only arity and keyword names are
//! checked against them; their return types drive inference.

use crate::{
    expr::ParamKind,
    typ::{ClassType, FunctionFlavor, FunctionType, ParamType, Type},
    util::fast_map::{FastHashMap, fast_hash_map_with_capacity},
};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Function,
    Class,
    Constant,
}

#[derive(Debug, Clone)]
pub struct BuiltinEntry {
    pub ty: Type,
    pub kind: BuiltinKind,
}

struct Sig {
    name: String,
    params: Vec<ParamType>,
}

fn sig(name: &str) -> Sig {
    Sig {
        name: name.to_string(),
        params: Vec::new(),
    }
}

impl Sig {
    fn param(mut self, name: &str, kind: ParamKind, has_default: bool) -> Self {
        self.params.push(ParamType {
            name: name.to_string(),
            ty: Type::Unknown,
            kind,
            has_default,
            annotated: false,
        });
        self
    }

    /// Positional-only parameter
    fn arg(self, name: &str) -> Self {
        self.param(name, ParamKind::PositionalOnly, false)
    }

    fn opt(self, name: &str) -> Self {
        self.param(name, ParamKind::PositionalOnly, true)
    }

    fn kw(self, name: &str) -> Self {
        self.param(name, ParamKind::KeywordOnly, true)
    }

    fn star(self) -> Self {
        self.param("args", ParamKind::VarArgs, false)
    }

    fn kwargs(self) -> Self {
        self.param("kwargs", ParamKind::KwArgs, false)
    }

    fn returns(self, returns: Type) -> Type {
        Type::function(FunctionType {
            name: self.name,
            params: self.params,
            returns,
            flavor: FunctionFlavor::Function,
        })
    }
}

/// Accepts anything; used where the real signature is overloaded.
fn variadic(name: &str, returns: Type) -> Type {
    sig(name).star().kwargs().returns(returns)
}

const EXCEPTIONS: &[&str] = &[
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "BaseException",
    "BaseExceptionGroup",
    "BlockingIOError",
    "BrokenPipeError",
    "BufferError",
    "BytesWarning",
    "ChildProcessError",
    "ConnectionAbortedError",
    "ConnectionError",
    "ConnectionRefusedError",
    "ConnectionResetError",
    "DeprecationWarning",
    "EOFError",
    "EncodingWarning",
    "EnvironmentError",
    "Exception",
    "ExceptionGroup",
    "FileExistsError",
    "FileNotFoundError",
    "FloatingPointError",
    "FutureWarning",
    "GeneratorExit",
    "IOError",
    "ImportError",
    "ImportWarning",
    "IndentationError",
    "IndexError",
    "InterruptedError",
    "IsADirectoryError",
    "KeyError",
    "KeyboardInterrupt",
    "LookupError",
    "MemoryError",
    "ModuleNotFoundError",
    "NameError",
    "NotADirectoryError",
    "NotImplementedError",
    "OSError",
    "OverflowError",
    "PendingDeprecationWarning",
    "PermissionError",
    "ProcessLookupError",
    "RecursionError",
    "ReferenceError",
    "ResourceWarning",
    "RuntimeError",
    "RuntimeWarning",
    "StopAsyncIteration",
    "StopIteration",
    "SyntaxError",
    "SyntaxWarning",
    "SystemError",
    "SystemExit",
    "TabError",
    "TimeoutError",
    "TypeError",
    "UnboundLocalError",
    "UnicodeDecodeError",
    "UnicodeEncodeError",
    "UnicodeError",
    "UnicodeTranslateError",
    "UnicodeWarning",
    "UserWarning",
    "ValueError",
    "Warning",
    "ZeroDivisionError",
];

static BUILTINS: Lazy<FastHashMap<&'static str, BuiltinEntry>> = Lazy::new(|| {
    use BuiltinKind::*;
    let mut map = fast_hash_map_with_capacity(160);
    let mut add = |name: &'static str, kind: BuiltinKind, ty: Type| {
        map.insert(name, BuiltinEntry { ty, kind });
    };

    add("abs", Function, sig("abs").arg("x").returns(Type::Unknown));
    add("all", Function, sig("all").arg("iterable").returns(Type::Bool));
    add("any", Function, sig("any").arg("iterable").returns(Type::Bool));
    add("ascii", Function, sig("ascii").arg("obj").returns(Type::Str));
    add("bin", Function, sig("bin").arg("number").returns(Type::Str));
    add("breakpoint", Function, variadic("breakpoint", Type::None));
    add("callable", Function, sig("callable").arg("obj").returns(Type::Bool));
    add("chr", Function, sig("chr").arg("i").returns(Type::Str));
    add("compile", Function, variadic("compile", Type::Unknown));
    add("delattr", Function, sig("delattr").arg("obj").arg("name").returns(Type::None));
    add("dir", Function, sig("dir").opt("obj").returns(Type::list(Type::Str)));
    add("divmod", Function, sig("divmod").arg("x").arg("y").returns(Type::Unknown));
    add("enumerate", Function, sig("enumerate").arg("iterable").opt("start").returns(Type::Unknown));
    add("eval", Function, variadic("eval", Type::Any));
    add("exec", Function, variadic("exec", Type::None));
    add("filter", Function, sig("filter").arg("function").arg("iterable").returns(Type::Unknown));
    add("format", Function, sig("format").arg("value").opt("format_spec").returns(Type::Str));
    add("getattr", Function, variadic("getattr", Type::Any));
    add("globals", Function, sig("globals").returns(Type::dict(Type::Str, Type::Any)));
    add("hasattr", Function, sig("hasattr").arg("obj").arg("name").returns(Type::Bool));
    add("hash", Function, sig("hash").arg("obj").returns(Type::Int));
    add("help", Function, variadic("help", Type::None));
    add("hex", Function, sig("hex").arg("number").returns(Type::Str));
    add("id", Function, sig("id").arg("obj").returns(Type::Int));
    add("input", Function, sig("input").opt("prompt").returns(Type::Str));
    add("isinstance", Function, sig("isinstance").arg("obj").arg("class_or_tuple").returns(Type::Bool));
    add("issubclass", Function, sig("issubclass").arg("cls").arg("class_or_tuple").returns(Type::Bool));
    add("iter", Function, variadic("iter", Type::Unknown));
    add("len", Function, sig("len").arg("obj").returns(Type::Int));
    add("locals", Function, sig("locals").returns(Type::dict(Type::Str, Type::Any)));
    add("map", Function, sig("map").arg("function").star().returns(Type::Unknown));
    add("max", Function, variadic("max", Type::Unknown));
    add("min", Function, variadic("min", Type::Unknown));
    add("next", Function, variadic("next", Type::Unknown));
    add("oct", Function, sig("oct").arg("number").returns(Type::Str));
    add("open", Function, variadic("open", Type::Unknown));
    add("ord", Function, sig("ord").arg("c").returns(Type::Int));
    add("pow", Function, variadic("pow", Type::Unknown));
    add(
        "print",
        Function,
        sig("print").star().kw("sep").kw("end").kw("file").kw("flush").returns(Type::None),
    );
    add("repr", Function, sig("repr").arg("obj").returns(Type::Str));
    add("reversed", Function, sig("reversed").arg("sequence").returns(Type::Unknown));
    add("round", Function, sig("round").arg("number").opt("ndigits").returns(Type::Unknown));
    add("setattr", Function, sig("setattr").arg("obj").arg("name").arg("value").returns(Type::None));
    add(
        "sorted",
        Function,
        sig("sorted").arg("iterable").kw("key").kw("reverse").returns(Type::list(Type::Unknown)),
    );
    add("sum", Function, sig("sum").arg("iterable").opt("start").returns(Type::Unknown));
    add("vars", Function, sig("vars").opt("obj").returns(Type::dict(Type::Str, Type::Any)));
    add("zip", Function, sig("zip").star().kw("strict").returns(Type::Unknown));
    add("__import__", Function, variadic("__import__", Type::Unknown));
    add("aiter", Function, sig("aiter").arg("iterable").returns(Type::Unknown));
    add("anext", Function, variadic("anext", Type::Unknown));
    add("exit", Function, sig("exit").opt("code").returns(Type::None));
    add("quit", Function, sig("quit").opt("code").returns(Type::None));

    add("bool", Class, Type::class_of(Type::Bool));
    add("int", Class, Type::class_of(Type::Int));
    add("float", Class, Type::class_of(Type::Float));
    add("complex", Class, Type::class_of(Type::Complex));
    add("str", Class, Type::class_of(Type::Str));
    add("bytes", Class, Type::class_of(Type::Bytes));
    add("list", Class, Type::class_of(Type::list(Type::Unknown)));
    add("dict", Class, Type::class_of(Type::dict(Type::Unknown, Type::Unknown)));
    add("set", Class, Type::class_of(Type::set(Type::Unknown)));
    add("tuple", Class, Type::class_of(Type::VarTuple(Box::new(Type::Unknown))));
    add("object", Class, Type::class_of(Type::Object));
    add("range", Class, Type::class_of(Type::Instance(ClassType::builtin("range"))));
    for name in [
        "bytearray",
        "classmethod",
        "frozenset",
        "memoryview",
        "property",
        "slice",
        "staticmethod",
        "super",
        "type",
    ] {
        add(name, Class, Type::Unknown);
    }
    for &name in EXCEPTIONS {
        add(name, Class, Type::class_of(Type::Instance(ClassType::builtin(name))));
    }

    add("__name__", Constant, Type::Str);
    add("__file__", Constant, Type::Str);
    add("__doc__", Constant, Type::optional(Type::Str));
    add("__builtins__", Constant, Type::Unknown);
    add("Ellipsis", Constant, Type::Unknown);
    add("NotImplemented", Constant, Type::Unknown);
    map
});

pub fn builtin(name: &str) -> Option<&'static BuiltinEntry> {
    BUILTINS.get(name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(name)
}

/// All builtin names in alphabetical order.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTINS.keys().copied().collect();
    names.sort_unstable();
    names
}

const STR_MEMBERS: &[&str] = &[
    "capitalize", "casefold", "center", "count", "encode", "endswith", "expandtabs", "find", "format",
    "format_map", "index", "isalnum", "isalpha", "isascii", "isdecimal", "isdigit", "isidentifier",
    "islower", "isnumeric", "isprintable", "isspace", "istitle", "isupper", "join", "ljust", "lower",
    "lstrip", "maketrans", "partition", "removeprefix", "removesuffix", "replace", "rfind", "rindex",
    "rjust", "rpartition", "rsplit", "rstrip", "split", "splitlines", "startswith", "strip",
    "swapcase", "title", "translate", "upper", "zfill",
];

const BYTES_MEMBERS: &[&str] = &[
    "count", "decode", "endswith", "find", "fromhex", "hex", "index", "isalnum", "isalpha", "isdigit",
    "islower", "isspace", "isupper", "join", "lower", "lstrip", "replace", "rfind", "rsplit", "rstrip",
    "split", "startswith", "strip", "upper",
];

const INT_MEMBERS: &[&str] = &[
    "as_integer_ratio", "bit_count", "bit_length", "conjugate", "denominator", "from_bytes", "imag",
    "numerator", "real", "to_bytes",
];

const FLOAT_MEMBERS: &[&str] = &["as_integer_ratio", "conjugate", "fromhex", "hex", "imag", "is_integer", "real"];

const COMPLEX_MEMBERS: &[&str] = &["conjugate", "imag", "real"];

const LIST_MEMBERS: &[&str] = &[
    "append", "clear", "copy", "count", "extend", "index", "insert", "pop", "remove", "reverse", "sort",
];

const DICT_MEMBERS: &[&str] = &[
    "clear", "copy", "fromkeys", "get", "items", "keys", "pop", "popitem", "setdefault", "update", "values",
];

const SET_MEMBERS: &[&str] = &[
    "add", "clear", "copy", "difference", "difference_update", "discard", "intersection",
    "intersection_update", "isdisjoint", "issubset", "issuperset", "pop", "remove",
    "symmetric_difference", "symmetric_difference_update", "union", "update",
];

const TUPLE_MEMBERS: &[&str] = &["count", "index"];

/// Public member names of a builtin value type, sorted.
pub fn member_names(receiver: &Type) -> &'static [&'static str] {
    match receiver {
        Type::Str => STR_MEMBERS,
        Type::Bytes => BYTES_MEMBERS,
        Type::Int | Type::Bool => INT_MEMBERS,
        Type::Float => FLOAT_MEMBERS,
        Type::Complex => COMPLEX_MEMBERS,
        Type::List(_) => LIST_MEMBERS,
        Type::Dict(..) => DICT_MEMBERS,
        Type::Set(_) => SET_MEMBERS,
        Type::Tuple(_) | Type::VarTuple(_) => TUPLE_MEMBERS,
        _ => &[],
    }
}

/// Element type produced by iterating over a builtin value.
pub fn iter_element(ty: &Type) -> Type {
    match ty {
        Type::List(t) | Type::Set(t) | Type::VarTuple(t) => (**t).clone(),
        Type::Dict(k, _) => (**k).clone(),
        Type::Tuple(items) => Type::join_all(items.iter().cloned()).unwrap_or(Type::Unknown),
        Type::Str => Type::Str,
        Type::Bytes => Type::Int,
        Type::Instance(c) if c.scope.is_none() && c.name == "range" => Type::Int,
        _ => Type::Unknown,
    }
}

/// Type of `receiver.name` for builtin value types. `None` means the member does not exist.
pub fn builtin_member(receiver: &Type, name: &str) -> Option<Type> {
    if name.starts_with("__") && name.ends_with("__") {
        return Some(Type::Unknown);
    }
    if !member_names(receiver).contains(&name) {
        return None;
    }
    let data = |ty: Type| Some(ty);
    let method = |returns: Type| Some(variadic(name, returns));
    match (receiver, name) {
        (Type::Int | Type::Bool, "real" | "imag" | "numerator" | "denominator") => data(Type::Int),
        (Type::Float | Type::Complex, "real" | "imag") => data(Type::Float),
        (Type::Str, _) => method(str_method(name)),
        (Type::Bytes, _) => method(bytes_method(name)),
        (Type::Int | Type::Bool, "to_bytes") => method(Type::Bytes),
        (Type::Int | Type::Bool, "as_integer_ratio") | (Type::Float, "as_integer_ratio") => {
            method(Type::Tuple(vec![Type::Int, Type::Int]))
        }
        (Type::Int | Type::Bool, _) => method(Type::Int),
        (Type::Float, "is_integer") => method(Type::Bool),
        (Type::Float, "hex") => method(Type::Str),
        (Type::Float, _) => method(Type::Float),
        (Type::Complex, _) => method(Type::Complex),
        (Type::List(elem), _) => method(match name {
            "pop" => (**elem).clone(),
            "index" | "count" => Type::Int,
            "copy" => receiver.clone(),
            _ => Type::None,
        }),
        (Type::Dict(k, v), _) => method(match name {
            "get" => Type::optional((**v).clone()),
            "pop" | "setdefault" => (**v).clone(),
            "keys" => Type::list((**k).clone()),
            "values" => Type::list((**v).clone()),
            "items" => Type::list(Type::Tuple(vec![(**k).clone(), (**v).clone()])),
            "popitem" => Type::Tuple(vec![(**k).clone(), (**v).clone()]),
            "copy" => receiver.clone(),
            "fromkeys" => Type::dict(Type::Unknown, Type::Unknown),
            _ => Type::None,
        }),
        (Type::Set(elem), _) => method(match name {
            "pop" => (**elem).clone(),
            "copy" | "union" | "intersection" | "difference" | "symmetric_difference" => receiver.clone(),
            "isdisjoint" | "issubset" | "issuperset" => Type::Bool,
            _ => Type::None,
        }),
        (Type::Tuple(_) | Type::VarTuple(_), _) => method(Type::Int),
        _ => None,
    }
}

fn str_method(name: &str) -> Type {
    match name {
        "split" | "rsplit" | "splitlines" => Type::list(Type::Str),
        "partition" | "rpartition" => Type::Tuple(vec![Type::Str, Type::Str, Type::Str]),
        "encode" => Type::Bytes,
        "find" | "rfind" | "index" | "rindex" | "count" => Type::Int,
        "maketrans" => Type::dict(Type::Int, Type::Unknown),
        n if n.starts_with("is") || n == "startswith" || n == "endswith" => Type::Bool,
        _ => Type::Str,
    }
}

fn bytes_method(name: &str) -> Type {
    match name {
        "decode" | "hex" => Type::Str,
        "split" | "rsplit" => Type::list(Type::Bytes),
        "find" | "rfind" | "index" | "count" => Type::Int,
        n if n.starts_with("is") || n == "startswith" || n == "endswith" => Type::Bool,
        _ => Type::Bytes,
    }
}
