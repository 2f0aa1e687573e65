//! Table of importable standard library modules.
//!
//! Only the shape matters here: which modules exist and which names they
//! export. Member types are not tracked, so attribute access on a module is
//! always `Unknown` and never reported.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

static STDLIB: &[(&str, &[&str])] = &[
    ("abc", &["ABC", "ABCMeta", "abstractmethod"]),
    ("argparse", &["Action", "ArgumentParser", "Namespace", "FileType"]),
    ("array", &["array"]),
    ("ast", &["AST", "NodeVisitor", "NodeTransformer", "literal_eval", "parse", "dump", "walk"]),
    ("asyncio", &["Event", "Future", "Lock", "Queue", "Task", "create_task", "gather", "get_event_loop", "run", "sleep", "wait", "wait_for"]),
    ("base64", &["b64decode", "b64encode", "urlsafe_b64decode", "urlsafe_b64encode"]),
    ("bisect", &["bisect", "bisect_left", "bisect_right", "insort"]),
    ("collections", &["ChainMap", "Counter", "OrderedDict", "UserDict", "UserList", "defaultdict", "deque", "namedtuple", "abc"]),
    ("collections.abc", &["Callable", "Iterable", "Iterator", "Mapping", "MutableMapping", "Sequence", "Set"]),
    ("contextlib", &["contextmanager", "asynccontextmanager", "closing", "suppress", "ExitStack", "nullcontext"]),
    ("copy", &["copy", "deepcopy"]),
    ("csv", &["DictReader", "DictWriter", "reader", "writer"]),
    ("dataclasses", &["asdict", "astuple", "dataclass", "field", "fields", "replace"]),
    ("datetime", &["date", "datetime", "time", "timedelta", "timezone"]),
    ("decimal", &["Decimal", "getcontext"]),
    ("enum", &["Enum", "Flag", "IntEnum", "IntFlag", "auto", "unique"]),
    ("fractions", &["Fraction"]),
    ("functools", &["cache", "cached_property", "lru_cache", "partial", "reduce", "singledispatch", "total_ordering", "wraps"]),
    ("glob", &["glob", "iglob"]),
    ("hashlib", &["md5", "sha1", "sha256", "sha512", "new"]),
    ("heapq", &["heapify", "heappop", "heappush", "heapreplace", "nlargest", "nsmallest"]),
    ("http", &["HTTPStatus", "client", "server"]),
    ("http.client", &["HTTPConnection", "HTTPSConnection", "HTTPResponse"]),
    ("http.server", &["BaseHTTPRequestHandler", "HTTPServer", "SimpleHTTPRequestHandler"]),
    ("importlib", &["import_module", "reload", "util"]),
    ("inspect", &["getmembers", "getsource", "isclass", "isfunction", "signature"]),
    ("io", &["BytesIO", "StringIO", "TextIOWrapper", "open"]),
    ("itertools", &["accumulate", "chain", "combinations", "count", "cycle", "groupby", "islice", "permutations", "product", "repeat", "starmap", "tee", "zip_longest"]),
    ("json", &["JSONDecodeError", "JSONDecoder", "JSONEncoder", "dump", "dumps", "load", "loads"]),
    ("logging", &["DEBUG", "ERROR", "INFO", "WARNING", "Formatter", "Handler", "Logger", "StreamHandler", "basicConfig", "getLogger"]),
    ("math", &["ceil", "cos", "e", "exp", "fabs", "floor", "gcd", "inf", "isclose", "isnan", "log", "log10", "log2", "nan", "pi", "pow", "sin", "sqrt", "tan", "tau"]),
    ("multiprocessing", &["Pool", "Process", "Queue", "cpu_count"]),
    ("operator", &["add", "attrgetter", "itemgetter", "methodcaller", "mul", "sub"]),
    ("os", &["environ", "getcwd", "getenv", "listdir", "makedirs", "mkdir", "path", "remove", "rename", "sep", "walk"]),
    ("os.path", &["abspath", "basename", "dirname", "exists", "expanduser", "isdir", "isfile", "join", "splitext"]),
    ("pathlib", &["Path", "PurePath", "PosixPath", "WindowsPath"]),
    ("pickle", &["dump", "dumps", "load", "loads"]),
    ("pprint", &["pformat", "pprint"]),
    ("queue", &["Empty", "Full", "LifoQueue", "PriorityQueue", "Queue"]),
    ("random", &["choice", "choices", "randint", "random", "randrange", "sample", "seed", "shuffle", "uniform"]),
    ("re", &["IGNORECASE", "MULTILINE", "Match", "Pattern", "compile", "findall", "finditer", "fullmatch", "match", "search", "split", "sub"]),
    ("shutil", &["copy", "copyfile", "copytree", "move", "rmtree", "which"]),
    ("signal", &["SIGINT", "SIGTERM", "signal"]),
    ("socket", &["AF_INET", "SOCK_STREAM", "socket", "gethostname"]),
    ("sqlite3", &["Connection", "Cursor", "connect"]),
    ("statistics", &["mean", "median", "mode", "stdev", "variance"]),
    ("string", &["Template", "ascii_letters", "ascii_lowercase", "ascii_uppercase", "digits", "punctuation"]),
    ("struct", &["calcsize", "pack", "unpack"]),
    ("subprocess", &["CalledProcessError", "PIPE", "Popen", "call", "check_call", "check_output", "run"]),
    ("sys", &["argv", "exit", "executable", "modules", "path", "platform", "stderr", "stdin", "stdout", "version", "version_info"]),
    ("tempfile", &["NamedTemporaryFile", "TemporaryDirectory", "gettempdir", "mkdtemp", "mkstemp"]),
    ("textwrap", &["dedent", "fill", "indent", "wrap"]),
    ("threading", &["Condition", "Event", "Lock", "RLock", "Semaphore", "Thread", "Timer", "current_thread"]),
    ("time", &["monotonic", "perf_counter", "sleep", "strftime", "time"]),
    ("traceback", &["format_exc", "print_exc", "print_stack"]),
    ("typing", &["Any", "Callable", "ClassVar", "Dict", "Final", "FrozenSet", "Generic", "Iterable", "Iterator", "List", "Literal", "Mapping", "NamedTuple", "Optional", "Protocol", "Sequence", "Set", "Tuple", "Type", "TypeVar", "TypedDict", "Union", "cast", "overload"]),
    ("unittest", &["TestCase", "main", "mock"]),
    ("unittest.mock", &["MagicMock", "Mock", "patch"]),
    ("urllib", &["parse", "request"]),
    ("urllib.parse", &["quote", "unquote", "urlencode", "urljoin", "urlparse"]),
    ("urllib.request", &["Request", "urlopen"]),
    ("uuid", &["UUID", "uuid1", "uuid4"]),
    ("warnings", &["catch_warnings", "filterwarnings", "warn"]),
    ("weakref", &["WeakKeyDictionary", "WeakValueDictionary", "ref"]),
    ("xml", &["etree"]),
    ("xml.etree", &["ElementTree"]),
    ("zipfile", &["ZipFile"]),
];

static MODULES: Lazy<BTreeMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| STDLIB.iter().copied().collect());

/// Module names known to exist, in sorted order.
pub fn module_names() -> impl Iterator<Item = &'static str> {
    MODULES.keys().copied()
}

pub fn is_known_module(name: &str) -> bool {
    MODULES.contains_key(name)
}

/// Names exported by `module`, or `None` when the module is not in the table.
pub fn module_members(module: &str) -> Option<&'static [&'static str]> {
    MODULES.get(module).copied()
}

/// `module.member` names a submodule (`os.path`, `collections.abc`).
pub fn is_submodule(module: &str, member: &str) -> bool {
    MODULES.contains_key(format!("{module}.{member}").as_str())
}
