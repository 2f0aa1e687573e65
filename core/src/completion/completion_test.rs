#[cfg(test)]
mod tests {
    use crate::analysis::AnalysisModel;
    use crate::completion::{
        CompletionContext, CompletionItem, CompletionKind, Receiver, classify, complete, open_import_list,
    };
    use crate::config::AnalyzerConfig;
    use crate::token::{Position, Tokenizer};

    fn complete_at(src: &str, line: u32, column: u32) -> Vec<CompletionItem> {
        complete_with(src, line, column, &AnalyzerConfig::default())
    }

    fn complete_with(src: &str, line: u32, column: u32, config: &AnalyzerConfig) -> Vec<CompletionItem> {
        let model = AnalysisModel::build(src, 1, config);
        complete(&model, line, column, config)
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    fn find<'a>(items: &'a [CompletionItem], label: &str) -> &'a CompletionItem {
        items
            .iter()
            .find(|i| i.label == label)
            .unwrap_or_else(|| panic!("{label} not offered in {:?}", labels(items)))
    }

    #[test]
    fn classify_contexts() {
        let expr = |p: &str| CompletionContext::Expression { prefix: p.to_string() };
        assert_eq!(classify("my_var"), expr("my_var"));
        assert_eq!(classify("x = foo(ba"), expr("ba"));
        assert_eq!(classify(""), expr(""));
        assert_eq!(
            classify("    self.na"),
            CompletionContext::Attribute {
                receiver: Receiver::Path(vec!["self".into()]),
                prefix: "na".into()
            }
        );
        assert_eq!(
            classify("os.path.jo"),
            CompletionContext::Attribute {
                receiver: Receiver::Path(vec!["os".into(), "path".into()]),
                prefix: "jo".into()
            }
        );
        assert_eq!(
            classify("'abc'."),
            CompletionContext::Attribute {
                receiver: Receiver::Str,
                prefix: String::new()
            }
        );
        assert_eq!(
            classify("foo().ba"),
            CompletionContext::Attribute {
                receiver: Receiver::Unsupported,
                prefix: "ba".into()
            }
        );
        assert_eq!(classify("import o"), CompletionContext::ImportModule { prefix: "o".into() });
        assert_eq!(classify("import sys, os.pa"), CompletionContext::ImportModule { prefix: "os.pa".into() });
        assert_eq!(classify("from col"), CompletionContext::ImportModule { prefix: "col".into() });
        assert_eq!(
            classify("from os.path import jo"),
            CompletionContext::ImportMember {
                module: "os.path".into(),
                prefix: "jo".into()
            }
        );
        assert_eq!(
            classify("from typing import (Any, Opt"),
            CompletionContext::ImportMember {
                module: "typing".into(),
                prefix: "Opt".into()
            }
        );
    }

    #[test]
    fn classify_silent_positions() {
        for text in [
            "x = 1  # comm",
            "s = 'unterminated te",
            "s = \"a\" + \"b",
            "def na",
            "class Fo",
            "with open(p) as f",
            "import os as o",
            "from os import path as p",
            "from os im",
            "x = 12",
            "y = 1.",
        ] {
            assert_eq!(classify(text), CompletionContext::Silent, "{text:?}");
        }
        // a closed string leaves code behind it
        assert_eq!(
            classify("s = 'a#b' + na"),
            CompletionContext::Expression { prefix: "na".into() }
        );
    }

    #[test]
    fn variable_completion_mirrors_binding_kind() {
        let items = complete_at("my_variable = 10\nmy_var", 2, 7);
        assert!(items.iter().all(|i| i.label.starts_with("my_var")));
        let item = find(&items, "my_variable");
        assert_eq!(item.kind, CompletionKind::Variable);
        assert_eq!(item.insert_text, "my_variable");
        assert_eq!(item.detail.as_deref(), Some("int"));
    }

    #[test]
    fn bindings_then_builtins_then_keywords() {
        let src = "def outer(param):\n    local = 1\n    return p\n";
        let items = complete_at(src, 3, 13);
        assert_eq!(items[0].label, "param");
        assert_eq!(items[0].kind, CompletionKind::Parameter);
        let pos = |label: &str| items.iter().position(|i| i.label == label).expect(label);
        assert!(pos("param") < pos("print"));
        assert!(pos("print") < pos("pass"));
        assert_eq!(find(&items, "pass").kind, CompletionKind::Keyword);
        assert_eq!(find(&items, "pass").detail, None);
        assert_eq!(find(&items, "print").kind, CompletionKind::Function);
    }

    #[test]
    fn inner_bindings_shadow_outer_ones() {
        let src = "x = 'outer'\ndef f():\n    x = 1\n    return x\n";
        let items = complete_at(src, 4, 13);
        let xs: Vec<&CompletionItem> = items.iter().filter(|i| i.label == "x").collect();
        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0].detail.as_deref(), Some("int"));
        assert!(!labels(&items).contains(&"f"));

        // empty prefix just before `x`
        let items = complete_at(src, 4, 12);
        assert_eq!(items.iter().filter(|i| i.label == "x").count(), 1);
        assert_eq!(find(&items, "x").detail.as_deref(), Some("int"));
        assert_eq!(find(&items, "f").detail.as_deref(), Some("() -> int"));
    }

    #[test]
    fn class_bodies_are_not_visible_from_methods() {
        let src = "class A:\n    attr = 1\n    def m(self):\n        return at\n";
        let items = complete_at(src, 4, 18);
        assert!(!labels(&items).contains(&"attr"));
    }

    #[test]
    fn instance_members() {
        let src = "\
class Point:
    def __init__(self, x: int):
        self.x = x

    def norm(self) -> int:
        return self.x

p = Point(1)
p.
";
        let items = complete_at(src, 9, 3);
        assert_eq!(labels(&items), ["norm", "x"]);
        assert_eq!(items[0].kind, CompletionKind::Method);
        assert_eq!(items[0].detail.as_deref(), Some("() -> int"));
        assert_eq!(items[1].kind, CompletionKind::Property);
        assert_eq!(items[1].detail.as_deref(), Some("int"));
    }

    #[test]
    fn builtin_type_members() {
        let items = complete_at("s = 'abc'\ns.st", 2, 5);
        assert_eq!(labels(&items), ["startswith", "strip"]);
        assert!(items.iter().all(|i| i.kind == CompletionKind::Method));

        let items = complete_at("'abc'.up", 1, 9);
        assert_eq!(labels(&items), ["upper"]);
    }

    #[test]
    fn unknown_receivers_offer_nothing() {
        assert!(complete_at("def f(a):\n    return a.\n", 2, 14).is_empty());
        assert!(complete_at("nothing.", 1, 9).is_empty());
        assert!(complete_at("f().x", 1, 6).is_empty());
    }

    #[test]
    fn module_attributes() {
        let items = complete_at("import os\nos.pa", 2, 6);
        let path = find(&items, "path");
        assert_eq!(path.kind, CompletionKind::Module);
        assert_eq!(path.detail.as_deref(), Some("module"));
    }

    #[test]
    fn import_completion() {
        let items = complete_at("import o", 1, 9);
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| i.label.starts_with('o') && i.kind == CompletionKind::Module));
        assert!(labels(&items).contains(&"os"));

        let items = complete_at("import os.p", 1, 12);
        assert_eq!(labels(&items), ["path"]);

        let items = complete_at("from os import ge", 1, 18);
        assert!(labels(&items).contains(&"getcwd"));

        let config = AnalyzerConfig {
            known_modules: vec!["requests".into()],
            ..AnalyzerConfig::default()
        };
        let items = complete_with("import req", 1, 11, &config);
        assert_eq!(labels(&items), ["requests"]);
    }

    #[test]
    fn multiline_import_lists() {
        let items = complete_at("from os import (\n    pa", 2, 7);
        assert_eq!(labels(&items), ["path"]);
        assert_eq!(items[0].kind, CompletionKind::Module);

        let items = complete_at("from os import (\n    getcwd,\n    pa\n)\n", 3, 7);
        assert_eq!(labels(&items), ["path"]);

        let items = complete_at("from os.path import (\n    jo", 2, 7);
        assert!(labels(&items).contains(&"join"));

        // other open brackets keep the expression context
        let items = complete_at("print(\n    pa", 2, 7);
        assert!(labels(&items).contains(&"pass"));
        assert!(!labels(&items).contains(&"path"));
    }

    #[test]
    fn open_import_list_finds_module() {
        let lexed = Tokenizer::tokenize("from collections.abc import (\n    Map");
        assert_eq!(
            open_import_list(&lexed, Position::new(2, 8, 37)),
            Some("collections.abc".to_string())
        );
        let lexed = Tokenizer::tokenize("from os import (path)\nx = (\n    pa");
        assert_eq!(open_import_list(&lexed, Position::new(3, 7, 34)), None);
    }

    #[test]
    fn comments_and_strings_are_silent() {
        assert!(complete_at("x = 1  # x", 1, 11).is_empty());
        assert!(complete_at("s = 'ab", 1, 8).is_empty());
        assert!(complete_at("doc = \"\"\"\nsome te\n\"\"\"\n", 2, 8).is_empty());
        assert!(complete_at("def fo", 1, 7).is_empty());
    }

    #[test]
    fn out_of_range_positions_are_empty() {
        let src = "value = 1\n";
        assert!(complete_at(src, 0, 1).is_empty());
        assert!(complete_at(src, 1, 0).is_empty());
        assert!(complete_at(src, 5, 1).is_empty());
        assert!(complete_at(src, 1, 100).is_empty());
    }

    #[test]
    fn empty_buffer_does_not_fail() {
        let items = complete_at("", 1, 1);
        assert!(items.iter().all(|i| !i.label.is_empty() && !i.insert_text.is_empty()));
    }

    #[test]
    fn config_limits_and_sources() {
        let config = AnalyzerConfig {
            include_keywords: false,
            include_builtins: false,
            ..AnalyzerConfig::default()
        };
        let items = complete_with("alpha = 1\nbeta = 2\n", 3, 1, &config);
        assert_eq!(labels(&items), ["alpha", "beta"]);

        let config = AnalyzerConfig {
            max_completions: Some(3),
            ..AnalyzerConfig::default()
        };
        assert_eq!(complete_with("alpha = 1\n", 2, 1, &config).len(), 3);
    }

    #[test]
    fn items_serialize_with_optional_detail() {
        let items = complete_at("count = 1\ncou", 2, 4);
        let json = serde_json::to_value(&items).unwrap();
        let first = &json[0];
        assert_eq!(first["label"], "count");
        assert_eq!(first["kind"], "Variable");
        assert_eq!(first["insert_text"], "count");
        assert_eq!(first["detail"], "int");

        let keyword = CompletionItem::new("pass", CompletionKind::Keyword, None);
        let json = serde_json::to_value(&keyword).unwrap();
        assert_eq!(json, serde_json::json!({"label": "pass", "kind": "Keyword", "insert_text": "pass"}));
    }
}
