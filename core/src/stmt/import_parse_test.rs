#[cfg(test)]
mod tests {
    use crate::stmt::{ImportStmt, ImportTarget, StmtKind, collect_program_imports, parse_source};

    fn first_import(src: &str) -> ImportStmt {
        let (program, errs) = parse_source(src);
        assert!(errs.is_empty(), "{:?}", errs);
        match &program.statements[0].kind {
            StmtKind::Import(import) => import.clone(),
            other => panic!("expected import, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_imports_bind_top_level_package() {
        let import = first_import("import os.path, json as j\n");
        let bound = import.bound_names();
        assert_eq!(bound.len(), 2);
        assert_eq!(bound[0].local, "os");
        assert_eq!(bound[0].target, ImportTarget::Module("os".to_string()));
        assert_eq!(bound[1].local, "j");
        assert_eq!(bound[1].target, ImportTarget::Module("json".to_string()));
    }

    #[test]
    fn test_from_import_members() {
        let import = first_import("from collections import (OrderedDict as OD, defaultdict,)\n");
        let bound = import.bound_names();
        assert_eq!(bound[0].local, "OD");
        assert_eq!(
            bound[0].target,
            ImportTarget::Member {
                module: "collections".to_string(),
                member: "OrderedDict".to_string()
            }
        );
        assert_eq!(bound[1].local, "defaultdict");
    }

    #[test]
    fn test_relative_and_wildcard() {
        let import = first_import("from ..pkg import *\n");
        assert!(import.is_wildcard());
        assert_eq!(import.from_module_path().as_deref(), Some("..pkg"));
        assert!(import.bound_names().is_empty());

        let import = first_import("from . import sibling\n");
        assert_eq!(import.from_module_path().as_deref(), Some("."));
    }

    #[test]
    fn test_incomplete_import_is_an_error() {
        let (_, errs) = parse_source("import \n");
        assert_eq!(errs.len(), 1);
        let (_, errs) = parse_source("from os import\n");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_collect_program_imports() {
        let (program, _) = parse_source("import sys\ndef f():\n    from os import path\n    import sys\n");
        assert_eq!(collect_program_imports(&program), vec!["os".to_string(), "sys".to_string()]);
    }
}
