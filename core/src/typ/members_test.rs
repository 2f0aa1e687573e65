#[cfg(test)]
mod tests {
    use crate::resolve::{ScopeBuilder, ScopeTree};
    use crate::stmt::parse_source;
    use crate::typ::members::{member_names, member_type};
    use crate::typ::*;

    fn analyze(src: &str) -> ScopeTree {
        let (program, errors) = parse_source(src);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let mut scopes = ScopeBuilder::build(&program);
        check(&program, &mut scopes, TypeCheckerOptions::default());
        scopes
    }

    fn global_type(scopes: &ScopeTree, name: &str) -> Type {
        scopes
            .lookup(scopes.root(), name)
            .and_then(|b| b.ty.clone())
            .unwrap_or(Type::Unknown)
    }

    const SHAPES: &str = "\
class Shape:
    sides = 0

    def __init__(self, name):
        self.name = name

    def area(self) -> float:
        return 0.0

    @property
    def label(self) -> str:
        return self.name

class Square(Shape):
    def __init__(self, size: int):
        self.size = size

sq = Square(2)
";

    #[test]
    fn instance_members_include_inherited() {
        let scopes = analyze(SHAPES);
        let sq = global_type(&scopes, "sq");
        assert_eq!(sq.to_string(), "Square");

        let names: Vec<String> = member_names(&scopes, &sq).into_iter().map(|m| m.name).collect();
        assert_eq!(names, ["area", "label", "name", "sides", "size"]);
    }

    #[test]
    fn member_kinds_and_types() {
        let scopes = analyze(SHAPES);
        let sq = global_type(&scopes, "sq");
        let members = member_names(&scopes, &sq);
        let find = |name: &str| members.iter().find(|m| m.name == name).expect("member present");

        assert_eq!(find("area").kind, MemberKind::Method);
        assert_eq!(find("area").ty.as_ref().map(|t| t.to_string()), Some("() -> float".to_string()));
        assert_eq!(find("label").kind, MemberKind::Property);
        assert_eq!(find("size").kind, MemberKind::Property);
        assert_eq!(find("size").ty, Some(Type::Int));
        assert_eq!(find("sides").kind, MemberKind::Variable);
    }

    #[test]
    fn lookup_outcomes() {
        let scopes = analyze(SHAPES);
        let sq = global_type(&scopes, "sq");
        assert_eq!(member_type(&scopes, &sq, "label"), MemberLookup::Found(Type::Str));
        assert_eq!(member_type(&scopes, &sq, "missing"), MemberLookup::Missing);
        assert_eq!(member_type(&scopes, &sq, "__weird__"), MemberLookup::Unknown);
        assert_eq!(member_type(&scopes, &Type::Unknown, "anything"), MemberLookup::Unknown);
        assert_eq!(member_type(&scopes, &Type::Str, "upper").into_type().to_string(), "(*args, **kwargs) -> str");
        assert_eq!(member_type(&scopes, &Type::Int, "nope"), MemberLookup::Missing);
    }

    #[test]
    fn dynamic_classes_never_miss() {
        let scopes = analyze(
            "\
class Proxy:
    def __getattr__(self, name):
        return 1

p = Proxy()
",
        );
        let p = global_type(&scopes, "p");
        assert_eq!(member_type(&scopes, &p, "whatever"), MemberLookup::Unknown);
    }

    #[test]
    fn module_members() {
        let scopes = analyze("import os\n");
        let os = global_type(&scopes, "os");
        assert_eq!(os, Type::Module("os".to_string()));
        assert_eq!(
            member_type(&scopes, &os, "path"),
            MemberLookup::Found(Type::Module("os.path".to_string()))
        );
        let members = member_names(&scopes, &os);
        let path = members.iter().find(|m| m.name == "path").expect("path listed");
        assert_eq!(path.kind, MemberKind::Module);
        assert!(members.iter().any(|m| m.name == "getcwd" && m.kind == MemberKind::Variable));
    }

    #[test]
    fn builtin_value_members() {
        let scopes = ScopeTree::default();
        let members = member_names(&scopes, &Type::list(Type::Int));
        let pop = members.iter().find(|m| m.name == "pop").expect("pop listed");
        assert_eq!(pop.kind, MemberKind::Method);
        let real = member_names(&scopes, &Type::Int)
            .into_iter()
            .find(|m| m.name == "real")
            .expect("real listed");
        assert_eq!(real.kind, MemberKind::Property);
        assert!(member_names(&scopes, &Type::None).is_empty());
    }
}
