#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::compiler::{
        ast::ConstantValue,
        error::CompilerDisplay,
        import::{load_document, normalize, ImportError, MemoryLoader},
        parser::Parser,
        source::SourceMap,
    };

    fn doc_with(constants: &str, includes: &[&str]) -> String {
        let mut text = String::new();
        if !includes.is_empty() {
            text.push_str("[includes]\n");
            for i in includes {
                text.push_str(i);
                text.push('\n');
            }
        }
        text.push_str("[constants]\n");
        text.push_str(constants);
        text.push_str("[clocks]\n[functions]\n[mains]\n");
        text
    }

    fn constants(loader: &MemoryLoader, root: &str) -> Vec<(String, u64)> {
        let mut sm = SourceMap::new();
        let doc = load_document(Path::new(root), loader, &Parser::new(), &mut sm).unwrap();
        doc.constants
            .iter()
            .map(|c| match c.value {
                ConstantValue::Integer(i) => (c.name.clone(), i),
                ConstantValue::Duration(d) => (c.name.clone(), d.magnitude),
            })
            .collect()
    }

    #[test]
    fn includer_and_last_include_win() {
        let mut loader = MemoryLoader::new();
        loader
            .add("main.seq", &doc_with("X: 10\n", &["a.seq", "b.seq"]))
            .add("a.seq", &doc_with("X: 1\nY: 1\n", &[]))
            .add("b.seq", &doc_with("Y: 2\nZ: 2\n", &[]));

        assert_eq!(
            constants(&loader, "main.seq"),
            vec![
                ("X".to_string(), 10),
                ("Y".to_string(), 2),
                ("Z".to_string(), 2)
            ]
        );
    }

    #[test]
    fn later_include_shadows_earlier() {
        let mut loader = MemoryLoader::new();
        loader
            .add("main.seq", &doc_with("", &["b.seq", "c.seq"]))
            .add("b.seq", &doc_with("X: 2\n", &[]))
            .add("c.seq", &doc_with("X: 3\n", &[]));

        assert_eq!(constants(&loader, "main.seq"), vec![("X".to_string(), 3)]);
    }

    #[test]
    fn nested_includes_are_relative_to_includer() {
        let mut loader = MemoryLoader::new();
        loader
            .add("seq/main.seq", &doc_with("", &["common/a.seq"]))
            .add("seq/common/a.seq", &doc_with("A: 1\n", &["../b.seq"]))
            .add("seq/b.seq", &doc_with("B: 2\n", &[]));

        assert_eq!(
            constants(&loader, "seq/main.seq"),
            vec![("A".to_string(), 1), ("B".to_string(), 2)]
        );
    }

    #[test]
    fn include_cycle_is_an_error() {
        let mut loader = MemoryLoader::new();
        loader
            .add("a.seq", &doc_with("", &["b.seq"]))
            .add("b.seq", &doc_with("", &["a.seq"]));

        let mut sm = SourceMap::new();
        match load_document(Path::new("a.seq"), &loader, &Parser::new(), &mut sm) {
            Err(ImportError::Cycle { chain, .. }) => assert_eq!(
                chain,
                vec![
                    PathBuf::from("a.seq"),
                    PathBuf::from("b.seq"),
                    PathBuf::from("a.seq")
                ]
            ),
            r => panic!("Expected a cycle, got {:?}", r),
        }
    }

    #[test]
    fn missing_include_reports_include_line() {
        let mut loader = MemoryLoader::new();
        loader.add("main.seq", &doc_with("", &["gone.seq"]));

        let mut sm = SourceMap::new();
        let err = load_document(Path::new("main.seq"), &loader, &Parser::new(), &mut sm)
            .unwrap_err();
        match &err {
            ImportError::Read { path, span, .. } => {
                assert_eq!(path, &PathBuf::from("gone.seq"));
                assert!(span.is_some());
            }
            e => panic!("Expected a read error, got {:?}", e),
        }
        let msg = err.fmt(&sm).unwrap();
        assert!(msg.starts_with("main.seq:2:1: Could not read included file gone.seq"));
    }

    #[test]
    fn parse_error_is_located_in_included_file() {
        let mut loader = MemoryLoader::new();
        loader
            .add("main.seq", &doc_with("", &["bad.seq"]))
            .add("bad.seq", "[constants]\nX = 1\n[clocks]\n[functions]\n[mains]\n");

        let mut sm = SourceMap::new();
        let err = load_document(Path::new("main.seq"), &loader, &Parser::new(), &mut sm)
            .unwrap_err();
        assert!(matches!(err, ImportError::Parser(_)));
        assert_eq!(
            err.fmt(&sm).unwrap(),
            "bad.seq:2:1: Malformed line in section [constants]"
        );
    }

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize(Path::new("./a/b/../c.seq")), PathBuf::from("a/c.seq"));
        assert_eq!(normalize(Path::new("../x.seq")), PathBuf::from("../x.seq"));
        assert_eq!(normalize(Path::new("a/../../x.seq")), PathBuf::from("../x.seq"));
        assert_eq!(normalize(Path::new("/a/../x.seq")), PathBuf::from("/x.seq"));
    }
}
