use super::*;

fn sample_tree() -> WorkspaceNode {
    WorkspaceNode::dir(
        "root",
        vec![
            WorkspaceNode::file("README.md"),
            WorkspaceNode::dir(
                "src",
                vec![
                    WorkspaceNode::file("main.rs"),
                    WorkspaceNode::dir("empty", vec![]),
                ],
            ),
            WorkspaceNode::dir(
                "nested",
                vec![WorkspaceNode::dir("deeper", vec![WorkspaceNode::dir("x", vec![])])],
            ),
        ],
    )
}

fn assert_no_empty_dirs_below(node: &WorkspaceNode) {
    if let Some(children) = &node.children {
        for child in children {
            assert!(!child.is_empty_dir(), "empty dir left: {}", child.name);
            assert_no_empty_dirs_below(child);
        }
    }
}

#[test]
fn prunes_empty_directory_leaf() {
    let input = WorkspaceNode::dir(
        "root",
        vec![WorkspaceNode::file("a"), WorkspaceNode::dir("b", vec![])],
    );
    let out = normalize(input);
    assert_eq!(out, WorkspaceNode::dir("root", vec![WorkspaceNode::file("a")]));
}

#[test]
fn prunes_bottom_up() {
    let out = normalize(sample_tree());
    assert_eq!(
        out,
        WorkspaceNode::dir(
            "root",
            vec![
                WorkspaceNode::file("README.md"),
                WorkspaceNode::dir("src", vec![WorkspaceNode::file("main.rs")]),
            ],
        )
    );
    assert_no_empty_dirs_below(&out);
}

#[test]
fn normalize_is_idempotent() {
    let once = normalize(sample_tree());
    let twice = normalize(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn root_is_kept_when_childless() {
    let out = normalize(WorkspaceNode::dir(
        "root",
        vec![WorkspaceNode::dir("gone", vec![])],
    ));
    assert_eq!(out, WorkspaceNode::dir("root", vec![]));

    let leaf_root = normalize(WorkspaceNode::file("root"));
    assert_eq!(leaf_root, WorkspaceNode::file("root"));
}

#[test]
fn deep_chain_of_empty_dirs_collapses() {
    let mut chain = WorkspaceNode::dir("d9", vec![]);
    for i in (0..9).rev() {
        chain = WorkspaceNode::dir(format!("d{}", i), vec![chain]);
    }
    let input = WorkspaceNode::dir("root", vec![chain, WorkspaceNode::file("keep")]);

    let out = normalize(input);
    assert_eq!(out, WorkspaceNode::dir("root", vec![WorkspaceNode::file("keep")]));
}

#[test]
fn deep_file_keeps_its_whole_chain() {
    let mut chain = WorkspaceNode::dir("d5", vec![WorkspaceNode::file("leaf.txt")]);
    for i in (0..5).rev() {
        chain = WorkspaceNode::dir(
            format!("d{}", i),
            vec![chain, WorkspaceNode::dir("empty", vec![])],
        );
    }
    let out = normalize(WorkspaceNode::dir("root", vec![chain]));

    assert_eq!(out.file_paths(), vec!["d0/d1/d2/d3/d4/d5/leaf.txt"]);
    assert_no_empty_dirs_below(&out);
}

/// Small xorshift so generated trees are the same on every run.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0 % bound
    }
}

fn generate(rng: &mut XorShift, name: String, depth: u32) -> WorkspaceNode {
    if depth == 0 || rng.next(3) == 0 {
        return if rng.next(2) == 0 {
            WorkspaceNode::file(name)
        } else {
            WorkspaceNode::dir(name, vec![])
        };
    }
    let children = (0..rng.next(4))
        .map(|i| generate(rng, format!("{}_{}", name, i), depth - 1))
        .collect();
    WorkspaceNode::dir(name, children)
}

#[test]
fn generated_trees_normalize_consistently() {
    for seed in 1..=200u64 {
        let mut rng = XorShift(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1);
        let input = WorkspaceNode::dir("root", vec![generate(&mut rng, "n".into(), 6)]);
        let files_before = input.file_paths();

        let once = normalize(input);
        assert_no_empty_dirs_below(&once);
        assert_eq!(once.name, "root", "seed {}", seed);
        assert!(once.is_dir(), "seed {}", seed);
        assert_eq!(once.file_paths(), files_before, "seed {}", seed);
        assert_eq!(normalize(once.clone()), once, "seed {}", seed);
    }
}

#[test]
fn parses_listing_without_children_as_file() {
    let v = serde_json::json!({
        "name": "root",
        "children": [{"name": "a"}, {"name": "b", "children": []}]
    });
    let node: WorkspaceNode = serde_json::from_value(v).unwrap();
    assert!(node.children.as_ref().unwrap()[0].children.is_none());
    assert!(node.children.as_ref().unwrap()[1].is_empty_dir());

    let back = serde_json::to_value(normalize(node)).unwrap();
    assert_eq!(back, serde_json::json!({"name": "root", "children": [{"name": "a"}]}));
}

#[test]
fn file_paths_are_relative_to_root() {
    let out = normalize(sample_tree());
    assert_eq!(out.file_paths(), vec!["README.md", "src/main.rs"]);
}

#[test]
fn qualify_path_prefixes_active_folder() {
    assert_eq!(qualify_path("", "a.txt"), "a.txt");
    assert_eq!(qualify_path("proj", "src/a.rs"), "proj/src/a.rs");
    assert_eq!(qualify_path("proj/", "a.rs"), "proj/a.rs");
}
