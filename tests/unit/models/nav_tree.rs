use super::*;

const SMALL: &[NavSpec] = &[
    NavSpec::Branch {
        id: "a",
        title: "Section A",
        icon: None,
        expanded: true,
        children: &[
            NavSpec::Leaf {
                id: "a1",
                title: "A one",
                path: "docs/a1.md",
                icon: None,
            },
            NavSpec::Leaf {
                id: "a2",
                title: "A two",
                path: "/docs/a2",
                icon: Some("*"),
            },
        ],
    },
    NavSpec::Leaf {
        id: "readme",
        title: "Readme",
        path: "README.md",
        icon: None,
    },
];

#[test]
fn from_spec_builds_ordered_hierarchy() {
    let tree = NavTree::from_spec(SMALL).unwrap();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.roots().len(), 2);

    let a = tree.find("a").unwrap();
    let children: Vec<&str> = tree
        .children(a)
        .iter()
        .map(|id| tree.get(*id).unwrap().key())
        .collect();
    assert_eq!(children, vec!["a1", "a2"]);

    let a2 = tree.find("a2").unwrap();
    assert_eq!(tree.parent(a2), Some(a));
    assert_eq!(
        tree.get(a2).unwrap().path().map(DocPath::as_str),
        Some("docs/a2.md")
    );
    assert_eq!(tree.get(a2).unwrap().icon(), Some("*"));
}

#[test]
fn leaf_and_branch_are_exclusive() {
    let tree = NavTree::from_spec(SMALL).unwrap();
    for (_, node) in tree.iter() {
        match node.kind() {
            NavKind::Leaf { .. } => assert!(node.children().is_empty()),
            NavKind::Branch { .. } => assert!(node.path().is_none()),
        }
    }
}

#[test]
fn duplicate_ids_are_rejected() {
    const DUP: &[NavSpec] = &[
        NavSpec::Leaf {
            id: "x",
            title: "X",
            path: "x.md",
            icon: None,
        },
        NavSpec::Branch {
            id: "b",
            title: "B",
            icon: None,
            expanded: false,
            children: &[NavSpec::Leaf {
                id: "x",
                title: "X again",
                path: "docs/x.md",
                icon: None,
            }],
        },
    ];
    assert_eq!(
        NavTree::from_spec(DUP).unwrap_err(),
        NavTreeError::DuplicateId("x".to_string())
    );
}

#[test]
fn invalid_leaf_path_is_rejected() {
    const BAD: &[NavSpec] = &[NavSpec::Leaf {
        id: "bad",
        title: "Bad",
        path: "../etc/passwd",
        icon: None,
    }];
    assert!(matches!(
        NavTree::from_spec(BAD),
        Err(NavTreeError::InvalidPath { .. })
    ));
}

#[test]
fn lookup_by_path_and_is_active() {
    let tree = NavTree::from_spec(SMALL).unwrap();
    let path = DocPath::parse("docs/a1.md").unwrap();
    let a1 = tree.find_by_path(&path).unwrap();
    assert!(tree.is_active(a1, Some(&path)));
    assert!(!tree.is_active(a1, None));

    let other = DocPath::parse("docs/a2.md").unwrap();
    assert!(!tree.is_active(a1, Some(&other)));

    let branch = tree.find("a").unwrap();
    assert!(!tree.is_active(branch, Some(&path)));
}

#[test]
fn title_for_falls_back_to_file_name() {
    let tree = NavTree::from_spec(SMALL).unwrap();
    assert_eq!(tree.title_for(&DocPath::parse("README.md").unwrap()), "Readme");
    assert_eq!(
        tree.title_for(&DocPath::parse("docs/not-listed.md").unwrap()),
        "Not listed"
    );
}

#[test]
fn ancestors_walk_to_root() {
    let tree = NavTree::default_docs();
    let leaf = tree.find("diagram-renderer").unwrap();
    let keys: Vec<&str> = tree
        .ancestors(leaf)
        .into_iter()
        .map(|id| tree.get(id).unwrap().key())
        .collect();
    assert_eq!(keys, vec!["internals", "reference"]);
}

#[test]
fn default_docs_is_valid_and_has_mixed_expansion() {
    let tree = NavTree::from_spec(DEFAULT_NAV).unwrap();
    let branches: Vec<&NavNode> = tree
        .iter()
        .map(|(_, node)| node)
        .filter(|node| node.is_branch())
        .collect();
    assert!(branches.iter().any(|b| b.default_expanded()));
    assert!(branches.iter().any(|b| !b.default_expanded()));
    assert!(tree
        .find_by_path(&DocPath::parse("docs/quick-start.md").unwrap())
        .is_some());
}
