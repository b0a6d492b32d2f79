use super::*;
use crate::kernel::markdown::{BlockKind, TableAlign};

fn kinds(blocks: &[RenderedBlock]) -> Vec<BlockKind> {
    blocks.iter().map(RenderedBlock::kind).collect()
}

fn paragraph_text(block: &RenderedBlock) -> &str {
    match block {
        RenderedBlock::Paragraph(text) => &text.text,
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn atx_and_setext_headings() {
    let blocks = parse_blocks("# One #\n\nTwo\n===\n\nThree\n---\n\n###### Six\n####### seven");
    assert_eq!(
        blocks
            .iter()
            .filter_map(|b| match b {
                RenderedBlock::Heading { level, text } => Some((*level, text.text.as_str())),
                _ => None,
            })
            .collect::<Vec<_>>(),
        vec![(1, "One"), (1, "Two"), (2, "Three"), (6, "Six")]
    );
    assert_eq!(paragraph_text(blocks.last().unwrap()), "####### seven");
}

#[test]
fn paragraph_lines_are_joined_with_spaces() {
    let blocks = parse_blocks("first line\n  second line\nthird\n\nnext para");
    assert_eq!(blocks.len(), 2);
    assert_eq!(paragraph_text(&blocks[0]), "first line second line third");
    assert_eq!(paragraph_text(&blocks[1]), "next para");
}

#[test]
fn fenced_code_keeps_language_and_indentation() {
    let md = "```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n";
    let blocks = parse_blocks(md);
    assert_eq!(
        blocks,
        vec![RenderedBlock::CodeBlock {
            language: Some("rust".to_string()),
            code: "fn main() {\n    println!(\"hi\");\n}".to_string(),
        }]
    );
}

#[test]
fn closing_fence_must_match_marker_and_length() {
    let md = "````\n```\nstill code\n~~~~\n````\nafter";
    let blocks = parse_blocks(md);
    assert_eq!(kinds(&blocks), vec![BlockKind::CodeBlock, BlockKind::Paragraph]);
    match &blocks[0] {
        RenderedBlock::CodeBlock { language, code } => {
            assert_eq!(language, &None);
            assert_eq!(code, "```\nstill code\n~~~~");
        }
        _ => unreachable!(),
    }
}

#[test]
fn unclosed_fence_runs_to_end_of_document() {
    let blocks = parse_blocks("intro\n\n```python\nx = 1\n\n# not a heading");
    assert_eq!(kinds(&blocks), vec![BlockKind::Paragraph, BlockKind::CodeBlock]);
    match &blocks[1] {
        RenderedBlock::CodeBlock { code, .. } => assert!(code.ends_with("# not a heading")),
        _ => unreachable!(),
    }
}

#[test]
fn indented_fence_strips_its_indent_from_content() {
    let blocks = parse_blocks("  ```\n  a\n    b\n  ```");
    assert_eq!(
        blocks,
        vec![RenderedBlock::CodeBlock {
            language: None,
            code: "a\n  b".to_string(),
        }]
    );
}

#[test]
fn diagram_tags_become_diagram_blocks() {
    let md = "```Mermaid\ngraph TD\nA-->B\n```\n\n```sequenceDiagram\nA->>B: hi\n```";
    let blocks = parse_blocks(md);
    assert_eq!(
        blocks,
        vec![
            RenderedBlock::Diagram {
                language: "mermaid".to_string(),
                source: "graph TD\nA-->B".to_string(),
            },
            RenderedBlock::Diagram {
                language: "sequencediagram".to_string(),
                source: "A->>B: hi".to_string(),
            },
        ]
    );
}

#[test]
fn indented_code_after_blank_line() {
    let blocks = parse_blocks("para\n\n    let x = 1;\n\n    let y = 2;\n\nafter");
    assert_eq!(
        kinds(&blocks),
        vec![BlockKind::Paragraph, BlockKind::CodeBlock, BlockKind::Paragraph]
    );
    match &blocks[1] {
        RenderedBlock::CodeBlock { code, .. } => assert_eq!(code, "let x = 1;\n\nlet y = 2;"),
        _ => unreachable!(),
    }
}

#[test]
fn indented_line_continues_a_paragraph() {
    let blocks = parse_blocks("para\n    continued");
    assert_eq!(blocks.len(), 1);
    assert_eq!(paragraph_text(&blocks[0]), "para continued");
}

#[test]
fn nested_lists_and_tasks() {
    let md = "- one\n  - nested\n    more text\n- [x] done\n- [ ] todo\n\n1. first\n2) second";
    let blocks = parse_blocks(md);
    assert_eq!(kinds(&blocks), vec![BlockKind::List, BlockKind::List]);

    let RenderedBlock::List { ordered, items, .. } = &blocks[0] else {
        unreachable!()
    };
    assert!(!ordered);
    let summary: Vec<(usize, Option<bool>, &str)> = items
        .iter()
        .map(|i| (i.depth, i.checked, i.text.text.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, None, "one"),
            (1, None, "nested more text"),
            (0, Some(true), "done"),
            (0, Some(false), "todo"),
        ]
    );

    let RenderedBlock::List {
        ordered,
        start,
        items,
    } = &blocks[1]
    else {
        unreachable!()
    };
    assert!(ordered);
    assert_eq!(*start, Some(1));
    assert_eq!(items[1].ordinal, Some(2));
}

#[test]
fn loose_list_survives_blank_lines() {
    let blocks = parse_blocks("- a\n\n- b\n\n  continued\n\nplain");
    assert_eq!(kinds(&blocks), vec![BlockKind::List, BlockKind::Paragraph]);
    let RenderedBlock::List { items, .. } = &blocks[0] else {
        unreachable!()
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].text.text, "b continued");
}

#[test]
fn switching_list_kind_starts_a_new_list() {
    let blocks = parse_blocks("- bullet\n1. number");
    assert_eq!(kinds(&blocks), vec![BlockKind::List, BlockKind::List]);
}

#[test]
fn fence_inside_list_item_ends_the_list() {
    let md = "1. Install:\n\n   ```bash\n   cargo install zdoc\n   ```\n2. Run";
    let blocks = parse_blocks(md);
    assert_eq!(
        kinds(&blocks),
        vec![BlockKind::List, BlockKind::CodeBlock, BlockKind::List]
    );
    match &blocks[1] {
        RenderedBlock::CodeBlock { language, code } => {
            assert_eq!(language.as_deref(), Some("bash"));
            assert_eq!(code, "cargo install zdoc");
        }
        _ => unreachable!(),
    }
    let RenderedBlock::List { start, .. } = &blocks[2] else {
        unreachable!()
    };
    assert_eq!(*start, Some(2));
}

#[test]
fn thematic_break_is_not_a_list() {
    let blocks = parse_blocks("* * *\n\n---\n\n___");
    assert_eq!(
        kinds(&blocks),
        vec![BlockKind::Rule, BlockKind::Rule, BlockKind::Rule]
    );
}

#[test]
fn block_quotes_nest_and_split_paragraphs() {
    let md = "> first\n> still first\n>\n> second\n> > inner\nlazy";
    let blocks = parse_blocks(md);
    assert_eq!(blocks.len(), 1);
    let RenderedBlock::BlockQuote(inner) = &blocks[0] else {
        unreachable!()
    };
    assert_eq!(
        kinds(inner),
        vec![BlockKind::Paragraph, BlockKind::Paragraph, BlockKind::BlockQuote]
    );
    assert_eq!(paragraph_text(&inner[0]), "first still first");
    let RenderedBlock::BlockQuote(innermost) = &inner[2] else {
        unreachable!()
    };
    assert_eq!(paragraph_text(&innermost[0]), "inner lazy");
}

#[test]
fn deeply_nested_quotes_are_capped() {
    let md = format!("{} deep", ">".repeat(200));
    let blocks = parse_blocks(&md);
    assert_eq!(blocks.len(), 1);
}

#[test]
fn tables_parse_header_alignment_and_rows() {
    let md = "| Name | Size | Note |\n|:-----|-----:|:----:|\n| a | 1 | **x** |\n| b \\| c | 2 | |";
    let blocks = parse_blocks(md);
    let RenderedBlock::Table {
        aligns,
        header,
        rows,
    } = &blocks[0]
    else {
        panic!("expected table, got {:?}", blocks[0]);
    };
    assert_eq!(
        aligns,
        &vec![TableAlign::Left, TableAlign::Right, TableAlign::Center]
    );
    assert_eq!(
        header.iter().map(|h| h.text.as_str()).collect::<Vec<_>>(),
        vec!["Name", "Size", "Note"]
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][2].text, "x");
    assert_eq!(rows[1][0].text, "b | c");
    assert_eq!(rows[1][2].text, "");
}

#[test]
fn table_row_with_wrong_cell_count_ends_table() {
    let md = "a | b\n--- | ---\n1 | 2\n1 | 2 | 3";
    let blocks = parse_blocks(md);
    assert_eq!(kinds(&blocks), vec![BlockKind::Table, BlockKind::Paragraph]);
    assert_eq!(paragraph_text(&blocks[1]), "1 | 2 | 3");
}

#[test]
fn invalid_alignment_row_is_not_a_table() {
    let blocks = parse_blocks("a | b\n-- | x");
    assert_eq!(kinds(&blocks), vec![BlockKind::Paragraph]);
}

#[test]
fn table_interrupts_paragraph() {
    let blocks = parse_blocks("Intro text\n| a | b |\n|---|---|\n| 1 | 2 |");
    assert_eq!(kinds(&blocks), vec![BlockKind::Paragraph, BlockKind::Table]);
}

#[test]
fn html_blocks_are_generic() {
    let blocks = parse_blocks("<div align=\"center\">\n  <img src=\"x.png\">\n</div>\n\ntext");
    assert_eq!(kinds(&blocks), vec![BlockKind::Generic, BlockKind::Paragraph]);
    assert_eq!(
        blocks[0],
        RenderedBlock::Generic("<div align=\"center\">\n  <img src=\"x.png\">\n</div>".into())
    );
}

#[test]
fn autolink_line_is_a_paragraph() {
    let blocks = parse_blocks("<https://example.com>");
    assert_eq!(kinds(&blocks), vec![BlockKind::Paragraph]);
}

#[test]
fn crlf_input_is_handled() {
    let blocks = parse_blocks("# Title\r\n\r\nbody\r\n");
    assert_eq!(kinds(&blocks), vec![BlockKind::Heading, BlockKind::Paragraph]);
    assert_eq!(paragraph_text(&blocks[1]), "body");
}
