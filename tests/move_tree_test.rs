//! Move tree behaviour through the public chess-core API: building lines on
//! the board, PGN round trips and the rendered move list.

use chess_core::{
    export_pgn, import_pgn, render_move_list, DisplayEntry, GameHeaders, GameResult, MoveTree,
};

fn play(tree: &mut MoveTree, moves: &[(&str, &str)]) {
    let mut path = tree.root_path();
    for (from, to) in moves {
        path = tree
            .apply_move(&path, from, to, None)
            .unwrap_or_else(|| panic!("{from}{to} should be legal"));
    }
}

fn texts(tree: &MoveTree, result: GameResult) -> Vec<String> {
    render_move_list(tree, result)
        .iter()
        .map(|e| match e {
            DisplayEntry::VariationStart { .. } => "(".to_string(),
            DisplayEntry::VariationEnd { .. } => ")".to_string(),
            other => other.text().to_string(),
        })
        .collect()
}

#[test]
fn end_to_end_game() {
    let pgn = "[White \"A\"]\n[Black \"B\"]\n\n1. e4 e5 2. Nf3 Nc6 1-0";
    let game = import_pgn(pgn).unwrap();

    assert_eq!(game.tree.main_line().len(), 5);
    assert_eq!(game.result, GameResult::WhiteWins);
    assert_eq!(
        texts(&game.tree, game.result),
        vec!["1. e4", "e5", "2. Nf3", "Nc6", "1-0"]
    );

    let out = export_pgn(&game.tree, game.result, &game.headers);
    assert!(out.starts_with("[Event \"Chess Game\"]\n[White \"A\"]\n[Black \"B\"]"));
    assert!(out.contains("[Result \"1-0\"]"));
    assert!(out.ends_with("\n\n1. e4 e5 2. Nf3 Nc6 1-0"));
}

#[test]
fn played_variation_survives_round_trip() {
    let mut tree = MoveTree::new();
    play(&mut tree, &[("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")]);
    // 2. Bc4 as an alternative to 2. Nf3, with a reply.
    play(&mut tree, &[("e2", "e4"), ("e7", "e5"), ("f1", "c4"), ("g8", "f6")]);
    let e5 = tree.path_from_line(&[0, 0]).unwrap().last();
    tree.set_annotation(e5, "Symmetrical");

    let pgn = export_pgn(&tree, GameResult::Ongoing, &GameHeaders::new());
    assert!(pgn.ends_with("1. e4 e5 {Symmetrical} 2. Nf3 (2. Bc4 Nf6) 2... Nc6 *"));

    let back = import_pgn(&pgn).unwrap();
    assert_eq!(back.tree, tree);
    assert_eq!(export_pgn(&back.tree, back.result, &back.headers), pgn);
}

#[test]
fn replaying_a_move_does_not_branch() {
    let mut tree = MoveTree::new();
    play(&mut tree, &[("e2", "e4"), ("e7", "e5")]);
    let before = tree.len();

    play(&mut tree, &[("e2", "e4"), ("e7", "e5")]);
    assert_eq!(tree.len(), before);
    assert_eq!(tree.node(tree.root()).children().len(), 1);

    let first = tree.path_from_line(&[0]).unwrap();
    assert_eq!(tree.apply_san(&first, "e5"), tree.path_from_line(&[0, 0]));
    assert_eq!(tree.len(), before);
}

#[test]
fn illegal_move_leaves_tree_alone() {
    let mut tree = MoveTree::new();
    play(&mut tree, &[("e2", "e4")]);
    let snapshot = tree.clone();

    let path = tree.main_line();
    assert!(tree.apply_move(&path, "e1", "e3", None).is_none());
    assert!(tree.apply_san(&path, "Qxf7#").is_none());
    assert_eq!(tree, snapshot);
}

#[test]
fn import_tolerates_messy_input() {
    // Move numbers without spaces, NAGs, a stray illegal ply and CRLF endings.
    let pgn = "[White \"A\"]\r\n[Black \"B\"]\r\n\r\n1.e4 $1 e5 2.Nf3!? Ke3 Nc6 *";
    let game = import_pgn(pgn).unwrap();
    assert_eq!(game.tree.move_sequence(&game.tree.main_line()), "e4 e5 Nf3 Nc6");
    assert_eq!(game.headers.white(), "A");
}

#[test]
fn black_to_move_start_numbering() {
    let pgn = "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 30\"]\n\n30... Kd7 31. e4 *";
    let game = import_pgn(pgn).unwrap();
    assert_eq!(texts(&game.tree, game.result), vec!["30... Kd7", "31. e4"]);

    let out = export_pgn(&game.tree, game.result, &game.headers);
    assert!(out.contains("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 30\"]"));
    assert!(out.ends_with("30... Kd7 31. e4 *"));
}
