//! Opening Book Tests
//!
//! Building, the pre-order text format on disk, lookups and book moves.

use std::fs;
use std::path::PathBuf;

use kalaha_agent::board::GameState;
use kalaha_agent::book::{OpeningBook, ABSENT_MARKER};
use kalaha_agent::config::Config;
use kalaha_agent::evaluator::Evaluator;
use kalaha_agent::types::Player;

fn evaluator() -> Evaluator {
    Evaluator::new(&Config::default_hardcoded().evaluation)
}

fn temp_book_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("kalaha_{}_{}.txt", name, std::process::id()))
}

fn preorder_encodings(book: &OpeningBook) -> Vec<String> {
    book.preorder()
        .into_iter()
        .map(|id| book.node(id).state.to_string())
        .collect()
}

#[test]
fn test_build_depth_two_expands_every_legal_move() {
    let book = OpeningBook::build(GameState::default(), 2);
    let root = book.node(book.root());

    let mut expected = 1;
    for id in root.children.iter().flatten() {
        let child = book.node(*id);
        let legal = child.state.legal_moves().len();
        assert_eq!(child.children.iter().flatten().count(), legal);
        expected += 1 + legal;
    }
    assert_eq!(book.len(), expected);
}

#[test]
fn test_children_follow_their_pit() {
    let book = OpeningBook::build(GameState::default(), 2);
    for id in book.preorder() {
        let node = book.node(id);
        for (slot, child) in node.children.iter().enumerate() {
            if let Some(child) = child {
                let mut expected = node.state.clone();
                assert!(expected.apply_move(slot as u8 + 1));
                assert_eq!(book.node(*child).state, expected);
            }
        }
    }
}

#[test]
fn test_write_read_preserves_preorder() {
    let book = OpeningBook::build(GameState::default(), 3);

    let mut text = Vec::new();
    book.write_to(&mut text).unwrap();
    let restored = OpeningBook::read_from(text.as_slice()).unwrap();

    assert_eq!(restored.len(), book.len());
    assert_eq!(preorder_encodings(&restored), preorder_encodings(&book));

    // Every node line is followed, eventually, by six child slots
    let text = String::from_utf8(text).unwrap();
    let markers = text.lines().filter(|l| *l == ABSENT_MARKER).count();
    assert_eq!(markers, book.len() * 6 - (book.len() - 1));
}

#[test]
fn test_save_and_load_file() {
    let path = temp_book_path("save_load");
    let book = OpeningBook::build(GameState::default(), 2);
    book.save(&path).unwrap();

    let loaded = OpeningBook::load(&path).unwrap();
    assert_eq!(preorder_encodings(&loaded), preorder_encodings(&book));

    let first_line = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .next()
        .map(str::to_string);
    assert_eq!(first_line.as_deref(), Some("1;6;6;6;6;6;6;0;6;6;6;6;6;6;0"));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_load_missing_file_fails() {
    let path = temp_book_path("never_written");
    assert!(OpeningBook::load(&path).is_err());
}

#[test]
fn test_read_rejects_trailing_content() {
    let mut text = Vec::new();
    OpeningBook::build(GameState::default(), 1)
        .write_to(&mut text)
        .unwrap();
    text.extend_from_slice(b"1;6;6;6;6;6;6;0;6;6;6;6;6;6;0\n");
    assert!(OpeningBook::read_from(text.as_slice()).is_err());
}

#[test]
fn test_find_locates_positions_in_tree() {
    let book = OpeningBook::build(GameState::default(), 2);
    assert_eq!(book.find(&GameState::default()), Some(book.root()));

    let mut after_three = GameState::default();
    after_three.apply_move(3);
    let id = book.find(&after_three).unwrap();
    assert_eq!(book.node(id).state, after_three);

    let mut deeper = after_three.clone();
    deeper.apply_move(1);
    assert!(book.find(&deeper).is_some());

    deeper.apply_move(deeper.legal_moves()[0]);
    assert_eq!(book.find(&deeper), None);
}

#[test]
fn test_book_move_for_both_players() {
    let book = OpeningBook::build(GameState::default(), 3);

    let (pit, _) = book
        .best_move(&GameState::default(), Player::One, &evaluator())
        .unwrap();
    assert!(GameState::default().is_move_legal(pit));

    let mut reply_position = GameState::default();
    reply_position.apply_move(3);
    assert_eq!(reply_position.next_player(), Player::Two);
    let (pit, _) = book
        .best_move(&reply_position, Player::Two, &evaluator())
        .unwrap();
    assert!(reply_position.is_move_legal(pit));
}

#[test]
fn test_book_move_survives_round_trip() {
    let book = OpeningBook::build(GameState::default(), 3);
    let mut text = Vec::new();
    book.write_to(&mut text).unwrap();
    let restored = OpeningBook::read_from(text.as_slice()).unwrap();

    let state = GameState::default();
    assert_eq!(
        restored.best_move(&state, Player::One, &evaluator()),
        book.best_move(&state, Player::One, &evaluator())
    );
}
