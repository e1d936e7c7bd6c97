use tracing::{debug, error};

use crate::authority::{Color, LegalityAuthority};
use crate::tree::{NodeId, OpeningTree};

/// The board-rendering collaborator, driven by the navigation state machine.
/// Implementations release their resources on drop.
pub trait BoardView {
    fn set_position(&mut self, fen: &str);
    fn set_last_move(&mut self, last: Option<(&str, &str)>);
    /// Candidate (from, to) destination pairs for the reachable next moves.
    fn set_candidates(&mut self, dests: &[(String, String)]);
    fn flip(&mut self);
}

/// Walks the merged opening tree, keeping the live position consistent with
/// the path from the root to the current node.
///
/// Every reachable node is a state; the root is the initial state. Auto
/// advance is modelled as a single queued task: after a successful advance
/// onto a node with exactly one child, that child is queued, and the driver
/// takes it with [`take_pending`](NavigationState::take_pending) after a
/// cosmetic delay. The parent-equals-current guard in `advance_to` re-runs at
/// that point, so a stale queued advance is dropped instead of corrupting the
/// position.
pub struct NavigationState<A: LegalityAuthority, B: BoardView> {
    tree: OpeningTree,
    authority: A,
    board: B,
    current: NodeId,
    auto_advance: bool,
    pending: Option<NodeId>,
}

impl<A: LegalityAuthority, B: BoardView> NavigationState<A, B> {
    pub fn new(tree: OpeningTree, mut authority: A, mut board: B) -> NavigationState<A, B> {
        authority.reset();
        board.set_position(&authority.fen());
        board.set_last_move(None);

        let mut nav = NavigationState {
            current: tree.root(),
            tree,
            authority,
            board,
            auto_advance: false,
            pending: None,
        };
        nav.sync_candidates();
        nav
    }

    pub fn tree(&self) -> &OpeningTree {
        &self.tree
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn fen(&self) -> String {
        self.authority.fen()
    }

    pub fn turn(&self) -> Color {
        self.authority.turn()
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    /// The reachable next moves from the current node.
    pub fn candidate_moves(&self) -> &[NodeId] {
        &self.tree.get(self.current).children
    }

    /// Advances to an immediate child of the current node.
    ///
    /// A target whose parent is not the live current node is rejected
    /// silently: that is the guard against a stale queued advance racing a
    /// navigation the user has performed in the meantime, not a user-facing
    /// error.
    pub fn advance_to(&mut self, target: NodeId) -> bool {
        if self.tree.get(target).parent != self.current {
            debug!(?target, "dropping stale advance request");
            return false;
        }

        let san = self.tree.get(target).san.clone();
        if self.authority.play_san(&san).is_none() {
            // Should not happen for a correctly built tree
            error!(san = san.as_str(), "replay rejected a tree move");
            return false;
        }

        self.current = target;
        self.sync_board();

        let children = &self.tree.get(self.current).children;
        self.pending = if self.auto_advance && children.len() == 1 {
            Some(children[0])
        } else {
            None
        };

        true
    }

    /// Takes the queued auto-advance target, if any. The driver waits the
    /// inter-move delay and then calls `advance_to` with it.
    pub fn take_pending(&mut self) -> Option<NodeId> {
        self.pending.take()
    }

    /// Retreats to `currentNode.parent`. No-op at the root.
    pub fn back_one_move(&mut self) -> bool {
        if self.current == self.tree.root() {
            return false;
        }
        let parent = self.tree.get(self.current).parent;
        self.retreat_to(parent)
    }

    /// Retreats to an ancestor of the current node, undoing the live position
    /// one step at a time. Equal target is a no-op; anything that is not an
    /// ancestor is rejected.
    pub fn retreat_to(&mut self, target: NodeId) -> bool {
        if target == self.current {
            return true;
        }
        if !self.tree.is_ancestor(target, self.current) {
            debug!(?target, "retreat target is not an ancestor");
            return false;
        }

        self.pending = None;
        while self.current != target {
            self.authority.undo();
            self.current = self.tree.get(self.current).parent;
        }
        self.sync_board();
        true
    }

    /// Returns to the root and the initial position, clearing highlights.
    pub fn reset(&mut self) {
        self.pending = None;
        self.authority.reset();
        self.current = self.tree.root();
        self.sync_board();
    }

    /// Wires a board drag to the matching candidate move, if any.
    pub fn handle_drop(&mut self, from: &str, to: &str) -> bool {
        let target = self
            .candidate_moves()
            .iter()
            .copied()
            .find(|&id| self.tree.get(id).from == from && self.tree.get(id).to == to);

        match target {
            Some(target) => self.advance_to(target),
            None => false,
        }
    }

    pub fn switch_sides(&mut self) {
        self.board.flip();
    }

    fn sync_board(&mut self) {
        self.board.set_position(&self.authority.fen());
        if self.current == self.tree.root() {
            self.board.set_last_move(None);
        } else {
            let node = self.tree.get(self.current);
            let (from, to) = (node.from.clone(), node.to.clone());
            self.board.set_last_move(Some((&from, &to)));
        }
        self.sync_candidates();
    }

    fn sync_candidates(&mut self) {
        let dests: Vec<(String, String)> = self
            .tree
            .get(self.current)
            .children
            .iter()
            .map(|&id| {
                let node = self.tree.get(id);
                (node.from.clone(), node.to.clone())
            })
            .collect();
        self.board.set_candidates(&dests);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::ShakmatyAuthority;
    use crate::pgn::parse_file;

    /// Board stub recording what the state machine pushed to it.
    #[derive(Default)]
    struct RecordingBoard {
        fen: String,
        last_move: Option<(String, String)>,
        candidates: Vec<(String, String)>,
        flips: usize,
    }

    impl BoardView for RecordingBoard {
        fn set_position(&mut self, fen: &str) {
            self.fen = fen.to_string();
        }

        fn set_last_move(&mut self, last: Option<(&str, &str)>) {
            self.last_move = last.map(|(f, t)| (f.to_string(), t.to_string()));
        }

        fn set_candidates(&mut self, dests: &[(String, String)]) {
            self.candidates = dests.to_vec();
        }

        fn flip(&mut self) {
            self.flips += 1;
        }
    }

    fn nav_for(text: &str) -> NavigationState<ShakmatyAuthority, RecordingBoard> {
        let outcome = parse_file(text);
        let mut tree = OpeningTree::new();
        tree.merge(&outcome.games, &ShakmatyAuthority::new());
        NavigationState::new(tree, ShakmatyAuthority::new(), RecordingBoard::default())
    }

    const REPERTOIRE: &str = r#"[Event "Italian"]
1. e4 e5 2. Nf3 Nc6 3. Bc4 *

[Event "Scandinavian"]
1. e4 d5 2. exd5 *
"#;

    fn child(nav: &NavigationState<ShakmatyAuthority, RecordingBoard>, san: &str) -> NodeId {
        nav.tree()
            .find_child(nav.current(), san)
            .unwrap_or_else(|| panic!("no candidate {}", san))
    }

    #[test]
    fn test_advance_updates_position_and_board() {
        let mut nav = nav_for(REPERTOIRE);

        let e4 = child(&nav, "e4");
        assert!(nav.advance_to(e4));

        assert_eq!(nav.current(), e4);
        assert_eq!(nav.turn(), Color::Black);
        assert_eq!(
            nav.board().last_move,
            Some(("e2".to_string(), "e4".to_string()))
        );
        assert_eq!(nav.board().fen, nav.fen());
        // Two continuations known from here
        assert_eq!(nav.board().candidates.len(), 2);
    }

    #[test]
    fn test_advance_to_non_child_is_rejected_silently() {
        let mut nav = nav_for(REPERTOIRE);

        let e4 = child(&nav, "e4");
        let e5 = nav.tree().find_child(e4, "e5").unwrap();
        let nf3 = nav.tree().find_child(e5, "Nf3").unwrap();

        nav.advance_to(e4);
        let fen_before = nav.fen();

        // nf3's parent is e5, not the current node
        assert!(!nav.advance_to(nf3));
        assert_eq!(nav.current(), e4);
        assert_eq!(nav.fen(), fen_before);
        assert_eq!(nav.board().fen, fen_before);
    }

    #[test]
    fn test_advance_to_siblings_child_is_rejected() {
        let mut nav = nav_for(REPERTOIRE);

        let e4 = child(&nav, "e4");
        let d5 = nav.tree().find_child(e4, "d5").unwrap();
        let exd5 = nav.tree().find_child(d5, "exd5").unwrap();

        nav.advance_to(e4);
        let e5 = child(&nav, "e5");
        nav.advance_to(e5);

        // exd5 hangs under e5's sibling d5
        assert!(!nav.advance_to(exd5));
        assert_eq!(nav.current(), e5);
    }

    #[test]
    fn test_back_one_move_and_noop_at_root() {
        let mut nav = nav_for(REPERTOIRE);
        let root = nav.tree().root();

        assert!(!nav.back_one_move());

        let e4 = child(&nav, "e4");
        nav.advance_to(e4);
        assert!(nav.back_one_move());
        assert_eq!(nav.current(), root);
        assert_eq!(nav.board().last_move, None);
    }

    #[test]
    fn test_retreat_then_replay_reproduces_position() {
        let mut nav = nav_for(REPERTOIRE);

        let path = ["e4", "e5", "Nf3", "Nc6"];
        let mut ids = Vec::new();
        for san in path {
            let id = child(&nav, san);
            assert!(nav.advance_to(id));
            ids.push(id);
        }
        let direct_fen = nav.fen();

        assert!(nav.retreat_to(nav.tree().root()));
        for id in ids {
            assert!(nav.advance_to(id));
        }
        assert_eq!(nav.fen(), direct_fen);
    }

    #[test]
    fn test_retreat_to_non_ancestor_rejected() {
        let mut nav = nav_for(REPERTOIRE);

        let e4 = child(&nav, "e4");
        nav.advance_to(e4);
        let e5 = child(&nav, "e5");
        nav.advance_to(e5);

        let d5 = nav.tree().find_child(e4, "d5").unwrap();
        assert!(!nav.retreat_to(d5));
        assert_eq!(nav.current(), e5);
    }

    #[test]
    fn test_reset_clears_highlights_and_returns_to_root() {
        let mut nav = nav_for(REPERTOIRE);

        nav.advance_to(child(&nav, "e4"));
        nav.reset();

        assert_eq!(nav.current(), nav.tree().root());
        assert_eq!(nav.turn(), Color::White);
        assert_eq!(nav.board().last_move, None);
        // Root has a single known move, e4
        assert_eq!(nav.board().candidates, [("e2".to_string(), "e4".to_string())]);
    }

    #[test]
    fn test_auto_advance_queues_single_child_only() {
        let mut nav = nav_for(REPERTOIRE);
        nav.set_auto_advance(true);

        // e4 has two children, nothing queued
        nav.advance_to(child(&nav, "e4"));
        assert_eq!(nav.take_pending(), None);

        // d5 has exactly one child, exd5 gets queued
        let d5 = child(&nav, "d5");
        nav.advance_to(d5);
        let queued = nav.take_pending().expect("exd5 should be queued");
        assert_eq!(nav.tree().get(queued).san, "exd5");
        assert!(nav.advance_to(queued));
        // Dead end, chain stops
        assert_eq!(nav.take_pending(), None);
    }

    #[test]
    fn test_stale_queued_advance_dropped_after_user_navigation() {
        let mut nav = nav_for(REPERTOIRE);
        nav.set_auto_advance(true);

        let d5 = {
            let e4 = child(&nav, "e4");
            nav.advance_to(e4);
            child(&nav, "d5")
        };
        nav.advance_to(d5);
        let queued = nav.take_pending().expect("exd5 queued");

        // The user navigates away before the delayed advance fires
        nav.back_one_move();
        assert!(!nav.advance_to(queued));
        assert_eq!(nav.tree().get(nav.current()).san, "e4");
    }

    #[test]
    fn test_handle_drop_matches_candidate_squares() {
        let mut nav = nav_for(REPERTOIRE);

        assert!(nav.handle_drop("e2", "e4"));
        assert_eq!(nav.tree().get(nav.current()).san, "e4");

        // No candidate for an arbitrary drag
        assert!(!nav.handle_drop("a2", "a3"));
    }

    #[test]
    fn test_switch_sides_flips_board() {
        let mut nav = nav_for(REPERTOIRE);
        nav.switch_sides();
        assert_eq!(nav.board().flips, 1);
    }
}
