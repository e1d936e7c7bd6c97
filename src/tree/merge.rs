use tracing::warn;

use crate::authority::LegalityAuthority;
use crate::pgn::{GameRecord, MoveEntry};
use crate::tree::{NodeId, OpeningTree};

impl OpeningTree {
    /// Folds parsed games into the shared tree, in order.
    ///
    /// Provenance is cumulative: merging the same games twice doubles every
    /// node's opening count without changing the tree shape. A move the
    /// authority rejects truncates that one game's ingestion; the prefix
    /// merged so far stays.
    pub fn merge<A: LegalityAuthority>(&mut self, games: &[GameRecord], authority: &A) {
        for game in games {
            let mut replay = authority.clone();
            replay.reset();
            self.merge_line(self.root(), replay, &game.moves, &game.opening_name);
        }
    }

    /// Walks one line of moves from `node`, reusing existing children by
    /// notation and creating the rest. Each variation branch recurses with a
    /// snapshot of the replay position valid at the branch point, leaving the
    /// main line's walk undisturbed.
    fn merge_line<A: LegalityAuthority>(
        &mut self,
        node: NodeId,
        mut replay: A,
        entries: &[MoveEntry],
        opening: &str,
    ) {
        let mut current = node;

        for entry in entries {
            for branch in &entry.variations {
                self.merge_line(current, replay.clone(), branch, opening);
            }

            let played = match replay.play_san(&entry.san) {
                Some(played) => played,
                None => {
                    warn!(
                        opening,
                        san = entry.san.as_str(),
                        "illegal move, truncating this game"
                    );
                    return;
                }
            };

            let child = match self.find_child(current, &entry.san) {
                Some(child) => child,
                None => self.allocate(current, entry.san.clone(), played.from, played.to),
            };

            self.get_mut(child).openings.push(opening.to_string());
            for comment in &entry.comments {
                self.append_comment(child, comment);
            }

            current = child;
        }
    }
}
