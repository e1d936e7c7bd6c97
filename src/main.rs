use std::env;
use std::error::Error;
use std::fs;
use std::io::Write as _;
use std::thread;
use std::time::Duration;

use openings_browser::{BoardView, Color, NodeId, Session, ShakmatyAuthority};
use tracing_subscriber::EnvFilter;

/// Cosmetic delay between the moves of an auto-advance chain.
const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(600);

/// Terminal board view: renders the position as an 8x8 letter grid.
struct TextBoard {
    fen: String,
    last_move: Option<(String, String)>,
    flipped: bool,
}

impl TextBoard {
    fn new() -> TextBoard {
        TextBoard {
            fen: String::new(),
            last_move: None,
            flipped: false,
        }
    }

    fn print(&self) {
        let placement = self.fen.split_whitespace().next().unwrap_or("");
        let mut ranks: Vec<Vec<char>> = placement
            .split('/')
            .map(|rank| {
                let mut row = Vec::with_capacity(8);
                for c in rank.chars() {
                    if let Some(n) = c.to_digit(10) {
                        row.extend(std::iter::repeat(' ').take(n as usize));
                    } else {
                        row.push(c);
                    }
                }
                row
            })
            .collect();

        let mut files: Vec<char> = ('a'..='h').collect();
        if self.flipped {
            ranks.reverse();
            for row in &mut ranks {
                row.reverse();
            }
            files.reverse();
        }

        for (i, row) in ranks.iter().enumerate() {
            let rank_label = if self.flipped { i + 1 } else { 8 - i };
            print!("{} |", rank_label);
            for c in row {
                print!(" {}", c);
            }
            println!();
        }
        print!("   ");
        for f in files {
            print!(" {}", f);
        }
        println!();

        if let Some((from, to)) = &self.last_move {
            println!("Last move: {}-{}", from, to);
        }
    }
}

impl BoardView for TextBoard {
    fn set_position(&mut self, fen: &str) {
        self.fen = fen.to_string();
    }

    fn set_last_move(&mut self, last: Option<(&str, &str)>) {
        self.last_move = last.map(|(f, t)| (f.to_string(), t.to_string()));
    }

    fn set_candidates(&mut self, _dests: &[(String, String)]) {
        // The candidate list is printed by the prompt, not drawn on the grid
    }

    fn flip(&mut self) {
        self.flipped = !self.flipped;
    }
}

/// "Italian", "Ruy Lopez and 2 others"
fn summarize_openings(openings: &[String]) -> String {
    let mut unique: Vec<&str> = Vec::new();
    for name in openings {
        if !unique.contains(&name.as_str()) {
            unique.push(name);
        }
    }
    match unique.len() {
        0 => String::new(),
        1 => unique[0].to_string(),
        2 => format!("{} and {}", unique[0], unique[1]),
        n => format!("{} and {} others", unique[0], n - 1),
    }
}

fn load_session(
    arg: Option<&str>,
) -> Result<Session<ShakmatyAuthority, TextBoard>, Box<dyn Error>> {
    let authority = ShakmatyAuthority::new();
    let board = TextBoard::new();

    let session = match arg {
        Some(param) if param.starts_with("pgn=") || param.starts_with("url=") => {
            Session::from_link(param, authority, board)?
        }
        Some(uri) if uri.starts_with("http://") || uri.starts_with("https://") => {
            Session::from_remote(uri, authority, board)?
        }
        Some(path) => Session::from_text(fs::read_to_string(path)?, authority, board),
        None => Session::from_text(String::new(), authority, board),
    };
    Ok(session)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let arg = env::args().nth(1);
    let mut session = load_session(arg.as_deref())?;

    if !session.load_errors().is_empty() {
        println!("The following errors have been found in the PGN file:");
        for error in session.load_errors() {
            println!("  {}", error);
        }
    }
    if session.used_default() {
        println!("No valid game found, loaded the built-in opening set.");
    }
    match session.share_link() {
        Ok(param) => {
            println!("Shareable argument (don't forget to bookmark the updated link!):");
            println!("  {}", param);
        }
        Err(e) => println!("Could not build a shareable link: {}", e),
    }

    loop {
        let nav = session.nav_mut();
        println!();
        nav.board().print();
        match nav.turn() {
            Color::White => println!("White to play"),
            Color::Black => println!("Black to play"),
        }

        let candidates: Vec<NodeId> = nav.candidate_moves().to_vec();
        if candidates.is_empty() {
            println!("End of the repertoire line.");
        } else {
            println!("Successors:");
            for (i, &id) in candidates.iter().enumerate() {
                let node = nav.tree().get(id);
                print!("  {}: {} ({})", i + 1, node.san, summarize_openings(&node.openings));
                if let Some(comment) = &node.comment {
                    print!(" - {}", comment.replace('\n', " / "));
                }
                println!();
            }
        }
        print!("Move number/SAN, (b)ack, (r)eset, (s)witch, (a)uto on/off, (q)uit > ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let input = input.trim();

        let target = match input {
            "q" => break,
            "b" => {
                nav.back_one_move();
                continue;
            }
            "r" => {
                nav.reset();
                continue;
            }
            "s" => {
                nav.switch_sides();
                continue;
            }
            "a" => {
                let enabled = !nav.auto_advance();
                nav.set_auto_advance(enabled);
                println!("Auto-advance {}", if enabled { "on" } else { "off" });
                continue;
            }
            _ => match input.parse::<usize>() {
                Ok(n) if n >= 1 && n <= candidates.len() => Some(candidates[n - 1]),
                _ => nav.tree().find_child(nav.current(), input),
            },
        };

        match target {
            Some(id) => {
                nav.advance_to(id);
                while let Some(queued) = nav.take_pending() {
                    thread::sleep(AUTO_ADVANCE_DELAY);
                    if !nav.advance_to(queued) {
                        break;
                    }
                    nav.board().print();
                }
            }
            None => println!("Invalid move!"),
        }
    }

    Ok(())
}
