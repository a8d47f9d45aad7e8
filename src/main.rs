use chess_core::{Color, Game};
use chess_engine::{ChessAI, Difficulty, SearchError};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Engine-vs-engine self-play from the standard starting position.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Search depth in plies for minimax players
    #[arg(long, default_value_t = chess_engine::search::DEFAULT_DEPTH)]
    depth: u8,

    /// Stop after this many plies if the game is still going
    #[arg(long, default_value_t = 80)]
    plies: usize,

    /// random, aggressive, greedy or minimax
    #[arg(long, default_value_t = Difficulty::Minimax)]
    white_level: Difficulty,

    #[arg(long, default_value_t = Difficulty::Greedy)]
    black_level: Difficulty,

    /// Seed for the random and aggressive levels
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<(), SearchError> {
    env_logger::init();
    let args = Args::parse();

    let mut white = ChessAI::new(args.depth).with_difficulty(args.white_level);
    let mut black = ChessAI::new(args.depth).with_difficulty(args.black_level);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut game = Game::new();

    info!("white: {} (depth {}), black: {} (depth {})", white.difficulty(), white.depth(), black.difficulty(), black.depth());

    while game.history_len() < args.plies && !game.is_game_over() {
        let ai = match game.side_to_move() {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        let Some(mv) = ai.choose_move(&mut game, &mut rng)? else {
            break;
        };
        game.make_move(mv)?;
    }

    let played: Vec<String> = game.moves_played().map(|mv| mv.to_string()).collect();
    println!("{}", played.join(" "));
    let result = if game.is_checkmate() {
        format!("checkmate, {:?} wins", game.side_to_move().opposite())
    } else if game.is_draw() {
        "draw".to_string()
    } else {
        format!("stopped after {} plies", played.len())
    };
    println!("{result}");

    Ok(())
}
