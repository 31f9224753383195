use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use shogi_kifu::Game;

/// USI 形式の指し手列を読み、棋譜（KIF 表記）を出力する。
#[derive(Parser, Debug)]
#[command(name = "kifu", version)]
struct Args {
    /// 開始局面（SFEN または startpos）
    #[arg(long, default_value = "startpos")]
    sfen: String,

    /// 空白区切りの指し手を読むファイル
    #[arg(long)]
    file: Option<PathBuf>,

    /// 棋譜を JSON で出力する
    #[arg(long)]
    json: bool,

    /// KIF ファイルの出力先
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "先手")]
    black_name: String,

    #[arg(long, default_value = "後手")]
    white_name: String,

    /// debug ログを出す
    #[arg(short, long)]
    verbose: bool,

    /// USI 形式の指し手（例: 7g7f 3c3d 8h2b+）
    moves: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut game = Game::from_sfen(&args.sfen)
        .with_context(|| format!("開始局面を読めません: {}", args.sfen))?;

    let mut moves = args.moves.clone();
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("ファイルを読めません: {}", path.display()))?;
        moves.extend(text.split_whitespace().map(str::to_string));
    }
    info!("初期局面: {}", game.to_sfen());

    for mv in &moves {
        let record = game
            .apply_usi(mv)
            .with_context(|| format!("指し手 {mv} を適用できません"))?;
        if !args.json {
            println!("{}", record.notation());
        }
        debug!("局面: {}", game.to_sfen());
        if game.is_in_check() {
            info!("{:?} は王手されています", game.side_to_move());
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(game.kifu())?;
        println!("{json}");
    }

    if let Some(path) = &args.output {
        fs::write(path, game.kifu().to_kif(&args.black_name, &args.white_name))
            .with_context(|| format!("書き込みに失敗しました: {}", path.display()))?;
        info!("棋譜を {} に出力しました", path.display());
    }

    info!("最終局面: {}", game.to_sfen());
    Ok(())
}
