use std::fmt;

use crate::board::{PieceKind, Square};
use crate::error::{Result, ShogiError};

/// USI 形式の指し手（`7g7f`、`8h2b+`、`P*5e`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsiMove {
    Normal {
        from: Square,
        to: Square,
        promote: bool,
    },
    Drop {
        kind: PieceKind,
        to: Square,
    },
}

pub fn parse_usi_move(s: &str) -> Result<UsiMove> {
    if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
        return Err(ShogiError::InvalidUsiMove(s.to_string()));
    }

    if &s[1..2] == "*" {
        if s.len() != 4 {
            return Err(ShogiError::InvalidUsiMove(s.to_string()));
        }
        let c = s.chars().next().unwrap_or(' ');
        if !c.is_ascii_uppercase() {
            return Err(ShogiError::InvalidPieceKind(c));
        }
        let kind = PieceKind::from_sfen_char(c)?;
        if kind == PieceKind::King {
            return Err(ShogiError::InvalidUsiMove(s.to_string()));
        }
        let to = Square::from_usi(&s[2..4])?;
        return Ok(UsiMove::Drop { kind, to });
    }

    let from = Square::from_usi(&s[0..2])?;
    let to = Square::from_usi(&s[2..4])?;
    let promote = match s.get(4..) {
        Some("") | None => false,
        Some("+") => true,
        Some(_) => return Err(ShogiError::InvalidUsiMove(s.to_string())),
    };
    Ok(UsiMove::Normal { from, to, promote })
}

impl fmt::Display for UsiMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            UsiMove::Normal { from, to, promote } => {
                write!(f, "{}{}{}", from, to, if promote { "+" } else { "" })
            }
            UsiMove::Drop { kind, to } => write!(f, "{}*{}", kind.sfen_char(), to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usi(s: &str) -> Square {
        Square::from_usi(s).unwrap()
    }

    #[test]
    fn test_parse_normal_and_promotion() {
        assert_eq!(
            parse_usi_move("7g7f").unwrap(),
            UsiMove::Normal {
                from: usi("7g"),
                to: usi("7f"),
                promote: false
            }
        );
        assert_eq!(
            parse_usi_move("8h2b+").unwrap(),
            UsiMove::Normal {
                from: usi("8h"),
                to: usi("2b"),
                promote: true
            }
        );
    }

    #[test]
    fn test_parse_drop() {
        assert_eq!(
            parse_usi_move("P*5e").unwrap(),
            UsiMove::Drop {
                kind: PieceKind::Pawn,
                to: usi("5e")
            }
        );
        assert_eq!(parse_usi_move("X*5e"), Err(ShogiError::InvalidPieceKind('X')));
        assert!(parse_usi_move("K*5e").is_err());
        assert!(parse_usi_move("p*5e").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "7g", "7g7f=", "7g7j", "resign", "７g7f"] {
            assert!(parse_usi_move(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_display_matches_input() {
        for s in ["7g7f", "8h2b+", "G*5b"] {
            assert_eq!(parse_usi_move(s).unwrap().to_string(), s);
        }
    }
}
