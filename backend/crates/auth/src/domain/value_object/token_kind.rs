use std::str::FromStr;

use derive_more::Display;

/// Which half of a token pair a metadata record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenKind {
    #[display("ACCESS")]
    Access,
    #[display("REFRESH")]
    Refresh,
}

impl TokenKind {
    /// Column value in `auth_tokens.token_kind`
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "ACCESS",
            TokenKind::Refresh => "REFRESH",
        }
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCESS" => Ok(TokenKind::Access),
            "REFRESH" => Ok(TokenKind::Refresh),
            other => Err(format!("unknown token kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_column_value() {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            assert_eq!(kind.to_string(), kind.as_str());
            assert_eq!(kind.as_str().parse::<TokenKind>(), Ok(kind));
        }
        assert!("SESSION".parse::<TokenKind>().is_err());
    }
}
