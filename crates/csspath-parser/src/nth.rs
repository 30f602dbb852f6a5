//! `an+b` arguments of the `:nth-*` pseudo-classes.

/// The `an+b` pattern: matches 1-based positions `p` with `p = a*k + b` for
/// some integer `k >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    pub const ODD: Nth = Nth { a: 2, b: 1 };
    pub const EVEN: Nth = Nth { a: 2, b: 0 };

    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, `b`, `an`, `an+b` and `an-b`.
    ///
    /// Whitespace is ignored and `n` is case-insensitive.
    ///
    /// ```
    /// use csspath_parser::Nth;
    ///
    /// assert_eq!(Nth::parse("2n+1"), Some(Nth::ODD));
    /// assert_eq!(Nth::parse("-n + 3"), Some(Nth::new(-1, 3)));
    /// assert_eq!(Nth::parse("n-"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Nth> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "odd" => return Some(Nth::ODD),
            "even" => return Some(Nth::EVEN),
            "" => return None,
            _ => {}
        }

        let Some(idx) = compact.find('n') else {
            return parse_integer(&compact).map(|b| Nth::new(0, b));
        };

        let a = match &compact[..idx] {
            "" | "+" => 1,
            "-" => -1,
            coefficient => parse_integer(coefficient)?,
        };
        let offset = &compact[idx + 1..];
        let b = if offset.is_empty() {
            0
        } else if offset.starts_with(['+', '-']) {
            parse_integer(offset)?
        } else {
            return None;
        };

        Some(Nth::new(a, b))
    }

    /// Whether the 1-based `position` is selected.
    pub fn matches(&self, position: i64) -> bool {
        let a = i64::from(self.a);
        let diff = position - i64::from(self.b);
        if a == 0 {
            diff == 0
        } else {
            diff % a == 0 && diff / a >= 0
        }
    }
}

fn parse_integer(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
