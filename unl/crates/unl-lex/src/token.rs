//! Token kinds of the Unlambda surface syntax.

/// One token of program text.
///
/// Every token is a single significant byte except `Print` and `Compare`,
/// which carry the raw payload byte that followed `.` or `?`. The shorthand
/// `r` arrives as `Print(b'\n')`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `` ` `` - prefix application awaiting two operands.
    Apply,
    /// `i` - identity.
    I,
    /// `k` - constant former.
    K,
    /// `s` - substitution.
    S,
    /// `v` - the black hole.
    V,
    /// `d` - delay.
    D,
    /// `c` - call with current continuation.
    C,
    /// `e` - exit.
    E,
    /// `@` - read one input byte.
    Read,
    /// `|` - reprint the current input byte.
    Reprint,
    /// `.x` or `r` - print the payload byte.
    Print(u8),
    /// `?x` - compare the current input byte against the payload.
    Compare(u8),
    /// End of program text.
    Eof,
}
