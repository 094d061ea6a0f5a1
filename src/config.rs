/// How the compiler carries on after the first syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recovery {
    /// Report the first error only, every later one is suppressed.
    Sticky,
    /// Resume reporting at the next statement boundary.
    #[default]
    Statement,
}

/// When the infix loop keeps absorbing operators.
///
/// With `Strict` an operator is only taken while its level is above the level being parsed.
/// Operands are parsed one level up, so `1 + 2 * 3` groups as `(1 + 2) * 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    Strict,
    /// Equal levels are taken too, `1 + 2 * 3` groups as `1 + (2 * 3)`.
    Inclusive,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub recovery: Recovery,
    pub binding: Binding,
    /// Print the compiled chunk before running it
    pub disassemble: bool,
}
