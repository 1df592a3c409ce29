/// Answer to the "are you sure?" prompt that precedes a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confirmation {
    Affirmative,
    #[default]
    Declined,
}

impl Confirmation {
    /// Interpret a typed answer. Anything other than "y" or "yes" declines.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Confirmation::Affirmative,
            _ => Confirmation::Declined,
        }
    }

    pub fn is_affirmative(self) -> bool {
        self == Confirmation::Affirmative
    }
}
