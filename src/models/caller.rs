/// Identity of the person talking to the assistant, resolved by the handler
/// layer before any core logic runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Caller {
    Anonymous,
    Authenticated { id: String, display_name: String },
}

impl Caller {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated { .. })
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { display_name, .. } => Some(display_name),
        }
    }
}
