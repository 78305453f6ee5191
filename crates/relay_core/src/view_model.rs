use crate::Presentation;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub in_flight: usize,
    pub presentations: Vec<Presentation>,
    pub dirty: bool,
}
