#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// The lit scene changed; the light buffer must be recomposited.
    SchedulePainting,
}
